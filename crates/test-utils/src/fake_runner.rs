use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use homework_checker::exec::{
    CommandOutput, CommandRequest, CommandRunner, CommandStatus, RunError,
};

/// What the fake runner does for one command.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Exit with `code` after printing `stdout`.
    Exit { code: i32, stdout: String },
    /// Behave as if the deadline passed.
    Timeout,
    /// The command could not be started.
    SpawnFailure,
    /// The working directory vanished.
    MissingFolder,
}

impl Scripted {
    pub fn ok(stdout: &str) -> Self {
        Scripted::Exit {
            code: 0,
            stdout: stdout.to_string(),
        }
    }

    pub fn exit(code: i32) -> Self {
        Scripted::Exit {
            code,
            stdout: String::new(),
        }
    }
}

/// A fake command runner that:
/// - records every request it receives, in order
/// - answers from a script keyed by command string
/// - succeeds silently for commands that are not scripted.
#[derive(Clone, Default)]
pub struct FakeRunner {
    script: Arc<Mutex<HashMap<String, Scripted>>>,
    calls: Arc<Mutex<Vec<CommandRequest>>>,
    delay: Option<Duration>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, command: &str, response: Scripted) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(command.to_string(), response);
        self
    }

    /// Sleep this long before answering, to make concurrent runs overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<CommandRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands seen so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        request: &'a CommandRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, RunError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let response = self
                .script
                .lock()
                .unwrap()
                .get(&request.command)
                .cloned()
                .unwrap_or_else(|| Scripted::ok(""));

            match response {
                Scripted::Exit { code, stdout } => Ok(CommandOutput {
                    status: CommandStatus::Exited(code),
                    stdout,
                    stderr: String::new(),
                    elapsed: Duration::from_millis(1),
                }),
                Scripted::Timeout => Ok(CommandOutput {
                    status: CommandStatus::TimedOut,
                    stdout: String::new(),
                    stderr: String::new(),
                    elapsed: request.timeout.unwrap_or_default(),
                }),
                Scripted::SpawnFailure => Err(RunError::Spawn {
                    command: request.command.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no shell"),
                }),
                Scripted::MissingFolder => {
                    Err(RunError::MissingFolder(request.working_dir.clone()))
                }
            }
        })
    }
}
