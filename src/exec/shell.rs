// src/exec/shell.rs

//! Real command runner backed by `tokio::process`.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::backend::{CommandOutput, CommandRequest, CommandRunner, CommandStatus, RunError};

/// Runs commands through the platform shell (`sh -c` / `cmd /C`).
///
/// Every command gets its own process group so that a timeout can take down
/// the shell together with everything it started.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
    kill_grace: Duration,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellRunner {
    /// How long to keep collecting output after the process group is gone.
    const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(500);

    pub fn new() -> Self {
        Self {
            shell: default_shell(),
            kill_grace: Self::DEFAULT_KILL_GRACE,
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    fn build_command(&self, request: &CommandRequest) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(shell_flag(&self.shell))
            .arg(&request.command)
            .current_dir(&request.working_dir)
            .envs(request.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    async fn run_inner(&self, request: &CommandRequest) -> Result<CommandOutput, RunError> {
        if !request.working_dir.is_dir() {
            return Err(RunError::MissingFolder(request.working_dir.clone()));
        }

        debug!(
            cmd = %request.command,
            cwd = ?request.working_dir,
            timeout = ?request.timeout,
            "spawning command"
        );

        let started = Instant::now();
        let mut child = self
            .build_command(request)
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: request.command.clone(),
                source,
            })?;
        let pgid = child.id();

        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let readers = [
            child.stdout.take().map(|out| spawn_drain(out, Arc::clone(&stdout_buf))),
            child.stderr.take().map(|err| spawn_drain(err, Arc::clone(&stderr_buf))),
        ];

        // Either the command exits on its own, or the deadline passes first.
        let waited = match request.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };
        let elapsed = started.elapsed();

        // Reclaim the whole group in both cases: on timeout this is the forced
        // termination, after a normal exit it removes leftover background jobs
        // that would otherwise keep the output pipes open.
        kill_process_group(&mut child, pgid);

        let status = match waited {
            Some(Ok(exit)) => match exit.code() {
                Some(code) => CommandStatus::Exited(code),
                None => CommandStatus::Signaled,
            },
            Some(Err(source)) => {
                return Err(RunError::Wait {
                    command: request.command.clone(),
                    source,
                });
            }
            None => {
                warn!(
                    cmd = %request.command,
                    limit_secs = request.timeout.map(|t| t.as_secs_f64()),
                    "command timed out; process group killed"
                );
                if let Err(e) = child.wait().await {
                    warn!(cmd = %request.command, error = %e, "failed to reap killed process");
                }
                CommandStatus::TimedOut
            }
        };

        for reader in readers.into_iter().flatten() {
            if tokio::time::timeout(self.kill_grace, reader).await.is_err() {
                debug!(cmd = %request.command, "output pipe still open after grace period");
            }
        }

        let stdout = take_text(&stdout_buf);
        let stderr = take_text(&stderr_buf);
        if !stderr.is_empty() {
            debug!(cmd = %request.command, "stderr: {}", stderr.trim_end());
        }

        info!(
            cmd = %request.command,
            exit_code = status.code(),
            elapsed_ms = elapsed.as_millis() as u64,
            "command finished"
        );

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
            elapsed,
        })
    }
}

impl CommandRunner for ShellRunner {
    fn run<'a>(
        &'a self,
        request: &'a CommandRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, RunError>> + Send + 'a>> {
        Box::pin(self.run_inner(request))
    }
}

fn default_shell() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("cmd")
    } else {
        PathBuf::from("sh")
    }
}

fn shell_flag(shell: &std::path::Path) -> &'static str {
    let name = shell
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase);
    match name.as_deref() {
        Some("cmd") => "/C",
        _ => "-c",
    }
}

/// Copy everything from `reader` into `buf` until EOF.
///
/// The buffer is shared so whatever arrived before a kill stays available
/// even if the reader never reaches EOF.
fn spawn_drain<R>(mut reader: R, buf: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&chunk[..n]),
            }
        }
    })
}

fn take_text(buf: &Mutex<Vec<u8>>) -> String {
    let bytes = std::mem::take(&mut *buf.lock().unwrap_or_else(PoisonError::into_inner));
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child, pgid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Some(pid) = pgid {
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => warn!(pgid = pid, error = %e, "failed to kill process group"),
        }
    }
    let _ = child.start_kill();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child, _pgid: Option<u32>) {
    let _ = child.start_kill();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn request(cmd: &str, dir: &std::path::Path, timeout: Option<Duration>) -> CommandRequest {
        CommandRequest {
            command: cmd.to_string(),
            working_dir: dir.to_path_buf(),
            timeout,
            env: vec![],
        }
    }

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let out = ShellRunner::new()
            .run(&request("echo hello; echo oops >&2; exit 3", dir.path(), None))
            .await
            .unwrap();
        assert_eq!(out.status, CommandStatus::Exited(3));
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "oops\n");
    }

    #[tokio::test]
    async fn missing_working_dir_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = ShellRunner::new()
            .run(&request("true", &missing, None))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::MissingFolder(p) if p == missing));
    }

    #[tokio::test]
    async fn missing_shell_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellRunner::new()
            .shell("/definitely/not/a/shell")
            .run(&request("true", dir.path(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }

    #[tokio::test]
    async fn timeout_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let started = std::time::Instant::now();
        let out = ShellRunner::new()
            .run(&request(
                "echo started; while true; do sleep 1; done",
                dir.path(),
                Some(Duration::from_millis(300)),
            ))
            .await
            .unwrap();
        assert_eq!(out.status, CommandStatus::TimedOut);
        assert_eq!(out.stdout, "started\n");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn background_child_does_not_outlive_its_command() {
        let dir = tempfile::tempdir().unwrap();
        let started = std::time::Instant::now();
        let out = ShellRunner::new()
            .kill_grace(Duration::from_millis(100))
            .run(&request("sleep 30 & echo done", dir.path(), None))
            .await
            .unwrap();
        assert_eq!(out.status, CommandStatus::Exited(0));
        assert_eq!(out.stdout, "done\n");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn cmd_shell_uses_slash_c() {
        assert_eq!(shell_flag(std::path::Path::new("cmd.exe")), "/C");
        assert_eq!(shell_flag(std::path::Path::new("/bin/bash")), "-c");
    }
}
