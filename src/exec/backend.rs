// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The engine talks to a `CommandRunner` instead of spawning processes
//! itself. This makes it easy to swap in a scripted runner in tests while
//! keeping the production implementation in [`super::shell`].

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Environment variable through which commands find the job directory.
pub const JOB_ROOT_ENV: &str = "JOB_ROOT";

/// One command to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    /// Shell command line, passed verbatim to the shell.
    pub command: String,
    pub working_dir: PathBuf,
    /// Absolute wall-clock limit. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Extra environment variables for the spawned process.
    pub env: Vec<(String, OsString)>,
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Exited on its own with this code.
    Exited(i32),
    /// Terminated by a signal it did not ask for.
    Signaled,
    /// Killed because the deadline passed.
    TimedOut,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        matches!(self, CommandStatus::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            CommandStatus::Exited(code) => Some(*code),
            _ => None,
        }
    }
}

/// Everything captured from a finished (or killed) command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: String,
    /// Diagnostics only, never verified.
    pub stderr: String,
    pub elapsed: Duration,
}

/// Reasons a command could not be run at all.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("working directory does not exist: {0:?}")]
    MissingFolder(PathBuf),

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Trait abstracting how a single command is executed.
///
/// Production code uses [`super::ShellRunner`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait CommandRunner: Send + Sync {
    /// Run one command to completion, timeout or failure.
    fn run<'a>(
        &'a self,
        request: &'a CommandRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, RunError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exit_zero_is_success() {
        assert!(CommandStatus::Exited(0).success());
        assert!(!CommandStatus::Exited(1).success());
        assert!(!CommandStatus::Signaled.success());
        assert!(!CommandStatus::TimedOut.success());
        assert_eq!(CommandStatus::TimedOut.code(), None);
        assert_eq!(CommandStatus::Exited(3).code(), Some(3));
    }
}
