// src/engine/mod.rs

//! Task execution and verification engine.
//!
//! Data flows top-down and results flow back up:
//!
//! - [`orchestrator`] iterates the homeworks of a job, sets up per-homework
//!   context and assembles the result tree.
//! - [`homework`] runs the tasks of one homework.
//! - [`task`] runs the ordered tests of one task with short-circuiting.
//! - [`compare`] decides pass/fail for one finished command.
//! - [`outcome`] holds the result tree types.
//! - [`workspace`] manages optional scratch copies of a homework.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::exec::JOB_ROOT_ENV;

pub mod compare;
pub mod homework;
pub mod orchestrator;
pub mod outcome;
pub mod task;
pub mod workspace;

pub use compare::{Verdict, compare};
pub use homework::HomeworkExecutor;
pub use orchestrator::Orchestrator;
pub use outcome::{
    AggregateStatus, FailureReason, HomeworkOutcome, JobOutcome, Summary, TaskOutcome,
    TestOutcome, TestStatus,
};
pub use task::{TaskExecutor, TaskState};

/// Run-wide engine settings.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Upper bound on tasks of one homework running at the same time.
    pub max_parallel_tasks: usize,
    /// Run tasks in a scratch copy of each homework instead of in place.
    pub copy_submission: bool,
    /// Where scratch copies are created.
    pub scratch_root: PathBuf,
    /// Shell override; `None` uses `sh` (or `cmd` on Windows).
    pub shell: Option<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_parallel_tasks: 1,
            copy_submission: false,
            scratch_root: std::env::temp_dir().join("homework_checker"),
            shell: None,
        }
    }
}

/// Read-only context shared by every command of a run.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Exported to commands as `JOB_ROOT`.
    pub job_dir: PathBuf,
    /// Reference time for deadline checks.
    pub now: NaiveDateTime,
}

impl ExecutionContext {
    pub fn new(job_dir: impl AsRef<Path>) -> Self {
        Self {
            job_dir: job_dir.as_ref().to_path_buf(),
            now: Local::now().naive_local(),
        }
    }

    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Environment handed to every spawned command.
    pub fn env(&self) -> Vec<(String, OsString)> {
        vec![(JOB_ROOT_ENV.to_string(), self.job_dir.clone().into_os_string())]
    }
}
