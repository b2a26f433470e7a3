// src/engine/outcome.rs

//! Result tree produced by a run.
//!
//! Outcomes are built bottom-up: every test, task and homework returns its
//! own value and the parent collects them. Nothing here is shared between
//! concurrently running tasks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::config::{Homework, Task};

/// Why a test, task or homework did not pass.
///
/// The `Display` text is meant to go straight into a report.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("Timeout: command ran longer than {} seconds", .limit.as_secs_f64())]
    Timeout {
        #[serde(serialize_with = "duration_secs")]
        limit: Duration,
    },

    #[error("{}", describe_exit(.code))]
    NonZeroExit { code: Option<i32> },

    #[error("{}", describe_mismatch(.expected, .actual, .detail))]
    OutputMismatch {
        expected: String,
        actual: String,
        detail: Option<String>,
    },

    #[error("Folder {path:?} does not exist")]
    MissingFolder { path: PathBuf },

    #[error("Task folder {path:?} is not a directory")]
    MissingTask { path: PathBuf },

    #[error("Could not start command: {message}")]
    SpawnError { message: String },

    #[error("Could not prepare working copy: {message}")]
    WorkspaceError { message: String },
}

impl FailureReason {
    /// Move a path under `from` to the same place under `to`.
    fn rebase(&mut self, from: &Path, to: &Path) {
        if let FailureReason::MissingFolder { path } | FailureReason::MissingTask { path } = self {
            if let Ok(rel) = path.strip_prefix(from) {
                *path = to.join(rel);
            }
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("Command finished with non-zero exit code {code}"),
        None => "Command was terminated by a signal".to_string(),
    }
}

fn describe_mismatch(expected: &str, actual: &str, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("Output mismatch: {detail}"),
        None => format!("Output mismatch: expected {expected:?}, got {actual:?}"),
    }
}

fn duration_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Status of a single test.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    /// Ran, but did not produce the expected result.
    Failed(FailureReason),
    /// Not run because an earlier test in the task did not pass.
    Skipped,
    /// Could not be run at all.
    Error(FailureReason),
}

impl TestStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            TestStatus::Failed(reason) | TestStatus::Error(reason) => Some(reason),
            TestStatus::Passed | TestStatus::Skipped => None,
        }
    }

    fn reason_mut(&mut self) -> Option<&mut FailureReason> {
        match self {
            TestStatus::Failed(reason) | TestStatus::Error(reason) => Some(reason),
            TestStatus::Passed | TestStatus::Skipped => None,
        }
    }
}

/// Aggregate status of a task or homework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Passed,
    Failed,
    Error,
    /// Not run because its homework could not run.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: TestStatus,
    pub stdout: String,
    pub stderr: String,
    #[serde(serialize_with = "duration_secs")]
    pub elapsed: Duration,
}

impl TestOutcome {
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skipped,
            stdout: String::new(),
            stderr: String::new(),
            elapsed: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub name: String,
    pub status: AggregateStatus,
    /// Set when the task could not run at all.
    pub reason: Option<FailureReason>,
    pub tests: Vec<TestOutcome>,
    #[serde(serialize_with = "duration_secs")]
    pub elapsed: Duration,
}

impl TaskOutcome {
    /// A task that could not run; its declared tests are kept as skipped.
    pub fn error(task: &Task, reason: FailureReason) -> Self {
        Self {
            status: AggregateStatus::Error,
            reason: Some(reason),
            ..Self::skipped(task)
        }
    }

    pub fn skipped(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            status: AggregateStatus::Skipped,
            reason: None,
            tests: task.tests.iter().map(|t| TestOutcome::skipped(&t.name)).collect(),
            elapsed: Duration::ZERO,
        }
    }

    /// Look up a test by name.
    pub fn test(&self, name: &str) -> Option<&TestOutcome> {
        self.tests.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeworkOutcome {
    pub name: String,
    pub status: AggregateStatus,
    pub reason: Option<FailureReason>,
    /// The declared deadline had already passed when the run started.
    pub expired: bool,
    pub tasks: Vec<TaskOutcome>,
    #[serde(serialize_with = "duration_secs")]
    pub elapsed: Duration,
}

impl HomeworkOutcome {
    /// A homework that could not run; its declared tasks are kept as skipped.
    pub fn error(homework: &Homework, expired: bool, reason: FailureReason) -> Self {
        Self {
            name: homework.name.clone(),
            status: AggregateStatus::Error,
            reason: Some(reason),
            expired,
            tasks: homework.tasks.iter().map(TaskOutcome::skipped).collect(),
            elapsed: Duration::ZERO,
        }
    }

    /// Rewrite reported paths under `from` (a scratch copy) to `to`.
    pub fn rebase_paths(&mut self, from: &Path, to: &Path) {
        let reasons = self.reason.iter_mut().chain(
            self.tasks.iter_mut().flat_map(|task| {
                task.reason
                    .iter_mut()
                    .chain(task.tests.iter_mut().filter_map(|test| test.status.reason_mut()))
            }),
        );
        for reason in reasons {
            reason.rebase(from, to);
        }
    }

    pub fn task(&self, name: &str) -> Option<&TaskOutcome> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobOutcome {
    pub homeworks: Vec<HomeworkOutcome>,
    #[serde(serialize_with = "duration_secs")]
    pub elapsed: Duration,
}

/// Counts over a whole result tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Tasks that could not run (missing folder etc.).
    pub task_errors: usize,
    /// Homeworks that could not run.
    pub homework_errors: usize,
}

impl JobOutcome {
    pub fn homework(&self, name: &str) -> Option<&HomeworkOutcome> {
        self.homeworks.iter().find(|h| h.name == name)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for homework in &self.homeworks {
            if homework.reason.is_some() {
                summary.homework_errors += 1;
            }
            for task in &homework.tasks {
                if task.reason.is_some() {
                    summary.task_errors += 1;
                }
                for test in &task.tests {
                    match test.status {
                        TestStatus::Passed => summary.passed += 1,
                        TestStatus::Failed(_) => summary.failed += 1,
                        TestStatus::Skipped => summary.skipped += 1,
                        TestStatus::Error(_) => summary.errors += 1,
                    }
                }
            }
        }
        summary
    }

    /// True if every declared test of every homework passed.
    pub fn all_passed(&self) -> bool {
        self.homeworks
            .iter()
            .all(|h| h.status == AggregateStatus::Passed)
    }
}

/// Aggregate a list of child statuses: passed only if all children passed.
pub(crate) fn aggregate<I>(children: I) -> AggregateStatus
where
    I: IntoIterator<Item = bool>,
{
    if children.into_iter().all(|passed| passed) {
        AggregateStatus::Passed
    } else {
        AggregateStatus::Failed
    }
}
