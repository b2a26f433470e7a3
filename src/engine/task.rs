// src/engine/task.rs

//! Task executor: runs the ordered tests of one task.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Task, Test};
use crate::engine::ExecutionContext;
use crate::engine::compare::{Verdict, compare};
use crate::engine::outcome::{FailureReason, TaskOutcome, TestOutcome, TestStatus, aggregate};
use crate::exec::{CommandRequest, CommandRunner, CommandStatus, RunError};
use crate::fs::FileSystem;

/// Per-task state.
///
/// `Pending → Running → {Passed, Failed}`. Once `Failed`, every remaining
/// test is recorded as skipped without being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Passed,
    Failed,
}

/// Runs the tests of a task against a [`CommandRunner`].
///
/// Cheap to clone; clones share the runner and filesystem.
#[derive(Clone)]
pub struct TaskExecutor {
    runner: Arc<dyn CommandRunner>,
    fs: Arc<dyn FileSystem>,
}

impl TaskExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>, fs: Arc<dyn FileSystem>) -> Self {
        Self { runner, fs }
    }

    /// Run every test of `task` inside `<homework_dir>/<task.folder>`.
    ///
    /// A missing task folder is reported as an error outcome without running
    /// anything; the declared tests are listed as skipped.
    pub async fn run(&self, task: &Task, homework_dir: &Path, ctx: &ExecutionContext) -> TaskOutcome {
        let task_dir = homework_dir.join(&task.folder);

        if !self.fs.is_dir(&task_dir) {
            let reason = if self.fs.exists(&task_dir) {
                FailureReason::MissingTask { path: task_dir }
            } else {
                FailureReason::MissingFolder { path: task_dir }
            };
            warn!(task = %task.name, %reason, "skipping task");
            return TaskOutcome::error(task, reason);
        }

        let started = Instant::now();
        let mut state = TaskState::Pending;
        let mut tests = Vec::with_capacity(task.tests.len());

        for test in &task.tests {
            if state == TaskState::Failed {
                debug!(task = %task.name, test = %test.name, "skipped after earlier failure");
                tests.push(TestOutcome::skipped(&test.name));
                continue;
            }

            state = TaskState::Running;
            let outcome = self.run_test(test, &task_dir, ctx).await;
            if outcome.status.is_passed() {
                info!(task = %task.name, test = %test.name, "test passed");
            } else {
                state = TaskState::Failed;
                info!(
                    task = %task.name,
                    test = %test.name,
                    status = ?outcome.status,
                    "test did not pass; skipping the rest of the task"
                );
            }
            tests.push(outcome);
        }

        if state != TaskState::Failed {
            state = TaskState::Passed;
        }
        debug!(task = %task.name, ?state, "task finished");

        TaskOutcome {
            name: task.name.clone(),
            status: aggregate(tests.iter().map(|t| t.status.is_passed())),
            reason: None,
            tests,
            elapsed: started.elapsed(),
        }
    }

    async fn run_test(&self, test: &Test, task_dir: &Path, ctx: &ExecutionContext) -> TestOutcome {
        let request = CommandRequest {
            command: test.cmd.clone(),
            working_dir: task_dir.to_path_buf(),
            timeout: test.timeout,
            env: ctx.env(),
        };

        let started = Instant::now();
        match self.runner.run(&request).await {
            Ok(output) => {
                let status = match output.status {
                    CommandStatus::TimedOut => TestStatus::Failed(FailureReason::Timeout {
                        limit: test.timeout.unwrap_or(Duration::ZERO),
                    }),
                    status => match compare(
                        test.output_kind,
                        status,
                        &output.stdout,
                        test.expected.as_ref(),
                    ) {
                        Verdict::Pass => TestStatus::Passed,
                        Verdict::Fail(reason) => TestStatus::Failed(reason),
                    },
                };
                TestOutcome {
                    name: test.name.clone(),
                    status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    elapsed: output.elapsed,
                }
            }
            Err(err) => {
                warn!(test = %test.name, error = %err, "command could not be run");
                let reason = match err {
                    RunError::MissingFolder(path) => FailureReason::MissingFolder { path },
                    other => FailureReason::SpawnError {
                        message: other.to_string(),
                    },
                };
                TestOutcome {
                    name: test.name.clone(),
                    status: TestStatus::Error(reason),
                    stdout: String::new(),
                    stderr: String::new(),
                    elapsed: started.elapsed(),
                }
            }
        }
    }
}
