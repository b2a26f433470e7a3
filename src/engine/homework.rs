// src/engine/homework.rs

//! Homework executor: runs the tasks of one homework.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::{Homework, Task};
use crate::engine::ExecutionContext;
use crate::engine::outcome::{
    AggregateStatus, FailureReason, HomeworkOutcome, TaskOutcome, aggregate,
};
use crate::engine::task::TaskExecutor;
use crate::fs::FileSystem;

/// Runs all tasks of a homework.
///
/// Tasks are independent: a failing or missing task never stops its
/// siblings. With `max_parallel_tasks > 1` up to that many tasks run at the
/// same time; every worker returns its own [`TaskOutcome`] and the results
/// are put back in declared order.
#[derive(Clone)]
pub struct HomeworkExecutor {
    tasks: TaskExecutor,
    fs: Arc<dyn FileSystem>,
    max_parallel_tasks: usize,
}

impl HomeworkExecutor {
    pub fn new(tasks: TaskExecutor, fs: Arc<dyn FileSystem>, max_parallel_tasks: usize) -> Self {
        Self {
            tasks,
            fs,
            max_parallel_tasks: max_parallel_tasks.max(1),
        }
    }

    /// Run `homework` with its tasks located under `homework_dir`.
    pub async fn run(
        &self,
        homework: &Homework,
        homework_dir: &Path,
        ctx: &ExecutionContext,
    ) -> HomeworkOutcome {
        let expired = homework.is_expired_at(ctx.now);
        if expired {
            info!(homework = %homework.name, "deadline has passed; results are informational");
        }

        if !self.fs.is_dir(homework_dir) {
            let reason = FailureReason::MissingFolder {
                path: homework_dir.to_path_buf(),
            };
            warn!(homework = %homework.name, %reason, "skipping homework");
            return HomeworkOutcome::error(homework, expired, reason);
        }

        let started = Instant::now();
        let tasks = if self.max_parallel_tasks == 1 || homework.tasks.len() < 2 {
            self.run_sequential(&homework.tasks, homework_dir, ctx).await
        } else {
            self.run_concurrent(&homework.tasks, homework_dir, ctx).await
        };

        let status = aggregate(tasks.iter().map(|t| t.status == AggregateStatus::Passed));
        info!(homework = %homework.name, ?status, "homework finished");

        HomeworkOutcome {
            name: homework.name.clone(),
            status,
            reason: None,
            expired,
            tasks,
            elapsed: started.elapsed(),
        }
    }

    async fn run_sequential(
        &self,
        tasks: &[Task],
        homework_dir: &Path,
        ctx: &ExecutionContext,
    ) -> Vec<TaskOutcome> {
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            outcomes.push(self.tasks.run(task, homework_dir, ctx).await);
        }
        outcomes
    }

    async fn run_concurrent(
        &self,
        tasks: &[Task],
        homework_dir: &Path,
        ctx: &ExecutionContext,
    ) -> Vec<TaskOutcome> {
        let permits = Arc::new(Semaphore::new(self.max_parallel_tasks));

        let handles: Vec<_> = tasks
            .iter()
            .cloned()
            .map(|task| {
                let executor = self.tasks.clone();
                let permits = Arc::clone(&permits);
                let homework_dir = homework_dir.to_path_buf();
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    // Never closed, so acquiring cannot fail.
                    let _permit = permits.acquire_owned().await.ok();
                    executor.run(&task, &homework_dir, &ctx).await
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (task, handle) in tasks.iter().zip(handles) {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(task = %task.name, error = %e, "task worker failed");
                    outcomes.push(TaskOutcome::error(
                        task,
                        FailureReason::SpawnError {
                            message: format!("task worker failed: {e}"),
                        },
                    ));
                }
            }
        }
        outcomes
    }
}
