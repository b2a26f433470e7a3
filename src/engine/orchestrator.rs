// src/engine/orchestrator.rs

//! Run orchestrator: drives a whole job and assembles the result tree.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::{Homework, JobSpec};
use crate::engine::homework::HomeworkExecutor;
use crate::engine::outcome::{FailureReason, HomeworkOutcome, JobOutcome};
use crate::engine::task::TaskExecutor;
use crate::engine::workspace::Workspace;
use crate::engine::{EngineOptions, ExecutionContext};
use crate::errors::{CheckerError, Result};
use crate::exec::{CommandRunner, ShellRunner};
use crate::fs::{FileSystem, RealFileSystem};

/// Runs every homework of a job in declared order.
pub struct Orchestrator {
    homeworks: HomeworkExecutor,
    fs: Arc<dyn FileSystem>,
    options: EngineOptions,
}

impl Orchestrator {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        fs: Arc<dyn FileSystem>,
        options: EngineOptions,
    ) -> Self {
        let tasks = TaskExecutor::new(runner, Arc::clone(&fs));
        let homeworks = HomeworkExecutor::new(tasks, Arc::clone(&fs), options.max_parallel_tasks);
        Self {
            homeworks,
            fs,
            options,
        }
    }

    /// Orchestrator using the real shell and filesystem.
    pub fn with_options(options: EngineOptions) -> Self {
        let mut runner = ShellRunner::new();
        if let Some(shell) = &options.shell {
            runner = runner.shell(shell);
        }
        Self::new(Arc::new(runner), Arc::new(RealFileSystem), options)
    }

    /// Check every homework of `job`.
    ///
    /// Only a missing job root aborts the run; every other problem ends up
    /// in the returned tree.
    pub async fn run(&self, job: &JobSpec) -> Result<JobOutcome> {
        if !self.fs.is_dir(&job.root) {
            return Err(CheckerError::MissingJobRoot(job.root.clone()));
        }

        let started = Instant::now();
        let ctx = ExecutionContext::new(&job.job_dir);
        info!(
            root = ?job.root,
            homeworks = job.homeworks.len(),
            "checking submission"
        );

        let mut homeworks = Vec::with_capacity(job.homeworks.len());
        for homework in &job.homeworks {
            homeworks.push(self.run_homework(job, homework, &ctx).await);
        }

        Ok(JobOutcome {
            homeworks,
            elapsed: started.elapsed(),
        })
    }

    async fn run_homework(
        &self,
        job: &JobSpec,
        homework: &Homework,
        ctx: &ExecutionContext,
    ) -> HomeworkOutcome {
        let source = job.root.join(&homework.folder);

        if !self.options.copy_submission || !self.fs.is_dir(&source) {
            return self.homeworks.run(homework, &source, ctx).await;
        }

        let workspace = match Workspace::prepare(
            Arc::clone(&self.fs),
            &self.options.scratch_root,
            &source,
        ) {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!(homework = %homework.name, error = %e, "could not copy homework");
                return HomeworkOutcome::error(
                    homework,
                    homework.is_expired_at(ctx.now),
                    FailureReason::WorkspaceError {
                        message: format!("{e:#}"),
                    },
                );
            }
        };

        let mut outcome = self.homeworks.run(homework, workspace.path(), ctx).await;
        // Report paths inside the submission, the copy is about to go away.
        outcome.rebase_paths(workspace.path(), &source);
        // Dropping the workspace removes the copy, whatever the outcome.
        drop(workspace);
        outcome
    }
}
