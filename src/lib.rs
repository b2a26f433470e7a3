// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{DATE_PATTERN, JobSpec, load_and_validate};
use crate::engine::Orchestrator;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - job file loading and validation
/// - the run orchestrator (real shell, real filesystem)
/// - report rendering and output
pub async fn run(args: CliArgs) -> Result<()> {
    let job = load_and_validate(&args.input)?;

    if args.dry_run {
        print_dry_run(&job);
        return Ok(());
    }

    let orchestrator = Orchestrator::with_options(args.engine_options());
    let outcome = orchestrator.run(&job).await?;

    let summary = outcome.summary();
    info!(
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        errors = summary.errors + summary.task_errors + summary.homework_errors,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "run complete"
    );

    let report = report::render(&outcome, args.format)?;
    report::write(&report, args.output.as_deref())?;
    Ok(())
}

/// Simple dry-run output: print homeworks, tasks and test commands.
fn print_dry_run(job: &JobSpec) {
    println!("hwcheck dry-run");
    println!("  root = {}", job.root.display());
    println!("  JOB_ROOT = {}", job.job_dir.display());
    println!();

    println!("homeworks ({}):", job.homeworks.len());
    for homework in &job.homeworks {
        println!("  - {} ({})", homework.name, homework.folder);
        if let Some(deadline) = homework.deadline {
            println!("      submit_by: {}", deadline.format(DATE_PATTERN));
        }
        for task in &homework.tasks {
            println!("      - {} ({})", task.name, task.folder);
            for test in &task.tests {
                println!("          - {}: {}", test.name, test.cmd);
                if let Some(kind) = test.output_kind {
                    println!("              output_type: {kind}");
                }
                if let Some(ref expected) = test.expected {
                    println!("              expected_output: {:?}", expected.render());
                }
                if let Some(timeout) = test.timeout {
                    println!("              timeout: {}s", timeout.as_secs_f64());
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
