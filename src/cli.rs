// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::engine::EngineOptions;
use crate::types::ReportFormat;

/// Command-line arguments for `hwcheck`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hwcheck",
    version,
    about = "Check homework submissions against a declarative job file.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the job file (YAML or TOML).
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the report here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,

    /// Maximum number of tasks of one homework run concurrently.
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Run every homework in a scratch copy instead of in place.
    #[arg(long)]
    pub copy_submission: bool,

    /// Directory for scratch copies.
    ///
    /// Default: `homework_checker` in the system temp directory.
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Shell used to run test commands (default: `sh`, `cmd` on Windows).
    #[arg(long, value_name = "PATH")]
    pub shell: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HWCHECK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the job, but don't execute any commands.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn engine_options(&self) -> EngineOptions {
        let defaults = EngineOptions::default();
        EngineOptions {
            max_parallel_tasks: self.jobs.max(1),
            copy_submission: self.copy_submission,
            scratch_root: self.scratch_dir.clone().unwrap_or(defaults.scratch_root),
            shell: self.shell.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
