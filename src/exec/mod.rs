// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands declared by
//! tests, using `tokio::process::Command`, and handing back what they
//! printed and how they ended.
//!
//! - [`backend`] provides the `CommandRunner` trait plus the request/output
//!   types, so the engine can be driven by a fake runner in tests.
//! - [`shell`] contains `ShellRunner`, the production runner: shell
//!   invocation, process groups, deadlines and output capture.

pub mod backend;
pub mod shell;

pub use backend::{
    CommandOutput, CommandRequest, CommandRunner, CommandStatus, JOB_ROOT_ENV, RunError,
};
pub use shell::ShellRunner;
