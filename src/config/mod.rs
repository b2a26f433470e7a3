// src/config/mod.rs

//! Job file loading and validation.
//!
//! Responsibilities:
//! - Define the serde-backed job file shape and the validated job model
//!   (`model.rs`).
//! - Load a job file from disk, YAML or TOML (`loader.rs`).
//! - Validate it into a [`JobSpec`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    DATE_PATTERN, ExpectedOutput, Homework, JobSpec, RawExpectedOutput, RawHomework, RawJobFile,
    RawTask, RawTest, Task, Test,
};
