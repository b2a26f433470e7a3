// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::OutputKind;

/// Date pattern used by `submit_by`, e.g. `"2030-01-31 23:59:59"`.
pub const DATE_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Top-level job file as read from YAML or TOML.
///
/// ```yaml
/// folder: submissions
/// homeworks:
///   - name: Sample homework
///     folder: homework_1
///     submit_by: "2030-01-01 00:00:00"
///     tasks:
///       - name: Build and run
///         folder: task_1
///         tests:
///           - name: Build
///             cmd: c++ -o main main.cpp
///           - name: Run
///             cmd: ./main
///             output_type: string
///             expected_output: Hello World!
///             timeout: 2.0
/// ```
///
/// This is only the deserialized shape. Use [`JobSpec::try_from`] (or
/// [`crate::config::load_and_validate`]) to get the validated job model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJobFile {
    /// Folder holding the submission, relative to the job file directory.
    pub folder: String,

    #[serde(default)]
    pub homeworks: Vec<RawHomework>,
}

/// One entry of `homeworks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHomework {
    pub name: String,
    pub folder: String,

    /// Deadline in [`DATE_PATTERN`] format. Informational only.
    #[serde(default)]
    pub submit_by: Option<String>,

    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

/// One entry of `tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTask {
    pub name: String,
    pub folder: String,

    #[serde(default)]
    pub tests: Vec<RawTest>,
}

/// One entry of `tests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTest {
    pub name: String,
    pub cmd: String,

    #[serde(default)]
    pub output_type: Option<OutputKind>,

    #[serde(default)]
    pub expected_output: Option<RawExpectedOutput>,

    /// Seconds. Absent means the command may run forever.
    #[serde(default)]
    pub timeout: Option<f64>,
}

/// `expected_output` exactly as written in the job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawExpectedOutput {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Validated job model consumed by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    /// Root of the checked submission. Homework folders live below it.
    pub root: PathBuf,

    /// Directory exported to commands as `JOB_ROOT` (fixtures live here).
    pub job_dir: PathBuf,

    pub homeworks: Vec<Homework>,
}

impl JobSpec {
    /// Build a job whose `JOB_ROOT` is the submission root itself.
    pub fn new(root: impl Into<PathBuf>, homeworks: Vec<Homework>) -> Self {
        let root = root.into();
        Self {
            job_dir: root.clone(),
            root,
            homeworks,
        }
    }

    pub fn with_job_dir(mut self, job_dir: impl Into<PathBuf>) -> Self {
        self.job_dir = job_dir.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Homework {
    pub name: String,
    pub folder: String,
    pub deadline: Option<NaiveDateTime>,
    pub tasks: Vec<Task>,
}

impl Homework {
    /// Whether the deadline (if any) lies before `now`.
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub folder: String,
    pub tests: Vec<Test>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    pub name: String,
    pub cmd: String,
    pub output_kind: Option<OutputKind>,
    pub expected: Option<ExpectedOutput>,
    pub timeout: Option<Duration>,
}

/// Expected value, already converted to the test's output kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedOutput {
    Text(String),
    Number(f64),
}

impl ExpectedOutput {
    /// Text form used when rendering mismatches.
    pub fn render(&self) -> String {
        match self {
            ExpectedOutput::Text(text) => text.clone(),
            ExpectedOutput::Number(value) => value.to_string(),
        }
    }
}
