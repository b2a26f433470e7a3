// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::config::model::{
    DATE_PATTERN, ExpectedOutput, Homework, JobSpec, RawExpectedOutput, RawHomework, RawJobFile,
    RawTask, RawTest, Task, Test,
};
use crate::errors::{CheckerError, Result};
use crate::types::OutputKind;

/// Turn a deserialized job file into the validated job model.
///
/// This checks:
/// - there is at least one homework
/// - names, folders and commands are not blank
/// - timeouts are finite and positive
/// - `submit_by` follows [`DATE_PATTERN`]
/// - `number` expected values parse as `f64`
///
/// Paths are kept as written; [`crate::config::load_and_validate`] resolves
/// them against the job file location.
impl TryFrom<RawJobFile> for JobSpec {
    type Error = CheckerError;

    fn try_from(raw: RawJobFile) -> Result<Self> {
        ensure_not_blank(&raw.folder, "job", "folder")?;
        if raw.homeworks.is_empty() {
            return Err(schema("job file must contain at least one homework"));
        }

        let homeworks = raw
            .homeworks
            .into_iter()
            .map(convert_homework)
            .collect::<Result<Vec<_>>>()?;

        Ok(JobSpec::new(PathBuf::from(raw.folder), homeworks))
    }
}

fn convert_homework(raw: RawHomework) -> Result<Homework> {
    ensure_not_blank(&raw.name, "homework", "name")?;
    let ctx = format!("homework '{}'", raw.name);
    ensure_not_blank(&raw.folder, &ctx, "folder")?;

    let deadline = raw
        .submit_by
        .as_deref()
        .map(|s| parse_deadline(s, &ctx))
        .transpose()?;

    let tasks = raw
        .tasks
        .into_iter()
        .map(|task| convert_task(task, &ctx))
        .collect::<Result<Vec<_>>>()?;

    Ok(Homework {
        name: raw.name,
        folder: raw.folder,
        deadline,
        tasks,
    })
}

fn convert_task(raw: RawTask, parent: &str) -> Result<Task> {
    ensure_not_blank(&raw.name, parent, "task name")?;
    let ctx = format!("{parent}, task '{}'", raw.name);
    ensure_not_blank(&raw.folder, &ctx, "folder")?;

    let tests = raw
        .tests
        .into_iter()
        .map(|test| convert_test(test, &ctx))
        .collect::<Result<Vec<_>>>()?;

    Ok(Task {
        name: raw.name,
        folder: raw.folder,
        tests,
    })
}

fn convert_test(raw: RawTest, parent: &str) -> Result<Test> {
    ensure_not_blank(&raw.name, parent, "test name")?;
    let ctx = format!("{parent}, test '{}'", raw.name);
    ensure_not_blank(&raw.cmd, &ctx, "cmd")?;

    let timeout = raw
        .timeout
        .map(|secs| {
            if secs.is_finite() && secs > 0.0 {
                Ok(Duration::from_secs_f64(secs))
            } else {
                Err(schema(format!(
                    "{ctx}: timeout must be a positive number of seconds (got {secs})"
                )))
            }
        })
        .transpose()?;

    let expected = match (raw.output_type, raw.expected_output) {
        (_, None) => None,
        (None, Some(value)) => {
            warn!(
                test = %raw.name,
                "expected_output given without output_type; only the exit status is checked"
            );
            Some(convert_expected(OutputKind::String, value, &ctx)?)
        }
        (Some(kind), Some(value)) => Some(convert_expected(kind, value, &ctx)?),
    };

    Ok(Test {
        name: raw.name,
        cmd: raw.cmd,
        output_kind: raw.output_type,
        expected,
        timeout,
    })
}

fn convert_expected(
    kind: OutputKind,
    value: RawExpectedOutput,
    ctx: &str,
) -> Result<ExpectedOutput> {
    match kind {
        OutputKind::String => Ok(ExpectedOutput::Text(match value {
            RawExpectedOutput::Integer(i) => i.to_string(),
            // Debug keeps the `.0` of integral floats, `3.0` stays "3.0".
            RawExpectedOutput::Float(f) => format!("{f:?}"),
            RawExpectedOutput::Text(s) => s,
        })),
        OutputKind::Number => match value {
            RawExpectedOutput::Integer(i) => Ok(ExpectedOutput::Number(i as f64)),
            RawExpectedOutput::Float(f) => Ok(ExpectedOutput::Number(f)),
            RawExpectedOutput::Text(s) => s.trim().parse::<f64>().map(ExpectedOutput::Number).map_err(
                |e| schema(format!("{ctx}: expected_output '{s}' is not a number ({e})")),
            ),
        },
    }
}

fn parse_deadline(value: &str, ctx: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_PATTERN).map_err(|e| {
        schema(format!(
            "{ctx}: submit_by '{value}' does not match '{DATE_PATTERN}' ({e})"
        ))
    })
}

fn ensure_not_blank(value: &str, ctx: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(schema(format!("{ctx}: `{field}` must not be empty")));
    }
    Ok(())
}

fn schema(msg: impl Into<String>) -> CheckerError {
    CheckerError::Schema(msg.into())
}
