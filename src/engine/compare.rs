// src/engine/compare.rs

//! Output comparator: decides whether a finished command passed.

use crate::config::ExpectedOutput;
use crate::engine::outcome::FailureReason;
use crate::exec::CommandStatus;
use crate::types::OutputKind;

/// Result of checking one command's output.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail(FailureReason),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Decide pass/fail for a finished command.
///
/// - No output kind: pass iff the exit status is 0, output is ignored.
/// - With an output kind a non-zero exit fails before comparing.
/// - `string`: exact text equality; one trailing line terminator is dropped
///   from each side, nothing else is normalised.
/// - `number`: both sides parsed as `f64` and compared with `==`, without
///   any tolerance: `0.1 + 0.2` does not equal `0.3`.
///
/// Timeouts never reach this function; the task executor reports them.
pub fn compare(
    kind: Option<OutputKind>,
    status: CommandStatus,
    captured: &str,
    expected: Option<&ExpectedOutput>,
) -> Verdict {
    if !status.success() {
        return Verdict::Fail(FailureReason::NonZeroExit {
            code: status.code(),
        });
    }

    match kind {
        None => Verdict::Pass,
        Some(OutputKind::String) => compare_text(captured, expected),
        Some(OutputKind::Number) => compare_number(captured, expected),
    }
}

fn compare_text(captured: &str, expected: Option<&ExpectedOutput>) -> Verdict {
    let Some(expected) = expected else {
        return Verdict::Pass;
    };
    let expected = expected.render();
    if strip_line_terminator(captured) == strip_line_terminator(&expected) {
        Verdict::Pass
    } else {
        Verdict::Fail(FailureReason::OutputMismatch {
            expected,
            actual: captured.to_string(),
            detail: None,
        })
    }
}

fn compare_number(captured: &str, expected: Option<&ExpectedOutput>) -> Verdict {
    let actual = match parse_number(captured) {
        Ok(value) => value,
        Err(detail) => {
            return Verdict::Fail(FailureReason::OutputMismatch {
                expected: expected.map(ExpectedOutput::render).unwrap_or_default(),
                actual: captured.to_string(),
                detail: Some(detail),
            });
        }
    };

    let expected_value = match expected {
        None => return Verdict::Pass,
        Some(ExpectedOutput::Number(value)) => *value,
        Some(ExpectedOutput::Text(text)) => match parse_number(text) {
            Ok(value) => value,
            Err(detail) => {
                return Verdict::Fail(FailureReason::OutputMismatch {
                    expected: text.clone(),
                    actual: captured.to_string(),
                    detail: Some(format!("expected value is not a number: {detail}")),
                });
            }
        },
    };

    if actual == expected_value {
        Verdict::Pass
    } else {
        Verdict::Fail(FailureReason::OutputMismatch {
            expected: expected_value.to_string(),
            actual: actual.to_string(),
            detail: None,
        })
    }
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| format!("could not convert {:?} to a number ({e})", text))
}

fn strip_line_terminator(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}
