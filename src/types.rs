use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the output of a test command is interpreted for verification.
///
/// - `String`: exact text comparison.
/// - `Number`: both sides parsed as `f64` and compared with IEEE equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    String,
    Number,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::String => f.write_str("string"),
            OutputKind::Number => f.write_str("number"),
        }
    }
}

/// Format of the rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Markdown
    }
}
