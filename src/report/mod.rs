// src/report/mod.rs

//! Rendering of a finished [`JobOutcome`].
//!
//! The engine never formats output itself; it hands the result tree over
//! and this module turns it into Markdown or JSON.

use std::path::Path;

use tracing::info;

use crate::engine::JobOutcome;
use crate::errors::Result;
use crate::types::ReportFormat;

pub mod markdown;

/// Render `outcome` in the requested format.
pub fn render(outcome: &JobOutcome, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Markdown => Ok(markdown::render(outcome)),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(outcome)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Write a rendered report to `path`, or to stdout when `path` is `None`.
pub fn write(report: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, report)?;
            info!(path = ?path, "report written");
        }
        None => print!("{report}"),
    }
    Ok(())
}
