// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{JobSpec, RawJobFile};
use crate::errors::{CheckerError, Result};

/// Load a job file from a given path and return the raw `RawJobFile`.
///
/// The format is picked from the extension (`.yml`/`.yaml` or `.toml`).
/// This only performs deserialization; it does **not** validate the model.
/// Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawJobFile> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("yml" | "yaml") => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&contents)?)
        }
        Some("toml") => {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        }
        _ => Err(CheckerError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load a job file and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads YAML or TOML.
/// - Validates the model (see [`JobSpec::try_from`]).
/// - Resolves the submission `folder` against the job file directory and
///   uses that directory as `JOB_ROOT`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<JobSpec> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    let job_dir = job_file_dir(path);
    let spec = JobSpec::try_from(raw)?;

    let root = resolve_folder(&spec.root, &job_dir);
    debug!(root = ?root, job_dir = ?job_dir, "resolved job folders");

    Ok(JobSpec {
        root,
        job_dir,
        ..spec
    })
}

/// Directory containing the job file.
///
/// A bare filename like `job.yml` (parent = "") falls back to the current
/// working directory.
fn job_file_dir(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    absolute(&parent)
}

/// Resolve a `folder` value from the job file.
///
/// - absolute paths are kept
/// - `~/...` is expanded with `$HOME`
/// - anything else is relative to the job file directory
fn resolve_folder(folder: &Path, job_dir: &Path) -> PathBuf {
    if folder.is_absolute() {
        return folder.to_path_buf();
    }
    if let Ok(rest) = folder.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    job_dir.join(folder)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_folder_is_resolved_against_job_dir() {
        let resolved = resolve_folder(Path::new("subs"), Path::new("/jobs"));
        assert_eq!(resolved, PathBuf::from("/jobs/subs"));
    }

    #[test]
    fn absolute_folder_is_kept() {
        let resolved = resolve_folder(Path::new("/data/subs"), Path::new("/jobs"));
        assert_eq!(resolved, PathBuf::from("/data/subs"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_from_path("job.json").unwrap_err();
        assert!(matches!(err, CheckerError::UnsupportedFormat(_)));
    }
}
