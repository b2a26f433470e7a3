// src/errors.rs

//! Crate-wide error types.
//!
//! Only conditions that abort a whole run end up here (unreadable or invalid
//! job file, missing job root). Everything that goes wrong while checking a
//! submission is recorded in the result tree instead, see
//! [`crate::engine::FailureReason`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Job root folder does not exist: {0:?}")]
    MissingJobRoot(PathBuf),

    #[error("Unsupported job file format: {0:?} (expected .yml, .yaml or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CheckerError>;
