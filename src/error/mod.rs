// src/error/mod.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read artifact {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode artifact {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown loss '{0}': register it as a custom object before loading")]
    UnknownLoss(String),

    #[error("invalid config for loss '{name}': {reason}")]
    LossConfig { name: String, reason: String },

    #[error("shape mismatch in {context}: expected {expected} columns, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("{context} contains NaN or infinity")]
    NonFinite { context: String },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),
}

impl ModelError {
    pub fn shape(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        ModelError::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

/// Per-request failures. These never reach the transport layer; the
/// controller turns them into an `Error: ...` verdict.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("could not convert string to float: '{value}' (field '{field}')")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{0}")]
    MalformedRequest(String),

    #[error("{0}")]
    Inference(#[from] ModelError),
}
