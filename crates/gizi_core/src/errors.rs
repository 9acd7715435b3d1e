use thiserror::Error;

use crate::classifier::ModelError;

/// Errors raised while encoding labels, predicting, or building reports.
#[derive(Debug, Error)]
pub enum GiziError {
    #[error("unknown category '{label}' for label table '{table}'")]
    UnknownCategory { table: String, label: String },

    #[error("unknown code {code} for label table '{table}'")]
    UnknownCode { table: String, code: usize },

    #[error("label table '{0}' is missing from the encoder artifact")]
    MissingTable(String),

    #[error("invalid label table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("feature shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = GiziError> = std::result::Result<T, E>;
