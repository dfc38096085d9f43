//! Error types for origin-format.

use origin_field::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid run: {0}")]
    Field(#[from] FieldError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

pub type Result<T> = std::result::Result<T, FormatError>;
