//! Error types for origin-field.
//!
//! Every variant is a configuration error raised before integration begins.
//! Stepping itself never fails; floating-point degeneracies propagate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("shape mismatch for field '{field}': expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        field: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("constraint epsilon must be finite and positive, got {0}")]
    InvalidEpsilon(f64),

    #[error("invalid coupling: {0}")]
    InvalidCoupling(String),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid combination: {0}")]
    InvalidCombination(String),

    #[error("potential covers {found} fields but the field set has {expected}")]
    FieldCountMismatch { expected: usize, found: usize },

    #[error("integration has already started; configuration is frozen")]
    IntegrationStarted,
}

pub type Result<T> = std::result::Result<T, FieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shape_mismatch() {
        let err = FieldError::ShapeMismatch {
            field: "phi".into(),
            expected: vec![4, 4],
            found: vec![4, 3],
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch for field 'phi': expected [4, 4], found [4, 3]"
        );
    }

    #[test]
    fn display_invalid_epsilon() {
        let err = FieldError::InvalidEpsilon(-0.5);
        assert!(err.to_string().contains("-0.5"));
    }

    #[test]
    fn error_trait_object() {
        let err = FieldError::IntegrationStarted;
        let dyn_err: &dyn std::error::Error = &err;
        assert!(dyn_err.to_string().contains("already started"));
    }
}
