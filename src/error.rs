//! Error types for OCR evaluation.
//!
//! Every fallible operation in the crate returns [`Result`]. I/O errors bubble up
//! unchanged through `#[from]`; the other variants carry the offending value so a
//! failed corpus run can be traced back to the page, file or setting at fault.
//!
//! Empty denominators in rate computations are not errors: bag rates fall back to
//! zero and region correctness rates are reported as `None`.

use thiserror::Error;

/// Result type alias using [`EvalError`].
pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    /// The requested charset is neither a known class nor a valid regex pattern.
    #[error("Unknown charset '{name}': not a known class and not a valid pattern")]
    UnknownCharset { name: String },

    /// A predicted file or page has no groundtruth counterpart.
    #[error("Missing groundtruth for '{id}' (expected {expected})")]
    MissingGroundtruth { id: String, expected: String },

    /// A groundtruth page has no predicted page with the same id.
    #[error("Missing prediction for page '{id}'")]
    MissingPrediction { id: String },

    #[error("Invalid bounding box: ({xmin}, {ymin}, {xmax}, {ymax})")]
    InvalidBoundingBox { xmin: f64, ymin: f64, xmax: f64, ymax: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalError {
    pub fn unknown_charset(name: impl Into<String>) -> Self {
        Self::UnknownCharset { name: name.into() }
    }

    pub fn missing_groundtruth(id: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MissingGroundtruth {
            id: id.into(),
            expected: expected.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = EvalError::unknown_charset("cyrillic");
        assert!(err.to_string().contains("cyrillic"));

        let err = EvalError::missing_groundtruth("page_0001", "gt/page_0001.gt.txt");
        assert!(err.to_string().contains("page_0001"));
        assert!(err.to_string().contains("gt/page_0001.gt.txt"));
    }

    #[test]
    fn test_io_error_converts() {
        fn read() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here.txt")?)
        }
        assert!(matches!(read(), Err(EvalError::Io(_))));
    }
}
