//! Unified error types for the GRIM workspace
//!
//! [`GrimError`] covers the failures that surface at crate boundaries: file
//! access, table parsing, and malformed configuration. Algorithm crates keep
//! their own domain errors and convert into `GrimError` only where a caller
//! wants uniform handling.
//!
//! # Example
//!
//! ```ignore
//! use grim_core::{GrimError, GrimResult};
//!
//! fn load(path: &str) -> GrimResult<()> {
//!     let tables = read_tables(path)?;
//!     check(&tables)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for GRIM I/O and configuration handling.
#[derive(Error, Debug)]
pub enum GrimError {
    /// I/O errors (missing files, permissions)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/TOML parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Table content that is readable but inconsistent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GrimError.
pub type GrimResult<T> = Result<T, GrimError>;

impl From<anyhow::Error> for GrimError {
    fn from(err: anyhow::Error) -> Self {
        GrimError::Other(err.to_string())
    }
}

impl From<csv::Error> for GrimError {
    fn from(err: csv::Error) -> Self {
        GrimError::Parse(err.to_string())
    }
}

impl From<String> for GrimError {
    fn from(s: String) -> Self {
        GrimError::Other(s)
    }
}

impl From<&str> for GrimError {
    fn from(s: &str) -> Self {
        GrimError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GrimError::Config("unknown technology 'coal'".into());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("coal"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GrimError = io_err.into();
        assert!(matches!(err, GrimError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> GrimResult<()> {
            Err(GrimError::Validation("negative reactance".into()))
        }

        fn outer() -> GrimResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(GrimError::Validation(_))));
    }
}
