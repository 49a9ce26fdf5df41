//! Unified error types for the sitecover crates
//!
//! [`SiteCoverError`] is the common error representation at API boundaries.
//! Algorithm modules keep narrower error enums and convert into it, so callers
//! can match on the category (validation, configuration, CRS, solver) without
//! knowing which stage raised it.
//!
//! # Example
//!
//! ```ignore
//! use sitecover_core::{SiteCoverError, SiteCoverResult};
//!
//! fn run(path: &str) -> SiteCoverResult<()> {
//!     let demand = load_demand(path)?;
//!     demand.validate()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all sitecover operations.
#[derive(Error, Debug)]
pub enum SiteCoverError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input data validation errors (non-finite coordinates, duplicates, empty sets)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (threshold, facility budget, time limit)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Coordinate reference system errors (geographic or mismatched layers)
    #[error("CRS error: {0}")]
    Crs(String),

    /// Solver backend failures unrelated to the model
    #[error("Solver error: {0}")]
    Solver(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using SiteCoverError.
pub type SiteCoverResult<T> = Result<T, SiteCoverError>;

impl SiteCoverError {
    /// True for errors caused by the inputs or configuration rather than the solver.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SiteCoverError::Validation(_) | SiteCoverError::Config(_) | SiteCoverError::Crs(_)
        )
    }
}

impl From<anyhow::Error> for SiteCoverError {
    fn from(err: anyhow::Error) -> Self {
        SiteCoverError::Other(err.to_string())
    }
}

impl From<String> for SiteCoverError {
    fn from(s: String) -> Self {
        SiteCoverError::Other(s)
    }
}

impl From<&str> for SiteCoverError {
    fn from(s: &str) -> Self {
        SiteCoverError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for SiteCoverError {
    fn from(err: serde_json::Error) -> Self {
        SiteCoverError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for SiteCoverError {
    fn from(err: toml::de::Error) -> Self {
        SiteCoverError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SiteCoverError::Config("facility budget must be positive".into());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("facility budget"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SiteCoverError = io_err.into();
        assert!(matches!(err, SiteCoverError::Io(_)));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_user_error_classification() {
        assert!(SiteCoverError::Validation("x".into()).is_user_error());
        assert!(SiteCoverError::Crs("x".into()).is_user_error());
        assert!(!SiteCoverError::Solver("x".into()).is_user_error());
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> SiteCoverResult<()> {
            Err(SiteCoverError::Validation("test".into()))
        }

        fn outer() -> SiteCoverResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
