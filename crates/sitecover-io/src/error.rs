//! Errors raised while reading point layers and artifacts.

use sitecover_core::SiteCoverError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot infer format of {0} (expected .csv, .geojson or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {message}")]
    BadRow { row: usize, message: String },

    #[error("feature {feature}: {message}")]
    BadFeature { feature: usize, message: String },

    #[error("feature {feature} has {kind} geometry; only Point features are supported")]
    NonPointGeometry { feature: usize, kind: String },

    #[error("cost matrix is incomplete: {0}")]
    IncompleteMatrix(String),
}

impl From<ImportError> for SiteCoverError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedFormat(_) => SiteCoverError::Config(err.to_string()),
            ImportError::NonPointGeometry { .. } | ImportError::IncompleteMatrix(_) => {
                SiteCoverError::Validation(err.to_string())
            }
            _ => SiteCoverError::Parse(err.to_string()),
        }
    }
}
