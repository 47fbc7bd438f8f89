//! Error types for the measurement batch.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while gathering, measuring or exporting.
#[derive(Debug, Error)]
pub enum EtlError {
    /// No shapefiles were given and none were found in the directories.
    #[error("no shapefiles were specified or found in the specified directories")]
    NoShapefiles,

    /// A shapefile could not be opened or read.
    #[error("shapefile error in {path}: {message}")]
    Shapefile { path: PathBuf, message: String },

    /// Writing the results table failed.
    #[error("export to {path} failed: {message}")]
    Export { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EtlError {
    pub(crate) fn shapefile(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Shapefile {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn export(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Export {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns `true` when the error concerns a single input file and the
    /// rest of the batch can carry on.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::Shapefile { .. })
    }
}

/// Convenience alias for batch results.
pub type EtlResult<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_per_file() {
        assert!(EtlError::shapefile("/data/a.shp", "bad header").is_per_file());
        assert!(!EtlError::NoShapefiles.is_per_file());
        assert!(!EtlError::export("/out/t.dbf", "disk full").is_per_file());
    }
}
