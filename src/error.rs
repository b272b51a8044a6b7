use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while loading corpus data or producing dashboard artifacts.
///
/// Anything that is merely "missing" inside an otherwise readable input
/// (an unknown taxonomy key, a focus word absent from the bigrams, an
/// out-of-range category) is not an error: those degrade to empty results.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("YAML error in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date or timestamp {value:?} in {}", .path.display())]
    Timestamp { path: PathBuf, value: String },

    #[error("Missing column {column:?} in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("No {0} configured in the data sources")]
    MissingSource(&'static str),

    #[error("Plotting failed: {0}")]
    Plot(String),
}

impl ExplorerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExplorerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        ExplorerError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
