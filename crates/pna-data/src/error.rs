//! Error types for tables and the data façade

use std::path::PathBuf;

/// Table construction failures
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Row has the wrong number of cells
    #[error("row has {found} cells, table has {expected} columns")]
    RowWidth {
        /// Column count
        expected: usize,
        /// Cells supplied
        found: usize,
    },

    /// Value is not a split-orientation table
    #[error("not a split table: {0}")]
    Split(#[from] serde_json::Error),
}

/// Façade query and loading failures
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    /// Entity absent from the backing artifact
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    /// Artifact file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV artifact
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: csv::Error,
    },

    /// Malformed JSON artifact
    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Artifact parsed but lacks an expected column or shape
    #[error("unexpected layout in {}: {reason}", path.display())]
    Schema {
        /// Artifact path
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// Table assembly failed
    #[error(transparent)]
    Table(#[from] TableError),
}

impl FacadeError {
    /// Whether this is [`FacadeError::UnknownEntity`]
    #[inline]
    #[must_use]
    pub fn is_unknown_entity(&self) -> bool {
        matches!(self, Self::UnknownEntity(_))
    }
}
