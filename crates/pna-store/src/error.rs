//! Repository errors

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Repository failures
///
/// Messages are flattened to strings so the error stays `Clone` and can be
/// shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Database unreachable or refused the connection
    #[error("connection error: {0}")]
    Connection(String),

    /// Statement failed
    #[error("query error: {0}")]
    Query(String),
}

impl StoreError {
    pub(crate) fn query(err: impl std::fmt::Display) -> Self {
        Self::Query(err.to_string())
    }

    pub(crate) fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }
}
