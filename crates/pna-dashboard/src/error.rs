//! Error types for the dashboard process
//!
//! [`DashboardError`] covers configuration and serving. Request-level
//! failures are [`ApiError`](crate::server::ApiError).

/// Process-level failures
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP server stopped with an error
    #[error("server error: {0}")]
    Server(String),
}

/// Result type alias for process-level operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_stage() {
        let err = DashboardError::Config("PGSQL_HOST is not set".into());
        assert_eq!(err.to_string(), "configuration error: PGSQL_HOST is not set");
        let err = DashboardError::Server("address in use".into());
        assert_eq!(err.to_string(), "server error: address in use");
    }
}
