//! Error types for the digest pipeline.
//!
//! All errors use stable string messages suitable for display to users
//! and for structured HTTP error responses. No API keys or webhook URLs
//! appear in error messages.

/// Top-level error type for the digest system.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// Required environment configuration is missing or invalid.
    ///
    /// Carries the name of every missing variable, not just the first.
    #[error("missing required configuration: {}", .0.join(", "))]
    Config(Vec<String>),

    /// Task database query error (HTTP client construction or transport).
    #[error("query error: {0}")]
    Query(String),

    /// Webhook notification error (non-2xx response or transport failure).
    #[error("notify error: {0}")]
    Notify(String),

    /// Send-state persistence error.
    #[error("state error: {0}")]
    State(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config_lists_every_variable() {
        let err = BriefError::Config(vec![
            "NOTION_API_KEY".to_owned(),
            "SLACK_WEBHOOK_URL".to_owned(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing required configuration: NOTION_API_KEY, SLACK_WEBHOOK_URL"
        );
    }

    #[test]
    fn display_query() {
        let err = BriefError::Query("connection refused".into());
        assert_eq!(err.to_string(), "query error: connection refused");
    }

    #[test]
    fn display_notify() {
        let err = BriefError::Notify("webhook returned 404".into());
        assert_eq!(err.to_string(), "notify error: webhook returned 404");
    }

    #[test]
    fn display_state() {
        let err = BriefError::State("cannot write sent.json".into());
        assert_eq!(err.to_string(), "state error: cannot write sent.json");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BriefError>();
    }
}
