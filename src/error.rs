//! Error types for OrbitDesk
//!
//! Uses `thiserror` for ergonomic error handling with automatic `Display`
//! and `Error` trait implementations. The agent loop converts most of these
//! into answer payloads at the turn boundary; only store/config failures
//! are allowed to escape it.

use thiserror::Error;

/// The primary error type for OrbitDesk operations.
#[derive(Error, Debug)]
pub enum OrbitError {
    /// Configuration-related errors (invalid config, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model provider errors (API failures, timeouts, malformed responses).
    /// The conversation loop treats any of these as "model unavailable" and
    /// degrades to the retrieval fallback.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model requested a tool that is not in the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The model supplied arguments that do not satisfy the tool's declared
    /// schema (missing required field, wrong type).
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// A tool failed internally (catalog file unreadable, etc.). Domain
    /// misses like "order not found" are normal result payloads, not errors.
    #[error("Tool error: {0}")]
    Tool(String),

    /// Session/history store failures (corrupt session file, I/O).
    #[error("Store error: {0}")]
    Store(String),

    /// Retrieval index failures. When this happens on the fallback path the
    /// loop returns a generic apology; there is no further fallback.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Authentication failures (bad credentials, inactive session).
    #[error("Auth error: {0}")]
    Auth(String),

    /// Resource not found (sessions, users, catalog entries).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized `Result` type for OrbitDesk operations.
pub type Result<T> = std::result::Result<T, OrbitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrbitError::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_invalid_arguments_display() {
        let err = OrbitError::InvalidArguments {
            tool: "get_order_status".into(),
            reason: "missing required field 'order_id'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid arguments for tool 'get_order_status': missing required field 'order_id'"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: OrbitError = io_err.into();
        assert!(matches!(err, OrbitError::Io(_)));
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
