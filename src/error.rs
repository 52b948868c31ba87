//! Error types for TodoBot
//!
//! This module defines the application error type and the categorized
//! outcome of backend calls, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for TodoBot operations
///
/// Covers failures that can stop a CLI command: configuration loading,
/// output encoding, and HTTP client construction. Backend call failures are
/// reported through [`ApiError`] and turned into notifications by the
/// session; a one-shot command that cannot proceed reports `Command`.
#[derive(Error, Debug)]
pub enum TodobotError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A one-shot command could not do what was asked
    #[error("Command failed: {0}")]
    Command(String),
}

/// Categorized failure of a single backend call
///
/// Mirrors the three ways a request can go wrong from the operator's point
/// of view: the server said no, the request never completed, or the server
/// answered with something we could not read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend answered with a non-success status
    #[error("Backend rejected request with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Server-provided `detail` string, when the body carried one
        detail: Option<String>,
    },

    /// The request failed before a response arrived
    #[error("Connection error: {0}")]
    Transport(String),

    /// A success response whose body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided detail message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for TodoBot operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
