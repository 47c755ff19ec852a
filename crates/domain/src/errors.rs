//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CapexFlow
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum CapexFlowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-2xx response from the Sienge API. The message is taken from the
    /// JSON error body when one is present, otherwise it is the synthesized
    /// `HTTP <status>: <reason>` line.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for CapexFlow operations
pub type Result<T> = std::result::Result<T, CapexFlowError>;
