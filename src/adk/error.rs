// SPDX-License-Identifier: MIT

//! Typed error handling for intellicourse
//!
//! Collaborator traits keep the `Box<dyn Error + Send + Sync>` seam so that
//! adapters and test doubles can fail with anything; startup, configuration
//! and index loading use the typed errors below.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for intellicourse
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// API errors from external services (Gemini, Tavily)
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Configuration errors (missing env vars, invalid values, uninitialized collaborators)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted course index could not be opened or is unusable
    #[error("Index error: {0}")]
    Index(String),

    /// A collaborator call did not finish in time
    #[error("{operation} timed out after {limit:?}")]
    Timeout { operation: String, limit: Duration },

    /// Model/LLM-specific errors
    #[error(transparent)]
    Model(#[from] ModelError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Generic error wrapper for compatibility
    #[error("{0}")]
    Other(String),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Model not supported
    #[error("Model not supported: {0}")]
    UnsupportedModel(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl AdvisorError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an index error
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            limit,
        }
    }
}

impl From<&str> for AdvisorError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for AdvisorError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for AdvisorError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(err.to_string())
    }
}
