//! Error types for zdchf-core.

use thiserror::Error;

/// Result type alias for zdchf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for zdchf operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Malformed input tag.
    #[error("invalid input tag: {0:?}")]
    InvalidInputTag(String),

    /// A required product is absent from the event.
    #[error("product not found: no {kind} with tag '{tag}'")]
    ProductNotFound {
        /// Kind of product that was requested.
        kind: &'static str,
        /// Tag that was looked up.
        tag: String,
    },

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
