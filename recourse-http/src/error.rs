//! HTTP transport error types.

use recourse_core::FallbackError;
use thiserror::Error;

/// Result type for HTTP transport setup and chain loading.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Errors raised while setting up transports or loading chain definitions.
///
/// Failures of individual exchanges are reported as [`FallbackError`]s
/// through the chain instead.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The underlying client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Invalid transport configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A loaded definition failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A chain node could not be built.
    #[error(transparent)]
    Chain(#[from] FallbackError),
}
