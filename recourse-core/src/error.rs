//! Fallback chain error types.

use thiserror::Error;

/// Result type for fallback chain operations.
pub type Result<T> = std::result::Result<T, FallbackError>;

/// Failure taxonomy of a single attempt.
///
/// The first three variants are recoverable: an attempt failing with one of
/// them hands over to the next node in the chain. [`FallbackError::Decode`]
/// is always reported to the caller, and [`FallbackError::BodyEncoding`] only
/// ever occurs while a node is being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackError {
    /// The request could not be built (bad method, target or header).
    /// Nothing was sent over the wire.
    #[error("Failed to build request: {0}")]
    RequestConstruction(String),

    /// The request was handed to the transport but no usable response came back.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response arrived with a status outside `200..=299`.
    #[error("Unsuccessful status code: {status}")]
    ApplicationStatus {
        /// Status code returned by the remote end.
        status: u16,
    },

    /// The response payload could not be parsed into its target.
    #[error("Unable to parse HTTP response body: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    BodyEncoding(String),
}

impl FallbackError {
    /// Check if this error hands over to the next node in the chain.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequestConstruction(_) | Self::Transport(_) | Self::ApplicationStatus { .. }
        )
    }

    /// Check if this is a request construction error.
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::RequestConstruction(_))
    }

    /// Check if this is a transport error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a payload decoding error.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Get the HTTP status code if this is an application status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApplicationStatus { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<http::Error> for FallbackError {
    fn from(error: http::Error) -> Self {
        Self::RequestConstruction(error.to_string())
    }
}

impl From<url::ParseError> for FallbackError {
    fn from(error: url::ParseError) -> Self {
        Self::RequestConstruction(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_variants() {
        assert!(FallbackError::RequestConstruction("bad".into()).is_recoverable());
        assert!(FallbackError::Transport("refused".into()).is_recoverable());
        assert!(FallbackError::ApplicationStatus { status: 404 }.is_recoverable());
        assert!(!FallbackError::Decode("eof".into()).is_recoverable());
        assert!(!FallbackError::BodyEncoding("map key".into()).is_recoverable());
    }

    #[test]
    fn test_status_code() {
        let err = FallbackError::ApplicationStatus { status: 502 };
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.to_string(), "Unsuccessful status code: 502");
        assert_eq!(FallbackError::Transport("x".into()).status_code(), None);
    }

    #[test]
    fn test_http_error_is_construction() {
        let invalid = http::HeaderName::from_bytes(b"bad header").unwrap_err();
        let err: FallbackError = http::Error::from(invalid).into();
        assert!(err.is_construction());
        assert!(err.to_string().starts_with("Failed to build request"));
    }

    #[test]
    fn test_url_parse_error_is_construction() {
        let err: FallbackError = url::Url::parse("not a url").unwrap_err().into();
        assert!(err.is_construction());
    }
}
