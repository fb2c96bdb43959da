//! Transport collaborator contract.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::sync::Arc;
use url::Url;

use crate::Result;

/// A fully validated request, ready to go over the wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute target URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Encoded request body.
    pub body: Option<Bytes>,
}

/// Status and payload returned by a transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response payload.
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response without headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Check if the status falls in `200..=299`.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Performs one request/response exchange.
///
/// Implementations own timeouts and connection pooling; a timed out or
/// unreachable exchange is reported as [`crate::FallbackError::Transport`].
pub trait Transport: Send + Sync {
    /// Send the request and return whatever status the remote end produced.
    fn send(&self, request: PreparedRequest) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
        (**self).send(request)
    }
}
