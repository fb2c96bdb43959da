//! Attempt nodes.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::{FallbackError, Logger, Outcome, PreparedRequest, Result, Sink, Transport};

/// What a single attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempted {
    /// The chain walk ends here with this outcome.
    Settled(Outcome),
    /// The attempt failed in a way the next node may recover from.
    Failed {
        /// Status to report should no fallback remain.
        status: u16,
        /// Cause of the failure.
        error: FallbackError,
    },
}

/// A link in a fallback chain.
///
/// [`AttemptNode`] is the stock implementation; callers may plug in their own.
/// `terminal` tells the attempt it has no fallback, so its failure is final.
pub trait Attempt: Send + Sync {
    /// Diagnostic label.
    fn name(&self) -> &str;

    /// Run the attempt once.
    fn attempt(&self, transport: &dyn Transport, terminal: bool) -> Attempted;
}

/// One fully resolved candidate request.
///
/// Only the contents of the output and error targets change after
/// construction, so a node may be executed any number of times and shared
/// between chains.
#[derive(Clone)]
pub struct AttemptNode {
    name: String,
    method: String,
    target: String,
    body: Option<Bytes>,
    headers: HashMap<String, String>,
    output: Option<Arc<dyn Sink>>,
    error_target: Option<Arc<dyn Sink>>,
    logger: Option<Arc<dyn Logger>>,
}

impl AttemptNode {
    /// Create a node without body, headers or targets.
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            target: target.into(),
            body: None,
            headers: HashMap::new(),
            output: None,
            error_target: None,
            logger: None,
        }
    }

    /// Set the encoded request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Replace the request headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Add a single request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the target that successful payloads decode into.
    pub fn with_output(mut self, output: Arc<dyn Sink>) -> Self {
        self.output = Some(output);
        self
    }

    /// Set the target that terminal error payloads decode into.
    pub fn with_error_target(mut self, error_target: Arc<dyn Sink>) -> Self {
        self.error_target = Some(error_target);
        self
    }

    /// Set the failure event logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Get the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the encoded request body.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Get the request headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Check if an output target is attached.
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Check if an error target is attached.
    pub fn has_error_target(&self) -> bool {
        self.error_target.is_some()
    }

    /// Check if a logger is attached.
    pub fn has_logger(&self) -> bool {
        self.logger.is_some()
    }

    /// Build the physical request.
    pub fn build_request(&self) -> Result<PreparedRequest> {
        let method = Method::from_bytes(self.method.as_bytes()).map_err(http::Error::from)?;
        let url = Url::parse(&self.target)?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(http::Error::from)?;
            let value = HeaderValue::from_str(value).map_err(http::Error::from)?;
            headers.insert(name, value);
        }

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body: self.body.clone(),
        })
    }

    fn report(&self, message: impl FnOnce() -> String) {
        if let Some(logger) = &self.logger {
            logger.log(&message());
        }
    }

    fn fail(&self, error: FallbackError, status: StatusCode, terminal: bool) -> Attempted {
        self.report(|| format!("{} failed: {}", self.name, error));

        let status = status.as_u16();
        if terminal {
            Attempted::Settled(Outcome::new(&self.name, status, Some(error)))
        } else {
            Attempted::Failed { status, error }
        }
    }

    // A missing target is a decode failure; the payload has nowhere to go.
    fn deliver(&self, sink: Option<&dyn Sink>, status: u16, payload: &[u8]) -> Outcome {
        let error = match sink {
            Some(sink) => sink.fill(payload).err(),
            None => Some(FallbackError::Decode("no target to decode into".to_string())),
        };
        Outcome::new(&self.name, status, error)
    }
}

impl Attempt for AttemptNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, transport: &dyn Transport, terminal: bool) -> Attempted {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(error) => return self.fail(error, StatusCode::BAD_REQUEST, terminal),
        };

        let response = match transport.send(request) {
            Ok(response) => response,
            Err(error) => return self.fail(error, StatusCode::SERVICE_UNAVAILABLE, terminal),
        };

        let status = response.status.as_u16();
        if response.is_success() {
            return Attempted::Settled(self.deliver(self.output.as_deref(), status, &response.body));
        }

        self.report(|| format!("{} returned HTTP Error: {}", self.name, status));

        if terminal {
            Attempted::Settled(self.deliver(self.error_target.as_deref(), status, &response.body))
        } else {
            Attempted::Failed {
                status,
                error: FallbackError::ApplicationStatus { status },
            }
        }
    }
}

impl fmt::Debug for AttemptNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptNode")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("target", &self.target)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("headers", &self.headers)
            .field("output", &self.output.is_some())
            .field("error_target", &self.error_target.is_some())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
