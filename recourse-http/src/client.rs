//! Blocking HTTP transport.

use http::{HeaderMap, HeaderName, HeaderValue};
use recourse_core::{FallbackError, PreparedRequest, RawResponse, Transport};
use std::sync::Arc;
use tracing::debug;

use crate::{HttpError, Result, TransportConfig};

/// Transport backed by a blocking `reqwest` client.
///
/// Each call blocks the calling thread until the exchange completes or the
/// configured timeout fires. Clones share the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::blocking::Client,
    config: Arc<TransportConfig>,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers(&config)?)
            .gzip(config.gzip)
            .brotli(config.brotli);

        if config.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        } else {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        let inner = builder.build()?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Create a transport with default configuration.
    pub fn default_transport() -> Result<Self> {
        Self::new(TransportConfig::default())
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.inner
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

fn default_headers(config: &TransportConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(config.default_headers.len());
    for (name, value) in &config.default_headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| HttpError::Config(format!("default header {name:?}: {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| HttpError::Config(format!("default header {name}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn transport_error(error: reqwest::Error) -> FallbackError {
    FallbackError::Transport(error.to_string())
}

impl Transport for HttpTransport {
    fn send(&self, request: PreparedRequest) -> recourse_core::Result<RawResponse> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = request;

        debug!(method = %method, url = %url, "Sending HTTP request");

        let mut builder = self.inner.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(transport_error)?;

        debug!(status = %status, bytes = body.len(), "Received HTTP response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
