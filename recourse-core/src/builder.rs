//! Node builder and chain director.

use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{AttemptNode, Chain, Codec, JsonCodec, Logger, Result, Sink};

/// Header injected on JSON nodes without explicit headers.
pub const JSON_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

type EncodeFn<C> = Box<dyn FnOnce(&C) -> Result<Vec<u8>> + Send>;

enum PendingBody<C> {
    Raw(Bytes),
    Encode(EncodeFn<C>),
}

/// Collects the configuration of one node.
///
/// Nothing is validated or encoded until [`ChainDirector::create`] runs.
pub struct NodeBuilder<C = JsonCodec> {
    name: String,
    method: String,
    target: String,
    returns_json: bool,
    body: Option<PendingBody<C>>,
    headers: Option<HashMap<String, String>>,
    output: Option<Arc<dyn Sink>>,
    error_target: Option<Arc<dyn Sink>>,
    logger: Option<Arc<dyn Logger>>,
    fallback: Option<Chain>,
    codec: C,
    encoded_body: bool,
}

impl NodeBuilder {
    /// Start a node encoding its body as JSON.
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::with_codec(name, method, target, JsonCodec)
    }

    /// Start a GET node.
    pub fn get(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, "GET", target)
    }

    /// Start a POST node.
    pub fn post(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, "POST", target)
    }
}

impl<C: Codec> NodeBuilder<C> {
    /// Start a node encoding its body with `codec`.
    pub fn with_codec(
        name: impl Into<String>,
        method: impl Into<String>,
        target: impl Into<String>,
        codec: C,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            target: target.into(),
            returns_json: false,
            body: None,
            headers: None,
            output: None,
            error_target: None,
            logger: None,
            fallback: None,
            codec,
            encoded_body: false,
        }
    }

    /// Mark the node as exchanging JSON.
    ///
    /// Adds `Content-Type: application/json` unless explicit headers are
    /// given, or the codec's media type when the body was codec-encoded.
    /// Explicit headers replace this default entirely.
    pub fn json(mut self, returns_json: bool) -> Self {
        self.returns_json = returns_json;
        self
    }

    /// Set a body to be serialized by the node's codec.
    pub fn body<T>(mut self, value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        self.body = Some(PendingBody::Encode(Box::new(move |codec: &C| codec.encode(&value))));
        self
    }

    /// Set an already encoded body.
    pub fn raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(PendingBody::Raw(body.into()));
        self
    }

    /// Add an explicit header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add explicit headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let explicit = self.headers.get_or_insert_with(HashMap::new);
        for (name, value) in headers {
            explicit.insert(name.into(), value.into());
        }
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Set basic authentication.
    pub fn basic_auth(self, username: impl Into<String>, password: Option<impl Into<String>>) -> Self {
        let credentials = match password {
            Some(p) => format!("{}:{}", username.into(), p.into()),
            None => format!("{}:", username.into()),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Set the target successful payloads decode into.
    pub fn output(mut self, output: impl Sink + 'static) -> Self {
        self.output = Some(Arc::new(output));
        self
    }

    /// Set the target terminal error payloads decode into.
    pub fn error_target(mut self, error_target: impl Sink + 'static) -> Self {
        self.error_target = Some(Arc::new(error_target));
        self
    }

    /// Share an existing output target.
    pub fn shared_output(mut self, output: Arc<dyn Sink>) -> Self {
        self.output = Some(output);
        self
    }

    /// Share an existing error target.
    pub fn shared_error_target(mut self, error_target: Arc<dyn Sink>) -> Self {
        self.error_target = Some(error_target);
        self
    }

    /// Set the failure event logger.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Set the chain to fall back to.
    pub fn fallback(mut self, fallback: &Chain) -> Self {
        self.fallback = Some(fallback.clone());
        self
    }

    /// Assemble through the default director.
    pub fn build(self) -> Result<Chain> {
        ChainDirector::new().create(self)
    }

    fn create_node(&self) -> AttemptNode {
        AttemptNode::new(self.name.clone(), self.method.clone(), self.target.clone())
    }

    fn add_body(&mut self, node: AttemptNode) -> Result<AttemptNode> {
        let body = match self.body.take() {
            Some(PendingBody::Raw(bytes)) => bytes,
            Some(PendingBody::Encode(encode)) => {
                self.encoded_body = true;
                Bytes::from(encode(&self.codec)?)
            }
            None => return Ok(node),
        };
        Ok(node.with_body(body))
    }

    fn add_headers(&mut self, node: AttemptNode) -> AttemptNode {
        match self.headers.take() {
            Some(explicit) if !explicit.is_empty() => node.with_headers(explicit),
            _ if self.returns_json => node.with_header(JSON_CONTENT_TYPE.0, self.default_content_type()),
            _ => node,
        }
    }

    fn default_content_type(&self) -> &'static str {
        if self.encoded_body {
            self.codec.content_type()
        } else {
            JSON_CONTENT_TYPE.1
        }
    }

    fn add_targets(&mut self, mut node: AttemptNode) -> AttemptNode {
        if let Some(output) = self.output.take() {
            node = node.with_output(output);
        }
        if let Some(error_target) = self.error_target.take() {
            node = node.with_error_target(error_target);
        }
        if let Some(logger) = self.logger.take() {
            node = node.with_logger(logger);
        }
        node
    }

    fn add_fallback(&mut self, node: AttemptNode) -> Chain {
        let chain = Chain::new(node);
        match self.fallback.take() {
            Some(fallback) => chain.fallback_to(&fallback),
            None => chain,
        }
    }
}

/// Drives a [`NodeBuilder`] through node construction in a fixed order:
/// name/method/target, body, headers, targets, fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainDirector;

impl ChainDirector {
    /// Create a director.
    pub fn new() -> Self {
        Self
    }

    /// Build the node without wiring its fallback.
    pub fn create_node<C: Codec>(&self, mut builder: NodeBuilder<C>) -> Result<AttemptNode> {
        Self::assemble(&mut builder)
    }

    /// Build the node and prepend it to its fallback chain.
    ///
    /// A body that fails to encode aborts construction; no chain is returned.
    pub fn create<C: Codec>(&self, mut builder: NodeBuilder<C>) -> Result<Chain> {
        let node = Self::assemble(&mut builder)?;
        let chain = builder.add_fallback(node);

        debug!(node = %builder.name, len = chain.len(), "Created attempt chain");
        Ok(chain)
    }

    fn assemble<C: Codec>(builder: &mut NodeBuilder<C>) -> Result<AttemptNode> {
        let node = builder.create_node();
        let node = builder.add_body(node)?;
        let node = builder.add_headers(node);
        Ok(builder.add_targets(node))
    }
}
