//! In-memory transport for unit tests.

use bytes::Bytes;
use http::StatusCode;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{FallbackError, PreparedRequest, RawResponse, Result, Transport};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub(crate) struct Basic {
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Detail")]
    pub detail: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub(crate) struct BasicError {
    #[serde(rename = "Code")]
    pub code: u16,
    #[serde(rename = "Message")]
    pub message: String,
}

enum Script {
    Respond(StatusCode, Bytes),
    Unreachable,
}

/// Answers by exact URL; unknown URLs are unreachable.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
    sent: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.scripts.insert(
            url.to_string(),
            Script::Respond(status, Bytes::copy_from_slice(body.as_bytes())),
        );
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.scripts.insert(url.to_string(), Script::Unreachable);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<PreparedRequest> {
        self.sent.lock().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url.to_string();
        self.sent.lock().push(request);

        match self.scripts.get(&url) {
            Some(Script::Respond(status, body)) => Ok(RawResponse::new(*status, body.clone())),
            Some(Script::Unreachable) | None => {
                Err(FallbackError::Transport(format!("connection refused: {url}")))
            }
        }
    }
}
