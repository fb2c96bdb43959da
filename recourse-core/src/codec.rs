//! Body and payload codecs.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{FallbackError, Result};

/// Serializes request bodies and deserializes response payloads.
pub trait Codec: Send + Sync + 'static {
    /// Media type produced by [`Codec::encode`].
    fn content_type(&self) -> &'static str;

    /// Serialize a request body.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize a response payload.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| FallbackError::BodyEncoding(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| FallbackError::Decode(e.to_string()))
    }
}

/// URL-encoded form codec backed by `serde_urlencoded`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

impl Codec for FormCodec {
    fn content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_urlencoded::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| FallbackError::BodyEncoding(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_urlencoded::from_bytes(bytes).map_err(|e| FallbackError::Decode(e.to_string()))
    }
}
