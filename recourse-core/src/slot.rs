//! Caller-owned decode targets.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

use crate::{Codec, JsonCodec, Result};

/// Destination for a response payload.
///
/// Nodes hold their output and error targets as `Arc<dyn Sink>`, so the same
/// target may be shared by several nodes and several chains. Filling a sink
/// overwrites whatever an earlier execution left behind.
pub trait Sink: Send + Sync {
    /// Decode `payload` and store the result.
    fn fill(&self, payload: &[u8]) -> Result<()>;
}

/// Shared, typed decode target.
///
/// Cloning a slot aliases the same storage: the clone handed to a node and
/// the one kept by the caller observe the same value.
pub struct Slot<T, C = JsonCodec> {
    value: Arc<Mutex<Option<T>>>,
    codec: C,
}

impl<T> Slot<T> {
    /// Create an empty slot decoding JSON payloads.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl<T, C> Slot<T, C> {
    /// Create an empty slot decoding with `codec`.
    pub fn with_codec(codec: C) -> Self {
        Self {
            value: Arc::new(Mutex::new(None)),
            codec,
        }
    }

    /// Check if a payload has been decoded into this slot.
    pub fn is_filled(&self) -> bool {
        self.value.lock().is_some()
    }

    /// Remove and return the decoded value.
    pub fn take(&self) -> Option<T> {
        self.value.lock().take()
    }

    /// Reset the slot to empty.
    pub fn clear(&self) {
        *self.value.lock() = None;
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.value.lock().as_ref())
    }
}

impl<T: Clone, C> Slot<T, C> {
    /// Get a copy of the decoded value.
    pub fn get(&self) -> Option<T> {
        self.value.lock().clone()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clone> Clone for Slot<T, C> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            codec: self.codec.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Slot<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot").field("value", &*self.value.lock()).finish()
    }
}

impl<T, C> Sink for Slot<T, C>
where
    T: DeserializeOwned + Send + 'static,
    C: Codec,
{
    fn fill(&self, payload: &[u8]) -> Result<()> {
        let decoded = self.codec.decode::<T>(payload)?;
        *self.value.lock() = Some(decoded);
        Ok(())
    }
}
