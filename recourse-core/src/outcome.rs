//! Result of walking a chain.

use crate::FallbackError;

/// Final `(status, error)` pair reported for one chain execution.
///
/// `error` is only set when something could not be classified or decoded.
/// An application error whose body decoded cleanly is reported with its real
/// status and no error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Observed or synthesized status code.
    pub status: u16,
    /// Construction, transport or decode failure, if any.
    pub error: Option<FallbackError>,
    /// Name of the node whose result this is.
    pub served_by: String,
}

impl Outcome {
    /// Create an outcome.
    pub fn new(served_by: impl Into<String>, status: u16, error: Option<FallbackError>) -> Self {
        Self {
            status,
            error,
            served_by: served_by.into(),
        }
    }

    /// Check if the exchange completed without error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Check if the reported status falls in `200..=299`.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Split into the `(status, error)` pair.
    pub fn into_parts(self) -> (u16, Option<FallbackError>) {
        (self.status, self.error)
    }
}
