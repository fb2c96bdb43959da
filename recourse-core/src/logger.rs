//! Failure event logging.

/// Receives a message each time a node fails, before the chain falls back
/// or settles on a terminal failure.
pub trait Logger: Send + Sync {
    /// Publish a failure event.
    fn log(&self, message: &str);
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Logger that forwards failure events to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::warn!(target: "recourse::fallback", "{}", message);
    }
}
