//! # Recourse Core
//!
//! A fallback chain for a single outbound request/response exchange. When an
//! attempt cannot be built, cannot be sent, or comes back with a status
//! outside `200..=299`, the next configured attempt runs in its place until
//! one succeeds or the chain is exhausted.
//!
//! This crate holds the engine only. Sending requests is delegated to a
//! [`Transport`] and payload (de)serialization to a [`Codec`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recourse_core::{NodeBuilder, Slot, Transport};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! struct Reply {
//!     text: String,
//! }
//!
//! fn run(transport: &dyn Transport) -> recourse_core::Result<()> {
//!     let output: Slot<Reply> = Slot::new();
//!
//!     let secondary = NodeBuilder::get("secondary", "https://b.example.com/status")
//!         .json(true)
//!         .output(output.clone())
//!         .build()?;
//!     let chain = NodeBuilder::get("primary", "https://a.example.com/status")
//!         .json(true)
//!         .output(output.clone())
//!         .fallback(&secondary)
//!         .build()?;
//!
//!     let outcome = chain.execute(transport);
//!     println!("{} from {}: {:?}", outcome.status, outcome.served_by, output.get());
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Handling
//!
//! | Failure                 | Falls back | Terminal status       |
//! |-------------------------|------------|-----------------------|
//! | request construction    | yes        | 400                   |
//! | transport               | yes        | 503                   |
//! | status outside 2xx      | yes        | the real status       |
//! | payload decoding        | no         | the observed status   |

mod builder;
mod chain;
mod codec;
mod error;
mod logger;
mod node;
mod outcome;
mod slot;
mod transport;

#[cfg(test)]
mod testing;

pub use builder::{ChainDirector, JSON_CONTENT_TYPE, NodeBuilder};
pub use chain::{Chain, ChainExecutor};
pub use codec::{Codec, FormCodec, JsonCodec};
pub use error::{FallbackError, Result};
pub use logger::{Logger, TracingLogger};
pub use node::{Attempt, AttemptNode, Attempted};
pub use outcome::Outcome;
pub use slot::{Sink, Slot};
pub use transport::{PreparedRequest, RawResponse, Transport};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, Method, StatusCode};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use recourse_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builder::{ChainDirector, NodeBuilder};
    pub use crate::chain::{Chain, ChainExecutor};
    pub use crate::codec::{Codec, FormCodec, JsonCodec};
    pub use crate::error::{FallbackError, Result};
    pub use crate::logger::{Logger, TracingLogger};
    pub use crate::node::{Attempt, AttemptNode, Attempted};
    pub use crate::outcome::Outcome;
    pub use crate::slot::{Sink, Slot};
    pub use crate::transport::{PreparedRequest, RawResponse, Transport};
}
