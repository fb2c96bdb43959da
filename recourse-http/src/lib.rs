//! # Recourse HTTP
//!
//! Blocking HTTP transport for `recourse-core` fallback chains, plus loading
//! of chain definitions from TOML or JSON files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recourse_core::{NodeBuilder, Slot};
//! use recourse_http::{HttpTransport, TransportConfig};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(
//!         TransportConfig::builder()
//!             .timeout(Duration::from_secs(5))
//!             .build(),
//!     )?;
//!
//!     let output: Slot<serde_json::Value> = Slot::new();
//!     let mirror = NodeBuilder::get("mirror", "https://mirror.example.com/items")
//!         .output(output.clone())
//!         .build()?;
//!     let chain = NodeBuilder::get("origin", "https://origin.example.com/items")
//!         .output(output.clone())
//!         .fallback(&mirror)
//!         .build()?;
//!
//!     let outcome = chain.execute(&transport);
//!     println!("Status: {}", outcome.status);
//!     Ok(())
//! }
//! ```
//!
//! ## From a Definition File
//!
//! ```rust,no_run
//! use recourse_core::{Slot, TracingLogger};
//! use recourse_http::{Bindings, ChainConfig};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChainConfig::from_file("chains.toml")?;
//!     let transport = config.transport()?;
//!
//!     let output: Slot<serde_json::Value> = Slot::new();
//!     let bindings = Bindings::new()
//!         .output(output.clone())
//!         .logger(Arc::new(TracingLogger));
//!
//!     if let Some(spec) = config.chain("status") {
//!         let outcome = spec.assemble(&bindings)?.execute(&transport);
//!         println!("{} served by {}", outcome.status, outcome.served_by);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod loader;

pub use client::HttpTransport;
pub use config::{TransportConfig, TransportConfigBuilder};
pub use error::{HttpError, Result};
pub use loader::{Bindings, ChainConfig, ChainSpec, FileFormat, NodeSpec};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::HttpTransport;
    pub use crate::config::{TransportConfig, TransportConfigBuilder};
    pub use crate::error::{HttpError, Result};
    pub use crate::loader::{Bindings, ChainConfig, ChainSpec};
}
