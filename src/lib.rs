// Recourse - statically configured fallback chains for outbound requests
//
// A chain is an ordered list of alternative requests. The first one that can
// be built, sent, and answered with a 2xx status wins; anything else hands
// over to the next attempt.

// Re-export core functionality
pub use recourse_core::*;

// Re-export optional crates
#[cfg(feature = "http")]
pub use recourse_http;

#[cfg(feature = "http")]
pub use recourse_http::{
    Bindings, ChainConfig, ChainSpec, HttpError, HttpTransport, TransportConfig,
    TransportConfigBuilder,
};

// Prelude for common imports
pub mod prelude {
    pub use recourse_core::prelude::*;

    #[cfg(feature = "http")]
    pub use recourse_http::prelude::{
        Bindings, ChainConfig, ChainSpec, HttpError, HttpTransport, TransportConfig,
    };
}
