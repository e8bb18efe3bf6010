//! Rate-limited streaming gateway for an AI writing assistant.
//!
//! Accepts text-generation requests, enforces a per-client fixed-window
//! rate budget, forwards to an OpenAI-compatible upstream in streaming
//! mode, and relays the output back as chunked plain text.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod rate_limit;
pub mod relay;
pub mod routes;
pub mod state;
pub mod upstream;

pub use error::GatewayError;
pub use routes::build_router;
pub use state::AppState;
