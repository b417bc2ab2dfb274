//! HTTP boundary for the Quay gateway.
//!
//! Exposes the cache and chain-retrieval core over three endpoints:
//! record lookup by hex identity (with chain-fetch fallback on a miss),
//! value-prefix listing, and proof-of-work-gated submission. Routing,
//! TLS, and rate limiting beyond CORS are left to fronting
//! infrastructure.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::GatewayConfig;
pub use error::{ApiError, GatewayError, GatewayResult};
pub use handler::{AppState, RecordJson, SharedState};
pub use router::build_router;
pub use server::Gateway;
