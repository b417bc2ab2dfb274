//! Boundary between the Quay gateway and the external network engine.
//!
//! The engine itself (peer discovery, wire encoding, gossip, mining) is an
//! external collaborator. This crate models only what the gateway consumes:
//!
//! - [`NetEvent`] / [`NetRequest`] — the tagged messages crossing the
//!   boundary.
//! - [`EngineHandle`] — the channel halves the engine exposes.
//! - [`NetworkEngine`] — the synchronous submit seam for publishing
//!   newly accepted records.
//! - [`IngressConsumer`] — drains the observed-traffic feed into the cache.
//! - [`ChainFetcher`] — reconstructs multi-fragment objects by walking
//!   backward `prev` links across the boundary.

pub mod engine;
pub mod error;
pub mod fetch;
pub mod ingress;
pub mod message;

pub use engine::{EngineHandle, NetworkEngine, NoOpEngine};
pub use error::{FetchError, NetError, NetResult};
pub use fetch::{ChainFetcher, FetchConfig, FetchedObject};
pub use ingress::IngressConsumer;
pub use message::{NetEvent, NetRequest};
