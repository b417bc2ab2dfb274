//! Foundation types for the Quay gateway.
//!
//! This crate provides the core identity and record types used throughout
//! the Quay system. Every other Quay crate depends on `quay-types`.
//!
//! # Key Types
//!
//! - [`RecordId`] — 32-byte record identity (the proof-of-work output bytes)
//! - [`CacheAddress`] — two-level cache location derived from a [`RecordId`]
//! - [`Record`] — the content-addressed unit stored and exchanged

pub mod error;
pub mod id;
pub mod record;
pub mod time;

pub use error::TypeError;
pub use id::{CacheAddress, RecordId};
pub use record::Record;
pub use time::{millis_from_bytes, millis_to_bytes, unix_millis_now};
