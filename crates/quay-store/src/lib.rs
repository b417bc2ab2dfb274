//! Bounded, weighted, content-addressed cache for the Quay gateway.
//!
//! The cache is an in-memory map from [`CacheAddress`](quay_types::CacheAddress)
//! to [`Record`](quay_types::Record), bounded by a configured capacity. When
//! the map grows past capacity, the [`Pruner`] retains only the
//! highest-weight records, where weight combines proof-of-work score and
//! recency.
//!
//! # Trust boundary
//!
//! Records enter through two deliberately distinct doors:
//!
//! - [`WeightedCache::insert_verified`] — for records the gateway itself
//!   admits (HTTP submissions). Proof-of-work is always checked.
//! - [`WeightedCache::insert_observed`] — for records observed on the
//!   network feed, where verification already happened upstream. Checking
//!   here is configurable ([`CacheConfig::verify_observed`]).
//!
//! # Design Rules
//!
//! 1. Records are immutable; an update replaces the whole map entry
//!    (last write wins per address).
//! 2. Reads never block on network I/O and run concurrently with each
//!    other; writes are exclusive.
//! 3. A prune sweep is atomic from a reader's perspective: the retained
//!    set is swapped in under a single write-lock acquisition.
//! 4. The store never panics on bad input — it returns explicit errors.

pub mod cache;
pub mod error;
pub mod pruner;
pub mod weight;

pub use cache::{CacheConfig, WeightedCache};
pub use error::{StoreError, StoreResult};
pub use pruner::Pruner;
pub use weight::weight;
