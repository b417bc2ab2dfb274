//! Proof-of-work and addressing primitives for the Quay gateway.
//!
//! Two independent concerns live here:
//!
//! - [`pow`] — scoring and verification of a record's proof-of-work, plus
//!   a salt-search miner for publishers and tests. BLAKE3, domain-separated.
//! - [`addr`] — the content addresser mapping a 32-byte identity to a
//!   two-level [`CacheAddress`](quay_types::CacheAddress). This is a cache
//!   key, not a security boundary, so it uses a fast non-cryptographic
//!   64-bit hash (xxh3).
//!
//! All operations are pure functions — no locking, safe on hot paths.

pub mod addr;
pub mod pow;

pub use addr::{address_of, derive_address, AddressError};
pub use pow::{mine, stored_score, verify, work_hash, work_score};
