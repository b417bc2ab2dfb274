use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::time::millis_to_bytes;

/// The immutable content-addressed unit stored and exchanged by the gateway.
///
/// A record is never mutated in place: an update replaces the whole cache
/// entry. Records are destroyed only by the pruner's eviction sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque byte payload.
    pub value: Bytes,
    /// Random bytes bound into the proof-of-work.
    pub salt: Vec<u8>,
    /// Proof-of-work output; doubles as the record's identity.
    pub work: RecordId,
    /// Creation time, unix milliseconds. Used in weight decay.
    pub timestamp: i64,
    /// Identity of the preceding chain fragment. `None` marks the start
    /// of a chain.
    pub prev: Option<RecordId>,
    /// Optional content-type-like label.
    pub tag: Option<String>,
}

impl Record {
    pub fn new(
        value: impl Into<Bytes>,
        salt: Vec<u8>,
        work: RecordId,
        timestamp: i64,
    ) -> Self {
        Self {
            value: value.into(),
            salt,
            work,
            timestamp,
            prev: None,
            tag: None,
        }
    }

    /// Link this record to the preceding fragment of a chain.
    pub fn with_prev(mut self, prev: RecordId) -> Self {
        self.prev = Some(prev);
        self
    }

    /// Attach a content-type-like tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// The record's identity (its proof-of-work bytes).
    pub fn id(&self) -> RecordId {
        self.work
    }

    /// Timestamp in the byte form bound into the proof-of-work hash.
    pub fn time_bytes(&self) -> [u8; 8] {
        millis_to_bytes(self.timestamp)
    }

    /// Returns `true` if this record terminates a chain walk.
    pub fn is_chain_start(&self) -> bool {
        self.prev.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new(b"payload".as_slice(), vec![1, 2, 3], RecordId::new([9; 32]), 1_000)
    }

    #[test]
    fn id_is_work() {
        let rec = sample();
        assert_eq!(rec.id(), RecordId::new([9; 32]));
    }

    #[test]
    fn chain_start_without_prev() {
        let rec = sample();
        assert!(rec.is_chain_start());

        let linked = sample().with_prev(RecordId::new([1; 32]));
        assert!(!linked.is_chain_start());
        assert_eq!(linked.prev, Some(RecordId::new([1; 32])));
    }

    #[test]
    fn tag_is_carried() {
        let rec = sample().with_tag("text/plain");
        assert_eq!(rec.tag.as_deref(), Some("text/plain"));
    }

    #[test]
    fn time_bytes_match_helper() {
        let rec = sample();
        assert_eq!(rec.time_bytes(), millis_to_bytes(1_000));
    }

    #[test]
    fn serde_roundtrip() {
        let rec = sample().with_prev(RecordId::new([2; 32])).with_tag("t");
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, parsed);
    }
}
