use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::RwLock;

use quay_crypto::{derive_address, pow};
use quay_types::{unix_millis_now, CacheAddress, Record, RecordId};

use crate::error::{StoreError, StoreResult};
use crate::weight::weight;

/// Cache tunables.
#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    /// Maximum number of records retained across a prune sweep.
    pub capacity: usize,
    /// Minimum proof-of-work score (leading zero bits) for verified inserts.
    pub min_work: i32,
    /// Whether to verify proof-of-work on records observed from the
    /// network feed. Off by default: the feed is trusted to have verified
    /// upstream.
    pub verify_observed: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 500_000,
            min_work: 16,
            verify_observed: false,
        }
    }
}

/// Concurrent, bounded, weighted record cache.
///
/// Internally a two-level map: shard key from the first half of the
/// identity bytes, slot key from the second half, both behind one
/// `RwLock`. Readers proceed concurrently; writers are exclusive.
pub struct WeightedCache {
    shards: RwLock<HashMap<u64, HashMap<u64, Record>>>,
    config: CacheConfig,
}

impl WeightedCache {
    /// Create an empty cache with the given tunables.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Admit a record the gateway itself accepted (HTTP submission).
    ///
    /// The proof-of-work is always scored; a score below the configured
    /// minimum is rejected and the record is never stored.
    pub fn insert_verified(&self, record: Record) -> StoreResult<CacheAddress> {
        self.check_work(&record)?;
        self.upsert(record)
    }

    /// Admit a record observed on the network feed.
    ///
    /// Verification already happened upstream; it is repeated here only
    /// when [`CacheConfig::verify_observed`] is set.
    pub fn insert_observed(&self, record: Record) -> StoreResult<CacheAddress> {
        if self.config.verify_observed {
            self.check_work(&record)?;
        }
        self.upsert(record)
    }

    fn check_work(&self, record: &Record) -> StoreResult<()> {
        let score = pow::work_score(
            &record.value,
            &record.time_bytes(),
            &record.salt,
            &record.work,
        );
        if score < self.config.min_work {
            return Err(StoreError::InsufficientWork {
                score,
                required: self.config.min_work,
            });
        }
        Ok(())
    }

    fn upsert(&self, record: Record) -> StoreResult<CacheAddress> {
        let addr = derive_address(record.work.as_bytes())?;
        let mut shards = self.shards.write().expect("lock poisoned");
        shards
            .entry(addr.shard)
            .or_default()
            .insert(addr.slot, record);
        Ok(addr)
    }

    /// Look up a record by identity. Never blocks on network I/O.
    pub fn get(&self, id: &RecordId) -> Option<Record> {
        let addr = quay_crypto::address_of(id);
        let shards = self.shards.read().expect("lock poisoned");
        shards.get(&addr.shard)?.get(&addr.slot).cloned()
    }

    /// Collect up to `limit` records whose value starts with `prefix`.
    ///
    /// The scan stops as soon as `limit` matches are found, bounding
    /// worst-case latency under adversarial prefixes. Iteration order is
    /// arbitrary.
    pub fn list_by_prefix(&self, prefix: &[u8], limit: usize) -> Vec<Record> {
        let mut out = Vec::new();
        if limit == 0 {
            return out;
        }
        let shards = self.shards.read().expect("lock poisoned");
        'scan: for bucket in shards.values() {
            for record in bucket.values() {
                if record.value.starts_with(prefix) {
                    out.push(record.clone());
                    if out.len() >= limit {
                        break 'scan;
                    }
                }
            }
        }
        out
    }

    /// Number of records currently cached.
    pub fn len(&self) -> usize {
        let shards = self.shards.read().expect("lock poisoned");
        shards.values().map(|bucket| bucket.len()).sum()
    }

    /// Returns `true` if the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict everything but the `capacity` highest-weight records.
    ///
    /// Top-K selection with a bounded min-heap: O(N log C) over N cached
    /// records, C the capacity. The whole sweep runs under one write-lock
    /// acquisition, so readers observe either the old map or the fully
    /// pruned one, never an intermediate state. Returns the eviction count.
    pub fn prune(&self, capacity: usize) -> usize {
        let mut shards = self.shards.write().expect("lock poisoned");
        let total: usize = shards.values().map(|bucket| bucket.len()).sum();
        if total <= capacity {
            return 0;
        }

        let now = unix_millis_now();
        let mut heap: BinaryHeap<std::cmp::Reverse<Ranked>> =
            BinaryHeap::with_capacity(capacity + 1);
        for (&shard, bucket) in shards.iter() {
            for (&slot, record) in bucket.iter() {
                let ranked = Ranked {
                    weight: weight(pow::stored_score(&record.work), record.timestamp, now),
                    shard,
                    slot,
                };
                if heap.len() < capacity {
                    heap.push(std::cmp::Reverse(ranked));
                } else if let Some(std::cmp::Reverse(min)) = heap.peek() {
                    if ranked > *min {
                        heap.pop();
                        heap.push(std::cmp::Reverse(ranked));
                    }
                }
            }
        }

        let mut old = std::mem::take(&mut *shards);
        let mut retained: HashMap<u64, HashMap<u64, Record>> = HashMap::new();
        for std::cmp::Reverse(ranked) in heap {
            if let Some(bucket) = old.get_mut(&ranked.shard) {
                if let Some(record) = bucket.remove(&ranked.slot) {
                    retained
                        .entry(ranked.shard)
                        .or_default()
                        .insert(ranked.slot, record);
                }
            }
        }
        *shards = retained;
        total - capacity
    }
}

impl std::fmt::Debug for WeightedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedCache")
            .field("len", &self.len())
            .field("capacity", &self.config.capacity)
            .finish()
    }
}

/// Heap entry for top-K selection. Total order: weight first
/// (`f64::total_cmp`), map keys as the stable tie-break.
#[derive(Clone, Copy, Debug)]
struct Ranked {
    weight: f64,
    shard: u64,
    slot: u64,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.shard.cmp(&other.shard))
            .then(self.slot.cmp(&other.slot))
    }
}
