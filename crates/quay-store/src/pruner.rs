use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::cache::WeightedCache;

/// Background task that keeps a [`WeightedCache`] at or below capacity.
///
/// Runs for the process lifetime; there is no out-of-band stop signal.
/// Each tick performs one sweep. A sweep that finds the cache within
/// capacity does nothing.
pub struct Pruner {
    cache: Arc<WeightedCache>,
    capacity: usize,
    interval: Duration,
}

impl Pruner {
    pub fn new(cache: Arc<WeightedCache>, capacity: usize, interval: Duration) -> Self {
        Self {
            cache,
            capacity,
            interval,
        }
    }

    /// Pruner using the cache's configured capacity.
    pub fn with_cache_capacity(cache: Arc<WeightedCache>, interval: Duration) -> Self {
        let capacity = cache.config().capacity;
        Self::new(cache, capacity, interval)
    }

    /// Drive the sweep loop forever.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // A stalled sweep should not cause a burst of catch-up sweeps.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let evicted = self.cache.prune(self.capacity);
            if evicted > 0 {
                debug!(evicted, retained = self.cache.len(), "prune sweep");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use quay_types::{unix_millis_now, Record, RecordId};

    fn record(seq: u8, zero_bits: u32) -> Record {
        let mut work = [0u8; 32];
        work[(zero_bits / 8) as usize] = 0x80 >> (zero_bits % 8);
        work[31] = seq;
        work[30] = 0xff;
        Record::new(
            vec![seq],
            vec![seq],
            RecordId::new(work),
            unix_millis_now(),
        )
    }

    #[tokio::test]
    async fn sweep_enforces_capacity() {
        let cache = Arc::new(WeightedCache::new(CacheConfig {
            capacity: 4,
            min_work: 0,
            verify_observed: false,
        }));
        for seq in 0..10u8 {
            cache.insert_observed(record(seq, seq as u32)).unwrap();
        }

        let pruner = Pruner::with_cache_capacity(Arc::clone(&cache), Duration::from_millis(5));
        let handle = tokio::spawn(pruner.run());

        // Give the loop a couple of ticks, then check the invariant.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.len() <= 4, "cache size {} over capacity", cache.len());

        // The survivors are the highest-score records (same age).
        for seq in 6..10u8 {
            assert!(cache.get(&record(seq, seq as u32).id()).is_some());
        }
        handle.abort();
    }

    #[tokio::test]
    async fn sweep_is_noop_under_capacity() {
        let cache = Arc::new(WeightedCache::new(CacheConfig::default()));
        cache.insert_observed(record(1, 4)).unwrap();

        let pruner = Pruner::new(Arc::clone(&cache), 100, Duration::from_millis(5));
        let handle = tokio::spawn(pruner.run());
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.len(), 1);
        handle.abort();
    }
}
