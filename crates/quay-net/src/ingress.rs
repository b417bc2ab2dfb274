use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use quay_store::WeightedCache;

use crate::message::NetEvent;

/// Drains the network engine's observed-traffic feed into the cache.
///
/// Runs until the engine closes the feed (process shutdown). A record that
/// fails admission — insufficient work when observed-verification is
/// enabled — is skipped, never fatal: the feed is untrusted and continuous,
/// so the loop must keep draining no matter what arrives.
pub struct IngressConsumer {
    cache: Arc<WeightedCache>,
    events: mpsc::Receiver<NetEvent>,
}

impl IngressConsumer {
    pub fn new(cache: Arc<WeightedCache>, events: mpsc::Receiver<NetEvent>) -> Self {
        Self { cache, events }
    }

    /// Drive the drain loop until the feed closes.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                NetEvent::Announce { record } | NetEvent::Sample { record } => {
                    let id = record.id();
                    match self.cache.insert_observed(record) {
                        Ok(addr) => trace!(%id, %addr, "observed record cached"),
                        Err(err) => debug!(%id, %err, "skipping observed record"),
                    }
                }
                // Responses belong to in-flight fetches on the other
                // channel pair; nothing to do here.
                NetEvent::Response { .. } => {}
            }
        }
        debug!("ingress feed closed");
    }
}
