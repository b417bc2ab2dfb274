use async_trait::async_trait;
use tokio::sync::mpsc;

use quay_types::Record;

use crate::error::NetResult;
use crate::message::{NetEvent, NetRequest};

/// The channel halves a network engine exposes to the gateway.
///
/// `events` is the continuous observed-traffic feed; `requests` and
/// `responses` form the duplex pair used by chain fetches. The response
/// side may carry unrelated traffic — consumers must filter.
pub struct EngineHandle {
    /// Observed traffic, drained by the ingress consumer for the process
    /// lifetime.
    pub events: mpsc::Receiver<NetEvent>,
    /// Outbound get-by-identity requests.
    pub requests: mpsc::Sender<NetRequest>,
    /// Responses for in-flight fetches.
    pub responses: mpsc::Receiver<NetEvent>,
}

impl EngineHandle {
    pub fn from_parts(
        events: mpsc::Receiver<NetEvent>,
        requests: mpsc::Sender<NetRequest>,
        responses: mpsc::Receiver<NetEvent>,
    ) -> Self {
        Self {
            events,
            requests,
            responses,
        }
    }
}

/// Publish seam to the network engine.
///
/// `submit` is fire-and-forget from the cache's perspective: callers bound
/// it with a short timeout and surface failures, but never roll back the
/// local cache insert.
#[async_trait]
pub trait NetworkEngine: Send + Sync {
    async fn submit(&self, record: Record) -> NetResult<()>;
}

/// Engine that accepts and drops every submission. For tests and
/// deployments without a publish path.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpEngine;

#[async_trait]
impl NetworkEngine for NoOpEngine {
    async fn submit(&self, _record: Record) -> NetResult<()> {
        Ok(())
    }
}
