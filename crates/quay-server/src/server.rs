use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use quay_net::{ChainFetcher, EngineHandle, IngressConsumer, NetworkEngine};
use quay_store::{Pruner, WeightedCache};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::handler::{AppState, SharedState};
use crate::router::build_router;

/// The assembled gateway process.
///
/// Owns the cache and wires the network engine's channel halves into the
/// ingress consumer and chain fetcher. Background tasks (ingress drain,
/// prune sweep) run for the process lifetime.
pub struct Gateway {
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the shared handler state and spawn the background tasks.
    ///
    /// Exposed separately from [`Gateway::serve`] so tests and embedders
    /// can drive the router without binding a listener.
    pub fn assemble(
        &self,
        handle: EngineHandle,
        engine: Arc<dyn NetworkEngine>,
    ) -> SharedState {
        let cache = Arc::new(WeightedCache::new(self.config.cache_config()));

        let EngineHandle {
            events,
            requests,
            responses,
        } = handle;

        tokio::spawn(IngressConsumer::new(Arc::clone(&cache), events).run());
        tokio::spawn(
            Pruner::with_cache_capacity(Arc::clone(&cache), self.config.prune_interval()).run(),
        );

        let fetcher = self
            .config
            .chain_fetch
            .then(|| ChainFetcher::new(requests, responses, self.config.fetch_config()));

        Arc::new(AppState {
            cache,
            fetcher,
            engine,
            list_limit: self.config.list_limit,
            submit_timeout: self.config.submit_timeout(),
        })
    }

    /// Assemble and serve until the process is shut down.
    pub async fn serve(
        self,
        handle: EngineHandle,
        engine: Arc<dyn NetworkEngine>,
    ) -> GatewayResult<()> {
        let state = self.assemble(handle, engine);
        let app = build_router(state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("quay gateway listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }
}
