use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use quay_net::FetchConfig;
use quay_store::CacheConfig;

use crate::error::{GatewayError, GatewayResult};

/// Gateway configuration. All fields have defaults, so a partial TOML
/// file (or none at all) is valid.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// Cache capacity enforced by the pruner.
    pub capacity: usize,
    /// Minimum proof-of-work score (leading zero bits) for admission.
    pub min_work: i32,
    /// Result cap for prefix listing.
    pub list_limit: usize,
    /// Verify proof-of-work on records observed from the network feed.
    pub verify_observed: bool,
    /// Fall back to a chain fetch on cache miss.
    pub chain_fetch: bool,
    pub prune_interval_secs: u64,
    pub submit_timeout_millis: u64,
    pub fetch_step_timeout_millis: u64,
    pub fetch_overall_timeout_millis: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().expect("valid default addr"),
            capacity: 500_000,
            min_work: 16,
            list_limit: 100,
            verify_observed: false,
            chain_fetch: true,
            prune_interval_secs: 10,
            submit_timeout_millis: 1_000,
            fetch_step_timeout_millis: 5_000,
            fetch_overall_timeout_millis: 30_000,
        }
    }
}

impl GatewayConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml(input: &str) -> GatewayResult<Self> {
        toml::from_str(input).map_err(|e| GatewayError::Config(e.to_string()))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.capacity,
            min_work: self.min_work,
            verify_observed: self.verify_observed,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            min_work: self.min_work,
            step_timeout: Duration::from_millis(self.fetch_step_timeout_millis),
            overall_timeout: Duration::from_millis(self.fetch_overall_timeout_millis),
        }
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_millis)
    }
}
