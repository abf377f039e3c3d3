// ============================================================================
// Index Settings
// ============================================================================
//
// Per-index sharding parameters and the provider seam the router pulls them
// through. Defaults for omitted fields are applied here, inside the provider
// boundary, never in the shard formula.
//
// ============================================================================

pub mod config;
pub mod http;
pub mod static_provider;

pub use config::ClusterConfig;
pub use http::HttpSettingsProvider;
pub use static_provider::StaticSettingsProvider;

use crate::core::{Result, RoutingError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Primary shard count assumed when the cluster omits `number_of_shards`.
pub const DEFAULT_NUMBER_OF_SHARDS: i32 = 5;

/// Partition size assumed when the cluster omits `routing_partition_size`.
pub const DEFAULT_ROUTING_PARTITION_SIZE: i32 = 1;

fn default_number_of_shards() -> i32 {
    DEFAULT_NUMBER_OF_SHARDS
}

fn default_routing_partition_size() -> i32 {
    DEFAULT_ROUTING_PARTITION_SIZE
}

/// Sharding parameters of one index.
///
/// Fields keep the cluster's signed 32-bit width so that bad upstream values
/// survive decoding and are rejected by [`IndexSettings::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_number_of_shards")]
    pub number_of_shards: i32,

    #[serde(default = "default_routing_partition_size")]
    pub routing_partition_size: i32,

    /// Routing shard count of a splittable index. `None` means the index
    /// hashes straight into its primary shards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_num_shards: Option<i32>,
}

impl IndexSettings {
    pub fn new(number_of_shards: i32, routing_partition_size: i32) -> Self {
        Self {
            number_of_shards,
            routing_partition_size,
            routing_num_shards: None,
        }
    }

    /// Set the routing shard count
    pub fn routing_num_shards(mut self, routing_num_shards: i32) -> Self {
        self.routing_num_shards = Some(routing_num_shards);
        self
    }

    /// Checks that every value is usable by the shard formula.
    pub fn validate(&self, index_name: &str) -> Result<()> {
        if self.number_of_shards <= 0 {
            return Err(RoutingError::invalid(
                index_name,
                format!("number_of_shards must be >= 1, got {}", self.number_of_shards),
            ));
        }
        if self.routing_partition_size <= 0 {
            return Err(RoutingError::invalid(
                index_name,
                format!(
                    "routing_partition_size must be >= 1, got {}",
                    self.routing_partition_size
                ),
            ));
        }
        if let Some(routing_num_shards) = self.routing_num_shards {
            if routing_num_shards < self.number_of_shards
                || routing_num_shards % self.number_of_shards != 0
            {
                return Err(RoutingError::invalid(
                    index_name,
                    format!(
                        "number_of_routing_shards {} is not a multiple of number_of_shards {}",
                        routing_num_shards, self.number_of_shards
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self::new(DEFAULT_NUMBER_OF_SHARDS, DEFAULT_ROUTING_PARTITION_SIZE)
    }
}

/// Source of per-index sharding parameters.
///
/// Implementations fill omitted fields with [`DEFAULT_NUMBER_OF_SHARDS`] and
/// [`DEFAULT_ROUTING_PARTITION_SIZE`], and return
/// [`RoutingError::SettingsMissing`] when the cluster has no such index.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn fetch_settings(&self, index_name: &str) -> Result<IndexSettings>;
}
