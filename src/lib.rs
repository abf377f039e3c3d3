// ============================================================================
// shardroute Library
// ============================================================================
//
// Predicts which shard of an Elasticsearch-compatible index a document is
// routed to, without asking the cluster per document. Bulk pipelines use it
// to split batches so every request hits a single shard.
//
// ============================================================================

pub mod core;
pub mod hash;
pub mod router;
pub mod settings;

// Re-export main types for convenience
pub use crate::core::{Result, RoutingError};
pub use hash::{Murmur3Hasher, java_string_bytes, murmur3_x86_32, routing_hash, routing_hash_u32};
pub use router::{
    BulkDocument, RouterConfig, ShardFormula, ShardRouter, compute_shard, floor_mod,
    group_documents,
};
pub use settings::{
    ClusterConfig, DEFAULT_NUMBER_OF_SHARDS, DEFAULT_ROUTING_PARTITION_SIZE,
    HttpSettingsProvider, IndexSettings, SettingsProvider, StaticSettingsProvider,
};
