// ============================================================================
// Shard Formula
// ============================================================================
//
//   shard = floor_mod(hash(routing), n)                                 p == 1
//   shard = floor_mod(hash(routing) + floor_mod(hash(id), p), n)        p > 1
//
// where n = number_of_shards and p = routing_partition_size. Splittable
// indices hash into routing_num_shards first and scale down by the routing
// factor. Hashes are Java ints; the sum wraps like Java int addition.
//
// ============================================================================

use crate::core::Result;
use crate::hash::routing_hash;
use crate::settings::IndexSettings;

/// Floored modulo: the result carries the sign of `modulus`, so for a
/// positive modulus it is always in `[0, modulus)`.
///
/// Rust's `%` truncates and returns `-4` for `-675079799 % 5`; the cluster
/// computes `1`.
///
/// # Panics
///
/// Panics if `modulus` is zero. Validated settings never pass zero.
#[inline]
pub fn floor_mod(value: i32, modulus: i32) -> i32 {
    value.rem_euclid(modulus)
}

/// Shard formula bound to one index's validated settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardFormula {
    number_of_shards: i32,
    routing_partition_size: i32,
    routing_num_shards: i32,
    routing_factor: i32,
}

impl ShardFormula {
    /// Validates `settings` and binds the formula to them.
    pub fn new(index_name: &str, settings: &IndexSettings) -> Result<Self> {
        settings.validate(index_name)?;
        let routing_num_shards = settings
            .routing_num_shards
            .unwrap_or(settings.number_of_shards);

        Ok(Self {
            number_of_shards: settings.number_of_shards,
            routing_partition_size: settings.routing_partition_size,
            routing_num_shards,
            routing_factor: routing_num_shards / settings.number_of_shards,
        })
    }

    pub fn number_of_shards(&self) -> u32 {
        self.number_of_shards as u32
    }

    /// Shard for a document. `document_id` is only hashed when the index
    /// uses routing partitions.
    pub fn shard_for(&self, document_id: &str, routing_key: &str) -> Result<u32> {
        let mut hash = routing_hash(routing_key)?;
        if self.routing_partition_size > 1 {
            let id_hash = routing_hash(document_id)?;
            hash = hash.wrapping_add(floor_mod(id_hash, self.routing_partition_size));
        }
        Ok(self.shard_for_hash(hash))
    }

    /// Reduces an already combined routing hash to a shard number.
    pub fn shard_for_hash(&self, hash: i32) -> u32 {
        (floor_mod(hash, self.routing_num_shards) / self.routing_factor) as u32
    }
}

/// Computes a shard without a router or provider.
pub fn compute_shard(
    index_name: &str,
    settings: &IndexSettings,
    document_id: &str,
    routing_key: &str,
) -> Result<u32> {
    ShardFormula::new(index_name, settings)?.shard_for(document_id, routing_key)
}
