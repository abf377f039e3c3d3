// ============================================================================
// Routing Hash
// ============================================================================
//
// Replicates the hash the search cluster applies to `_routing` and `_id`:
// MurmurHash3 x86_32 with seed 0 over the UTF-16LE bytes of the string,
// read back as a signed Java `int`.
//
// ============================================================================

pub mod java_string;
pub mod murmur3;

pub use java_string::java_string_bytes;
pub use murmur3::{Murmur3Hasher, murmur3_x86_32};

use crate::core::Result;
use std::io::Write;

/// Seed the cluster uses for routing hashes.
pub const ROUTING_SEED: u32 = 0;

/// Hashes a routing key or document id exactly as the cluster does.
///
/// The value is a Java `int` and is frequently negative; reduce it with
/// [`crate::router::floor_mod`], never with `%`.
pub fn routing_hash(text: &str) -> Result<i32> {
    let mut hasher = Murmur3Hasher::with_seed(ROUTING_SEED);
    hasher.write_all(&java_string_bytes(text))?;
    Ok(hasher.finish_u32() as i32)
}

/// Same as [`routing_hash`] but returns the raw unsigned bits.
pub fn routing_hash_u32(text: &str) -> Result<u32> {
    routing_hash(text).map(|hash| hash as u32)
}
