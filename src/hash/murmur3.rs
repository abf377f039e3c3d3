// ============================================================================
// MurmurHash3, x86 32-bit variant
// ============================================================================
//
// Matches the reference `murmurhash3_x86_32(byte[] data, int offset, int len,
// int seed)` bit for bit. All arithmetic wraps on u32, which is identical to
// Java `int` arithmetic in two's complement.
//
// ============================================================================

use std::hash::Hasher;
use std::io;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const R1: u32 = 15;
const R2: u32 = 13;
const M: u32 = 5;
const N: u32 = 0xe654_6b64;

#[inline]
fn scramble(mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = k.rotate_left(R1);
    k.wrapping_mul(C2)
}

#[inline]
fn mix_block(h: u32, k: u32) -> u32 {
    let h = h ^ scramble(k);
    h.rotate_left(R2).wrapping_mul(M).wrapping_add(N)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Hashes `data` in one shot.
pub fn murmur3_x86_32(data: &[u8], seed: u32) -> u32 {
    let mut hasher = Murmur3Hasher::with_seed(seed);
    hasher.update(data);
    hasher.finish_u32()
}

/// Streaming MurmurHash3 x86_32.
///
/// Feeding the same bytes in any chunking yields the same value as
/// [`murmur3_x86_32`]. Up to three trailing bytes are buffered between writes.
#[derive(Debug, Clone)]
pub struct Murmur3Hasher {
    h1: u32,
    tail: [u8; 4],
    tail_len: usize,
    total_len: u64,
}

impl Murmur3Hasher {
    /// Creates a hasher with seed 0, the seed used for shard routing.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            h1: seed,
            tail: [0; 4],
            tail_len: 0,
            total_len: 0,
        }
    }

    /// Absorbs `bytes` into the running hash.
    pub fn update(&mut self, mut bytes: &[u8]) {
        self.total_len += bytes.len() as u64;

        if self.tail_len > 0 {
            let take = (4 - self.tail_len).min(bytes.len());
            self.tail[self.tail_len..self.tail_len + take].copy_from_slice(&bytes[..take]);
            self.tail_len += take;
            bytes = &bytes[take..];
            if self.tail_len < 4 {
                return;
            }
            self.h1 = mix_block(self.h1, u32::from_le_bytes(self.tail));
            self.tail_len = 0;
        }

        let mut blocks = bytes.chunks_exact(4);
        for block in &mut blocks {
            let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
            self.h1 = mix_block(self.h1, k);
        }

        let rest = blocks.remainder();
        self.tail[..rest.len()].copy_from_slice(rest);
        self.tail_len = rest.len();
    }

    /// Returns the hash of everything written so far.
    ///
    /// Does not consume or reset the hasher.
    pub fn finish_u32(&self) -> u32 {
        let mut h = self.h1;

        if self.tail_len > 0 {
            let mut k = 0u32;
            for (i, byte) in self.tail[..self.tail_len].iter().enumerate() {
                k ^= (*byte as u32) << (8 * i);
            }
            h ^= scramble(k);
        }

        // The reference takes the length as a Java int.
        h ^= self.total_len as u32;
        fmix32(h)
    }
}

impl Default for Murmur3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Murmur3Hasher {
    fn finish(&self) -> u64 {
        self.finish_u32() as u64
    }

    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

impl io::Write for Murmur3Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
