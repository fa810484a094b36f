//! Keyed 64-bit byte hashing for shard routing and fingerprints.
//!
//! The cache spends the top bits of the hash on segment selection and the
//! low 32 bits on the per-segment fingerprint, so the hash must mix well in
//! both halves. Backed by `ahash`, which is keyed (per-instance seeds) and
//! has strong avalanche behavior on byte inputs.

use ahash::RandomState;

/// Keyed byte hash with a 64-bit output.
///
/// # Example
///
/// ```
/// use ringcache::hash::KeyHasher;
///
/// let hasher = KeyHasher::with_seeds(1, 2, 3, 4);
/// assert_eq!(hasher.hash(b"key"), hasher.hash(b"key"));
/// assert_ne!(hasher.hash(b"key"), hasher.hash(b"kez"));
/// ```
#[derive(Clone, Debug)]
pub struct KeyHasher {
    state: RandomState,
}

impl KeyHasher {
    /// Randomly keyed hasher; placement differs between cache instances.
    pub fn new() -> Self {
        Self {
            state: RandomState::new(),
        }
    }

    /// Deterministically keyed hasher, for tests and benchmarks that need
    /// reproducible placement.
    pub fn with_seeds(k0: u64, k1: u64, k2: u64, k3: u64) -> Self {
        Self {
            state: RandomState::with_seeds(k0, k1, k2, k3),
        }
    }

    /// Hashes `key` to 64 bits.
    pub fn hash(&self, key: &[u8]) -> u64 {
        self.state.hash_one(key)
    }
}

impl Default for KeyHasher {
    fn default() -> Self {
        Self::new()
    }
}
