//! Shard router: fans requests across segments by key hash.
//!
//! The cache owns a power-of-two array of [`Segment`]s. Each request hashes
//! the key once; the top `log2 N` bits of the hash pick the segment and the
//! low 32 bits become the in-segment fingerprint. Everything else — storage,
//! eviction, counters — happens inside the chosen segment under its lock.
//!
//! ## Architecture
//!
//! ```text
//!   key ──▶ hash64 ──▶ ┌──────────────┬───────────────────────────┐
//!                      │ top log2 N   │ low 32 bits               │
//!                      │ segment pick │ fingerprint               │
//!                      └──────┬───────┴──────────┬────────────────┘
//!                             ▼                  ▼
//!                      segments[i] ──────▶ put / get / delete
//! ```
//!
//! Segments are cache-line padded so neighboring locks and counters never
//! share a line.
//!
//! ## Example
//!
//! ```
//! use ringcache::cache::Cache;
//!
//! let cache = Cache::new(8, 64 * 1024);
//! cache.put(b"user:1", b"alice");
//!
//! let mut buf = [0u8; 64];
//! let (n, hit) = cache.get(b"user:1", &mut buf);
//! assert!(hit);
//! assert_eq!(&buf[..n], b"alice");
//!
//! assert!(cache.delete(b"user:1"));
//! assert!(!cache.delete(b"user:1"));
//! ```

use crossbeam_utils::CachePadded;

use crate::builder::CacheBuilder;
use crate::error::InvariantError;
use crate::hash::KeyHasher;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::segment::Segment;

/// Sharded byte cache: N ring-buffer segments behind one hash.
#[derive(Debug)]
pub struct Cache {
    segments: Box<[CachePadded<Segment>]>,
    segment_shift: u32,
    hasher: KeyHasher,
}

impl Cache {
    /// Creates a cache of `num_segments` segments (rounded up to the next
    /// power of two) of `segment_size` bytes each.
    ///
    /// # Panics
    ///
    /// Panics if `num_segments` is zero or `segment_size` cannot hold a
    /// record header. Use [`CacheBuilder::try_build`] for a fallible
    /// variant.
    pub fn new(num_segments: usize, segment_size: usize) -> Self {
        CacheBuilder::new(num_segments, segment_size).build()
    }

    pub(crate) fn from_parts(segments: Vec<Segment>, hasher: KeyHasher) -> Self {
        debug_assert!(segments.len().is_power_of_two());
        let segment_shift = 64 - segments.len().trailing_zeros();
        Self {
            segments: segments.into_iter().map(CachePadded::new).collect(),
            segment_shift,
            hasher,
        }
    }

    /// Inserts or overwrites the entry for `key`.
    pub fn put(&self, key: &[u8], value: &[u8]) {
        let (segment, hash) = self.segment_for(key);
        segment.put(hash as u32, key, value);
    }

    /// Looks up `key`, copying the value into `out`.
    ///
    /// Returns `(value_len, true)` on a hit, `(0, false)` on a miss. The
    /// caller must size `out` for the value; an undersized buffer is misuse
    /// and panics.
    pub fn get(&self, key: &[u8], out: &mut [u8]) -> (usize, bool) {
        let (segment, hash) = self.segment_for(key);
        segment.get(hash as u32, key, out)
    }

    /// Removes the entry for `key`, returning whether a live entry was
    /// removed.
    pub fn delete(&self, key: &[u8]) -> bool {
        let (segment, hash) = self.segment_for(key);
        segment.delete(hash as u32, key)
    }

    /// Number of segments (always a power of two).
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Live entries across all segments.
    pub fn entry_count(&self) -> u64 {
        self.segments.iter().map(|s| s.entry_count()).sum()
    }

    /// Key-verified hits across all segments.
    pub fn hit_count(&self) -> u64 {
        self.segments.iter().map(|s| s.hit_count()).sum()
    }

    /// `get` calls across all segments.
    pub fn access_count(&self) -> u64 {
        self.segments.iter().map(|s| s.access_count()).sum()
    }

    /// Verifies every segment's structural invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for segment in self.segments.iter() {
            segment.check_invariants()?;
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        let mut snapshot = CacheMetricsSnapshot {
            segment_count: self.segments.len(),
            ..Default::default()
        };
        for segment in self.segments.iter() {
            let seg = segment.snapshot();
            snapshot.entry_count += seg.entry_count;
            snapshot.hit_count += seg.hit_count;
            snapshot.access_count += seg.access_count;
            snapshot.used_bytes += seg.used_bytes;
            snapshot.capacity_bytes += seg.capacity_bytes;
        }
        snapshot.miss_count = snapshot.access_count - snapshot.hit_count;
        snapshot
    }

    fn segment_for(&self, key: &[u8]) -> (&Segment, u64) {
        let hash = self.hasher.hash(key);
        // With a single segment the shift is the full word width; every key
        // routes to index 0.
        let index = hash.checked_shr(self.segment_shift).unwrap_or(0) as usize;
        let segment: &Segment = &self.segments[index];
        (segment, hash)
    }
}
