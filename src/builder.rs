//! Cache construction and validation.
//!
//! [`CacheBuilder`] validates the shape of the cache (segment count and
//! size) and carries the injectable collaborators: the timestamp source,
//! the key hasher, and the eviction loop's relocation cap.
//!
//! ## Example
//!
//! ```
//! use ringcache::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new(8, 64 * 1024)
//!     .max_consecutive_evacuation(3)
//!     .build();
//! cache.put(b"key", b"value");
//! ```

use std::sync::Arc;

use crate::cache::Cache;
use crate::error::ConfigError;
use crate::hash::KeyHasher;
use crate::segment::header::HEADER_SIZE;
use crate::segment::{Segment, DEFAULT_MAX_CONSECUTIVE_EVACUATION};
use crate::time::{Clock, CoarseClock};

/// Builder for [`Cache`] instances.
pub struct CacheBuilder {
    num_segments: usize,
    segment_size: usize,
    max_consecutive_evacuation: usize,
    clock: Arc<dyn Clock>,
    hasher: KeyHasher,
}

impl CacheBuilder {
    /// Starts a builder for `num_segments` segments (rounded up to the next
    /// power of two at build time) of `segment_size` bytes each.
    pub fn new(num_segments: usize, segment_size: usize) -> Self {
        Self {
            num_segments,
            segment_size,
            max_consecutive_evacuation: DEFAULT_MAX_CONSECUTIVE_EVACUATION,
            clock: Arc::new(CoarseClock),
            hasher: KeyHasher::new(),
        }
    }

    /// Caps how many records the eviction loop may relocate in a row before
    /// it forces a discard.
    pub fn max_consecutive_evacuation(mut self, limit: usize) -> Self {
        self.max_consecutive_evacuation = limit;
        self
    }

    /// Overrides the timestamp source shared by every segment.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Overrides the key hasher (e.g. a seeded one for reproducible
    /// placement in tests).
    pub fn hasher(mut self, hasher: KeyHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Builds the cache, validating the configuration.
    pub fn try_build(self) -> Result<Cache, ConfigError> {
        if self.num_segments < 1 {
            return Err(ConfigError::new("number of segments must be at least 1"));
        }
        if self.segment_size < HEADER_SIZE {
            return Err(ConfigError::new(format!(
                "segment size {} is smaller than a record header ({HEADER_SIZE} bytes)",
                self.segment_size
            )));
        }
        let num_segments = self.num_segments.next_power_of_two();
        let segments = (0..num_segments)
            .map(|_| {
                Segment::with_options(
                    self.segment_size,
                    self.max_consecutive_evacuation,
                    Arc::clone(&self.clock),
                )
            })
            .collect();
        Ok(Cache::from_parts(segments, self.hasher))
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration; see
    /// [`try_build`](Self::try_build) for the checked variant.
    pub fn build(self) -> Cache {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }
}
