//! Plain counter snapshots for the cache and its segments.
//!
//! Simple counters only: snapshots are copied structs, taken under each
//! segment's lock, with no reporter machinery attached.

pub mod snapshot;

pub use snapshot::{CacheMetricsSnapshot, SegmentMetricsSnapshot};
