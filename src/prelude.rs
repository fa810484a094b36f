pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::ds::RingBuf;
pub use crate::hash::KeyHasher;
pub use crate::segment::Segment;
pub use crate::time::{Clock, CoarseClock, ManualClock};

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CacheMetricsSnapshot;
