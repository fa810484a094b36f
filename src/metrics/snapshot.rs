#[derive(Debug, Default, Clone, Copy)]
pub struct SegmentMetricsSnapshot {
    pub entry_count: u64,
    pub hit_count: u64,
    pub access_count: u64,

    // gauges captured at snapshot time
    pub used_bytes: usize,
    pub capacity_bytes: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMetricsSnapshot {
    pub segment_count: usize,
    pub entry_count: u64,

    pub access_count: u64,
    pub hit_count: u64,
    pub miss_count: u64,

    pub used_bytes: usize,
    pub capacity_bytes: usize,
}
