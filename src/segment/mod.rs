//! Ring-buffer-backed record store with approximate-LRU eviction.
//!
//! A segment is one shard of the cache: a fixed-capacity byte ring holding
//! header-prefixed records, an index from 32-bit fingerprint to the record's
//! byte offset, and the eviction loop that reclaims space for new writes.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │                            Segment                                 │
//!   │                                                                    │
//!   │   index: FxHashMap<u32, usize>       ring: RingBuf                 │
//!   │   fingerprint -> header offset                                     │
//!   │   ┌──────────┬───────┐                                             │
//!   │   │ 0x9c41   │   0   │──────────▶ [hdr|key|value|pad]              │
//!   │   │ 0x17f2   │  28   │──────────▶ [hdr|key|value|pad]              │
//!   │   │ 0x50aa   │  60   │──────────▶ [hdr|key|value|pad]              │
//!   │   └──────────┴───────┘                    ...                      │
//!   │                                                                    │
//!   │   total / hit_count / access_count: atomics, readable lock-free    │
//!   │   total_access_time: sum of live access stamps, under the lock     │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Eviction Flow
//!
//! ```text
//!   put needs `need` bytes, available() < need
//!        │
//!        ▼
//!   read the header at the front of the live window
//!        │
//!        ▼
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │ tombstoned?                         → discard (skip bytes)      │
//!   │ access_time below the live mean?    → discard                   │
//!   │ relocation streak hit the cap?      → discard (forced progress) │
//!   │ otherwise                           → evacuate to the back and  │
//!   │                                       rewrite its index offset  │
//!   └─────────────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//!   repeat until available() >= need
//! ```
//!
//! The expiry test is `total * access_time < total_access_time`: a record is
//! discarded when its stamp is below the current mean across live entries.
//! One word per record buys an approximate LRU; the relocation cap bounds how
//! long a streak of recently-used head records can defer progress.
//!
//! ## Performance Characteristics
//!
//! | Operation | Time        | Notes                                      |
//! |-----------|-------------|--------------------------------------------|
//! | `put`     | O(1) amort. | May walk the eviction loop to make room    |
//! | `get`     | O(1)        | Two header I/Os + value copy               |
//! | `delete`  | O(1)        | Tombstones in place                        |
//!
//! All storage is pre-allocated at construction; steady-state operations do
//! not allocate (the fingerprint index may resize).
//!
//! ## Example
//!
//! ```
//! use ringcache::segment::Segment;
//!
//! let segment = Segment::new(64 * 1024);
//! segment.put(0x40, b"key", b"value");
//!
//! let mut buf = [0u8; 16];
//! let (n, hit) = segment.get(0x40, b"key", &mut buf);
//! assert!(hit);
//! assert_eq!(&buf[..n], b"value");
//! ```

pub mod header;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::RingBuf;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SegmentMetricsSnapshot;
use crate::time::{Clock, CoarseClock};
use header::{align_up, EntryHeader, HEADER_ALIGN, HEADER_SIZE};

/// How many records the eviction loop may relocate in a row before it
/// forces a discard.
pub const DEFAULT_MAX_CONSECUTIVE_EVACUATION: usize = 5;

/// One shard: a byte ring, a fingerprint index, a lock, and counters.
///
/// All mutating state lives behind the segment's mutex; `entry_count`,
/// `hit_count`, and `access_count` are updated under the lock but stored in
/// atomics so statistics reads never contend.
pub struct Segment {
    inner: Mutex<SegmentInner>,
    total: AtomicU64,
    hit_count: AtomicU64,
    access_count: AtomicU64,
    max_consecutive_evacuation: usize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("total", &self.total)
            .field("hit_count", &self.hit_count)
            .field("access_count", &self.access_count)
            .field("max_consecutive_evacuation", &self.max_consecutive_evacuation)
            .finish_non_exhaustive()
    }
}

struct SegmentInner {
    rb: RingBuf,
    index: FxHashMap<u32, usize>,
    total_access_time: u64,
}

impl Segment {
    /// Creates a segment with `buf_size` bytes of record storage, the
    /// default relocation cap, and the coarse system clock.
    pub fn new(buf_size: usize) -> Self {
        Self::with_options(
            buf_size,
            DEFAULT_MAX_CONSECUTIVE_EVACUATION,
            Arc::new(CoarseClock),
        )
    }

    /// Creates a segment with an explicit relocation cap and timestamp
    /// source.
    pub fn with_options(
        buf_size: usize,
        max_consecutive_evacuation: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        assert!(
            buf_size >= HEADER_SIZE,
            "segment size must hold at least one record header"
        );
        Self {
            inner: Mutex::new(SegmentInner {
                rb: RingBuf::new(buf_size),
                index: FxHashMap::default(),
                total_access_time: 0,
            }),
            total: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            access_count: AtomicU64::new(0),
            max_consecutive_evacuation,
            clock,
        }
    }

    /// Inserts or overwrites the entry for `fingerprint`/`key`.
    ///
    /// A repeat put of the same key rewrites the value in place when it fits
    /// the record's reserved capacity. A fingerprint collision with a
    /// different key tombstones the old record and appends a new one; older
    /// or below-mean-recency records are evicted as needed to make room.
    pub fn put(&self, fingerprint: u32, key: &[u8], value: &[u8]) {
        assert!(key.len() <= u16::MAX as usize, "key too long for record header");
        let mut inner = self.inner.lock();
        let now = self.clock.now();

        let existed = inner.index.get(&fingerprint).copied();
        if let Some(offset) = existed {
            let mut header = inner.read_header(offset);
            if header.key_len as usize == key.len()
                && inner.rb.bytes_equal(offset + HEADER_SIZE, key)
                && value.len() <= header.val_cap as usize
            {
                inner
                    .rb
                    .write_at(value, offset + HEADER_SIZE + header.key_len as usize);
                inner.total_access_time -= u64::from(header.access_time);
                header.val_len = value.len() as u32;
                header.access_time = now;
                inner.write_header(offset, &header);
                inner.total_access_time += u64::from(header.access_time);
                return;
            }
            // Different key or oversized value: tombstone the old record.
            // Its index slot is overwritten by the append below.
            header.deleted = true;
            inner.write_header(offset, &header);
            inner.total_access_time -= u64::from(header.access_time);
        }

        let total_len_aligned = align_up(key.len() as u32 + value.len() as u32);
        let need = HEADER_SIZE + total_len_aligned as usize;
        assert!(
            need <= inner.rb.capacity(),
            "aligned record size {need} exceeds segment capacity {}",
            inner.rb.capacity()
        );
        self.evacuate_for(&mut inner, need);

        let header = EntryHeader {
            hash: fingerprint,
            access_time: now,
            key_len: key.len() as u16,
            deleted: false,
            val_len: value.len() as u32,
            val_cap: total_len_aligned - key.len() as u32,
        };
        let offset = inner.rb.append(&header.encode());
        inner.rb.append(key);
        inner.rb.append(value);
        inner.rb.append_empty((header.val_cap - header.val_len) as usize);
        inner.index.insert(fingerprint, offset);

        if existed.is_none() {
            self.total.fetch_add(1, Ordering::Relaxed);
        }
        inner.total_access_time += u64::from(header.access_time);
    }

    /// Looks up `fingerprint`/`key`, copying the value into `out`.
    ///
    /// Returns `(value_len, true)` on a key-verified hit and refreshes the
    /// record's access stamp; `(0, false)` on a miss. A fingerprint hit with
    /// a mismatched key is a miss and does not alter state. The caller must
    /// size `out` for the value; an undersized buffer is misuse and panics.
    pub fn get(&self, fingerprint: u32, key: &[u8], out: &mut [u8]) -> (usize, bool) {
        let mut inner = self.inner.lock();
        self.access_count.fetch_add(1, Ordering::Relaxed);

        let Some(&offset) = inner.index.get(&fingerprint) else {
            return (0, false);
        };
        let mut header = inner.read_header(offset);
        if !Self::key_matches(&inner, &header, offset, key) {
            return (0, false);
        }

        let val_len = header.val_len as usize;
        inner.rb.read_at(
            &mut out[..val_len],
            offset + HEADER_SIZE + header.key_len as usize,
        );

        inner.total_access_time -= u64::from(header.access_time);
        header.access_time = self.clock.now();
        inner.write_header(offset, &header);
        inner.total_access_time += u64::from(header.access_time);

        self.hit_count.fetch_add(1, Ordering::Relaxed);
        (val_len, true)
    }

    /// Removes the entry for `fingerprint`/`key`.
    ///
    /// Returns `true` iff a live entry was removed. The record is
    /// tombstoned in place; its bytes are reclaimed when the eviction
    /// cursor reaches them.
    pub fn delete(&self, fingerprint: u32, key: &[u8]) -> bool {
        let mut inner = self.inner.lock();

        let Some(&offset) = inner.index.get(&fingerprint) else {
            return false;
        };
        let mut header = inner.read_header(offset);
        if !Self::key_matches(&inner, &header, offset, key) {
            return false;
        }

        header.deleted = true;
        inner.write_header(offset, &header);
        inner.index.remove(&fingerprint);
        self.total.fetch_sub(1, Ordering::Relaxed);
        inner.total_access_time -= u64::from(header.access_time);
        true
    }

    /// Count of live entries.
    pub fn entry_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Key-verified hits since construction.
    pub fn hit_count(&self) -> u64 {
        self.hit_count.load(Ordering::Relaxed)
    }

    /// `get` calls since construction.
    pub fn access_count(&self) -> u64 {
        self.access_count.load(Ordering::Relaxed)
    }

    /// Live bytes in the ring, including tombstones and padding.
    pub fn used_bytes(&self) -> usize {
        self.inner.lock().rb.len()
    }

    /// Ring capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.inner.lock().rb.capacity()
    }

    #[cfg(feature = "metrics")]
    pub fn snapshot(&self) -> SegmentMetricsSnapshot {
        let inner = self.inner.lock();
        SegmentMetricsSnapshot {
            entry_count: self.total.load(Ordering::Relaxed),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            access_count: self.access_count.load(Ordering::Relaxed),
            used_bytes: inner.rb.len(),
            capacity_bytes: inner.rb.capacity(),
        }
    }

    /// Walks the ring and verifies the segment's structural invariants:
    /// the live window parses as aligned records, the entry count matches
    /// the index, every indexed offset points at a live header with the
    /// matching fingerprint, and the access-time sum is exact.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let inner = self.inner.lock();
        let cap = inner.rb.capacity();

        let mut headers: FxHashMap<usize, EntryHeader> = FxHashMap::default();
        let mut offset = inner.rb.begin();
        let mut consumed = 0;
        while consumed < inner.rb.len() {
            if inner.rb.len() - consumed < HEADER_SIZE {
                return Err(InvariantError::new(format!(
                    "trailing {} live bytes are shorter than a header",
                    inner.rb.len() - consumed
                )));
            }
            let header = inner.read_header(offset);
            let size = header.record_size();
            if size % HEADER_ALIGN != 0 {
                return Err(InvariantError::new(format!(
                    "record at offset {offset} has unaligned size {size}"
                )));
            }
            if size > inner.rb.len() - consumed {
                return Err(InvariantError::new(format!(
                    "record at offset {offset} overruns the live window"
                )));
            }
            headers.insert(offset, header);
            consumed += size;
            offset = (offset + size) % cap;
        }

        let total = self.total.load(Ordering::Relaxed);
        if total != inner.index.len() as u64 {
            return Err(InvariantError::new(format!(
                "entry count {total} does not match index size {}",
                inner.index.len()
            )));
        }

        let mut access_sum = 0u64;
        for (&fingerprint, &offset) in &inner.index {
            let header = headers.get(&offset).ok_or_else(|| {
                InvariantError::new(format!(
                    "indexed offset {offset} does not start a record"
                ))
            })?;
            if header.hash != fingerprint {
                return Err(InvariantError::new(format!(
                    "index key {fingerprint:#x} points at record hash {:#x}",
                    header.hash
                )));
            }
            if header.deleted {
                return Err(InvariantError::new(format!(
                    "index key {fingerprint:#x} points at a tombstone"
                )));
            }
            access_sum += u64::from(header.access_time);
        }
        if access_sum != inner.total_access_time {
            return Err(InvariantError::new(format!(
                "access-time sum {access_sum} does not match tracked total {}",
                inner.total_access_time
            )));
        }
        Ok(())
    }

    /// Runs the eviction loop until `need` bytes are available.
    ///
    /// Head records are discarded when tombstoned, when their access stamp
    /// falls below the live mean, or when the relocation streak hits the
    /// cap; otherwise they are evacuated to the back of the window and
    /// their index offset rewritten.
    fn evacuate_for(&self, inner: &mut SegmentInner, need: usize) {
        let mut consecutive = 0;
        while inner.rb.available() < need {
            let offset = inner.rb.begin();
            let header = inner.read_header(offset);
            let size = header.record_size();

            let expired = self.total.load(Ordering::Relaxed) * u64::from(header.access_time)
                < inner.total_access_time;
            if header.deleted || expired || consecutive >= self.max_consecutive_evacuation {
                inner.rb.skip(size);
                // A same-fingerprint overwrite leaves a tombstone whose
                // index slot already belongs to the newer record; only
                // drop the slot while it still points here.
                if inner.index.get(&header.hash) == Some(&offset) {
                    inner.index.remove(&header.hash);
                }
                if !header.deleted {
                    self.total.fetch_sub(1, Ordering::Relaxed);
                    inner.total_access_time -= u64::from(header.access_time);
                }
                consecutive = 0;
            } else {
                let prev_end = inner.rb.evacuate(size);
                inner.index.insert(header.hash, prev_end);
                consecutive += 1;
            }
        }
    }

    fn key_matches(inner: &SegmentInner, header: &EntryHeader, offset: usize, key: &[u8]) -> bool {
        header.key_len as usize == key.len()
            && inner.rb.bytes_equal(offset + HEADER_SIZE, key)
    }
}

impl SegmentInner {
    fn read_header(&self, offset: usize) -> EntryHeader {
        let mut buf = [0u8; HEADER_SIZE];
        self.rb.read_at(&mut buf, offset);
        EntryHeader::decode(&buf)
    }

    fn write_header(&mut self, offset: usize, header: &EntryHeader) {
        self.rb.write_at(&header.encode(), offset);
    }
}
