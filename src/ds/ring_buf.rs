//! Fixed-capacity byte ring with seam-transparent region operations.
//!
//! Stores opaque byte regions in a circular buffer addressed by absolute
//! offsets in `[0, capacity)`. The live window is `[begin, begin + size)` in
//! ring order; bytes outside it are free and may be overwritten.
//!
//! ## Architecture
//!
//! ```text
//!   data: [ .  .  A  B  C  D  .  . ]      capacity = 8, size = 4
//!                 ^begin       ^end
//!
//!   After the window wraps past the physical end ("the seam"):
//!
//!   data: [ C  D  .  .  .  .  A  B ]      capacity = 8, size = 4
//!                ^end         ^begin
//! ```
//!
//! ## Operations
//! - `append` / `append_empty`: extend the window at `end`
//! - `read_at` / `write_at` / `bytes_equal`: random access; offsets are
//!   normalized modulo capacity and regions split at the seam as needed
//! - `skip`: retire bytes from the front of the window
//! - `evacuate`: relocate the front `n` bytes to the back of the window,
//!   leaving `size` unchanged
//!
//! Availability is the caller's contract: `append` and `append_empty` require
//! `size + n <= capacity` (check through [`RingBuf::available`]); `skip` and
//! `evacuate` require `n <= size`. Violations assert.

/// Fixed-size circular byte buffer with a logical `[begin, begin + size)`
/// live window.
#[derive(Debug)]
pub struct RingBuf {
    data: Box<[u8]>,
    begin: usize,
    size: usize,
}

impl RingBuf {
    /// Creates a ring of `capacity` bytes, all free.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be positive");
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            begin: 0,
            size: 0,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of live bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the window holds no live bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bytes that may be appended without overwriting live data.
    pub fn available(&self) -> usize {
        self.data.len() - self.size
    }

    /// Inclusive start of the live window.
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Exclusive end of the live window, `(begin + size) % capacity`.
    pub fn end(&self) -> usize {
        (self.begin + self.size) % self.data.len()
    }

    /// Appends `src` at the current end, wrapping across the seam.
    ///
    /// Returns the offset the write began at (the pre-append end).
    pub fn append(&mut self, src: &[u8]) -> usize {
        assert!(src.len() <= self.available(), "append past capacity");
        let offset = self.end();
        self.copy_in(src, offset);
        self.size += src.len();
        offset
    }

    /// Reserves `n` bytes at the end without touching their contents.
    ///
    /// Used for trailing record padding; the reserved bytes are
    /// uninitialized as far as callers are concerned.
    pub fn append_empty(&mut self, n: usize) {
        assert!(n <= self.available(), "append past capacity");
        self.size += n;
    }

    /// Copies `dst.len()` bytes starting at `offset` into `dst`, wrapping
    /// across the seam. `offset` is normalized modulo capacity.
    pub fn read_at(&self, dst: &mut [u8], offset: usize) {
        let cap = self.data.len();
        let offset = offset % cap;
        let first = dst.len().min(cap - offset);
        let (dst_first, dst_rest) = dst.split_at_mut(first);
        dst_first.copy_from_slice(&self.data[offset..offset + first]);
        dst_rest.copy_from_slice(&self.data[..dst_rest.len()]);
    }

    /// Converse of [`read_at`](Self::read_at): copies `src` into the ring
    /// starting at `offset` (normalized modulo capacity).
    pub fn write_at(&mut self, src: &[u8], offset: usize) {
        let offset = offset % self.data.len();
        self.copy_in(src, offset);
    }

    /// Byte-for-byte comparison of the `probe.len()` bytes at `offset`
    /// (normalized modulo capacity) against `probe`, across the seam.
    pub fn bytes_equal(&self, offset: usize, probe: &[u8]) -> bool {
        let cap = self.data.len();
        let offset = offset % cap;
        let first = probe.len().min(cap - offset);
        self.data[offset..offset + first] == probe[..first]
            && self.data[..probe.len() - first] == probe[first..]
    }

    /// Retires the first `n` live bytes.
    pub fn skip(&mut self, n: usize) {
        assert!(n <= self.size, "skip past live window");
        self.begin = (self.begin + n) % self.data.len();
        self.size -= n;
    }

    /// Relocates the front `n` live bytes to the position immediately after
    /// the current end, then advances `begin` by `n`. `size` is unchanged.
    ///
    /// Returns the pre-call end, where the relocated bytes now start
    /// (modulo capacity). After the call, reading `n` bytes from the
    /// returned offset yields exactly what the front `n` bytes held before.
    ///
    /// Chunks are copied front to back, splitting source and destination at
    /// the seam, so a write can only land on source bytes that have already
    /// been consumed; an overlapping chunk relies on `copy_within`'s
    /// memmove semantics.
    pub fn evacuate(&mut self, n: usize) -> usize {
        assert!(n <= self.size, "evacuate past live window");
        let cap = self.data.len();
        let prev_end = self.end();
        let mut src = self.begin;
        let mut dst = prev_end;
        let mut remaining = n;
        while remaining > 0 {
            let run = remaining.min(cap - src).min(cap - dst);
            self.data.copy_within(src..src + run, dst);
            src = (src + run) % cap;
            dst = (dst + run) % cap;
            remaining -= run;
        }
        self.begin = (self.begin + n) % cap;
        prev_end
    }

    fn copy_in(&mut self, src: &[u8], offset: usize) {
        let cap = self.data.len();
        let first = src.len().min(cap - offset);
        self.data[offset..offset + first].copy_from_slice(&src[..first]);
        self.data[..src.len() - first].copy_from_slice(&src[first..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(rb: &RingBuf) -> Vec<u8> {
        let mut out = vec![0u8; rb.len()];
        rb.read_at(&mut out, rb.begin());
        out
    }

    #[test]
    fn append_then_read_round_trips() {
        let mut rb = RingBuf::new(16);
        let offset = rb.append(&[1, 2, 3, 4]);
        assert_eq!(offset, 0);
        assert_eq!(rb.len(), 4);
        assert_eq!(rb.available(), 12);

        let mut buf = [0u8; 4];
        rb.read_at(&mut buf, offset);
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn append_wraps_across_seam() {
        let mut rb = RingBuf::new(8);
        rb.append(&[0; 6]);
        rb.skip(6);
        // end = 6, so four bytes straddle the seam (two before, two after).
        let offset = rb.append(&[10, 11, 12, 13]);
        assert_eq!(offset, 6);
        assert_eq!(rb.end(), 2);

        let mut buf = [0u8; 4];
        rb.read_at(&mut buf, 6);
        assert_eq!(buf, [10, 11, 12, 13]);
    }

    #[test]
    fn read_at_normalizes_offset() {
        let mut rb = RingBuf::new(8);
        rb.append(&[5, 6, 7]);

        let mut buf = [0u8; 3];
        rb.read_at(&mut buf, 8);
        assert_eq!(buf, [5, 6, 7]);
        rb.read_at(&mut buf, 16);
        assert_eq!(buf, [5, 6, 7]);
    }

    #[test]
    fn write_at_read_at_round_trips_across_seam() {
        let mut rb = RingBuf::new(8);
        rb.append(&[0; 6]);
        rb.skip(6);
        rb.append(&[0; 5]); // live window [6, 11) wraps at 8

        rb.write_at(&[20, 21, 22, 23], 7);
        let mut buf = [0u8; 4];
        rb.read_at(&mut buf, 7);
        assert_eq!(buf, [20, 21, 22, 23]);
    }

    #[test]
    fn bytes_equal_across_seam() {
        let mut rb = RingBuf::new(8);
        rb.append(&[0; 7]);
        rb.skip(7);
        rb.append(&[1, 2, 3]); // bytes at 7, 0, 1

        assert!(rb.bytes_equal(7, &[1, 2, 3]));
        assert!(!rb.bytes_equal(7, &[1, 2, 4]));
        assert!(!rb.bytes_equal(7, &[2, 2, 3]));
        // Normalized offset compares the same region.
        assert!(rb.bytes_equal(15, &[1, 2, 3]));
    }

    #[test]
    fn skip_retires_front_bytes() {
        let mut rb = RingBuf::new(8);
        rb.append(&[1, 2, 3, 4, 5]);
        rb.skip(2);
        assert_eq!(rb.begin(), 2);
        assert_eq!(rb.len(), 3);
        assert_eq!(window(&rb), [3, 4, 5]);
    }

    #[test]
    fn append_empty_reserves_without_writing() {
        let mut rb = RingBuf::new(8);
        rb.append(&[1, 2]);
        rb.append_empty(3);
        assert_eq!(rb.len(), 5);
        assert_eq!(rb.end(), 5);
        assert_eq!(rb.available(), 3);
    }

    #[test]
    fn evacuate_moves_front_to_back() {
        let mut rb = RingBuf::new(16);
        rb.append(&[1, 2, 3, 4]);
        rb.append(&[5, 6, 7, 8]);

        let prev_end = rb.evacuate(4);
        assert_eq!(prev_end, 8);
        assert_eq!(rb.begin(), 4);
        assert_eq!(rb.len(), 8);

        let mut buf = [0u8; 4];
        rb.read_at(&mut buf, prev_end);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(window(&rb), [5, 6, 7, 8, 1, 2, 3, 4]);
    }

    #[test]
    fn evacuate_with_wrapping_source_and_destination() {
        let mut rb = RingBuf::new(8);
        rb.append(&[0; 5]);
        rb.skip(5);
        rb.append(&[1, 2, 3, 4, 5]); // window [5, 10): wraps at 8
        rb.skip(1);
        // begin = 6, size = 4, end = 2; evacuate a front region that itself
        // straddles the seam into a destination that stays contiguous.
        let before = window(&rb);
        let prev_end = rb.evacuate(3);
        assert_eq!(prev_end, 2);

        let mut buf = [0u8; 3];
        rb.read_at(&mut buf, prev_end);
        assert_eq!(buf, before[..3]);
        assert_eq!(window(&rb), [5, 2, 3, 4]);
    }

    #[test]
    fn evacuate_full_ring_rotates_window() {
        let mut rb = RingBuf::new(8);
        rb.append(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(rb.available(), 0);

        // With a full ring, end == begin and the copy is an identity move;
        // only the window origin changes.
        let prev_end = rb.evacuate(3);
        assert_eq!(prev_end, 0);
        assert_eq!(rb.begin(), 3);
        assert_eq!(rb.len(), 8);
        assert_eq!(window(&rb), [4, 5, 6, 7, 8, 1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "append past capacity")]
    fn append_past_capacity_asserts() {
        let mut rb = RingBuf::new(4);
        rb.append(&[0; 5]);
    }

    #[test]
    #[should_panic(expected = "skip past live window")]
    fn skip_past_window_asserts() {
        let mut rb = RingBuf::new(4);
        rb.append(&[1]);
        rb.skip(2);
    }
}
