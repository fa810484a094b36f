//! On-ring record header: explicit pack/unpack of the fixed 20-byte prefix.
//!
//! Field offsets are part of the in-memory storage contract and must stay
//! stable for the lifetime of a segment. Fields are encoded little-endian;
//! the layout is never persisted, so cross-process portability is not a
//! concern.

/// Packed size of a record header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Alignment every record size is rounded up to.
pub const HEADER_ALIGN: usize = 4;

/// Parsed form of a record header.
///
/// A record occupies `HEADER_SIZE + key_len + val_cap` contiguous logical
/// bytes in the ring: header, key, value, then `val_cap - val_len` bytes of
/// trailing padding. `val_cap` is sized so the record size is a multiple of
/// [`HEADER_ALIGN`].
///
/// ```text
///   offset  0        4            8         10       11    12       16
///           | hash   | access_time| key_len  | deleted| pad | val_len | val_cap |
///           |  u32   |    u32     |   u16    |   u8   | u8  |   u32   |   u32   |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    /// Per-segment fingerprint (low 32 bits of the key hash).
    pub hash: u32,
    /// Coarse timestamp of the last access.
    pub access_time: u32,
    /// Key length in bytes.
    pub key_len: u16,
    /// Tombstone flag; the record's bytes stay in the ring until the
    /// eviction cursor reaches them.
    pub deleted: bool,
    /// Current value length.
    pub val_len: u32,
    /// Bytes reserved for the key+value region, minus the key length.
    pub val_cap: u32,
}

impl EntryHeader {
    /// Packs the header into its on-ring byte layout.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.hash.to_le_bytes());
        buf[4..8].copy_from_slice(&self.access_time.to_le_bytes());
        buf[8..10].copy_from_slice(&self.key_len.to_le_bytes());
        buf[10] = self.deleted as u8;
        buf[12..16].copy_from_slice(&self.val_len.to_le_bytes());
        buf[16..20].copy_from_slice(&self.val_cap.to_le_bytes());
        buf
    }

    /// Unpacks a header from its on-ring byte layout.
    pub fn decode(buf: &[u8; HEADER_SIZE]) -> Self {
        Self {
            hash: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            access_time: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            key_len: u16::from_le_bytes(buf[8..10].try_into().unwrap()),
            deleted: buf[10] != 0,
            val_len: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
            val_cap: u32::from_le_bytes(buf[16..20].try_into().unwrap()),
        }
    }

    /// Total logical bytes the record occupies in the ring.
    pub fn record_size(&self) -> usize {
        HEADER_SIZE + self.key_len as usize + self.val_cap as usize
    }
}

/// Rounds `n` up to the next multiple of [`HEADER_ALIGN`].
pub fn align_up(n: u32) -> u32 {
    (n + (HEADER_ALIGN as u32 - 1)) & !(HEADER_ALIGN as u32 - 1)
}
