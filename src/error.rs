//! Error types for the ringcache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are
//!   invalid (e.g. zero segments, a segment smaller than a record header).
//! - [`InvariantError`]: Returned by `check_invariants` methods when a
//!   segment's internal structure is inconsistent.
//!
//! ## Example Usage
//!
//! ```
//! use ringcache::builder::CacheBuilder;
//! use ringcache::error::ConfigError;
//!
//! // Fallible construction for user-supplied parameters
//! let cache = CacheBuilder::new(4, 64 * 1024).try_build();
//! assert!(cache.is_ok());
//!
//! // Invalid segment count is caught without panicking
//! let bad: Result<_, ConfigError> = CacheBuilder::new(0, 64 * 1024).try_build();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache construction parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed
/// validation.
///
/// # Example
///
/// ```
/// use ringcache::builder::CacheBuilder;
///
/// let err = CacheBuilder::new(4, 1).try_build().unwrap_err();
/// assert!(err.to_string().contains("segment size"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when a segment's internal invariants are violated.
///
/// Produced by [`Segment::check_invariants`](crate::segment::Segment::check_invariants)
/// and [`Cache::check_invariants`](crate::cache::Cache::check_invariants),
/// which walk the ring and cross-check the index, entry count, and
/// access-time bookkeeping. Carries a description of the first violation
/// found.
///
/// # Example
///
/// ```
/// use ringcache::cache::Cache;
///
/// let cache = Cache::new(2, 4096);
/// cache.put(b"key", b"value");
/// assert!(cache.check_invariants().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("number of segments must be at least 1");
        assert_eq!(err.to_string(), "number of segments must be at least 1");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("entry count mismatch");
        assert_eq!(err.to_string(), "entry count mismatch");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("stale offset");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("stale offset"));
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }
}
