//! Channel identifier type.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for channel ID generation.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one open WebSocket channel.
///
/// Channel IDs are generated using an atomic counter, ensuring uniqueness
/// within a single process lifetime. The ID is displayed as `chan-XXXXXXXX`
/// where X is a hexadecimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Create a new unique channel ID.
    pub fn new() -> Self {
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Create a ChannelId from a raw u64 value.
    ///
    /// This is primarily for testing.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chan-{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..10_000 {
            let id = ChannelId::new();
            assert!(ids.insert(id), "Duplicate ID generated: {}", id);
        }
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_display_format() {
        let id = ChannelId::from_raw(255);
        assert_eq!(id.as_u64(), 255);
        assert_eq!(id.to_string(), "chan-000000ff");

        let id2 = ChannelId::from_raw(0x12345678);
        assert_eq!(id2.to_string(), "chan-12345678");
    }

    #[test]
    fn test_hash_eq() {
        let id1 = ChannelId::from_raw(42);
        let id2 = ChannelId::from_raw(42);
        let id3 = ChannelId::from_raw(43);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);

        let mut set = HashSet::new();
        set.insert(id1);
        assert!(set.contains(&id2));
        assert!(!set.contains(&id3));
    }
}
