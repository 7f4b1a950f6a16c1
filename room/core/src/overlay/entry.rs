//! Overlay entry types
//!
//! Keys, priorities and the entry record stored in the registry.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Caller-chosen identifier for one overlay slot
///
/// Keys are never generated by the manager; screens pick a stable name
/// (`"treatment"`, `"leave-session"`) and use it for every call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayKey(Arc<str>);

impl OverlayKey {
    /// Create a key from any string-like value
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Borrow the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OverlayKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for OverlayKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl From<&OverlayKey> for OverlayKey {
    fn from(key: &OverlayKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for OverlayKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Stacking priority, assigned once per key at first registration
///
/// Higher priorities paint later (on top). The first key registered into an
/// empty registry gets priority 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Priority(u32);

impl Priority {
    /// Priority handed to the first key of an empty registry
    pub const FIRST: Self = Self(1);

    /// Create a priority from a raw value (for tests and z-order math)
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw numeric value
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The priority that follows this one
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered overlay
///
/// The payload is shared behind an `Arc` so that snapshots can be cloned
/// without copying renderable content. The manager never looks inside it.
pub struct OverlayEntry<P: ?Sized> {
    /// Key the entry was registered under
    pub key: OverlayKey,
    /// Opaque renderable content
    pub payload: Arc<P>,
    /// Fixed stacking priority
    pub priority: Priority,
    /// Whether the overlay is currently shown
    pub is_open: bool,
}

impl<P: ?Sized> OverlayEntry<P> {
    pub(crate) fn new(key: OverlayKey, payload: Arc<P>, priority: Priority) -> Self {
        Self {
            key,
            payload,
            priority,
            is_open: false,
        }
    }
}

// Manual impls: `P` itself need not be `Clone`/`Debug`.
impl<P: ?Sized> Clone for OverlayEntry<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            payload: Arc::clone(&self.payload),
            priority: self.priority,
            is_open: self.is_open,
        }
    }
}

impl<P: ?Sized> fmt::Debug for OverlayEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayEntry")
            .field("key", &self.key)
            .field("priority", &self.priority)
            .field("is_open", &self.is_open)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_conversions() {
        let from_str = OverlayKey::from("treatment");
        let from_string = OverlayKey::from("treatment".to_string());
        assert_eq!(from_str, from_string);
        assert_eq!(from_str.as_str(), "treatment");
        assert_eq!(from_str.to_string(), "treatment");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::FIRST < Priority::FIRST.next());
        assert_eq!(Priority::FIRST.next().get(), 2);
        assert_eq!(Priority::from_raw(u32::MAX).next().get(), u32::MAX);
    }

    #[test]
    fn test_new_entry_starts_closed() {
        let entry = OverlayEntry::new(OverlayKey::from("a"), Arc::new(()), Priority::FIRST);
        assert!(!entry.is_open);
        assert_eq!(entry.priority, Priority::FIRST);
    }
}
