//! Overlay Registry
//!
//! Immutable snapshot of every registered overlay. The controller produces a
//! new snapshot per mutation with copy-on-write (`Arc::make_mut`), so a
//! renderer holding an older snapshot keeps seeing exactly what it was given.
//!
//! The mutators here are `pub(crate)`: only the controller calls them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::entry::{OverlayEntry, OverlayKey, Priority};

/// Read-only view of the overlay registry at one point in time
pub struct OverlaySnapshot<P: ?Sized> {
    /// Entries by key (container order carries no meaning)
    entries: Arc<HashMap<OverlayKey, OverlayEntry<P>>>,
    /// Number of applied mutations that produced this snapshot
    revision: u64,
}

/// What a registration did to the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Registration {
    /// A new entry was created with this priority
    Created(Priority),
    /// An existing entry had its payload replaced
    Updated(Priority),
}

impl<P: ?Sized> OverlaySnapshot<P> {
    /// Create an empty snapshot
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Arc::new(HashMap::new()),
            revision: 0,
        }
    }

    /// Get an entry by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OverlayEntry<P>> {
        self.entries.get(key)
    }

    /// Check if a key is registered
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Check if a key is registered and currently open
    #[must_use]
    pub fn is_open(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| e.is_open)
    }

    /// Priority of a registered key
    #[must_use]
    pub fn priority(&self, key: &str) -> Option<Priority> {
        self.entries.get(key).map(|e| e.priority)
    }

    /// Number of registered entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of open entries
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_open).count()
    }

    /// Iterate over all entries (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &OverlayEntry<P>> {
        self.entries.values()
    }

    /// Registered keys, sorted by priority
    #[must_use]
    pub fn keys_by_priority(&self) -> Vec<OverlayKey> {
        let mut entries: Vec<&OverlayEntry<P>> = self.entries.values().collect();
        entries.sort_by_key(|e| e.priority);
        entries.into_iter().map(|e| e.key.clone()).collect()
    }

    /// Mutation counter for this snapshot
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Check if two snapshots share the same underlying entry map
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Insert a new entry or replace the payload of an existing one
    pub(crate) fn register(
        &mut self,
        key: OverlayKey,
        payload: Arc<P>,
        priority_if_new: Priority,
    ) -> Registration {
        let entries = Arc::make_mut(&mut self.entries);
        let outcome = match entries.get_mut(&key) {
            Some(entry) => {
                entry.payload = payload;
                Registration::Updated(entry.priority)
            }
            None => {
                entries.insert(
                    key.clone(),
                    OverlayEntry::new(key, payload, priority_if_new),
                );
                Registration::Created(priority_if_new)
            }
        };
        self.revision += 1;
        outcome
    }

    /// Set the open flag of an existing entry
    ///
    /// Returns `true` if the flag changed. Absent keys and already-matching
    /// flags leave the snapshot untouched (no copy is made).
    pub(crate) fn set_open(&mut self, key: &str, open: bool) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_open != open => {}
            _ => return false,
        }
        if let Some(entry) = Arc::make_mut(&mut self.entries).get_mut(key) {
            entry.is_open = open;
        }
        self.revision += 1;
        true
    }

    /// Remove every entry
    ///
    /// Returns `true` if anything was removed.
    pub(crate) fn clear(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.entries = Arc::new(HashMap::new());
        self.revision += 1;
        true
    }
}

impl<P: ?Sized> Clone for OverlaySnapshot<P> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            revision: self.revision,
        }
    }
}

impl<P: ?Sized> Default for OverlaySnapshot<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<P: ?Sized> fmt::Debug for OverlaySnapshot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<&OverlayEntry<P>> = self.entries.values().collect();
        entries.sort_by_key(|e| e.priority);
        f.debug_struct("OverlaySnapshot")
            .field("revision", &self.revision)
            .field("entries", &entries)
            .finish()
    }
}
