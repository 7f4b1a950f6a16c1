//! Overlay Controller
//!
//! The only writer of the overlay registry. Screens hold a cloned
//! [`OverlayController`] handle (it is passed down explicitly, never stored in
//! a global) and call [`register`](OverlayController::register),
//! [`open`](OverlayController::open), [`close`](OverlayController::close) and
//! [`destroy_all`](OverlayController::destroy_all). Renderers subscribe and
//! receive whole snapshots.
//!
//! # Ordering
//!
//! Every operation works on a copy of the current snapshot under the writer
//! lock and publishes the result in one atomic replacement, so observers only
//! ever see snapshots that correspond to a prefix of the issued calls. [`batch`](OverlayController::batch) applies
//! several operations in call order and publishes once.
//!
//! # Missing keys
//!
//! Opening or closing a key nobody registered is a silent no-op. Screens are
//! mounted independently and may race; a mis-keyed call must not become an
//! error and must not create an entry.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::entry::{OverlayKey, Priority};
use super::registry::{OverlaySnapshot, Registration};

thread_local! {
    /// Controllers with a batch running on this thread
    static ACTIVE_BATCHES: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a controller as inside `batch` on the current thread
struct BatchScope(usize);

impl BatchScope {
    fn enter(id: usize) -> Self {
        ACTIVE_BATCHES.with(|active| {
            let mut active = active.borrow_mut();
            assert!(
                !active.contains(&id),
                "OverlayController re-entered from inside its own batch"
            );
            active.push(id);
        });
        Self(id)
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        ACTIVE_BATCHES.with(|active| active.borrow_mut().retain(|&id| id != self.0));
    }
}

struct ControllerInner<P: ?Sized> {
    /// Priority handed to the next new key; reset by `destroy_all`
    next_priority: Mutex<Priority>,
    /// Snapshot channel (the registry itself)
    tx: watch::Sender<OverlaySnapshot<P>>,
}

/// Handle for registering, opening and closing overlays
///
/// Cloning is cheap; all clones share one registry.
pub struct OverlayController<P: ?Sized> {
    inner: Arc<ControllerInner<P>>,
}

impl<P: ?Sized> Clone for OverlayController<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: ?Sized> Default for OverlayController<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> fmt::Debug for OverlayController<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("OverlayController");
        match self.inner.next_priority.try_lock() {
            Some(next) => debug.field("next_priority", &*next),
            None => debug.field("next_priority", &"<locked>"),
        };
        debug.field("snapshot", &*self.inner.tx.borrow()).finish()
    }
}

impl<P: ?Sized> OverlayController<P> {
    /// Create a controller with an empty registry
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(OverlaySnapshot::empty());
        tracing::debug!("Overlay registry created");
        Self {
            inner: Arc::new(ControllerInner {
                next_priority: Mutex::new(Priority::FIRST),
                tx,
            }),
        }
    }

    /// Register an overlay, or replace the payload of an existing one
    ///
    /// A new key gets the next priority and starts closed. An existing key
    /// keeps its priority and open state; only the payload changes.
    pub fn register(&self, key: impl Into<OverlayKey>, payload: Arc<P>) {
        let key = key.into();
        self.batch(|batch| batch.register(key, payload));
    }

    /// Open a registered overlay (no-op for unknown keys)
    pub fn open(&self, key: &str) {
        self.batch(|batch| batch.open(key));
    }

    /// Close a registered overlay (no-op for unknown keys, idempotent)
    pub fn close(&self, key: &str) {
        self.batch(|batch| batch.close(key));
    }

    /// Open a closed overlay or close an open one
    ///
    /// Returns the new open state; `false` for unknown keys.
    pub fn toggle(&self, key: &str) -> bool {
        self.batch(|batch| batch.toggle(key))
    }

    /// Remove every overlay and restart priorities at 1
    pub fn destroy_all(&self) {
        self.batch(|batch| batch.destroy_all());
    }

    /// Apply several operations as one published change
    ///
    /// Operations take effect in call order; observers see a single new
    /// snapshot (or none if nothing changed). Use the [`OverlayBatch`] inside
    /// the closure; calling back into this controller (or a clone) panics.
    ///
    /// # Panics
    ///
    /// Panics when called from inside a running batch of the same registry.
    pub fn batch<R>(&self, f: impl FnOnce(&mut OverlayBatch<'_, P>) -> R) -> R {
        let _scope = BatchScope::enter(self.id());
        // Writer lock: held until the new snapshot is published
        let mut next_priority = self.inner.next_priority.lock();
        let mut snapshot = self.inner.tx.borrow().clone();

        let mut batch = OverlayBatch {
            snapshot: &mut snapshot,
            next_priority: &mut *next_priority,
            changed: false,
        };
        let result = f(&mut batch);
        let changed = batch.changed;

        if changed {
            self.inner.tx.send_replace(snapshot);
        }
        result
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }

    /// Current snapshot of the registry
    #[must_use]
    pub fn snapshot(&self) -> OverlaySnapshot<P> {
        self.inner.tx.borrow().clone()
    }

    /// Subscribe to snapshot changes
    ///
    /// The receiver starts with the current snapshot marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OverlaySnapshot<P>> {
        self.inner.tx.subscribe()
    }

    /// Check if a key is registered and open
    #[must_use]
    pub fn is_open(&self, key: &str) -> bool {
        self.inner.tx.borrow().is_open(key)
    }
}

/// Mutation scope handed to [`OverlayController::batch`]
pub struct OverlayBatch<'a, P: ?Sized> {
    snapshot: &'a mut OverlaySnapshot<P>,
    next_priority: &'a mut Priority,
    changed: bool,
}

impl<P: ?Sized> OverlayBatch<'_, P> {
    /// See [`OverlayController::register`]
    pub fn register(&mut self, key: impl Into<OverlayKey>, payload: Arc<P>) {
        let key = key.into();
        match self.snapshot.register(key.clone(), payload, *self.next_priority) {
            Registration::Created(priority) => {
                *self.next_priority = priority.next();
                tracing::debug!(key = %key, priority = %priority, "Overlay registered");
            }
            Registration::Updated(priority) => {
                tracing::trace!(key = %key, priority = %priority, "Overlay payload replaced");
            }
        }
        self.changed = true;
    }

    /// See [`OverlayController::open`]
    pub fn open(&mut self, key: &str) {
        self.set_open(key, true);
    }

    /// See [`OverlayController::close`]
    pub fn close(&mut self, key: &str) {
        self.set_open(key, false);
    }

    /// See [`OverlayController::toggle`]
    pub fn toggle(&mut self, key: &str) -> bool {
        let open = !self.snapshot.is_open(key);
        if self.snapshot.contains(key) {
            self.set_open(key, open);
            open
        } else {
            tracing::debug!(key = %key, "Toggle ignored for unregistered overlay");
            false
        }
    }

    /// See [`OverlayController::destroy_all`]
    pub fn destroy_all(&mut self) {
        let removed = self.snapshot.len();
        if self.snapshot.clear() {
            self.changed = true;
        }
        *self.next_priority = Priority::FIRST;
        tracing::info!(removed, "Overlay registry destroyed");
    }

    /// The registry as modified so far in this batch
    #[must_use]
    pub fn snapshot(&self) -> &OverlaySnapshot<P> {
        self.snapshot
    }

    fn set_open(&mut self, key: &str, open: bool) {
        if self.snapshot.set_open(key, open) {
            self.changed = true;
            tracing::debug!(key = %key, open, "Overlay visibility changed");
        } else if !self.snapshot.contains(key) {
            tracing::debug!(key = %key, open, "Visibility change ignored for unregistered overlay");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Controller = OverlayController<str>;

    fn payload(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn test_register_assigns_increasing_priorities() {
        let controller = Controller::new();
        controller.register("a", payload("A"));
        controller.register("b", payload("B"));
        controller.register("c", payload("C"));

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.priority("a"), Some(Priority::from_raw(1)));
        assert_eq!(snapshot.priority("b"), Some(Priority::from_raw(2)));
        assert_eq!(snapshot.priority("c"), Some(Priority::from_raw(3)));
    }

    #[test]
    fn test_update_keeps_priority_and_open_state() {
        let controller = Controller::new();
        controller.register("a", payload("first"));
        controller.register("b", payload("other"));
        controller.open("a");

        controller.register("a", payload("second"));

        let snapshot = controller.snapshot();
        let entry = snapshot.get("a").unwrap();
        assert_eq!(&*entry.payload, "second");
        assert_eq!(entry.priority, Priority::from_raw(1));
        assert!(entry.is_open);
    }

    #[test]
    fn test_update_does_not_consume_priority() {
        let controller = Controller::new();
        controller.register("a", payload("1"));
        controller.register("a", payload("2"));
        controller.register("b", payload("3"));

        assert_eq!(
            controller.snapshot().priority("b"),
            Some(Priority::from_raw(2))
        );
    }

    #[test]
    fn test_open_unregistered_key_is_noop() {
        let controller = Controller::new();
        controller.register("a", payload("A"));
        let before = controller.snapshot();

        controller.open("ghost");

        let after = controller.snapshot();
        assert_eq!(after.len(), 1);
        assert!(!after.contains("ghost"));
        assert_eq!(after.revision(), before.revision());
    }

    #[test]
    fn test_close_is_idempotent() {
        let controller = Controller::new();
        controller.register("a", payload("A"));
        controller.open("a");

        controller.close("a");
        let once = controller.snapshot();
        controller.close("a");
        let twice = controller.snapshot();

        assert!(!twice.is_open("a"));
        assert_eq!(once.revision(), twice.revision());
    }

    #[test]
    fn test_destroy_all_resets_priorities() {
        let controller = Controller::new();
        controller.register("a", payload("A"));
        controller.register("b", payload("B"));
        controller.open("b");

        controller.destroy_all();
        assert!(controller.snapshot().is_empty());

        controller.register("b", payload("B again"));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.priority("b"), Some(Priority::FIRST));
        assert!(!snapshot.is_open("b"));
    }

    #[test]
    fn test_toggle() {
        let controller = Controller::new();
        controller.register("a", payload("A"));

        assert!(controller.toggle("a"));
        assert!(controller.is_open("a"));
        assert!(!controller.toggle("a"));
        assert!(!controller.is_open("a"));
        assert!(!controller.toggle("ghost"));
        assert!(!controller.snapshot().contains("ghost"));
    }

    #[test]
    fn test_clones_share_registry() {
        let controller = Controller::new();
        let screen = controller.clone();

        screen.register("a", payload("A"));
        screen.open("a");

        assert!(controller.is_open("a"));
    }

    #[test]
    fn test_batch_registers_in_call_order() {
        let controller = Controller::new();
        controller.batch(|batch| {
            batch.register("second-screen", payload("x"));
            batch.register("first-screen", payload("y"));
            batch.open("first-screen");
        });

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.priority("second-screen"), Some(Priority::from_raw(1)));
        assert_eq!(snapshot.priority("first-screen"), Some(Priority::from_raw(2)));
        assert!(snapshot.is_open("first-screen"));
    }

    #[tokio::test]
    async fn test_batch_publishes_once() {
        let controller = Controller::new();
        let mut rx = controller.subscribe();

        controller.batch(|batch| {
            batch.register("a", payload("A"));
            batch.register("b", payload("B"));
            batch.open("a");
            batch.open("b");
        });

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.open_count(), 2);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_noop_does_not_notify() {
        let controller = Controller::new();
        controller.register("a", payload("A"));
        let mut rx = controller.subscribe();

        controller.open("ghost");
        controller.close("a");

        assert!(!rx.has_changed().unwrap());

        controller.open("a");
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_open("a"));
    }

    #[test]
    fn test_held_snapshot_is_stable() {
        let controller = Controller::new();
        controller.register("a", payload("A"));
        let held = controller.snapshot();

        controller.open("a");
        controller.register("b", payload("B"));

        assert!(!held.is_open("a"));
        assert!(!held.contains("b"));
    }

    #[test]
    #[should_panic(expected = "re-entered from inside its own batch")]
    fn test_reentrant_batch_panics() {
        let controller = Controller::new();
        let screen = controller.clone();
        controller.batch(|batch| {
            batch.register("a", payload("A"));
            screen.open("a");
        });
    }

    #[test]
    fn test_controller_usable_after_reentrant_panic() {
        let controller = Controller::new();
        let screen = controller.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            controller.batch(|_| screen.register("a", payload("A")));
        }));
        assert!(result.is_err());

        screen.register("b", payload("B"));
        assert_eq!(controller.snapshot().priority("b"), Some(Priority::FIRST));
    }

    #[test]
    fn test_debug_inside_batch_does_not_block() {
        let controller = Controller::new();
        let screen = controller.clone();
        let rendered = controller.batch(|batch| {
            batch.register("a", payload("A"));
            format!("{screen:?}")
        });
        assert!(rendered.contains("<locked>"));
    }
}
