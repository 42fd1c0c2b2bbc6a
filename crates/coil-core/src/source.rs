//! Shared power sources
//!
//! A [`PowerSource`] is the token shared by every wire in one connected
//! group. It records which wires are currently driving power into the group
//! and derives the group's state from that set: powered while the set is
//! non-empty.
//!
//! The source remembers the last state it reported. Listeners are notified
//! only when the derived state differs from that remembered value, so every
//! notification is a real flip.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::event::{self, ListenerId, ListenerSet, PowerListener, PowerStateChanged};
use crate::identity::{SourceId, WireId};
use crate::instrumentation;

/// Power token shared by every wire in a connected group
///
/// Usually handled as `Arc<PowerSource>`. Bulk edits made by a connection
/// manager ([`absorb`](Self::absorb), [`retain_drivers`](Self::retain_drivers))
/// do not notify; the manager calls [`notify_state`](Self::notify_state) once
/// the group's bindings are consistent again.
pub struct PowerSource {
    id: SourceId,
    state: Mutex<SourceState>,
    listeners: Mutex<ListenerSet>,
}

#[derive(Debug, Default)]
struct SourceState {
    /// Wires currently asserting power, in assertion order, no duplicates
    drivers: Vec<WireId>,
    /// The last state reported to listeners
    observed: bool,
}

impl SourceState {
    fn powered(&self) -> bool {
        !self.drivers.is_empty()
    }

    /// Re-derive the state, returning the event to deliver if it flipped
    fn take_flip(&mut self) -> Option<PowerStateChanged> {
        let powered = self.powered();
        if powered == self.observed {
            return None;
        }
        self.observed = powered;
        Some(PowerStateChanged::new(powered))
    }
}

impl PowerSource {
    /// Create an unpowered source with no drivers
    pub fn new() -> Self {
        Self {
            id: SourceId::next(),
            state: Mutex::new(SourceState::default()),
            listeners: Mutex::new(ListenerSet::default()),
        }
    }

    /// Create a source seeded with `drivers`
    ///
    /// The source starts with an unpowered observed state, so a later
    /// [`notify_state`](Self::notify_state) reports the seeded power.
    pub fn with_drivers(drivers: impl IntoIterator<Item = WireId>) -> Self {
        let source = Self::new();
        {
            let mut state = source.state.lock();
            for wire in drivers {
                if !state.drivers.contains(&wire) {
                    state.drivers.push(wire);
                }
            }
        }
        source
    }

    /// Get the source identity
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Mark `wire` as driving power into this source
    ///
    /// Idempotent: asserting an already-driving wire changes nothing.
    pub fn assert_driver(&self, wire: WireId) {
        self.mutate(|drivers| {
            if drivers.contains(&wire) {
                return false;
            }
            drivers.push(wire);
            true
        });
    }

    /// Mark `wire` as no longer driving power into this source
    pub fn retract_driver(&self, wire: WireId) {
        self.mutate(|drivers| {
            let before = drivers.len();
            drivers.retain(|driver| *driver != wire);
            drivers.len() != before
        });
    }

    /// Drop every driver, de-energising the whole group
    pub fn reset(&self) {
        self.mutate(|drivers| {
            if drivers.is_empty() {
                return false;
            }
            drivers.clear();
            true
        });
    }

    /// Check whether any wire is driving this source
    pub fn is_powered(&self) -> bool {
        self.state.lock().powered()
    }

    /// Get the wires driving this source, in assertion order
    pub fn driving_wires(&self) -> Vec<WireId> {
        self.state.lock().drivers.clone()
    }

    /// Check whether `wire` is driving this source
    pub fn is_driven_by(&self, wire: WireId) -> bool {
        self.state.lock().drivers.contains(&wire)
    }

    /// Get the number of driving wires
    pub fn driver_count(&self) -> usize {
        self.state.lock().drivers.len()
    }

    /// Add every driver of `other` to this source without notifying
    ///
    /// Returns the number of drivers added.
    pub fn absorb(&self, other: &PowerSource) -> usize {
        if std::ptr::eq(self, other) {
            return 0;
        }

        let incoming = other.driving_wires();
        let mut added = 0;
        {
            let mut state = self.state.lock();
            for wire in incoming {
                if !state.drivers.contains(&wire) {
                    state.drivers.push(wire);
                    added += 1;
                }
            }
        }

        if added > 0 {
            trace!(source = %self.id, from = %other.id, added, "Absorbed drivers");
            instrumentation::notify_value_pushed(self.id);
        }
        added
    }

    /// Keep only the drivers for which `keep` returns true, without notifying
    ///
    /// Returns the number of drivers removed.
    pub fn retain_drivers(&self, mut keep: impl FnMut(WireId) -> bool) -> usize {
        let removed = {
            let mut state = self.state.lock();
            let before = state.drivers.len();
            state.drivers.retain(|wire| keep(*wire));
            before - state.drivers.len()
        };

        if removed > 0 {
            trace!(source = %self.id, removed, "Pruned drivers");
            instrumentation::notify_value_pushed(self.id);
        }
        removed
    }

    /// Re-derive the power state and notify listeners if it flipped
    pub fn notify_state(&self) {
        let flip = self.state.lock().take_flip();
        if let Some(event) = flip {
            self.dispatch(&event);
        }
    }

    /// Register a listener for flips of this source
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PowerStateChanged) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Register an already shared listener
    pub fn subscribe_shared(&self, listener: PowerListener) -> ListenerId {
        self.listeners.lock().insert(listener)
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.lock().remove(id)
    }

    /// Get the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn mutate(&self, edit: impl FnOnce(&mut Vec<WireId>) -> bool) {
        let (changed, flip) = {
            let mut state = self.state.lock();
            let changed = edit(&mut state.drivers);
            let flip = if changed { state.take_flip() } else { None };
            (changed, flip)
        };

        if !changed {
            return;
        }
        instrumentation::notify_value_pushed(self.id);
        if let Some(event) = flip {
            self.dispatch(&event);
        }
    }

    fn dispatch(&self, event: &PowerStateChanged) {
        trace!(source = %self.id, state = event.state, "Power state flipped");
        let listeners = self.listeners.lock().snapshot();
        event::dispatch(&listeners, event);
    }
}

impl Default for PowerSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PowerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PowerSource")
            .field("id", &self.id)
            .field("drivers", &state.drivers)
            .field("powered", &state.powered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    fn recorder(source: &PowerSource) -> Arc<PlMutex<Vec<bool>>> {
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        source.subscribe(move |event| sink.lock().push(event.state));
        seen
    }

    #[test]
    fn test_new_source_is_unpowered() {
        let source = PowerSource::new();
        assert!(!source.is_powered());
        assert_eq!(source.driver_count(), 0);
    }

    #[test]
    fn test_assert_is_idempotent() {
        let source = PowerSource::new();
        let seen = recorder(&source);
        let wire = WireId::next();

        source.assert_driver(wire);
        source.assert_driver(wire);

        assert!(source.is_powered());
        assert_eq!(source.driving_wires(), vec![wire]);
        assert_eq!(*seen.lock(), vec![true]);
    }

    #[test]
    fn test_notifies_only_on_flip() {
        let source = PowerSource::new();
        let seen = recorder(&source);
        let a = WireId::next();
        let b = WireId::next();

        source.assert_driver(a);
        source.assert_driver(b); // still powered
        source.retract_driver(a); // still powered by b
        source.retract_driver(b);
        source.retract_driver(b); // not driving

        assert!(!source.is_powered());
        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[test]
    fn test_reset_clears_all_drivers() {
        let source = PowerSource::new();
        let seen = recorder(&source);
        source.assert_driver(WireId::next());
        source.assert_driver(WireId::next());

        source.reset();
        assert!(!source.is_powered());
        assert_eq!(*seen.lock(), vec![true, false]);

        source.reset();
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_absorb_skips_duplicates_and_defers_notification() {
        let a = PowerSource::new();
        let b = PowerSource::new();
        let seen = recorder(&a);
        let shared = WireId::next();
        let only_b = WireId::next();

        a.assert_driver(shared);
        b.assert_driver(shared);
        b.assert_driver(only_b);
        seen.lock().clear();

        assert_eq!(a.absorb(&b), 1);
        assert_eq!(a.driving_wires(), vec![shared, only_b]);
        assert_eq!(a.absorb(&a), 0);

        // Still powered, nothing to report
        a.notify_state();
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_retain_then_notify() {
        let source = PowerSource::new();
        let seen = recorder(&source);
        let a = WireId::next();
        let b = WireId::next();
        source.assert_driver(a);
        source.assert_driver(b);

        assert_eq!(source.retain_drivers(|wire| wire == a), 1);
        assert_eq!(source.driving_wires(), vec![a]);

        assert_eq!(source.retain_drivers(|_| false), 1);
        assert_eq!(*seen.lock(), vec![true]);

        source.notify_state();
        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[test]
    fn test_seeded_source_reports_on_notify() {
        let wire = WireId::next();
        let source = PowerSource::with_drivers([wire, wire]);
        let seen = recorder(&source);

        assert!(source.is_powered());
        assert_eq!(source.driver_count(), 1);

        source.notify_state();
        source.notify_state();
        assert_eq!(*seen.lock(), vec![true]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let source = PowerSource::new();
        let seen = Arc::new(PlMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = source.subscribe(move |event| sink.lock().push(event.state));

        assert!(source.unsubscribe(id));
        assert!(!source.unsubscribe(id));
        assert_eq!(source.listener_count(), 0);

        source.assert_driver(WireId::next());
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_listener_may_read_source() {
        let source = Arc::new(PowerSource::new());
        let observed = Arc::new(PlMutex::new(None));

        let weak = Arc::downgrade(&source);
        let sink = Arc::clone(&observed);
        source.subscribe(move |_| {
            if let Some(source) = weak.upgrade() {
                *sink.lock() = Some(source.is_powered());
            }
        });

        source.assert_driver(WireId::next());
        assert_eq!(*observed.lock(), Some(true));
    }
}
