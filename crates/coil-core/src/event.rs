//! Power state events and listener bookkeeping

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Delivered when a power state flips
///
/// Only the new state is carried; the old state is always its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PowerStateChanged {
    /// The new power state
    pub state: bool,
}

impl PowerStateChanged {
    /// Create an event for a flip to `state`
    pub fn new(state: bool) -> Self {
        Self { state }
    }

    /// The state before the flip
    pub fn old_state(&self) -> bool {
        !self.state
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// A power state listener
///
/// Listeners run inline on the thread that caused the flip, after every
/// internal lock has been released. A panicking listener is logged and
/// skipped; the remaining listeners still run.
pub type PowerListener = Arc<dyn Fn(&PowerStateChanged) + Send + Sync>;

/// Registered listeners, kept in subscription order
#[derive(Default)]
pub(crate) struct ListenerSet {
    next_id: u64,
    entries: Vec<(ListenerId, PowerListener)>,
}

impl ListenerSet {
    pub(crate) fn insert(&mut self, listener: PowerListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Clone the listeners so they can be invoked without holding a lock
    pub(crate) fn snapshot(&self) -> Vec<PowerListener> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.entries.len())
            .finish()
    }
}

/// Invoke every listener with `event`
pub(crate) fn dispatch(listeners: &[PowerListener], event: &PowerStateChanged) {
    for listener in listeners {
        if panic::catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
            warn!(state = event.state, "Power listener panicked");
        }
    }
}
