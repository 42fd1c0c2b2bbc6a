//! Wires: signal carriers bound to a shared power source
//!
//! A [`Wire`] is a cheap cloneable handle. Clones refer to the same carrier;
//! equality and hashing follow the carrier's [`WireId`], never its state.
//!
//! Each wire holds a passthrough subscription on its current
//! [`PowerSource`]. Rebinding the wire releases that subscription before
//! subscribing to the new source, so exactly one source's notifications reach
//! the wire's listeners at any time. The subscription is also released when
//! the last handle to the wire is dropped.
//!
//! A wire remembers the last state it reported. Forwarded events that would
//! not change that state are dropped, and a rebind onto a source with a
//! different state reports the flip, so listeners only ever see real flips of
//! this wire's power.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::event::{self, ListenerId, ListenerSet, PowerListener, PowerStateChanged};
use crate::identity::WireId;
use crate::source::PowerSource;

/// A signal carrier sharing power with every wire bound to the same source
#[derive(Clone)]
pub struct Wire {
    inner: Arc<WireInner>,
}

struct WireInner {
    id: WireId,
    binding: Mutex<Binding>,
    signal: Arc<Mutex<WireSignal>>,
}

/// The current source and our passthrough subscription on it
struct Binding {
    source: Arc<PowerSource>,
    passthrough: ListenerId,
}

struct WireSignal {
    /// Last state reported to listeners
    last_state: bool,
    listeners: ListenerSet,
}

impl WireSignal {
    /// Report `state` to the listeners unless it is already the last reported one
    fn deliver(signal: &Mutex<WireSignal>, state: bool) {
        let listeners = {
            let mut signal = signal.lock();
            if signal.last_state == state {
                return;
            }
            signal.last_state = state;
            signal.listeners.snapshot()
        };
        event::dispatch(&listeners, &PowerStateChanged::new(state));
    }
}

/// Build the listener a wire registers on its source
///
/// Holds the signal weakly so the source never keeps a dropped wire alive.
fn passthrough(signal: &Arc<Mutex<WireSignal>>) -> PowerListener {
    let signal: Weak<Mutex<WireSignal>> = Arc::downgrade(signal);
    Arc::new(move |event: &PowerStateChanged| {
        if let Some(signal) = signal.upgrade() {
            WireSignal::deliver(&signal, event.state);
        }
    })
}

impl Wire {
    /// Create an independent wire with its own fresh power source
    pub fn new() -> Self {
        Self::with_power_source(Arc::new(PowerSource::new()))
    }

    /// Create a wire bound to an existing power source
    ///
    /// Wires created on the same source start out sharing power. A connection
    /// manager does not learn about this grouping; register the connection
    /// there as well if its queries should reflect it.
    pub fn with_power_source(source: Arc<PowerSource>) -> Self {
        let signal = Arc::new(Mutex::new(WireSignal {
            last_state: source.is_powered(),
            listeners: ListenerSet::default(),
        }));
        let passthrough = source.subscribe_shared(passthrough(&signal));

        Self {
            inner: Arc::new(WireInner {
                id: WireId::next(),
                binding: Mutex::new(Binding {
                    source,
                    passthrough,
                }),
                signal,
            }),
        }
    }

    /// Get the wire identity
    pub fn id(&self) -> WireId {
        self.inner.id
    }

    /// Get the power source this wire is currently bound to
    pub fn power_source(&self) -> Arc<PowerSource> {
        Arc::clone(&self.inner.binding.lock().source)
    }

    /// Rebind this wire to `source`
    ///
    /// Moves the passthrough subscription and reports a flip to this wire's
    /// listeners if the new source's state differs from the last reported one.
    pub fn set_power_source(&self, source: Arc<PowerSource>) {
        if self.rebind(source) {
            self.report_power();
        }
    }

    /// Rebind this wire to `source` without reporting anything
    ///
    /// Returns false if the wire was already bound to `source`. Listeners
    /// stay unaware of the new state until [`report_power`](Self::report_power)
    /// is called, so a batch of wires can be moved before any listener runs.
    pub fn rebind(&self, source: Arc<PowerSource>) -> bool {
        let mut binding = self.inner.binding.lock();
        if Arc::ptr_eq(&binding.source, &source) {
            return false;
        }

        binding.source.unsubscribe(binding.passthrough);
        let passthrough = source.subscribe_shared(passthrough(&self.inner.signal));
        trace!(
            wire = %self.inner.id,
            from = %binding.source.id(),
            to = %source.id(),
            "Rebound wire"
        );
        *binding = Binding { source, passthrough };
        true
    }

    /// Report the current power to the listeners if it differs from the last
    /// reported state
    pub fn report_power(&self) {
        WireSignal::deliver(&self.inner.signal, self.peek());
    }

    /// Start driving power into the current source
    pub fn assert_power(&self) {
        self.power_source().assert_driver(self.id());
    }

    /// Stop driving power into the current source
    pub fn retract_power(&self) {
        self.power_source().retract_driver(self.id());
    }

    /// Read the shared power state
    pub fn peek(&self) -> bool {
        self.power_source().is_powered()
    }

    /// Reset the current source
    ///
    /// This de-energises every wire sharing the source, not just this one.
    pub fn clear(&self) {
        self.power_source().reset();
    }

    /// Register a listener for flips of this wire's power state
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PowerStateChanged) + Send + Sync + 'static,
    {
        self.inner.signal.lock().listeners.insert(Arc::new(listener))
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.signal.lock().listeners.remove(id)
    }

    /// Get the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.signal.lock().listeners.len()
    }
}

impl Drop for WireInner {
    fn drop(&mut self) {
        let binding = self.binding.get_mut();
        binding.source.unsubscribe(binding.passthrough);
    }
}

impl Default for Wire {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Wire {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Wire {}

impl Hash for Wire {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl PartialOrd for Wire {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wire {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.id.cmp(&other.inner.id)
    }
}

impl fmt::Debug for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.power_source();
        f.debug_struct("Wire")
            .field("id", &self.inner.id)
            .field("source", &source.id())
            .field("powered", &source.is_powered())
            .finish()
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.id)
    }
}
