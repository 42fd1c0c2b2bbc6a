//! The connection manager
//!
//! [`ConnectionManager`] owns two views of the wire network:
//!
//! - [`LocalConnections`]: the direct edges, with multiplicity
//! - [`GlobalConnections`]: the full component of every connected wire
//!
//! and keeps every wire bound to the one [`PowerSource`] of its component.
//!
//! ## Connect
//!
//! The power source of the first wire becomes the source of the merged
//! component. Drivers of the second wire's source are absorbed into it
//! first, since both halves may already be energised independently.
//!
//! ## Disconnect
//!
//! Removing the last direct edge between two wires triggers a search of the
//! remaining direct edges. If the wires are still joined through a cycle
//! nothing else changes. Otherwise the component is split: the first wire's
//! side keeps the old source (pruned to its own drivers) and the second
//! wire's side gets a brand-new source seeded with the drivers found there.
//!
//! ## Listeners
//!
//! Wires are rebound silently and the caches are updated before any listener
//! runs. Only then are the sources asked to report and each rebound wire
//! reports its own flip, so a listener that powers another wire always finds
//! it bound to its final source.

use std::collections::HashSet;
use std::sync::Arc;

use coil_core::{PowerSource, Wire, WireId};
use tracing::{debug, trace};

use crate::error::{ConnectionError, ConnectionResult};
use crate::flood::flood;
use crate::global::GlobalConnections;
use crate::local::LocalConnections;

/// Tracks connections between wires and the power sources they share
///
/// Edits take `&mut self`: each connect or disconnect has exclusive access
/// to the manager for its whole duration. Wrap the manager in a single mutex
/// to share it between threads.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    local: LocalConnections,
    global: GlobalConnections,
}

impl ConnectionManager {
    /// Create a manager that tracks no connections
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `a` and `b`
    ///
    /// Connecting an already connected pair again adds a parallel edge; it
    /// takes as many disconnects as connects to sever the pair.
    pub fn connect(&mut self, a: &Wire, b: &Wire) -> ConnectionResult<()> {
        if a == b {
            return Err(ConnectionError::SelfConnection(a.id()));
        }

        // Same component already shares one source; only the edge is new
        if self.global.are_connected(a, b) {
            let multiplicity = self.local.add_edge(a, b);
            trace!(a = %a.id(), b = %b.id(), multiplicity, "Added edge within component");
            return Ok(());
        }

        let target = a.power_source();
        let previous = b.power_source();
        if !Arc::ptr_eq(&target, &previous) {
            target.absorb(&previous);
        }

        let rebound: Vec<Wire> = self
            .global
            .component_of(b)
            .into_iter()
            .filter(|wire| wire.rebind(Arc::clone(&target)))
            .collect();

        let size = self.global.merge(a, b);
        let multiplicity = self.local.add_edge(a, b);
        debug!(
            a = %a.id(),
            b = %b.id(),
            source = %target.id(),
            component = size,
            multiplicity,
            "Connected wires"
        );

        target.notify_state();
        report(&rebound);
        Ok(())
    }

    /// Disconnect one edge between `a` and `b`
    ///
    /// Disconnecting wires that are not directly connected does nothing.
    ///
    /// # Panics
    ///
    /// Panics if the direct connections turn out to be asymmetric, which
    /// means the manager's state is corrupted.
    pub fn disconnect(&mut self, a: &Wire, b: &Wire) -> ConnectionResult<()> {
        if a == b {
            return Err(ConnectionError::SelfDisconnection(a.id()));
        }

        if !self.local.has_edges(a) || !self.local.has_edges(b) {
            trace!(a = %a.id(), b = %b.id(), "Disconnect skipped, wire has no connections");
            return Ok(());
        }

        let Some(remaining) = self.local.remove_edge(a, b) else {
            trace!(a = %a.id(), b = %b.id(), "Disconnect skipped, wires not directly connected");
            return Ok(());
        };

        if remaining > 0 {
            trace!(a = %a.id(), b = %b.id(), remaining, "Removed parallel edge");
            return Ok(());
        }

        let from_a = flood(&self.local, a, Some(b));
        let from_b = flood(&self.local, b, Some(a));
        assert_eq!(
            from_a.found, from_b.found,
            "direct connections between {a} and {b} are asymmetric"
        );

        if from_a.found {
            debug!(a = %a.id(), b = %b.id(), "Disconnected wires, still joined through a cycle");
            return Ok(());
        }

        self.split(a, b, from_a.visited, from_b.visited);
        Ok(())
    }

    /// Divide a component into the sides around `a` and `b`
    fn split(&mut self, a: &Wire, b: &Wire, side_a: HashSet<Wire>, side_b: HashSet<Wire>) {
        let retained = a.power_source();
        let ids_a: HashSet<WireId> = side_a.iter().map(Wire::id).collect();
        let ids_b: HashSet<WireId> = side_b.iter().map(Wire::id).collect();

        let fresh = Arc::new(PowerSource::with_drivers(
            retained
                .driving_wires()
                .into_iter()
                .filter(|driver| ids_b.contains(driver)),
        ));
        retained.retain_drivers(|driver| ids_a.contains(&driver));

        let mut rebound: Vec<Wire> = side_a
            .iter()
            .filter(|wire| wire.rebind(Arc::clone(&retained)))
            .cloned()
            .collect();
        rebound.extend(
            side_b
                .iter()
                .filter(|wire| wire.rebind(Arc::clone(&fresh)))
                .cloned(),
        );

        self.global.assign(&side_a);
        self.global.assign(&side_b);
        debug!(
            a = %a.id(),
            b = %b.id(),
            retained = %retained.id(),
            fresh = %fresh.id(),
            side_a = side_a.len(),
            side_b = side_b.len(),
            "Split component"
        );

        retained.notify_state();
        fresh.notify_state();
        report(&rebound);
    }

    /// Get the distinct wires directly connected to `wire`
    pub fn local_neighbors(&self, wire: &Wire) -> HashSet<Wire> {
        self.local.neighbors(wire).cloned().collect()
    }

    /// Get every other wire in the component of `wire`
    pub fn global_peers(&self, wire: &Wire) -> HashSet<Wire> {
        self.global.peers(wire).cloned().unwrap_or_default()
    }

    /// Get the component of `wire`, including `wire` itself
    pub fn component_of(&self, wire: &Wire) -> HashSet<Wire> {
        self.global.component_of(wire)
    }

    /// Get every component with two or more wires
    pub fn components(&self) -> Vec<HashSet<Wire>> {
        self.global.components()
    }

    /// Get the number of parallel direct edges between `a` and `b`
    pub fn edge_multiplicity(&self, a: &Wire, b: &Wire) -> usize {
        self.local.multiplicity(a, b)
    }

    /// Check whether `a` and `b` are in the same component
    pub fn are_connected(&self, a: &Wire, b: &Wire) -> bool {
        self.global.are_connected(a, b)
    }

    /// Iterate over every wire with at least one connection
    pub fn tracked_wires(&self) -> impl Iterator<Item = &Wire> {
        self.global.wires()
    }

    /// Check whether the manager tracks no connections
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Get the direct connections
    pub fn local(&self) -> &LocalConnections {
        &self.local
    }

    /// Get the component cache
    pub fn global(&self) -> &GlobalConnections {
        &self.global
    }
}

/// Let each rebound wire report a flip caused by its new source
fn report(rebound: &[Wire]) {
    for wire in rebound {
        wire.report_power();
    }
}
