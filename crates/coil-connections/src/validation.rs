//! Consistency audit for a [`ConnectionManager`]
//!
//! Walks the direct connections from scratch and compares what it finds with
//! the component cache and the power source bindings. Intended for tests and
//! debugging; the cost is linear in the number of wires and edges plus the
//! size of every cached peer set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use coil_core::{SourceId, Wire, WireId};

use crate::error::{ConsistencyError, ConsistencyResult};
use crate::flood::flood;
use crate::manager::ConnectionManager;

impl ConnectionManager {
    /// Check every structural invariant, returning the first violation found
    ///
    /// Only wires with at least one connection are visible to the manager.
    /// Use [`audit`](Self::audit) to cover wires a split left isolated.
    pub fn validate(&self) -> ConsistencyResult<()> {
        self.audit(&[])
    }

    /// Like [`validate`](Self::validate), also checking `wires`
    ///
    /// An untracked wire in `wires` counts as a component of its own: its
    /// source must not be shared with another component and may only be
    /// driven by the wire itself.
    pub fn audit(&self, wires: &[Wire]) -> ConsistencyResult<()> {
        self.validate_edges()?;
        self.validate_peers()?;
        self.validate_components(wires)
    }

    fn validate_edges(&self) -> ConsistencyResult<()> {
        let local = self.local();
        for wire in local.wires() {
            for (peer, forward) in local.edges_of(wire) {
                if peer == wire {
                    return Err(ConsistencyError::SelfEdge(wire.id()));
                }
                if forward == 0 {
                    return Err(ConsistencyError::EmptyEdge {
                        from: wire.id(),
                        to: peer.id(),
                    });
                }
                let backward = local.multiplicity(peer, wire);
                if backward != forward {
                    return Err(ConsistencyError::AsymmetricEdge {
                        from: wire.id(),
                        to: peer.id(),
                        forward,
                        backward,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_peers(&self) -> ConsistencyResult<()> {
        let global = self.global();
        for (wire, peers) in global.entries() {
            for peer in peers {
                let mirrored = global
                    .peers(peer)
                    .map(|back| back.contains(wire))
                    .unwrap_or(false);
                if !mirrored {
                    return Err(ConsistencyError::AsymmetricPeers {
                        wire: wire.id(),
                        peer: peer.id(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_components(&self, extra: &[Wire]) -> ConsistencyResult<()> {
        let mut seen: HashSet<Wire> = HashSet::new();
        let mut owners: HashMap<SourceId, WireId> = HashMap::new();

        let candidates: Vec<&Wire> = self
            .local()
            .wires()
            .chain(self.global().wires())
            .chain(extra)
            .collect();
        for start in candidates {
            if seen.contains(start) {
                continue;
            }

            let component = flood(self.local(), start, None).visited;
            self.validate_component(&component, &mut owners)?;
            seen.extend(component);
        }
        Ok(())
    }

    fn validate_component(
        &self,
        component: &HashSet<Wire>,
        owners: &mut HashMap<SourceId, WireId>,
    ) -> ConsistencyResult<()> {
        for wire in component {
            let cached = self.global().peers(wire);
            let cached_len = cached.map(HashSet::len).unwrap_or(0);
            let exact = cached_len == component.len() - 1
                && component
                    .iter()
                    .filter(|member| *member != wire)
                    .all(|member| cached.map(|peers| peers.contains(member)).unwrap_or(false));
            if !exact {
                return Err(ConsistencyError::StaleComponent {
                    wire: wire.id(),
                    cached: cached_len,
                    reachable: component.len() - 1,
                });
            }
        }

        let Some(representative) = component.iter().min() else {
            return Ok(());
        };

        let source = representative.power_source();
        for wire in component {
            let bound = wire.power_source();
            if !Arc::ptr_eq(&source, &bound) {
                return Err(ConsistencyError::SplitPowerSource {
                    wire: representative.id(),
                    peer: wire.id(),
                    wire_source: source.id(),
                    peer_source: bound.id(),
                });
            }
        }

        if let Some(other) = owners.insert(source.id(), representative.id()) {
            return Err(ConsistencyError::SharedPowerSource {
                source_id: source.id(),
                wire: representative.id(),
                other,
            });
        }

        let members: HashSet<WireId> = component.iter().map(Wire::id).collect();
        if let Some(driver) = source
            .driving_wires()
            .into_iter()
            .find(|driver| !members.contains(driver))
        {
            return Err(ConsistencyError::ForeignDriver {
                source_id: source.id(),
                driver,
            });
        }
        Ok(())
    }
}
