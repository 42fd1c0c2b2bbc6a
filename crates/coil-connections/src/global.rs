//! Component membership cache
//!
//! [`GlobalConnections`] maps every connected wire to the set of all other
//! wires in its component. The cache is kept exact after every edit by
//! rewriting the whole component, which costs O(component size) per change
//! but answers membership queries with a single lookup.
//!
//! Wires whose component is just themselves have no entry.

use std::collections::{HashMap, HashSet};

use coil_core::Wire;

/// Per-wire transitive closure of the direct connections
#[derive(Debug, Default)]
pub struct GlobalConnections {
    peers: HashMap<Wire, HashSet<Wire>>,
}

impl GlobalConnections {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get every other wire in the component of `wire`
    pub fn peers(&self, wire: &Wire) -> Option<&HashSet<Wire>> {
        self.peers.get(wire)
    }

    /// Get the component of `wire`, including `wire` itself
    pub fn component_of(&self, wire: &Wire) -> HashSet<Wire> {
        let mut component = self.peers.get(wire).cloned().unwrap_or_default();
        component.insert(wire.clone());
        component
    }

    /// Check whether `a` and `b` are in the same component
    pub fn are_connected(&self, a: &Wire, b: &Wire) -> bool {
        a == b
            || self
                .peers
                .get(a)
                .map(|peers| peers.contains(b))
                .unwrap_or(false)
    }

    /// Join the components of `a` and `b`
    ///
    /// Every member of the merged component gets its set rewritten. Returns
    /// the size of the merged component.
    pub fn merge(&mut self, a: &Wire, b: &Wire) -> usize {
        let mut union = self.component_of(a);
        union.extend(self.component_of(b));
        self.assign(&union);
        union.len()
    }

    /// Record `members` as one complete component
    ///
    /// A single-member component clears that wire's entry.
    pub fn assign(&mut self, members: &HashSet<Wire>) {
        if members.len() <= 1 {
            for wire in members {
                self.peers.remove(wire);
            }
            return;
        }

        for wire in members {
            let mut others = members.clone();
            others.remove(wire);
            self.peers.insert(wire.clone(), others);
        }
    }

    /// Collect every distinct component with two or more members
    pub fn components(&self) -> Vec<HashSet<Wire>> {
        let mut seen: HashSet<&Wire> = HashSet::new();
        let mut components = Vec::new();

        for wire in self.peers.keys() {
            if seen.contains(wire) {
                continue;
            }
            let component = self.component_of(wire);
            for member in &component {
                if let Some((key, _)) = self.peers.get_key_value(member) {
                    seen.insert(key);
                }
            }
            components.push(component);
        }
        components
    }

    /// Iterate over every wire with a non-trivial component
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.peers.keys()
    }

    /// Iterate over every cached entry
    pub fn entries(&self) -> impl Iterator<Item = (&Wire, &HashSet<Wire>)> {
        self.peers.iter()
    }

    /// Get the number of wires with a non-trivial component
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check whether no wire is connected to any other
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
