//! Direct connections between wires
//!
//! [`LocalConnections`] is an undirected multigraph: connecting the same pair
//! twice records an edge with multiplicity two, and the pair stays directly
//! connected until it has been disconnected twice. Both directions of every
//! edge are stored with the same count.
//!
//! Wires left without any edge are removed, so the map only ever holds wires
//! that have at least one neighbour.

use std::collections::HashMap;

use coil_core::Wire;

/// Undirected multigraph of direct wire connections
#[derive(Debug, Default)]
pub struct LocalConnections {
    edges: HashMap<Wire, HashMap<Wire, usize>>,
}

impl LocalConnections {
    /// Create an empty multigraph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `a`–`b` edge, returning the new multiplicity
    pub fn add_edge(&mut self, a: &Wire, b: &Wire) -> usize {
        let forward = self
            .edges
            .entry(a.clone())
            .or_default()
            .entry(b.clone())
            .or_insert(0);
        *forward += 1;
        let count = *forward;

        *self
            .edges
            .entry(b.clone())
            .or_default()
            .entry(a.clone())
            .or_insert(0) += 1;

        count
    }

    /// Remove one `a`–`b` edge
    ///
    /// Returns the remaining multiplicity, or `None` if there was no edge.
    /// When the last edge goes, wires left without neighbours are dropped.
    pub fn remove_edge(&mut self, a: &Wire, b: &Wire) -> Option<usize> {
        if self.multiplicity(a, b) == 0 {
            return None;
        }

        let remaining = self.decrement(a, b);
        self.decrement(b, a);
        Some(remaining)
    }

    fn decrement(&mut self, from: &Wire, to: &Wire) -> usize {
        let Some(neighbors) = self.edges.get_mut(from) else {
            return 0;
        };

        let remaining = match neighbors.get_mut(to) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };

        if remaining == 0 {
            neighbors.remove(to);
            if neighbors.is_empty() {
                self.edges.remove(from);
            }
        }
        remaining
    }

    /// Get the number of parallel `a`–`b` edges
    pub fn multiplicity(&self, a: &Wire, b: &Wire) -> usize {
        self.edges
            .get(a)
            .and_then(|neighbors| neighbors.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate over the distinct direct neighbours of `wire`
    pub fn neighbors<'a>(&'a self, wire: &Wire) -> impl Iterator<Item = &'a Wire> + use<'a> {
        self.edges
            .get(wire)
            .into_iter()
            .flat_map(|neighbors| neighbors.keys())
    }

    /// Iterate over the neighbours of `wire` with their multiplicities
    pub fn edges_of<'a>(
        &'a self,
        wire: &Wire,
    ) -> impl Iterator<Item = (&'a Wire, usize)> + use<'a> {
        self.edges
            .get(wire)
            .into_iter()
            .flat_map(|neighbors| neighbors.iter().map(|(peer, count)| (peer, *count)))
    }

    /// Check whether `wire` has any direct connection
    pub fn has_edges(&self, wire: &Wire) -> bool {
        self.edges
            .get(wire)
            .map(|neighbors| !neighbors.is_empty())
            .unwrap_or(false)
    }

    /// Get the number of distinct neighbours of `wire`
    pub fn degree(&self, wire: &Wire) -> usize {
        self.edges.get(wire).map(HashMap::len).unwrap_or(0)
    }

    /// Iterate over every wire with at least one edge
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.edges.keys()
    }

    /// Get the number of connected wire pairs, ignoring multiplicity
    pub fn pair_count(&self) -> usize {
        self.edges.values().map(HashMap::len).sum::<usize>() / 2
    }

    /// Get the number of edges, counting parallel edges separately
    pub fn edge_count(&self) -> usize {
        self.edges
            .values()
            .flat_map(HashMap::values)
            .sum::<usize>()
            / 2
    }

    /// Get the number of wires with at least one edge
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check whether there are no edges at all
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
