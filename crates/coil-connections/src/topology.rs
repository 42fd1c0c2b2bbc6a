//! Wire mesh topologies
//!
//! Builds groups of wires wired together through a [`ConnectionManager`]:
//! - Line: each wire connected to the next
//! - Ring: a line closed back on itself
//! - Star: the first wire connected to every other
//! - Full mesh: every wire connected to every other
//! - Random: configurable connection probability
//! - Custom: built from an edge list of wire indices

use std::fmt::Write as _;

use rand::Rng;
use tracing::warn;

use coil_core::Wire;

use crate::error::{TopologyError, TopologyResult};
use crate::manager::ConnectionManager;

/// A set of wires and the manager connecting them
#[derive(Debug, Default)]
pub struct WireMesh {
    manager: ConnectionManager,
    wires: Vec<Wire>,
}

impl WireMesh {
    /// Create a mesh of `count` unconnected wires
    pub fn new(count: usize) -> Self {
        Self {
            manager: ConnectionManager::new(),
            wires: (0..count).map(|_| Wire::new()).collect(),
        }
    }

    /// Connect the wires at indices `a` and `b`
    pub fn connect(&mut self, a: usize, b: usize) -> TopologyResult<()> {
        let (wire_a, wire_b) = (self.lookup(a)?.clone(), self.lookup(b)?.clone());
        self.manager.connect(&wire_a, &wire_b)?;
        Ok(())
    }

    /// Disconnect one edge between the wires at indices `a` and `b`
    pub fn disconnect(&mut self, a: usize, b: usize) -> TopologyResult<()> {
        let (wire_a, wire_b) = (self.lookup(a)?.clone(), self.lookup(b)?.clone());
        self.manager.disconnect(&wire_a, &wire_b)?;
        Ok(())
    }

    fn lookup(&self, index: usize) -> TopologyResult<&Wire> {
        self.wires.get(index).ok_or(TopologyError::UnknownWire {
            index,
            len: self.wires.len(),
        })
    }

    /// Connect two wires picked by a builder, which never names a bad index
    fn join(&mut self, a: usize, b: usize) {
        if let Err(err) = self.connect(a, b) {
            warn!(a, b, error = %err, "Skipped topology edge");
        }
    }

    /// Get the wire at `index`
    pub fn wire(&self, index: usize) -> Option<&Wire> {
        self.wires.get(index)
    }

    /// Get every wire in index order
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ConnectionManager {
        &mut self.manager
    }

    /// Get the number of wires
    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// Get the number of directly connected wire pairs
    pub fn pair_count(&self) -> usize {
        self.manager.local().pair_count()
    }

    /// Check whether the wires at `a` and `b` are directly connected
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        match (self.wire(a), self.wire(b)) {
            (Some(wire_a), Some(wire_b)) => self.manager.edge_multiplicity(wire_a, wire_b) > 0,
            _ => false,
        }
    }

    /// Check whether the wires at `a` and `b` share a component
    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        match (self.wire(a), self.wire(b)) {
            (Some(wire_a), Some(wire_b)) => self.manager.are_connected(wire_a, wire_b),
            _ => false,
        }
    }

    /// Render the direct connections as text, one wire per line
    pub fn visualize(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Wire Mesh:");
        let _ = writeln!(output, "  Wires: {}", self.len());
        let _ = writeln!(output, "  Pairs: {}\n", self.pair_count());

        for (index, wire) in self.wires.iter().enumerate() {
            let mut neighbors: Vec<usize> = self
                .wires
                .iter()
                .enumerate()
                .filter(|(_, other)| self.manager.edge_multiplicity(wire, other) > 0)
                .map(|(other, _)| other)
                .collect();
            neighbors.sort_unstable();
            let listed: Vec<String> = neighbors.iter().map(usize::to_string).collect();
            let _ = writeln!(output, "  {} {} -> [{}]", index, wire, listed.join(", "));
        }
        output
    }
}

/// Builder for wire mesh topologies
pub struct WireMeshBuilder {
    wire_count: usize,
}

impl WireMeshBuilder {
    /// Create a builder for `wire_count` wires
    pub fn new(wire_count: usize) -> Self {
        Self { wire_count }
    }

    /// Build a line: 0 - 1 - 2 - ...
    pub fn line(self) -> WireMesh {
        let mut mesh = WireMesh::new(self.wire_count);
        for i in 1..self.wire_count {
            mesh.join(i - 1, i);
        }
        mesh
    }

    /// Build a ring: 0 - 1 - ... - n-1 - 0
    ///
    /// Fewer than three wires cannot close a ring and form a line instead.
    pub fn ring(self) -> WireMesh {
        let count = self.wire_count;
        let mut mesh = self.line();
        if count >= 3 {
            mesh.join(count - 1, 0);
        }
        mesh
    }

    /// Build a star with wire 0 at the centre
    pub fn star(self) -> WireMesh {
        let mut mesh = WireMesh::new(self.wire_count);
        for i in 1..self.wire_count {
            mesh.join(0, i);
        }
        mesh
    }

    /// Build a full mesh where every wire is connected to every other
    pub fn full_mesh(self) -> WireMesh {
        let mut mesh = WireMesh::new(self.wire_count);
        for i in 0..self.wire_count {
            for j in (i + 1)..self.wire_count {
                mesh.join(i, j);
            }
        }
        mesh
    }

    /// Build a random mesh with given connection probability
    pub fn random(self, connection_probability: f64) -> WireMesh {
        self.random_with(&mut rand::rng(), connection_probability)
    }

    /// Build a random mesh drawing from `rng`
    ///
    /// Every wire left without a connection is then joined to one other
    /// wire picked at random.
    pub fn random_with<R: Rng>(self, rng: &mut R, connection_probability: f64) -> WireMesh {
        let count = self.wire_count;
        let mut mesh = WireMesh::new(count);

        for i in 0..count {
            for j in (i + 1)..count {
                if rng.random::<f64>() < connection_probability {
                    mesh.join(i, j);
                }
            }
        }

        if count < 2 {
            return mesh;
        }
        for i in 0..count {
            if mesh.manager.local().has_edges(&mesh.wires[i]) {
                continue;
            }
            let mut other = rng.random_range(0..count - 1);
            if other >= i {
                other += 1;
            }
            mesh.join(i, other);
        }
        mesh
    }
}

/// Create a mesh of `wire_count` wires from an edge list of indices
pub fn from_edges(wire_count: usize, edges: &[(usize, usize)]) -> TopologyResult<WireMesh> {
    let mut mesh = WireMesh::new(wire_count);
    for &(a, b) in edges {
        mesh.connect(a, b)?;
    }
    Ok(mesh)
}
