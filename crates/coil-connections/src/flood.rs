//! Reachability search over direct connections
//!
//! Used after an edge is cut to decide whether its two ends are still joined
//! through some other path, and if not, which wires ended up on each side.

use std::collections::HashSet;

use coil_core::Wire;

use crate::local::LocalConnections;

/// Outcome of a flood search
#[derive(Debug, Clone)]
pub struct Flood {
    /// Whether the target was reached
    pub found: bool,
    /// Every wire visited, including the start
    ///
    /// Complete component membership only when `found` is false; a
    /// successful search stops as soon as the target is seen.
    pub visited: HashSet<Wire>,
}

/// Search the local multigraph outward from `start`
///
/// With a `target`, stops as soon as it is reached. Without one, visits the
/// whole component containing `start`.
pub fn flood(local: &LocalConnections, start: &Wire, target: Option<&Wire>) -> Flood {
    let mut visited = HashSet::new();
    visited.insert(start.clone());
    let mut stack = vec![start.clone()];

    while let Some(wire) = stack.pop() {
        for neighbor in local.neighbors(&wire) {
            if visited.contains(neighbor) {
                continue;
            }
            visited.insert(neighbor.clone());

            if target == Some(neighbor) {
                return Flood {
                    found: true,
                    visited,
                };
            }
            stack.push(neighbor.clone());
        }
    }

    Flood {
        found: false,
        visited,
    }
}
