//! Connection error types
//!
//! Re-exports the core connection errors and adds the errors reported by
//! consistency audits and topology builders.

use thiserror::Error;

use coil_core::{SourceId, WireId};

// Re-export core connection errors
pub use coil_core::{ConnectionError, ConnectionResult};

/// An invariant of the connection manager that does not hold
///
/// Reported by [`ConnectionManager::validate`](crate::ConnectionManager::validate).
/// Any of these means the manager's structural state is corrupted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("Wire {0} has a direct connection to itself")]
    SelfEdge(WireId),

    #[error("Edge {from}-{to} has multiplicity {forward} but {to}-{from} has {backward}")]
    AsymmetricEdge {
        from: WireId,
        to: WireId,
        forward: usize,
        backward: usize,
    },

    #[error("Edge {from}-{to} is recorded with multiplicity zero")]
    EmptyEdge { from: WireId, to: WireId },

    #[error("Wire {wire} lists {peer} as a peer but not the other way round")]
    AsymmetricPeers { wire: WireId, peer: WireId },

    #[error("Wire {wire} caches {cached} peers but {reachable} wires are reachable")]
    StaleComponent {
        wire: WireId,
        cached: usize,
        reachable: usize,
    },

    #[error("Wires {wire} and {peer} are connected but use sources {wire_source} and {peer_source}")]
    SplitPowerSource {
        wire: WireId,
        peer: WireId,
        wire_source: SourceId,
        peer_source: SourceId,
    },

    #[error("Source {source_id} is shared by disconnected wires {wire} and {other}")]
    SharedPowerSource {
        source_id: SourceId,
        wire: WireId,
        other: WireId,
    },

    #[error("Source {source_id} is driven by {driver}, which is outside its component")]
    ForeignDriver { source_id: SourceId, driver: WireId },
}

/// Errors related to building topologies by wire index
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("No wire at index {index} (mesh has {len} wires)")]
    UnknownWire { index: usize, len: usize },

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
}

/// Result type for consistency audits
pub type ConsistencyResult<T> = Result<T, ConsistencyError>;

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use coil_core::Wire;

    #[test]
    fn test_consistency_error_display() {
        let a = Wire::new().id();
        let b = Wire::new().id();

        let err = ConsistencyError::AsymmetricEdge {
            from: a,
            to: b,
            forward: 2,
            backward: 1,
        };
        let msg = format!("{}", err);
        assert!(msg.contains(&a.to_string()));
        assert!(msg.contains("multiplicity 2"));

        let err = ConsistencyError::StaleComponent {
            wire: a,
            cached: 3,
            reachable: 2,
        };
        assert!(format!("{}", err).contains("3 peers"));
    }

    #[test]
    fn test_topology_error_conversion() {
        let wire = Wire::new().id();
        let err: TopologyError = ConnectionError::SelfConnection(wire).into();
        assert!(matches!(err, TopologyError::Connection(_)));
        assert!(format!("{}", err).contains("Cannot connect"));

        let err = TopologyError::UnknownWire { index: 9, len: 4 };
        assert!(format!("{}", err).contains("index 9"));
    }
}
