//! Error types for Coil

use thiserror::Error;

use crate::identity::WireId;

/// Errors returned by connect and disconnect operations
///
/// Both variants abort the call before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Cannot connect wire {0} to itself")]
    SelfConnection(WireId),

    #[error("Cannot disconnect wire {0} from itself")]
    SelfDisconnection(WireId),
}

impl ConnectionError {
    /// The wire named on both sides of the rejected operation
    pub fn wire(&self) -> WireId {
        match self {
            Self::SelfConnection(wire) | Self::SelfDisconnection(wire) => *wire,
        }
    }
}

/// Result type alias for connection operations
pub type ConnectionResult<T> = Result<T, ConnectionError>;
