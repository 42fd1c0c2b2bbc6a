//! # Coil Connections
//!
//! Connectivity management for [`coil_core`] wires.
//!
//! Connecting two wires merges their groups so that every wire in the merged
//! group shares one power source. Disconnecting them splits the group again
//! when no other path of direct connections joins the two sides, handing the
//! second side a fresh power source that keeps only the drivers found there.
//!
//! ## Key Types
//!
//! - [`ConnectionManager`]: Owns the connection graph and rebinds sources
//! - [`LocalConnections`]: Direct edges with multiplicity
//! - [`GlobalConnections`]: Component membership cache
//! - `WireMesh` / `WireMeshBuilder`: Prebuilt topologies by wire index,
//!   behind the `topology` feature
//!
//! ## Example
//!
//! ```rust
//! use coil_core::Wire;
//! use coil_connections::ConnectionManager;
//!
//! let mut manager = ConnectionManager::new();
//! let a = Wire::new();
//! let b = Wire::new();
//!
//! manager.connect(&a, &b).unwrap();
//! a.assert_power();
//! assert!(b.peek());
//!
//! manager.disconnect(&a, &b).unwrap();
//! assert!(a.peek());
//! assert!(!b.peek());
//! ```

pub mod error;
pub mod flood;
pub mod global;
pub mod local;
pub mod manager;
#[cfg(feature = "topology")]
pub mod topology;
mod validation;

pub use error::*;
pub use flood::{Flood, flood};
pub use global::GlobalConnections;
pub use local::LocalConnections;
pub use manager::ConnectionManager;
#[cfg(feature = "topology")]
pub use topology::{WireMesh, WireMeshBuilder, from_edges};
