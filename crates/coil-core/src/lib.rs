//! # Coil Core
//!
//! Wires and the power sources they share.
//!
//! A [`Wire`] is a signal carrier that always references exactly one
//! [`PowerSource`]. Every wire bound to the same source observes the same
//! boolean power state: the source is powered while at least one of its wires
//! is asserting power into it.
//!
//! ## Key Types
//!
//! - [`Wire`]: Cloneable carrier handle with identity semantics
//! - [`PowerSource`]: Shared token holding the set of driving wires
//! - [`PowerStateChanged`]: Event delivered when a power state flips
//! - [`ConnectionError`]: Errors returned by connection managers
//!
//! Connectivity between wires (merging and splitting the groups that share a
//! source) is handled by the `coil-connections` crate.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use coil_core::{PowerSource, Wire};
//!
//! let source = Arc::new(PowerSource::new());
//! let a = Wire::with_power_source(source.clone());
//! let b = Wire::with_power_source(source);
//!
//! a.assert_power();
//! assert!(b.peek());
//! ```

pub mod error;
pub mod event;
pub mod identity;
pub mod instrumentation;
pub mod source;
pub mod wire;

// Re-export main types
pub use error::*;
pub use event::*;
pub use identity::*;
pub use source::PowerSource;
pub use wire::Wire;
