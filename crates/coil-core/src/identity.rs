//! Process-unique identifiers for wires and power sources
//!
//! Wires and power sources have no natural key; two carriers are the same
//! carrier only if they are the same allocation. These identifiers give that
//! identity a hashable, orderable and loggable form.

use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_WIRE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Wire`](crate::Wire)
///
/// Allocated once per wire; clones of a wire handle share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireId(u64);

impl WireId {
    /// Allocate the next unused wire identity
    pub(crate) fn next() -> Self {
        Self(NEXT_WIRE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Identity of a [`PowerSource`](crate::PowerSource)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(u64);

impl SourceId {
    /// Allocate the next unused source identity
    pub(crate) fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}
