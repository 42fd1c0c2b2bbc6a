//! Process-wide hook fired whenever a power source's driving set changes
//!
//! Intended for external instrumentation (debug overlays, counters). The hook
//! receives only the identity of the mutated source. It is best effort: a
//! panicking hook is caught and logged, and never reaches the caller that
//! mutated the source.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::identity::SourceId;

/// Hook invoked with the identity of the mutated source
pub type ValuePushedHook = Arc<dyn Fn(SourceId) + Send + Sync>;

static VALUE_PUSHED: RwLock<Option<ValuePushedHook>> = parking_lot::const_rwlock(None);

/// Install the hook, replacing any previous one
pub fn set_value_pushed_hook<F>(hook: F)
where
    F: Fn(SourceId) + Send + Sync + 'static,
{
    *VALUE_PUSHED.write() = Some(Arc::new(hook));
}

/// Remove the hook
pub fn clear_value_pushed_hook() {
    *VALUE_PUSHED.write() = None;
}

/// Check whether a hook is installed
pub fn has_value_pushed_hook() -> bool {
    VALUE_PUSHED.read().is_some()
}

pub(crate) fn notify_value_pushed(source: SourceId) {
    // Clone out of the lock so the hook may replace itself
    let hook = VALUE_PUSHED.read().clone();
    let Some(hook) = hook else {
        return;
    };

    if panic::catch_unwind(AssertUnwindSafe(|| hook(source))).is_err() {
        warn!(source = %source, "Value pushed hook panicked");
    }
}
