//! Reload signal store.
//!
//! A single millisecond timestamp recording the time of the last relevant
//! change. The file watcher writes it, the status endpoint reads it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared "time of last change" value.
///
/// Cloning is cheap and every clone observes the same value. Create one per
/// process with [`ReloadSignal::new`] and hand clones to the watcher and the
/// HTTP state.
#[derive(Clone, Debug)]
pub struct ReloadSignal {
    value: Arc<AtomicU64>,
}

impl ReloadSignal {
    /// Create a signal initialized to the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(now_millis())
    }

    /// Create a signal with an explicit initial value.
    #[must_use]
    pub fn starting_at(millis: u64) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Record a change now and return the stored value.
    ///
    /// The stored value never decreases: if the wall clock steps backwards
    /// the previous value is kept.
    pub fn trigger(&self) -> u64 {
        self.trigger_at(now_millis())
    }

    pub(crate) fn trigger_at(&self, millis: u64) -> u64 {
        let previous = self.value.fetch_max(millis, Ordering::AcqRel);
        previous.max(millis)
    }

    /// Current value.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
