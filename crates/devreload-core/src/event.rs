//! Watch event types.
//!
//! The notify callback converts every raw notification into a [`WatchEvent`]
//! and forwards it to the watcher's consumer thread.

use std::path::PathBuf;

use notify::EventKind;
use notify::event::ModifyKind;

/// Kind of filesystem change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchEventKind {
    /// File or directory was created.
    Created,
    /// File content (or metadata) was modified.
    Modified,
    /// File or directory was removed.
    Removed,
    /// File or directory was renamed or moved.
    Renamed,
    /// Access and unclassified notifications.
    Other,
}

impl From<&EventKind> for WatchEventKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => Self::Created,
            EventKind::Modify(ModifyKind::Name(_)) => Self::Renamed,
            EventKind::Modify(_) => Self::Modified,
            EventKind::Remove(_) => Self::Removed,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => Self::Other,
        }
    }
}

/// A single `(path, kind)` change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEvent {
    /// Absolute path reported by the watch backend.
    pub path: PathBuf,
    /// Kind of change.
    pub kind: WatchEventKind,
}

impl WatchEvent {
    /// Create an event.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: WatchEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
