//! Reload signal and file watcher for devreload.
//!
//! This crate holds the state behind browser auto-reload:
//!
//! - [`ReloadSignal`]: shared millisecond timestamp of the last relevant change
//! - [`FileWatcher`]: recursive `notify` watch that triggers the signal when a
//!   file with a configured extension is modified
//! - [`ExtensionFilter`]: the event filter policy
//!
//! The HTTP side (status endpoint and script injection) lives in
//! `devreload-server`.
//!
//! # Example
//!
//! ```ignore
//! use devreload_core::{FileWatcher, ReloadSignal};
//!
//! let signal = ReloadSignal::new();
//! let watcher = FileWatcher::new(signal.clone());
//! watcher.start(["public", "src"], ["html", "css", "js"])?;
//!
//! // ... serve `signal.current()` to the browser ...
//!
//! watcher.stop();
//! ```

mod event;
mod filter;
mod signal;
mod watcher;

pub use event::{WatchEvent, WatchEventKind};
pub use filter::ExtensionFilter;
pub use signal::ReloadSignal;
pub use watcher::{ChangeSink, FileWatcher, WatchError, WatchStatus};
