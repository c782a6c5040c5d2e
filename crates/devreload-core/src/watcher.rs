//! File watcher.
//!
//! Observes root directories recursively with `notify` and calls a
//! [`ChangeSink`] for every modification whose extension is configured.
//!
//! The notify callback only converts notifications into [`WatchEvent`]s and
//! forwards them over a channel. A single consumer thread applies the filter
//! and calls the sink, one event at a time.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::event::{WatchEvent, WatchEventKind};
use crate::filter::ExtensionFilter;
use crate::signal::ReloadSignal;

/// Receiver of qualifying change events.
///
/// Implemented by [`ReloadSignal`], which records the time of the change.
pub trait ChangeSink: Send + Sync {
    /// Called once per qualifying modification.
    fn changed(&self, event: &WatchEvent);
}

impl ChangeSink for ReloadSignal {
    fn changed(&self, event: &WatchEvent) {
        let value = self.trigger();
        tracing::debug!(path = %event.path.display(), value, "Reload signal triggered");
    }
}

/// File watcher error.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The notify backend could not be created.
    #[error("Failed to create file watcher: {0}")]
    Init(#[source] notify::Error),
    /// A root path could not be observed (missing, unreadable, ...).
    #[error("Failed to watch {}: {source}", path.display())]
    Watch {
        /// Root path that failed.
        path: PathBuf,
        /// Backend error.
        #[source]
        source: notify::Error,
    },
    /// The consumer thread could not be spawned.
    #[error("Failed to spawn watch thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Acknowledgement returned by [`FileWatcher::start`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchStatus {
    /// Observed root directories, in the order given.
    pub roots: Vec<PathBuf>,
    /// Extensions that trigger a reload, sorted.
    pub extensions: Vec<String>,
}

/// Message delivered to the consumer thread.
enum Message {
    Event(WatchEvent),
    Shutdown,
}

/// An active subscription.
///
/// Dropping it stops the consumer thread and then the notify backend.
struct ActiveWatch {
    control: mpsc::Sender<Message>,
    consumer: Option<JoinHandle<()>>,
    _watcher: RecommendedWatcher,
    status: WatchStatus,
}

impl Drop for ActiveWatch {
    fn drop(&mut self) {
        // Queued events behind the shutdown message are discarded.
        let _ = self.control.send(Message::Shutdown);
        let Some(consumer) = self.consumer.take() else {
            return;
        };
        // Stopped from inside a sink: the consumer exits after the current event
        if consumer.thread().id() == thread::current().id() {
            return;
        }
        if consumer.join().is_err() {
            tracing::warn!("Watch consumer thread panicked");
        }
    }
}

/// Watches directories and reports qualifying modifications.
///
/// At most one watch is active at a time. [`start`](Self::start) replaces an
/// active watch, [`stop`](Self::stop) ends it. Both take `&self`, so the
/// watcher can be shared between the host's start and stop hooks.
pub struct FileWatcher {
    sink: Arc<dyn ChangeSink>,
    active: Mutex<Option<ActiveWatch>>,
}

impl FileWatcher {
    /// Create a watcher that triggers `signal` on qualifying changes.
    #[must_use]
    pub fn new(signal: ReloadSignal) -> Self {
        Self::with_sink(Arc::new(signal))
    }

    /// Create a watcher reporting to a custom sink.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn ChangeSink>) -> Self {
        Self {
            sink,
            active: Mutex::new(None),
        }
    }

    /// Start watching `paths` recursively for modifications of files with
    /// one of `extensions`.
    ///
    /// An active watch is stopped first. Observation runs in the background;
    /// this call does not block on file events.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Watch`] if a path cannot be observed. No watch is
    /// active after a failed start.
    pub fn start<P, E>(
        &self,
        paths: impl IntoIterator<Item = P>,
        extensions: impl IntoIterator<Item = E>,
    ) -> Result<WatchStatus, WatchError>
    where
        P: Into<PathBuf>,
        E: AsRef<str>,
    {
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            tracing::info!(roots = ?previous.status.roots, "Replacing active file watch");
            drop(previous);
        }

        let roots: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        let filter = ExtensionFilter::new(extensions);
        if filter.is_empty() {
            tracing::warn!("No extensions configured, file changes will not trigger reloads");
        }

        let (control, rx) = mpsc::channel::<Message>();

        let forward = control.clone();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        let kind = WatchEventKind::from(&event.kind);
                        for path in event.paths {
                            // Receiver is gone once the watch has stopped
                            let _ = forward.send(Message::Event(WatchEvent { path, kind }));
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "File watch error"),
                }
            })
            .map_err(WatchError::Init)?;

        for root in &roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|source| WatchError::Watch {
                    path: root.clone(),
                    source,
                })?;
        }

        let sink = Arc::clone(&self.sink);
        let consumer_filter = filter.clone();
        let consumer = thread::Builder::new()
            .name("devreload-watch".to_owned())
            .spawn(move || consume(&rx, &consumer_filter, sink.as_ref()))?;

        let status = WatchStatus {
            roots,
            extensions: filter.extensions().map(str::to_owned).collect(),
        };
        tracing::info!(roots = ?status.roots, extensions = ?status.extensions, "File watch started");

        let displaced = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(ActiveWatch {
                control,
                consumer: Some(consumer),
                _watcher: watcher,
                status: status.clone(),
            });
        // A concurrent start may have installed a watch in the meantime
        drop(displaced);

        Ok(status)
    }

    /// Stop the active watch.
    ///
    /// No-op if nothing is being watched. When this returns the stopped watch
    /// will not report any further change.
    pub fn stop(&self) {
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(previous) = previous {
            let roots = previous.status.roots.clone();
            drop(previous);
            tracing::info!(?roots, "File watch stopped");
        }
    }

    /// Returns `true` while a watch is active.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Status of the active watch, if any.
    #[must_use]
    pub fn status(&self) -> Option<WatchStatus> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|watch| watch.status.clone())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Consumer loop: runs until shutdown or until every sender is gone.
fn consume(rx: &mpsc::Receiver<Message>, filter: &ExtensionFilter, sink: &dyn ChangeSink) {
    for message in rx {
        match message {
            Message::Shutdown => break,
            Message::Event(event) => dispatch(filter, sink, &event),
        }
    }
}

/// Handle one event; a panic while handling it only drops that event.
fn dispatch(filter: &ExtensionFilter, sink: &dyn ChangeSink, event: &WatchEvent) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if filter.is_relevant(event) {
            sink.changed(event);
        }
    }));

    if outcome.is_err() {
        tracing::warn!(path = %event.path.display(), "Failed to handle watch event, skipping");
    }
}
