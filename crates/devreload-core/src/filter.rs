//! Extension based event filtering.

use std::collections::BTreeSet;
use std::path::Path;

use crate::event::{WatchEvent, WatchEventKind};

/// Set of file extensions whose modification should trigger a reload.
///
/// Extensions are stored without a leading dot. A leading dot passed to
/// [`ExtensionFilter::new`] is stripped, so `".css"` and `"css"` are the same.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from extension names.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref();
                ext.strip_prefix('.').unwrap_or(ext).to_owned()
            })
            .collect();
        Self { extensions }
    }

    /// Extension of a path: the part of the file name after its final `.`.
    ///
    /// Returns `None` when the file name has no `.` or is not valid UTF-8.
    /// Unlike [`Path::extension`], a dotfile such as `.env` yields `"env"`.
    #[must_use]
    pub fn extension_of(path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_str()?;
        name.rsplit_once('.').map(|(_, ext)| ext)
    }

    /// Whether the path's extension is in the set.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        Self::extension_of(path).is_some_and(|ext| self.extensions.contains(ext))
    }

    /// Whether an event should trigger a reload.
    ///
    /// Only modifications count; creation, removal and renames are ignored.
    #[must_use]
    pub fn is_relevant(&self, event: &WatchEvent) -> bool {
        event.kind == WatchEventKind::Modified && self.matches(&event.path)
    }

    /// Configured extensions in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Returns `true` if no extension is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
