//! Locally materialized media handles.
//!
//! A user-selected file is exposed to elements through a handle URL that
//! stays valid until released. Every acquire must be paired with a release
//! when the element is evicted or the project is discarded.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque handle to a local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct HandleEntry {
    path: PathBuf,
    url: String,
}

/// Arena of live handles.
#[derive(Debug, Default)]
pub struct MediaHandleTable {
    next_id: u64,
    live: HashMap<HandleId, HandleEntry>,
}

impl MediaHandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize a handle for `path` and return it with its URL.
    pub fn acquire(&mut self, path: &Path) -> (HandleId, String) {
        self.next_id += 1;
        let id = HandleId(self.next_id);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let url = format!("local-media://{}/{}", self.next_id, name);
        tracing::debug!(handle = %id, path = %path.display(), "Media handle acquired");
        self.live.insert(
            id,
            HandleEntry {
                path: path.to_path_buf(),
                url: url.clone(),
            },
        );
        (id, url)
    }

    /// Release a handle. Returns false for an unknown or already released
    /// handle.
    pub fn release(&mut self, id: HandleId) -> bool {
        match self.live.remove(&id) {
            Some(entry) => {
                tracing::debug!(handle = %id, path = %entry.path.display(), "Media handle released");
                true
            }
            None => false,
        }
    }

    /// Release every live handle, returning how many were freed.
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        count
    }

    pub fn url(&self, id: HandleId) -> Option<&str> {
        self.live.get(&id).map(|e| e.url.as_str())
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
