//! Back/forward directory history

use std::path::{Path, PathBuf};

/// Bounded, truncate-on-branch history of visited directories.
///
/// Invariants:
/// - `current` is `None` exactly when `entries` is empty, otherwise a valid index
/// - adjacent entries are never equal
/// - recording a visit while not at the tail drops everything after `current`
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<PathBuf>,
    current: Option<usize>,
    /// Target of the last back/forward step; its visit must not be re-recorded
    replay: Option<PathBuf>,
    limit: usize,
}

impl HistoryStack {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            replay: None,
            limit: limit.max(1),
        }
    }

    /// Record that `path` is now displayed.
    ///
    /// A visit produced by `go_back`/`go_forward` consumes the replay marker
    /// and leaves history untouched.
    pub fn record_visit(&mut self, path: &Path) {
        if let Some(replay) = self.replay.take() {
            if replay == path {
                return;
            }
            tracing::debug!("Discarding stale history replay of {}", replay.display());
        }

        if self.current_entry() == Some(path) {
            return;
        }

        let next = self.current.map_or(0, |i| i + 1);
        if next < self.entries.len() {
            self.entries.truncate(next);
        }

        self.entries.push(path.to_path_buf());
        self.current = Some(self.entries.len() - 1);

        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
            self.current = Some(self.entries.len() - 1);
        }
    }

    /// Step back one entry, returning the directory to navigate to.
    pub fn go_back(&mut self) -> Option<PathBuf> {
        let index = self.current.filter(|&i| i > 0)? - 1;
        self.current = Some(index);
        self.replay = Some(self.entries[index].clone());
        self.replay.clone()
    }

    /// Step forward one entry, returning the directory to navigate to.
    pub fn go_forward(&mut self) -> Option<PathBuf> {
        let index = self.current.filter(|&i| i + 1 < self.entries.len())? + 1;
        self.current = Some(index);
        self.replay = Some(self.entries[index].clone());
        self.replay.clone()
    }

    pub fn can_go_back(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_entry(&self) -> Option<&Path> {
        self.current.map(|i| self.entries[i].as_path())
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Change the bound, dropping the oldest entries if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
            self.current = self.current.map(|i| i.saturating_sub(overflow));
        }
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(256)
    }
}
