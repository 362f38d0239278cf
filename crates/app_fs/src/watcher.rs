//! File system watcher with notify-debouncer-mini
//!
//! Watches the displayed directory and its parent so that removal of the
//! displayed directory itself is reported, not only changes inside it.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// File system event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

/// File system watcher with debouncing
pub struct FileWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    event_rx: Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
    watched_paths: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a new file watcher with 100ms debounce
    pub fn new() -> Result<Self, notify::Error> {
        let (tx, rx) = channel();

        let debouncer = new_debouncer(Duration::from_millis(100), tx)?;

        Ok(Self {
            debouncer,
            event_rx: rx,
            watched_paths: Vec::new(),
        })
    }

    /// Replace the watched set with `dir` and its parent (both non-recursive)
    pub fn retarget(&mut self, dir: &Path) -> Result<(), notify::Error> {
        self.unwatch_all();

        let mut targets = vec![dir.to_path_buf()];
        if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            targets.push(parent.to_path_buf());
        }

        for path in targets {
            self.debouncer.watcher().watch(&path, RecursiveMode::NonRecursive)?;
            self.watched_paths.push(path);
        }

        tracing::debug!("Watching: {}", dir.display());
        Ok(())
    }

    /// Directories currently watched
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched_paths
    }

    fn unwatch_all(&mut self) {
        for path in self.watched_paths.drain(..) {
            let _ = self.debouncer.watcher().unwatch(&path);
        }
    }

    /// Poll for file system events (non-blocking)
    pub fn poll_events(&self) -> Vec<FsEvent> {
        let mut events = Vec::new();

        while let Ok(result) = self.event_rx.try_recv() {
            match result {
                Ok(debounced_events) => {
                    events.extend(debounced_events.into_iter().filter_map(Self::convert_event));
                }
                Err(e) => {
                    tracing::warn!("Watcher error: {:?}", e);
                }
            }
        }

        events.dedup();
        events
    }

    /// Convert debounced event to FsEvent
    fn convert_event(event: DebouncedEvent) -> Option<FsEvent> {
        match event.kind {
            DebouncedEventKind::Any if event.path.exists() => Some(FsEvent::Changed(event.path)),
            DebouncedEventKind::Any => Some(FsEvent::Removed(event.path)),
            _ => None,
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.unwatch_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_watcher_creation() {
        let watcher = FileWatcher::new();
        assert!(watcher.is_ok());
    }

    #[test]
    fn test_retarget_watches_dir_and_parent() {
        let root = TempDir::new().unwrap();
        let first = root.path().join("first");
        let second = root.path().join("second");
        std::fs::create_dir(&first).unwrap();
        std::fs::create_dir(&second).unwrap();

        let mut watcher = FileWatcher::new().unwrap();
        watcher.retarget(&first).unwrap();
        assert_eq!(watcher.watched(), &[first.clone(), root.path().to_path_buf()]);

        watcher.retarget(&second).unwrap();
        assert_eq!(watcher.watched(), &[second, root.path().to_path_buf()]);
    }
}
