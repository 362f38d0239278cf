//! Single-flight gate for thumbnail reloads

use crate::collaborators::{FolderTree, ThumbnailBackend};
use app_fs::{is_valid_directory, nearest_valid_ancestor};
use std::path::{Path, PathBuf};

/// What happened to a reload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The backend is now loading `dir`
    Started { dir: PathBuf, scroll_to_top: bool },
    /// A load is in flight; the request is remembered. `schedule_retry` is
    /// true when the caller must queue a retry poll (none is queued yet).
    /// A retry poll that finds the load still running never asks for
    /// another one: completion runs the remembered reload.
    Deferred { schedule_retry: bool },
    /// A retry poll found nothing left to do
    Coalesced,
    /// No directory could be resolved; nothing to show
    Skipped,
    /// The current directory is set but unusable
    Invalid(PathBuf),
}

/// Owns the current directory and the backend busy state.
///
/// At most one load is in flight. Requests arriving meanwhile collapse into a
/// single pending reload that runs exactly once after the in-flight load
/// completes.
#[derive(Debug, Default)]
pub struct DirectorySession {
    current_dir: Option<PathBuf>,
    busy: bool,
    pending_reload: bool,
    pending_scroll_to_top: bool,
    retry_scheduled: bool,
    /// Last directory that vanished underneath the session
    stale_dir: Option<PathBuf>,
}

impl DirectorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn set_current_dir(&mut self, dir: impl Into<PathBuf>) {
        self.current_dir = Some(dir.into());
    }

    pub fn clear_current_dir(&mut self) {
        self.current_dir = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn has_pending_reload(&self) -> bool {
        self.pending_reload
    }

    /// Ask for the current directory to be (re)loaded.
    pub fn request_reload<T, B>(&mut self, scroll_to_top: bool, tree: &T, backend: &mut B) -> ReloadOutcome
    where
        T: FolderTree + ?Sized,
        B: ThumbnailBackend + ?Sized,
    {
        if self.busy {
            self.pending_reload = true;
            self.pending_scroll_to_top |= scroll_to_top;
            tracing::debug!("Reload deferred while busy");
            return self.defer();
        }

        self.start(scroll_to_top, tree, backend)
    }

    /// Zero-delay re-poll of a deferred request
    pub fn retry<T, B>(&mut self, tree: &T, backend: &mut B) -> ReloadOutcome
    where
        T: FolderTree + ?Sized,
        B: ThumbnailBackend + ?Sized,
    {
        self.retry_scheduled = false;

        if !self.pending_reload {
            return ReloadOutcome::Coalesced;
        }

        // Still loading: `on_load_finished` picks the request up
        if self.busy {
            return ReloadOutcome::Deferred { schedule_retry: false };
        }

        self.pending_reload = false;
        let scroll_to_top = std::mem::take(&mut self.pending_scroll_to_top);
        self.start(scroll_to_top, tree, backend)
    }

    /// Backend completion callback. Runs the remembered reload, if any.
    pub fn on_load_finished<T, B>(&mut self, tree: &T, backend: &mut B) -> Option<ReloadOutcome>
    where
        T: FolderTree + ?Sized,
        B: ThumbnailBackend + ?Sized,
    {
        self.busy = false;

        if !self.pending_reload {
            return None;
        }

        self.pending_reload = false;
        let scroll_to_top = std::mem::take(&mut self.pending_scroll_to_top);
        Some(self.start(scroll_to_top, tree, backend))
    }

    /// The displayed directory no longer exists.
    ///
    /// Aborts any in-flight load and forgets the directory so the next reload
    /// re-resolves it. Returns true when an abort was issued.
    pub fn on_external_directory_removed<B>(&mut self, removed: &Path, backend: &mut B) -> bool
    where
        B: ThumbnailBackend + ?Sized,
    {
        let aborted = self.busy;
        if aborted {
            backend.abort();
        }

        tracing::info!("Current directory removed: {}", removed.display());
        self.stale_dir = self.current_dir.take().or_else(|| Some(removed.to_path_buf()));
        aborted
    }

    fn defer(&mut self) -> ReloadOutcome {
        let schedule_retry = !self.retry_scheduled;
        self.retry_scheduled = true;
        ReloadOutcome::Deferred { schedule_retry }
    }

    fn start<T, B>(&mut self, scroll_to_top: bool, tree: &T, backend: &mut B) -> ReloadOutcome
    where
        T: FolderTree + ?Sized,
        B: ThumbnailBackend + ?Sized,
    {
        let dir = match &self.current_dir {
            Some(dir) => {
                if !is_valid_directory(dir) {
                    tracing::warn!("Failed to open folder: {}", dir.display());
                    return ReloadOutcome::Invalid(dir.clone());
                }
                dir.clone()
            }
            None => match self.resolve(tree) {
                Some(dir) => dir,
                None => {
                    tracing::debug!("Reload skipped: no directory to show");
                    return ReloadOutcome::Skipped;
                }
            },
        };

        self.current_dir = Some(dir.clone());
        self.stale_dir = None;
        self.busy = true;
        backend.load_directory(&dir, scroll_to_top);

        ReloadOutcome::Started { dir, scroll_to_top }
    }

    /// Tree selection first, then the closest surviving ancestor of the
    /// directory that vanished.
    fn resolve<T: FolderTree + ?Sized>(&self, tree: &T) -> Option<PathBuf> {
        tree.selected_path()
            .filter(|p| is_valid_directory(p))
            .or_else(|| self.stale_dir.as_deref().and_then(nearest_valid_ancestor))
    }
}
