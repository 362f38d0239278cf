//! Pending cut/copy selection

use crate::AppError;
use app_fs::{is_valid_directory, ClipboardMode};
use std::path::{Path, PathBuf};

/// Holds the files waiting to be pasted and the mode they were taken with.
#[derive(Debug, Default)]
pub struct ClipboardController {
    mode: Option<ClipboardMode>,
    pending: Vec<PathBuf>,
}

impl ClipboardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `selected` for moving; replaces any earlier cut/copy
    pub fn cut(&mut self, selected: &[PathBuf]) {
        self.take(selected, ClipboardMode::Cut);
    }

    /// Take `selected` for copying; replaces any earlier cut/copy
    pub fn copy(&mut self, selected: &[PathBuf]) {
        self.take(selected, ClipboardMode::Copy);
    }

    fn take(&mut self, selected: &[PathBuf], mode: ClipboardMode) {
        // Snapshot order is the reverse of the selection order
        self.pending = selected.iter().rev().cloned().collect();
        self.mode = Some(mode);
        tracing::debug!("{:?} {} file(s)", mode, self.pending.len());
    }

    /// Check that the pending files may be pasted into `dest_dir`.
    ///
    /// Copying into the files' own folder is allowed (duplicates are
    /// created); cutting into it is not.
    pub fn can_paste_into(&self, dest_dir: &Path) -> Result<(), AppError> {
        let Some(mode) = self.mode.filter(|_| !self.pending.is_empty()) else {
            return Err(AppError::NothingToPaste);
        };

        if !is_valid_directory(dest_dir) {
            return Err(AppError::InvalidPath(dest_dir.to_path_buf()));
        }

        if mode == ClipboardMode::Cut && self.pending.iter().any(|f| f.parent() == Some(dest_dir)) {
            return Err(AppError::SameFolderConflict(dest_dir.to_path_buf()));
        }

        Ok(())
    }

    /// Forget the pending selection once a paste has been dispatched
    pub fn complete_paste(&mut self) {
        self.pending.clear();
        self.mode = None;
    }

    pub fn is_paste_available(&self) -> bool {
        self.mode.is_some() && !self.pending.is_empty()
    }

    pub fn mode(&self) -> Option<ClipboardMode> {
        self.mode
    }

    pub fn pending_files(&self) -> &[PathBuf] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files_in(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|n| {
                let p = dir.join(n);
                std::fs::write(&p, b"x").unwrap();
                p
            })
            .collect()
    }

    #[test]
    fn test_snapshot_is_reversed() {
        let mut clipboard = ClipboardController::new();
        clipboard.copy(&[PathBuf::from("/p/1.jpg"), PathBuf::from("/p/2.jpg")]);

        assert_eq!(
            clipboard.pending_files(),
            &[PathBuf::from("/p/2.jpg"), PathBuf::from("/p/1.jpg")]
        );
        assert_eq!(clipboard.mode(), Some(ClipboardMode::Copy));
        assert!(clipboard.is_paste_available());
    }

    #[test]
    fn test_cut_into_same_folder_rejected() {
        let dir = TempDir::new().unwrap();
        let mut clipboard = ClipboardController::new();
        clipboard.cut(&files_in(dir.path(), &["f1.jpg", "f2.jpg"]));

        assert!(matches!(
            clipboard.can_paste_into(dir.path()),
            Err(AppError::SameFolderConflict(_))
        ));
        // Rejection leaves the clipboard intact for retargeting
        assert_eq!(clipboard.pending_files().len(), 2);
    }

    #[test]
    fn test_copy_into_same_folder_accepted() {
        let dir = TempDir::new().unwrap();
        let mut clipboard = ClipboardController::new();
        clipboard.copy(&files_in(dir.path(), &["f1.jpg", "f2.jpg"]));

        assert!(clipboard.can_paste_into(dir.path()).is_ok());
    }

    #[test]
    fn test_cut_into_other_folder_accepted() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let mut clipboard = ClipboardController::new();
        clipboard.cut(&files_in(src.path(), &["f1.jpg"]));

        assert!(clipboard.can_paste_into(dst.path()).is_ok());
    }

    #[test]
    fn test_invalid_destination_and_empty_clipboard() {
        let dir = TempDir::new().unwrap();
        let mut clipboard = ClipboardController::new();
        assert!(matches!(clipboard.can_paste_into(dir.path()), Err(AppError::NothingToPaste)));

        clipboard.copy(&[]);
        assert!(matches!(clipboard.can_paste_into(dir.path()), Err(AppError::NothingToPaste)));

        clipboard.copy(&files_in(dir.path(), &["a.jpg"]));
        assert!(matches!(
            clipboard.can_paste_into(&dir.path().join("missing")),
            Err(AppError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_complete_paste_clears_state() {
        let mut clipboard = ClipboardController::new();
        clipboard.cut(&[PathBuf::from("/p/1.jpg")]);
        clipboard.complete_paste();

        assert!(!clipboard.is_paste_available());
        assert_eq!(clipboard.mode(), None);
        assert!(clipboard.pending_files().is_empty());
    }
}
