//! Application error types

use app_fs::FileOpError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by navigation and file-management intents.
///
/// None of these terminate the application: `InvalidPath` and
/// `SameFolderConflict` are detected before anything is touched on disk,
/// `FileOp`/`PartialBatch` report what was done before the failure, and
/// `StaleDirectory` is normally healed without reaching the user.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Rejected before any mutation =====
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Can not cut and paste in the same folder: {}", .0.display())]
    SameFolderConflict(PathBuf),

    #[error("Nothing to paste")]
    NothingToPaste,

    #[error("No selection")]
    NoSelection,

    #[error("No folder selected")]
    FolderNotSelected,

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    // ===== File system failures =====
    #[error("File operation failed: {0}")]
    FileOp(#[from] FileOpError),

    #[error("{action} stopped after {completed} item(s), {remaining} left untouched: {source}")]
    PartialBatch {
        action: &'static str,
        completed: usize,
        remaining: usize,
        #[source]
        source: FileOpError,
    },

    // ===== Self-healing =====
    #[error("Directory no longer exists: {}", .0.display())]
    StaleDirectory(PathBuf),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Was the request rejected before the file system was touched?
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AppError::FileOp(_) | AppError::PartialBatch { .. } | AppError::StaleDirectory(_)
        )
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidPath(path) => format!("Invalid Path: {}", path.display()),
            AppError::SameFolderConflict(_) => "Can not cut and paste in the same folder".to_string(),
            AppError::InvalidName(_) => "Invalid name entered".to_string(),
            AppError::PartialBatch { action, completed, remaining, .. } => {
                format!("{} failed: {} done, {} remaining", action, completed, remaining)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_vs_failures() {
        assert!(AppError::InvalidPath("/x".into()).is_rejection());
        assert!(AppError::SameFolderConflict("/x".into()).is_rejection());
        assert!(!AppError::StaleDirectory("/x".into()).is_rejection());
        assert!(!AppError::FileOp(FileOpError::NotFound("/x".into())).is_rejection());
    }

    #[test]
    fn test_partial_batch_message() {
        let err = AppError::PartialBatch {
            action: "Delete",
            completed: 1,
            remaining: 2,
            source: FileOpError::NotFound("/missing.jpg".into()),
        };
        assert_eq!(err.user_message(), "Delete failed: 1 done, 2 remaining");
        assert!(err.is_recoverable());
    }
}
