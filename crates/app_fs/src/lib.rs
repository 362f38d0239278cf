//! photonav File System Layer
//!
//! Provides everything the navigation core needs from the file system:
//! - Directory validation (existing + readable)
//! - File operations: copy/move/delete/rename/mkdir with per-item reporting
//! - Directory listing with natural sort and filters
//! - Filename validation for rename/new-folder prompts
//! - File watching

mod validate;
mod sanitize;
mod browser;
mod watcher;
pub mod file_operations;

pub use validate::{is_valid_directory, nearest_valid_ancestor};
pub use sanitize::is_valid_filename;
pub use browser::{FileEntry, ListOptions, SortBy, SortOrder, list_directory, get_parent, is_root};
pub use watcher::{FileWatcher, FsEvent};
pub use file_operations::{
    BatchReport, ClipboardMode, DefaultFileOperations, DeleteMode, DeleteReport, FileOpError,
    FileOperations, Transfer,
};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
