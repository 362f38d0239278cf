//! File operations module
//! Provides copy, move, delete, rename and mkdir with per-item reporting

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File operation errors
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trash error: {0}")]
    #[cfg(feature = "trash-support")]
    Trash(#[from] trash::Error),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, FileOpError>;

/// Clipboard / transfer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

impl ClipboardMode {
    /// Past-tense verb for status messages
    pub fn verb(self) -> &'static str {
        match self {
            ClipboardMode::Copy => "Copied",
            ClipboardMode::Cut => "Moved",
        }
    }
}

/// How deleted files are disposed of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    #[default]
    Permanent,
    Trash,
}

/// One successfully transferred item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Aggregate result of a copy/move batch.
///
/// Copy/move keeps going after a failed item; every failure is recorded.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub transferred: Vec<Transfer>,
    pub failures: Vec<(PathBuf, FileOpError)>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.transferred.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a fail-fast delete batch.
///
/// Deletion stops at the first failure; files after it are never attempted.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub succeeded: usize,
    pub failure: Option<(PathBuf, FileOpError)>,
}

impl DeleteReport {
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// File operations trait
pub trait FileOperations {
    /// Copy (`ClipboardMode::Copy`) or move (`ClipboardMode::Cut`) each file
    /// into `dest_dir`, continuing past failed items.
    fn copy_or_move(&self, files: &[PathBuf], dest_dir: &Path, mode: ClipboardMode) -> BatchReport;

    /// Delete a single file
    fn delete_file(&self, path: &Path, mode: DeleteMode) -> Result<()>;

    /// Delete files in order, halting on the first failure
    fn delete_files(&self, paths: &[PathBuf], mode: DeleteMode) -> DeleteReport {
        let mut report = DeleteReport::default();

        for path in paths {
            match self.delete_file(path, mode) {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::error!("Delete halted at {}: {}", path.display(), e);
                    report.failure = Some((path.clone(), e));
                    break;
                }
            }
        }

        report
    }

    /// Remove a directory tree, children before parents, stopping at the
    /// first failure (the tree is left partially deleted)
    fn delete_directory_recursive(&self, path: &Path) -> Result<()>;

    /// Rename a file or directory
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Create `parent/name`, returning the new path
    fn create_directory(&self, parent: &Path, name: &str) -> Result<PathBuf>;

    /// Open a directory in the system file manager
    fn open_in_file_manager(&self, path: &Path) -> Result<()>;
}

/// Default implementation of file operations on the local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFileOperations;

impl DefaultFileOperations {
    pub fn new() -> Self {
        Self
    }

    fn transfer_one(source: &Path, dest_dir: &Path, mode: ClipboardMode) -> Result<PathBuf> {
        if fs::symlink_metadata(source).is_err() {
            return Err(FileOpError::NotFound(source.to_path_buf()));
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| FileOpError::InvalidOperation("Invalid file name".to_string()))?;
        let mut target = dest_dir.join(file_name);

        if source.is_dir() && dest_dir.starts_with(source) {
            return Err(FileOpError::InvalidOperation(format!(
                "Cannot place {} inside itself",
                source.display()
            )));
        }

        match mode {
            ClipboardMode::Copy => {
                // Copying onto an existing name (e.g. into the origin folder) makes a duplicate
                if target.exists() {
                    target = auto_rename_path(&target);
                }

                if source.is_dir() {
                    copy_dir_recursive(source, &target)?;
                } else {
                    fs::copy(source, &target)?;
                }
                tracing::info!("Copied: {} -> {}", source.display(), target.display());
            }
            ClipboardMode::Cut => {
                if target.exists() {
                    return Err(FileOpError::AlreadyExists(target));
                }
                move_path(source, &target)?;
            }
        }

        Ok(target)
    }
}

impl FileOperations for DefaultFileOperations {
    fn copy_or_move(&self, files: &[PathBuf], dest_dir: &Path, mode: ClipboardMode) -> BatchReport {
        let mut report = BatchReport::default();

        if !dest_dir.is_dir() {
            for file in files {
                report
                    .failures
                    .push((file.clone(), FileOpError::NotFound(dest_dir.to_path_buf())));
            }
            return report;
        }

        for source in files {
            match Self::transfer_one(source, dest_dir, mode) {
                Ok(destination) => report.transferred.push(Transfer {
                    source: source.clone(),
                    destination,
                }),
                Err(e) => {
                    tracing::error!("{:?} failed for {}: {}", mode, source.display(), e);
                    report.failures.push((source.clone(), e));
                }
            }
        }

        report
    }

    #[cfg(feature = "trash-support")]
    fn delete_file(&self, path: &Path, mode: DeleteMode) -> Result<()> {
        if fs::symlink_metadata(path).is_err() {
            return Err(FileOpError::NotFound(path.to_path_buf()));
        }

        match mode {
            DeleteMode::Trash => {
                trash::delete(path)?;
                tracing::info!("Moved to trash: {}", path.display());
            }
            DeleteMode::Permanent => {
                fs::remove_file(path)?;
                tracing::warn!("Permanently deleted: {}", path.display());
            }
        }

        Ok(())
    }

    #[cfg(not(feature = "trash-support"))]
    fn delete_file(&self, path: &Path, _mode: DeleteMode) -> Result<()> {
        // Without trash support every delete is permanent
        if fs::symlink_metadata(path).is_err() {
            return Err(FileOpError::NotFound(path.to_path_buf()));
        }

        fs::remove_file(path)?;
        tracing::warn!("Permanently deleted: {}", path.display());

        Ok(())
    }

    fn delete_directory_recursive(&self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(FileOpError::NotFound(path.to_path_buf()));
        }

        // Explicit stack: (directory, children already scheduled)
        let mut stack: Vec<(PathBuf, bool)> = vec![(path.to_path_buf(), false)];

        while let Some((dir, expanded)) = stack.pop() {
            if expanded {
                fs::remove_dir(&dir)?;
                continue;
            }

            stack.push((dir.clone(), true));

            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let entry_path = entry.path();
                // Symlinks are removed, never followed
                if entry.file_type()?.is_dir() {
                    stack.push((entry_path, false));
                } else {
                    fs::remove_file(&entry_path)?;
                }
            }
        }

        tracing::warn!("Removed directory tree: {}", path.display());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if fs::symlink_metadata(from).is_err() {
            return Err(FileOpError::NotFound(from.to_path_buf()));
        }

        if to.exists() {
            return Err(FileOpError::AlreadyExists(to.to_path_buf()));
        }

        fs::rename(from, to)?;
        tracing::info!("Renamed: {} -> {}", from.display(), to.display());

        Ok(())
    }

    fn create_directory(&self, parent: &Path, name: &str) -> Result<PathBuf> {
        if !crate::is_valid_filename(name) {
            return Err(FileOpError::InvalidName(name.to_string()));
        }

        let path = parent.join(name);
        if path.exists() {
            return Err(FileOpError::AlreadyExists(path));
        }

        fs::create_dir(&path)?;
        tracing::info!("Created directory: {}", path.display());

        Ok(path)
    }

    #[cfg(feature = "open-external")]
    fn open_in_file_manager(&self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(FileOpError::NotFound(path.to_path_buf()));
        }

        open::that(path).map_err(|e| {
            FileOpError::InvalidOperation(format!("Failed to open file manager: {}", e))
        })?;

        tracing::info!("Opened in file manager: {}", path.display());
        Ok(())
    }

    #[cfg(not(feature = "open-external"))]
    fn open_in_file_manager(&self, _path: &Path) -> Result<()> {
        Err(FileOpError::InvalidOperation(
            "Open external feature not enabled".to_string(),
        ))
    }
}

/// Rename, falling back to copy + delete across file systems
fn move_path(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => {
            tracing::info!("Moved: {} -> {}", source.display(), target.display());
            Ok(())
        }
        Err(e) => {
            // Unix: EXDEV = 18, Windows: ERROR_NOT_SAME_DEVICE = 17
            let is_cross_device = match e.raw_os_error() {
                Some(18) => cfg!(unix),
                Some(17) => cfg!(windows),
                _ => false,
            };

            if !is_cross_device {
                return Err(e.into());
            }

            tracing::info!("Cross-filesystem move, using copy+delete: {} -> {}", source.display(), target.display());
            if source.is_dir() {
                copy_dir_recursive(source, target)?;
                fs::remove_dir_all(source)?;
            } else {
                fs::copy(source, target)?;
                fs::remove_file(source)?;
            }
            Ok(())
        }
    }
}

/// Recursively copy a directory
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Generate a free sibling name: "a.jpg" -> "a (1).jpg", "a (2).jpg", ...
pub fn auto_rename_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());

    let candidate = |suffix: String| match &extension {
        Some(ext) => parent.join(format!("{} ({}).{}", stem, suffix, ext)),
        None => parent.join(format!("{} ({})", stem, suffix)),
    };

    (1..1000)
        .map(|i| candidate(i.to_string()))
        .find(|p| !p.exists())
        .unwrap_or_else(|| {
            let timestamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            candidate(timestamp.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_create_dir() {
        let dir = TempDir::new().unwrap();
        let ops = DefaultFileOperations::new();

        let created = ops.create_directory(dir.path(), "albums").unwrap();
        assert_eq!(created, dir.path().join("albums"));
        assert!(created.is_dir());

        assert!(matches!(
            ops.create_directory(dir.path(), "albums"),
            Err(FileOpError::AlreadyExists(_))
        ));
        assert!(matches!(
            ops.create_directory(dir.path(), "a/b"),
            Err(FileOpError::InvalidName(_))
        ));
    }

    #[test]
    fn test_rename() {
        let dir = TempDir::new().unwrap();
        let ops = DefaultFileOperations::new();
        let from = touch(dir.path(), "from.jpg");
        let to = dir.path().join("to.jpg");

        assert!(ops.rename(&from, &to).is_ok());
        assert!(!from.exists());
        assert!(to.exists());

        let other = touch(dir.path(), "other.jpg");
        assert!(matches!(ops.rename(&other, &to), Err(FileOpError::AlreadyExists(_))));
    }

    #[test]
    fn test_delete_files_halts_on_first_failure() {
        let dir = TempDir::new().unwrap();
        let ops = DefaultFileOperations::new();
        let a = touch(dir.path(), "a.jpg");
        let missing = dir.path().join("missing.jpg");
        let c = touch(dir.path(), "c.jpg");

        let report = ops.delete_files(&[a.clone(), missing.clone(), c.clone()], DeleteMode::Permanent);

        assert_eq!(report.succeeded, 1);
        assert!(report.failed());
        assert_eq!(report.failure.as_ref().map(|(p, _)| p.clone()), Some(missing));
        assert!(!a.exists());
        assert!(c.exists(), "files after the failure must not be attempted");
    }

    #[test]
    fn test_copy_or_move_continues_after_failure() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let ops = DefaultFileOperations::new();
        let a = touch(src.path(), "a.jpg");
        let missing = src.path().join("missing.jpg");
        let c = touch(src.path(), "c.jpg");

        let report = ops.copy_or_move(&[a.clone(), missing, c.clone()], dst.path(), ClipboardMode::Cut);

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!a.exists());
        assert!(dst.path().join("a.jpg").exists());
        assert!(dst.path().join("c.jpg").exists());
    }

    #[test]
    fn test_copy_into_origin_creates_duplicate() {
        let dir = TempDir::new().unwrap();
        let ops = DefaultFileOperations::new();
        let a = touch(dir.path(), "a.jpg");

        let report = ops.copy_or_move(&[a.clone()], dir.path(), ClipboardMode::Copy);

        assert!(report.is_success());
        assert_eq!(report.transferred[0].destination, dir.path().join("a (1).jpg"));
        assert!(a.exists());
    }

    #[test]
    fn test_move_onto_existing_name_fails() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let ops = DefaultFileOperations::new();
        let a = touch(src.path(), "a.jpg");
        touch(dst.path(), "a.jpg");

        let report = ops.copy_or_move(&[a.clone()], dst.path(), ClipboardMode::Cut);

        assert_eq!(report.failed(), 1);
        assert!(matches!(report.failures[0].1, FileOpError::AlreadyExists(_)));
        assert!(a.exists());
    }

    #[test]
    fn test_delete_directory_recursive() {
        let dir = TempDir::new().unwrap();
        let ops = DefaultFileOperations::new();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("a").join("b")).unwrap();
        fs::create_dir_all(root.join("c")).unwrap();
        touch(&root, "top.jpg");
        touch(&root.join("a"), "mid.jpg");
        touch(&root.join("a").join("b"), "deep.jpg");

        ops.delete_directory_recursive(&root).unwrap();

        assert!(!root.exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_auto_rename_path() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "test.txt");
        touch(dir.path(), "test (1).txt");

        assert_eq!(auto_rename_path(&dir.path().join("test.txt")), dir.path().join("test (2).txt"));
        assert_eq!(auto_rename_path(&dir.path().join("noext")), dir.path().join("noext (1)"));
    }
}
