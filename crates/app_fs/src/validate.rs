//! Directory validation

use std::fs;
use std::path::{Path, PathBuf};

/// Returns true iff `path` names an existing directory the process can read.
///
/// Readability is checked by opening the directory for enumeration, which is
/// what every caller is about to do with it.
pub fn is_valid_directory<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return false;
    }

    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::read_dir(path).is_ok(),
        _ => false,
    }
}

/// Walk up from `path` (exclusive) to the closest ancestor that is still a
/// valid directory.
pub fn nearest_valid_ancestor<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    path.as_ref()
        .ancestors()
        .skip(1)
        .find(|ancestor| is_valid_directory(ancestor))
        .map(Path::to_path_buf)
}
