//! Directory listing for the thumbnail grid

use crate::{FsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions shown in the thumbnail grid
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "ico", "tiff", "tif",
];

/// File entry with metadata
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_hidden: bool,
    pub size: u64,
    pub modified: Option<i64>,
    pub extension: String,
}

impl FileEntry {
    /// Create a new file entry from path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);

        let is_hidden = is_hidden_file(path, &name);

        Ok(Self {
            path: path.to_path_buf(),
            name,
            is_dir: metadata.is_dir(),
            is_hidden,
            size: metadata.len(),
            modified,
            extension,
        })
    }

    /// Check if this is an image file
    pub fn is_image(&self) -> bool {
        !self.is_dir && IMAGE_EXTENSIONS.contains(&self.extension.as_str())
    }
}

/// Sort key for file listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "size")]
    Size,
    #[serde(rename = "modified")]
    Modified,
    #[serde(rename = "type")]
    Extension,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// Options for listing directory contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub show_hidden: bool,
    pub show_directories: bool,
    pub images_only: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// Case-insensitive substring the file name must contain
    pub name_filter: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            show_directories: true,
            images_only: false,
            sort_by: SortBy::Name,
            sort_order: SortOrder::Ascending,
            name_filter: None,
        }
    }
}

impl ListOptions {
    /// Image files only, no directories (thumbnail grid contents)
    pub fn thumbnails() -> Self {
        Self {
            show_directories: false,
            images_only: true,
            ..Default::default()
        }
    }

    fn accepts(&self, entry: &FileEntry) -> bool {
        if !self.show_hidden && entry.is_hidden {
            return false;
        }

        if entry.is_dir {
            return self.show_directories;
        }

        if self.images_only && !entry.is_image() {
            return false;
        }

        match self.name_filter.as_deref() {
            Some(filter) if !filter.is_empty() => {
                entry.name.to_lowercase().contains(&filter.to_lowercase())
            }
            _ => true,
        }
    }
}

/// List directory contents
pub fn list_directory<P: AsRef<Path>>(path: P, options: &ListOptions) -> Result<Vec<FileEntry>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FsError::NotFound(path.display().to_string()));
    }

    if !path.is_dir() {
        return Err(FsError::InvalidPath(format!("Not a directory: {}", path.display())));
    }

    let mut entries = Vec::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_entry = match FileEntry::from_path(entry.path()) {
            Ok(e) => e,
            Err(_) => continue, // Vanished or unreadable
        };

        if options.accepts(&file_entry) {
            entries.push(file_entry);
        }
    }

    sort_entries(&mut entries, options.sort_by, options.sort_order);

    Ok(entries)
}

/// Sort file entries; directories stay in front whatever the order
fn sort_entries(entries: &mut [FileEntry], sort_by: SortBy, order: SortOrder) {
    entries.sort_by(|a, b| {
        let cmp = match sort_by {
            SortBy::Name => natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name)),
            SortBy::Size => a.size.cmp(&b.size),
            SortBy::Modified => a.modified.cmp(&b.modified),
            SortBy::Extension => a
                .extension
                .cmp(&b.extension)
                .then_with(|| natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name))),
        };

        let cmp = match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        };

        b.is_dir.cmp(&a.is_dir).then(cmp)
    });
}

/// Split a name into case-folded text runs and numeric runs,
/// so "image2.jpg" < "image10.jpg"
fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(&first) = chars.peek() {
        let digits = first.is_ascii_digit();
        let mut run = String::new();
        while let Some(c) = chars.next_if(|c| c.is_ascii_digit() == digits) {
            run.push(c);
        }

        let part = if digits {
            // Runs too long for u64 fall back to text comparison
            match run.parse() {
                Ok(n) => NaturalSortPart::Num(n),
                Err(_) => NaturalSortPart::Str(run),
            }
        } else {
            NaturalSortPart::Str(run.to_lowercase())
        };
        parts.push(part);
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

/// Check if a file is hidden
#[cfg(windows)]
fn is_hidden_file(path: &Path, _name: &str) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    fs::metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_hidden_file(_path: &Path, name: &str) -> bool {
    name.starts_with('.')
}

/// Parent directory; the root is its own parent
pub fn get_parent<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Check if path is a root/drive
pub fn is_root<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();

    #[cfg(windows)]
    {
        // C:\ is root
        let s = path.to_string_lossy();
        s.len() <= 3 && s.ends_with('\\')
    }

    #[cfg(not(windows))]
    {
        path.parent().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_natural_sort() {
        let mut names = vec!["image10.jpg", "image2.jpg", "image1.jpg", "image20.jpg"];
        names.sort_by(|a, b| natural_sort_key(a).cmp(&natural_sort_key(b)));
        assert_eq!(names, vec!["image1.jpg", "image2.jpg", "image10.jpg", "image20.jpg"]);
    }

    #[test]
    fn test_thumbnail_listing_filters() {
        let dir = TempDir::new().unwrap();
        for name in ["b.jpg", "a.png", "notes.txt", ".hidden.jpg", "beach.JPG"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();

        let entries = list_directory(dir.path(), &ListOptions::thumbnails()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "beach.JPG"]);

        let options = ListOptions {
            name_filter: Some("BEA".into()),
            ..ListOptions::thumbnails()
        };
        let entries = list_directory(dir.path(), &options).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "beach.JPG");
    }

    #[test]
    fn test_directories_first_in_both_orders() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("z")).unwrap();

        for sort_order in [SortOrder::Ascending, SortOrder::Descending] {
            let options = ListOptions {
                show_directories: true,
                sort_order,
                ..ListOptions::default()
            };
            let entries = list_directory(dir.path(), &options).unwrap();
            assert_eq!(entries[0].name, "z");
        }
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = list_directory(dir.path().join("gone"), &ListOptions::default());
        assert!(matches!(result, Err(FsError::NotFound(_))));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_parent_of_root_is_root() {
        assert_eq!(get_parent("/"), PathBuf::from("/"));
        assert_eq!(get_parent("/home/pics"), PathBuf::from("/home"));
        assert!(is_root("/"));
        assert!(!is_root("/home"));
    }
}
