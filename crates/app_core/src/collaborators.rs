//! Interfaces of the views the navigation core coordinates

use app_fs::ListOptions;
use std::path::{Path, PathBuf};

/// Thumbnail grid model plus the asynchronous loader that fills it.
///
/// `load_directory` returns immediately; completion is reported by posting
/// `Event::LoadFinished`. `abort` may be called at any time and only takes
/// effect through that same completion event.
pub trait ThumbnailBackend {
    fn load_directory(&mut self, dir: &Path, scroll_to_top: bool);
    fn abort(&mut self);

    fn row_count(&self) -> usize;
    fn path_at(&self, row: usize) -> Option<PathBuf>;

    fn current_row(&self) -> Option<usize>;
    fn set_current_row(&mut self, row: usize);
    /// Make the row showing `path` current; false when not listed
    fn set_current_by_path(&mut self, path: &Path) -> bool;

    /// Row after the current one, `None` at the end (never wraps)
    fn next_row(&self) -> Option<usize> {
        let next = self.current_row().map_or(0, |r| r + 1);
        (next < self.row_count()).then_some(next)
    }

    /// Row before the current one, `None` at the start (never wraps)
    fn prev_row(&self) -> Option<usize> {
        self.current_row().filter(|&r| r > 0).map(|r| r - 1)
    }

    fn last_row(&self) -> Option<usize> {
        self.row_count().checked_sub(1)
    }

    fn random_row(&self) -> Option<usize>;

    /// Selected rows, in the order the selection model reports them
    fn selected_rows(&self) -> Vec<usize>;

    /// Insert a single new thumbnail without re-reading the directory
    fn add_thumb(&mut self, path: &Path);
    fn remove_row(&mut self, row: usize);
    fn rename_row(&mut self, row: usize, new_path: &Path);

    fn set_name_filter(&mut self, filter: &str);
    /// Hidden files and sort order used from the next load on
    fn set_list_options(&mut self, options: ListOptions);
    /// Re-render the visible thumbnails from disk
    fn refresh_visible(&mut self);
}

/// Folder tree selection
pub trait FolderTree {
    /// Selected folder, `None` when nothing is selected
    fn selected_path(&self) -> Option<PathBuf>;
    /// Expand to and select `path` (ignored when the tree has no such node)
    fn set_selected(&mut self, path: &Path);
    /// Node displayed directly above `path`
    fn path_above(&self, path: &Path) -> Option<PathBuf>;
}

/// Single-image viewer
pub trait ImageView {
    fn load_image(&mut self, path: &Path);
    fn current_image_path(&self) -> Option<PathBuf>;
}

/// Synchronous confirmation, input and notification surface
pub trait Prompter {
    fn confirm(&mut self, title: &str, message: &str) -> bool;
    /// `None` when the user cancels
    fn input_text(&mut self, title: &str, label: &str, initial: &str) -> Option<String>;
    fn show_error(&mut self, message: &str);
    fn set_status(&mut self, message: &str);
}
