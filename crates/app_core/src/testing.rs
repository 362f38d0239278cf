//! In-memory collaborators for unit tests

use crate::collaborators::{FolderTree, ImageView, Prompter, ThumbnailBackend};
use app_fs::ListOptions;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub rows: Vec<PathBuf>,
    pub current: Option<usize>,
    pub selection: Vec<usize>,
    pub loads: Vec<(PathBuf, bool)>,
    pub aborts: usize,
    pub added: Vec<PathBuf>,
    pub filter: String,
    pub options: Option<ListOptions>,
    pub refreshes: usize,
}

impl FakeBackend {
    pub fn with_rows(rows: &[PathBuf]) -> Self {
        Self {
            rows: rows.to_vec(),
            ..Default::default()
        }
    }
}

impl ThumbnailBackend for FakeBackend {
    fn load_directory(&mut self, dir: &Path, scroll_to_top: bool) {
        self.loads.push((dir.to_path_buf(), scroll_to_top));
    }

    fn abort(&mut self) {
        self.aborts += 1;
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn path_at(&self, row: usize) -> Option<PathBuf> {
        self.rows.get(row).cloned()
    }

    fn current_row(&self) -> Option<usize> {
        self.current
    }

    fn set_current_row(&mut self, row: usize) {
        self.current = Some(row);
    }

    fn set_current_by_path(&mut self, path: &Path) -> bool {
        match self.rows.iter().position(|r| r == path) {
            Some(row) => {
                self.current = Some(row);
                true
            }
            None => false,
        }
    }

    fn random_row(&self) -> Option<usize> {
        self.last_row()
    }

    fn selected_rows(&self) -> Vec<usize> {
        self.selection.clone()
    }

    fn add_thumb(&mut self, path: &Path) {
        self.added.push(path.to_path_buf());
        self.rows.push(path.to_path_buf());
    }

    fn remove_row(&mut self, row: usize) {
        self.rows.remove(row);
        self.selection.retain(|&r| r != row);
        for r in &mut self.selection {
            if *r > row {
                *r -= 1;
            }
        }
        self.current = match self.current {
            Some(c) if c == row => None,
            Some(c) if c > row => Some(c - 1),
            other => other,
        };
    }

    fn rename_row(&mut self, row: usize, new_path: &Path) {
        self.rows[row] = new_path.to_path_buf();
    }

    fn set_name_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
    }

    fn set_list_options(&mut self, options: ListOptions) {
        self.options = Some(options);
    }

    fn refresh_visible(&mut self) {
        self.refreshes += 1;
    }
}

#[derive(Debug, Default)]
pub struct FakeTree {
    pub selected: Option<PathBuf>,
    pub selections: Vec<PathBuf>,
    pub above: HashMap<PathBuf, PathBuf>,
}

impl FakeTree {
    pub fn selecting(path: &Path) -> Self {
        Self {
            selected: Some(path.to_path_buf()),
            ..Default::default()
        }
    }
}

impl FolderTree for FakeTree {
    fn selected_path(&self) -> Option<PathBuf> {
        self.selected.clone()
    }

    fn set_selected(&mut self, path: &Path) {
        self.selected = Some(path.to_path_buf());
        self.selections.push(path.to_path_buf());
    }

    fn path_above(&self, path: &Path) -> Option<PathBuf> {
        self.above.get(path).cloned()
    }
}

#[derive(Debug, Default)]
pub struct FakeViewer {
    pub loaded: Vec<PathBuf>,
}

impl ImageView for FakeViewer {
    fn load_image(&mut self, path: &Path) {
        self.loaded.push(path.to_path_buf());
    }

    fn current_image_path(&self) -> Option<PathBuf> {
        self.loaded.last().cloned()
    }
}

#[derive(Debug)]
pub struct FakePrompter {
    pub answer: bool,
    pub inputs: VecDeque<Option<String>>,
    pub confirmations: Vec<String>,
    pub errors: Vec<String>,
    pub statuses: Vec<String>,
}

impl Default for FakePrompter {
    fn default() -> Self {
        Self {
            answer: true,
            inputs: VecDeque::new(),
            confirmations: Vec::new(),
            errors: Vec::new(),
            statuses: Vec::new(),
        }
    }
}

impl FakePrompter {
    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }
}

impl Prompter for FakePrompter {
    fn confirm(&mut self, title: &str, _message: &str) -> bool {
        self.confirmations.push(title.to_string());
        self.answer
    }

    fn input_text(&mut self, _title: &str, _label: &str, _initial: &str) -> Option<String> {
        self.inputs.pop_front().flatten()
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn set_status(&mut self, message: &str) {
        self.statuses.push(message.to_string());
    }
}
