//! Terminal stand-ins for the folder tree, image viewer and dialogs

use app_core::{FolderTree, ImageView, Prompter};
use app_fs::{list_directory, ListOptions};
use crossbeam_channel::Receiver;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Folder tree backed directly by the file system
#[derive(Debug, Default)]
pub struct ConsoleTree {
    selected: Option<PathBuf>,
}

impl ConsoleTree {
    fn sibling_dirs(parent: &Path) -> Vec<PathBuf> {
        let options = ListOptions {
            show_directories: true,
            images_only: false,
            ..ListOptions::default()
        };

        list_directory(parent, &options)
            .map(|entries| {
                entries
                    .into_iter()
                    .filter(|e| e.is_dir)
                    .map(|e| e.path)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FolderTree for ConsoleTree {
    fn selected_path(&self) -> Option<PathBuf> {
        self.selected.clone()
    }

    fn set_selected(&mut self, path: &Path) {
        if path.is_dir() {
            self.selected = Some(path.to_path_buf());
        } else {
            tracing::debug!("No tree node for {}", path.display());
        }
    }

    /// Previous sibling folder, else the parent
    fn path_above(&self, path: &Path) -> Option<PathBuf> {
        let parent = path.parent()?;
        let siblings = Self::sibling_dirs(parent);

        match siblings.iter().position(|p| p == path) {
            Some(index) if index > 0 => Some(siblings[index - 1].clone()),
            _ => Some(parent.to_path_buf()),
        }
    }
}

/// Prints the image it is asked to show
#[derive(Debug, Default)]
pub struct ConsoleViewer {
    current: Option<PathBuf>,
}

impl ImageView for ConsoleViewer {
    fn load_image(&mut self, path: &Path) {
        println!("[image] {}", path.display());
        self.current = Some(path.to_path_buf());
    }

    fn current_image_path(&self) -> Option<PathBuf> {
        self.current.clone()
    }
}

/// Asks questions on stdout and takes the answer from the input thread
pub struct ConsolePrompter {
    lines: Receiver<String>,
}

impl ConsolePrompter {
    pub fn new(lines: Receiver<String>) -> Self {
        Self { lines }
    }

    fn ask(&self, question: &str) -> Option<String> {
        print!("{} ", question);
        let _ = std::io::stdout().flush();
        self.lines.recv().ok().map(|line| line.trim().to_string())
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self.ask(&format!("{}: {} [y/N]", title, message))
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }

    /// An empty answer cancels
    fn input_text(&mut self, title: &str, label: &str, initial: &str) -> Option<String> {
        let question = if initial.is_empty() {
            format!("{} - {}", title, label)
        } else {
            format!("{} - {} (was {:?})", title, label, initial)
        };

        self.ask(&question).filter(|answer| !answer.is_empty())
    }

    fn show_error(&mut self, message: &str) {
        println!("error: {}", message);
    }

    fn set_status(&mut self, message: &str) {
        println!("-- {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_above_prefers_previous_sibling() {
        let root = TempDir::new().unwrap();
        for name in ["a", "b"] {
            std::fs::create_dir(root.path().join(name)).unwrap();
        }
        let tree = ConsoleTree::default();

        assert_eq!(tree.path_above(&root.path().join("b")), Some(root.path().join("a")));
        assert_eq!(tree.path_above(&root.path().join("a")), Some(root.path().to_path_buf()));
    }

    #[test]
    fn test_prompter_reads_answers_from_channel() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut prompter = ConsolePrompter::new(rx);

        tx.send("y".to_string()).unwrap();
        assert!(prompter.confirm("Delete", "sure?"));

        tx.send("  new.jpg ".to_string()).unwrap();
        assert_eq!(prompter.input_text("Rename", "New name:", "a.jpg"), Some("new.jpg".to_string()));

        tx.send(String::new()).unwrap();
        assert_eq!(prompter.input_text("Rename", "New name:", "a.jpg"), None);

        drop(tx);
        assert!(!prompter.confirm("Delete", "sure?"));
    }
}
