//! Navigation controller
//!
//! Translates user intents into history, session, clipboard and file
//! operation calls, and keeps the thumbnail grid, the folder tree and the
//! image viewer consistent with the result.

use crate::clipboard::ClipboardController;
use crate::collaborators::{FolderTree, ImageView, Prompter, ThumbnailBackend};
use crate::command::{Command, CommandId};
use crate::config::{AppConfig, BrowseConfig, ViewerConfig};
use crate::event::{Event, Task, TaskQueue};
use crate::history::HistoryStack;
use crate::session::{DirectorySession, ReloadOutcome};
use crate::AppError;
use app_fs::{
    get_parent, is_root, is_valid_directory, is_valid_filename, BatchReport, ClipboardMode,
    FileOperations,
};
use std::path::{Path, PathBuf};

/// Which view is in front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Thumbs,
    Image,
}

/// Which widget receives edit intents (delete, rename)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Tree,
    #[default]
    Thumbs,
}

/// Coordinates the folder tree, the thumbnail grid and the image viewer
/// around a single current directory.
pub struct NavigationController<B, T, V, P> {
    backend: B,
    tree: T,
    viewer: V,
    prompter: P,
    ops: Box<dyn FileOperations>,

    browse: BrowseConfig,
    viewer_config: ViewerConfig,

    history: HistoryStack,
    session: DirectorySession,
    clipboard: ClipboardController,
    tasks: TaskQueue,

    view: ViewMode,
    focus: Focus,
    path_bar: String,
    /// Image named on the command line, opened once its row shows up
    pending_open: Option<PathBuf>,
    opened_from_cli: bool,
    exit_requested: bool,
}

impl<B, T, V, P> NavigationController<B, T, V, P>
where
    B: ThumbnailBackend,
    T: FolderTree,
    V: ImageView,
    P: Prompter,
{
    pub fn new(
        backend: B,
        tree: T,
        viewer: V,
        prompter: P,
        ops: Box<dyn FileOperations>,
        config: &AppConfig,
    ) -> Self {
        Self {
            backend,
            tree,
            viewer,
            prompter,
            ops,
            browse: config.browser.clone(),
            viewer_config: config.viewer.clone(),
            history: HistoryStack::new(config.browser.history_limit),
            session: DirectorySession::new(),
            clipboard: ClipboardController::new(),
            tasks: TaskQueue::new(),
            view: ViewMode::Thumbs,
            focus: Focus::Thumbs,
            path_bar: String::new(),
            pending_open: None,
            opened_from_cli: false,
            exit_requested: false,
        }
    }

    // ===== Accessors =====

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn session(&self) -> &DirectorySession {
        &self.session
    }

    pub fn clipboard(&self) -> &ClipboardController {
        &self.clipboard
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.session.current_dir()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn path_bar(&self) -> &str {
        &self.path_bar
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    pub fn can_paste(&self) -> bool {
        self.clipboard.is_paste_available()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Replace the configuration snapshot used by subsequent operations.
    /// A change to the listing (hidden files, sort) reloads the thumbnails.
    pub fn apply_config(&mut self, config: &AppConfig) {
        let options = config.browser.list_options();
        let relist = options != self.browse.list_options();

        self.browse = config.browser.clone();
        self.viewer_config = config.viewer.clone();
        self.history.set_limit(self.browse.history_limit);

        if relist {
            self.backend.set_list_options(options);
            if self.session.current_dir().is_some() {
                self.refresh_thumbs(false);
            }
        }
    }

    // ===== Event loop =====

    /// Run every task queued before this call. Returns how many ran.
    pub fn run_pending_tasks(&mut self) -> usize {
        let batch = self.tasks.take_batch();
        let count = batch.len();

        for task in batch {
            match task {
                Task::Reload { scroll_to_top } => {
                    let outcome =
                        self.session.request_reload(scroll_to_top, &self.tree, &mut self.backend);
                    self.handle_reload_outcome(outcome);
                }
                Task::RetryReload => {
                    let outcome = self.session.retry(&self.tree, &mut self.backend);
                    self.handle_reload_outcome(outcome);
                }
                Task::ScrollToLastImage => self.scroll_to_last_image(),
            }
        }

        count
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::LoadFinished { generation, aborted } => {
                tracing::debug!(generation, aborted, "Thumbnail load finished");
                match self.session.on_load_finished(&self.tree, &mut self.backend) {
                    Some(outcome) => self.handle_reload_outcome(outcome),
                    None => {
                        self.open_pending_image(true);
                        let status = format!("{} images", self.backend.row_count());
                        self.prompter.set_status(&status);
                    }
                }
            }
            Event::RowsChanged { .. } => self.open_pending_image(false),
            Event::TreeRowsRemoved => self.check_dir_state(),
            Event::TreeClicked(path) => {
                self.tree.set_selected(&path);
                self.go_selected_dir();
            }
        }
    }

    fn handle_reload_outcome(&mut self, outcome: ReloadOutcome) {
        match outcome {
            ReloadOutcome::Started { dir, .. } => {
                self.path_bar = dir.display().to_string();
                self.history.record_visit(&dir);
                tracing::info!("Loading {}", dir.display());
            }
            ReloadOutcome::Deferred { schedule_retry: true } => {
                self.tasks.schedule(Task::RetryReload);
            }
            ReloadOutcome::Invalid(dir) => {
                self.prompter
                    .show_error(&format!("Failed to open folder: {}", dir.display()));
            }
            ReloadOutcome::Deferred { schedule_retry: false }
            | ReloadOutcome::Coalesced
            | ReloadOutcome::Skipped => {}
        }
    }

    /// Tree rows disappeared: recover if the displayed directory went with them
    pub fn check_dir_state(&mut self) {
        let Some(current) = self.session.current_dir().map(Path::to_path_buf) else {
            return;
        };

        if is_valid_directory(&current) {
            return;
        }

        tracing::warn!("{}", AppError::StaleDirectory(current.clone()));
        self.session.on_external_directory_removed(&current, &mut self.backend);
        self.refresh_thumbs(false);
    }

    // ===== Navigation =====

    /// Start with a directory, or with an image and its directory
    pub fn open_at_startup(&mut self, path: &Path) {
        if path.is_dir() {
            self.go_to(path);
            return;
        }

        let dir = get_parent(path);
        if path.is_file() {
            self.pending_open = Some(path.to_path_buf());
        } else {
            self.prompter.show_error(&format!(
                "Failed to open file \"{}\", file not found",
                path.display()
            ));
        }

        if is_valid_directory(&dir) {
            self.go_to(&dir);
        }
    }

    pub fn go_to(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.tree.set_selected(path);
        self.session.set_current_dir(path);
        self.refresh_thumbs(true);
    }

    /// Navigate to the folder selected in the tree
    pub fn go_selected_dir(&mut self) {
        match self.tree.selected_path() {
            Some(path) => self.session.set_current_dir(path),
            None => self.session.clear_current_dir(),
        }
        self.refresh_thumbs(true);
    }

    /// Navigate to a typed path
    pub fn go_path_bar(&mut self, text: &str) -> Result<(), AppError> {
        let path = PathBuf::from(text);

        if !is_valid_directory(&path) {
            let err = AppError::InvalidPath(path);
            self.prompter.show_error(&err.user_message());
            self.path_bar = self
                .session
                .current_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_default();
            return Err(err);
        }

        self.session.set_current_dir(&path);
        self.select_current_view_dir();
        self.refresh_thumbs(true);
        Ok(())
    }

    pub fn go_back(&mut self) -> bool {
        match self.history.go_back() {
            Some(path) => {
                self.go_to(path);
                true
            }
            None => false,
        }
    }

    pub fn go_forward(&mut self) -> bool {
        match self.history.go_forward() {
            Some(path) => {
                self.go_to(path);
                true
            }
            None => false,
        }
    }

    pub fn go_up(&mut self) {
        let Some(current) = self.session.current_dir().map(Path::to_path_buf) else {
            return;
        };

        if is_root(&current) {
            tracing::debug!("Already at root");
            return;
        }

        self.go_to(get_parent(&current));
    }

    pub fn go_home(&mut self) {
        match dirs_next::home_dir() {
            Some(home) => self.go_to(home),
            None => tracing::warn!("Home directory unknown"),
        }
    }

    /// Reload the front view: the image in the viewer, else the thumbnails
    pub fn reload(&mut self) {
        if self.view == ViewMode::Image {
            if let Some(path) = self.viewer.current_image_path() {
                self.viewer.load_image(&path);
            }
        } else {
            self.refresh_thumbs(false);
        }
    }

    /// Queue a thumbnail reload for the next loop iteration
    pub fn refresh_thumbs(&mut self, scroll_to_top: bool) {
        self.tasks.schedule(Task::Reload { scroll_to_top });
    }

    pub fn set_thumbs_filter(&mut self, filter: &str) {
        self.backend.set_name_filter(filter);
        self.refresh_thumbs(true);
    }

    pub fn clear_thumbs_filter(&mut self) {
        self.set_thumbs_filter("");
    }

    fn select_current_view_dir(&mut self) {
        if let Some(current) = self.session.current_dir().filter(|d| is_valid_directory(d)) {
            let current = current.to_path_buf();
            self.tree.set_selected(&current);
        }
    }

    // ===== Image viewer =====

    pub fn open_row(&mut self, row: usize) {
        if row < self.backend.row_count() {
            self.show_row(row);
        }
    }

    pub fn load_next_image(&mut self) {
        if self.backend.row_count() == 0 {
            return;
        }

        let next = self
            .backend
            .next_row()
            .or_else(|| self.browse.wrap_image_list.then_some(0));

        if let Some(row) = next {
            self.show_row(row);
        }
    }

    pub fn load_prev_image(&mut self) {
        if self.backend.row_count() == 0 {
            return;
        }

        let prev = self.backend.prev_row().or_else(|| {
            if self.browse.wrap_image_list {
                self.backend.last_row()
            } else {
                None
            }
        });

        if let Some(row) = prev {
            self.show_row(row);
        }
    }

    pub fn load_first_image(&mut self) {
        if self.backend.row_count() > 0 {
            self.show_row(0);
        }
    }

    pub fn load_last_image(&mut self) {
        if let Some(row) = self.backend.last_row() {
            self.show_row(row);
        }
    }

    pub fn load_random_image(&mut self) {
        if let Some(row) = self.backend.random_row() {
            self.show_row(row);
        }
    }

    /// Back to the thumbnail grid
    pub fn close_image(&mut self) {
        if self.opened_from_cli && self.viewer_config.exit_instead_of_close {
            self.exit_requested = true;
            return;
        }

        self.view = ViewMode::Thumbs;
        self.backend.refresh_visible();
        self.tasks.schedule(Task::ScrollToLastImage);
    }

    fn show_row(&mut self, row: usize) {
        if let Some(path) = self.backend.path_at(row) {
            self.load_image_file(&path);
            self.backend.set_current_row(row);
        }
    }

    fn load_image_file(&mut self, path: &Path) {
        self.viewer.load_image(path);
        self.view = ViewMode::Image;
    }

    fn scroll_to_last_image(&mut self) {
        if self.backend.row_count() == 0 {
            return;
        }
        if let Some(path) = self.viewer.current_image_path() {
            self.backend.set_current_by_path(&path);
        }
    }

    fn open_pending_image(&mut self, load_complete: bool) {
        let Some(path) = self.pending_open.clone() else {
            return;
        };

        if self.backend.set_current_by_path(&path) {
            self.pending_open = None;
            self.opened_from_cli = true;
            self.load_image_file(&path);
        } else if load_complete {
            tracing::warn!("{} is not listed, not opening it", path.display());
            self.pending_open = None;
        }
    }

    // ===== Clipboard =====

    fn selected_paths(&self) -> Vec<PathBuf> {
        self.backend
            .selected_rows()
            .into_iter()
            .filter_map(|row| self.backend.path_at(row))
            .collect()
    }

    pub fn cut_images(&mut self) -> Result<usize, AppError> {
        let files = self.selected_paths();
        if files.is_empty() {
            return Err(AppError::NoSelection);
        }
        self.clipboard.cut(&files);
        Ok(files.len())
    }

    pub fn copy_images(&mut self) -> Result<usize, AppError> {
        let files = self.selected_paths();
        if files.is_empty() {
            return Err(AppError::NoSelection);
        }
        self.clipboard.copy(&files);
        Ok(files.len())
    }

    /// Paste the clipboard into the folder selected in the tree
    pub fn paste(&mut self) -> Result<BatchReport, AppError> {
        let Some(mode) = self.clipboard.mode().filter(|_| self.clipboard.is_paste_available()) else {
            return Err(AppError::NothingToPaste);
        };

        let Some(dest) = self.tree.selected_path() else {
            self.prompter.show_error("Can not paste: no folder selected");
            return Err(AppError::FolderNotSelected);
        };

        if let Err(err) = self.clipboard.can_paste_into(&dest) {
            self.prompter.show_error(&err.user_message());
            if matches!(err, AppError::InvalidPath(_)) {
                self.select_current_view_dir();
            }
            return Err(err);
        }

        let files = self.clipboard.pending_files().to_vec();
        let paste_in_current = self.session.current_dir() == Some(dest.as_path());

        let report = self.ops.copy_or_move(&files, &dest, mode);
        self.apply_transfer_to_grid(&report, mode, paste_in_current);
        self.report_transfer(&report, mode, files.len());

        self.select_current_view_dir();
        self.clipboard.complete_paste();
        self.backend.refresh_visible();

        Ok(report)
    }

    /// Drop onto the folder selected in the tree: either a whole folder
    /// (moved by rename) or the selected thumbnails
    pub fn drop_onto_tree(&mut self, copy: bool, dropped_dir: Option<&Path>) -> Result<(), AppError> {
        let dest = match self.tree.selected_path() {
            Some(dest) if is_valid_directory(&dest) => dest,
            other => {
                self.prompter.show_error("Can not move or copy images to this folder");
                self.select_current_view_dir();
                return Err(AppError::InvalidPath(other.unwrap_or_default()));
            }
        };

        if self.session.current_dir() == Some(dest.as_path()) {
            self.prompter.show_error("Destination folder is same as source");
            return Err(AppError::SameFolderConflict(dest));
        }

        match dropped_dir {
            Some(dir) => self.move_dropped_dir(dir, &dest)?,
            None => {
                let files = self.selected_paths();
                if files.is_empty() {
                    return Err(AppError::NoSelection);
                }

                let mode = if copy { ClipboardMode::Copy } else { ClipboardMode::Cut };
                let report = self.ops.copy_or_move(&files, &dest, mode);
                self.apply_transfer_to_grid(&report, mode, false);
                self.report_transfer(&report, mode, files.len());
            }
        }

        self.backend.refresh_visible();
        Ok(())
    }

    fn move_dropped_dir(&mut self, dir: &Path, dest: &Path) -> Result<(), AppError> {
        if dest.starts_with(dir) {
            self.prompter.show_error("Can not move a folder into itself");
            return Err(AppError::SameFolderConflict(dest.to_path_buf()));
        }

        let Some(name) = dir.file_name() else {
            return Err(AppError::InvalidPath(dir.to_path_buf()));
        };

        if let Err(e) = self.ops.rename(dir, &dest.join(name)) {
            self.prompter.show_error("Failed to move folder");
            return Err(e.into());
        }

        self.prompter.set_status("Folder moved");
        self.check_dir_state();
        Ok(())
    }

    /// Mirror a finished transfer in the grid without a full reload
    fn apply_transfer_to_grid(&mut self, report: &BatchReport, mode: ClipboardMode, into_current: bool) {
        if into_current {
            for transfer in &report.transferred {
                self.backend.add_thumb(&transfer.destination);
            }
        } else if mode == ClipboardMode::Cut {
            for transfer in &report.transferred {
                self.remove_row_for(&transfer.source);
            }
        }
    }

    fn report_transfer(&mut self, report: &BatchReport, mode: ClipboardMode, total: usize) {
        if !report.is_success() {
            let verb = match mode {
                ClipboardMode::Copy => "copy",
                ClipboardMode::Cut => "move",
            };
            tracing::warn!(failed = report.failed(), total, "Partial {}", verb);
            self.prompter
                .show_error(&format!("Failed to {} {} of {} images", verb, report.failed(), total));
        }

        let status = format!("{} {} images", mode.verb(), report.succeeded());
        self.prompter.set_status(&status);
    }

    fn remove_row_for(&mut self, path: &Path) {
        let row = (0..self.backend.row_count())
            .find(|&row| self.backend.path_at(row).as_deref() == Some(path));
        if let Some(row) = row {
            self.backend.remove_row(row);
        }
    }

    // ===== Delete =====

    /// Delete whatever the focused view points at
    pub fn delete(&mut self) -> Result<(), AppError> {
        if self.focus == Focus::Tree {
            return self.delete_dir();
        }

        if self.view == ViewMode::Image {
            return self.delete_single_image();
        }

        self.delete_selected_images().map(|_| ())
    }

    /// Delete the image shown in the viewer and move on to a neighbour
    pub fn delete_single_image(&mut self) -> Result<(), AppError> {
        let Some((row, path)) = self
            .backend
            .current_row()
            .and_then(|row| self.backend.path_at(row).map(|path| (row, path)))
        else {
            return Err(AppError::NoSelection);
        };

        if self.browse.confirm_delete
            && !self.prompter.confirm("Delete image", "Permanently delete this image?")
        {
            return Ok(());
        }

        if let Err(e) = self.ops.delete_file(&path, self.browse.delete_mode()) {
            self.prompter.show_error("Failed to delete image");
            return Err(e.into());
        }

        self.backend.remove_row(row);
        if row > 0 {
            self.backend.set_current_row(row - 1);
        }

        if self.backend.row_count() == 0 {
            self.close_image();
            self.refresh_thumbs(true);
            return Ok(());
        }

        // Neighbour without wrapping: the next image, or the previous one at the end
        let target = if row > 0 && self.backend.next_row().is_none() {
            row - 1
        } else {
            row
        };
        self.show_row(target);

        Ok(())
    }

    /// Delete the selected thumbnails one by one, stopping at the first failure
    pub fn delete_selected_images(&mut self) -> Result<usize, AppError> {
        let total = self.backend.selected_rows().len();
        if total == 0 {
            self.prompter.set_status("No selection");
            return Err(AppError::NoSelection);
        }

        if self.browse.confirm_delete
            && !self.prompter.confirm("Delete images", "Permanently delete selected images?")
        {
            return Ok(0);
        }

        let mode = self.browse.delete_mode();
        let mut deleted = 0;

        for _ in 0..total {
            let Some(row) = self.backend.selected_rows().first().copied() else {
                break;
            };
            let Some(path) = self.backend.path_at(row) else {
                break;
            };

            if let Err(source) = self.ops.delete_file(&path, mode) {
                self.prompter.show_error("Failed to delete image");
                self.prompter.set_status(&format!("Deleted {} images", deleted));
                return Err(AppError::PartialBatch {
                    action: "Delete",
                    completed: deleted,
                    remaining: total - deleted,
                    source,
                });
            }

            self.backend.remove_row(row);
            deleted += 1;
        }

        self.prompter.set_status(&format!("Deleted {} images", deleted));
        self.backend.refresh_visible();
        Ok(deleted)
    }

    /// Delete the folder selected in the tree with everything in it
    pub fn delete_dir(&mut self) -> Result<(), AppError> {
        let Some(target) = self.tree.selected_path() else {
            return Err(AppError::FolderNotSelected);
        };
        let above = self.tree.path_above(&target);
        let name = display_name(&target);

        let question = format!("Permanently delete {} and all of its contents?", name);
        if !self.prompter.confirm("Delete folder", &question) {
            self.select_current_view_dir();
            return Ok(());
        }

        if let Err(e) = self.ops.delete_directory_recursive(&target) {
            self.prompter.show_error("Failed to delete folder");
            self.select_current_view_dir();
            self.check_dir_state();
            return Err(e.into());
        }

        self.prompter
            .set_status(&format!("Removed {}", target.display()));

        match above {
            Some(above) if self.session.current_dir() == Some(target.as_path()) => {
                self.tree.set_selected(&above);
            }
            _ => self.select_current_view_dir(),
        }

        self.check_dir_state();
        Ok(())
    }

    // ===== Rename / create =====

    /// Rename whatever the focused view points at
    pub fn rename(&mut self) -> Result<(), AppError> {
        if self.focus == Focus::Tree {
            self.rename_dir()
        } else {
            self.rename_image()
        }
    }

    pub fn rename_image(&mut self) -> Result<(), AppError> {
        let rows = self.backend.selected_rows();
        let Some(path) = (rows.len() == 1)
            .then(|| self.backend.path_at(rows[0]))
            .flatten()
        else {
            self.prompter.set_status("Invalid selection");
            return Err(AppError::NoSelection);
        };
        let row = rows[0];
        let name = display_name(&path);

        let Some(new_name) = self
            .prompter
            .input_text(&format!("Rename {}", name), "New name:", &name)
        else {
            return Ok(());
        };

        if new_name.is_empty() {
            self.prompter.show_error("No name entered");
            return Err(AppError::InvalidName(new_name));
        }
        if !is_valid_filename(&new_name) {
            self.prompter.show_error("Invalid name entered");
            return Err(AppError::InvalidName(new_name));
        }

        let new_path = get_parent(&path).join(&new_name);
        if let Err(e) = self.ops.rename(&path, &new_path) {
            self.prompter.show_error("Failed to rename image");
            return Err(e.into());
        }

        self.backend.rename_row(row, &new_path);
        Ok(())
    }

    pub fn rename_dir(&mut self) -> Result<(), AppError> {
        let Some(dir) = self.tree.selected_path() else {
            return Err(AppError::FolderNotSelected);
        };
        let name = display_name(&dir);

        let Some(new_name) = self
            .prompter
            .input_text(&format!("Rename {}", name), "New name:", &name)
        else {
            self.select_current_view_dir();
            return Ok(());
        };

        if !is_valid_filename(&new_name) {
            self.prompter.show_error("Invalid name entered");
            self.select_current_view_dir();
            return Err(AppError::InvalidName(new_name));
        }

        let new_path = get_parent(&dir).join(&new_name);
        if let Err(e) = self.ops.rename(&dir, &new_path) {
            self.prompter.show_error("Failed to rename folder");
            self.select_current_view_dir();
            return Err(e.into());
        }

        if self.session.current_dir() == Some(dir.as_path()) {
            self.go_to(&new_path);
        } else {
            self.select_current_view_dir();
            self.check_dir_state();
        }

        Ok(())
    }

    /// Create a folder under the tree selection. `Ok(None)` when cancelled.
    pub fn create_sub_directory(&mut self) -> Result<Option<PathBuf>, AppError> {
        let Some(parent) = self.tree.selected_path() else {
            return Err(AppError::FolderNotSelected);
        };

        let Some(name) = self
            .prompter
            .input_text("New Sub folder", "New folder name:", "")
        else {
            self.select_current_view_dir();
            return Ok(None);
        };

        if !is_valid_filename(&name) {
            self.prompter.show_error("Invalid name entered");
            self.select_current_view_dir();
            return Err(AppError::InvalidName(name));
        }

        match self.ops.create_directory(&parent, &name) {
            Ok(path) => {
                self.prompter.set_status(&format!("Created {}", name));
                self.select_current_view_dir();
                Ok(Some(path))
            }
            Err(e) => {
                self.prompter.show_error("Failed to create new folder");
                self.select_current_view_dir();
                Err(e.into())
            }
        }
    }

    /// Open the tree selection in the system file manager
    pub fn manage_dir(&mut self) -> Result<(), AppError> {
        let Some(dir) = self.tree.selected_path() else {
            return Err(AppError::FolderNotSelected);
        };

        self.prompter.set_status("Executing file manager...");
        self.ops.open_in_file_manager(&dir).map_err(|e| {
            self.prompter.show_error(&e.to_string());
            AppError::from(e)
        })
    }

    // ===== Commands =====

    pub fn execute(&mut self, cmd: &Command) -> Result<(), AppError> {
        tracing::debug!("Executing {}", cmd.id);

        match cmd.id.as_str() {
            CommandId::NAV_GO_TO => {
                let path = required_path(cmd)?;
                self.go_to(path);
            }
            CommandId::NAV_PATH_BAR => {
                let text = cmd.params.string_value.clone().unwrap_or_default();
                self.go_path_bar(&text)?;
            }
            CommandId::NAV_TREE_DIR => {
                if let Some(path) = &cmd.params.path_value {
                    self.tree.set_selected(path);
                }
                self.go_selected_dir();
            }
            CommandId::NAV_BACK => {
                self.go_back();
            }
            CommandId::NAV_FORWARD => {
                self.go_forward();
            }
            CommandId::NAV_UP_FOLDER => self.go_up(),
            CommandId::NAV_HOME => self.go_home(),
            CommandId::NAV_RELOAD => self.reload(),
            CommandId::NAV_FILTER => {
                let filter = cmd.params.string_value.clone().unwrap_or_default();
                self.set_thumbs_filter(&filter);
            }

            CommandId::VIEW_OPEN_ROW => {
                let row = cmd.params.int_value.unwrap_or(0);
                self.open_row(usize::try_from(row).unwrap_or(usize::MAX));
            }
            CommandId::VIEW_NEXT_IMAGE => self.load_next_image(),
            CommandId::VIEW_PREV_IMAGE => self.load_prev_image(),
            CommandId::VIEW_FIRST_IMAGE => self.load_first_image(),
            CommandId::VIEW_LAST_IMAGE => self.load_last_image(),
            CommandId::VIEW_RANDOM_IMAGE => self.load_random_image(),
            CommandId::VIEW_CLOSE_IMAGE => self.close_image(),

            CommandId::FILE_CUT => {
                self.cut_images()?;
            }
            CommandId::FILE_COPY => {
                self.copy_images()?;
            }
            CommandId::FILE_PASTE => {
                self.paste()?;
            }
            CommandId::FILE_DELETE => self.delete()?,
            CommandId::FILE_RENAME => self.rename()?,
            CommandId::FILE_NEW_FOLDER => {
                self.create_sub_directory()?;
            }
            CommandId::FILE_DROP => {
                self.drop_onto_tree(cmd.params.copy_modifier, cmd.params.path_value.as_deref())?;
            }
            CommandId::FILE_OPEN_MANAGER => self.manage_dir()?,

            other => tracing::warn!("Unknown command: {}", other),
        }

        Ok(())
    }
}

fn required_path(cmd: &Command) -> Result<PathBuf, AppError> {
    cmd.params
        .path_value
        .clone()
        .ok_or_else(|| AppError::InvalidPath(PathBuf::new()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
