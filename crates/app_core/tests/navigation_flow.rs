use app_core::{
    channel, AppConfig, EventReceiver, FolderTree, ImageView, NavigationController, Prompter,
    ThumbnailBackend, ThumbnailLoader, ViewMode,
};
use app_fs::DefaultFileOperations;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct Tree(Option<PathBuf>);

impl FolderTree for Tree {
    fn selected_path(&self) -> Option<PathBuf> {
        self.0.clone()
    }

    fn set_selected(&mut self, path: &Path) {
        self.0 = Some(path.to_path_buf());
    }

    fn path_above(&self, path: &Path) -> Option<PathBuf> {
        path.parent().map(Path::to_path_buf)
    }
}

#[derive(Default)]
struct Viewer(Option<PathBuf>);

impl ImageView for Viewer {
    fn load_image(&mut self, path: &Path) {
        self.0 = Some(path.to_path_buf());
    }

    fn current_image_path(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

#[derive(Default)]
struct Answers {
    errors: Vec<String>,
}

impl Prompter for Answers {
    fn confirm(&mut self, _title: &str, _message: &str) -> bool {
        true
    }

    fn input_text(&mut self, _title: &str, _label: &str, _initial: &str) -> Option<String> {
        None
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn set_status(&mut self, _message: &str) {}
}

type Controller = NavigationController<ThumbnailLoader, Tree, Viewer, Answers>;

fn setup() -> (Controller, EventReceiver) {
    let config = AppConfig::default();
    let (tx, rx) = channel();
    let loader = ThumbnailLoader::new(tx, config.browser.list_options());
    let ctrl = NavigationController::new(
        loader,
        Tree::default(),
        Viewer::default(),
        Answers::default(),
        Box::new(DefaultFileOperations::new()),
        &config,
    );
    (ctrl, rx)
}

/// Drive the loop until no load is running and nothing is queued
fn settle(ctrl: &mut Controller, rx: &EventReceiver) {
    loop {
        ctrl.run_pending_tasks();
        if !ctrl.session().is_busy() && !ctrl.has_pending_tasks() {
            return;
        }
        let event = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        ctrl.handle_event(event);
    }
}

fn png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(2, 2).save(&path).unwrap();
    path
}

#[test]
fn test_browse_cut_paste_and_go_back() {
    let root = TempDir::new().unwrap();
    let album = root.path().join("album");
    let archive = root.path().join("archive");
    std::fs::create_dir(&album).unwrap();
    std::fs::create_dir(&archive).unwrap();
    png(&album, "1.png");
    png(&album, "2.png");

    let (mut ctrl, rx) = setup();
    ctrl.go_to(&album);
    settle(&mut ctrl, &rx);
    assert_eq!(ctrl.backend().row_count(), 2);

    ctrl.backend_mut().set_selection(&[0, 1]);
    assert_eq!(ctrl.cut_images().unwrap(), 2);
    ctrl.tree_mut().set_selected(&archive);
    let report = ctrl.paste().unwrap();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(ctrl.backend().row_count(), 0);
    assert!(archive.join("1.png").exists());

    ctrl.go_to(&archive);
    settle(&mut ctrl, &rx);
    assert_eq!(ctrl.backend().row_count(), 2);

    assert!(ctrl.go_back());
    settle(&mut ctrl, &rx);
    assert_eq!(ctrl.current_dir(), Some(album.as_path()));
    assert_eq!(ctrl.history().entries(), &[album.clone(), archive.clone()]);
}

#[test]
fn test_view_images_and_delete_current() {
    let root = TempDir::new().unwrap();
    let first = png(root.path(), "a.png");
    let second = png(root.path(), "b.png");

    let (mut ctrl, rx) = setup();
    ctrl.open_at_startup(&first);
    settle(&mut ctrl, &rx);

    assert_eq!(ctrl.view_mode(), ViewMode::Image);
    assert_eq!(ctrl.viewer().current_image_path(), Some(first.clone()));

    ctrl.delete().unwrap();
    assert!(!first.exists());
    assert_eq!(ctrl.viewer().current_image_path(), Some(second.clone()));

    ctrl.delete().unwrap();
    assert_eq!(ctrl.view_mode(), ViewMode::Thumbs);
    settle(&mut ctrl, &rx);
    assert_eq!(ctrl.backend().row_count(), 0);
    assert!(ctrl.prompter().errors.is_empty());
}

#[test]
fn test_removed_directory_falls_back_to_parent() {
    let root = TempDir::new().unwrap();
    let doomed = root.path().join("doomed");
    std::fs::create_dir(&doomed).unwrap();
    png(root.path(), "keep.png");

    let (mut ctrl, rx) = setup();
    ctrl.go_to(&doomed);
    settle(&mut ctrl, &rx);

    std::fs::remove_dir(&doomed).unwrap();
    ctrl.check_dir_state();
    settle(&mut ctrl, &rx);

    assert_eq!(ctrl.current_dir(), Some(root.path()));
    assert_eq!(ctrl.backend().row_count(), 1);
}
