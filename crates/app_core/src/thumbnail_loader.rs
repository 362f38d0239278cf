//! Background directory loader backing the thumbnail grid
//!
//! A worker thread lists the directory, reads each image's dimensions and
//! appends rows to a shared model in small batches. The event loop learns
//! about progress through `Event::RowsChanged` and about completion through
//! `Event::LoadFinished`.

use crate::collaborators::ThumbnailBackend;
use crate::event::{Event, EventSender};
use app_fs::{list_directory, ListOptions};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Rows published per `RowsChanged` notification
const ROW_BATCH: usize = 32;

/// Rows re-read by `refresh_visible`, centred on the current row
const VISIBLE_ROWS: usize = 64;

/// One row of the thumbnail grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbEntry {
    pub path: PathBuf,
    pub name: String,
    /// Pixel size, `None` when the file could not be decoded
    pub dimensions: Option<(u32, u32)>,
}

impl ThumbEntry {
    pub fn read(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            dimensions: image::image_dimensions(path).ok(),
        }
    }
}

#[derive(Debug, Default)]
struct RowModel {
    generation: u64,
    entries: Vec<ThumbEntry>,
    /// Paths inserted by `add_thumb` during this generation; the worker skips them
    added: HashSet<PathBuf>,
}

/// Thumbnail grid model filled by a worker thread
pub struct ThumbnailLoader {
    model: Arc<Mutex<RowModel>>,
    abort_flag: Arc<AtomicBool>,
    events: EventSender,
    options: ListOptions,
    name_filter: String,
    generation: u64,
    current: Option<usize>,
    selection: Vec<usize>,
    worker: Option<JoinHandle<()>>,
}

impl ThumbnailLoader {
    pub fn new(events: EventSender, options: ListOptions) -> Self {
        Self {
            model: Arc::new(Mutex::new(RowModel::default())),
            abort_flag: Arc::new(AtomicBool::new(false)),
            events,
            options,
            name_filter: String::new(),
            generation: 0,
            current: None,
            selection: Vec::new(),
            worker: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot of the rows loaded so far
    pub fn entries(&self) -> Vec<ThumbEntry> {
        self.model.lock().entries.clone()
    }

    /// Replace the selection; rows out of range are dropped
    pub fn set_selection(&mut self, rows: &[usize]) {
        let count = self.row_count();
        self.selection = rows.iter().copied().filter(|&r| r < count).collect();
    }

    fn row_of(&self, path: &Path) -> Option<usize> {
        self.model.lock().entries.iter().position(|e| e.path == path)
    }
}

impl ThumbnailBackend for ThumbnailLoader {
    fn load_directory(&mut self, dir: &Path, _scroll_to_top: bool) {
        self.generation += 1;
        let generation = self.generation;

        {
            let mut model = self.model.lock();
            model.generation = generation;
            model.entries.clear();
            model.added.clear();
        }
        self.current = None;
        self.selection.clear();

        // Each load gets its own flag so a late abort cannot hit the next one
        self.abort_flag = Arc::new(AtomicBool::new(false));

        let options = ListOptions {
            name_filter: (!self.name_filter.is_empty()).then(|| self.name_filter.clone()),
            ..self.options.clone()
        };
        let dir = dir.to_path_buf();
        let model = Arc::clone(&self.model);
        let abort_flag = Arc::clone(&self.abort_flag);
        let events = self.events.clone();

        let spawned = std::thread::Builder::new()
            .name("thumb-loader".to_string())
            .spawn(move || load_worker(&dir, &options, generation, &model, &abort_flag, &events));

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                tracing::error!("Failed to spawn thumbnail loader: {}", e);
                let _ = self.events.send(Event::LoadFinished { generation, aborted: true });
            }
        }
    }

    fn abort(&mut self) {
        tracing::debug!(generation = self.generation, "Aborting thumbnail load");
        self.abort_flag.store(true, Ordering::Relaxed);
    }

    fn row_count(&self) -> usize {
        self.model.lock().entries.len()
    }

    fn path_at(&self, row: usize) -> Option<PathBuf> {
        self.model.lock().entries.get(row).map(|e| e.path.clone())
    }

    fn current_row(&self) -> Option<usize> {
        self.current
    }

    fn set_current_row(&mut self, row: usize) {
        if row < self.row_count() {
            self.current = Some(row);
            self.selection = vec![row];
        }
    }

    fn set_current_by_path(&mut self, path: &Path) -> bool {
        match self.row_of(path) {
            Some(row) => {
                self.set_current_row(row);
                true
            }
            None => false,
        }
    }

    fn random_row(&self) -> Option<usize> {
        match self.row_count() {
            0 => None,
            count => Some(rand::thread_rng().gen_range(0..count)),
        }
    }

    fn selected_rows(&self) -> Vec<usize> {
        self.selection.clone()
    }

    fn add_thumb(&mut self, path: &Path) {
        let entry = ThumbEntry::read(path);

        let mut model = self.model.lock();
        if model.entries.iter().any(|e| e.path == path) {
            return;
        }
        model.added.insert(entry.path.clone());
        model.entries.push(entry);
    }

    fn remove_row(&mut self, row: usize) {
        {
            let mut model = self.model.lock();
            if row >= model.entries.len() {
                return;
            }
            model.entries.remove(row);
        }

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
        if let Some(entry) = self.model.lock().entries.get_mut(row) {
            *entry = ThumbEntry::read(new_path);
        }
    }

    fn set_name_filter(&mut self, filter: &str) {
        self.name_filter = filter.to_string();
    }

    fn set_list_options(&mut self, options: ListOptions) {
        self.options = options;
    }

    fn refresh_visible(&mut self) {
        let start = self.current.map_or(0, |c| c.saturating_sub(VISIBLE_ROWS / 2));
        let window: Vec<(usize, PathBuf)> = self
            .model
            .lock()
            .entries
            .iter()
            .enumerate()
            .skip(start)
            .take(VISIBLE_ROWS)
            .map(|(row, e)| (row, e.path.clone()))
            .collect();

        // Decode outside the lock so the worker keeps publishing
        let refreshed: Vec<_> = window
            .into_iter()
            .map(|(row, path)| {
                let dimensions = image::image_dimensions(&path).ok();
                (row, path, dimensions)
            })
            .collect();

        let mut model = self.model.lock();
        for (row, path, dimensions) in refreshed {
            if let Some(entry) = model.entries.get_mut(row).filter(|e| e.path == path) {
                entry.dimensions = dimensions;
            }
        }
    }
}

impl Drop for ThumbnailLoader {
    fn drop(&mut self) {
        self.abort_flag.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn load_worker(
    dir: &Path,
    options: &ListOptions,
    generation: u64,
    model: &Mutex<RowModel>,
    abort_flag: &AtomicBool,
    events: &EventSender,
) {
    let listing = match list_directory(dir, options) {
        Ok(listing) => listing,
        Err(e) => {
            tracing::warn!("Failed to list {}: {}", dir.display(), e);
            Vec::new()
        }
    };

    let mut aborted = false;
    let mut batch = Vec::with_capacity(ROW_BATCH);

    for entry in listing {
        if abort_flag.load(Ordering::Relaxed) {
            aborted = true;
            break;
        }

        batch.push(ThumbEntry {
            dimensions: image::image_dimensions(&entry.path).ok(),
            path: entry.path,
            name: entry.name,
        });

        if batch.len() >= ROW_BATCH {
            publish(&mut batch, generation, model, events);
        }
    }

    if !aborted {
        publish(&mut batch, generation, model, events);
    }

    tracing::debug!(generation, aborted, "Listed {}", dir.display());
    let _ = events.send(Event::LoadFinished { generation, aborted });
}

fn publish(batch: &mut Vec<ThumbEntry>, generation: u64, model: &Mutex<RowModel>, events: &EventSender) {
    if batch.is_empty() {
        return;
    }

    let count = {
        let mut model = model.lock();
        if model.generation != generation {
            batch.clear();
            return;
        }
        if !model.added.is_empty() {
            batch.retain(|e| !model.added.contains(&e.path));
        }
        model.entries.append(batch);
        model.entries.len()
    };

    let _ = events.send(Event::RowsChanged { count });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{channel, EventReceiver};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    fn wait_finished(rx: &EventReceiver) -> (u64, bool) {
        loop {
            match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
                Event::LoadFinished { generation, aborted } => return (generation, aborted),
                _ => continue,
            }
        }
    }

    #[test]
    fn test_load_lists_images_with_dimensions() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "b.png", 4, 3);
        write_png(dir.path(), "a.png", 2, 2);
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let (tx, rx) = channel();
        let mut loader = ThumbnailLoader::new(tx, ListOptions::thumbnails());
        loader.load_directory(dir.path(), true);

        assert_eq!(wait_finished(&rx), (1, false));
        let entries = loader.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.png");
        assert_eq!(entries[1].dimensions, Some((4, 3)));
    }

    #[test]
    fn test_name_filter_applies_to_next_load() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "cat.png", 1, 1);
        write_png(dir.path(), "dog.png", 1, 1);

        let (tx, rx) = channel();
        let mut loader = ThumbnailLoader::new(tx, ListOptions::thumbnails());
        loader.set_name_filter("CAT");
        loader.load_directory(dir.path(), true);
        wait_finished(&rx);

        assert_eq!(loader.row_count(), 1);
        assert_eq!(loader.path_at(0), Some(dir.path().join("cat.png")));
    }

    #[test]
    fn test_aborted_worker_publishes_nothing() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "a.png", 1, 1);

        let (tx, rx) = channel();
        let model = Mutex::new(RowModel { generation: 7, entries: Vec::new(), added: HashSet::new() });
        let abort_flag = AtomicBool::new(true);

        load_worker(dir.path(), &ListOptions::thumbnails(), 7, &model, &abort_flag, &tx);

        assert_eq!(wait_finished(&rx), (7, true));
        assert!(model.lock().entries.is_empty());
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let (tx, rx) = channel();
        let model = Mutex::new(RowModel { generation: 2, entries: Vec::new(), added: HashSet::new() });
        let mut batch = vec![ThumbEntry::read(Path::new("/p/a.png"))];

        publish(&mut batch, 1, &model, &tx);

        assert!(model.lock().entries.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_pasted_row_is_not_listed_twice() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "a.png", 1, 1);
        let pasted = write_png(dir.path(), "b.png", 1, 1);

        let (tx, rx) = channel();
        let mut loader = ThumbnailLoader::new(tx.clone(), ListOptions::thumbnails());
        loader.model.lock().generation = 1;

        // Paste lands before the worker has listed the directory
        loader.add_thumb(&pasted);
        let abort_flag = AtomicBool::new(false);
        load_worker(dir.path(), &ListOptions::thumbnails(), 1, &loader.model, &abort_flag, &tx);
        wait_finished(&rx);

        assert_eq!(loader.row_count(), 2);
        assert_eq!(loader.path_at(0), Some(pasted));
        assert_eq!(loader.path_at(1), Some(dir.path().join("a.png")));
    }

    #[test]
    fn test_refresh_visible_rereads_rows_near_current() {
        let dir = TempDir::new().unwrap();
        for i in 0..100 {
            std::fs::write(dir.path().join(format!("{:03}.png", i)), b"").unwrap();
        }
        let (tx, rx) = channel();
        let mut loader = ThumbnailLoader::new(tx, ListOptions::thumbnails());
        loader.load_directory(dir.path(), true);
        wait_finished(&rx);
        assert_eq!(loader.row_count(), 100);

        write_png(dir.path(), "000.png", 3, 3);
        write_png(dir.path(), "099.png", 3, 3);
        loader.set_current_row(0);
        loader.refresh_visible();

        let entries = loader.entries();
        assert_eq!(entries[0].dimensions, Some((3, 3)));
        assert_eq!(entries[99].dimensions, None);
    }

    #[test]
    fn test_row_edits_keep_selection_consistent() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_png(dir.path(), name, 1, 1);
        }
        let (tx, rx) = channel();
        let mut loader = ThumbnailLoader::new(tx, ListOptions::thumbnails());
        loader.load_directory(dir.path(), true);
        wait_finished(&rx);

        loader.set_selection(&[0, 2, 9]);
        assert_eq!(loader.selected_rows(), vec![0, 2]);

        loader.remove_row(0);
        assert_eq!(loader.selected_rows(), vec![1]);
        assert_eq!(loader.path_at(0), Some(dir.path().join("b.png")));

        assert!(loader.set_current_by_path(&dir.path().join("c.png")));
        assert_eq!(loader.current_row(), Some(1));
        assert_eq!(loader.next_row(), None);

        loader.add_thumb(&dir.path().join("c.png"));
        assert_eq!(loader.row_count(), 2);

        let row = loader.random_row().unwrap();
        assert!(row < 2);
    }
}
