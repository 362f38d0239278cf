//! Event channel and deferred tasks
//!
//! Collaborators (thumbnail backend, folder tree, file watcher) never call
//! into the controller directly; they post an [`Event`] on the channel and
//! the event loop hands it to `NavigationController::handle_event`.
//! Work the controller defers to "the next loop iteration" is queued as a
//! [`Task`] and run by `NavigationController::run_pending_tasks`.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::path::PathBuf;

/// Notifications delivered to the navigation controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The backend finished (or abandoned, after `abort`) a directory load
    LoadFinished { generation: u64, aborted: bool },
    /// Rows were appended to the thumbnail model
    RowsChanged { count: usize },
    /// Entries disappeared from the folder tree (directory removed/renamed)
    TreeRowsRemoved,
    /// The user clicked a folder in the tree
    TreeClicked(PathBuf),
}

pub type EventSender = Sender<Event>;
pub type EventReceiver = Receiver<Event>;

/// Create the event channel shared by all collaborators
pub fn channel() -> (EventSender, EventReceiver) {
    unbounded()
}

/// Work deferred to the next event loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Reload the thumbnails of the current directory
    Reload { scroll_to_top: bool },
    /// Re-poll a reload that arrived while the backend was busy
    RetryReload,
    /// Select the last viewed image in the grid after closing the viewer
    ScrollToLastImage,
}

/// Zero-delay timer queue
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Take everything queued so far; tasks scheduled while running the
    /// batch wait for the next iteration.
    pub fn take_batch(&mut self) -> VecDeque<Task> {
        std::mem::take(&mut self.tasks)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn count(&self, task: Task) -> usize {
        self.tasks.iter().filter(|t| **t == task).count()
    }
}
