//! photonav Core Navigation Logic
//!
//! This crate contains:
//! - Back/forward history
//! - Directory session with single-flight thumbnail reloads
//! - Cut/copy/paste clipboard
//! - Navigation controller and command dispatch
//! - Configuration
//! - Error types
//! - Background thumbnail loader

pub mod clipboard;
pub mod collaborators;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod navigation;
pub mod session;
pub mod thumbnail_loader;

#[cfg(test)]
mod testing;

pub use clipboard::ClipboardController;
pub use collaborators::{FolderTree, ImageView, Prompter, ThumbnailBackend};
pub use command::{Command, CommandId, CommandParams};
pub use config::{AppConfig, BrowseConfig, GeneralConfig, ViewerConfig};
pub use error::AppError;
pub use event::{channel, Event, EventReceiver, EventSender, Task, TaskQueue};
pub use history::HistoryStack;
pub use navigation::{Focus, NavigationController, ViewMode};
pub use session::{DirectorySession, ReloadOutcome};
pub use thumbnail_loader::{ThumbEntry, ThumbnailLoader};
