//! Application configuration

use app_fs::{DeleteMode, ListOptions, SortBy, SortOrder};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub browser: BrowseConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory opened when no path is given on the command line
    pub start_dir: Option<String>,
}

/// Settings consulted by navigation and file operations.
///
/// The controller keeps its own copy and reads it once per operation, so a
/// settings change never lands halfway through an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Next/previous image wrap around the ends of the list
    pub wrap_image_list: bool,
    pub show_hidden_files: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub confirm_delete: bool,
    /// Send deleted images to the system trash instead of removing them
    pub use_trash: bool,
    /// Maximum number of directories kept in back/forward history
    pub history_limit: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            wrap_image_list: false,
            show_hidden_files: false,
            sort_by: SortBy::Name,
            sort_order: SortOrder::Ascending,
            confirm_delete: true,
            use_trash: false,
            history_limit: 256,
        }
    }
}

impl BrowseConfig {
    /// Listing options for the thumbnail grid
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            show_hidden: self.show_hidden_files,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            ..ListOptions::thumbnails()
        }
    }

    pub fn delete_mode(&self) -> DeleteMode {
        if self.use_trash {
            DeleteMode::Trash
        } else {
            DeleteMode::Permanent
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Closing an image opened from the command line exits the application
    pub exit_instead_of_close: bool,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, defaulting when missing
    pub fn load_from(config_path: &std::path::Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, config_path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("org", "photonav", "photonav")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}
