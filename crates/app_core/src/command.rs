//! Command system for user intents

use std::fmt;
use std::path::PathBuf;

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Navigation commands
    pub const NAV_GO_TO: &'static str = "nav.go_to";
    pub const NAV_PATH_BAR: &'static str = "nav.path_bar";
    pub const NAV_TREE_DIR: &'static str = "nav.tree_dir";
    pub const NAV_BACK: &'static str = "nav.back";
    pub const NAV_FORWARD: &'static str = "nav.forward";
    pub const NAV_UP_FOLDER: &'static str = "nav.up_folder";
    pub const NAV_HOME: &'static str = "nav.home";
    pub const NAV_RELOAD: &'static str = "nav.reload";
    pub const NAV_FILTER: &'static str = "nav.filter";

    // View commands
    pub const VIEW_OPEN_ROW: &'static str = "view.open_row";
    pub const VIEW_NEXT_IMAGE: &'static str = "view.next_image";
    pub const VIEW_PREV_IMAGE: &'static str = "view.prev_image";
    pub const VIEW_FIRST_IMAGE: &'static str = "view.first_image";
    pub const VIEW_LAST_IMAGE: &'static str = "view.last_image";
    pub const VIEW_RANDOM_IMAGE: &'static str = "view.random_image";
    pub const VIEW_CLOSE_IMAGE: &'static str = "view.close_image";

    // File commands
    pub const FILE_CUT: &'static str = "file.cut";
    pub const FILE_COPY: &'static str = "file.copy";
    pub const FILE_PASTE: &'static str = "file.paste";
    pub const FILE_DELETE: &'static str = "file.delete";
    pub const FILE_RENAME: &'static str = "file.rename";
    pub const FILE_NEW_FOLDER: &'static str = "file.new_folder";
    pub const FILE_DROP: &'static str = "file.drop";
    pub const FILE_OPEN_MANAGER: &'static str = "file.open_manager";
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Command with optional parameters
#[derive(Debug, Clone)]
pub struct Command {
    pub id: CommandId,
    pub params: CommandParams,
}

/// Command parameters
#[derive(Debug, Clone, Default)]
pub struct CommandParams {
    pub int_value: Option<i64>,
    pub string_value: Option<String>,
    pub path_value: Option<PathBuf>,
    /// Copy instead of move (drag-and-drop with the copy modifier held)
    pub copy_modifier: bool,
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self {
            id: CommandId::new(id),
            params: CommandParams::default(),
        }
    }

    pub fn with_int(mut self, value: i64) -> Self {
        self.params.int_value = Some(value);
        self
    }

    pub fn with_string(mut self, value: &str) -> Self {
        self.params.string_value = Some(value.to_string());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.params.path_value = Some(path.into());
        self
    }

    pub fn with_copy_modifier(mut self, copy: bool) -> Self {
        self.params.copy_modifier = copy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let cmd = Command::new(CommandId::FILE_DROP)
            .with_path("/pics/album")
            .with_copy_modifier(true);

        assert_eq!(cmd.id.as_str(), "file.drop");
        assert_eq!(cmd.params.path_value, Some(PathBuf::from("/pics/album")));
        assert!(cmd.params.copy_modifier);
        assert_eq!(cmd.params.int_value, None);
    }
}
