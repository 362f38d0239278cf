//! Filename validation for user-entered names (rename, new folder)

/// Names reserved by Windows regardless of extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters that cannot appear in a single path component
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Check that `name` can be used as a single file or folder name.
///
/// Rejects empty names, `.`/`..`, separators and other forbidden characters,
/// control characters, reserved device names and trailing dots/spaces.
pub fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    if name.chars().any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_control()) {
        return false;
    }

    let name_upper = name.to_uppercase();
    let base_name = name_upper.split('.').next().unwrap_or("");
    if RESERVED_NAMES.contains(&base_name) {
        return false;
    }

    !(name.ends_with('.') || name.ends_with(' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(is_valid_filename("normal.jpg"));
        assert!(is_valid_filename("holiday 2023"));
        assert!(is_valid_filename(".hidden"));
    }

    #[test]
    fn test_rejects_separators_and_dots() {
        assert!(!is_valid_filename(""));
        assert!(!is_valid_filename("."));
        assert!(!is_valid_filename(".."));
        assert!(!is_valid_filename("a/b"));
        assert!(!is_valid_filename("a\\b"));
        assert!(!is_valid_filename("test:file.txt"));
    }

    #[test]
    fn test_rejects_reserved_and_trailing() {
        assert!(!is_valid_filename("CON"));
        assert!(!is_valid_filename("aux.txt"));
        assert!(!is_valid_filename("test."));
        assert!(!is_valid_filename("test "));
    }
}
