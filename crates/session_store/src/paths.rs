use std::path::{Component, Path, PathBuf};

use crate::error::SessionStoreError;

/// Directory components below the user config directory.
pub const SESSION_DIR: [&str; 2] = ["gemini-cli", "sessions"];
pub const SESSION_EXTENSION: &str = "json";

#[must_use]
pub fn session_root(config_dir: &Path) -> PathBuf {
    config_dir.join(SESSION_DIR[0]).join(SESSION_DIR[1])
}

#[must_use]
pub fn session_file_name(name: &str) -> String {
    format!("{name}.{SESSION_EXTENSION}")
}

/// Session names map to a single file in the session directory.
pub fn validate_session_name(name: &str) -> Result<(), SessionStoreError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(['/', '\\']) {
        "name must not contain path separators"
    } else if name.contains('.') {
        "name must not contain '.'"
    } else {
        return Ok(());
    };

    Err(SessionStoreError::InvalidSessionName {
        name: name.to_string(),
        reason,
    })
}

/// Rejects empty, absolute and parent-traversing paths.
pub fn validate_relative_path(path: &str) -> Result<(), SessionStoreError> {
    let reason = if path.trim().is_empty() {
        "path is empty"
    } else if path.contains("..") {
        "path must not contain '..'"
    } else if is_absolute(path) {
        "absolute paths are not allowed"
    } else {
        return Ok(());
    };

    Err(SessionStoreError::UnsafePath {
        path: path.to_string(),
        reason,
    })
}

fn is_absolute(path: &str) -> bool {
    let path = Path::new(path);
    path.is_absolute()
        || path.has_root()
        || matches!(path.components().next(), Some(Component::Prefix(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_names_reject_separators_and_dots() {
        assert!(validate_session_name("work").is_ok());
        assert!(validate_session_name("my_chat-2").is_ok());
        for bad in ["", "a/b", "a\\b", "a.json", ".."] {
            assert!(
                matches!(
                    validate_session_name(bad),
                    Err(SessionStoreError::InvalidSessionName { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn relative_paths_reject_traversal_and_roots() {
        assert!(validate_relative_path("notes/out.txt").is_ok());
        assert!(validate_relative_path("file.json").is_ok());
        for bad in ["", "   ", "../x", "a/../../b", "/etc/passwd"] {
            assert!(
                matches!(
                    validate_relative_path(bad),
                    Err(SessionStoreError::UnsafePath { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn session_root_nests_under_config_dir() {
        assert_eq!(
            session_root(Path::new("/home/u/.config")),
            PathBuf::from("/home/u/.config/gemini-cli/sessions")
        );
        assert_eq!(session_file_name("work"), "work.json");
    }
}
