use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use conversation::History;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::codec::{decode_session, encode_session, LoadedSession};
use crate::error::SessionStoreError;
use crate::paths::{session_file_name, session_root, validate_session_name, SESSION_EXTENSION};

/// Write `history` and the system instruction to `path`.
pub fn save_to_path(
    path: &Path,
    history: &History,
    system: Option<&str>,
) -> Result<(), SessionStoreError> {
    let bytes = encode_session(history, system)?;
    fs::write(path, bytes).map_err(|source| SessionStoreError::io("writing session file", path, source))?;
    tracing::debug!(path = %path.display(), turns = history.len(), "saved session");
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<LoadedSession, SessionStoreError> {
    let bytes =
        fs::read(path).map_err(|source| SessionStoreError::io("reading session file", path, source))?;
    let loaded = decode_session(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        turns = loaded.history.len(),
        skipped = loaded.skipped.len(),
        "loaded session"
    );
    Ok(loaded)
}

/// One named session in the session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub name: String,
    /// Last modification time, RFC3339 in UTC.
    pub modified: Option<String>,
}

/// Named sessions stored as `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted under the user's config directory, when one is known.
    pub fn under_config_dir(config_dir: Option<&Path>) -> Result<Self, SessionStoreError> {
        config_dir
            .map(|dir| Self::new(session_root(dir)))
            .ok_or(SessionStoreError::NoSessionRoot)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, SessionStoreError> {
        validate_session_name(name)?;
        Ok(self.root.join(session_file_name(name)))
    }

    pub fn save(
        &self,
        name: &str,
        history: &History,
        system: Option<&str>,
    ) -> Result<PathBuf, SessionStoreError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.root)
            .map_err(|source| SessionStoreError::io("creating session directory", &self.root, source))?;
        save_to_path(&path, history, system)?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<LoadedSession, SessionStoreError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(SessionStoreError::SessionNotFound {
                name: name.to_string(),
            });
        }
        load_from_path(&path)
    }

    pub fn delete(&self, name: &str) -> Result<(), SessionStoreError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Err(SessionStoreError::SessionNotFound {
                name: name.to_string(),
            }),
            Err(source) => Err(SessionStoreError::io("deleting session file", path, source)),
        }
    }

    /// Sessions sorted by name. A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<SessionSummary>, SessionStoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SessionStoreError::io("listing session directory", &self.root, source))
            }
        };

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|source| SessionStoreError::io("listing session directory", &self.root, source))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SESSION_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_session_name(name).is_err() {
                continue;
            }

            let modified = match entry.metadata().and_then(|metadata| metadata.modified()) {
                Ok(time) => Some(format_timestamp(time)?),
                Err(_) => None,
            };
            sessions.push(SessionSummary {
                name: name.to_string(),
                modified,
            });
        }

        sessions.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(sessions)
    }
}

fn format_timestamp(time: SystemTime) -> Result<String, SessionStoreError> {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .map_err(SessionStoreError::TimestampFormat)
}
