//! File-backed key/value storage for the session entry.
//!
//! The file is a flat JSON object of string values, the same shape browser
//! local storage exposes. Only [`SESSION_KEY`] is ever written here.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hsepartner_auth::{AuthUser, SESSION_KEY, SessionError, SessionStore};

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Option<BTreeMap<String, String>>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SessionError::Storage(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SessionError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    /// Current entries, starting over if the file is unreadable as JSON.
    fn entries_for_write(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match self.read_entries() {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(SessionError::Corrupt(reason)) => {
                tracing::warn!(%reason, "overwriting corrupt storage file");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                SessionError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| {
            SessionError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<AuthUser>, SessionError> {
        let Some(entries) = self.read_entries()? else {
            return Ok(None);
        };
        entries
            .get(SESSION_KEY)
            .map(|raw| serde_json::from_str(raw).map_err(|e| SessionError::Corrupt(e.to_string())))
            .transpose()
    }

    fn save(&mut self, user: &AuthUser) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        let mut entries = self.entries_for_write()?;
        entries.insert(SESSION_KEY.to_string(), raw);
        self.write_entries(&entries)
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        let mut entries = match self.read_entries() {
            Ok(Some(entries)) => entries,
            Ok(None) => return Ok(()),
            Err(SessionError::Corrupt(_)) => BTreeMap::new(),
            Err(err) => return Err(err),
        };
        entries.remove(SESSION_KEY);
        self.write_entries(&entries)
    }
}
