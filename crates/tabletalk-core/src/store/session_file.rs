use std::fs;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversation::ConversationStore;
use crate::error::CoreError;

const SESSION_FILE: &str = "session.json";

/// Identifier of a conversation session. UUID v4 hex, no dashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session state persisted between CLI invocations, stored as JSON at
/// `<state_dir>/session.json`. Datasets are kept as source paths and re-read
/// on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionFile {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub conversation: ConversationStore,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub datasets: Vec<PathBuf>,
    /// Index of the first turn the agent still remembers.
    #[serde(default)]
    pub memory_start: usize,
}

impl SessionFile {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            conversation: ConversationStore::new(),
            datasets: Vec::new(),
            memory_start: 0,
        }
    }

    fn session_path(state_dir: &Path) -> PathBuf {
        state_dir.join(SESSION_FILE)
    }

    /// Save to disk with an exclusive file lock, creating `state_dir` if
    /// needed.
    pub fn save(&self, state_dir: &Path) -> Result<(), CoreError> {
        fs::create_dir_all(state_dir)?;
        let path = Self::session_path(state_dir);
        let json = serde_json::to_string_pretty(self)?;
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        fs2::FileExt::lock_exclusive(&file).map_err(CoreError::Io)?;
        (&file).write_all(json.as_bytes())?;
        fs2::FileExt::unlock(&file).map_err(CoreError::Io)?;
        tracing::debug!(path = %path.display(), "Saved session");
        Ok(())
    }

    /// Load the session under a shared lock. A missing file is `Ok(None)`;
    /// a corrupt one is an error.
    pub fn load(state_dir: &Path) -> Result<Option<Self>, CoreError> {
        let path = Self::session_path(state_dir);
        let file = match fs::OpenOptions::new().read(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        fs2::FileExt::lock_shared(&file).map_err(CoreError::Io)?;
        let mut data = String::new();
        let read = (&file).read_to_string(&mut data);
        fs2::FileExt::unlock(&file).ok();
        read?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// Load the session, or start a fresh one if none is stored.
    pub fn load_or_new(state_dir: &Path) -> Result<Self, CoreError> {
        Ok(Self::load(state_dir)?.unwrap_or_default())
    }

    /// Remove the session file.
    pub fn cleanup(state_dir: &Path) {
        let path = Self::session_path(state_dir);
        let _ = fs::remove_file(path);
    }
}

impl Default for SessionFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;
    use tempfile::TempDir;

    #[test]
    fn test_session_id_generation() {
        let id = SessionId::new();
        assert_eq!(id.as_str().len(), 32);
        assert_eq!(id.short().len(), 8);
        assert_eq!(SessionId("abc".into()).short(), "abc");
    }

    #[test]
    fn test_session_save_load_cleanup() {
        let tmp = TempDir::new().unwrap();
        let state_dir = tmp.path().join("state");

        assert!(SessionFile::load(&state_dir).unwrap().is_none());

        let mut session = SessionFile::new();
        session
            .conversation
            .push("What is the total?", Answer::text("The total is 295."));
        session.datasets.push(PathBuf::from("data/sales.csv"));
        session.save(&state_dir).unwrap();

        let loaded = SessionFile::load(&state_dir).unwrap().unwrap();
        assert_eq!(loaded, session);

        SessionFile::cleanup(&state_dir);
        assert!(SessionFile::load(&state_dir).unwrap().is_none());
        let fresh = SessionFile::load_or_new(&state_dir).unwrap();
        assert!(fresh.conversation.is_empty());
        assert_ne!(fresh.id, session.id);
    }

    #[test]
    fn test_corrupt_session_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SESSION_FILE), "{not json").unwrap();
        let err = SessionFile::load(tmp.path()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSession(_)));
    }
}
