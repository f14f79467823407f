use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use synexis_core::ConversationHistory;

/// `$SYNEXIS_HOME`, or `~/.synexis`.
pub fn synexis_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SYNEXIS_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".synexis"))
}

pub fn ensure_synexis_home() -> Result<PathBuf> {
    let dir = synexis_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// The persisted conversation: a JSON array of messages with RFC 3339 timestamps.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(ensure_synexis_home()?.join("session.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable sessions come back empty rather than failing.
    pub fn load(&self) -> Result<ConversationHistory> {
        if !self.path.exists() {
            return Ok(ConversationHistory::new());
        }
        let s = fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        match serde_json::from_str::<ConversationHistory>(&s) {
            Ok(history) => {
                info!("resumed {} messages from {}", history.len(), self.path.display());
                Ok(history)
            }
            Err(e) => {
                warn!("ignoring unreadable session {}: {e}", self.path.display());
                Ok(ConversationHistory::new())
            }
        }
    }

    pub fn save(&self, history: &ConversationHistory) -> Result<()> {
        let json = serde_json::to_string_pretty(history).context("serialize session")?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synexis_core::ChatSession;
    use tempfile::tempdir;

    #[test]
    fn test_missing_session_is_empty() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_session_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::at(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_resume() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));

        let mut session = ChatSession::default();
        session.begin_turn("9 x 9");
        session.record_reply("81");
        store.save(session.history()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(&loaded, session.history());
        assert_eq!(loaded.messages()[1].content, "9 x 9");
        assert_eq!(loaded.last_number(), Some(81.0));
    }
}
