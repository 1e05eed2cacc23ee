//! Bearer credential and its persisted store.
//!
//! The repository never reads storage itself: callers load a [`Session`] from
//! the [`SessionStore`] once and pass it into every call.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Key under which the credential is stored.
pub const TOKEN_KEY: &str = "token";

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io error: {0}")]
    Io(#[from] io::Error),
    #[error("session store is corrupted: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON file of string keys, one of which holds the credential.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored session, if any.
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let entries = self.read()?;
        Ok(entries
            .get(TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
            .map(Session::new))
    }

    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        entries.insert(TOKEN_KEY.to_string(), session.token().to_string());
        self.write(&entries)
    }

    /// Forgets the credential, keeping any other stored keys.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.read()?;
        if entries.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write(&entries)
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn store() -> SessionStore {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_sessions");
        SessionStore::new(root.join(format!("session_{}.json", Uuid::new_v4())))
    }

    #[test]
    fn missing_file_means_no_session() {
        assert_eq!(store().load().unwrap(), None);
    }

    #[test]
    fn save_load_clear() {
        let store = store();
        store.save(&Session::new("abc")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Session::new("abc")));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"token\""));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn clear_keeps_other_keys() {
        let store = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"theme": "dark", "token": "abc"}"#).unwrap();

        store.clear().unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("theme"));
        assert!(!raw.contains("abc"));
        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn debug_does_not_leak_token() {
        let rendered = format!("{:?}", Session::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }
}
