use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use super::SessionError;

/// Fixed key the bearer token lives under
pub const TOKEN_KEY: &str = "access_token";

/// Durable key-value storage for the bearer token.
///
/// Implementations must not cache: every `read` reflects the latest write,
/// including writes made by another process sharing the same storage.
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Result<Option<String>, SessionError>;
    fn write(&self, token: &str) -> Result<(), SessionError>;
    fn remove(&self) -> Result<(), SessionError>;
}

/// Token persisted in a JSON object on disk, next to the rest of the CLI config
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub const FILE_NAME: &'static str = "session.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, SessionError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SessionError::Corrupt(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(SessionError::Corrupt(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn save(&self, map: Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Result<Option<String>, SessionError> {
        let map = self.load()?;
        Ok(map
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }

    fn write(&self, token: &str) -> Result<(), SessionError> {
        let mut map = match self.load() {
            Err(SessionError::Corrupt(reason)) => {
                tracing::warn!("Overwriting unreadable session file: {}", reason);
                Map::new()
            }
            other => other?,
        };
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save(map)
    }

    fn remove(&self) -> Result<(), SessionError> {
        let mut map = match self.load() {
            Err(SessionError::Corrupt(reason)) => {
                tracing::warn!("Deleting unreadable session file: {}", reason);
                fs::remove_file(&self.path)?;
                return Ok(());
            }
            other => other?,
        };
        if map.remove(TOKEN_KEY).is_some() {
            self.save(map)?;
        }
        Ok(())
    }
}

/// In-process store, for tests and embedding callers
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A panic while holding the lock cannot leave the Option half-written
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Result<Option<String>, SessionError> {
        Ok(self.slot().clone())
    }

    fn write(&self, token: &str) -> Result<(), SessionError> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileTokenStore {
        let dir = std::env::temp_dir().join(format!(
            "trendwatch_store_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        FileTokenStore::in_dir(&dir)
    }

    #[test]
    fn file_store_round_trips_and_removes_key() {
        let store = temp_store();
        assert_eq!(store.read().unwrap(), None);

        store.write("abc.def.ghi").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("abc.def.ghi"));

        store.remove().unwrap();
        assert_eq!(store.read().unwrap(), None);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains(TOKEN_KEY));
    }

    #[test]
    fn file_store_keeps_unrelated_keys() {
        let store = temp_store();
        let mut map = Map::new();
        map.insert("theme".into(), Value::String("dark".into()));
        store.save(map).unwrap();

        store.write("token").unwrap();
        store.remove().unwrap();

        let map = store.load().unwrap();
        assert_eq!(map.get("theme").and_then(Value::as_str), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_replaced_on_write_and_deleted_on_remove() {
        let store = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.read(), Err(SessionError::Corrupt(_))));

        store.write("a.b.c").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("a.b.c"));

        fs::write(store.path(), "[1, 2]").unwrap();
        store.remove().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn memory_store_starts_empty() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.read().unwrap(), None);
        store.write("t").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("t"));
    }
}
