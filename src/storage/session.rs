use std::path::{Path, PathBuf};
use std::sync::RwLock;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use crate::error::Result;

/// Where the admin token lives. Presence of a token is the only signal of
/// being logged in; nothing here checks expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;

    async fn set_token(&self, token: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: RwLock::new(Some(token.into())) }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        read(&self.token)
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        write(&self.token, Some(token.to_string()));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        write(&self.token, None);
        Ok(())
    }
}

/// A small JSON key/value file, the on-disk equivalent of browser local
/// storage. The token sits under `key`; other keys are left untouched.
pub struct FileSessionStore {
    path: PathBuf,
    key: String,
    token: RwLock<Option<String>>,
}

impl FileSessionStore {
    pub async fn open(path: impl Into<PathBuf>, key: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let key = key.into();
        let entries = load_entries(&path).await?;
        let token = entries
            .get(&key)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        debug!(
            path = ?path,
            key = %key,
            has_token = token.is_some(),
            "Opened session store"
        );

        Ok(Self { path, key, token: RwLock::new(token) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, token: Option<&str>) -> Result<()> {
        let mut entries = load_entries(&self.path).await?;
        match token {
            Some(token) => {
                entries.insert(self.key.clone(), Value::String(token.to_string()));
            }
            None => {
                entries.remove(&self.key);
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&Value::Object(entries))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        read(&self.token)
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        self.persist(Some(token)).await?;
        write(&self.token, Some(token.to_string()));
        info!(path = ?self.path, "Session token stored");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.persist(None).await?;
        write(&self.token, None);
        info!(path = ?self.path, "Session cleared");
        Ok(())
    }
}

async fn load_entries(path: &Path) -> Result<Map<String, Value>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(entries)) => Ok(entries),
        Ok(_) | Err(_) => {
            warn!(path = ?path, "Session file is not a JSON object, starting empty");
            Ok(Map::new())
        }
    }
}

// A poisoned lock still holds a usable Option<String>.
fn read(lock: &RwLock<Option<String>>) -> Option<String> {
    match lock.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write(lock: &RwLock<Option<String>>, value: Option<String>) {
    match lock.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_set_and_clear() {
        let store = MemorySessionStore::new();
        assert!(!store.is_authenticated());

        store.set_token("abc").await.unwrap();
        assert_eq!(store.token().as_deref(), Some("abc"));

        store.clear().await.unwrap();
        assert_eq!(store.token(), None);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileSessionStore::open(&path, "adminToken").await.unwrap();
        assert!(!store.is_authenticated());
        store.set_token("secret").await.unwrap();

        let reopened = FileSessionStore::open(&path, "adminToken").await.unwrap();
        assert_eq!(reopened.token().as_deref(), Some("secret"));

        reopened.clear().await.unwrap();
        let reopened = FileSessionStore::open(&path, "adminToken").await.unwrap();
        assert!(!reopened.is_authenticated());
    }

    #[tokio::test]
    async fn file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, br#"{"theme":"dark"}"#).await.unwrap();

        let store = FileSessionStore::open(&path, "adminToken").await.unwrap();
        store.set_token("t").await.unwrap();
        store.clear().await.unwrap();

        let raw: Value = serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"theme": "dark"}));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"[1,2,3]").await.unwrap();

        let store = FileSessionStore::open(&path, "adminToken").await.unwrap();
        assert_eq!(store.token(), None);
    }
}
