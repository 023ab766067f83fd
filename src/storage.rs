//! String-keyed durable slots.
//!
//! Every value is an opaque string; callers own the encoding. A write to a
//! key replaces the whole value or leaves the previous one untouched.

use std::{
    collections::HashMap,
    io,
    path::PathBuf,
    sync::Mutex,
};

use futures::future::{BoxFuture, FutureExt};
use tokio::fs;

pub trait KeyValueStorage: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, io::Result<Option<String>>>;

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, io::Result<()>>;

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, io::Result<()>>;
}

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key `{key}`"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, io::Result<Option<String>>> {
        async move {
            let path = self.path_for(key)?;
            match fs::read_to_string(&path).await {
                Ok(value) => {
                    tracing::debug!(path = %path.display(), bytes = value.len(), "read slot");
                    Ok(Some(value))
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        }
        .boxed()
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, io::Result<()>> {
        async move {
            let path = self.path_for(key)?;
            let tmp = path.with_extension("json.tmp");
            fs::create_dir_all(&self.dir).await?;
            let written = match fs::write(&tmp, value.as_bytes()).await {
                Ok(()) => fs::rename(&tmp, &path).await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                if let Err(cleanup) = fs::remove_file(&tmp).await {
                    if cleanup.kind() != io::ErrorKind::NotFound {
                        tracing::warn!(path = %tmp.display(), error = %cleanup, "could not remove temp file");
                    }
                }
                return Err(e);
            }
            tracing::debug!(path = %path.display(), bytes = value.len(), "wrote slot");
            Ok(())
        }
        .boxed()
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, io::Result<()>> {
        async move {
            let path = self.path_for(key)?;
            match fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e),
            }
        }
        .boxed()
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, io::Result<Option<String>>> {
        let value = self.slots().get(key).cloned();
        async move { Ok(value) }.boxed()
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, io::Result<()>> {
        self.slots().insert(key.to_owned(), value);
        async move { Ok(()) }.boxed()
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, io::Result<()>> {
        self.slots().remove(key);
        async move { Ok(()) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_storage_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("journalEntries").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_storage_overwrites_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set_item("journalEntries", "[1]".into()).await.unwrap();
        storage.set_item("journalEntries", "[2]".into()).await.unwrap();

        assert_eq!(
            storage.get_item("journalEntries").await.unwrap().as_deref(),
            Some("[2]")
        );
        let names: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["journalEntries.json".to_string()]);
    }

    #[tokio::test]
    async fn failed_rename_removes_the_temp_file() {
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join("journalEntries.json");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), "x").unwrap();
        let storage = FileStorage::new(dir.path());

        storage
            .set_item("journalEntries", "[1]".into())
            .await
            .unwrap_err();

        assert!(!dir.path().join("journalEntries.json.tmp").exists());
        assert!(blocked.join("keep").exists());
    }

    #[tokio::test]
    async fn file_storage_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        let err = storage.set_item("../escape", "x".into()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn remove_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.remove_item("themePreference").await.unwrap();

        let memory = MemoryStorage::new();
        memory.set_item("themePreference", "dark".into()).await.unwrap();
        memory.remove_item("themePreference").await.unwrap();
        assert_eq!(memory.get_item("themePreference").await.unwrap(), None);
    }
}
