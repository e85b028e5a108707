use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::Result;

/// Raw key-value persistence. Errors surface here and are absorbed by
/// `DocumentStore`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn get_all(&self) -> Result<Map<String, Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Keys whose values were changed by another writer since the last call.
    async fn refresh(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<Map<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn get_all(&self) -> Result<Map<String, Value>> {
        Ok(self.entries.read().clone())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct FileState {
    /// What this process last saw on disk.
    seen: Map<String, Value>,
    /// External changes absorbed during our own writes, reported on refresh.
    unseen: BTreeSet<String>,
}

/// All records in one JSON object file.
///
/// Reads always go to disk so several processes can share the file. Writes
/// re-read the file, replace one key and rename a temp file over it.
pub struct FileBackend {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl FileBackend {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let seen = read_entries(&path).await?;
        tracing::debug!("Opened store at {:?} with {} keys", path, seen.len());

        Ok(Self {
            path,
            state: Mutex::new(FileState {
                seen,
                unseen: BTreeSet::new(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn rewrite(&self, key: &str, value: Option<Value>) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut entries = read_entries(&self.path).await?;

        let external = changed_keys(&state.seen, &entries);
        state
            .unseen
            .extend(external.into_iter().filter(|changed| changed != key));

        match value {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }

        write_entries(&self.path, &entries).await?;
        state.seen = entries;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = read_entries(&self.path).await?;
        Ok(entries.remove(key))
    }

    async fn get_all(&self) -> Result<Map<String, Value>> {
        read_entries(&self.path).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.rewrite(key, Some(value)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.rewrite(key, None).await
    }

    async fn refresh(&self) -> Result<Vec<String>> {
        let mut state = self.state.lock().await;
        let entries = read_entries(&self.path).await?;

        let mut changed: BTreeSet<String> = std::mem::take(&mut state.unseen);
        changed.extend(changed_keys(&state.seen, &entries));
        state.seen = entries;

        Ok(changed.into_iter().collect())
    }
}

async fn read_entries(path: &Path) -> Result<Map<String, Value>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(Map::new());
    }
    let contents = tokio::fs::read_to_string(path).await?;
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }
    Ok(serde_json::from_str(&contents)?)
}

async fn write_entries(path: &Path, entries: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string_pretty(entries)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

fn changed_keys(before: &Map<String, Value>, after: &Map<String, Value>) -> BTreeSet<String> {
    before
        .keys()
        .chain(after.keys())
        .filter(|key| before.get(*key) != after.get(*key))
        .cloned()
        .collect()
}
