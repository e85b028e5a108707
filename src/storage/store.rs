use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::backend::{FileBackend, MemoryBackend, StorageBackend};
use crate::document_model::{DocumentRecord, OPTIONS_KEY, Options};
use crate::error::Result;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Keys touched by one write, delivered to every subscriber including the
/// writer itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreChange {
    pub changed_keys: HashSet<String>,
}

impl StoreChange {
    pub fn single(key: &str) -> Self {
        Self {
            changed_keys: HashSet::from([key.to_string()]),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.changed_keys.contains(key)
    }
}

/// Receiving end of store change notifications. Dropping it unsubscribes.
pub struct ChangeSubscription {
    receiver: broadcast::Receiver<StoreChange>,
}

impl ChangeSubscription {
    /// Next change, or `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StoreChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Change subscriber lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Aborts the external change watcher when dropped.
pub struct StoreWatcher {
    handle: JoinHandle<()>,
}

impl Drop for StoreWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Best-effort record store shared by every session and the list view.
///
/// Backend failures are logged and swallowed: loads fall back to the
/// supplied defaults, saves and clears resolve as if they had succeeded.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
    changes: broadcast::Sender<StoreChange>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { backend, changes }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub async fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        let backend = FileBackend::open(path).await?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// The stored record for `key` with `defaults` filling missing fields.
    /// Nothing is written when the key is absent.
    pub async fn load(&self, key: &str, defaults: Map<String, Value>) -> Map<String, Value> {
        match self.backend.get(key).await {
            Ok(Some(Value::Object(stored))) => {
                let mut merged = defaults;
                merged.extend(stored);
                merged
            }
            Ok(Some(other)) => {
                tracing::warn!("Ignoring non-object record under {:?}: {}", key, other);
                defaults
            }
            Ok(None) => defaults,
            Err(e) => {
                tracing::warn!("Failed to load {:?}: {}", key, e);
                defaults
            }
        }
    }

    /// Replace the record under `key` and notify subscribers.
    pub async fn save(&self, key: &str, record: Map<String, Value>) {
        match self.backend.set(key, Value::Object(record)).await {
            Ok(()) => {
                tracing::debug!("Saved {:?}", key);
                self.notify(StoreChange::single(key));
            }
            Err(e) => tracing::warn!("Failed to save {:?}: {}", key, e),
        }
    }

    pub async fn clear(&self, key: &str) {
        match self.backend.remove(key).await {
            Ok(()) => {
                tracing::debug!("Cleared {:?}", key);
                self.notify(StoreChange::single(key));
            }
            Err(e) => tracing::warn!("Failed to clear {:?}: {}", key, e),
        }
    }

    /// Every stored key and value.
    pub async fn load_all(&self) -> Map<String, Value> {
        self.backend.get_all().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to list records: {}", e);
            Map::new()
        })
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            receiver: self.changes.subscribe(),
        }
    }

    /// Poll the backend for writes made by other processes and broadcast them.
    pub fn watch(&self, interval: Duration) -> StoreWatcher {
        let backend = Arc::clone(&self.backend);
        let changes = self.changes.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match backend.refresh().await {
                    Ok(keys) if !keys.is_empty() => {
                        tracing::debug!("External changes to {:?}", keys);
                        let _ = changes.send(StoreChange {
                            changed_keys: keys.into_iter().collect(),
                        });
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to refresh store: {}", e),
                }
            }
        });

        StoreWatcher { handle }
    }

    pub async fn load_options(&self) -> Options {
        let map = self.load(OPTIONS_KEY, Options::defaults_map()).await;
        Options::from_map(&map)
    }

    /// Saves options on top of the stored record so unknown fields survive.
    pub async fn save_options(&self, options: &Options) {
        let mut record = self.load(OPTIONS_KEY, Map::new()).await;
        record.extend(options.to_map());
        self.save(OPTIONS_KEY, record).await;
    }

    pub async fn load_document(&self, id: &str) -> Option<DocumentRecord> {
        let map = self.load(id, Map::new()).await;
        DocumentRecord::from_map(&map)
    }

    fn notify(&self, change: StoreChange) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.changes.send(change);
    }
}
