//! Per-origin store shared by every open view
//!
//! Holds the key-value map (optionally mirrored to a JSON file) and a broadcast
//! feed of changes. Each view gets its own [`StoreHandle`], and notifications
//! are only delivered to views other than the writer.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, info, warn};

use super::shared::{SharedStore, StorageEvent, StoreError};

/// Identifies who wrote a change so the writer does not hear its own echo
pub type WriterId = u64;

/// Writer id used for changes made by the host itself (e.g. clearing the store)
pub const HOST_WRITER: WriterId = 0;

const CHANGE_FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct ChangeBroadcast {
    writer: WriterId,
    event: StorageEvent,
}

#[derive(Debug)]
pub struct OriginStore {
    entries: Mutex<BTreeMap<String, String>>,
    path: Option<PathBuf>,
    next_writer: AtomicU64,
    change_tx: broadcast::Sender<ChangeBroadcast>,
}

impl OriginStore {
    /// Create a store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::with_entries(BTreeMap::new(), None)
    }

    /// Open a store persisted as a JSON object at `path`, starting empty if
    /// the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        info!("Opened origin store at {} ({} keys)", path.display(), entries.len());
        Ok(Self::with_entries(entries, Some(path)))
    }

    fn with_entries(entries: BTreeMap<String, String>, path: Option<PathBuf>) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            entries: Mutex::new(entries),
            path,
            next_writer: AtomicU64::new(HOST_WRITER + 1),
            change_tx,
        }
    }

    /// Hand out a store handle for a newly mounted view
    pub fn handle(self: &Arc<Self>) -> StoreHandle {
        let writer = self.next_writer.fetch_add(1, Ordering::Relaxed);
        debug!("Issued store handle for writer {}", writer);
        StoreHandle {
            writer,
            origin: Arc::clone(self),
        }
    }

    /// Subscribe to changes made by anyone except `writer`
    pub fn subscribe(&self, writer: WriterId) -> StorageSubscription {
        StorageSubscription {
            writer,
            rx: self.change_tx.subscribe(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of every stored key and value
    pub fn entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        self.lock().map(|entries| entries.clone())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    /// Write or delete `key` on behalf of `writer`.
    ///
    /// Writing the value already stored, or removing an absent key, changes
    /// nothing and notifies nobody.
    pub fn write(&self, writer: WriterId, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let snapshot = {
            let mut entries = self.lock()?;
            let current = entries.get(key).map(String::as_str);
            if current == value {
                debug!("Store write for '{}' left value unchanged", key);
                return Ok(());
            }

            match value {
                Some(v) => {
                    entries.insert(key.to_string(), v.to_string());
                }
                None => {
                    entries.remove(key);
                }
            }
            self.path.as_ref().map(|_| entries.clone())
        };

        let flushed = self.flush(snapshot);
        self.publish(writer, StorageEvent::changed(key, value.map(str::to_string)));
        flushed
    }

    /// Remove every key and notify all views except `writer`
    pub fn clear(&self, writer: WriterId) -> Result<(), StoreError> {
        let snapshot = {
            let mut entries = self.lock()?;
            entries.clear();
            self.path.as_ref().map(|_| BTreeMap::new())
        };

        info!("Origin store cleared");
        let flushed = self.flush(snapshot);
        self.publish(writer, StorageEvent::cleared());
        flushed
    }

    fn publish(&self, writer: WriterId, event: StorageEvent) {
        if let Err(e) = self.change_tx.send(ChangeBroadcast { writer, event }) {
            debug!("No views listening for store change: {}", e);
        }
    }

    fn flush(&self, snapshot: Option<BTreeMap<String, String>>) -> Result<(), StoreError> {
        let (Some(path), Some(entries)) = (self.path.as_ref(), snapshot) else {
            return Ok(());
        };

        let encoded = serde_json::to_string_pretty(&entries)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries.lock().map_err(|e| StoreError::Unavailable {
            reason: format!("store lock poisoned: {}", e),
        })
    }
}

/// One view's window onto the origin store
#[derive(Debug, Clone)]
pub struct StoreHandle {
    writer: WriterId,
    origin: Arc<OriginStore>,
}

impl StoreHandle {
    /// Subscribe to changes written by other views
    pub fn subscribe(&self) -> StorageSubscription {
        self.origin.subscribe(self.writer)
    }
}

impl SharedStore for StoreHandle {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.origin.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.origin.write(self.writer, key, Some(value))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.origin.write(self.writer, key, None)
    }
}

/// Receiver for changes made by other writers
#[derive(Debug)]
pub struct StorageSubscription {
    writer: WriterId,
    rx: broadcast::Receiver<ChangeBroadcast>,
}

impl StorageSubscription {
    /// Wait for the next foreign change; `None` once the store is gone
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.writer == self.writer => continue,
                Ok(change) => return Some(change.event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Writer {} missed {} store notifications", self.writer, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv)
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if change.writer == self.writer => continue,
                Ok(change) => return Some(change.event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Writer {} missed {} store notifications", self.writer, skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
