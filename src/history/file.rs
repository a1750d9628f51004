//! File-backed history: an in-memory cache mirrored to one JSON file.
//!
//! A single writer task owns all file access and consumes write requests
//! from an ordered channel, one at a time. Each write appends to the cache,
//! trims it to the newest `max_entries`, and replaces the file with the full
//! trimmed cache (temp file + rename).
//!
//! Items in the file that no longer decode as entries are carried through
//! verbatim, so rewriting the file only ever drops the oldest items.

use super::HistoryEntry;
use crate::error::PersistenceError;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum StoredEntry {
    Entry(HistoryEntry),
    Raw(Value),
}

type Cache = Arc<RwLock<Vec<StoredEntry>>>;

enum Command {
    Write {
        entry: HistoryEntry,
        done: oneshot::Sender<Result<(), PersistenceError>>,
    },
    Shutdown,
}

pub struct FileHistory {
    path: PathBuf,
    cache: Cache,
    tx: mpsc::UnboundedSender<Command>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl FileHistory {
    /// Load `path` into the cache (missing or corrupt ⇒ empty) and start the writer.
    pub async fn open(path: PathBuf, max_entries: usize) -> Self {
        let entries = load_entries(&path).await;
        debug!("Loaded {} history entries from {:?}", entries.len(), path);
        let cache: Cache = Arc::new(RwLock::new(entries));

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(path.clone(), cache.clone(), max_entries, rx));

        Self {
            path,
            cache,
            tx,
            writer: Mutex::new(Some(writer)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a write and wait for it (and every write queued before it) to finish.
    pub async fn append(&self, entry: HistoryEntry) -> Result<(), PersistenceError> {
        let (done, wait) = oneshot::channel();
        self.tx
            .send(Command::Write { entry, done })
            .map_err(|_| PersistenceError::WriterClosed)?;
        wait.await.map_err(|_| PersistenceError::WriterClosed)?
    }

    /// Newest first. Verbatim items are skipped.
    pub async fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.cache
            .read()
            .await
            .iter()
            .rev()
            .filter_map(|stored| match stored {
                StoredEntry::Entry(entry) => Some(entry.clone()),
                StoredEntry::Raw(_) => None,
            })
            .take(limit)
            .collect()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Drain queued writes and stop the writer task.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
        let handle = self
            .writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("History writer ended abnormally: {}", e);
            }
        }
    }
}

async fn run_writer(
    path: PathBuf,
    cache: Cache,
    max_entries: usize,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Write { entry, done } => {
                let result = write_entry(&path, &cache, max_entries, entry).await;
                if let Err(e) = &result {
                    warn!("Failed to persist history to {:?}: {}", path, e);
                }
                let _ = done.send(result);
            }
            Command::Shutdown => break,
        }
    }
    debug!("History writer for {:?} stopped", path);
}

async fn write_entry(
    path: &Path,
    cache: &Cache,
    max_entries: usize,
    entry: HistoryEntry,
) -> Result<(), PersistenceError> {
    let snapshot = {
        let mut cache = cache.write().await;
        cache.push(StoredEntry::Entry(entry));
        let excess = cache.len().saturating_sub(max_entries);
        cache.drain(..excess);
        cache.clone()
    };

    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(PersistenceError::CreateDir)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, json)
        .await
        .map_err(PersistenceError::WriteFile)?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(PersistenceError::WriteFile)?;
    Ok(())
}

async fn load_entries(path: &Path) -> Vec<StoredEntry> {
    let Ok(content) = tokio::fs::read_to_string(path).await else {
        return Vec::new();
    };
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&content) else {
        warn!("History file {:?} is not a JSON array; starting empty", path);
        return Vec::new();
    };
    items
        .into_iter()
        .map(|item| match HistoryEntry::from_stored(&item) {
            Some(entry) => StoredEntry::Entry(entry),
            None => {
                debug!("Keeping unreadable history item as-is");
                StoredEntry::Raw(item)
            }
        })
        .collect()
}
