use super::{HistoryDatabase, HistoryEntry};
use crate::error::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS history (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    language TEXT NOT NULL,
    model TEXT NOT NULL,
    original_code TEXT NOT NULL,
    fixed_code TEXT NOT NULL,
    explanation TEXT NOT NULL,
    report TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS history_created_at ON history (created_at);";

/// SQLite-backed history. Every entry is an independent row.
///
/// `ready` is the "database reachable" signal: false when the database could
/// not be opened, and flipped to false when an operation fails.
pub struct SqliteHistory {
    conn: Arc<Mutex<Option<Connection>>>,
    ready: Arc<AtomicBool>,
}

impl SqliteHistory {
    pub fn open(path: &Path) -> Self {
        let conn = match connect(path) {
            Ok(conn) => {
                info!("History database ready at {:?}", path);
                Some(conn)
            }
            Err(e) => {
                warn!("History database unavailable ({}); using file history", e);
                None
            }
        };
        let ready = conn.is_some();
        Self {
            conn: Arc::new(Mutex::new(conn)),
            ready: Arc::new(AtomicBool::new(ready)),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            ready: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Mark the database as lost; later writes go to the file store.
    pub fn mark_unavailable(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, PersistenceError> + Send + 'static,
    {
        let conn = self.conn.clone();
        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(|e| e.into_inner());
            match guard.as_ref() {
                Some(conn) => op(conn),
                None => Err(PersistenceError::NotConnected),
            }
        })
        .await?;

        if let Err(e) = &result {
            warn!("History database operation failed: {}", e);
            self.mark_unavailable();
        }
        result
    }
}

fn connect(path: &Path) -> Result<Connection, PersistenceError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(PersistenceError::CreateDir)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

struct Row {
    id: String,
    created_at: String,
    language: String,
    model: String,
    original_code: String,
    fixed_code: String,
    explanation: String,
    report: String,
}

impl Row {
    fn into_entry(self) -> Option<HistoryEntry> {
        Some(HistoryEntry {
            id: self.id.parse().ok()?,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .ok()?
                .with_timezone(&Utc),
            language: self.language.parse().ok()?,
            model: self.model,
            original_code: self.original_code,
            fixed_code: self.fixed_code,
            explanation: self.explanation,
            report: serde_json::from_str(&self.report).ok()?,
        })
    }
}

#[async_trait]
impl HistoryDatabase for SqliteHistory {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn insert(&self, entry: &HistoryEntry) -> Result<(), PersistenceError> {
        let report = serde_json::to_string(&entry.report)?;
        let entry = entry.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO history
                 (id, created_at, language, model, original_code, fixed_code, explanation, report)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    entry.id.to_string(),
                    entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                    entry.language.as_str(),
                    entry.model,
                    entry.original_code,
                    entry.fixed_code,
                    entry.explanation,
                    report,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, PersistenceError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, created_at, language, model, original_code, fixed_code, explanation, report
                     FROM history ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                )?;
                let rows = stmt
                    .query_map(params![limit], |r| {
                        Ok(Row {
                            id: r.get(0)?,
                            created_at: r.get(1)?,
                            language: r.get(2)?,
                            model: r.get(3)?,
                            original_code: r.get(4)?,
                            fixed_code: r.get(5)?,
                            explanation: r.get(6)?,
                            report: r.get(7)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        Ok(rows.into_iter().filter_map(Row::into_entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::entry;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_recent_newest_first() {
        let db = SqliteHistory::in_memory().unwrap();
        assert!(db.is_ready());

        for i in 0..12 {
            let mut e = entry(&format!("code {i}"));
            e.created_at = Utc::now() + chrono::Duration::seconds(i);
            db.insert(&e).await.unwrap();
        }

        let recent = db.recent(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].original_code, "code 11");
        assert_eq!(recent[9].original_code, "code 2");
        assert_eq!(recent[0].report.problems.len(), 1);
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = TempDir::new().unwrap();
        let db = SqliteHistory::open(&dir.path().join("db").join("history.sqlite"));
        assert!(db.is_ready());
        db.insert(&entry("x")).await.unwrap();
        assert_eq!(db.recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unopenable_database_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let db = SqliteHistory::open(&blocker.join("history.sqlite"));
        assert!(!db.is_ready());
        let err = db.insert(&entry("x")).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotConnected));
    }

    #[tokio::test]
    async fn test_failure_flips_readiness() {
        let db = SqliteHistory::in_memory().unwrap();
        let e = entry("dup");
        db.insert(&e).await.unwrap();
        assert!(db.insert(&e).await.is_err());
        assert!(!db.is_ready());
    }
}
