//! Persistence of completed analyses.
//!
//! [`HistoryGateway`] is the only owner of history state. It routes each
//! write to the database when the database reports itself ready, and to the
//! file-backed store otherwise. Recording is best-effort and never fails the
//! caller.

mod file;
mod sqlite;

pub use file::FileHistory;
pub use sqlite::SqliteHistory;

use crate::config::Config;
use crate::error::PersistenceError;
use crate::language::Language;
use crate::report::{normalize, to_legacy_explanation, CanonicalReport, NormalizeContext};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Reads from the database never return more than this many entries
pub const DATABASE_RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub original_code: String,
    pub language: Language,
    pub fixed_code: String,
    pub explanation: String,
    pub report: CanonicalReport,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(original_code: String, language: Language, report: CanonicalReport, model: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            fixed_code: report.corrected_code.clone(),
            explanation: to_legacy_explanation(&report),
            original_code,
            language,
            report,
            model,
            created_at: Utc::now(),
        }
    }

    /// Lenient decode of a stored entry. The report goes through the
    /// normalizer so older report shapes still load, and derived text fields
    /// are rebuilt when missing. `None` when the language or timestamp is
    /// unusable.
    pub fn from_stored(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        let language: Language = text("language")?.parse().ok()?;
        let created_at = DateTime::parse_from_rfc3339(&text("createdAt")?)
            .ok()?
            .with_timezone(&Utc);
        let report = normalize(
            obj.get("report").unwrap_or(&Value::Null),
            &NormalizeContext { language },
        );

        Some(Self {
            id: text("id")
                .and_then(|id| id.parse().ok())
                .unwrap_or_else(Uuid::new_v4),
            original_code: text("originalCode").unwrap_or_default(),
            fixed_code: text("fixedCode").unwrap_or_else(|| report.corrected_code.clone()),
            explanation: text("explanation").unwrap_or_else(|| to_legacy_explanation(&report)),
            model: text("model").unwrap_or_default(),
            language,
            report,
            created_at,
        })
    }
}

/// Database collaborator. `is_ready` may change at any time.
#[async_trait]
pub trait HistoryDatabase: Send + Sync {
    fn is_ready(&self) -> bool;
    async fn insert(&self, entry: &HistoryEntry) -> Result<(), PersistenceError>;
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, PersistenceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Database,
    File,
    Disabled,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Database => write!(f, "database"),
            Backend::File => write!(f, "file"),
            Backend::Disabled => write!(f, "disabled"),
        }
    }
}

pub struct HistoryGateway {
    enabled: bool,
    database: Option<Arc<dyn HistoryDatabase>>,
    file: FileHistory,
}

impl HistoryGateway {
    pub fn new(file: FileHistory, database: Option<Arc<dyn HistoryDatabase>>, enabled: bool) -> Self {
        Self {
            enabled,
            database,
            file,
        }
    }

    /// Build both backends from configuration. The file cache is loaded here.
    pub async fn open(config: &Config) -> Self {
        let history = &config.history;
        let file = FileHistory::open(history.file.clone(), history.max_entries).await;
        debug!("File history at {:?} (max {} entries)", file.path(), history.max_entries);
        let database = match (&history.database, config.database_enabled()) {
            (Some(path), true) => {
                let db: Arc<dyn HistoryDatabase> = Arc::new(SqliteHistory::open(path));
                Some(db)
            }
            _ => None,
        };
        Self::new(file, database, history.enabled)
    }

    fn ready_database(&self) -> Option<&Arc<dyn HistoryDatabase>> {
        self.database.as_ref().filter(|db| db.is_ready())
    }

    /// Backend the next write would go to.
    pub fn backend(&self) -> Backend {
        if !self.enabled {
            Backend::Disabled
        } else if self.ready_database().is_some() {
            Backend::Database
        } else {
            Backend::File
        }
    }

    /// Persist one entry. Failures are logged and swallowed.
    pub async fn record(&self, entry: HistoryEntry) {
        if !self.enabled {
            return;
        }
        let result = match self.ready_database() {
            Some(db) => db.insert(&entry).await,
            None => self.file.append(entry).await,
        };
        match result {
            Ok(()) => debug!("Recorded history entry"),
            Err(e) => warn!("Failed to record history: {}", e),
        }
    }

    /// Most recent entries, newest first, from whichever backend is active.
    pub async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, PersistenceError> {
        match self.ready_database() {
            Some(db) => db.recent(limit.min(DATABASE_RECENT_LIMIT)).await,
            None => Ok(self.file.recent(limit).await),
        }
    }

    pub async fn shutdown(&self) {
        self.file.shutdown().await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    pub fn entry(code: &str) -> HistoryEntry {
        let report = normalize(
            &json!({
                "analysis": "ok",
                "detectedProblems": [{ "type": "logic", "severity": "high", "message": "Off-by-one" }],
                "correctedCode": "fixed();"
            }),
            &NormalizeContext {
                language: Language::Javascript,
            },
        );
        HistoryEntry::new(
            code.to_string(),
            Language::Javascript,
            report,
            "gemini-1.5-flash".to_string(),
        )
    }

    #[test]
    fn test_entry_fields() {
        let e = entry("bug();");
        assert_eq!(e.fixed_code, "fixed();");
        assert!(e.explanation.contains("Off-by-one"));
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["language"], "javascript");
        assert!(value["originalCode"].is_string());
        assert!(value["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_file_backend_when_no_database() {
        let dir = TempDir::new().unwrap();
        let file = FileHistory::open(dir.path().join("h.json"), 50).await;
        let gateway = HistoryGateway::new(file, None, true);
        assert_eq!(gateway.backend(), Backend::File);

        gateway.record(entry("a")).await;
        gateway.record(entry("b")).await;
        let recent = gateway.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].original_code, "b");
        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_database_backend_and_runtime_flip() {
        let dir = TempDir::new().unwrap();
        let file = FileHistory::open(dir.path().join("h.json"), 50).await;
        let db = Arc::new(SqliteHistory::in_memory().unwrap());
        let gateway = HistoryGateway::new(file, Some(db.clone() as Arc<dyn HistoryDatabase>), true);

        assert_eq!(gateway.backend(), Backend::Database);
        gateway.record(entry("to-db")).await;
        assert_eq!(db.recent(10).await.unwrap().len(), 1);

        db.mark_unavailable();
        assert_eq!(gateway.backend(), Backend::File);
        gateway.record(entry("to-file")).await;

        let recent = gateway.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].original_code, "to-file");
        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_database_reads_are_capped() {
        let dir = TempDir::new().unwrap();
        let file = FileHistory::open(dir.path().join("h.json"), 50).await;
        let db: Arc<dyn HistoryDatabase> = Arc::new(SqliteHistory::in_memory().unwrap());
        let gateway = HistoryGateway::new(file, Some(db), true);
        for i in 0..15 {
            gateway.record(entry(&i.to_string())).await;
        }
        assert_eq!(gateway.recent(50).await.unwrap().len(), DATABASE_RECENT_LIMIT);
        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_disabled_records_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("h.json");
        let file = FileHistory::open(path.clone(), 50).await;
        let gateway = HistoryGateway::new(file, None, false);
        gateway.record(entry("x")).await;
        assert!(gateway.recent(10).await.unwrap().is_empty());
        assert!(!path.exists());
        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_record_swallows_write_failures() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let file = FileHistory::open(blocker.join("h.json"), 50).await;
        let gateway = HistoryGateway::new(file, None, true);
        gateway.record(entry("x")).await;

        let recent = gateway.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].original_code, "x");
        assert!(!blocker.join("h.json").exists());
        gateway.shutdown().await;
    }
}
