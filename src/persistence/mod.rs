pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::schedule::ScheduleRecord;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

pub use file::FileScheduleStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteScheduleStore;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(serde_json::Error),
    Io(std::io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage boundary for schedule snapshots, keyed by project id. One schedule
/// per project; `save` overwrites any existing snapshot.
pub trait ScheduleStore: Send + Sync {
    fn save(&self, record: &ScheduleRecord) -> PersistenceResult<()>;
    fn load(&self, project_id: &str) -> PersistenceResult<Option<ScheduleRecord>>;
    fn delete(&self, project_id: &str) -> PersistenceResult<bool>;
}

/// HashMap-backed store for tests and ephemeral use.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    records: Mutex<HashMap<String, ScheduleRecord>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn save(&self, record: &ScheduleRecord) -> PersistenceResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistenceError::InvalidData("store mutex poisoned".to_string()))?;
        records.insert(record.metadata.project_id.clone(), record.clone());
        Ok(())
    }

    fn load(&self, project_id: &str) -> PersistenceResult<Option<ScheduleRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| PersistenceError::InvalidData("store mutex poisoned".to_string()))?;
        Ok(records.get(project_id).cloned())
    }

    fn delete(&self, project_id: &str) -> PersistenceResult<bool> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistenceError::InvalidData("store mutex poisoned".to_string()))?;
        Ok(records.remove(project_id).is_some())
    }
}
