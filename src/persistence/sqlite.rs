use super::{PersistenceError, PersistenceResult, ScheduleStore};
use crate::schedule::ScheduleRecord;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

/// SQLite-backed store. Records are stored whole as JSON, keyed by project
/// id, so schema migrations reduce to serde compatibility.
pub struct SqliteScheduleStore {
    connection: Mutex<Connection>,
}

impl SqliteScheduleStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS schedules (
                project_id TEXT PRIMARY KEY,
                schedule_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn save(&self, record: &ScheduleRecord) -> PersistenceResult<()> {
        let json = serde_json::to_string(record)?;
        let conn = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO schedules (project_id, schedule_json) VALUES (?1, ?2)",
            params![record.metadata.project_id, json],
        )?;
        Ok(())
    }

    fn load(&self, project_id: &str) -> PersistenceResult<Option<ScheduleRecord>> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite mutex poisoned".to_string()))?;
        let mut stmt =
            conn.prepare("SELECT schedule_json FROM schedules WHERE project_id = ?1")?;
        let json_opt: Option<String> = stmt
            .query_row(params![project_id], |row| row.get(0))
            .optional()?;

        let Some(json) = json_opt else {
            return Ok(None);
        };
        let record: ScheduleRecord = serde_json::from_str(&json)?;
        Ok(Some(record))
    }

    fn delete(&self, project_id: &str) -> PersistenceResult<bool> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite mutex poisoned".to_string()))?;
        let affected = conn.execute(
            "DELETE FROM schedules WHERE project_id = ?1",
            params![project_id],
        )?;
        Ok(affected > 0)
    }
}
