use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity, ownership, and concurrency-control fields of a project schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub schedule_id: String,
    pub project_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Incremented on every successful mutation; the optimistic-concurrency
    /// guard checked by the scheduling service.
    pub version: u64,
}

impl ScheduleMetadata {
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        let project_id = project_id.into();
        let now = Utc::now();
        Self {
            schedule_id: format!("schedule-{project_id}"),
            project_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
        self.touch();
    }
}
