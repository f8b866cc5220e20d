use crate::activity::Activity;
use crate::calculations::CriticalPathAnalysis;
use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::conflict::ScheduleConflict;
use crate::graph::NetworkError;
use crate::persistence::{PersistenceError, ScheduleStore};
use crate::schedule::{ProjectSchedule, ScheduleDataError, ScheduleRecord};
use crate::validation;
use chrono::NaiveDate;
use polars::prelude::PolarsError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Failure raised by an [`ActivityProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Source of a project's activity list at schedule-creation time, typically
/// backed by the surrounding application's project store.
pub trait ActivityProvider: Send + Sync {
    fn activities_for_project(&self, project_id: &str) -> Result<Vec<Activity>, ProviderError>;
}

/// Fixed activity lists keyed by project id, for tests and seeding.
#[derive(Default)]
pub struct InMemoryActivityProvider {
    projects: Mutex<HashMap<String, Vec<Activity>>>,
}

impl InMemoryActivityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&self, project_id: impl Into<String>, activities: Vec<Activity>) {
        let mut projects = self.projects.lock().expect("provider mutex poisoned");
        projects.insert(project_id.into(), activities);
    }
}

impl ActivityProvider for InMemoryActivityProvider {
    fn activities_for_project(&self, project_id: &str) -> Result<Vec<Activity>, ProviderError> {
        let projects = self.projects.lock().expect("provider mutex poisoned");
        Ok(projects.get(project_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug)]
pub enum ScheduleError {
    ScheduleNotFound(String),
    ScheduleAlreadyExists(String),
    ActivityNotFound {
        project_id: String,
        activity_id: i32,
    },
    /// Optimistic-concurrency failure: the caller's version no longer matches
    /// the stored schedule. Nothing was written.
    VersionConflict {
        expected: u64,
        actual: u64,
    },
    InvalidActivity(String),
    Network(NetworkError),
    Provider(ProviderError),
    Persistence(PersistenceError),
    Data(PolarsError),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::ScheduleNotFound(project_id) => {
                write!(f, "no schedule exists for project '{project_id}'")
            }
            ScheduleError::ScheduleAlreadyExists(project_id) => {
                write!(f, "a schedule already exists for project '{project_id}'")
            }
            ScheduleError::ActivityNotFound {
                project_id,
                activity_id,
            } => write!(
                f,
                "activity {activity_id} not found in schedule for project '{project_id}'"
            ),
            ScheduleError::VersionConflict { expected, actual } => write!(
                f,
                "schedule version conflict: expected {expected}, found {actual}"
            ),
            ScheduleError::InvalidActivity(msg) => write!(f, "invalid activity: {msg}"),
            ScheduleError::Network(err) => write!(f, "schedule network error: {err}"),
            ScheduleError::Provider(err) => write!(f, "activity provider error: {err}"),
            ScheduleError::Persistence(err) => write!(f, "persistence error: {err}"),
            ScheduleError::Data(err) => write!(f, "schedule data error: {err}"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<ProviderError> for ScheduleError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<PersistenceError> for ScheduleError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<PolarsError> for ScheduleError {
    fn from(value: PolarsError) -> Self {
        Self::Data(value)
    }
}

impl From<NetworkError> for ScheduleError {
    fn from(value: NetworkError) -> Self {
        Self::Network(value)
    }
}

impl From<ScheduleDataError> for ScheduleError {
    fn from(value: ScheduleDataError) -> Self {
        match value {
            ScheduleDataError::Activity(err) => Self::InvalidActivity(err.to_string()),
            ScheduleDataError::Network(err) => Self::Network(err),
            ScheduleDataError::Frame(err) => Self::Data(err),
        }
    }
}

/// Options for creating a schedule; defaults give the project id as the name
/// and a Monday-through-Friday calendar.
#[derive(Debug, Clone, Default)]
pub struct CreateScheduleOptions {
    pub name: Option<String>,
    pub calendar: Option<WorkCalendarConfig>,
}

/// Partial update for schedule-level fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdate {
    pub name: Option<String>,
    pub calendar: Option<WorkCalendarConfig>,
}

/// The application-facing scheduling surface. Orchestrates the activity
/// provider, the CPM engine, and the persistence store.
///
/// Every mutating operation takes the caller's expected schedule version and
/// fails with [`ScheduleError::VersionConflict`] before writing anything when
/// it is stale. Successful mutations bump the version by one.
pub struct SchedulingService<P: ActivityProvider, S: ScheduleStore> {
    provider: P,
    store: S,
}

impl<P: ActivityProvider, S: ScheduleStore> SchedulingService<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Self { provider, store }
    }

    /// Builds a schedule from the provider's activity list for the project,
    /// runs a full analysis, and persists the result at version 1.
    pub fn create_schedule(
        &self,
        project_id: &str,
        options: CreateScheduleOptions,
    ) -> Result<ScheduleRecord, ScheduleError> {
        if self.store.load(project_id)?.is_some() {
            return Err(ScheduleError::ScheduleAlreadyExists(project_id.to_string()));
        }

        let activities = self.provider.activities_for_project(project_id)?;
        let name = options.name.unwrap_or_else(|| project_id.to_string());
        let calendar = options
            .calendar
            .map(|config| WorkCalendar::from_config(&config))
            .unwrap_or_else(WorkCalendar::standard);

        let mut schedule =
            ProjectSchedule::from_activities(project_id, name, activities, calendar)?;
        schedule.refresh()?;

        let record = schedule.to_record()?;
        self.store.save(&record)?;
        Ok(record)
    }

    pub fn get_schedule(&self, project_id: &str) -> Result<Option<ScheduleRecord>, ScheduleError> {
        Ok(self.store.load(project_id)?)
    }

    /// Updates schedule-level fields without recomputing the critical path.
    pub fn update_schedule(
        &self,
        project_id: &str,
        expected_version: u64,
        update: ScheduleUpdate,
    ) -> Result<ScheduleRecord, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        if let Some(name) = update.name {
            schedule.set_name(name);
        }
        if let Some(config) = update.calendar {
            schedule.set_calendar_from_config(&config);
        }
        self.commit(schedule)
    }

    pub fn delete_schedule(&self, project_id: &str) -> Result<bool, ScheduleError> {
        Ok(self.store.delete(project_id)?)
    }

    /// Adds a new activity to the schedule and recomputes the analysis.
    pub fn schedule_activity(
        &self,
        project_id: &str,
        expected_version: u64,
        activity: Activity,
    ) -> Result<ScheduleRecord, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        schedule.insert_activity(activity)?;
        schedule.refresh()?;
        self.commit(schedule)
    }

    /// Moves an activity to explicit new planned dates and recomputes.
    pub fn update_activity_schedule(
        &self,
        project_id: &str,
        expected_version: u64,
        activity_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleRecord, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        if !schedule.set_activity_dates(activity_id, start, end)? {
            return Err(ScheduleError::ActivityNotFound {
                project_id: project_id.to_string(),
                activity_id,
            });
        }
        schedule.refresh()?;
        self.commit(schedule)
    }

    /// Shifts an activity to a new start date, preserving its duration.
    pub fn reschedule_activity(
        &self,
        project_id: &str,
        expected_version: u64,
        activity_id: i32,
        new_start: NaiveDate,
    ) -> Result<ScheduleRecord, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        let Some(activity) = schedule.find_activity(activity_id)? else {
            return Err(ScheduleError::ActivityNotFound {
                project_id: project_id.to_string(),
                activity_id,
            });
        };
        let new_end = new_start + (activity.end - activity.start);
        schedule.set_activity_dates(activity_id, new_start, new_end)?;
        schedule.refresh()?;
        self.commit(schedule)
    }

    /// Removes an activity; dependency references to it are stripped from the
    /// remaining activities.
    pub fn remove_activity(
        &self,
        project_id: &str,
        expected_version: u64,
        activity_id: i32,
    ) -> Result<ScheduleRecord, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        if !schedule.remove_activity(activity_id)? {
            return Err(ScheduleError::ActivityNotFound {
                project_id: project_id.to_string(),
                activity_id,
            });
        }
        schedule.refresh()?;
        self.commit(schedule)
    }

    /// Adds a finish-to-start dependency. Idempotent: re-adding an existing
    /// edge returns the current record without bumping the version.
    pub fn add_dependency(
        &self,
        project_id: &str,
        expected_version: u64,
        activity_id: i32,
        predecessor_id: i32,
    ) -> Result<ScheduleRecord, ScheduleError> {
        if activity_id == predecessor_id {
            return Err(ScheduleError::InvalidActivity(format!(
                "activity {activity_id} cannot depend on itself"
            )));
        }
        let mut schedule = self.load_checked(project_id, expected_version)?;
        for id in [activity_id, predecessor_id] {
            if !schedule.contains_activity(id)? {
                return Err(ScheduleError::ActivityNotFound {
                    project_id: project_id.to_string(),
                    activity_id: id,
                });
            }
        }
        if !schedule.add_dependency(activity_id, predecessor_id)? {
            return Ok(schedule.to_record()?);
        }
        schedule.refresh()?;
        self.commit(schedule)
    }

    /// Removes a dependency edge; removing an absent edge is a no-op.
    pub fn remove_dependency(
        &self,
        project_id: &str,
        expected_version: u64,
        activity_id: i32,
        predecessor_id: i32,
    ) -> Result<ScheduleRecord, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        if !schedule.contains_activity(activity_id)? {
            return Err(ScheduleError::ActivityNotFound {
                project_id: project_id.to_string(),
                activity_id,
            });
        }
        if !schedule.remove_dependency(activity_id, predecessor_id)? {
            return Ok(schedule.to_record()?);
        }
        schedule.refresh()?;
        self.commit(schedule)
    }

    /// Reports circular-dependency conflicts without mutating the schedule.
    pub fn validate_dependencies(
        &self,
        project_id: &str,
    ) -> Result<Vec<ScheduleConflict>, ScheduleError> {
        let schedule = self.load(project_id)?;
        let activities = schedule.activities()?;
        Ok(validation::detect_dependency_conflicts(&activities))
    }

    /// Runs a fresh CPM analysis over the stored schedule without persisting
    /// the results.
    pub fn calculate_critical_path(
        &self,
        project_id: &str,
    ) -> Result<CriticalPathAnalysis, ScheduleError> {
        let schedule = self.load(project_id)?;
        Ok(schedule.analyze()?)
    }

    /// Recomputes the analysis and persists the updated per-activity
    /// criticality and float alongside the cached path.
    pub fn refresh_critical_path(
        &self,
        project_id: &str,
        expected_version: u64,
    ) -> Result<CriticalPathAnalysis, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        let analysis = schedule.refresh()?;
        self.commit(schedule)?;
        Ok(analysis)
    }

    /// Critical activities from the last persisted analysis, in path order.
    pub fn get_critical_activities(
        &self,
        project_id: &str,
    ) -> Result<Vec<Activity>, ScheduleError> {
        let record = self
            .store
            .load(project_id)?
            .ok_or_else(|| ScheduleError::ScheduleNotFound(project_id.to_string()))?;
        let mut critical = Vec::with_capacity(record.critical_path.len());
        for id in &record.critical_path {
            if let Some(activity) = record.activities.iter().find(|a| a.id == *id) {
                critical.push(activity.clone());
            }
        }
        Ok(critical)
    }

    pub fn set_working_calendar(
        &self,
        project_id: &str,
        expected_version: u64,
        config: WorkCalendarConfig,
    ) -> Result<ScheduleRecord, ScheduleError> {
        let mut schedule = self.load_checked(project_id, expected_version)?;
        schedule.set_calendar_from_config(&config);
        self.commit(schedule)
    }

    pub fn get_working_calendar(
        &self,
        project_id: &str,
    ) -> Result<WorkCalendarConfig, ScheduleError> {
        let record = self
            .store
            .load(project_id)?
            .ok_or_else(|| ScheduleError::ScheduleNotFound(project_id.to_string()))?;
        Ok(record.calendar)
    }

    /// Inclusive working-day count between two dates under a calendar. Pure
    /// arithmetic; no schedule involved.
    pub fn calculate_working_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        calendar: &WorkCalendar,
    ) -> i64 {
        calendar.count_working_days(start, end)
    }

    fn load(&self, project_id: &str) -> Result<ProjectSchedule, ScheduleError> {
        let record = self
            .store
            .load(project_id)?
            .ok_or_else(|| ScheduleError::ScheduleNotFound(project_id.to_string()))?;
        Ok(ProjectSchedule::from_record(record)?)
    }

    fn load_checked(
        &self,
        project_id: &str,
        expected_version: u64,
    ) -> Result<ProjectSchedule, ScheduleError> {
        let schedule = self.load(project_id)?;
        let actual = schedule.version();
        if actual != expected_version {
            return Err(ScheduleError::VersionConflict {
                expected: expected_version,
                actual,
            });
        }
        Ok(schedule)
    }

    fn commit(&self, mut schedule: ProjectSchedule) -> Result<ScheduleRecord, ScheduleError> {
        schedule.bump_version();
        let record = schedule.to_record()?;
        self.store.save(&record)?;
        Ok(record)
    }
}
