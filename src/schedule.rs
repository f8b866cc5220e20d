use crate::activity::Activity;
use crate::activity_validation::{self, ActivityValidationError};
use crate::calculations::{self, CriticalPathAnalysis};
use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::graph::{NetworkBuilder, NetworkError};
use crate::metadata::ScheduleMetadata;
use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Failures raised by aggregate-level operations: invalid activity data,
/// network integrity violations, or frame plumbing errors.
#[derive(Debug)]
pub enum ScheduleDataError {
    Activity(ActivityValidationError),
    Network(NetworkError),
    Frame(PolarsError),
}

impl fmt::Display for ScheduleDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleDataError::Activity(err) => write!(f, "invalid activity: {err}"),
            ScheduleDataError::Network(err) => write!(f, "schedule network error: {err}"),
            ScheduleDataError::Frame(err) => write!(f, "schedule data error: {err}"),
        }
    }
}

impl std::error::Error for ScheduleDataError {}

impl From<ActivityValidationError> for ScheduleDataError {
    fn from(value: ActivityValidationError) -> Self {
        Self::Activity(value)
    }
}

impl From<NetworkError> for ScheduleDataError {
    fn from(value: NetworkError) -> Self {
        Self::Network(value)
    }
}

impl From<PolarsError> for ScheduleDataError {
    fn from(value: PolarsError) -> Self {
        Self::Frame(value)
    }
}

/// Serialized form of a [`ProjectSchedule`], the shape handed to the
/// persistence collaborator. Milestone ids and schedule bounds are derived
/// at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub metadata: ScheduleMetadata,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub activities: Vec<Activity>,
    pub milestones: Vec<i32>,
    pub critical_path: Vec<i32>,
    pub total_duration: i64,
    pub calendar: WorkCalendarConfig,
}

/// The persisted scheduling aggregate: identity metadata, the activity table
/// (a polars DataFrame), a working calendar, and the last-computed analysis
/// summary.
pub struct ProjectSchedule {
    metadata: ScheduleMetadata,
    df: DataFrame,
    calendar: WorkCalendar,
    critical_path: Vec<i32>,
    total_duration: i64,
}

impl ProjectSchedule {
    fn from_parts(metadata: ScheduleMetadata, calendar: WorkCalendar) -> Self {
        let schema = Self::default_schema();
        let df = DataFrame::empty_with_schema(&schema);
        Self {
            metadata,
            df,
            calendar,
            critical_path: Vec::new(),
            total_duration: 0,
        }
    }

    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_parts(ScheduleMetadata::new(project_id, name), WorkCalendar::standard())
    }

    /// Builds a schedule from a project's activity list, failing fast on
    /// duplicate ids, invalid fields, or predecessors that do not resolve.
    /// An empty activity list is a valid schedule, not an error.
    pub fn from_activities(
        project_id: impl Into<String>,
        name: impl Into<String>,
        activities: Vec<Activity>,
        calendar: WorkCalendar,
    ) -> Result<Self, ScheduleDataError> {
        activity_validation::validate_activity_collection(&activities)?;
        // Referential integrity check; the network itself is discarded.
        NetworkBuilder::new(&activities).build()?;

        let mut schedule = Self::from_parts(ScheduleMetadata::new(project_id, name), calendar);
        for activity in &activities {
            let row = activity.to_dataframe_row()?;
            schedule.df = schedule.df.vstack(&row)?;
        }
        Ok(schedule)
    }

    pub fn from_record(record: ScheduleRecord) -> Result<Self, ScheduleDataError> {
        activity_validation::validate_activity_collection(&record.activities)?;
        let calendar = WorkCalendar::from_config(&record.calendar);
        let mut schedule = Self::from_parts(record.metadata, calendar);
        for activity in &record.activities {
            let row = activity.to_dataframe_row()?;
            schedule.df = schedule.df.vstack(&row)?;
        }
        schedule.critical_path = record.critical_path;
        schedule.total_duration = record.total_duration;
        Ok(schedule)
    }

    pub fn to_record(&self) -> Result<ScheduleRecord, PolarsError> {
        Ok(ScheduleRecord {
            metadata: self.metadata.clone(),
            start: self.schedule_start()?,
            end: self.schedule_end()?,
            activities: self.activities()?,
            milestones: self.milestone_ids()?,
            critical_path: self.critical_path.clone(),
            total_duration: self.total_duration,
            calendar: self.calendar.to_config(),
        })
    }

    pub fn metadata(&self) -> &ScheduleMetadata {
        &self.metadata
    }

    pub fn version(&self) -> u64 {
        self.metadata.version
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.metadata.name = name.into();
    }

    pub(crate) fn bump_version(&mut self) {
        self.metadata.bump_version();
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn calendar_config(&self) -> WorkCalendarConfig {
        self.calendar.to_config()
    }

    pub fn set_calendar(&mut self, calendar: WorkCalendar) {
        self.calendar = calendar;
    }

    pub fn set_calendar_from_config(&mut self, config: &WorkCalendarConfig) {
        self.calendar = WorkCalendar::from_config(config);
    }

    /// Last-computed critical path; stale until [`refresh`](Self::refresh)
    /// runs after a structural change.
    pub fn critical_path(&self) -> &[i32] {
        &self.critical_path
    }

    pub fn total_duration(&self) -> i64 {
        self.total_duration
    }

    pub fn activities(&self) -> Result<Vec<Activity>, PolarsError> {
        let mut activities = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            activities.push(Activity::from_dataframe_row(&self.df, idx)?);
        }
        Ok(activities)
    }

    pub fn find_activity(&self, activity_id: i32) -> Result<Option<Activity>, PolarsError> {
        if self.df.height() == 0 {
            return Ok(None);
        }
        let ids = self.df.column("id")?.i32()?;
        for (idx, id_opt) in ids.into_iter().enumerate() {
            if id_opt == Some(activity_id) {
                return Ok(Some(Activity::from_dataframe_row(&self.df, idx)?));
            }
        }
        Ok(None)
    }

    pub fn contains_activity(&self, activity_id: i32) -> Result<bool, PolarsError> {
        Ok(self.find_activity(activity_id)?.is_some())
    }

    /// Ids of milestone activities, in table order.
    pub fn milestone_ids(&self) -> Result<Vec<i32>, PolarsError> {
        let mut ids = Vec::new();
        for activity in self.activities()? {
            if activity.kind == crate::activity::ActivityKind::Milestone {
                ids.push(activity.id);
            }
        }
        Ok(ids)
    }

    /// Earliest planned start across activities.
    pub fn schedule_start(&self) -> Result<Option<NaiveDate>, PolarsError> {
        Ok(self
            .activities()?
            .iter()
            .map(|activity| activity.start)
            .min())
    }

    /// Latest planned end across activities.
    pub fn schedule_end(&self) -> Result<Option<NaiveDate>, PolarsError> {
        Ok(self.activities()?.iter().map(|activity| activity.end).max())
    }

    /// Inserts a new activity. Duplicate ids are rejected, and every
    /// predecessor must already exist in the schedule.
    pub fn insert_activity(&mut self, activity: Activity) -> Result<(), ScheduleDataError> {
        activity_validation::validate_activity(&activity)?;
        if self.contains_activity(activity.id)? {
            return Err(ScheduleDataError::Activity(ActivityValidationError::new(
                format!("duplicate activity id {}", activity.id),
            )));
        }
        for &pred in &activity.predecessors {
            if !self.contains_activity(pred)? {
                return Err(ScheduleDataError::Network(NetworkError::UnknownPredecessor {
                    activity: activity.id,
                    predecessor: pred,
                }));
            }
        }

        let row = activity.to_dataframe_row()?;
        self.df = self.df.vstack(&row)?;
        Ok(())
    }

    /// Removes an activity and strips its id from every other activity's
    /// predecessor and successor lists. Returns false when the id is absent.
    pub fn remove_activity(&mut self, activity_id: i32) -> Result<bool, PolarsError> {
        if self.df.height() == 0 {
            return Ok(false);
        }
        let snapshot = self.df.clone();
        let mut kept: Vec<Activity> = Vec::with_capacity(snapshot.height());
        let mut found = false;
        for idx in 0..snapshot.height() {
            let mut activity = Activity::from_dataframe_row(&snapshot, idx)?;
            if activity.id == activity_id {
                found = true;
                continue;
            }
            activity.predecessors.retain(|&pred| pred != activity_id);
            activity.successors.retain(|&succ| succ != activity_id);
            kept.push(activity);
        }
        if !found {
            return Ok(false);
        }

        self.df = DataFrame::empty_with_schema(&Self::default_schema());
        for activity in kept {
            let row = activity.to_dataframe_row()?;
            self.df = self.df.vstack(&row)?;
        }
        Ok(true)
    }

    /// Moves an activity to new planned dates, keeping the stored duration
    /// column consistent. Returns false when the id is absent.
    pub fn set_activity_dates(
        &mut self,
        activity_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, PolarsError> {
        if self.find_activity(activity_id)?.is_none() {
            return Ok(false);
        }
        self.update_date_column("start", activity_id, start)?;
        self.update_date_column("end", activity_id, end)?;
        let duration = (end - start).num_days().abs();
        self.update_i64_column("duration_days", activity_id, duration)?;
        Ok(true)
    }

    /// Adds a finish-to-start dependency. Idempotent: returns false when the
    /// edge already exists. Both endpoints must be present; callers check
    /// existence first.
    pub fn add_dependency(
        &mut self,
        activity_id: i32,
        predecessor_id: i32,
    ) -> Result<bool, PolarsError> {
        let Some(activity) = self.find_activity(activity_id)? else {
            return Ok(false);
        };
        if activity.predecessors.contains(&predecessor_id) {
            return Ok(false);
        }
        let mut predecessors = activity.predecessors;
        predecessors.push(predecessor_id);
        self.update_list_i32_column("predecessors", activity_id, predecessors)?;
        Ok(true)
    }

    /// Removes a dependency edge. Removing an absent edge is a no-op.
    pub fn remove_dependency(
        &mut self,
        activity_id: i32,
        predecessor_id: i32,
    ) -> Result<bool, PolarsError> {
        let Some(activity) = self.find_activity(activity_id)? else {
            return Ok(false);
        };
        if !activity.predecessors.contains(&predecessor_id) {
            return Ok(false);
        }
        let predecessors: Vec<i32> = activity
            .predecessors
            .into_iter()
            .filter(|&pred| pred != predecessor_id)
            .collect();
        self.update_list_i32_column("predecessors", activity_id, predecessors)?;
        Ok(true)
    }

    /// Runs the full CPM analysis on the current activity table without
    /// mutating the aggregate.
    pub fn analyze(&self) -> Result<CriticalPathAnalysis, ScheduleDataError> {
        let activities = self.activities()?;
        let mut network = NetworkBuilder::new(&activities).build()?;
        Ok(calculations::analyze(&mut network))
    }

    /// Analyzes and writes the results back: per-activity criticality and
    /// float columns, the derived successors column, and the cached critical
    /// path and total duration.
    pub fn refresh(&mut self) -> Result<CriticalPathAnalysis, ScheduleDataError> {
        let analysis = self.analyze()?;
        self.apply_analysis(&analysis)?;
        Ok(analysis)
    }

    pub fn apply_analysis(&mut self, analysis: &CriticalPathAnalysis) -> Result<(), PolarsError> {
        for node in &analysis.nodes {
            self.update_bool_column("is_critical", node.id, node.is_critical)?;
            self.update_i64_column("total_float", node.id, node.total_slack)?;
        }
        self.set_successors_column()?;
        self.critical_path = analysis.critical_path.clone();
        self.total_duration = analysis.total_duration;
        Ok(())
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("name".into(), DataType::String),
            Field::new("kind".into(), DataType::String),
            Field::new("start".into(), DataType::Date),
            Field::new("end".into(), DataType::Date),
            Field::new("duration_days".into(), DataType::Int64),
            Field::new("percent_complete".into(), DataType::Float64),
            Field::new(
                "predecessors".into(),
                DataType::List(Box::new(DataType::Int32)),
            ),
            Field::new(
                "successors".into(),
                DataType::List(Box::new(DataType::Int32)),
            ),
            Field::new("parent_id".into(), DataType::Int32),
            Field::new("resource_id".into(), DataType::String),
            Field::new("color".into(), DataType::String),
            Field::new("total_float".into(), DataType::Int64),
            Field::new("is_critical".into(), DataType::Boolean),
        ])
    }

    fn update_i64_column(
        &mut self,
        column_name: &str,
        activity_id: i32,
        new_value: i64,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .i64()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(activity_id) {
                    Some(new_value)
                } else {
                    val
                }
            })
            .collect::<Int64Chunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_bool_column(
        &mut self,
        column_name: &str,
        activity_id: i32,
        new_value: bool,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .bool()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(activity_id) {
                    Some(new_value)
                } else {
                    val
                }
            })
            .collect::<BooleanChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_list_i32_column(
        &mut self,
        column_name: &str,
        activity_id: i32,
        new_values: Vec<i32>,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .list()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(activity_id) {
                    Some(Series::new(PlSmallStr::from_static(""), new_values.clone()))
                } else {
                    val
                }
            })
            .collect::<ListChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_date_column(
        &mut self,
        column_name: &str,
        activity_id: i32,
        new_date: NaiveDate,
    ) -> Result<(), PolarsError> {
        self.df = self
            .df
            .clone()
            .lazy()
            .with_column(
                when(col("id").eq(lit(activity_id)))
                    .then(lit(new_date).cast(DataType::Date))
                    .otherwise(col(column_name).cast(DataType::Date))
                    .alias(column_name),
            )
            .collect()?;
        Ok(())
    }

    /// Rebuilds the derived successors column by inverting the predecessor
    /// lists.
    fn set_successors_column(&mut self) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?.i32()?;
        let predecessors = self.df.column("predecessors")?.list()?;

        let ids: Vec<Option<i32>> = id_col.into_iter().collect();
        let mut successors_map: HashMap<i32, Vec<i32>> = HashMap::new();
        for opt_id in ids.iter().flatten() {
            successors_map.entry(*opt_id).or_default();
        }

        for (idx, maybe_id) in ids.iter().enumerate() {
            if let Some(activity_id) = maybe_id {
                if let Some(series) = predecessors.get_as_series(idx) {
                    let pred_col = series.i32()?;
                    for pred in pred_col.into_iter().flatten() {
                        successors_map.entry(pred).or_default().push(*activity_id);
                    }
                }
            }
        }

        let successor_rows: Vec<Series> = ids
            .into_iter()
            .map(|maybe_id| {
                let list = if let Some(id) = maybe_id {
                    let mut list = successors_map.get(&id).cloned().unwrap_or_default();
                    list.sort_unstable();
                    list.dedup();
                    list
                } else {
                    Vec::new()
                };
                Series::new(PlSmallStr::from_static(""), list)
            })
            .collect();

        let list_chunked: ListChunked = successor_rows.into_iter().collect();
        self.df.replace("successors", list_chunked.into_series())?;
        Ok(())
    }
}
