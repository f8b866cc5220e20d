use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of schedulable unit an activity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    Task,
    Milestone,
    ProjectSummary,
    Group,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Task => "task",
            ActivityKind::Milestone => "milestone",
            ActivityKind::ProjectSummary => "project-summary",
            ActivityKind::Group => "group",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "task" => Some(ActivityKind::Task),
            "milestone" => Some(ActivityKind::Milestone),
            "project-summary" => Some(ActivityKind::ProjectSummary),
            "group" => Some(ActivityKind::Group),
            _ => None,
        }
    }
}

impl Default for ActivityKind {
    fn default() -> Self {
        ActivityKind::Task
    }
}

/// One schedulable unit of work with planned dates and finish-to-start
/// predecessors. `successors`, `is_critical`, and `total_float` are filled in
/// by analysis, not by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub kind: ActivityKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Completion percentage in 0..=100.
    #[serde(default)]
    pub percent_complete: f64,
    #[serde(default)]
    pub predecessors: Vec<i32>,
    #[serde(default)]
    pub successors: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_float: Option<i64>,
}

impl Activity {
    pub fn new(id: i32, name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ActivityKind::Task,
            start,
            end,
            percent_complete: 0.0,
            predecessors: Vec::new(),
            successors: Vec::new(),
            parent_id: None,
            resource_id: None,
            color: None,
            is_critical: None,
            total_float: None,
        }
    }

    pub fn milestone(id: i32, name: impl Into<String>, date: NaiveDate) -> Self {
        let mut activity = Self::new(id, name, date, date);
        activity.kind = ActivityKind::Milestone;
        activity
    }

    pub fn with_predecessors(mut self, predecessors: Vec<i32>) -> Self {
        self.predecessors = predecessors;
        self
    }

    /// Whole-day span between the planned dates. Milestones with
    /// `start == end` yield 0.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days().abs()
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(14);

        let id_data: [i32; 1] = [self.id];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let name_data: [&str; 1] = [self.name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("name"), name_data).into_column());

        let kind_data: [&str; 1] = [self.kind.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("kind"), kind_data).into_column());

        columns.push(Self::series_from_date("start", Some(self.start))?.into_column());
        columns.push(Self::series_from_date("end", Some(self.end))?.into_column());

        let duration_data: [i64; 1] = [self.duration_days()];
        columns.push(
            Series::new(PlSmallStr::from_static("duration_days"), duration_data).into_column(),
        );

        let percent_data: [f64; 1] = [self.percent_complete];
        columns.push(
            Series::new(PlSmallStr::from_static("percent_complete"), percent_data).into_column(),
        );

        columns.push(Self::series_from_i32_list("predecessors", &self.predecessors).into_column());
        columns.push(Self::series_from_i32_list("successors", &self.successors).into_column());

        let parent: [Option<i32>; 1] = [self.parent_id];
        columns.push(Series::new(PlSmallStr::from_static("parent_id"), parent).into_column());

        let resource: [Option<&str>; 1] = [self.resource_id.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("resource_id"), resource).into_column());

        let color: [Option<&str>; 1] = [self.color.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("color"), color).into_column());

        let total_float: [Option<i64>; 1] = [self.total_float];
        columns.push(
            Series::new(PlSmallStr::from_static("total_float"), total_float).into_column(),
        );

        let is_critical: [Option<bool>; 1] = [self.is_critical];
        columns.push(
            Series::new(PlSmallStr::from_static("is_critical"), is_critical).into_column(),
        );

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df
            .column("id")?
            .i32()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("activity row missing id".into()))?;

        let name = df
            .column("name")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();

        let kind_str = df.column("kind")?.str()?.get(row_idx).unwrap_or("task");
        let kind = ActivityKind::from_str(kind_str).ok_or_else(|| {
            PolarsError::ComputeError(format!("activity {id} has unknown kind '{kind_str}'").into())
        })?;

        let start = Self::date_from_series(df.column("start")?.date()?, row_idx).ok_or_else(
            || PolarsError::ComputeError(format!("activity {id} missing start date").into()),
        )?;
        let end = Self::date_from_series(df.column("end")?.date()?, row_idx).ok_or_else(|| {
            PolarsError::ComputeError(format!("activity {id} missing end date").into())
        })?;

        let predecessors = Self::vec_from_i32_list(df.column("predecessors")?.list()?, row_idx)?;
        let successors = Self::vec_from_i32_list(df.column("successors")?.list()?, row_idx)?;

        Ok(Self {
            id,
            name,
            kind,
            start,
            end,
            percent_complete: df
                .column("percent_complete")?
                .f64()?
                .get(row_idx)
                .unwrap_or(0.0),
            predecessors,
            successors,
            parent_id: df.column("parent_id")?.i32()?.get(row_idx),
            resource_id: df
                .column("resource_id")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            color: df
                .column("color")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            is_critical: df.column("is_critical")?.bool()?.get(row_idx),
            total_float: df.column("total_float")?.i64()?.get(row_idx),
        })
    }

    fn series_from_i32_list(name: &str, values: &[i32]) -> Series {
        let inner = Series::new(PlSmallStr::from_static(""), values.to_vec());
        Series::new(name.into(), &[inner])
    }

    fn series_from_date(name: &str, date: Option<NaiveDate>) -> PolarsResult<Series> {
        let data: [Option<i32>; 1] = [date.map(Self::date_to_i32)];
        Series::new(name.into(), data).cast(&DataType::Date)
    }

    fn date_from_series(chunked: &DateChunked, row_idx: usize) -> Option<NaiveDate> {
        chunked.get(row_idx).map(Self::date_from_i32)
    }

    fn vec_from_i32_list(list: &ListChunked, row_idx: usize) -> PolarsResult<Vec<i32>> {
        if let Some(series) = list.get_as_series(row_idx) {
            Ok(series.i32()?.into_iter().flatten().collect::<Vec<_>>())
        } else {
            Ok(Vec::new())
        }
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (date - epoch).num_days() as i32
    }

    fn date_from_i32(days: i32) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        epoch + Duration::days(days as i64)
    }
}
