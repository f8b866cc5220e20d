use chrono::{Duration, NaiveDate, Weekday};
use project_scheduler::{
    Activity, CreateScheduleOptions, InMemoryActivityProvider, InMemoryScheduleStore,
    ScheduleError, ScheduleUpdate, SchedulingService, WorkCalendar, WorkCalendarConfig,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn activity(id: i32, duration: i64, predecessors: Vec<i32>) -> Activity {
    let start = d(2025, 6, 2);
    Activity::new(id, format!("A{id}"), start, start + Duration::days(duration))
        .with_predecessors(predecessors)
}

fn diamond() -> Vec<Activity> {
    vec![
        activity(1, 2, vec![]),
        activity(2, 3, vec![1]),
        activity(3, 5, vec![1]),
        activity(4, 1, vec![2, 3]),
    ]
}

fn service_with_diamond() -> SchedulingService<InMemoryActivityProvider, InMemoryScheduleStore> {
    let provider = InMemoryActivityProvider::new();
    provider.insert_project("proj-1", diamond());
    SchedulingService::new(provider, InMemoryScheduleStore::new())
}

#[test]
fn create_schedule_analyzes_and_persists_at_version_one() {
    let service = service_with_diamond();
    let record = service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    assert_eq!(record.metadata.version, 1);
    assert_eq!(record.metadata.name, "proj-1");
    assert_eq!(record.critical_path, vec![1, 3, 4]);
    assert_eq!(record.total_duration, 8);

    let stored = service.get_schedule("proj-1").unwrap().unwrap();
    assert_eq!(stored.metadata.version, 1);
    assert_eq!(stored.critical_path, record.critical_path);
}

#[test]
fn create_schedule_twice_fails() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();
    let err = service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap_err();
    assert!(matches!(err, ScheduleError::ScheduleAlreadyExists(_)));
}

#[test]
fn create_schedule_with_no_activities_is_valid() {
    let provider = InMemoryActivityProvider::new();
    let service = SchedulingService::new(provider, InMemoryScheduleStore::new());
    let record = service
        .create_schedule("empty-proj", CreateScheduleOptions::default())
        .unwrap();
    assert!(record.activities.is_empty());
    assert_eq!(record.total_duration, 0);
}

#[test]
fn get_schedule_returns_none_for_unknown_project() {
    let service = service_with_diamond();
    assert!(service.get_schedule("nope").unwrap().is_none());
}

#[test]
fn stale_version_is_rejected_without_mutation() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let err = service
        .schedule_activity("proj-1", 99, activity(5, 2, vec![4]))
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::VersionConflict {
            expected: 99,
            actual: 1
        }
    ));

    // Nothing was written.
    let stored = service.get_schedule("proj-1").unwrap().unwrap();
    assert_eq!(stored.metadata.version, 1);
    assert_eq!(stored.activities.len(), 4);
}

#[test]
fn successful_mutations_bump_the_version() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let record = service
        .schedule_activity("proj-1", 1, activity(5, 4, vec![4]))
        .unwrap();
    assert_eq!(record.metadata.version, 2);
    assert_eq!(record.activities.len(), 5);
    // New sink extends the critical path.
    assert_eq!(record.critical_path, vec![1, 3, 4, 5]);
    assert_eq!(record.total_duration, 12);

    let record = service
        .remove_activity("proj-1", 2, 5)
        .unwrap();
    assert_eq!(record.metadata.version, 3);
    assert_eq!(record.total_duration, 8);
}

#[test]
fn update_schedule_changes_fields_without_recomputing() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let update = ScheduleUpdate {
        name: Some("Phase two".to_string()),
        calendar: None,
    };
    let record = service.update_schedule("proj-1", 1, update).unwrap();
    assert_eq!(record.metadata.name, "Phase two");
    assert_eq!(record.metadata.version, 2);
    assert_eq!(record.critical_path, vec![1, 3, 4]);
}

#[test]
fn delete_schedule_reports_whether_anything_existed() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();
    assert!(service.delete_schedule("proj-1").unwrap());
    assert!(!service.delete_schedule("proj-1").unwrap());
    assert!(service.get_schedule("proj-1").unwrap().is_none());
}

#[test]
fn reschedule_activity_preserves_duration() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let record = service
        .reschedule_activity("proj-1", 1, 2, d(2025, 7, 1))
        .unwrap();
    let a2 = record.activities.iter().find(|a| a.id == 2).unwrap();
    assert_eq!(a2.start, d(2025, 7, 1));
    assert_eq!(a2.duration_days(), 3);
}

#[test]
fn activity_operations_on_unknown_ids_report_not_found() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let err = service
        .reschedule_activity("proj-1", 1, 99, d(2025, 7, 1))
        .unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::ActivityNotFound {
            activity_id: 99,
            ..
        }
    ));

    let err = service.remove_activity("proj-1", 1, 99).unwrap_err();
    assert!(matches!(err, ScheduleError::ActivityNotFound { .. }));
}

#[test]
fn operations_on_unknown_projects_report_not_found() {
    let service = service_with_diamond();
    let err = service.calculate_critical_path("nope").unwrap_err();
    assert!(matches!(err, ScheduleError::ScheduleNotFound(_)));

    let err = service.get_critical_activities("nope").unwrap_err();
    assert!(matches!(err, ScheduleError::ScheduleNotFound(_)));
}

#[test]
fn add_dependency_is_idempotent_and_version_guarded() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let record = service.add_dependency("proj-1", 1, 2, 3).unwrap();
    assert_eq!(record.metadata.version, 2);

    // Re-adding the same edge changes nothing and keeps the version.
    let record = service.add_dependency("proj-1", 2, 2, 3).unwrap();
    assert_eq!(record.metadata.version, 2);

    let err = service.add_dependency("proj-1", 1, 2, 3).unwrap_err();
    assert!(matches!(err, ScheduleError::VersionConflict { .. }));
}

#[test]
fn self_dependency_is_rejected() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();
    let err = service.add_dependency("proj-1", 1, 2, 2).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidActivity(_)));
}

#[test]
fn remove_dependency_recomputes_the_path() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    // Dropping 3 -> 4 leaves the branch through 2 driving node 4.
    let record = service.remove_dependency("proj-1", 1, 4, 3).unwrap();
    assert_eq!(record.metadata.version, 2);
    assert_eq!(record.total_duration, 7);
    assert!(record.critical_path.contains(&3));
    let a4 = record.activities.iter().find(|a| a.id == 4).unwrap();
    assert_eq!(a4.predecessors, vec![2]);
}

#[test]
fn validate_dependencies_surfaces_cycles_as_conflicts() {
    let provider = InMemoryActivityProvider::new();
    let service = SchedulingService::new(provider, InMemoryScheduleStore::new());
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    // Build the cycle through the service one edge at a time; each edge in
    // isolation is legal.
    let record = service
        .schedule_activity("proj-1", 1, activity(1, 2, vec![]))
        .unwrap();
    let record = service
        .schedule_activity("proj-1", record.metadata.version, activity(2, 2, vec![1]))
        .unwrap();
    let record = service
        .add_dependency("proj-1", record.metadata.version, 1, 2)
        .unwrap();

    let conflicts = service.validate_dependencies("proj-1").unwrap();
    assert_eq!(conflicts.len(), 1);
    let mut members = conflicts[0].affected_activities.clone();
    members.sort_unstable();
    assert_eq!(members, vec![1, 2]);

    // The cyclic schedule is still stored and versioned.
    assert!(record.metadata.version >= 3);
}

#[test]
fn calculate_critical_path_does_not_persist() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let analysis = service.calculate_critical_path("proj-1").unwrap();
    assert_eq!(analysis.critical_path, vec![1, 3, 4]);

    let stored = service.get_schedule("proj-1").unwrap().unwrap();
    assert_eq!(stored.metadata.version, 1);
}

#[test]
fn refresh_critical_path_persists_and_bumps() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let analysis = service.refresh_critical_path("proj-1", 1).unwrap();
    assert_eq!(analysis.critical_path, vec![1, 3, 4]);

    let stored = service.get_schedule("proj-1").unwrap().unwrap();
    assert_eq!(stored.metadata.version, 2);

    let critical = service.get_critical_activities("proj-1").unwrap();
    let ids: Vec<i32> = critical.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert!(critical.iter().all(|a| a.is_critical == Some(true)));
}

#[test]
fn working_calendar_round_trips_through_the_service() {
    let service = service_with_diamond();
    service
        .create_schedule("proj-1", CreateScheduleOptions::default())
        .unwrap();

    let config = WorkCalendarConfig::new(
        [Weekday::Mon, Weekday::Tue, Weekday::Wed],
        [d(2025, 12, 25)],
    )
    .with_holiday_exclusion(true);
    let record = service
        .set_working_calendar("proj-1", 1, config.clone())
        .unwrap();
    assert_eq!(record.metadata.version, 2);
    assert_eq!(service.get_working_calendar("proj-1").unwrap(), config);
}

#[test]
fn calculate_working_days_uses_the_given_calendar() {
    let service = service_with_diamond();
    let calendar = WorkCalendar::standard();
    assert_eq!(
        service.calculate_working_days(d(2025, 6, 2), d(2025, 6, 8), &calendar),
        5
    );
}
