use chrono::{Duration, NaiveDate};
use project_scheduler::conflict::{ConflictKind, ConflictSeverity};
use project_scheduler::{Activity, detect_dependency_conflicts};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn activity(id: i32, predecessors: Vec<i32>) -> Activity {
    let start = d(2025, 5, 1);
    Activity::new(id, format!("A{id}"), start, start + Duration::days(2))
        .with_predecessors(predecessors)
}

#[test]
fn acyclic_schedule_reports_no_conflicts() {
    let activities = vec![
        activity(1, vec![]),
        activity(2, vec![1]),
        activity(3, vec![1]),
        activity(4, vec![2, 3]),
    ];
    assert!(detect_dependency_conflicts(&activities).is_empty());
}

#[test]
fn three_node_cycle_reports_exactly_one_conflict() {
    let activities = vec![
        activity(1, vec![3]),
        activity(2, vec![1]),
        activity(3, vec![2]),
    ];
    let conflicts = detect_dependency_conflicts(&activities);

    assert_eq!(conflicts.len(), 1);
    let conflict = &conflicts[0];
    assert_eq!(conflict.kind, ConflictKind::DependencyViolation);
    assert_eq!(conflict.severity, ConflictSeverity::High);
    assert!(!conflict.auto_resolvable);

    let mut members = conflict.affected_activities.clone();
    members.sort_unstable();
    assert_eq!(members, vec![1, 2, 3]);
}

#[test]
fn self_loop_is_a_cycle_of_one() {
    let activities = vec![activity(1, vec![1])];
    let conflicts = detect_dependency_conflicts(&activities);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].affected_activities, vec![1]);
}

#[test]
fn distinct_cycles_are_reported_separately() {
    let activities = vec![
        // Cycle one: 1 <-> 2.
        activity(1, vec![2]),
        activity(2, vec![1]),
        // Cycle two: 3 -> 4 -> 5 -> 3.
        activity(3, vec![5]),
        activity(4, vec![3]),
        activity(5, vec![4]),
        // Acyclic bystander.
        activity(6, vec![]),
    ];
    let conflicts = detect_dependency_conflicts(&activities);
    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].id, "dependency-violation-1");
    assert_eq!(conflicts[1].id, "dependency-violation-2");
}

#[test]
fn unknown_predecessors_are_not_treated_as_cycles() {
    let activities = vec![activity(1, vec![99]), activity(2, vec![1])];
    assert!(detect_dependency_conflicts(&activities).is_empty());
}

#[test]
fn deep_chain_does_not_overflow_the_stack() {
    // A linear chain long enough to blow a recursive detector's stack, with
    // a back edge from the end to the start.
    let depth = 10_000;
    let mut activities: Vec<Activity> = Vec::with_capacity(depth as usize);
    activities.push(activity(0, vec![depth - 1]));
    for id in 1..depth {
        activities.push(activity(id, vec![id - 1]));
    }

    let conflicts = detect_dependency_conflicts(&activities);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].affected_activities.len(), depth as usize);
}

#[test]
fn conflict_description_names_the_cycle_members() {
    let activities = vec![
        activity(1, vec![3]),
        activity(2, vec![1]),
        activity(3, vec![2]),
    ];
    let conflicts = detect_dependency_conflicts(&activities);
    let description = &conflicts[0].description;
    assert!(description.contains("circular dependency"));
    for id in 1..=3 {
        assert!(description.contains(&id.to_string()));
    }
}
