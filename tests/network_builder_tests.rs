use chrono::NaiveDate;
use project_scheduler::{Activity, NetworkBuilder, NetworkError};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn activity(id: i32, duration: i64, predecessors: Vec<i32>) -> Activity {
    let start = d(2025, 1, 1);
    Activity::new(id, format!("A{id}"), start, start + chrono::Duration::days(duration))
        .with_predecessors(predecessors)
}

#[test]
fn build_identifies_sources_and_sinks() {
    let activities = vec![
        activity(1, 2, vec![]),
        activity(2, 3, vec![1]),
        activity(3, 1, vec![1]),
        activity(4, 2, vec![2, 3]),
    ];
    let network = NetworkBuilder::new(&activities).build().unwrap();

    assert_eq!(network.len(), 4);
    assert_eq!(network.sources(), &[1]);
    assert_eq!(network.sinks(), &[4]);
    assert_eq!(network.successor_ids(1), vec![2, 3]);
}

#[test]
fn empty_activity_list_builds_an_empty_network() {
    let network = NetworkBuilder::new(&[]).build().unwrap();
    assert!(network.is_empty());
    assert!(network.sources().is_empty());
    assert!(network.sinks().is_empty());
}

#[test]
fn unknown_predecessor_is_rejected() {
    let activities = vec![activity(1, 2, vec![42])];
    let err = NetworkBuilder::new(&activities).build().unwrap_err();
    assert_eq!(
        err,
        NetworkError::UnknownPredecessor {
            activity: 1,
            predecessor: 42
        }
    );
}

#[test]
fn duplicate_activity_id_is_rejected() {
    let activities = vec![activity(7, 2, vec![]), activity(7, 3, vec![])];
    let err = NetworkBuilder::new(&activities).build().unwrap_err();
    assert_eq!(err, NetworkError::DuplicateActivity(7));
}

#[test]
fn duplicate_predecessor_entries_collapse_to_one_edge() {
    let activities = vec![activity(1, 2, vec![]), activity(2, 3, vec![1, 1, 1])];
    let network = NetworkBuilder::new(&activities).build().unwrap();

    let node = network.node(2).unwrap();
    assert_eq!(node.predecessors, vec![1]);
    assert_eq!(network.successor_count(1), 1);
}

#[test]
fn dependency_order_puts_predecessors_first() {
    let activities = vec![
        activity(3, 1, vec![]),
        activity(1, 2, vec![3]),
        activity(2, 2, vec![1]),
    ];
    let network = NetworkBuilder::new(&activities).build().unwrap();
    let order = network.dependency_order();

    let pos = |id: i32| order.iter().position(|&x| x == id).unwrap();
    assert!(pos(3) < pos(1));
    assert!(pos(1) < pos(2));
}
