use crate::graph::ScheduleNetwork;
use std::collections::HashMap;

/// Derives total slack, free slack, and criticality from the completed
/// forward/backward results, mutating the nodes in place.
///
/// Returns the schedule-wide slack: the minimum total slack among
/// non-critical nodes, or 0 when every node is critical (or the network is
/// empty).
pub(crate) fn apply_slack(network: &mut ScheduleNetwork) -> i64 {
    let ids = network.node_ids();

    // Gather each node's minimum successor early start before mutating.
    let mut min_successor_start: HashMap<i32, Option<i64>> = HashMap::with_capacity(ids.len());
    for &id in &ids {
        let min_start = network
            .successor_ids(id)
            .into_iter()
            .filter_map(|succ| network.node(succ).map(|node| node.early_start))
            .min();
        min_successor_start.insert(id, min_start);
    }

    let mut schedule_slack: Option<i64> = None;
    for &id in &ids {
        let min_start = min_successor_start.get(&id).copied().flatten();
        if let Some(node) = network.node_mut(id) {
            node.total_slack = node.late_start - node.early_start;
            node.is_critical = node.total_slack == 0;
            node.free_slack = match min_start {
                Some(start) => start - node.early_finish,
                // No successors: nothing downstream to delay.
                None => node.total_slack,
            };

            if !node.is_critical {
                schedule_slack = Some(match schedule_slack {
                    None => node.total_slack,
                    Some(current) => current.min(node.total_slack),
                });
            }
        }
    }

    schedule_slack.unwrap_or(0)
}
