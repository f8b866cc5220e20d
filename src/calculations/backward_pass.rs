use crate::graph::ScheduleNetwork;
use std::collections::HashMap;

/// Latest-window propagation from sink nodes, anchored to the overall
/// project duration.
///
/// Because one predecessor can feed several successors, a node's late finish
/// must be the minimum over all of its successors' late starts. The minimum
/// accumulates from an explicit unset state rather than defaulting to the
/// first candidate, so a tighter constraint arriving from a later successor
/// is never ignored. Diamond-shaped networks are the regression case.
pub struct BackwardPass<'a> {
    network: &'a ScheduleNetwork,
}

impl<'a> BackwardPass<'a> {
    pub fn new(network: &'a ScheduleNetwork) -> Self {
        Self { network }
    }

    /// Late start/finish per node id. Nodes trapped in a cycle are absent
    /// from the dependency order and therefore from the result.
    pub fn execute(&self, project_duration: i64) -> HashMap<i32, (i64, i64)> {
        let mut results: HashMap<i32, (i64, i64)> = HashMap::with_capacity(self.network.len());

        let mut order = self.network.dependency_order();
        order.reverse();

        for id in order {
            let Some(node) = self.network.node(id) else {
                continue;
            };

            let mut late_finish: Option<i64> = None;
            for successor in self.network.successor_ids(id) {
                if let Some((succ_late_start, _)) = results.get(&successor) {
                    late_finish = Some(match late_finish {
                        None => *succ_late_start,
                        Some(current) => current.min(*succ_late_start),
                    });
                }
            }

            // Sinks (and nodes whose successors were all unreachable) anchor
            // to the project duration.
            let late_finish = late_finish.unwrap_or(project_duration);
            let late_start = late_finish - node.duration;
            results.insert(id, (late_start, late_finish));
        }

        results
    }
}
