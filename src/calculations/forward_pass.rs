use crate::graph::ScheduleNetwork;
use std::collections::{HashMap, HashSet, VecDeque};

/// Earliest-window propagation from source nodes.
///
/// A node is enqueued only once every one of its predecessors has been
/// processed, so its early start always reflects the true maximum
/// predecessor finish. On cyclic input the queue simply drains without
/// reaching the cycle members; they keep their zero defaults and the
/// dependency validator reports the cycle separately.
pub struct ForwardPass<'a> {
    network: &'a ScheduleNetwork,
}

impl<'a> ForwardPass<'a> {
    pub fn new(network: &'a ScheduleNetwork) -> Self {
        Self { network }
    }

    /// Early start/finish per reachable node id, as day offsets from 0.
    pub fn execute(&self) -> HashMap<i32, (i64, i64)> {
        let mut results: HashMap<i32, (i64, i64)> = HashMap::with_capacity(self.network.len());
        let mut visited: HashSet<i32> = HashSet::with_capacity(self.network.len());

        // Predecessor lists are deduplicated at build time, so counting them
        // matches the edge count decremented below.
        let mut remaining: HashMap<i32, usize> = HashMap::with_capacity(self.network.len());
        let mut queue: VecDeque<i32> = VecDeque::new();
        for id in self.network.node_ids() {
            let pred_count = self
                .network
                .node(id)
                .map(|node| node.predecessors.len())
                .unwrap_or(0);
            remaining.insert(id, pred_count);
            if pred_count == 0 {
                queue.push_back(id);
            }
        }

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.network.node(id) else {
                continue;
            };

            let early_start = node
                .predecessors
                .iter()
                .filter_map(|pred| results.get(pred).map(|(_, finish)| *finish))
                .max()
                .unwrap_or(0);
            let early_finish = early_start + node.duration;
            results.insert(id, (early_start, early_finish));

            for successor in self.network.successor_ids(id) {
                if let Some(count) = remaining.get_mut(&successor) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        queue.push_back(successor);
                    }
                }
            }
        }

        results
    }
}
