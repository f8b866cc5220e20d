use crate::graph::{NetworkNode, ScheduleNetwork};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Result of one full CPM run over a schedule network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathAnalysis {
    /// Critical node ids in dependency order.
    pub critical_path: Vec<i32>,
    /// Max early finish across the network.
    pub total_duration: i64,
    /// Minimum total slack among non-critical nodes; 0 when none exist.
    pub schedule_slack: i64,
    /// Per-node CPM results, ordered by id.
    pub nodes: Vec<NetworkNode>,
    /// Critical nodes with high fan-in or fan-out, deduplicated.
    pub bottlenecks: Vec<i32>,
}

impl CriticalPathAnalysis {
    pub fn empty() -> Self {
        Self {
            critical_path: Vec::new(),
            total_duration: 0,
            schedule_slack: 0,
            nodes: Vec::new(),
            bottlenecks: Vec::new(),
        }
    }

    pub fn is_critical(&self, id: i32) -> bool {
        self.critical_path.contains(&id)
    }
}

/// Orders the critical nodes into a dependency-respecting sequence and picks
/// out bottlenecks. Runs after the slack pass has marked criticality.
pub(crate) fn extract(network: &ScheduleNetwork, schedule_slack: i64) -> CriticalPathAnalysis {
    let critical: HashSet<i32> = network
        .node_ids()
        .into_iter()
        .filter(|&id| network.node(id).is_some_and(|node| node.is_critical))
        .collect();

    // Topological ordering restricted to the critical subgraph: repeatedly
    // place any remaining critical node whose critical predecessors are all
    // placed, earliest start (then id) first for determinism.
    let mut remaining: Vec<i32> = critical.iter().copied().collect();
    remaining.sort_by_key(|&id| {
        let start = network.node(id).map(|node| node.early_start).unwrap_or(0);
        (start, id)
    });

    let mut placed: HashSet<i32> = HashSet::with_capacity(remaining.len());
    let mut critical_path: Vec<i32> = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let ready = remaining.iter().position(|&id| {
            network.node(id).is_some_and(|node| {
                node.predecessors
                    .iter()
                    .all(|pred| !critical.contains(pred) || placed.contains(pred))
            })
        });
        // A cycle among critical nodes would leave nothing ready; stop
        // rather than spin.
        let Some(pos) = ready else {
            break;
        };
        let id = remaining.remove(pos);
        placed.insert(id);
        critical_path.push(id);
    }

    let mut bottlenecks: Vec<i32> = critical
        .iter()
        .copied()
        .filter(|&id| {
            let high_fan_in = network
                .node(id)
                .is_some_and(|node| node.predecessors.len() > 1);
            let high_fan_out = network.successor_count(id) > 2;
            high_fan_in || high_fan_out
        })
        .collect();
    bottlenecks.sort_unstable();

    CriticalPathAnalysis {
        critical_path,
        total_duration: network.project_duration(),
        schedule_slack,
        nodes: network.nodes_by_id(),
        bottlenecks,
    }
}
