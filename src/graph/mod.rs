use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

pub mod builder;

pub use builder::{NetworkBuilder, NetworkError};

/// Per-activity CPM state. All timing fields are whole-day offsets from the
/// project start; a source node begins at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: i32,
    pub name: String,
    pub duration: i64,
    pub predecessors: Vec<i32>,
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub total_slack: i64,
    pub free_slack: i64,
    pub is_critical: bool,
}

impl NetworkNode {
    pub(crate) fn new(id: i32, name: String, duration: i64, predecessors: Vec<i32>) -> Self {
        Self {
            id,
            name,
            duration,
            predecessors,
            early_start: 0,
            early_finish: 0,
            late_start: 0,
            late_finish: 0,
            total_slack: 0,
            free_slack: 0,
            is_critical: false,
        }
    }
}

/// Ephemeral dependency graph derived from a schedule's activities. Rebuilt
/// on every analysis run, never persisted.
#[derive(Debug)]
pub struct ScheduleNetwork {
    nodes: HashMap<i32, NetworkNode>,
    graph: DiGraph<i32, ()>,
    id_to_index: HashMap<i32, NodeIndex>,
    sources: Vec<i32>,
    sinks: Vec<i32>,
    project_duration: i64,
}

impl ScheduleNetwork {
    pub(crate) fn from_parts(
        nodes: HashMap<i32, NetworkNode>,
        graph: DiGraph<i32, ()>,
        id_to_index: HashMap<i32, NodeIndex>,
    ) -> Self {
        let mut sources: Vec<i32> = graph
            .externals(Direction::Incoming)
            .map(|ix| graph[ix])
            .collect();
        sources.sort_unstable();
        let mut sinks: Vec<i32> = graph
            .externals(Direction::Outgoing)
            .map(|ix| graph[ix])
            .collect();
        sinks.sort_unstable();

        Self {
            nodes,
            graph,
            id_to_index,
            sources,
            sinks,
            project_duration: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: i32) -> Option<&NetworkNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Activities with no predecessors.
    pub fn sources(&self) -> &[i32] {
        &self.sources
    }

    /// Activities never named as a predecessor by any other activity.
    pub fn sinks(&self) -> &[i32] {
        &self.sinks
    }

    /// Max early finish across all nodes; 0 until the forward pass runs and
    /// for the empty network.
    pub fn project_duration(&self) -> i64 {
        self.project_duration
    }

    pub fn node_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All nodes ordered by id, for stable presentation.
    pub fn nodes_by_id(&self) -> Vec<NetworkNode> {
        let mut nodes: Vec<NetworkNode> = self.nodes.values().cloned().collect();
        nodes.sort_by_key(|node| node.id);
        nodes
    }

    pub fn successor_ids(&self, id: i32) -> Vec<i32> {
        let Some(&ix) = self.id_to_index.get(&id) else {
            return Vec::new();
        };
        let mut successors: Vec<i32> = self
            .graph
            .neighbors_directed(ix, Direction::Outgoing)
            .map(|succ_ix| self.graph[succ_ix])
            .collect();
        successors.sort_unstable();
        successors
    }

    pub fn successor_count(&self, id: i32) -> usize {
        self.id_to_index
            .get(&id)
            .map(|&ix| self.graph.neighbors_directed(ix, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// Nodes in dependency order (predecessors before successors). On cyclic
    /// input this degrades to the acyclic portion: cycle members are simply
    /// absent, so passes over this order terminate.
    pub fn dependency_order(&self) -> Vec<i32> {
        match toposort(&self.graph, None) {
            Ok(order) => order.into_iter().map(|ix| self.graph[ix]).collect(),
            Err(_) => self.kahn_partial_order(),
        }
    }

    fn kahn_partial_order(&self) -> Vec<i32> {
        let mut remaining: HashMap<NodeIndex, usize> = HashMap::with_capacity(self.graph.node_count());
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        for ix in self.graph.node_indices() {
            let degree = self.graph.neighbors_directed(ix, Direction::Incoming).count();
            remaining.insert(ix, degree);
            if degree == 0 {
                queue.push_back(ix);
            }
        }

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(ix) = queue.pop_front() {
            order.push(self.graph[ix]);
            for succ_ix in self.graph.neighbors_directed(ix, Direction::Outgoing) {
                if let Some(degree) = remaining.get_mut(&succ_ix) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(succ_ix);
                    }
                }
            }
        }
        order
    }

    pub(crate) fn apply_forward(&mut self, results: &HashMap<i32, (i64, i64)>) {
        let mut max_finish = 0;
        for (id, (early_start, early_finish)) in results {
            if let Some(node) = self.nodes.get_mut(id) {
                node.early_start = *early_start;
                node.early_finish = *early_finish;
            }
            if *early_finish > max_finish {
                max_finish = *early_finish;
            }
        }
        self.project_duration = max_finish;
    }

    pub(crate) fn apply_backward(&mut self, results: &HashMap<i32, (i64, i64)>) {
        for (id, (late_start, late_finish)) in results {
            if let Some(node) = self.nodes.get_mut(id) {
                node.late_start = *late_start;
                node.late_finish = *late_finish;
            }
        }
    }

    pub(crate) fn node_mut(&mut self, id: i32) -> Option<&mut NetworkNode> {
        self.nodes.get_mut(&id)
    }
}
