use super::{NetworkNode, ScheduleNetwork};
use crate::activity::Activity;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

/// Data-integrity failures while deriving the network. A predecessor that
/// does not resolve to an activity in the same schedule is an error here, not
/// a silently dropped edge, so the CPM passes never see dangling references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    DuplicateActivity(i32),
    UnknownPredecessor { activity: i32, predecessor: i32 },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::DuplicateActivity(id) => {
                write!(f, "duplicate activity id {id} in schedule network")
            }
            NetworkError::UnknownPredecessor {
                activity,
                predecessor,
            } => write!(
                f,
                "activity {activity} references predecessor {predecessor} which is not in the schedule"
            ),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Converts a flat activity list into a [`ScheduleNetwork`].
pub struct NetworkBuilder<'a> {
    activities: &'a [Activity],
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(activities: &'a [Activity]) -> Self {
        Self { activities }
    }

    pub fn build(&self) -> Result<ScheduleNetwork, NetworkError> {
        let mut graph: DiGraph<i32, ()> = DiGraph::new();
        let mut id_to_index: HashMap<i32, NodeIndex> = HashMap::new();
        let mut nodes: HashMap<i32, NetworkNode> = HashMap::new();

        for activity in self.activities {
            if id_to_index.contains_key(&activity.id) {
                return Err(NetworkError::DuplicateActivity(activity.id));
            }
            let node_ix = graph.add_node(activity.id);
            id_to_index.insert(activity.id, node_ix);

            let mut predecessors = activity.predecessors.clone();
            predecessors.sort_unstable();
            predecessors.dedup();

            nodes.insert(
                activity.id,
                NetworkNode::new(
                    activity.id,
                    activity.name.clone(),
                    activity.duration_days(),
                    predecessors,
                ),
            );
        }

        // Edges run pred -> activity; duplicate predecessor entries collapse
        // to a single edge.
        for activity in self.activities {
            let &v = id_to_index
                .get(&activity.id)
                .expect("node inserted above");
            for &pred_id in &activity.predecessors {
                let Some(&u) = id_to_index.get(&pred_id) else {
                    return Err(NetworkError::UnknownPredecessor {
                        activity: activity.id,
                        predecessor: pred_id,
                    });
                };
                graph.update_edge(u, v, ());
            }
        }

        Ok(ScheduleNetwork::from_parts(nodes, graph, id_to_index))
    }
}
