pub mod backward_pass;
pub mod critical_path;
pub mod forward_pass;
pub(crate) mod slack;

pub use backward_pass::BackwardPass;
pub use critical_path::CriticalPathAnalysis;
pub use forward_pass::ForwardPass;

use crate::graph::ScheduleNetwork;

/// Runs the full CPM pipeline over a freshly built network: forward pass,
/// backward pass, slack derivation, then critical-path extraction.
///
/// Pure computation over the in-memory graph; deterministic, so running it
/// twice on an unchanged network yields identical results.
pub fn analyze(network: &mut ScheduleNetwork) -> CriticalPathAnalysis {
    if network.is_empty() {
        return CriticalPathAnalysis::empty();
    }

    let forward = ForwardPass::new(network).execute();
    network.apply_forward(&forward);

    let backward = BackwardPass::new(network).execute(network.project_duration());
    network.apply_backward(&backward);

    let schedule_slack = slack::apply_slack(network);
    critical_path::extract(network, schedule_slack)
}
