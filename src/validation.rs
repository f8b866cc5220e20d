use crate::activity::Activity;
use crate::conflict::ScheduleConflict;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detects circular dependency chains among activities, reported as
/// conflicts rather than errors.
///
/// Iterative depth-first walk along predecessor edges with white/gray/black
/// coloring: linear time, one conflict per distinct cycle, and no recursion,
/// so chains thousands of activities deep cannot overflow the stack.
/// Predecessor ids that do not resolve to an activity are skipped here; the
/// network builder owns referential integrity.
pub fn detect_dependency_conflicts(activities: &[Activity]) -> Vec<ScheduleConflict> {
    let predecessors: HashMap<i32, &[i32]> = activities
        .iter()
        .map(|activity| (activity.id, activity.predecessors.as_slice()))
        .collect();

    let mut ids: Vec<i32> = predecessors.keys().copied().collect();
    ids.sort_unstable();

    let mut colors: HashMap<i32, Color> = ids.iter().map(|&id| (id, Color::White)).collect();
    let mut conflicts: Vec<ScheduleConflict> = Vec::new();

    for &start in &ids {
        if colors.get(&start) != Some(&Color::White) {
            continue;
        }

        // Explicit worklist of (node, next predecessor index); `path` holds
        // the gray chain for cycle extraction.
        let mut stack: Vec<(i32, usize)> = vec![(start, 0)];
        let mut path: Vec<i32> = vec![start];
        colors.insert(start, Color::Gray);

        while let Some(frame) = stack.last_mut() {
            let (id, next_idx) = (frame.0, frame.1);
            let preds = predecessors.get(&id).copied().unwrap_or(&[]);

            if next_idx < preds.len() {
                frame.1 += 1;
                let next = preds[next_idx];
                match colors.get(&next).copied() {
                    // Unknown predecessor id: not a cycle concern.
                    None => {}
                    Some(Color::White) => {
                        colors.insert(next, Color::Gray);
                        stack.push((next, 0));
                        path.push(next);
                    }
                    Some(Color::Gray) => {
                        if let Some(pos) = path.iter().position(|&member| member == next) {
                            let cycle = path[pos..].to_vec();
                            conflicts.push(ScheduleConflict::dependency_violation(
                                conflicts.len() + 1,
                                cycle,
                            ));
                        }
                    }
                    Some(Color::Black) => {}
                }
            } else {
                colors.insert(id, Color::Black);
                stack.pop();
                path.pop();
            }
        }
    }

    conflicts
}
