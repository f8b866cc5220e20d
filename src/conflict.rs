use serde::{Deserialize, Serialize};

/// Categories of structural scheduling conflicts. Only dependency violations
/// are detected today; the remaining kinds are reserved for the surrounding
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    DependencyViolation,
    ResourceOverallocation,
    DateConstraint,
    CalendarConflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// A structural problem in a schedule, reported as data rather than raised
/// as an error so callers can choose between blocking and warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub id: String,
    pub kind: ConflictKind,
    pub severity: ConflictSeverity,
    pub description: String,
    pub affected_activities: Vec<i32>,
    pub auto_resolvable: bool,
}

impl ScheduleConflict {
    /// A circular-dependency conflict over the given cycle members, in walk
    /// order. Never auto-resolvable: breaking a cycle requires a human to
    /// pick which edge is wrong.
    pub fn dependency_violation(ordinal: usize, cycle: Vec<i32>) -> Self {
        let chain = cycle
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        let back_to = cycle.first().map(ToString::to_string).unwrap_or_default();
        Self {
            id: format!("dependency-violation-{ordinal}"),
            kind: ConflictKind::DependencyViolation,
            severity: ConflictSeverity::High,
            description: format!("circular dependency detected: {chain} -> {back_to}"),
            affected_activities: cycle,
            auto_resolvable: false,
        }
    }
}
