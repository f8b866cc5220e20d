use crate::activity::Activity;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct ActivityValidationError {
    message: String,
}

impl ActivityValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ActivityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ActivityValidationError {}

pub fn validate_activity(activity: &Activity) -> Result<(), ActivityValidationError> {
    if activity.name.trim().is_empty() {
        return Err(ActivityValidationError::new(format!(
            "activity {} requires a non-empty name",
            activity.id
        )));
    }

    if !activity.percent_complete.is_finite()
        || activity.percent_complete < 0.0
        || activity.percent_complete > 100.0
    {
        return Err(ActivityValidationError::new(format!(
            "activity {} has invalid percent_complete {} (must be between 0 and 100)",
            activity.id, activity.percent_complete
        )));
    }

    if activity.predecessors.contains(&activity.id) {
        return Err(ActivityValidationError::new(format!(
            "activity {} lists itself as a predecessor",
            activity.id
        )));
    }

    if let Some(parent) = activity.parent_id {
        if parent == activity.id {
            return Err(ActivityValidationError::new(format!(
                "activity {} lists itself as its parent",
                activity.id
            )));
        }
    }

    Ok(())
}

/// Collection-level checks: unique ids plus each activity's own invariants.
/// Predecessor referential integrity is the network builder's job, since an
/// activity can be inserted before the activities it depends on.
pub fn validate_activity_collection(
    activities: &[Activity],
) -> Result<(), ActivityValidationError> {
    let mut seen_ids = HashSet::with_capacity(activities.len());
    for activity in activities {
        if !seen_ids.insert(activity.id) {
            return Err(ActivityValidationError::new(format!(
                "duplicate activity id {}",
                activity.id
            )));
        }
        validate_activity(activity)?;
    }
    Ok(())
}
