//! Goal progress calculation.
//!
//! Progress is a coverage ratio over the goal's required work types, not a
//! time-based ratio:
//! - `current_percentage` = required ids present in the completed set / required ids * 100
//! - `is_completed` once that reaches the goal's target percentage
//! - `total_days` is the cadence window length; `completed_days` is supplied
//!   by the caller (see [`crate::history::count_completed_days`])

use crate::{Goal, GoalProgress};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Compute a goal's progress as of now
pub fn compute_progress(
    goal: &Goal,
    completed_work_type_ids: &HashSet<String>,
    completed_days: u32,
) -> GoalProgress {
    compute_progress_at(goal, completed_work_type_ids, completed_days, Utc::now())
}

/// Compute a goal's progress, stamping it with `now`
///
/// Inactive goals are computed like any other. Required ids that no longer
/// exist in the catalog still count toward the ratio.
pub fn compute_progress_at(
    goal: &Goal,
    completed_work_type_ids: &HashSet<String>,
    completed_days: u32,
    now: DateTime<Utc>,
) -> GoalProgress {
    let total_days = goal.cadence.window_days();
    let required = goal.work_types.len();
    let covered = goal
        .work_types
        .iter()
        .filter(|id| completed_work_type_ids.contains(id.as_str()))
        .count();

    // Validated goals always require at least one work type
    let current_percentage = if required == 0 {
        0.0
    } else {
        (covered as f64 / required as f64 * 100.0).max(0.0)
    };
    let is_completed = current_percentage >= f64::from(goal.target_percentage);

    tracing::debug!(
        "Progress for goal {}: {}/{} work types ({:.1}%), target {}%",
        goal.id,
        covered,
        required,
        current_percentage,
        goal.target_percentage
    );

    GoalProgress {
        goal_id: goal.id,
        current_percentage,
        completed_days: completed_days.min(total_days),
        total_days,
        is_completed,
        last_updated: now,
    }
}
