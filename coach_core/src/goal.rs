//! Goal construction and validation.
//!
//! Goals are validated once, when built from a [`NewGoal`] draft or updated
//! through [`Goal::validate`]. The engine functions assume valid goals.

use crate::{Error, Goal, GoalProgress, NewGoal, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

/// Lowest accepted target percentage
pub const MIN_TARGET_PERCENTAGE: u8 = 50;

/// Highest accepted target percentage
pub const MAX_TARGET_PERCENTAGE: u8 = 100;

impl Goal {
    /// Build a goal from a draft, rejecting invariant violations
    ///
    /// Duplicate work type ids are collapsed, keeping first-appearance order.
    /// A missing target percentage falls back to the student level default.
    pub fn create(draft: NewGoal) -> Result<Self> {
        let target_percentage = draft
            .target_percentage
            .unwrap_or_else(|| draft.student_level.default_target_percentage());

        let mut work_types: Vec<String> = Vec::with_capacity(draft.work_types.len());
        for id in draft.work_types {
            let id = id.trim().to_string();
            if !id.is_empty() && !work_types.contains(&id) {
                work_types.push(id);
            }
        }

        let goal = Goal {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            cadence: draft.cadence,
            work_types,
            target_percentage,
            student_level: draft.student_level,
            start_date: draft.start_date,
            end_date: draft.end_date,
            is_active: true,
        };

        goal.validate()?;
        tracing::debug!("Created goal {} ({})", goal.name, goal.id);
        Ok(goal)
    }

    /// Check the goal invariants
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("Goal name must not be empty".into()));
        }
        if self.work_types.is_empty() {
            return Err(Error::Validation(format!(
                "Goal '{}' must require at least one work type",
                self.name
            )));
        }
        if !(MIN_TARGET_PERCENTAGE..=MAX_TARGET_PERCENTAGE).contains(&self.target_percentage) {
            return Err(Error::Validation(format!(
                "Goal '{}': target percentage {} outside [{}, {}]",
                self.name, self.target_percentage, MIN_TARGET_PERCENTAGE, MAX_TARGET_PERCENTAGE
            )));
        }
        if self.end_date < self.start_date {
            return Err(Error::Validation(format!(
                "Goal '{}': end date {} is before start date {}",
                self.name, self.end_date, self.start_date
            )));
        }
        Ok(())
    }

    /// Whether the goal requires the given work type
    pub fn requires(&self, work_type_id: &str) -> bool {
        self.work_types.iter().any(|id| id == work_type_id)
    }

    /// Active window for `today`: the cadence window ending today, clipped
    /// to the goal's start and end dates
    ///
    /// Returns None when the clipped window is empty (goal not started yet,
    /// or ended more than a window ago).
    pub fn window(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let span = i64::from(self.cadence.window_days()) - 1;
        let from = (today - Duration::days(span)).max(self.start_date);
        let to = today.min(self.end_date);
        if from > to {
            None
        } else {
            Some((from, to))
        }
    }
}

impl GoalProgress {
    /// Zero-progress record created alongside a new goal
    pub fn zero(goal: &Goal, now: DateTime<Utc>) -> Self {
        Self {
            goal_id: goal.id,
            current_percentage: 0.0,
            completed_days: 0,
            total_days: goal.cadence.window_days(),
            is_completed: false,
            last_updated: now,
        }
    }
}
