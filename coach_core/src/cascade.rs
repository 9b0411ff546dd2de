//! Entity mutations that keep cross-references consistent.
//!
//! Every change that can leave a dangling id goes through one method here,
//! so goals, day plans, progress records and derived completion sets are
//! updated together before the state is saved once.

use crate::history::{completed_in_window, count_completed_days};
use crate::progress::compute_progress_at;
use crate::{
    CompletionRecord, Error, Goal, GoalProgress, Result, TrainingState, WeekPlan, WorkType,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// What a work type removal touched
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CascadeReport {
    pub removed_work_type: String,
    /// Goals that lost the work type and survived
    pub goals_updated: Vec<Uuid>,
    /// Goals deleted because the work type was their last requirement
    pub goals_removed: Vec<Uuid>,
    /// Day plans the work type was unassigned from
    pub days_updated: usize,
}

impl TrainingState {
    pub fn goal(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn week_plan(&self, id: Uuid) -> Option<&WeekPlan> {
        self.week_plans.iter().find(|w| w.id == id)
    }

    pub fn week_plan_mut(&mut self, id: Uuid) -> Option<&mut WeekPlan> {
        self.week_plans.iter_mut().find(|w| w.id == id)
    }

    /// Add a work type to the catalog
    pub fn add_work_type(&mut self, work_type: WorkType) -> Result<()> {
        if work_type.id.trim().is_empty() || work_type.name.trim().is_empty() {
            return Err(Error::Validation(
                "Work type needs a non-empty id and name".into(),
            ));
        }
        if self.catalog.work_type(&work_type.id).is_some() {
            return Err(Error::Validation(format!(
                "Work type '{}' already exists",
                work_type.id
            )));
        }
        tracing::info!("Added work type {} ({})", work_type.name, work_type.id);
        self.catalog.work_types.push(work_type);
        Ok(())
    }

    /// Remove a work type and every reference to it
    ///
    /// The id is dropped from every goal and day plan. Goals left without
    /// any work type are deleted with their progress; the surviving goals
    /// that changed have their progress recomputed from `records`.
    pub fn remove_work_type(
        &mut self,
        id: &str,
        records: &[CompletionRecord],
        today: NaiveDate,
    ) -> Result<CascadeReport> {
        let before = self.catalog.work_types.len();
        self.catalog.work_types.retain(|wt| wt.id != id);
        if self.catalog.work_types.len() == before {
            return Err(Error::NotFound(format!("work type '{}'", id)));
        }

        self.removed_work_types.insert(id.to_string(), Utc::now());

        let mut report = CascadeReport {
            removed_work_type: id.to_string(),
            ..Default::default()
        };

        for goal in &mut self.goals {
            let had = goal.work_types.len();
            goal.work_types.retain(|wt| wt != id);
            if goal.work_types.len() == had {
                continue;
            }
            if goal.work_types.is_empty() {
                report.goals_removed.push(goal.id);
            } else {
                report.goals_updated.push(goal.id);
            }
        }

        for goal_id in &report.goals_removed {
            tracing::warn!("Goal {} has no work types left, removing it", goal_id);
            self.goals.retain(|g| g.id != *goal_id);
            self.progress.remove(goal_id);
        }

        for week in &mut self.week_plans {
            for day in &mut week.days {
                if day.unassign(id) {
                    report.days_updated += 1;
                }
            }
        }

        let live = self.live_completions(records);
        let now = Utc::now();
        for goal_id in &report.goals_updated {
            if let Some(goal) = self.goals.iter().find(|g| g.id == *goal_id) {
                let progress = progress_from_records(goal, &live, today, now);
                self.progress.insert(goal.id, progress);
            }
        }

        tracing::info!(
            "Removed work type {}: {} goals updated, {} goals removed, {} days updated",
            id,
            report.goals_updated.len(),
            report.goals_removed.len(),
            report.days_updated
        );

        Ok(report)
    }

    /// Add a validated goal with zero progress
    ///
    /// Every required work type must exist in the catalog at creation time.
    pub fn add_goal(&mut self, goal: Goal) -> Result<()> {
        goal.validate()?;
        if let Some(missing) = goal
            .work_types
            .iter()
            .find(|id| self.catalog.work_type(id).is_none())
        {
            return Err(Error::NotFound(format!("work type '{}'", missing)));
        }

        self.progress
            .insert(goal.id, GoalProgress::zero(&goal, Utc::now()));
        tracing::info!("Added goal {} ({})", goal.name, goal.id);
        self.goals.push(goal);
        Ok(())
    }

    /// Hard-delete a goal and its progress record
    pub fn remove_goal(&mut self, id: Uuid) -> Result<Goal> {
        let pos = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("goal {}", id)))?;
        let goal = self.goals.remove(pos);
        self.progress.remove(&id);
        tracing::info!("Removed goal {} ({})", goal.name, id);
        Ok(goal)
    }

    /// Mark a goal inactive, keeping its history
    pub fn deactivate_goal(&mut self, id: Uuid) -> Result<()> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("goal {}", id)))?;
        goal.is_active = false;
        tracing::info!("Deactivated goal {} ({})", goal.name, id);
        Ok(())
    }

    /// Add a week plan; every assigned work type must exist in the catalog
    pub fn add_week_plan(&mut self, week: WeekPlan) -> Result<()> {
        for day in &week.days {
            if let Some(missing) = day
                .work_types
                .iter()
                .find(|id| self.catalog.work_type(id).is_none())
            {
                return Err(Error::NotFound(format!("work type '{}'", missing)));
            }
        }
        tracing::info!("Added week plan {} starting {}", week.name, week.start_date);
        self.week_plans.push(week);
        Ok(())
    }

    /// Completion records whose work type is in the catalog
    ///
    /// Records of a work type that was removed are dropped if they were
    /// recorded at or before the removal, even after the id is re-added.
    pub fn live_completions(&self, records: &[CompletionRecord]) -> Vec<CompletionRecord> {
        let known: HashSet<&str> = self
            .catalog
            .work_types
            .iter()
            .map(|wt| wt.id.as_str())
            .collect();
        records
            .iter()
            .filter(|r| known.contains(r.work_type_id.as_str()))
            .filter(|r| {
                self.removed_work_types
                    .get(&r.work_type_id)
                    .map_or(true, |removed_at| r.recorded_at > *removed_at)
            })
            .cloned()
            .collect()
    }

    /// Work types completed in a goal's current window, ignoring removed ones
    pub fn completed_for_goal(
        &self,
        goal: &Goal,
        records: &[CompletionRecord],
        today: NaiveDate,
    ) -> HashSet<String> {
        completed_in_window(goal, &self.live_completions(records), today)
    }

    /// Recompute progress for every goal and refresh week day completion
    pub fn refresh_progress(&mut self, records: &[CompletionRecord], today: NaiveDate) {
        let live = self.live_completions(records);
        let now = Utc::now();

        for goal in &self.goals {
            let progress = progress_from_records(goal, &live, today, now);
            self.progress.insert(goal.id, progress);
        }

        for week in &mut self.week_plans {
            week.apply_completions(&live);
        }

        tracing::debug!("Refreshed progress for {} goals", self.goals.len());
    }
}

fn progress_from_records(
    goal: &Goal,
    records: &[CompletionRecord],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> GoalProgress {
    let completed = completed_in_window(goal, records, today);
    let days = count_completed_days(goal, records, today);
    compute_progress_at(goal, &completed, days, now)
}
