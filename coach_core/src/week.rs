//! Week plan construction, templates and day completion.

use crate::{CompletionRecord, DayPlan, Error, Result, WeekPlan};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;
use uuid::Uuid;

/// Number of days in every week plan
pub const DAYS_PER_WEEK: usize = 7;

impl DayPlan {
    /// An empty, uncompleted day
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            work_types: Vec::new(),
            notes: String::new(),
            is_completed: false,
            completion_percentage: 0.0,
        }
    }

    /// Assign a work type to this day; returns false if it was already assigned
    pub fn assign(&mut self, work_type_id: &str) -> bool {
        if self.work_types.iter().any(|id| id == work_type_id) {
            return false;
        }
        self.work_types.push(work_type_id.to_string());
        true
    }

    /// Remove a work type from this day; returns true if it was assigned
    pub fn unassign(&mut self, work_type_id: &str) -> bool {
        let before = self.work_types.len();
        self.work_types.retain(|id| id != work_type_id);
        self.work_types.len() != before
    }

    pub fn contains(&self, work_type_id: &str) -> bool {
        self.work_types.iter().any(|id| id == work_type_id)
    }
}

impl WeekPlan {
    /// Build a week plan from seven day plans
    ///
    /// Rejects plans that don't have exactly seven days, don't start on a
    /// Monday, or whose dates aren't consecutive. Duplicate work type ids
    /// within a day are collapsed.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        mut days: Vec<DayPlan>,
        is_template: bool,
    ) -> Result<Self> {
        let name = name.into();

        if days.len() != DAYS_PER_WEEK {
            return Err(Error::Validation(format!(
                "Week plan '{}' must have {} days, got {}",
                name,
                DAYS_PER_WEEK,
                days.len()
            )));
        }

        let start_date = days[0].date;
        if start_date.weekday() != Weekday::Mon {
            return Err(Error::Validation(format!(
                "Week plan '{}' must start on a Monday, {} is a {}",
                name,
                start_date,
                start_date.weekday()
            )));
        }

        for (i, pair) in days.windows(2).enumerate() {
            if pair[1].date != pair[0].date + Duration::days(1) {
                return Err(Error::Validation(format!(
                    "Week plan '{}': day {} ({}) does not follow day {} ({})",
                    name,
                    i + 1,
                    pair[1].date,
                    i,
                    pair[0].date
                )));
            }
        }

        for day in &mut days {
            let mut seen = HashSet::new();
            day.work_types.retain(|id| seen.insert(id.clone()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: description.into(),
            start_date,
            end_date: start_date + Duration::days(6),
            days,
            is_template,
        })
    }

    /// An empty week starting on the given Monday
    pub fn blank(name: impl Into<String>, monday: NaiveDate) -> Result<Self> {
        let days = (0..DAYS_PER_WEEK as i64)
            .map(|offset| DayPlan::new(monday + Duration::days(offset)))
            .collect();
        Self::new(name, String::new(), days, false)
    }

    /// Copy a template's assignments onto a new week starting on `monday`
    ///
    /// Notes are carried over; completion state is reset.
    pub fn instantiate(
        template: &WeekPlan,
        name: impl Into<String>,
        monday: NaiveDate,
    ) -> Result<Self> {
        let days = template
            .days
            .iter()
            .enumerate()
            .map(|(offset, day)| DayPlan {
                date: monday + Duration::days(offset as i64),
                work_types: day.work_types.clone(),
                notes: day.notes.clone(),
                is_completed: false,
                completion_percentage: 0.0,
            })
            .collect();

        let week = Self::new(name, template.description.clone(), days, false)?;
        tracing::debug!(
            "Instantiated week {} from template {}",
            week.start_date,
            template.name
        );
        Ok(week)
    }

    /// Index of the day plan for a date, if the date falls in this week
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|d| d.date == date)
    }

    /// Refresh each day's completion from the completion journal
    ///
    /// A day's completion percentage is the share of its assigned work types
    /// with a record on that date. Days with nothing assigned stay at zero.
    pub fn apply_completions(&mut self, records: &[CompletionRecord]) {
        for day in &mut self.days {
            let done: HashSet<&str> = records
                .iter()
                .filter(|r| r.completed_on == day.date)
                .map(|r| r.work_type_id.as_str())
                .collect();

            if day.work_types.is_empty() {
                day.completion_percentage = 0.0;
                day.is_completed = false;
                continue;
            }

            let hit = day
                .work_types
                .iter()
                .filter(|id| done.contains(id.as_str()))
                .count();
            day.completion_percentage = hit as f64 / day.work_types.len() as f64 * 100.0;
            day.is_completed = hit == day.work_types.len();
        }
    }
}
