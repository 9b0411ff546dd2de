//! Completion history across the journal and the CSV archive.
//!
//! Also derives the per-goal inputs of the progress calculator: which
//! required work types were done inside the goal's window, and on how many
//! distinct days.

use crate::archive::CsvRow;
use crate::{CompletionRecord, Goal, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

impl TryFrom<CsvRow> for CompletionRecord {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let completed_on = row
            .completed_on
            .parse::<NaiveDate>()
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?;

        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)
            .map_err(|e| crate::Error::Other(format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(CompletionRecord {
            id,
            work_type_id: row.work_type_id,
            completed_on,
            recorded_at,
        })
    }
}

/// Load completions from the last `days` days (inclusive of `today`)
///
/// Returns records sorted by completion date, newest first. Records that
/// appear in both the journal and the archive are kept once.
pub fn load_recent_completions(
    journal_path: &Path,
    csv_path: &Path,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<CompletionRecord>> {
    let cutoff = today - Duration::days(i64::from(days.max(1)) - 1);
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    if journal_path.exists() {
        for record in crate::journal::read_completions(journal_path)? {
            if record.completed_on >= cutoff && seen_ids.insert(record.id) {
                records.push(record);
            }
        }
        tracing::debug!("Loaded {} completions from journal", records.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for record in load_completions_from_csv(csv_path)? {
            if record.completed_on >= cutoff && seen_ids.insert(record.id) {
                records.push(record);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} completions from CSV", csv_count);
    }

    records.sort_by(|a, b| {
        b.completed_on
            .cmp(&a.completed_on)
            .then(b.recorded_at.cmp(&a.recorded_at))
    });

    tracing::info!(
        "Loaded {} completions from the last {} days",
        records.len(),
        days
    );

    Ok(records)
}

fn load_completions_from_csv(path: &Path) -> Result<Vec<CompletionRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match CompletionRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Failed to parse CSV row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row: {}", e),
        }
    }

    Ok(records)
}

fn in_goal_window<'a>(
    goal: &Goal,
    records: &'a [CompletionRecord],
    today: NaiveDate,
) -> impl Iterator<Item = &'a CompletionRecord> + 'a {
    let window = goal.window(today);
    records.iter().filter(move |r| {
        window.is_some_and(|(from, to)| r.completed_on >= from && r.completed_on <= to)
    })
}

/// Distinct days in the goal's window with at least one required work type done
pub fn count_completed_days(goal: &Goal, records: &[CompletionRecord], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = in_goal_window(goal, records, today)
        .filter(|r| goal.requires(&r.work_type_id))
        .map(|r| r.completed_on)
        .collect();
    days.len() as u32
}

/// Every work type completed inside the goal's window
pub fn completed_in_window(
    goal: &Goal,
    records: &[CompletionRecord],
    today: NaiveDate,
) -> HashSet<String> {
    in_goal_window(goal, records, today)
        .map(|r| r.work_type_id.clone())
        .collect()
}
