//! Core domain types for the club training engine.
//!
//! This module defines the plain records shared by every engine component:
//! - Work types and their categories
//! - Goals, cadences and student levels
//! - Progress tracking records
//! - Day and week plans
//! - Training blocks and recommendations
//! - Completion journal records
//! - Persisted club state

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Work Types
// ============================================================================

/// Classification axis of a work type
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkTypeCategory {
    Physical,
    Technical,
    Mental,
    Tactical,
}

impl WorkTypeCategory {
    /// Every category, in canonical order
    pub const ALL: [WorkTypeCategory; 4] = [
        WorkTypeCategory::Physical,
        WorkTypeCategory::Technical,
        WorkTypeCategory::Mental,
        WorkTypeCategory::Tactical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkTypeCategory::Physical => "physical",
            WorkTypeCategory::Technical => "technical",
            WorkTypeCategory::Mental => "mental",
            WorkTypeCategory::Tactical => "tactical",
        }
    }
}

impl fmt::Display for WorkTypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkTypeCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "physical" => Ok(WorkTypeCategory::Physical),
            "technical" => Ok(WorkTypeCategory::Technical),
            "mental" => Ok(WorkTypeCategory::Mental),
            "tactical" => Ok(WorkTypeCategory::Tactical),
            other => Err(crate::Error::Validation(format!(
                "Unknown work type category: {}",
                other
            ))),
        }
    }
}

/// A named, colored category of training effort (e.g., "Reaction Time")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkType {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
    pub category: WorkTypeCategory,
}

// ============================================================================
// Goals
// ============================================================================

/// Recurrence window of a goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Quarterly,
}

impl Cadence {
    /// Canonical window length in days
    pub fn window_days(&self) -> u32 {
        match self {
            Cadence::Daily => 1,
            Cadence::Weekly => 7,
            Cadence::Quarterly => 90,
        }
    }
}

impl FromStr for Cadence {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            "quarterly" => Ok(Cadence::Quarterly),
            other => Err(crate::Error::Validation(format!(
                "Unknown cadence: {}",
                other
            ))),
        }
    }
}

/// Level of the students a goal is written for
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StudentLevel {
    Beginner,
    Intermediate,
    Advanced,
    Competitor,
    Elite,
}

impl StudentLevel {
    /// Target percentage used when a new goal doesn't specify one
    pub fn default_target_percentage(&self) -> u8 {
        match self {
            StudentLevel::Beginner | StudentLevel::Intermediate => 90,
            StudentLevel::Advanced | StudentLevel::Competitor | StudentLevel::Elite => 95,
        }
    }
}

impl FromStr for StudentLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(StudentLevel::Beginner),
            "intermediate" => Ok(StudentLevel::Intermediate),
            "advanced" => Ok(StudentLevel::Advanced),
            "competitor" => Ok(StudentLevel::Competitor),
            "elite" => Ok(StudentLevel::Elite),
            other => Err(crate::Error::Validation(format!(
                "Unknown student level: {}",
                other
            ))),
        }
    }
}

/// A target level of training coverage over a time window
///
/// Construct through [`Goal::create`] so the invariants hold.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cadence: Cadence,
    /// Required work type ids, unique, in order of first appearance
    pub work_types: Vec<String>,
    pub target_percentage: u8,
    pub student_level: StudentLevel,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

/// Unvalidated goal input as collected by the host
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewGoal {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cadence: Cadence,
    pub work_types: Vec<String>,
    /// Falls back to the student level's default when unset
    pub target_percentage: Option<u8>,
    pub student_level: StudentLevel,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Derived tracking record, one per goal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub current_percentage: f64,
    pub completed_days: u32,
    pub total_days: u32,
    pub is_completed: bool,
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// Week Planning
// ============================================================================

/// One calendar day's assignment within a week plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DayPlan {
    pub date: NaiveDate,
    /// Assigned work type ids; order is irrelevant, duplicates are never stored
    pub work_types: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub is_completed: bool,
    pub completion_percentage: f64,
}

/// Seven consecutive day plans starting on a Monday
///
/// Construct through [`WeekPlan::new`] or [`WeekPlan::blank`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeekPlan {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayPlan>,
    pub is_template: bool,
}

// ============================================================================
// Blocks and Recommendations
// ============================================================================

/// A reusable, tagged bundle of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingBlock {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tags: Vec<String>,
}

/// What a recommendation points at
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    WorkType,
    Block,
}

/// A single ranked suggestion produced by the recommendation engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub id: String,
    pub kind: RecommendationKind,
    pub name: String,
    pub description: String,
    /// Static rule score, 0-100
    pub confidence: u8,
    pub reason: String,
    pub related_work_type_id: Option<String>,
    pub related_block_id: Option<String>,
}

// ============================================================================
// Completion Journal
// ============================================================================

/// A work type marked complete on a given day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletionRecord {
    pub id: Uuid,
    pub work_type_id: String,
    pub completed_on: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// Create a fresh record stamped with the current time
    pub fn new(work_type_id: impl Into<String>, completed_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            work_type_id: work_type_id.into(),
            completed_on,
            recorded_at: Utc::now(),
        }
    }
}

// ============================================================================
// Club State
// ============================================================================

/// Everything the host persists between runs
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TrainingState {
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Progress record per goal id
    #[serde(default)]
    pub progress: BTreeMap<Uuid, GoalProgress>,
    #[serde(default)]
    pub week_plans: Vec<WeekPlan>,
    /// Removal time per work type id; completions recorded up to then never count again
    #[serde(default)]
    pub removed_work_types: BTreeMap<String, DateTime<Utc>>,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The club's work type catalog and block library, in display order
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub work_types: Vec<WorkType>,
    pub blocks: Vec<TrainingBlock>,
}

impl Catalog {
    /// Look up a work type by id
    pub fn work_type(&self, id: &str) -> Option<&WorkType> {
        self.work_types.iter().find(|wt| wt.id == id)
    }
}
