//! Recommendation engine for the next training focus.
//!
//! Suggestions are generated in three passes and appended in order:
//!
//! 1. **Required and missing** work types (confidence 95)
//! 2. **Blocks** tagged with a missing work type's name (confidence 85)
//! 3. **Variety**: catalog work types outside the goal, not yet done (confidence 60)
//!
//! The final list is stably sorted by confidence, so pass order decides
//! position among equal scores. Filtering by confidence or search text is
//! left to the caller.

use crate::{Goal, Recommendation, RecommendationKind, TrainingBlock, WorkType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Confidence of a required work type that hasn't been done
pub const REQUIRED_CONFIDENCE: u8 = 95;

/// Confidence of a block matching a missing required work type
pub const BLOCK_CONFIDENCE: u8 = 85;

/// Confidence of a variety suggestion
pub const VARIETY_CONFIDENCE: u8 = 60;

pub const REQUIRED_REASON: &str = "required by the goal and not yet completed.";
pub const VARIETY_REASON: &str = "adds variety to training.";

/// Tunable limits for the recommendation engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecommendationRules {
    /// Maximum number of variety suggestions
    #[serde(default = "default_variety_limit")]
    pub variety_limit: usize,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            variety_limit: default_variety_limit(),
        }
    }
}

fn default_variety_limit() -> usize {
    3
}

/// Recommend with the default limits
pub fn recommend(
    goal: Option<&Goal>,
    catalog: &[WorkType],
    completed_work_type_ids: &HashSet<String>,
    blocks: &[TrainingBlock],
) -> Vec<Recommendation> {
    recommend_with(
        goal,
        catalog,
        completed_work_type_ids,
        blocks,
        &RecommendationRules::default(),
    )
}

/// Produce ranked suggestions for a goal
///
/// Returns an empty list when no goal is selected. Required ids missing from
/// the catalog are skipped since there is no name to show or match on.
pub fn recommend_with(
    goal: Option<&Goal>,
    catalog: &[WorkType],
    completed_work_type_ids: &HashSet<String>,
    blocks: &[TrainingBlock],
    rules: &RecommendationRules,
) -> Vec<Recommendation> {
    let Some(goal) = goal else {
        tracing::debug!("No goal selected, nothing to recommend");
        return Vec::new();
    };

    let mut recommendations = Vec::new();

    // Pass 1: required work types not yet completed
    let missing: Vec<&WorkType> = goal
        .work_types
        .iter()
        .filter(|id| !completed_work_type_ids.contains(id.as_str()))
        .filter_map(|id| {
            let found = catalog.iter().find(|wt| &wt.id == id);
            if found.is_none() {
                tracing::debug!("Goal {} references unknown work type {}", goal.id, id);
            }
            found
        })
        .collect();

    for wt in &missing {
        recommendations.push(Recommendation {
            id: format!("work_type:{}", wt.id),
            kind: RecommendationKind::WorkType,
            name: wt.name.clone(),
            description: wt.description.clone(),
            confidence: REQUIRED_CONFIDENCE,
            reason: REQUIRED_REASON.into(),
            related_work_type_id: Some(wt.id.clone()),
            related_block_id: None,
        });
    }

    // Pass 2: blocks tagged with a missing work type's name
    for wt in &missing {
        let needle = wt.name.to_lowercase();
        for block in blocks.iter().filter(|b| block_matches(b, &needle)) {
            recommendations.push(Recommendation {
                id: format!("block:{}:{}", block.id, wt.id),
                kind: RecommendationKind::Block,
                name: block.name.clone(),
                description: block.description.clone(),
                confidence: BLOCK_CONFIDENCE,
                reason: format!("Trains {}, which the goal still needs", wt.name),
                related_work_type_id: Some(wt.id.clone()),
                related_block_id: Some(block.id.clone()),
            });
        }
    }

    // Pass 3: variety from outside the goal
    for wt in catalog
        .iter()
        .filter(|wt| !goal.requires(&wt.id) && !completed_work_type_ids.contains(&wt.id))
        .take(rules.variety_limit)
    {
        recommendations.push(Recommendation {
            id: format!("variety:{}", wt.id),
            kind: RecommendationKind::WorkType,
            name: wt.name.clone(),
            description: wt.description.clone(),
            confidence: VARIETY_CONFIDENCE,
            reason: VARIETY_REASON.into(),
            related_work_type_id: Some(wt.id.clone()),
            related_block_id: None,
        });
    }

    // Stable: ties keep generation order
    recommendations.sort_by(|a, b| b.confidence.cmp(&a.confidence));

    tracing::info!(
        "Generated {} recommendations for goal {}",
        recommendations.len(),
        goal.name
    );

    recommendations
}

/// Case-insensitive substring match of a lowercased name against block tags
fn block_matches(block: &TrainingBlock, needle: &str) -> bool {
    !needle.is_empty()
        && block
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}
