//! Default catalog of work types and training blocks.
//!
//! This module provides the built-in catalog a fresh club starts from.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds a fresh, owned copy of the default catalog
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn work_type(
    id: &str,
    name: &str,
    color: &str,
    category: WorkTypeCategory,
    description: &str,
) -> WorkType {
    WorkType {
        id: id.into(),
        name: name.into(),
        color: color.into(),
        description: description.into(),
        category,
    }
}

fn block(id: &str, name: &str, description: &str, tags: &[&str]) -> TrainingBlock {
    TrainingBlock {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn build_default_catalog_internal() -> Catalog {
    // ========================================================================
    // Work Types (two per category)
    // ========================================================================

    let work_types = vec![
        work_type(
            "endurance",
            "Endurance",
            "#d94f3d",
            WorkTypeCategory::Physical,
            "Sustained aerobic work across full rounds",
        ),
        work_type(
            "strength",
            "Strength",
            "#b8336a",
            WorkTypeCategory::Physical,
            "Loaded and bodyweight strength work",
        ),
        work_type(
            "footwork",
            "Footwork",
            "#2f7ed8",
            WorkTypeCategory::Technical,
            "Stance, angles and movement patterns",
        ),
        work_type(
            "combinations",
            "Combinations",
            "#1aadce",
            WorkTypeCategory::Technical,
            "Linked techniques on pads and bags",
        ),
        work_type(
            "reaction_time",
            "Reaction Time",
            "#8bbc21",
            WorkTypeCategory::Mental,
            "Responding to visual and partner cues",
        ),
        work_type(
            "focus",
            "Focus",
            "#77a1e5",
            WorkTypeCategory::Mental,
            "Concentration under fatigue",
        ),
        work_type(
            "ring_craft",
            "Ring Craft",
            "#f28f43",
            WorkTypeCategory::Tactical,
            "Controlling distance and position",
        ),
        work_type(
            "game_planning",
            "Game Planning",
            "#a47d7c",
            WorkTypeCategory::Tactical,
            "Reading opponents and adapting strategy",
        ),
    ];

    // ========================================================================
    // Training Blocks
    // ========================================================================

    let blocks = vec![
        block(
            "ladder_series",
            "Agility Ladder Series",
            "Ten minutes of ladder patterns",
            &["footwork", "agility", "warm-up"],
        ),
        block(
            "light_drills",
            "Light Drills",
            "Partner tap drills on a light signal",
            &["reaction time", "partner"],
        ),
        block(
            "pad_rounds",
            "Pad Rounds",
            "Three-minute pad rounds with called combinations",
            &["combinations", "endurance", "conditioning"],
        ),
        block(
            "circuit",
            "Strength Circuit",
            "Kettlebell and bodyweight circuit",
            &["strength", "conditioning"],
        ),
        block(
            "situational_sparring",
            "Situational Sparring",
            "Sparring from set positions with a focus cue",
            &["ring craft", "game planning", "focus"],
        ),
    ];

    Catalog { work_types, blocks }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for wt in &self.work_types {
            if wt.id.trim().is_empty() {
                errors.push(format!("Work type '{}' has empty ID", wt.name));
            }
            if wt.name.trim().is_empty() {
                errors.push(format!("Work type '{}' has empty name", wt.id));
            }
            if !seen.insert(wt.id.as_str()) {
                errors.push(format!("Duplicate work type ID '{}'", wt.id));
            }
        }

        let mut seen = HashSet::new();
        for block in &self.blocks {
            if block.id.trim().is_empty() {
                errors.push(format!("Block '{}' has empty ID", block.name));
            }
            if block.name.trim().is_empty() {
                errors.push(format!("Block '{}' has empty name", block.id));
            }
            if block.tags.is_empty() {
                errors.push(format!("Block '{}' has no tags", block.id));
            }
            if !seen.insert(block.id.as_str()) {
                errors.push(format!("Duplicate block ID '{}'", block.id));
            }
        }

        errors
    }
}
