#![forbid(unsafe_code)]

//! Core domain model and training engine for club coaching.
//!
//! This crate provides:
//! - Domain types (work types, goals, week plans, recommendations)
//! - Goal progress calculation
//! - Weekly balance analysis
//! - Recommendation ranking
//! - Cascading entity mutations
//! - Persistence (state file, completion journal, CSV archive)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod goal;
pub mod week;
pub mod progress;
pub mod balance;
pub mod recommend;
pub mod cascade;
pub mod journal;
pub mod archive;
pub mod history;
pub mod state;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use progress::{compute_progress, compute_progress_at};
pub use balance::{analyze_balance, analyze_balance_with, BalanceReport, BalanceRules, BalanceWarning, DistributionEntry};
pub use recommend::{recommend, recommend_with, RecommendationRules};
pub use cascade::CascadeReport;
pub use journal::{CompletionSink, JsonlSink};
pub use history::{completed_in_window, count_completed_days, load_recent_completions};
