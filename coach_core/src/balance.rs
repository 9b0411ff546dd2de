//! Weekly balance analysis.
//!
//! Counts how many days of a week each catalog work type is assigned to and
//! flags two kinds of imbalance:
//! 1. **Over-concentration**: a work type on more than half of the days
//! 2. **Category gap**: a catalog category with nothing assigned all week

use crate::week::DAYS_PER_WEEK;
use crate::{WeekPlan, WorkType, WorkTypeCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Tunable thresholds for the balance analyzer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BalanceRules {
    /// Share of days (strictly) above which a work type is over-represented
    #[serde(default = "default_over_concentration_percent")]
    pub over_concentration_percent: f64,
}

impl Default for BalanceRules {
    fn default() -> Self {
        Self {
            over_concentration_percent: default_over_concentration_percent(),
        }
    }
}

fn default_over_concentration_percent() -> f64 {
    50.0
}

/// How often one work type appears across the week
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DistributionEntry {
    pub work_type: WorkType,
    /// Days whose assignments include this work type
    pub count: usize,
    /// `count / 7 * 100`
    pub percentage: f64,
}

/// A detected imbalance
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BalanceWarning {
    OverConcentrated {
        work_type_id: String,
        work_type_name: String,
        percentage: f64,
    },
    CategoryGap {
        category: WorkTypeCategory,
    },
}

impl fmt::Display for BalanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceWarning::OverConcentrated {
                work_type_name,
                percentage,
                ..
            } => write!(
                f,
                "{} is over-represented ({:.1}% of the week)",
                work_type_name, percentage
            ),
            BalanceWarning::CategoryGap { category } => {
                write!(f, "No {} work is scheduled this week", category)
            }
        }
    }
}

/// Result of analyzing one week
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct BalanceReport {
    /// One entry per catalog work type, most frequent first
    pub distribution: Vec<DistributionEntry>,
    pub warnings: Vec<BalanceWarning>,
}

impl BalanceReport {
    /// Warnings rendered as display strings
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Analyze a week with the default thresholds
pub fn analyze_balance(week: &WeekPlan, catalog: &[WorkType]) -> BalanceReport {
    analyze_balance_with(week, catalog, &BalanceRules::default())
}

/// Analyze a week against the catalog
///
/// Assignments referencing ids missing from the catalog are not counted.
/// Distribution ties keep catalog order.
pub fn analyze_balance_with(
    week: &WeekPlan,
    catalog: &[WorkType],
    rules: &BalanceRules,
) -> BalanceReport {
    let mut distribution: Vec<DistributionEntry> = catalog
        .iter()
        .map(|wt| {
            let count = week.days.iter().filter(|day| day.contains(&wt.id)).count();
            DistributionEntry {
                work_type: wt.clone(),
                count,
                percentage: count as f64 / DAYS_PER_WEEK as f64 * 100.0,
            }
        })
        .collect();

    // sort_by is stable, so equal counts keep catalog order
    distribution.sort_by(|a, b| b.count.cmp(&a.count));

    let mut warnings = Vec::new();

    // Rule 1: over-concentration
    for entry in &distribution {
        if entry.percentage > rules.over_concentration_percent {
            tracing::debug!(
                "{} assigned on {} of {} days",
                entry.work_type.name,
                entry.count,
                DAYS_PER_WEEK
            );
            warnings.push(BalanceWarning::OverConcentrated {
                work_type_id: entry.work_type.id.clone(),
                work_type_name: entry.work_type.name.clone(),
                percentage: entry.percentage,
            });
        }
    }

    // Rule 2: categories in the catalog with nothing scheduled
    let in_catalog: BTreeSet<WorkTypeCategory> = catalog.iter().map(|wt| wt.category).collect();
    let covered: BTreeSet<WorkTypeCategory> = distribution
        .iter()
        .filter(|e| e.count > 0)
        .map(|e| e.work_type.category)
        .collect();

    for category in in_catalog.difference(&covered) {
        warnings.push(BalanceWarning::CategoryGap {
            category: *category,
        });
    }

    tracing::info!(
        "Balance for week {}: {} work types, {} warnings",
        week.start_date,
        distribution.len(),
        warnings.len()
    );

    BalanceReport {
        distribution,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wt(id: &str, category: WorkTypeCategory) -> WorkType {
        WorkType {
            id: id.into(),
            name: id.to_uppercase(),
            color: "#000000".into(),
            description: String::new(),
            category,
        }
    }

    fn week() -> WeekPlan {
        WeekPlan::blank("Week", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap()
    }

    fn catalog() -> Vec<WorkType> {
        vec![
            wt("wt1", WorkTypeCategory::Physical),
            wt("wt2", WorkTypeCategory::Technical),
            wt("wt3", WorkTypeCategory::Mental),
        ]
    }

    #[test]
    fn test_five_of_seven_days_warns() {
        let mut w = week();
        for day in w.days.iter_mut().take(5) {
            day.assign("wt1");
        }

        let report = analyze_balance(&w, &catalog());

        let entry = &report.distribution[0];
        assert_eq!(entry.work_type.id, "wt1");
        assert_eq!(entry.count, 5);
        assert!((entry.percentage - 71.428).abs() < 0.01);
        assert!(report.warnings.iter().any(|warning| matches!(
            warning,
            BalanceWarning::OverConcentrated { work_type_id, .. } if work_type_id == "wt1"
        )));
    }

    #[test]
    fn test_all_week_is_hundred_percent() {
        let mut w = week();
        for day in &mut w.days {
            day.assign("wt2");
        }

        let report = analyze_balance(&w, &catalog());
        assert_eq!(report.distribution[0].percentage, 100.0);
        assert!(report.messages()[0].contains("WT2"));
    }

    #[test]
    fn test_three_of_seven_days_does_not_warn() {
        let mut w = week();
        for day in w.days.iter_mut().take(3) {
            day.assign("wt1");
        }

        let report = analyze_balance(&w, &catalog());
        assert!((report.distribution[0].percentage - 42.857).abs() < 0.01);
        assert!(!report
            .warnings
            .iter()
            .any(|w| matches!(w, BalanceWarning::OverConcentrated { .. })));
    }

    #[test]
    fn test_empty_week_reports_every_catalog_category() {
        let report = analyze_balance(&week(), &catalog());

        assert!(report.distribution.iter().all(|e| e.count == 0));
        assert_eq!(
            report.warnings,
            vec![
                BalanceWarning::CategoryGap {
                    category: WorkTypeCategory::Physical
                },
                BalanceWarning::CategoryGap {
                    category: WorkTypeCategory::Technical
                },
                BalanceWarning::CategoryGap {
                    category: WorkTypeCategory::Mental
                },
            ]
        );
    }

    #[test]
    fn test_category_absent_from_catalog_never_warned() {
        let report = analyze_balance(&week(), &catalog());
        assert!(!report.warnings.contains(&BalanceWarning::CategoryGap {
            category: WorkTypeCategory::Tactical
        }));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let mut w = week();
        w.days[0].assign("wt3");
        w.days[1].assign("wt2");
        w.days[2].assign("wt2");

        let report = analyze_balance(&w, &catalog());
        let order: Vec<&str> = report
            .distribution
            .iter()
            .map(|e| e.work_type.id.as_str())
            .collect();
        assert_eq!(order, vec!["wt2", "wt3", "wt1"]);
    }

    #[test]
    fn test_stale_assignments_are_not_counted() {
        let mut w = week();
        w.days[0].assign("deleted");
        w.days[0].assign("wt1");

        let report = analyze_balance(&w, &catalog());
        let total: usize = report.distribution.iter().map(|e| e.count).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_custom_threshold() {
        let mut w = week();
        for day in w.days.iter_mut().take(3) {
            day.assign("wt1");
        }
        let rules = BalanceRules {
            over_concentration_percent: 40.0,
        };

        let report = analyze_balance_with(&w, &catalog(), &rules);
        assert!(matches!(
            report.warnings[0],
            BalanceWarning::OverConcentrated { .. }
        ));
    }
}
