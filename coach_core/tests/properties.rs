//! Property-based tests for the training engine
//!
//! Uses proptest to check that progress, balance and recommendation
//! invariants hold across generated goals, weeks and completion sets.

use chrono::{NaiveDate, TimeZone, Utc};
use coach_core::week::DAYS_PER_WEEK;
use coach_core::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn catalog_ids() -> Vec<String> {
    get_default_catalog()
        .work_types
        .iter()
        .map(|wt| wt.id.clone())
        .collect()
}

fn goal_requiring(work_types: Vec<String>) -> Goal {
    Goal::create(NewGoal {
        name: "Property goal".into(),
        description: String::new(),
        cadence: Cadence::Weekly,
        work_types,
        target_percentage: Some(90),
        student_level: StudentLevel::Beginner,
        start_date: monday(),
        end_date: monday() + chrono::Duration::days(90),
    })
    .unwrap()
}

/// A non-empty subset of catalog ids, in catalog order
fn required_subset() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(any::<bool>(), 8).prop_filter_map("empty goal", |mask| {
        let ids: Vec<String> = catalog_ids()
            .into_iter()
            .zip(mask)
            .filter_map(|(id, keep)| keep.then_some(id))
            .collect();
        (!ids.is_empty()).then_some(ids)
    })
}

/// Seven days, each holding up to three catalog ids
fn week_assignments() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..8, 0..3), DAYS_PER_WEEK)
}

fn build_week(assignments: &[Vec<usize>]) -> WeekPlan {
    let ids = catalog_ids();
    let mut week = WeekPlan::blank("Generated", monday()).unwrap();
    for (day, picks) in week.days.iter_mut().zip(assignments) {
        for &i in picks {
            day.assign(&ids[i]);
        }
    }
    week
}

proptest! {
    #[test]
    fn progress_is_exact_coverage_ratio(
        required in required_subset(),
        mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let goal = goal_requiring(required.clone());
        let completed: HashSet<String> = required
            .iter()
            .zip(mask)
            .filter_map(|(id, done)| done.then(|| id.clone()))
            .collect();
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();

        let progress = compute_progress_at(&goal, &completed, 0, now);

        let expected = completed.len() as f64 / required.len() as f64 * 100.0;
        prop_assert!((progress.current_percentage - expected).abs() < 1e-9);
        prop_assert!(progress.current_percentage >= 0.0);
        prop_assert!(progress.current_percentage <= 100.0);
        prop_assert_eq!(
            progress.is_completed,
            progress.current_percentage >= f64::from(goal.target_percentage)
        );
    }

    #[test]
    fn unrelated_completions_never_change_progress(
        required in required_subset(),
        extra in "[a-z]{3,8}",
    ) {
        let goal = goal_requiring(required);
        let now = Utc::now();
        let base = compute_progress_at(&goal, &HashSet::new(), 0, now);

        let unrelated: HashSet<String> = [format!("x_{}", extra)].into_iter().collect();
        let with_extra = compute_progress_at(&goal, &unrelated, 0, now);

        prop_assert_eq!(base.current_percentage, with_extra.current_percentage);
    }

    #[test]
    fn completed_days_never_exceed_window(days in 0u32..400) {
        let goal = goal_requiring(vec!["footwork".into()]);
        let progress = compute_progress(&goal, &HashSet::new(), days);
        prop_assert!(progress.completed_days <= progress.total_days);
        prop_assert_eq!(progress.total_days, 7);
    }

    #[test]
    fn distribution_counts_match_assignments(assignments in week_assignments()) {
        let week = build_week(&assignments);
        let catalog = &get_default_catalog().work_types;
        let report = analyze_balance(&week, catalog);

        let assigned: usize = week.days.iter().map(|d| d.work_types.len()).sum();
        let counted: usize = report.distribution.iter().map(|e| e.count).sum();
        prop_assert_eq!(assigned, counted);
        prop_assert_eq!(report.distribution.len(), catalog.len());

        for entry in &report.distribution {
            let expected = entry.count as f64 / 7.0 * 100.0;
            prop_assert!((entry.percentage - expected).abs() < 1e-9);
        }
        for pair in report.distribution.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn over_concentration_iff_above_half(days_assigned in 0usize..=7) {
        let mut week = WeekPlan::blank("Generated", monday()).unwrap();
        for day in week.days.iter_mut().take(days_assigned) {
            day.assign("footwork");
        }
        let report = analyze_balance(&week, &get_default_catalog().work_types);

        let warned = report.warnings.iter().any(|w| matches!(
            w,
            BalanceWarning::OverConcentrated { work_type_id, .. } if work_type_id == "footwork"
        ));
        prop_assert_eq!(warned, days_assigned >= 4);
    }

    #[test]
    fn category_gap_iff_nothing_scheduled(assignments in week_assignments()) {
        let week = build_week(&assignments);
        let catalog = &get_default_catalog().work_types;
        let report = analyze_balance(&week, catalog);

        for category in WorkTypeCategory::ALL {
            let scheduled = report
                .distribution
                .iter()
                .any(|e| e.work_type.category == category && e.count > 0);
            let gap = report
                .warnings
                .iter()
                .any(|w| matches!(w, BalanceWarning::CategoryGap { category: c } if *c == category));
            prop_assert_eq!(gap, !scheduled);
        }
    }

    #[test]
    fn recommend_is_deterministic(
        required in required_subset(),
        mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let catalog = get_default_catalog();
        let goal = goal_requiring(required);
        let completed: HashSet<String> = catalog_ids()
            .into_iter()
            .zip(mask)
            .filter_map(|(id, done)| done.then_some(id))
            .collect();

        let first = recommend(Some(&goal), &catalog.work_types, &completed, &catalog.blocks);
        let second = recommend(Some(&goal), &catalog.work_types, &completed, &catalog.blocks);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn recommendations_follow_pass_order(
        required in required_subset(),
        mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let catalog = get_default_catalog();
        let goal = goal_requiring(required);
        let completed: HashSet<String> = catalog_ids()
            .into_iter()
            .zip(mask)
            .filter_map(|(id, done)| done.then_some(id))
            .collect();

        let recs = recommend(Some(&goal), &catalog.work_types, &completed, &catalog.blocks);

        for pair in recs.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
        }

        let variety = recs.iter().filter(|r| r.confidence == 60).count();
        prop_assert!(variety <= 3);

        for rec in &recs {
            let wt = rec.related_work_type_id.as_deref().unwrap_or_default();
            match rec.confidence {
                95 => prop_assert!(goal.requires(wt) && !completed.contains(wt)),
                85 => prop_assert_eq!(rec.kind, RecommendationKind::Block),
                60 => prop_assert!(!goal.requires(wt) && !completed.contains(wt)),
                other => prop_assert!(false, "unexpected confidence {}", other),
            }
        }
    }
}

#[test]
fn full_week_of_one_work_type_is_fully_concentrated() {
    let mut week = WeekPlan::blank("Solid", monday()).unwrap();
    for day in &mut week.days {
        day.assign("focus");
    }
    let report = analyze_balance(&week, &get_default_catalog().work_types);

    assert_eq!(report.distribution[0].work_type.id, "focus");
    assert_eq!(report.distribution[0].percentage, 100.0);
    assert!(matches!(
        report.warnings[0],
        BalanceWarning::OverConcentrated { .. }
    ));
}

#[test]
fn no_goal_means_no_recommendations() {
    let catalog = get_default_catalog();
    let recs = recommend(None, &catalog.work_types, &HashSet::new(), &catalog.blocks);
    assert!(recs.is_empty());
}
