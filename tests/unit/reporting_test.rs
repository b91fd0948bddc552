//! Tests for dashboard and district aggregates

use ecotrack::core::error::SurveyError;
use ecotrack::core::models::{ExpenseCategory, Sex};
use ecotrack::core::ports::SurveyStore;
use ecotrack::core::services::reporting::{category_breakdown, daily_series, district_comparison};
use ecotrack::core::services::{
    ReportOptions, RuleCatalog, compare_districts, compute_dashboard_stats,
    compute_district_comparison, compute_student_stats, persist_anomalies, resolve_anomaly,
};

use crate::common::{StudentBuilder, Survey, date, now, ts};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

// =============================================================================
// DISTRICT COMPARISON
// =============================================================================

#[test]
fn most_expensive_district_first() {
    let survey = Survey::new();
    let a = survey.student(StudentBuilder::new("S-1").district("A"));
    let b = survey.student(StudentBuilder::new("S-2").district("B"));
    survey.expense(&a, ExpenseCategory::Housing, 15_000.0);
    survey.expense(&a, ExpenseCategory::Housing, 25_000.0);
    survey.expense(&b, ExpenseCategory::Housing, 15_000.0);

    let cmp = compute_district_comparison(&survey.store, survey.id()).unwrap();

    assert_eq!(cmp.districts[0].district, "A");
    assert_eq!(cmp.districts[1].district, "B");
    assert_eq!(cmp.most_expensive.as_deref(), Some("A"));
    assert_eq!(cmp.least_expensive.as_deref(), Some("B"));
    assert!(close(cmp.difference, 5_000.0));
    assert!(close(cmp.difference_pct, 33.33));
    assert!(close(cmp.mean_of_means, 17_500.0));
}

#[test]
fn district_rows_count_students_and_ages() {
    let survey = Survey::new();
    survey.student(StudentBuilder::new("S-1").district("Bastos").age(20).sex(Sex::Male));
    survey.student(StudentBuilder::new("S-2").district("Bastos").age(24));
    survey.student(StudentBuilder::new("S-3").district("Bastos"));

    let students = survey.store.students(survey.id()).unwrap();
    let cmp = district_comparison(&students, &[]);
    let row = &cmp.districts[0];

    assert_eq!(row.students, 3);
    assert_eq!(row.male, 1);
    assert_eq!(row.female, 2);
    assert!(close(row.average_age, 22.0));
    assert_eq!(row.expense_count, 0);
    assert!(close(cmp.difference_pct, 0.0));
}

#[test]
fn no_districts_compares_nothing() {
    let cmp = district_comparison(&[], &[]);
    assert!(cmp.districts.is_empty());
    assert!(cmp.most_expensive.is_none());
    assert!(close(cmp.mean_of_means, 0.0));
}

#[test]
fn selected_comparison_needs_two_districts() {
    let survey = Survey::new();
    let err = compare_districts(&survey.store, survey.id(), &["A".to_string()], None).unwrap_err();
    assert!(matches!(err, SurveyError::InvalidInput(_)));
}

#[test]
fn selected_comparison_filters_category() {
    let survey = Survey::new();
    let a = survey.student(StudentBuilder::new("S-1").district("A"));
    let b = survey.student(StudentBuilder::new("S-2").district("B"));
    survey.expense(&a, ExpenseCategory::Food, 10_000.0);
    survey.expense(&a, ExpenseCategory::Housing, 40_000.0);
    survey.expense(&b, ExpenseCategory::Food, 8_000.0);
    survey.expense(&b, ExpenseCategory::Food, 12_000.0);

    let names = vec!["B".to_string(), "A".to_string()];
    let cmp =
        compare_districts(&survey.store, survey.id(), &names, Some(ExpenseCategory::Food)).unwrap();

    assert_eq!(cmp.results.len(), 2);
    assert!(cmp.results.iter().all(|r| close(r.average, 10_000.0)));
    let b_row = cmp.results.iter().find(|r| r.district == "B").unwrap();
    assert!(close(b_row.minimum, 8_000.0));
    assert!(close(b_row.maximum, 12_000.0));
    assert_eq!(b_row.expenses, 2);
    assert!(close(cmp.difference, 0.0));
}

#[test]
fn selected_comparison_keeps_three_districts() {
    let survey = Survey::new();
    let names: Vec<String> = ["A", "B", "C", "D"].iter().map(ToString::to_string).collect();
    let cmp = compare_districts(&survey.store, survey.id(), &names, None).unwrap();
    assert_eq!(cmp.results.len(), 3);
}

// =============================================================================
// DAILY SERIES
// =============================================================================

#[test]
fn seven_day_series_oldest_first_with_zeros() {
    let survey = Survey::new();
    let s = survey.student(StudentBuilder::new("S-1"));
    survey.expense_at(&s, ExpenseCategory::Food, 3_000.0, ts(2026, 3, 8));
    survey.expense_at(&s, ExpenseCategory::Food, 2_000.0, ts(2026, 3, 8));
    survey.expense_at(&s, ExpenseCategory::Food, 9_000.0, ts(2026, 2, 1));

    let expenses = survey.store.expenses(survey.id()).unwrap();
    let series = daily_series(&expenses, date(2026, 3, 10), 7);

    assert_eq!(series.len(), 7);
    assert_eq!(series[0].date, date(2026, 3, 4));
    assert_eq!(series[6].date, date(2026, 3, 10));
    assert!(close(series[4].total, 5_000.0));
    let others: f64 = series.iter().map(|d| d.total).sum::<f64>() - series[4].total;
    assert!(close(others, 0.0));
    assert_eq!(series[6].label, "Tue");
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[test]
fn dashboard_on_empty_survey_is_zero() {
    let survey = Survey::new();
    let stats = compute_dashboard_stats(
        &survey.store,
        survey.id(),
        date(2026, 3, 10),
        &ReportOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.students, 0);
    assert_eq!(stats.expenses, 0);
    assert!(close(stats.average_amount, 0.0));
    assert_eq!(stats.sex_ratio, "0:0");
    assert_eq!(stats.daily.len(), 7);
    assert!(stats.categories.is_empty());
    assert!(close(stats.month_share_pct, 0.0));
}

#[test]
fn dashboard_counts_and_anomalies() {
    let survey = Survey::new();
    let a = survey.student(StudentBuilder::new("S-1").district("Ngoa").sex(Sex::Male));
    let b = survey.student(StudentBuilder::new("S-2").district("Ngoa"));
    survey.student(StudentBuilder::new("S-3").district("Essos").collected_at(ts(2025, 12, 1)));
    survey.expense(&a, ExpenseCategory::Housing, 20_000.0);
    survey.expense(&b, ExpenseCategory::Food, 10_000.0);
    survey.expense(&b, ExpenseCategory::Housing, 60_000.0);

    let catalog = RuleCatalog::standard();
    let run = persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();
    resolve_anomaly(&survey.store, survey.id(), run.created[0].id, None, now()).unwrap();

    let options = ReportOptions {
        recent_anomalies: 1,
        ..ReportOptions::default()
    };
    let stats =
        compute_dashboard_stats(&survey.store, survey.id(), date(2026, 3, 10), &options).unwrap();

    assert_eq!(stats.students, 3);
    assert_eq!(stats.expenses, 3);
    assert!(close(stats.total_amount, 90_000.0));
    assert!(close(stats.average_amount, 30_000.0));
    assert_eq!(stats.sex_ratio, "1:2");
    assert_eq!(stats.districts, 2);
    assert_eq!(stats.top_districts[0].district, "Ngoa");
    assert_eq!(stats.top_districts[0].students, 2);
    assert_eq!(stats.categories[0].category, ExpenseCategory::Housing);
    assert!(close(stats.categories[0].total, 80_000.0));
    assert_eq!(stats.students_this_month, 2);
    assert!(close(stats.month_share_pct, 66.67));

    // high expense + idle S-3; one resolved
    assert_eq!(stats.anomalies.total, 2);
    assert_eq!(stats.anomalies.open, 1);
    assert_eq!(stats.anomalies.resolved, 1);
    assert_eq!(stats.recent_anomalies.len(), 1);
}

#[test]
fn categories_sorted_by_total() {
    let survey = Survey::new();
    let s = survey.student(StudentBuilder::new("S-1"));
    survey.expense(&s, ExpenseCategory::Food, 5_000.0);
    survey.expense(&s, ExpenseCategory::Transport, 9_000.0);
    survey.expense(&s, ExpenseCategory::Food, 6_000.0);

    let totals = category_breakdown(&survey.store.expenses(survey.id()).unwrap());
    assert_eq!(totals[0].category, ExpenseCategory::Food);
    assert_eq!(totals[0].count, 2);
    assert_eq!(totals[1].category, ExpenseCategory::Transport);
    assert_eq!(totals[0].color, ExpenseCategory::Food.color());
}

// =============================================================================
// STUDENT STATS
// =============================================================================

#[test]
fn student_profile() {
    let survey = Survey::new();
    let s = survey.student(StudentBuilder::new("S-1").district("Bastos"));
    survey.expense_at(&s, ExpenseCategory::Food, 2_000.0, ts(2026, 3, 1));
    survey.expense_at(&s, ExpenseCategory::Food, 4_000.0, ts(2026, 3, 1));
    survey.expense_at(&s, ExpenseCategory::Housing, 30_000.0, ts(2026, 3, 2));

    let stats = compute_student_stats(&survey.store, survey.id(), s.id).unwrap();
    assert_eq!(stats.count, 3);
    assert!(close(stats.total, 36_000.0));
    assert!(close(stats.daily_average, 18_000.0));
    assert_eq!(stats.top_category, Some(ExpenseCategory::Housing));
    assert_eq!(stats.frequent_district.as_deref(), Some("Bastos"));
}

#[test]
fn student_stats_for_foreign_student_is_not_found() {
    let survey = Survey::new();
    let bob = survey.other_surveyor("bob");
    let theirs = survey.student_for(bob.id, StudentBuilder::new("S-9"));

    let err = compute_student_stats(&survey.store, survey.id(), theirs.id).unwrap_err();
    assert!(matches!(err, SurveyError::NotFound { .. }));
}

#[test]
fn padded_districts_group_with_clean_ones() {
    let survey = Survey::new();
    let padded = survey.student(StudentBuilder::new("S-1").district("Bastos "));
    survey.student(StudentBuilder::new("S-2").district("Bastos"));
    survey.expense(&padded, ExpenseCategory::Food, 4_000.0);

    let comparison = compute_district_comparison(&survey.store, survey.id()).unwrap();
    assert_eq!(comparison.districts.len(), 1);
    let row = &comparison.districts[0];
    assert_eq!(row.district, "Bastos");
    assert_eq!(row.students, 2);
    assert_eq!(row.expense_count, 1);

    let stats = compute_dashboard_stats(
        &survey.store,
        survey.id(),
        date(2026, 3, 10),
        &ReportOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.districts, 1);

    let selected = [" Bastos".to_string(), "Melen".to_string()];
    let side_by_side = compare_districts(&survey.store, survey.id(), &selected, None).unwrap();
    let bastos = &side_by_side.results[0];
    assert_eq!(bastos.district, "Bastos");
    assert_eq!(bastos.students, 2);
    assert_eq!(bastos.expenses, 1);
}
