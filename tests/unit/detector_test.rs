//! Tests for the anomaly detector sweeps

use ecotrack::core::models::{AnomalyKind, EducationLevel, ExpenseCategory, Severity, Subject};
use ecotrack::core::ports::SurveyStore;
use ecotrack::core::services::{Detector, RuleCatalog, detect_all_anomalies};

use crate::common::{StudentBuilder, Survey};

// =============================================================================
// DUPLICATES
// =============================================================================

#[test]
fn names_equal_ignoring_case_are_duplicates() {
    let survey = Survey::new();
    let a = survey.student(StudentBuilder::new("S-1").name("Jean Dupont"));
    let b = survey.student(StudentBuilder::new("S-2").name("JEAN DUPONT"));
    let c = survey.student(StudentBuilder::new("S-3").name("Jean Dupond"));

    let catalog = RuleCatalog::standard();
    let students = survey.store.students(survey.id()).unwrap();
    let found = Detector::new(&catalog, survey.id()).duplicates(&students);

    let subjects: Vec<Subject> = found.iter().map(|f| f.subject).collect();
    assert_eq!(subjects, vec![Subject::Student(a.id), Subject::Student(b.id)]);
    assert!(!subjects.contains(&Subject::Student(c.id)));
    assert!(found.iter().all(|f| f.kind == AnomalyKind::Duplicate));
    assert!(found.iter().all(|f| f.severity == Severity::Medium));
    assert!(found[0].description.contains("S-1"));
    assert!(found[1].description.contains("S-2"));
}

#[test]
fn duplicates_only_within_one_surveyor() {
    let survey = Survey::new();
    let bob = survey.other_surveyor("bob");
    survey.student(StudentBuilder::new("S-1").name("Awa Ndiaye"));
    survey.student_for(bob.id, StudentBuilder::new("S-2").name("Awa Ndiaye"));

    let candidates =
        detect_all_anomalies(&survey.store, &RuleCatalog::standard(), survey.id()).unwrap();
    assert!(candidates.iter().all(|c| c.kind != AnomalyKind::Duplicate));
}

// =============================================================================
// OUT OF RANGE
// =============================================================================

#[test]
fn housing_amounts_against_band() {
    let survey = Survey::new();
    let student = survey.student(StudentBuilder::new("S-1"));
    let low = survey.expense(&student, ExpenseCategory::Housing, 3_000.0);
    let high = survey.expense(&student, ExpenseCategory::Housing, 60_000.0);
    survey.expense(&student, ExpenseCategory::Housing, 20_000.0);

    let catalog = RuleCatalog::standard();
    let expenses = survey.store.expenses(survey.id()).unwrap();
    let found = Detector::new(&catalog, survey.id()).out_of_range(&expenses);

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].subject, Subject::Expense(low.id));
    assert_eq!(found[0].severity, Severity::Low);
    assert!(found[0].description.contains("3000 FCFA"));
    assert!(found[0].solution.contains("5000"));
    assert_eq!(found[1].subject, Subject::Expense(high.id));
    assert_eq!(found[1].severity, Severity::High);
    assert!(found[1].solution.contains("50000"));
}

#[test]
fn band_edges_are_accepted() {
    let survey = Survey::new();
    let student = survey.student(StudentBuilder::new("S-1"));
    survey.expense(&student, ExpenseCategory::Food, 2_000.0);
    survey.expense(&student, ExpenseCategory::Food, 30_000.0);

    let catalog = RuleCatalog::standard();
    let expenses = survey.store.expenses(survey.id()).unwrap();
    assert!(Detector::new(&catalog, survey.id()).out_of_range(&expenses).is_empty());
}

#[test]
fn identical_expenses_get_distinct_descriptions() {
    let survey = Survey::new();
    let student = survey.student(StudentBuilder::new("S-1"));
    survey.expense(&student, ExpenseCategory::Transport, 50_000.0);
    survey.expense(&student, ExpenseCategory::Transport, 50_000.0);

    let catalog = RuleCatalog::standard();
    let expenses = survey.store.expenses(survey.id()).unwrap();
    let found = Detector::new(&catalog, survey.id()).out_of_range(&expenses);
    assert_eq!(found.len(), 2);
    assert_ne!(found[0].description, found[1].description);
}

// =============================================================================
// AGE / LEVEL
// =============================================================================

#[test]
fn age_outside_level_band_is_inconsistent() {
    let survey = Survey::new();
    let old = survey.student(StudentBuilder::new("S-1").age(30).level(EducationLevel::Bachelor1));
    survey.student(StudentBuilder::new("S-2").age(20).level(EducationLevel::Bachelor1));
    survey.student(StudentBuilder::new("S-3").level(EducationLevel::Bachelor1));
    survey.student(StudentBuilder::new("S-4").age(45).level(EducationLevel::Doctorate));

    let catalog = RuleCatalog::standard();
    let students = survey.store.students(survey.id()).unwrap();
    let found = Detector::new(&catalog, survey.id()).age_level_mismatches(&students);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].subject, Subject::Student(old.id));
    assert_eq!(found[0].kind, AnomalyKind::Inconsistency);
    assert_eq!(found[0].severity, Severity::Medium);
    assert!(found[0].description.contains("30"));
    assert!(found[0].description.contains("Bachelor 1"));
}

// =============================================================================
// MISSING DATA
// =============================================================================

#[test]
fn student_without_expenses_is_high() {
    let survey = Survey::new();
    let idle = survey.student(StudentBuilder::new("S-1"));
    let active = survey.student(StudentBuilder::new("S-2"));
    survey.expense(&active, ExpenseCategory::Food, 5_000.0);

    let found =
        detect_all_anomalies(&survey.store, &RuleCatalog::standard(), survey.id()).unwrap();
    let missing: Vec<_> = found.iter().filter(|c| c.kind == AnomalyKind::Missing).collect();

    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].subject, Subject::Student(idle.id));
    assert_eq!(missing[0].severity, Severity::High);
}

#[test]
fn blank_district_is_low() {
    let survey = Survey::new();
    let nowhere = survey.student(StudentBuilder::new("S-1").district("   "));
    survey.expense(&nowhere, ExpenseCategory::Food, 5_000.0);

    let found =
        detect_all_anomalies(&survey.store, &RuleCatalog::standard(), survey.id()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].subject, Subject::Student(nowhere.id));
    assert_eq!(found[0].kind, AnomalyKind::Missing);
    assert_eq!(found[0].severity, Severity::Low);
}

// =============================================================================
// WHOLE RUN
// =============================================================================

#[test]
fn sweeps_run_in_fixed_order() {
    let survey = Survey::new();
    let a = survey.student(
        StudentBuilder::new("S-1").name("Paul Biya").age(40).level(EducationLevel::Master1),
    );
    survey.student(StudentBuilder::new("S-2").name("paul biya"));
    survey.expense(&a, ExpenseCategory::Health, 200_000.0);

    let found =
        detect_all_anomalies(&survey.store, &RuleCatalog::standard(), survey.id()).unwrap();
    let kinds: Vec<AnomalyKind> = found.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AnomalyKind::Duplicate,
            AnomalyKind::Duplicate,
            AnomalyKind::OutOfRange,
            AnomalyKind::Inconsistency,
            AnomalyKind::Missing,
        ]
    );
}

#[test]
fn empty_survey_has_no_findings() {
    let survey = Survey::new();
    let found =
        detect_all_anomalies(&survey.store, &RuleCatalog::standard(), survey.id()).unwrap();
    assert!(found.is_empty());
}

#[test]
fn empty_catalog_uses_fallback_band() {
    let survey = Survey::new();
    let student = survey.student(StudentBuilder::new("S-1").age(99).level(EducationLevel::Master2));
    survey.expense(&student, ExpenseCategory::Housing, 3_000.0);
    survey.expense(&student, ExpenseCategory::Housing, 150_000.0);

    let found = detect_all_anomalies(&survey.store, &RuleCatalog::empty(), survey.id()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::High);
}
