//! Tests for anomaly persistence and deduplication

use ecotrack::core::models::{AnomalyStatus, ExpenseCategory, Severity};
use ecotrack::core::ports::SurveyStore;
use ecotrack::core::services::{RuleCatalog, persist_anomalies, resolve_anomaly};

use crate::common::{StudentBuilder, Survey, now, ts};

#[test]
fn second_run_creates_nothing() {
    let survey = Survey::new();
    let student = survey.student(StudentBuilder::new("S-1").name("Jean Dupont"));
    survey.student(StudentBuilder::new("S-2").name("jean dupont"));
    survey.expense(&student, ExpenseCategory::Housing, 60_000.0);
    let catalog = RuleCatalog::standard();

    let first = persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();
    let second = persist_anomalies(&survey.store, &catalog, survey.id(), ts(2026, 3, 11)).unwrap();

    assert_eq!(first.created.len(), first.detected);
    assert!(second.created.is_empty());
    assert_eq!(second.skipped, first.detected);
    assert_eq!(survey.store.anomalies(survey.id()).unwrap().len(), first.created.len());
}

#[test]
fn idle_student_gets_exactly_one_high_anomaly() {
    let survey = Survey::new();
    let idle = survey.student(StudentBuilder::new("S-1"));
    let catalog = RuleCatalog::standard();

    for _ in 0..3 {
        persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();
    }

    let stored = survey.store.anomalies(survey.id()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].severity, Severity::High);
    assert_eq!(stored[0].student_id, Some(idle.id));
    assert_eq!(stored[0].expense_id, None);
    assert_eq!(stored[0].status, AnomalyStatus::ToTreat);
    assert_eq!(stored[0].detected_at, now());
}

#[test]
fn resolved_finding_is_raised_again_while_cause_remains() {
    let survey = Survey::new();
    survey.student(StudentBuilder::new("S-1"));
    let catalog = RuleCatalog::standard();

    let first = persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();
    resolve_anomaly(&survey.store, survey.id(), first.created[0].id, None, now()).unwrap();

    let second = persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();
    assert_eq!(second.created.len(), 1);
    assert_eq!(survey.store.anomalies(survey.id()).unwrap().len(), 2);
}

#[test]
fn fixed_cause_leaves_stored_anomaly_untouched() {
    let survey = Survey::new();
    let student = survey.student(StudentBuilder::new("S-1"));
    let catalog = RuleCatalog::standard();
    persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();

    survey.expense(&student, ExpenseCategory::Food, 5_000.0);
    let outcome = persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();

    assert_eq!(outcome.detected, 0);
    let stored = survey.store.anomalies(survey.id()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, AnomalyStatus::ToTreat);
}

#[test]
fn anomalies_belong_to_the_scanning_surveyor() {
    let survey = Survey::new();
    let bob = survey.other_surveyor("bob");
    survey.student(StudentBuilder::new("S-1"));
    survey.student_for(bob.id, StudentBuilder::new("S-2"));
    let catalog = RuleCatalog::standard();

    let outcome = persist_anomalies(&survey.store, &catalog, survey.id(), now()).unwrap();
    assert_eq!(outcome.created.len(), 1);
    assert!(outcome.created.iter().all(|a| a.surveyor_id == survey.id()));
    assert!(survey.store.anomalies(bob.id).unwrap().is_empty());
}
