//! Tests for anomaly triage

use ecotrack::core::error::SurveyError;
use ecotrack::core::models::AnomalyStatus;
use ecotrack::core::ports::SurveyStore;
use ecotrack::core::services::{
    RuleCatalog, delete_anomaly, ignore_anomaly, persist_anomalies, resolve_anomaly,
    start_anomaly,
};

use crate::common::{StudentBuilder, Survey, now, ts};

/// Survey with one open anomaly; returns its id
fn with_anomaly() -> (Survey, u64) {
    let survey = Survey::new();
    survey.student(StudentBuilder::new("S-1"));
    let run = persist_anomalies(&survey.store, &RuleCatalog::standard(), survey.id(), now()).unwrap();
    let id = run.created[0].id;
    (survey, id)
}

#[test]
fn resolve_sets_timestamp_and_solution() {
    let (survey, id) = with_anomaly();
    let at = ts(2026, 3, 12);

    let done = resolve_anomaly(&survey.store, survey.id(), id, Some("Added rent"), at).unwrap();

    assert_eq!(done.status, AnomalyStatus::Resolved);
    assert_eq!(done.resolved_at, Some(at));
    assert_eq!(done.solution, "Added rent");
    assert_eq!(survey.store.anomaly(survey.id(), id).unwrap(), Some(done));
}

#[test]
fn blank_solution_keeps_suggestion() {
    let (survey, id) = with_anomaly();
    let before = survey.store.anomaly(survey.id(), id).unwrap().unwrap();

    let done = resolve_anomaly(&survey.store, survey.id(), id, Some("  "), now()).unwrap();
    assert_eq!(done.solution, before.solution);
}

#[test]
fn ignore_and_start_change_status_only() {
    let (survey, id) = with_anomaly();

    let started = start_anomaly(&survey.store, survey.id(), id).unwrap();
    assert_eq!(started.status, AnomalyStatus::InProgress);
    assert!(started.resolved_at.is_none());

    let ignored = ignore_anomaly(&survey.store, survey.id(), id).unwrap();
    assert_eq!(ignored.status, AnomalyStatus::Ignored);
    assert!(ignored.resolved_at.is_none());
}

#[test]
fn foreign_anomaly_is_not_found() {
    let (survey, id) = with_anomaly();
    let bob = survey.other_surveyor("bob");

    for result in [
        ignore_anomaly(&survey.store, bob.id, id),
        start_anomaly(&survey.store, bob.id, id),
        resolve_anomaly(&survey.store, bob.id, id, None, now()),
    ] {
        assert!(matches!(result, Err(SurveyError::NotFound { .. })));
    }
    assert!(matches!(
        delete_anomaly(&survey.store, bob.id, id),
        Err(SurveyError::NotFound { .. })
    ));
}

#[test]
fn delete_removes_anomaly() {
    let (survey, id) = with_anomaly();
    delete_anomaly(&survey.store, survey.id(), id).unwrap();
    assert!(survey.store.anomaly(survey.id(), id).unwrap().is_none());
}
