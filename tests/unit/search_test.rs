//! Tests for student search filters

use chrono::TimeDelta;
use ecotrack::core::models::{Sex, StudentStatus};
use ecotrack::core::services::{Period, StudentFilter, mark_students, search_students};

use crate::common::{StudentBuilder, Survey, now};

fn codes(survey: &Survey, filter: &StudentFilter) -> Vec<String> {
    search_students(&survey.store, survey.id(), filter, now())
        .unwrap()
        .into_iter()
        .map(|s| s.survey_code)
        .collect()
}

fn seeded() -> Survey {
    let survey = Survey::new();
    survey.student(StudentBuilder::new("S-1").name("Awa Ndiaye").district("Bastos"));
    survey.student(
        StudentBuilder::new("S-2")
            .name("Paul Mbarga")
            .sex(Sex::Male)
            .district("Melen")
            .collected_at(now() - TimeDelta::days(20)),
    );
    survey.student(
        StudentBuilder::new("S-3")
            .name("Awa Fotso")
            .district("Melen")
            .collected_at(now() - TimeDelta::days(60)),
    );
    survey
}

#[test]
fn empty_filter_matches_all() {
    let survey = seeded();
    assert_eq!(codes(&survey, &StudentFilter::default()), ["S-1", "S-2", "S-3"]);
}

#[test]
fn name_is_case_insensitive_substring() {
    let survey = seeded();
    let filter = StudentFilter {
        name: Some("awa".to_string()),
        ..StudentFilter::default()
    };
    assert_eq!(codes(&survey, &filter), ["S-1", "S-3"]);
}

#[test]
fn criteria_combine() {
    let survey = seeded();
    let filter = StudentFilter {
        district: Some("Melen".to_string()),
        sex: Some(Sex::Female),
        ..StudentFilter::default()
    };
    assert_eq!(codes(&survey, &filter), ["S-3"]);
}

#[test]
fn periods_count_back_from_now() {
    let survey = seeded();
    let within = |period| StudentFilter {
        period: Some(period),
        ..StudentFilter::default()
    };
    assert_eq!(codes(&survey, &within(Period::Today)), ["S-1"]);
    assert_eq!(codes(&survey, &within(Period::Week)), ["S-1"]);
    assert_eq!(codes(&survey, &within(Period::Month)), ["S-1", "S-2"]);
    assert_eq!(codes(&survey, &within(Period::Quarter)), ["S-1", "S-2", "S-3"]);
}

#[test]
fn status_filter() {
    let survey = seeded();
    let all = search_students(&survey.store, survey.id(), &StudentFilter::default(), now()).unwrap();
    mark_students(&survey.store, survey.id(), &[all[1].id], StudentStatus::Verified).unwrap();

    let filter = StudentFilter {
        status: Some(StudentStatus::Verified),
        ..StudentFilter::default()
    };
    assert_eq!(codes(&survey, &filter), ["S-2"]);
}
