//! Tests for domain model parsing and serialization

use ecotrack::core::models::{
    AnomalyKind, AnomalyStatus, EducationLevel, ExpenseCategory, Severity, Sex, StudentStatus,
    Subject,
};

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn categories_parse_codes_and_legacy_names() {
    for category in ExpenseCategory::ALL {
        assert_eq!(category.code().parse::<ExpenseCategory>(), Ok(category));
    }
    assert_eq!("LOGEMENT".parse(), Ok(ExpenseCategory::Housing));
    assert_eq!("divertissement".parse(), Ok(ExpenseCategory::Leisure));
    assert_eq!("formation".parse(), Ok(ExpenseCategory::Tuition));
    assert!("yachts".parse::<ExpenseCategory>().is_err());
}

#[test]
fn levels_parse_codes_and_legacy_names() {
    for level in EducationLevel::ALL {
        assert_eq!(level.code().parse::<EducationLevel>(), Ok(level));
    }
    assert_eq!("L2".parse(), Ok(EducationLevel::Bachelor2));
    assert_eq!("licence3".parse(), Ok(EducationLevel::Bachelor3));
    assert_eq!("M1".parse(), Ok(EducationLevel::Master1));
    assert_eq!("D".parse(), Ok(EducationLevel::Doctorate));
}

#[test]
fn statuses_and_severities_parse() {
    assert_eq!("f".parse(), Ok(Sex::Female));
    assert_eq!("brouillon".parse(), Ok(StudentStatus::Draft));
    assert_eq!("elevee".parse(), Ok(Severity::High));
    assert_eq!("to-treat".parse(), Ok(AnomalyStatus::ToTreat));
    assert_eq!("hors_norme".parse(), Ok(AnomalyKind::OutOfRange));
}

// =============================================================================
// BEHAVIOUR
// =============================================================================

#[test]
fn severity_orders_by_urgency() {
    assert!(Severity::High > Severity::Medium);
    assert!(Severity::Medium > Severity::Low);
    assert_eq!(Severity::default(), Severity::Medium);
}

#[test]
fn only_to_treat_is_open() {
    assert!(AnomalyStatus::ToTreat.is_open());
    assert!(!AnomalyStatus::InProgress.is_open());
    assert!(!AnomalyStatus::Resolved.is_open());
    assert!(!AnomalyStatus::Ignored.is_open());
}

#[test]
fn subject_exposes_one_id() {
    assert_eq!(Subject::Student(4).student_id(), Some(4));
    assert_eq!(Subject::Student(4).expense_id(), None);
    assert_eq!(Subject::Expense(9).expense_id(), Some(9));
}

#[test]
fn display_names_are_exhaustive() {
    let labels: Vec<&str> = ExpenseCategory::ALL.iter().map(|c| c.display_name()).collect();
    assert_eq!(labels.len(), 9);
    assert!(ExpenseCategory::ALL.iter().all(|c| c.color().starts_with('#')));
    assert_eq!(EducationLevel::Master2.display_name(), "Master 2");
}

// =============================================================================
// SERIALIZATION
// =============================================================================

#[test]
fn enums_serialize_as_codes() {
    assert_eq!(serde_json::to_string(&AnomalyStatus::ToTreat).unwrap(), "\"to_treat\"");
    assert_eq!(serde_json::to_string(&AnomalyKind::OutOfRange).unwrap(), "\"out_of_range\"");
    assert_eq!(serde_json::to_string(&EducationLevel::Bachelor1).unwrap(), "\"bachelor-1\"");
    assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
}
