//! Anomaly detector
//!
//! Runs the rule catalog over one surveyor's students and expenses. Four
//! independent sweeps each return candidates; [`Detector::detect_all`]
//! concatenates them in a fixed order:
//!
//! 1. duplicate students (same name, ignoring case)
//! 2. expenses outside their category band
//! 3. ages atypical for the education level
//! 4. students without expenses, then students without a district
//!
//! The detector is pure. [`detect_all_anomalies`] is the store-driven entry
//! point.

use std::collections::{HashMap, HashSet};

use crate::core::error::SurveyResult;
use crate::core::models::{AnomalyCandidate, AnomalyKind, Expense, Severity, Student, Subject};
use crate::core::ports::SurveyStore;

use super::catalog::{CURRENCY, RuleCatalog};

/// Detector bound to one surveyor and one catalog
#[derive(Debug, Clone, Copy)]
pub struct Detector<'a> {
    catalog: &'a RuleCatalog,
    surveyor_id: u64,
}

impl<'a> Detector<'a> {
    /// Create a detector for the given surveyor
    #[must_use]
    pub const fn new(catalog: &'a RuleCatalog, surveyor_id: u64) -> Self {
        Self {
            catalog,
            surveyor_id,
        }
    }

    /// Run every sweep, in order
    #[must_use]
    pub fn detect_all(&self, students: &[Student], expenses: &[Expense]) -> Vec<AnomalyCandidate> {
        let mut found = self.duplicates(students);
        found.extend(self.out_of_range(expenses));
        found.extend(self.age_level_mismatches(students));
        found.extend(self.missing_data(students, expenses));
        log::debug!(
            "surveyor {}: {} candidate(s) over {} student(s), {} expense(s)",
            self.surveyor_id,
            found.len(),
            students.len(),
            expenses.len()
        );
        found
    }

    /// Students sharing a case-insensitively equal name with another student
    #[must_use]
    pub fn duplicates(&self, students: &[Student]) -> Vec<AnomalyCandidate> {
        let owned: Vec<&Student> = self.own_students(students).collect();

        let mut by_name: HashMap<String, usize> = HashMap::with_capacity(owned.len());
        for student in &owned {
            *by_name.entry(normalize_name(&student.name)).or_default() += 1;
        }

        owned
            .into_iter()
            .filter(|s| by_name.get(&normalize_name(&s.name)).is_some_and(|&n| n > 1))
            .map(|s| AnomalyCandidate {
                kind: AnomalyKind::Duplicate,
                severity: Severity::Medium,
                subject: Subject::Student(s.id),
                description: format!("Possible duplicate student: {} ({})", s.name, s.survey_code),
                solution: "Check whether this is the same student and delete the duplicate"
                    .to_string(),
            })
            .collect()
    }

    /// Expenses below or above their category band
    #[must_use]
    pub fn out_of_range(&self, expenses: &[Expense]) -> Vec<AnomalyCandidate> {
        let mut found = Vec::new();

        for expense in expenses.iter().filter(|e| e.surveyor_id == self.surveyor_id) {
            let band = self.catalog.amount_band(expense.category);
            let label = expense.category.display_name();

            if expense.amount < band.min {
                found.push(AnomalyCandidate {
                    kind: AnomalyKind::OutOfRange,
                    severity: Severity::Low,
                    subject: Subject::Expense(expense.id),
                    description: format!(
                        "Unusually low {label} expense #{}: {} {CURRENCY}",
                        expense.id,
                        format_amount(expense.amount)
                    ),
                    solution: format!(
                        "Check the amount. Expected minimum: {} {CURRENCY}",
                        format_amount(band.min)
                    ),
                });
            }

            if expense.amount > band.max {
                found.push(AnomalyCandidate {
                    kind: AnomalyKind::OutOfRange,
                    severity: Severity::High,
                    subject: Subject::Expense(expense.id),
                    description: format!(
                        "Unusually high {label} expense #{}: {} {CURRENCY}",
                        expense.id,
                        format_amount(expense.amount)
                    ),
                    solution: format!(
                        "Check the amount. Expected maximum: {} {CURRENCY}",
                        format_amount(band.max)
                    ),
                });
            }
        }

        found
    }

    /// Students whose age is atypical for their education level
    #[must_use]
    pub fn age_level_mismatches(&self, students: &[Student]) -> Vec<AnomalyCandidate> {
        self.own_students(students)
            .filter_map(|s| {
                let (age, level) = (s.age?, s.level?);
                let band = self.catalog.age_band(level)?;
                (!band.contains(age)).then(|| AnomalyCandidate {
                    kind: AnomalyKind::Inconsistency,
                    severity: Severity::Medium,
                    subject: Subject::Student(s.id),
                    description: format!(
                        "Age ({age}) atypical for {} ({})",
                        level.display_name(),
                        s.survey_code
                    ),
                    solution: "Check the student's age or education level".to_string(),
                })
            })
            .collect()
    }

    /// Students with no expense, then students with no district
    #[must_use]
    pub fn missing_data(
        &self,
        students: &[Student],
        expenses: &[Expense],
    ) -> Vec<AnomalyCandidate> {
        let with_expenses: HashSet<u64> = expenses
            .iter()
            .filter(|e| e.surveyor_id == self.surveyor_id)
            .map(|e| e.student_id)
            .collect();

        let no_expense = self.own_students(students).filter(|s| !with_expenses.contains(&s.id)).map(
            |s| AnomalyCandidate {
                kind: AnomalyKind::Missing,
                severity: Severity::High,
                subject: Subject::Student(s.id),
                description: format!(
                    "Student without any recorded expense: {} ({})",
                    s.name, s.survey_code
                ),
                solution: "Add at least one expense for this student".to_string(),
            },
        );

        let no_district = self.own_students(students).filter(|s| s.lacks_district()).map(|s| {
            AnomalyCandidate {
                kind: AnomalyKind::Missing,
                severity: Severity::Low,
                subject: Subject::Student(s.id),
                description: format!("Student without a district: {} ({})", s.name, s.survey_code),
                solution: "Fill in the student's district of residence".to_string(),
            }
        });

        no_expense.chain(no_district).collect()
    }

    fn own_students<'s>(&self, students: &'s [Student]) -> impl Iterator<Item = &'s Student> {
        let surveyor_id = self.surveyor_id;
        students.iter().filter(move |s| s.surveyor_id == surveyor_id)
    }
}

/// Run every sweep over the surveyor's records in the store
pub fn detect_all_anomalies(
    store: &dyn SurveyStore,
    catalog: &RuleCatalog,
    surveyor_id: u64,
) -> SurveyResult<Vec<AnomalyCandidate>> {
    let students = store.students(surveyor_id)?;
    let expenses = store.expenses(surveyor_id)?;
    Ok(Detector::new(catalog, surveyor_id).detect_all(&students, &expenses))
}

/// Key under which two names count as the same person
fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Render an amount the same way every run: whole units when integral,
/// otherwise two decimals
#[must_use]
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}
