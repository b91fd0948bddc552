//! Data entry
//!
//! Student and expense writes. Batch expense entry parses each raw row on its
//! own so one bad row does not sink the others; once anything is committed the
//! anomaly persister runs over the surveyor's data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::core::error::{SurveyError, SurveyResult};
use crate::core::models::{
    EducationLevel, Expense, ExpenseCategory, GpsPoint, NewExpense, NewStudent, Sex, Student,
    StudentStatus,
};
use crate::core::ports::SurveyStore;

use super::catalog::RuleCatalog;
use super::persister::{PersistOutcome, persist_anomalies};

/// Date format accepted for expense rows
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One expense row as typed by the surveyor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseRow {
    /// Category code or label
    pub category: String,
    /// Amount in FCFA
    pub amount: String,
    /// District; empty means the student's district
    pub district: String,
    /// Spending date (`YYYY-MM-DD`); empty means today
    pub spent_on: String,
    /// Place of purchase
    pub location: String,
    /// Free comment
    pub comment: String,
}

impl ExpenseRow {
    fn is_blank(&self) -> bool {
        self.category.trim().is_empty() && self.amount.trim().is_empty()
    }
}

/// Why a row was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum RowErrorKind {
    /// Category not recognised
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    /// Amount missing, not a number, negative or not finite
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    /// Date not in `YYYY-MM-DD` form
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A rejected row, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("row {row}: {kind}")]
pub struct RowError {
    /// Row number as entered
    pub row: usize,
    /// Reason
    pub kind: RowErrorKind,
}

/// Result of a batch entry
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryOutcome {
    /// Expenses committed
    pub recorded: Vec<Expense>,
    /// Rows left empty
    pub blank: usize,
    /// Rows rejected
    pub errors: Vec<RowError>,
    /// Anomaly run that followed, if it ran and succeeded
    pub anomalies: Option<PersistOutcome>,
    /// Store failure that stopped the batch; rows before it stay committed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<String>,
}

/// Partial update of a student profile; `None` leaves a field as is
///
/// Optional profile fields take `Some(None)` to clear a recorded value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    /// New survey code
    pub survey_code: Option<String>,
    /// New name
    pub name: Option<String>,
    /// New age
    pub age: Option<Option<u32>>,
    /// New sex
    pub sex: Option<Sex>,
    /// New education level
    pub level: Option<Option<EducationLevel>>,
    /// New institution
    pub institution: Option<String>,
    /// New district
    pub district: Option<String>,
    /// New coordinates
    pub gps: Option<Option<GpsPoint>>,
    /// New notes
    pub notes: Option<String>,
    /// New workflow status
    pub status: Option<StudentStatus>,
}

impl StudentPatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, student: &mut Student) {
        if let Some(code) = self.survey_code {
            student.survey_code = code.trim().to_string();
        }
        if let Some(name) = self.name {
            student.name = name.trim().to_string();
        }
        if let Some(age) = self.age {
            student.age = age;
        }
        if let Some(sex) = self.sex {
            student.sex = sex;
        }
        if let Some(level) = self.level {
            student.level = level;
        }
        if let Some(institution) = self.institution {
            student.institution = institution.trim().to_string();
        }
        if let Some(district) = self.district {
            student.district = district.trim().to_string();
        }
        if let Some(gps) = self.gps {
            student.gps = gps;
        }
        if let Some(notes) = self.notes {
            student.notes = notes;
        }
        if let Some(status) = self.status {
            student.status = status;
        }
    }
}

fn require(field: &str, value: &str) -> SurveyResult<()> {
    if value.trim().is_empty() {
        return Err(SurveyError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Register a new student; it starts as a draft
pub fn create_student(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    new: NewStudent,
) -> SurveyResult<Student> {
    require("survey code", &new.survey_code)?;
    require("name", &new.name)?;
    let new = NewStudent {
        survey_code: new.survey_code.trim().to_string(),
        name: new.name.trim().to_string(),
        institution: new.institution.trim().to_string(),
        district: new.district.trim().to_string(),
        ..new
    };
    let student = store.insert_student(surveyor_id, new)?;
    log::debug!("surveyor {surveyor_id}: added student {}", student.survey_code);
    Ok(student)
}

/// Apply a patch to one of the surveyor's students
pub fn edit_student(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    student_id: u64,
    patch: StudentPatch,
) -> SurveyResult<Student> {
    let mut student = store
        .student(surveyor_id, student_id)?
        .ok_or_else(|| SurveyError::not_found("student", student_id))?;

    patch.apply(&mut student);
    require("survey code", &student.survey_code)?;
    require("name", &student.name)?;

    if !store.update_student(&student)? {
        return Err(SurveyError::not_found("student", student_id));
    }
    Ok(student)
}

/// Delete a student with their expenses and anomalies
pub fn delete_student(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    student_id: u64,
) -> SurveyResult<()> {
    if store.delete_student(surveyor_id, student_id)? {
        Ok(())
    } else {
        Err(SurveyError::not_found("student", student_id))
    }
}

/// Set the status of several students; returns how many changed
pub fn mark_students(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    ids: &[u64],
    status: StudentStatus,
) -> SurveyResult<usize> {
    let mut changed = 0;
    for &id in ids {
        let Some(mut student) = store.student(surveyor_id, id)? else {
            continue;
        };
        student.status = status;
        if store.update_student(&student)? {
            changed += 1;
        }
    }
    log::debug!("surveyor {surveyor_id}: {changed} student(s) marked {status}");
    Ok(changed)
}

/// Delete several students; returns how many were removed
pub fn delete_students(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    ids: &[u64],
) -> SurveyResult<usize> {
    let mut removed = 0;
    for &id in ids {
        if store.delete_student(surveyor_id, id)? {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Delete one expense with its anomalies
pub fn delete_expense(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    expense_id: u64,
) -> SurveyResult<()> {
    if store.delete_expense(surveyor_id, expense_id)? {
        Ok(())
    } else {
        Err(SurveyError::not_found("expense", expense_id))
    }
}

/// Changes to a recorded expense, as typed; `None` leaves a field as is
///
/// Values are checked like batch rows. An empty district falls back to the
/// student's and an empty location clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    /// New category code or label
    pub category: Option<String>,
    /// New amount in FCFA
    pub amount: Option<String>,
    /// New district
    pub district: Option<String>,
    /// New spending date (`YYYY-MM-DD`)
    pub spent_on: Option<String>,
    /// New place of purchase
    pub location: Option<String>,
    /// New comment
    pub comment: Option<String>,
}

impl ExpensePatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, expense: &mut Expense, student: &Student) -> Result<(), RowErrorKind> {
        if let Some(raw) = &self.category {
            expense.category = parse_category(raw)?;
        }
        if let Some(raw) = &self.amount {
            expense.amount = parse_amount(raw)?;
        }
        if let Some(raw) = &self.spent_on {
            expense.spent_on = parse_date(raw)?;
        }
        if let Some(raw) = &self.district {
            expense.district = district_or_home(raw, student);
        }
        if let Some(raw) = &self.location {
            expense.location = non_blank(raw);
        }
        if let Some(comment) = self.comment {
            expense.comment = comment.trim().to_string();
        }
        Ok(())
    }
}

/// Edit one of the surveyor's expenses in place
///
/// The expense keeps its id, student and anomalies. Nothing is written when
/// a value is rejected.
pub fn edit_expense(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    expense_id: u64,
    patch: ExpensePatch,
) -> SurveyResult<Expense> {
    let mut expense = store
        .expense(surveyor_id, expense_id)?
        .ok_or_else(|| SurveyError::not_found("expense", expense_id))?;
    let student = store
        .student(surveyor_id, expense.student_id)?
        .ok_or_else(|| SurveyError::not_found("student", expense.student_id))?;

    patch
        .apply(&mut expense, &student)
        .map_err(|kind| SurveyError::InvalidInput(kind.to_string()))?;

    if !store.update_expense(&expense)? {
        return Err(SurveyError::not_found("expense", expense_id));
    }
    log::debug!("surveyor {surveyor_id}: edited expense {expense_id}");
    Ok(expense)
}

fn parse_amount(raw: &str) -> Result<f64, RowErrorKind> {
    let invalid = || RowErrorKind::InvalidAmount(raw.to_string());
    let amount: f64 = raw.trim().replace(' ', "").parse().map_err(|_| invalid())?;
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(invalid())
    }
}

fn parse_category(raw: &str) -> Result<ExpenseCategory, RowErrorKind> {
    raw.parse().map_err(|_| RowErrorKind::UnknownCategory(raw.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, RowErrorKind> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| RowErrorKind::InvalidDate(raw.to_string()))
}

fn district_or_home(raw: &str, student: &Student) -> String {
    match raw.trim() {
        "" => student.district.trim().to_string(),
        named => named.to_string(),
    }
}

fn non_blank(raw: &str) -> Option<String> {
    Some(raw.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_row(
    row: &ExpenseRow,
    student: &Student,
    now: DateTime<Utc>,
) -> Result<NewExpense, RowErrorKind> {
    let category = parse_category(&row.category)?;
    let amount = parse_amount(&row.amount)?;

    let spent_on = match row.spent_on.trim() {
        "" => now.date_naive(),
        raw => parse_date(raw)?,
    };

    Ok(NewExpense {
        student_id: student.id,
        category,
        amount,
        district: district_or_home(&row.district, student),
        location: non_blank(&row.location),
        spent_on,
        entered_at: now,
        receipt: None,
        comment: row.comment.trim().to_string(),
    })
}

/// Record a batch of expenses for one student
///
/// Valid rows are committed even when others are rejected. A store failure
/// stops the batch and is reported in [`EntryOutcome::interrupted`] alongside
/// the rows already committed. When at least one row commits, anomaly
/// detection runs; its failure is logged, not returned.
pub fn record_expenses(
    store: &dyn SurveyStore,
    catalog: &RuleCatalog,
    surveyor_id: u64,
    student_id: u64,
    rows: &[ExpenseRow],
    now: DateTime<Utc>,
) -> SurveyResult<EntryOutcome> {
    let student = store
        .student(surveyor_id, student_id)?
        .ok_or_else(|| SurveyError::not_found("student", student_id))?;

    let mut outcome = EntryOutcome::default();
    for (index, row) in rows.iter().enumerate() {
        if row.is_blank() {
            outcome.blank += 1;
            continue;
        }
        let new = match parse_row(row, &student, now) {
            Ok(new) => new,
            Err(kind) => {
                outcome.errors.push(RowError {
                    row: index + 1,
                    kind,
                });
                continue;
            },
        };
        match store.insert_expense(surveyor_id, new) {
            Ok(expense) => outcome.recorded.push(expense),
            Err(err) => {
                let row = index + 1;
                log::error!("student {}: row {row} not saved: {err:#}", student.survey_code);
                outcome.interrupted = Some(format!("row {row}: {err:#}"));
                break;
            },
        }
    }

    if !outcome.errors.is_empty() {
        log::debug!(
            "student {}: {} row(s) rejected",
            student.survey_code,
            outcome.errors.len()
        );
    }

    if !outcome.recorded.is_empty() {
        match persist_anomalies(store, catalog, surveyor_id, now) {
            Ok(run) => outcome.anomalies = Some(run),
            Err(err) => log::warn!("anomaly detection after entry failed: {err}"),
        }
    }

    Ok(outcome)
}
