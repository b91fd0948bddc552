//! Survey store port
//!
//! Defines the interface to the relational data store. Every record query
//! takes the owning surveyor's id explicitly; implementations must never
//! return another surveyor's records.

use crate::core::models::{
    Anomaly, Expense, NewAnomaly, NewExpense, NewStudent, NewSurveyor, Student, Surveyor,
};

/// Storage for surveyors, students, expenses and anomalies
///
/// Writes that break a uniqueness rule fail with
/// [`SurveyError::Conflict`](crate::core::error::SurveyError::Conflict)
/// wrapped in the returned `anyhow::Error`.
pub trait SurveyStore: Send + Sync {
    // === Surveyors ===

    /// Look up a surveyor by id
    fn surveyor(&self, id: u64) -> anyhow::Result<Option<Surveyor>>;

    /// Look up a surveyor by registration code (case-insensitive) or user name
    fn find_surveyor(&self, key: &str) -> anyhow::Result<Option<Surveyor>>;

    /// Insert a surveyor; user and registration code must be unique
    fn insert_surveyor(&self, new: NewSurveyor) -> anyhow::Result<Surveyor>;

    /// Replace a surveyor's profile fields
    fn update_surveyor(&self, surveyor: &Surveyor) -> anyhow::Result<()>;

    // === Students ===

    /// All students owned by the surveyor, ordered by id
    fn students(&self, surveyor_id: u64) -> anyhow::Result<Vec<Student>>;

    /// One student, if owned by the surveyor
    fn student(&self, surveyor_id: u64, id: u64) -> anyhow::Result<Option<Student>>;

    /// Insert a student; survey code must be unique
    fn insert_student(&self, surveyor_id: u64, new: NewStudent) -> anyhow::Result<Student>;

    /// Replace a student's fields. Returns `false` when not owned/absent.
    fn update_student(&self, student: &Student) -> anyhow::Result<bool>;

    /// Delete a student with its expenses and linked anomalies.
    /// Returns `false` when not owned/absent.
    fn delete_student(&self, surveyor_id: u64, id: u64) -> anyhow::Result<bool>;

    // === Expenses ===

    /// All expenses owned by the surveyor, ordered by id
    fn expenses(&self, surveyor_id: u64) -> anyhow::Result<Vec<Expense>>;

    /// One expense, if owned by the surveyor
    fn expense(&self, surveyor_id: u64, id: u64) -> anyhow::Result<Option<Expense>>;

    /// Insert an expense for one of the surveyor's students
    fn insert_expense(&self, surveyor_id: u64, new: NewExpense) -> anyhow::Result<Expense>;

    /// Replace an expense's fields; its student and owner stay as stored.
    /// Returns `false` when not owned/absent.
    fn update_expense(&self, expense: &Expense) -> anyhow::Result<bool>;

    /// Delete an expense with its linked anomalies.
    /// Returns `false` when not owned/absent.
    fn delete_expense(&self, surveyor_id: u64, id: u64) -> anyhow::Result<bool>;

    /// Expenses of one student
    fn student_expenses(&self, surveyor_id: u64, student_id: u64) -> anyhow::Result<Vec<Expense>> {
        Ok(self
            .expenses(surveyor_id)?
            .into_iter()
            .filter(|e| e.student_id == student_id)
            .collect())
    }

    // === Anomalies ===

    /// All anomalies owned by the surveyor, ordered by id
    fn anomalies(&self, surveyor_id: u64) -> anyhow::Result<Vec<Anomaly>>;

    /// One anomaly, if owned by the surveyor
    fn anomaly(&self, surveyor_id: u64, id: u64) -> anyhow::Result<Option<Anomaly>>;

    /// Whether a `to_treat` anomaly with this exact description exists
    fn open_anomaly_exists(&self, surveyor_id: u64, description: &str) -> anyhow::Result<bool>;

    /// Insert an anomaly with status `to_treat`
    fn insert_anomaly(&self, surveyor_id: u64, new: NewAnomaly) -> anyhow::Result<Anomaly>;

    /// Replace an anomaly's mutable fields. Returns `false` when not owned/absent.
    fn update_anomaly(&self, anomaly: &Anomaly) -> anyhow::Result<bool>;

    /// Delete an anomaly. Returns `false` when not owned/absent.
    fn delete_anomaly(&self, surveyor_id: u64, id: u64) -> anyhow::Result<bool>;

    /// Insert unless an open anomaly with the same description exists
    ///
    /// Returns the inserted anomaly, or `None` when deduplicated. Stores with
    /// their own locking should override this to run under one lock.
    fn insert_anomaly_unless_open(
        &self,
        surveyor_id: u64,
        new: NewAnomaly,
    ) -> anyhow::Result<Option<Anomaly>> {
        if self.open_anomaly_exists(surveyor_id, &new.description)? {
            return Ok(None);
        }
        self.insert_anomaly(surveyor_id, new).map(Some)
    }
}
