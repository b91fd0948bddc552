//! Domain models for ecotrack
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Surveyor`] - The field agent that owns a dataset
//! - [`Student`] - A surveyed individual
//! - [`Expense`] - One spending record for a student
//! - [`Anomaly`] - A stored data-quality issue
//! - [`AnomalyCandidate`] - A detector finding, before persistence
//! - [`Severity`] - How urgent an anomaly is

mod anomaly;
mod expense;
mod severity;
mod student;
mod surveyor;

pub use anomaly::{Anomaly, AnomalyCandidate, AnomalyKind, AnomalyStatus, NewAnomaly, Subject};
pub use expense::{Expense, ExpenseCategory, NewExpense};
pub use severity::Severity;
pub use student::{EducationLevel, GpsPoint, NewStudent, Sex, Student, StudentStatus};
pub use surveyor::{NewSurveyor, Surveyor};
