//! Local dataset store
//!
//! Implements `SurveyStore` over an in-memory [`Dataset`] guarded by an
//! `RwLock`. When opened from a file, every successful write is flushed back
//! to that file before the lock is released; a write that fails leaves the
//! in-memory dataset as it was.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};

use crate::core::error::SurveyError;
use crate::core::models::{
    Anomaly, AnomalyStatus, Expense, NewAnomaly, NewExpense, NewStudent, NewSurveyor, Student,
    StudentStatus, Surveyor,
};
use crate::core::ports::SurveyStore;

use super::json;

/// Last id handed out per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    /// Surveyor ids
    pub surveyor: u64,
    /// Student ids
    pub student: u64,
    /// Expense ids
    pub expense: u64,
    /// Anomaly ids
    pub anomaly: u64,
}

/// Every table of the survey database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Id sequences
    #[serde(default)]
    pub sequences: Sequences,
    /// Surveyor table
    #[serde(default)]
    pub surveyors: Vec<Surveyor>,
    /// Student table
    #[serde(default)]
    pub students: Vec<Student>,
    /// Expense table
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Anomaly table
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
}

impl Dataset {
    /// Raise each sequence to at least the largest id present
    ///
    /// Hand-edited or older files may carry records without sequences.
    pub fn reconcile_sequences(&mut self) {
        let seq = &mut self.sequences;
        seq.surveyor = seq.surveyor.max(self.surveyors.iter().map(|s| s.id).max().unwrap_or(0));
        seq.student = seq.student.max(self.students.iter().map(|s| s.id).max().unwrap_or(0));
        seq.expense = seq.expense.max(self.expenses.iter().map(|e| e.id).max().unwrap_or(0));
        seq.anomaly = seq.anomaly.max(self.anomalies.iter().map(|a| a.id).max().unwrap_or(0));
    }

    fn owns_student(&self, surveyor_id: u64, student_id: u64) -> bool {
        self.students.iter().any(|s| s.id == student_id && s.surveyor_id == surveyor_id)
    }

    fn survey_code_taken(&self, code: &str, except: Option<u64>) -> bool {
        self.students.iter().any(|s| s.survey_code == code && Some(s.id) != except)
    }

    fn registration_code_taken(&self, code: &str, except: Option<u64>) -> bool {
        self.surveyors
            .iter()
            .any(|s| s.registration_code.eq_ignore_ascii_case(code) && Some(s.id) != except)
    }

    fn push_anomaly(&mut self, surveyor_id: u64, new: NewAnomaly) -> Anomaly {
        self.sequences.anomaly += 1;
        let anomaly = Anomaly {
            id: self.sequences.anomaly,
            surveyor_id,
            student_id: new.student_id,
            expense_id: new.expense_id,
            kind: new.kind,
            severity: new.severity,
            status: AnomalyStatus::ToTreat,
            description: new.description,
            solution: new.solution,
            detected_at: new.detected_at,
            resolved_at: None,
        };
        self.anomalies.push(anomaly.clone());
        anomaly
    }

    fn has_open_anomaly(&self, surveyor_id: u64, description: &str) -> bool {
        self.anomalies.iter().any(|a| {
            a.surveyor_id == surveyor_id && a.status.is_open() && a.description == description
        })
    }
}

/// Survey store backed by an in-memory dataset, optionally mirrored to disk
#[derive(Debug)]
pub struct LocalStore {
    data: RwLock<Dataset>,
    backing_file: Option<PathBuf>,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl LocalStore {
    /// Create an empty store that never touches the filesystem
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_dataset(Dataset::default())
    }

    /// Wrap an existing dataset, without a backing file
    #[must_use]
    pub fn from_dataset(mut dataset: Dataset) -> Self {
        dataset.reconcile_sequences();
        Self {
            data: RwLock::new(dataset),
            backing_file: None,
        }
    }

    /// Open a store mirrored to a JSON file; a missing file starts empty
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let dataset = json::load_dataset(path)?;
        Ok(Self {
            data: RwLock::new(dataset),
            backing_file: Some(path.to_path_buf()),
        })
    }

    /// Path of the backing file, if any
    #[must_use]
    pub fn backing_file(&self) -> Option<&Path> {
        self.backing_file.as_deref()
    }

    /// Copy of the whole dataset
    pub fn snapshot(&self) -> anyhow::Result<Dataset> {
        Ok(self.read()?.clone())
    }

    /// Write the dataset to the backing file, if any
    pub fn flush(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.backing_file {
            json::save_dataset(path, &*self.read()?)?;
        }
        Ok(())
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, Dataset>> {
        self.data.read().map_err(|_| anyhow::anyhow!("dataset lock poisoned"))
    }

    /// Run a mutation on a copy under the write lock
    ///
    /// The copy replaces the live dataset only once the mutation succeeds and
    /// the backing file, if any, is written.
    fn write<T>(&self, op: impl FnOnce(&mut Dataset) -> anyhow::Result<T>) -> anyhow::Result<T> {
        let mut guard = self.data.write().map_err(|_| anyhow::anyhow!("dataset lock poisoned"))?;
        let mut draft = guard.clone();
        let out = op(&mut draft)?;
        if let Some(path) = &self.backing_file {
            json::save_dataset(path, &draft)?;
        }
        *guard = draft;
        Ok(out)
    }
}

impl SurveyStore for LocalStore {
    fn surveyor(&self, id: u64) -> anyhow::Result<Option<Surveyor>> {
        Ok(self.read()?.surveyors.iter().find(|s| s.id == id).cloned())
    }

    fn find_surveyor(&self, key: &str) -> anyhow::Result<Option<Surveyor>> {
        Ok(self.read()?.surveyors.iter().find(|s| s.is_named(key)).cloned())
    }

    fn insert_surveyor(&self, new: NewSurveyor) -> anyhow::Result<Surveyor> {
        self.write(|data| {
            if data.surveyors.iter().any(|s| s.user == new.user) {
                return Err(SurveyError::Conflict(format!(
                    "user {} already has a surveyor profile",
                    new.user
                ))
                .into());
            }
            let id = data.sequences.surveyor + 1;
            let code = new.registration_code.unwrap_or_else(|| format!("USER{id:03}"));
            if data.registration_code_taken(&code, None) {
                return Err(SurveyError::Conflict(format!(
                    "registration code {code} already in use"
                ))
                .into());
            }
            data.sequences.surveyor = id;
            let surveyor = Surveyor {
                id,
                user: new.user,
                registration_code: code,
                phone: new.phone,
                registered_at: new.registered_at,
            };
            data.surveyors.push(surveyor.clone());
            Ok(surveyor)
        })
    }

    fn update_surveyor(&self, surveyor: &Surveyor) -> anyhow::Result<()> {
        self.write(|data| {
            if data.registration_code_taken(&surveyor.registration_code, Some(surveyor.id)) {
                return Err(SurveyError::Conflict(format!(
                    "registration code {} already in use",
                    surveyor.registration_code
                ))
                .into());
            }
            let slot = data
                .surveyors
                .iter_mut()
                .find(|s| s.id == surveyor.id)
                .ok_or_else(|| SurveyError::not_found("surveyor", surveyor.id))?;
            *slot = surveyor.clone();
            Ok(())
        })
    }

    fn students(&self, surveyor_id: u64) -> anyhow::Result<Vec<Student>> {
        let data = self.read()?;
        let mut students: Vec<Student> =
            data.students.iter().filter(|s| s.surveyor_id == surveyor_id).cloned().collect();
        students.sort_by_key(|s| s.id);
        Ok(students)
    }

    fn student(&self, surveyor_id: u64, id: u64) -> anyhow::Result<Option<Student>> {
        Ok(self
            .read()?
            .students
            .iter()
            .find(|s| s.id == id && s.surveyor_id == surveyor_id)
            .cloned())
    }

    fn insert_student(&self, surveyor_id: u64, new: NewStudent) -> anyhow::Result<Student> {
        self.write(|data| {
            if data.survey_code_taken(&new.survey_code, None) {
                return Err(SurveyError::Conflict(format!(
                    "survey code {} already in use",
                    new.survey_code
                ))
                .into());
            }
            data.sequences.student += 1;
            let student = Student {
                id: data.sequences.student,
                surveyor_id,
                survey_code: new.survey_code,
                name: new.name,
                age: new.age,
                sex: new.sex,
                level: new.level,
                institution: new.institution,
                district: new.district,
                gps: new.gps,
                status: StudentStatus::Draft,
                notes: new.notes,
                photo: new.photo,
                collected_at: new.collected_at,
            };
            data.students.push(student.clone());
            Ok(student)
        })
    }

    fn update_student(&self, student: &Student) -> anyhow::Result<bool> {
        self.write(|data| {
            if !data.owns_student(student.surveyor_id, student.id) {
                return Ok(false);
            }
            if data.survey_code_taken(&student.survey_code, Some(student.id)) {
                return Err(SurveyError::Conflict(format!(
                    "survey code {} already in use",
                    student.survey_code
                ))
                .into());
            }
            if let Some(slot) = data.students.iter_mut().find(|s| s.id == student.id) {
                *slot = student.clone();
            }
            Ok(true)
        })
    }

    fn delete_student(&self, surveyor_id: u64, id: u64) -> anyhow::Result<bool> {
        self.write(|data| {
            if !data.owns_student(surveyor_id, id) {
                return Ok(false);
            }
            let expense_ids: Vec<u64> =
                data.expenses.iter().filter(|e| e.student_id == id).map(|e| e.id).collect();
            data.students.retain(|s| s.id != id);
            data.expenses.retain(|e| e.student_id != id);
            data.anomalies.retain(|a| {
                a.student_id != Some(id)
                    && !a.expense_id.is_some_and(|expense| expense_ids.contains(&expense))
            });
            Ok(true)
        })
    }

    fn expenses(&self, surveyor_id: u64) -> anyhow::Result<Vec<Expense>> {
        let data = self.read()?;
        let mut expenses: Vec<Expense> =
            data.expenses.iter().filter(|e| e.surveyor_id == surveyor_id).cloned().collect();
        expenses.sort_by_key(|e| e.id);
        Ok(expenses)
    }

    fn expense(&self, surveyor_id: u64, id: u64) -> anyhow::Result<Option<Expense>> {
        Ok(self
            .read()?
            .expenses
            .iter()
            .find(|e| e.id == id && e.surveyor_id == surveyor_id)
            .cloned())
    }

    fn insert_expense(&self, surveyor_id: u64, new: NewExpense) -> anyhow::Result<Expense> {
        self.write(|data| {
            if !data.owns_student(surveyor_id, new.student_id) {
                return Err(SurveyError::not_found("student", new.student_id).into());
            }
            data.sequences.expense += 1;
            let expense = Expense {
                id: data.sequences.expense,
                student_id: new.student_id,
                surveyor_id,
                category: new.category,
                amount: new.amount,
                district: new.district,
                location: new.location,
                spent_on: new.spent_on,
                entered_at: new.entered_at,
                receipt: new.receipt,
                comment: new.comment,
                is_valid: true,
                anomaly_note: String::new(),
            };
            data.expenses.push(expense.clone());
            Ok(expense)
        })
    }

    fn update_expense(&self, expense: &Expense) -> anyhow::Result<bool> {
        self.write(|data| {
            let Some(slot) = data
                .expenses
                .iter_mut()
                .find(|e| e.id == expense.id && e.surveyor_id == expense.surveyor_id)
            else {
                return Ok(false);
            };
            *slot = Expense {
                student_id: slot.student_id,
                ..expense.clone()
            };
            Ok(true)
        })
    }

    fn delete_expense(&self, surveyor_id: u64, id: u64) -> anyhow::Result<bool> {
        self.write(|data| {
            let before = data.expenses.len();
            data.expenses.retain(|e| !(e.id == id && e.surveyor_id == surveyor_id));
            if data.expenses.len() == before {
                return Ok(false);
            }
            data.anomalies.retain(|a| a.expense_id != Some(id));
            Ok(true)
        })
    }

    fn anomalies(&self, surveyor_id: u64) -> anyhow::Result<Vec<Anomaly>> {
        let data = self.read()?;
        let mut anomalies: Vec<Anomaly> =
            data.anomalies.iter().filter(|a| a.surveyor_id == surveyor_id).cloned().collect();
        anomalies.sort_by_key(|a| a.id);
        Ok(anomalies)
    }

    fn anomaly(&self, surveyor_id: u64, id: u64) -> anyhow::Result<Option<Anomaly>> {
        Ok(self
            .read()?
            .anomalies
            .iter()
            .find(|a| a.id == id && a.surveyor_id == surveyor_id)
            .cloned())
    }

    fn open_anomaly_exists(&self, surveyor_id: u64, description: &str) -> anyhow::Result<bool> {
        Ok(self.read()?.has_open_anomaly(surveyor_id, description))
    }

    fn insert_anomaly(&self, surveyor_id: u64, new: NewAnomaly) -> anyhow::Result<Anomaly> {
        self.write(|data| Ok(data.push_anomaly(surveyor_id, new)))
    }

    fn update_anomaly(&self, anomaly: &Anomaly) -> anyhow::Result<bool> {
        self.write(|data| {
            match data
                .anomalies
                .iter_mut()
                .find(|a| a.id == anomaly.id && a.surveyor_id == anomaly.surveyor_id)
            {
                Some(slot) => {
                    *slot = anomaly.clone();
                    Ok(true)
                },
                None => Ok(false),
            }
        })
    }

    fn delete_anomaly(&self, surveyor_id: u64, id: u64) -> anyhow::Result<bool> {
        self.write(|data| {
            let before = data.anomalies.len();
            data.anomalies.retain(|a| !(a.id == id && a.surveyor_id == surveyor_id));
            Ok(data.anomalies.len() < before)
        })
    }

    fn insert_anomaly_unless_open(
        &self,
        surveyor_id: u64,
        new: NewAnomaly,
    ) -> anyhow::Result<Option<Anomaly>> {
        // Check and insert under one write lock
        self.write(|data| {
            if data.has_open_anomaly(surveyor_id, &new.description) {
                return Ok(None);
            }
            Ok(Some(data.push_anomaly(surveyor_id, new)))
        })
    }
}
