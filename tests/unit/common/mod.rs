//! Shared test fixtures and helpers
//!
//! A [`Survey`] wraps an in-memory store with one provisioned surveyor;
//! [`StudentBuilder`] fills in the profile fields a test does not care about.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use ecotrack::adapters::LocalStore;
use ecotrack::core::models::{
    EducationLevel, Expense, ExpenseCategory, NewExpense, NewStudent, NewSurveyor, Sex, Student,
    Surveyor,
};
use ecotrack::core::ports::SurveyStore;

/// Fixed timestamp on a given day
pub fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

/// Calendar date
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Default "now" used across tests
pub fn now() -> DateTime<Utc> {
    ts(2026, 3, 10)
}

/// Builder for new students
pub struct StudentBuilder {
    code: String,
    name: String,
    age: Option<u32>,
    sex: Sex,
    level: Option<EducationLevel>,
    district: String,
    collected_at: DateTime<Utc>,
}

impl StudentBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: format!("Student {code}"),
            age: None,
            sex: Sex::Female,
            level: None,
            district: "Melen".to_string(),
            collected_at: now(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn level(mut self, level: EducationLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn district(mut self, district: &str) -> Self {
        self.district = district.to_string();
        self
    }

    pub fn collected_at(mut self, at: DateTime<Utc>) -> Self {
        self.collected_at = at;
        self
    }

    pub fn build(self) -> NewStudent {
        NewStudent {
            survey_code: self.code,
            name: self.name,
            age: self.age,
            sex: self.sex,
            level: self.level,
            institution: "University of Yaounde I".to_string(),
            district: self.district,
            gps: None,
            notes: String::new(),
            photo: None,
            collected_at: self.collected_at,
        }
    }
}

/// In-memory store with one surveyor ready to use
pub struct Survey {
    pub store: LocalStore,
    pub surveyor: Surveyor,
}

impl Survey {
    pub fn new() -> Self {
        let store = LocalStore::in_memory();
        let surveyor = add_surveyor(&store, "alice");
        Self { store, surveyor }
    }

    /// The surveyor's id
    pub fn id(&self) -> u64 {
        self.surveyor.id
    }

    /// Provision another surveyor in the same store
    pub fn other_surveyor(&self, user: &str) -> Surveyor {
        add_surveyor(&self.store, user)
    }

    /// Insert a student for the main surveyor
    pub fn student(&self, builder: StudentBuilder) -> Student {
        self.student_for(self.id(), builder)
    }

    /// Insert a student for any surveyor
    pub fn student_for(&self, surveyor_id: u64, builder: StudentBuilder) -> Student {
        self.store.insert_student(surveyor_id, builder.build()).unwrap()
    }

    /// Insert an expense spent in the student's district
    pub fn expense(&self, student: &Student, category: ExpenseCategory, amount: f64) -> Expense {
        self.expense_at(student, category, amount, now())
    }

    /// Insert an expense entered at a given time
    pub fn expense_at(
        &self,
        student: &Student,
        category: ExpenseCategory,
        amount: f64,
        entered_at: DateTime<Utc>,
    ) -> Expense {
        self.store
            .insert_expense(student.surveyor_id, NewExpense {
                student_id: student.id,
                category,
                amount,
                district: student.district.clone(),
                location: None,
                spent_on: entered_at.date_naive(),
                entered_at,
                receipt: None,
                comment: String::new(),
            })
            .unwrap()
    }
}

impl Default for Survey {
    fn default() -> Self {
        Self::new()
    }
}

fn add_surveyor(store: &LocalStore, user: &str) -> Surveyor {
    store
        .insert_surveyor(NewSurveyor {
            user: user.to_string(),
            registration_code: None,
            phone: "699000000".to_string(),
            registered_at: ts(2026, 1, 5),
        })
        .unwrap()
}
