//! Student search

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::error::SurveyResult;
use crate::core::models::{Sex, Student, StudentStatus};
use crate::core::ports::SurveyStore;

/// Collection period, counted back from now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Same calendar day
    Today,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 90 days
    Quarter,
}

impl Period {
    /// Whether `at` falls in the period ending at `now`
    #[must_use]
    pub fn contains(self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let days = match self {
            Self::Today => return at.date_naive() == now.date_naive(),
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        };
        at >= now - TimeDelta::days(days)
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "aujourdhui" => Ok(Self::Today),
            "week" | "semaine" => Ok(Self::Week),
            "month" | "mois" => Ok(Self::Month),
            "quarter" | "trimestre" => Ok(Self::Quarter),
            _ => Err(format!("Invalid period: {s}. Use: today, week, month, quarter")),
        }
    }
}

/// Criteria for listing students; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact district
    pub district: Option<String>,
    /// Workflow status
    pub status: Option<StudentStatus>,
    /// Sex
    pub sex: Option<Sex>,
    /// Collection period
    pub period: Option<Period>,
}

impl StudentFilter {
    /// Whether a student meets every criterion
    #[must_use]
    pub fn matches(&self, student: &Student, now: DateTime<Utc>) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|needle| student.name.to_lowercase().contains(&needle.to_lowercase()));
        let district_ok =
            self.district.as_deref().is_none_or(|d| student.district.trim() == d.trim());

        name_ok
            && district_ok
            && self.status.is_none_or(|s| student.status == s)
            && self.sex.is_none_or(|s| student.sex == s)
            && self.period.is_none_or(|p| p.contains(student.collected_at, now))
    }
}

/// The surveyor's students matching `filter`, ordered by id
pub fn search_students(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    filter: &StudentFilter,
    now: DateTime<Utc>,
) -> SurveyResult<Vec<Student>> {
    Ok(store
        .students(surveyor_id)?
        .into_iter()
        .filter(|s| filter.matches(s, now))
        .collect())
}
