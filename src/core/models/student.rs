//! Student model
//!
//! A student is the unit of data collection: one surveyed individual with a
//! profile and, eventually, a list of expenses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sex recorded on the survey form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "masculin" => Ok(Self::Male),
            "female" | "f" | "feminin" | "féminin" => Ok(Self::Female),
            _ => Err(format!("Invalid sex: {s}. Use: male, female")),
        }
    }
}

/// Education level of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    /// First year of a bachelor's degree
    Bachelor1,
    /// Second year of a bachelor's degree
    Bachelor2,
    /// Third year of a bachelor's degree
    Bachelor3,
    /// First year of a master's degree
    Master1,
    /// Second year of a master's degree
    Master2,
    /// Doctoral studies
    Doctorate,
}

impl EducationLevel {
    /// All levels, in curriculum order
    pub const ALL: [Self; 6] = [
        Self::Bachelor1,
        Self::Bachelor2,
        Self::Bachelor3,
        Self::Master1,
        Self::Master2,
        Self::Doctorate,
    ];

    /// Stable code used in configuration and storage
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Bachelor1 => "bachelor-1",
            Self::Bachelor2 => "bachelor-2",
            Self::Bachelor3 => "bachelor-3",
            Self::Master1 => "master-1",
            Self::Master2 => "master-2",
            Self::Doctorate => "doctorate",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bachelor1 => "Bachelor 1",
            Self::Bachelor2 => "Bachelor 2",
            Self::Bachelor3 => "Bachelor 3",
            Self::Master1 => "Master 1",
            Self::Master2 => "Master 2",
            Self::Doctorate => "Doctorate",
        }
    }
}

impl std::fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for EducationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Legacy survey sheets use L1..M2/D and LICENCE1..MASTER2
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "bachelor-1" | "bachelor1" | "l1" | "licence1" | "licence-1" => Ok(Self::Bachelor1),
            "bachelor-2" | "bachelor2" | "l2" | "licence2" | "licence-2" => Ok(Self::Bachelor2),
            "bachelor-3" | "bachelor3" | "l3" | "licence3" | "licence-3" => Ok(Self::Bachelor3),
            "master-1" | "master1" | "m1" => Ok(Self::Master1),
            "master-2" | "master2" | "m2" => Ok(Self::Master2),
            "doctorate" | "phd" | "d" | "doctorat" => Ok(Self::Doctorate),
            _ => Err(format!(
                "Invalid education level: {s}. Use: bachelor-1, bachelor-2, bachelor-3, master-1, \
                 master-2, doctorate"
            )),
        }
    }
}

/// Lifecycle status of a student record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    /// Being filled in
    #[default]
    Draft,
    /// All fields entered
    Complete,
    /// Checked by a supervisor
    Verified,
    /// Flagged by anomaly review
    Flagged,
}

impl std::fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Complete => write!(f, "complete"),
            Self::Verified => write!(f, "verified"),
            Self::Flagged => write!(f, "flagged"),
        }
    }
}

impl std::str::FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "brouillon" => Ok(Self::Draft),
            "complete" | "complet" => Ok(Self::Complete),
            "verified" | "verifie" | "vérifié" => Ok(Self::Verified),
            "flagged" | "anomalie" => Ok(Self::Flagged),
            _ => Err(format!("Invalid status: {s}. Use: draft, complete, verified, flagged")),
        }
    }
}

/// GPS coordinates of a student's residence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

/// A surveyed student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Store-assigned identifier
    pub id: u64,

    /// Owning surveyor
    pub surveyor_id: u64,

    /// Survey code written on the paper form, unique across the store
    pub survey_code: String,

    /// Full name
    pub name: String,

    /// Age in years, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    /// Sex
    pub sex: Sex,

    /// Education level, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<EducationLevel>,

    /// University or school
    #[serde(default)]
    pub institution: String,

    /// District of residence; empty when not filled in
    #[serde(default)]
    pub district: String,

    /// Residence coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsPoint>,

    /// Lifecycle status
    #[serde(default)]
    pub status: StudentStatus,

    /// Surveyor's free-text observations
    #[serde(default)]
    pub notes: String,

    /// Photo reference (path or URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// When the record was collected
    pub collected_at: DateTime<Utc>,
}

impl Student {
    /// Whether the district field is effectively empty
    #[must_use]
    pub fn lacks_district(&self) -> bool {
        self.district.trim().is_empty()
    }
}

/// Fields needed to insert a new student
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    /// Survey code, must be unique
    pub survey_code: String,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: Option<u32>,
    /// Sex
    pub sex: Sex,
    /// Education level
    pub level: Option<EducationLevel>,
    /// University or school
    pub institution: String,
    /// District of residence
    pub district: String,
    /// Residence coordinates
    pub gps: Option<GpsPoint>,
    /// Free-text observations
    pub notes: String,
    /// Photo reference
    pub photo: Option<String>,
    /// Collection timestamp
    pub collected_at: DateTime<Utc>,
}
