//! Anomaly model
//!
//! An anomaly is a data-quality issue found in a surveyor's records. The
//! detector produces [`AnomalyCandidate`]s; the persister turns new ones into
//! stored [`Anomaly`] rows that surveyors then resolve or ignore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;

/// What kind of issue was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Same record entered twice
    Duplicate,
    /// Value outside the expected band
    OutOfRange,
    /// Fields that contradict each other
    Inconsistency,
    /// Required data absent
    Missing,
    /// Typo or format problem
    EntryError,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate => write!(f, "duplicate"),
            Self::OutOfRange => write!(f, "out_of_range"),
            Self::Inconsistency => write!(f, "inconsistency"),
            Self::Missing => write!(f, "missing"),
            Self::EntryError => write!(f, "entry_error"),
        }
    }
}

impl std::str::FromStr for AnomalyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "duplicate" | "doublon" => Ok(Self::Duplicate),
            "out_of_range" | "hors_norme" => Ok(Self::OutOfRange),
            "inconsistency" | "incoherence" => Ok(Self::Inconsistency),
            "missing" | "manquante" => Ok(Self::Missing),
            "entry_error" | "erreur_saisie" => Ok(Self::EntryError),
            _ => Err(format!("Invalid anomaly kind: {s}")),
        }
    }
}

/// Treatment status of a stored anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    /// Newly detected, nobody looked at it yet
    #[default]
    ToTreat,
    /// A surveyor is working on it
    InProgress,
    /// Fixed
    Resolved,
    /// Accepted as-is
    Ignored,
}

impl AnomalyStatus {
    /// Whether the anomaly still counts as open for deduplication
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::ToTreat)
    }
}

impl std::fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToTreat => write!(f, "to_treat"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

impl std::str::FromStr for AnomalyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "to_treat" | "open" | "a_traiter" => Ok(Self::ToTreat),
            "in_progress" | "en_cours" => Ok(Self::InProgress),
            "resolved" | "resolue" => Ok(Self::Resolved),
            "ignored" | "ignoree" => Ok(Self::Ignored),
            _ => Err(format!(
                "Invalid anomaly status: {s}. Use: to_treat, in_progress, resolved, ignored"
            )),
        }
    }
}

/// The record an anomaly candidate points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Subject {
    /// A student record
    Student(u64),
    /// An expense record
    Expense(u64),
}

impl Subject {
    /// Student id, when the subject is a student
    #[must_use]
    pub const fn student_id(self) -> Option<u64> {
        match self {
            Self::Student(id) => Some(id),
            Self::Expense(_) => None,
        }
    }

    /// Expense id, when the subject is an expense
    #[must_use]
    pub const fn expense_id(self) -> Option<u64> {
        match self {
            Self::Student(_) => None,
            Self::Expense(id) => Some(id),
        }
    }
}

/// A finding produced by the detector, not yet stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCandidate {
    /// What kind of issue
    pub kind: AnomalyKind,
    /// How severe
    pub severity: Severity,
    /// Record it points at
    pub subject: Subject,
    /// Human-readable description; also the dedup key
    pub description: String,
    /// Suggested remediation
    pub solution: String,
}

/// A stored anomaly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Store-assigned identifier
    pub id: u64,

    /// Owning surveyor
    pub surveyor_id: u64,

    /// Linked student
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<u64>,

    /// Linked expense
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<u64>,

    /// What kind of issue
    pub kind: AnomalyKind,

    /// How severe
    pub severity: Severity,

    /// Treatment status
    #[serde(default)]
    pub status: AnomalyStatus,

    /// Human-readable description
    pub description: String,

    /// Proposed or applied solution
    #[serde(default)]
    pub solution: String,

    /// When detected
    pub detected_at: DateTime<Utc>,

    /// When resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Fields needed to insert a new anomaly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnomaly {
    /// Linked student
    pub student_id: Option<u64>,
    /// Linked expense
    pub expense_id: Option<u64>,
    /// What kind of issue
    pub kind: AnomalyKind,
    /// How severe
    pub severity: Severity,
    /// Human-readable description
    pub description: String,
    /// Proposed solution
    pub solution: String,
    /// Detection timestamp
    pub detected_at: DateTime<Utc>,
}

impl NewAnomaly {
    /// Build an insertable anomaly from a detector candidate
    #[must_use]
    pub fn from_candidate(candidate: AnomalyCandidate, detected_at: DateTime<Utc>) -> Self {
        Self {
            student_id: candidate.subject.student_id(),
            expense_id: candidate.subject.expense_id(),
            kind: candidate.kind,
            severity: candidate.severity,
            description: candidate.description,
            solution: candidate.solution,
            detected_at,
        }
    }
}
