//! Expense model
//!
//! One spending record for one student, in FCFA.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Spending category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Rent and utilities
    Housing,
    /// Food and drinks
    Food,
    /// Transport
    Transport,
    /// Health and hygiene
    Health,
    /// Internet and phone
    Communication,
    /// Tuition and academic fees
    Tuition,
    /// Leisure and entertainment
    Leisure,
    /// Clothing
    Clothing,
    /// Anything else
    Other,
}

impl ExpenseCategory {
    /// All categories, in form order
    pub const ALL: [Self; 9] = [
        Self::Housing,
        Self::Food,
        Self::Transport,
        Self::Health,
        Self::Communication,
        Self::Tuition,
        Self::Leisure,
        Self::Clothing,
        Self::Other,
    ];

    /// Stable code used in configuration and storage
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Housing => "housing",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Health => "health",
            Self::Communication => "communication",
            Self::Tuition => "tuition",
            Self::Leisure => "leisure",
            Self::Clothing => "clothing",
            Self::Other => "other",
        }
    }

    /// Label shown on dashboards
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Health => "Health",
            Self::Communication => "Communication",
            Self::Tuition => "Tuition",
            Self::Leisure => "Leisure",
            Self::Clothing => "Clothing",
            Self::Other => "Other",
        }
    }

    /// Chart colour (hex)
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Housing => "#3b82f6",
            Self::Food => "#10b981",
            Self::Transport => "#f59e0b",
            Self::Health => "#ef4444",
            Self::Communication => "#6366f1",
            Self::Tuition => "#8b5cf6",
            Self::Leisure => "#ec4899",
            Self::Clothing => "#14b8a6",
            Self::Other => "#94a3b8",
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Second column of each arm: codes found on legacy survey sheets
        match s.trim().to_lowercase().as_str() {
            "housing" | "logement" => Ok(Self::Housing),
            "food" | "nourriture" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "health" | "sante" | "santé" => Ok(Self::Health),
            "communication" => Ok(Self::Communication),
            "tuition" | "education" | "formation" => Ok(Self::Tuition),
            "leisure" | "loisirs" | "divertissement" => Ok(Self::Leisure),
            "clothing" | "habillement" => Ok(Self::Clothing),
            "other" | "autre" | "autres" => Ok(Self::Other),
            _ => Err(format!("Invalid category: {s}")),
        }
    }
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Store-assigned identifier
    pub id: u64,

    /// Student the expense belongs to
    pub student_id: u64,

    /// Owning surveyor
    pub surveyor_id: u64,

    /// Spending category
    pub category: ExpenseCategory,

    /// Amount in FCFA
    pub amount: f64,

    /// District where the money was spent
    #[serde(default)]
    pub district: String,

    /// Market, shop, etc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Day the money was spent
    pub spent_on: NaiveDate,

    /// When the row was entered
    pub entered_at: DateTime<Utc>,

    /// Receipt photo reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,

    /// Free-text comment
    #[serde(default)]
    pub comment: String,

    /// Whether the surveyor considers the row valid
    #[serde(default = "default_valid")]
    pub is_valid: bool,

    /// Surveyor's note about a known problem with this row
    #[serde(default)]
    pub anomaly_note: String,
}

const fn default_valid() -> bool {
    true
}

/// Fields needed to insert a new expense
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Student the expense belongs to
    pub student_id: u64,
    /// Spending category
    pub category: ExpenseCategory,
    /// Amount in FCFA
    pub amount: f64,
    /// District where the money was spent
    pub district: String,
    /// Market, shop, etc.
    pub location: Option<String>,
    /// Day the money was spent
    pub spent_on: NaiveDate,
    /// Entry timestamp
    pub entered_at: DateTime<Utc>,
    /// Receipt reference
    pub receipt: Option<String>,
    /// Free-text comment
    pub comment: String,
}
