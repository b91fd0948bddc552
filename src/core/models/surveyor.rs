//! Surveyor model
//!
//! A surveyor is the field agent account that owns every student, expense
//! and anomaly it records. All queries are scoped to one surveyor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A field surveyor account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surveyor {
    /// Store-assigned identifier
    pub id: u64,

    /// User account reference (login name), unique
    pub user: String,

    /// Registration code printed on the surveyor's badge, unique
    pub registration_code: String,

    /// Contact phone number
    pub phone: String,

    /// When the surveyor was provisioned
    pub registered_at: DateTime<Utc>,
}

impl Surveyor {
    /// Whether `key` names this surveyor, by registration code or user name
    #[must_use]
    pub fn is_named(&self, key: &str) -> bool {
        self.registration_code.eq_ignore_ascii_case(key) || self.user == key
    }
}

/// Fields needed to insert a new surveyor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurveyor {
    /// User account reference
    pub user: String,

    /// Registration code; `None` lets the store derive one from the id
    pub registration_code: Option<String>,

    /// Contact phone number
    pub phone: String,

    /// Provisioning timestamp
    pub registered_at: DateTime<Utc>,
}
