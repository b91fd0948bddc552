//! Anomaly severity levels
//!
//! Defines how urgently a data-quality issue should be looked at.

use serde::{Deserialize, Serialize};

/// Anomaly severity levels
///
/// Ordered from least to most severe, so `Severity::High > Severity::Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or minor gap, worth a look when convenient
    Low,
    /// Suspicious data that probably needs correcting
    #[default]
    Medium,
    /// Data that skews results until fixed
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "faible" => Ok(Self::Low),
            "medium" | "moyenne" => Ok(Self::Medium),
            "high" | "elevee" | "élevée" => Ok(Self::High),
            _ => Err(format!("Invalid severity: {s}. Use: low, medium, high")),
        }
    }
}
