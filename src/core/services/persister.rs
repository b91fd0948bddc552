//! Anomaly persister
//!
//! Stores detector candidates as anomalies, skipping any whose description
//! matches an anomaly the surveyor still has open. Running it again without
//! data changes creates nothing. Findings whose cause was fixed are left as
//! they are until a surveyor resolves or ignores them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::error::SurveyResult;
use crate::core::models::{Anomaly, NewAnomaly};
use crate::core::ports::SurveyStore;

use super::catalog::RuleCatalog;
use super::detector::detect_all_anomalies;

/// What a persistence run did
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistOutcome {
    /// Number of candidates the detector produced
    pub detected: usize,
    /// Anomalies inserted by this run
    pub created: Vec<Anomaly>,
    /// Candidates skipped because an open anomaly already covers them
    pub skipped: usize,
}

/// Detect, then insert every candidate not already open
pub fn persist_anomalies(
    store: &dyn SurveyStore,
    catalog: &RuleCatalog,
    surveyor_id: u64,
    now: DateTime<Utc>,
) -> SurveyResult<PersistOutcome> {
    let candidates = detect_all_anomalies(store, catalog, surveyor_id)?;
    let mut outcome = PersistOutcome {
        detected: candidates.len(),
        ..PersistOutcome::default()
    };

    for candidate in candidates {
        let new = NewAnomaly::from_candidate(candidate, now);
        match store.insert_anomaly_unless_open(surveyor_id, new)? {
            Some(anomaly) => outcome.created.push(anomaly),
            None => outcome.skipped += 1,
        }
    }

    if !outcome.created.is_empty() {
        log::info!(
            "surveyor {surveyor_id}: {} new anomal{} ({} already open)",
            outcome.created.len(),
            if outcome.created.len() == 1 { "y" } else { "ies" },
            outcome.skipped
        );
    }

    Ok(outcome)
}
