//! Anomaly triage
//!
//! Status transitions a surveyor applies to their anomalies. Any status may
//! move to any other; only resolution stamps a timestamp.

use chrono::{DateTime, Utc};

use crate::core::error::{SurveyError, SurveyResult};
use crate::core::models::{Anomaly, AnomalyStatus};
use crate::core::ports::SurveyStore;

fn load(store: &dyn SurveyStore, surveyor_id: u64, id: u64) -> SurveyResult<Anomaly> {
    store
        .anomaly(surveyor_id, id)?
        .ok_or_else(|| SurveyError::not_found("anomaly", id))
}

fn save(store: &dyn SurveyStore, anomaly: Anomaly) -> SurveyResult<Anomaly> {
    if store.update_anomaly(&anomaly)? {
        Ok(anomaly)
    } else {
        Err(SurveyError::not_found("anomaly", anomaly.id))
    }
}

/// Mark an anomaly resolved, optionally recording how
pub fn resolve_anomaly(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    id: u64,
    solution: Option<&str>,
    now: DateTime<Utc>,
) -> SurveyResult<Anomaly> {
    let mut anomaly = load(store, surveyor_id, id)?;
    anomaly.status = AnomalyStatus::Resolved;
    anomaly.resolved_at = Some(now);
    if let Some(text) = solution.map(str::trim).filter(|t| !t.is_empty()) {
        anomaly.solution = text.to_string();
    }
    log::debug!("anomaly {id} resolved");
    save(store, anomaly)
}

/// Dismiss an anomaly as not a real problem
pub fn ignore_anomaly(store: &dyn SurveyStore, surveyor_id: u64, id: u64) -> SurveyResult<Anomaly> {
    set_status(store, surveyor_id, id, AnomalyStatus::Ignored)
}

/// Flag an anomaly as being worked on
pub fn start_anomaly(store: &dyn SurveyStore, surveyor_id: u64, id: u64) -> SurveyResult<Anomaly> {
    set_status(store, surveyor_id, id, AnomalyStatus::InProgress)
}

/// Set any status without touching the resolution timestamp
pub fn set_status(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    id: u64,
    status: AnomalyStatus,
) -> SurveyResult<Anomaly> {
    let mut anomaly = load(store, surveyor_id, id)?;
    anomaly.status = status;
    save(store, anomaly)
}

/// Delete an anomaly outright
pub fn delete_anomaly(store: &dyn SurveyStore, surveyor_id: u64, id: u64) -> SurveyResult<()> {
    if store.delete_anomaly(surveyor_id, id)? {
        Ok(())
    } else {
        Err(SurveyError::not_found("anomaly", id))
    }
}
