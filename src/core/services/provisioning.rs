//! Surveyor provisioning
//!
//! Surveyors are created on purpose, never on first use. Commands look the
//! acting surveyor up with [`resolve_surveyor`] and stop if it is missing.

use chrono::{DateTime, Utc};

use crate::core::error::{SurveyError, SurveyResult};
use crate::core::models::{NewSurveyor, Surveyor};
use crate::core::ports::SurveyStore;

/// Phone recorded when none is given
pub const UNKNOWN_PHONE: &str = "unknown";

/// Create the surveyor profile for a user
///
/// Without a registration code the store assigns `USER` followed by the
/// zero-padded id.
pub fn provision_surveyor(
    store: &dyn SurveyStore,
    user: &str,
    registration_code: Option<&str>,
    phone: Option<&str>,
    now: DateTime<Utc>,
) -> SurveyResult<Surveyor> {
    let user = user.trim();
    if user.is_empty() {
        return Err(SurveyError::InvalidInput("user must not be empty".to_string()));
    }

    let new = NewSurveyor {
        user: user.to_string(),
        registration_code: non_empty(registration_code),
        phone: non_empty(phone).unwrap_or_else(|| UNKNOWN_PHONE.to_string()),
        registered_at: now,
    };
    let surveyor = store.insert_surveyor(new)?;
    log::info!("provisioned surveyor {} for {}", surveyor.registration_code, surveyor.user);
    Ok(surveyor)
}

/// Change a surveyor's registration code and/or phone
pub fn update_profile(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    registration_code: Option<&str>,
    phone: Option<&str>,
) -> SurveyResult<Surveyor> {
    let mut surveyor = store
        .surveyor(surveyor_id)?
        .ok_or_else(|| SurveyError::not_found("surveyor", surveyor_id))?;

    if let Some(code) = non_empty(registration_code) {
        surveyor.registration_code = code;
    }
    if let Some(phone) = non_empty(phone) {
        surveyor.phone = phone;
    }
    store.update_surveyor(&surveyor)?;
    Ok(surveyor)
}

/// Find the surveyor a command acts for
pub fn resolve_surveyor(store: &dyn SurveyStore, key: &str) -> SurveyResult<Surveyor> {
    store
        .find_surveyor(key.trim())?
        .ok_or_else(|| SurveyError::NotFound {
            entity: "surveyor",
            id: key.to_string(),
        })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
