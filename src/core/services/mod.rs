//! Business logic services
//!
//! Operations over domain models, reaching storage only through the
//! [`SurveyStore`](crate::core::ports::SurveyStore) port.
//!
//! - [`catalog`] - Amount and age bands
//! - [`detector`] - Anomaly detection sweeps
//! - [`persister`] - Deduplicated anomaly persistence
//! - [`reporting`] - Dashboard and district aggregates
//! - [`entry`] - Student and expense writes
//! - [`triage`] - Anomaly status changes
//! - [`provisioning`] - Surveyor profiles
//! - [`search`] - Student filters

pub mod catalog;
pub mod detector;
pub mod entry;
pub mod persister;
pub mod provisioning;
pub mod reporting;
pub mod search;
pub mod triage;

pub use catalog::{AgeBand, AmountBand, CURRENCY, RuleCatalog};
pub use detector::{Detector, detect_all_anomalies, format_amount};
pub use entry::{
    EntryOutcome, ExpensePatch, ExpenseRow, RowError, RowErrorKind, StudentPatch, create_student,
    delete_expense, delete_student, delete_students, edit_expense, edit_student, mark_students,
    record_expenses,
};
pub use persister::{PersistOutcome, persist_anomalies};
pub use provisioning::{provision_surveyor, resolve_surveyor, update_profile};
pub use reporting::{
    AnomalyCounts, CategoryTotal, DailyTotal, DashboardStats, DistrictComparison, DistrictCount,
    DistrictStats, ReportOptions, SelectedComparison, SelectedDistrict, StudentStats,
    compare_districts, compute_dashboard_stats, compute_district_comparison,
    compute_student_stats,
};
pub use search::{Period, StudentFilter, search_students};
pub use triage::{delete_anomaly, ignore_anomaly, resolve_anomaly, start_anomaly};
