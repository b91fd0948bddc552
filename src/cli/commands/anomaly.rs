//! Anomaly commands - detect, scan, list and triage

use chrono::Utc;

use super::Context;
use crate::cli::app::AnomalyAction;
use ecotrack::core::ports::SurveyStore;
use ecotrack::core::services::{
    delete_anomaly, detect_all_anomalies, ignore_anomaly, persist_anomalies, resolve_anomaly,
    start_anomaly,
};
use ecotrack::output::{AnomalyList, CandidateList, OperationResult, Render};

/// Handle anomaly subcommands
pub fn anomaly(ctx: &Context, action: AnomalyAction) -> anyhow::Result<()> {
    let me = ctx.surveyor()?;

    match action {
        AnomalyAction::Detect => {
            let candidates = detect_all_anomalies(&ctx.store, &ctx.catalog()?, me.id)?;
            CandidateList { candidates }.render(ctx.mode);
        },
        AnomalyAction::Scan => {
            persist_anomalies(&ctx.store, &ctx.catalog()?, me.id, Utc::now())?.render(ctx.mode);
        },
        AnomalyAction::List {
            status,
            severity,
            kind,
        } => {
            let anomalies = ctx
                .store
                .anomalies(me.id)?
                .into_iter()
                .filter(|a| status.is_none_or(|s| a.status == s))
                .filter(|a| severity.is_none_or(|s| a.severity == s))
                .filter(|a| kind.is_none_or(|k| a.kind == k))
                .collect();
            AnomalyList { anomalies }.render(ctx.mode);
        },
        AnomalyAction::Resolve { id, solution } => {
            let done = resolve_anomaly(&ctx.store, me.id, id, solution.as_deref(), Utc::now())?;
            OperationResult::ok(format!("Resolved anomaly #{}", done.id)).render(ctx.mode);
        },
        AnomalyAction::Ignore { id } => {
            ignore_anomaly(&ctx.store, me.id, id)?;
            OperationResult::ok(format!("Ignored anomaly #{id}")).render(ctx.mode);
        },
        AnomalyAction::Start { id } => {
            start_anomaly(&ctx.store, me.id, id)?;
            OperationResult::ok(format!("Anomaly #{id} in progress")).render(ctx.mode);
        },
        AnomalyAction::Delete { id } => {
            delete_anomaly(&ctx.store, me.id, id)?;
            OperationResult::ok(format!("Deleted anomaly #{id}")).render(ctx.mode);
        },
    }
    Ok(())
}
