//! Report commands - dashboard and district comparison

use chrono::Utc;

use super::Context;
use ecotrack::core::models::ExpenseCategory;
use ecotrack::core::services::{
    compare_districts, compute_dashboard_stats, compute_district_comparison,
};
use ecotrack::output::Render;

/// Print the dashboard
pub fn dashboard(ctx: &Context) -> anyhow::Result<()> {
    let me = ctx.surveyor()?;
    let options = ctx.config.report_options();
    let stats = compute_dashboard_stats(&ctx.store, me.id, Utc::now().date_naive(), &options)?;
    stats.render(ctx.mode);
    Ok(())
}

/// Rank all districts, or compare the named ones
pub fn compare(
    ctx: &Context,
    districts: &[String],
    category: Option<ExpenseCategory>,
) -> anyhow::Result<()> {
    let me = ctx.surveyor()?;

    if districts.is_empty() {
        if category.is_some() {
            log::warn!("--category only applies when districts are named; ignoring it");
        }
        compute_district_comparison(&ctx.store, me.id)?.render(ctx.mode);
    } else {
        compare_districts(&ctx.store, me.id, districts, category)?.render(ctx.mode);
    }
    Ok(())
}
