//! Surveyor commands - add, show, edit

use chrono::Utc;

use super::Context;
use crate::cli::app::SurveyorAction;
use ecotrack::core::services::{provision_surveyor, update_profile};
use ecotrack::output::Render;

/// Handle surveyor subcommands
pub fn surveyor(ctx: &Context, action: SurveyorAction) -> anyhow::Result<()> {
    match action {
        SurveyorAction::Add { user, code, phone } => {
            let created = provision_surveyor(
                &ctx.store,
                &user,
                code.as_deref(),
                phone.as_deref(),
                Utc::now(),
            )?;
            created.render(ctx.mode);
        },
        SurveyorAction::Show => ctx.surveyor()?.render(ctx.mode),
        SurveyorAction::Edit { code, phone } => {
            let me = ctx.surveyor()?;
            let updated = update_profile(&ctx.store, me.id, code.as_deref(), phone.as_deref())?;
            updated.render(ctx.mode);
        },
    }
    Ok(())
}
