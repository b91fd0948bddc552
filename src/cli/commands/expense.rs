//! Expense commands - add (single or batch), edit, delete

use chrono::Utc;

use super::Context;
use crate::cli::app::ExpenseAction;
use ecotrack::core::services::{
    ExpensePatch, ExpenseRow, delete_expense, edit_expense, record_expenses,
};
use ecotrack::output::{OperationResult, Render, money};

/// Handle expense subcommands
pub fn expense(ctx: &Context, action: ExpenseAction) -> anyhow::Result<()> {
    let me = ctx.surveyor()?;

    match action {
        ExpenseAction::Add {
            student,
            category,
            amount,
            district,
            date,
            location,
            comment,
            rows,
        } => {
            let mut batch = Vec::with_capacity(rows.len() + 1);
            if category.is_some() || amount.is_some() {
                batch.push(ExpenseRow {
                    category: category.unwrap_or_default(),
                    amount: amount.unwrap_or_default(),
                    district: district.unwrap_or_default(),
                    spent_on: date.unwrap_or_default(),
                    location: location.unwrap_or_default(),
                    comment: comment.unwrap_or_default(),
                });
            }
            batch.extend(rows.iter().map(|r| parse_row(r)));
            if batch.is_empty() {
                anyhow::bail!("No expense given. Use --category/--amount or --row.");
            }

            let outcome =
                record_expenses(&ctx.store, &ctx.catalog()?, me.id, student, &batch, Utc::now())?;
            outcome.render(ctx.mode);
            if let Some(reason) = &outcome.interrupted {
                anyhow::bail!(
                    "batch stopped after {} expense(s): {reason}",
                    outcome.recorded.len()
                );
            }
            if outcome.recorded.is_empty() && !outcome.errors.is_empty() {
                anyhow::bail!("no expense recorded ({} row(s) rejected)", outcome.errors.len());
            }
            Ok(())
        },
        ExpenseAction::Edit {
            id,
            category,
            amount,
            district,
            date,
            location,
            comment,
        } => {
            let patch = ExpensePatch {
                category,
                amount,
                district,
                spent_on: date,
                location,
                comment,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change. Pass at least one field to edit.");
            }
            let updated = edit_expense(&ctx.store, me.id, id, patch)?;
            let message = format!(
                "Updated expense #{}: {} {}",
                updated.id,
                updated.category.display_name(),
                money(updated.amount)
            );
            OperationResult::ok(message).render(ctx.mode);
            Ok(())
        },
        ExpenseAction::Delete { id } => {
            delete_expense(&ctx.store, me.id, id)?;
            OperationResult::ok(format!("Deleted expense #{id}")).render(ctx.mode);
            Ok(())
        },
    }
}

/// Split `CATEGORY,AMOUNT[,DISTRICT[,DATE[,LOCATION[,COMMENT]]]]`
fn parse_row(raw: &str) -> ExpenseRow {
    let mut parts = raw.splitn(6, ',').map(|p| p.trim().to_string());
    let mut next = || parts.next().unwrap_or_default();
    ExpenseRow {
        category: next(),
        amount: next(),
        district: next(),
        spent_on: next(),
        location: next(),
        comment: next(),
    }
}
