//! Student commands - add, edit, list, show, stats, delete, mark

use chrono::Utc;

use super::Context;
use crate::cli::app::{StudentAction, StudentFields};
use ecotrack::core::models::{NewStudent, Sex};
use ecotrack::core::ports::SurveyStore;
use ecotrack::core::services::{
    StudentFilter, StudentPatch, compute_student_stats, create_student, delete_students,
    edit_student, mark_students, search_students,
};
use ecotrack::output::{OperationResult, Render, StudentDetail, StudentList};

/// Handle student subcommands
pub fn student(ctx: &Context, action: StudentAction) -> anyhow::Result<()> {
    let me = ctx.surveyor()?;

    match action {
        StudentAction::Add {
            code,
            name,
            sex,
            fields,
        } => add(ctx, me.id, code, name, sex, fields),
        StudentAction::Edit {
            id,
            code,
            name,
            sex,
            status,
            fields,
            clear_age,
            clear_level,
            clear_gps,
        } => {
            let patch = StudentPatch {
                survey_code: code,
                name,
                age: clearable(fields.age, clear_age),
                sex,
                level: clearable(fields.level, clear_level),
                institution: fields.institution,
                district: fields.district,
                gps: clearable(fields.gps, clear_gps),
                notes: fields.notes,
                status,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change. Pass at least one field to edit.");
            }
            let updated = edit_student(&ctx.store, me.id, id, patch)?;
            let message = format!("Updated student {} (#{})", updated.survey_code, updated.id);
            OperationResult::ok(message).render(ctx.mode);
            Ok(())
        },
        StudentAction::List {
            name,
            district,
            status,
            sex,
            period,
        } => {
            let filter = StudentFilter {
                name,
                district,
                status,
                sex,
                period,
            };
            let students = search_students(&ctx.store, me.id, &filter, Utc::now())?;
            StudentList { students }.render(ctx.mode);
            Ok(())
        },
        StudentAction::Show { id } => {
            let stats = compute_student_stats(&ctx.store, me.id, id)?;
            let student = ctx
                .store
                .student(me.id, id)?
                .ok_or_else(|| anyhow::anyhow!("student not found: {id}"))?;
            let expense_ids: Vec<u64> =
                ctx.store.student_expenses(me.id, id)?.iter().map(|e| e.id).collect();
            let anomalies = ctx
                .store
                .anomalies(me.id)?
                .into_iter()
                .filter(|a| {
                    a.student_id == Some(id)
                        || a.expense_id.is_some_and(|e| expense_ids.contains(&e))
                })
                .collect();
            StudentDetail {
                student,
                stats,
                anomalies,
            }
            .render(ctx.mode);
            Ok(())
        },
        StudentAction::Stats { id } => {
            compute_student_stats(&ctx.store, me.id, id)?.render(ctx.mode);
            Ok(())
        },
        StudentAction::Delete { ids } => {
            let removed = delete_students(&ctx.store, me.id, &ids)?;
            OperationResult::ok(format!("Deleted {removed} student(s).")).render(ctx.mode);
            Ok(())
        },
        StudentAction::Mark { status, ids } => {
            let changed = mark_students(&ctx.store, me.id, &ids, status)?;
            OperationResult::ok(format!("Marked {changed} student(s) as {status}."))
                .render(ctx.mode);
            Ok(())
        },
    }
}

fn add(
    ctx: &Context,
    surveyor_id: u64,
    code: String,
    name: String,
    sex: Sex,
    fields: StudentFields,
) -> anyhow::Result<()> {
    let new = NewStudent {
        survey_code: code,
        name,
        age: fields.age,
        sex,
        level: fields.level,
        institution: fields.institution.unwrap_or_default(),
        district: fields.district.unwrap_or_default(),
        gps: fields.gps,
        notes: fields.notes.unwrap_or_default(),
        photo: None,
        collected_at: Utc::now(),
    };
    let created = create_student(&ctx.store, surveyor_id, new)?;
    OperationResult::ok(format!(
        "Added student {} (#{}). Record their expenses with: ecotrack expense add {}",
        created.survey_code, created.id, created.id
    ))
    .render(ctx.mode);
    Ok(())
}

/// `Some(None)` when the field is cleared, `None` when left untouched
fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear { Some(None) } else { value.map(Some) }
}
