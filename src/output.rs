//! Output formatting for human and JSON modes
//!
//! Every command result can be rendered either as human-readable text or as
//! pretty-printed JSON. Results implement [`Render`]; the JSON form is always
//! the value's serde representation.

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::core::models::{Anomaly, AnomalyCandidate, AnomalyStatus, Severity, Student, Surveyor};
use crate::core::services::{
    CURRENCY, DashboardStats, DistrictComparison, EntryOutcome, PersistOutcome,
    SelectedComparison, StudentStats, format_amount,
};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// A result that can be printed in either output mode
pub trait Render: Serialize {
    /// Print for a person at a terminal
    fn render_human(&self);

    /// Print as pretty JSON
    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }

    /// Render the result based on output mode
    fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

impl OperationResult {
    /// Successful result with a message
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

impl Render for OperationResult {
    fn render_human(&self) {
        println!("{}", self.message);
    }
}

/// Severity label, coloured by urgency
#[must_use]
pub fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string().to_uppercase();
    match severity {
        Severity::High => label.red().bold(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.blue(),
    }
}

/// Amount followed by the currency
#[must_use]
pub fn money(amount: f64) -> String {
    format!("{} {CURRENCY}", format_amount(amount))
}

impl Render for Surveyor {
    fn render_human(&self) {
        println!("Surveyor {} (#{})", self.registration_code.bold(), self.id);
        println!("  user:  {}", self.user);
        println!("  phone: {}", self.phone);
        println!("  since: {}", self.registered_at.format("%Y-%m-%d"));
    }
}

/// A list of students
#[derive(Debug, Serialize)]
pub struct StudentList {
    /// Matching students
    pub students: Vec<Student>,
}

impl Render for StudentList {
    fn render_human(&self) {
        if self.students.is_empty() {
            println!("No students found.");
            return;
        }
        for s in &self.students {
            let district = if s.lacks_district() { "-" } else { s.district.as_str() };
            println!(
                "  #{:<4} {:<10} {:<24} {:<6} {:<12} {}",
                s.id,
                s.survey_code,
                s.name,
                s.sex.to_string(),
                district,
                s.status
            );
        }
        println!("\n{} student(s).", self.students.len());
    }
}

/// One student with their expenses and open anomalies
#[derive(Debug, Serialize)]
pub struct StudentDetail {
    /// Profile
    pub student: Student,
    /// Spending summary
    pub stats: StudentStats,
    /// Anomalies attached to the student or their expenses
    pub anomalies: Vec<Anomaly>,
}

impl Render for StudentDetail {
    fn render_human(&self) {
        let s = &self.student;
        println!("{} ({}), #{}", s.name.bold(), s.survey_code, s.id);
        println!("  sex:         {}", s.sex);
        if let Some(age) = s.age {
            println!("  age:         {age}");
        }
        if let Some(level) = s.level {
            println!("  level:       {}", level.display_name());
        }
        if !s.institution.is_empty() {
            println!("  institution: {}", s.institution);
        }
        println!("  district:    {}", if s.lacks_district() { "-" } else { &s.district });
        println!("  status:      {}", s.status);
        if !s.notes.is_empty() {
            println!("  notes:       {}", s.notes);
        }
        println!();
        self.stats.render_human();
        if !self.anomalies.is_empty() {
            println!();
            AnomalyList {
                anomalies: self.anomalies.clone(),
            }
            .render_human();
        }
    }
}

impl Render for StudentStats {
    fn render_human(&self) {
        if self.count == 0 {
            println!("No expenses recorded.");
            return;
        }
        println!("Expenses: {} totalling {}", self.count, money(self.total));
        println!("Daily average: {}", money(self.daily_average));
        if let Some(category) = self.top_category {
            println!("Top category: {}", category.display_name());
        }
        if let Some(district) = &self.frequent_district {
            println!("Most frequent district: {district}");
        }
        for c in &self.categories {
            println!("  {:<16} {:>14} ({})", c.label, money(c.total), c.count);
        }
    }
}

/// A list of stored anomalies
#[derive(Debug, Serialize)]
pub struct AnomalyList {
    /// Anomalies, in id order
    pub anomalies: Vec<Anomaly>,
}

impl Render for AnomalyList {
    fn render_human(&self) {
        if self.anomalies.is_empty() {
            println!("No anomalies.");
            return;
        }
        for a in &self.anomalies {
            let status = match a.status {
                AnomalyStatus::ToTreat => a.status.to_string().bold(),
                _ => a.status.to_string().dimmed(),
            };
            println!("  #{:<4} [{}] {} {}", a.id, severity_label(a.severity), status, a.kind);
            println!("        {}", a.description);
            if !a.solution.is_empty() {
                println!("        -> {}", a.solution);
            }
        }
        println!("\n{} anomal{}.", self.anomalies.len(), plural_y(self.anomalies.len()));
    }
}

/// Detector findings that were not stored
#[derive(Debug, Serialize)]
pub struct CandidateList {
    /// Findings in detection order
    pub candidates: Vec<AnomalyCandidate>,
}

impl Render for CandidateList {
    fn render_human(&self) {
        if self.candidates.is_empty() {
            println!("No anomalies detected.");
            return;
        }
        for c in &self.candidates {
            println!("  [{}] {} {}", severity_label(c.severity), c.kind, c.description);
        }
        println!(
            "\n{} finding(s). Run 'ecotrack anomaly scan' to record them.",
            self.candidates.len()
        );
    }
}

impl Render for PersistOutcome {
    fn render_human(&self) {
        println!(
            "Detected {} issue(s): {} new, {} already open.",
            self.detected,
            self.created.len(),
            self.skipped
        );
        for a in &self.created {
            println!("  #{:<4} [{}] {}", a.id, severity_label(a.severity), a.description);
        }
    }
}

impl Render for EntryOutcome {
    fn render_human(&self) {
        for e in &self.recorded {
            println!(
                "Recorded expense #{}: {} {} in {}",
                e.id,
                e.category.display_name(),
                money(e.amount),
                e.district
            );
        }
        for err in &self.errors {
            println!("{} {err}", "Rejected".red());
        }
        if let Some(reason) = &self.interrupted {
            println!("{} {reason}", "Stopped".red());
        }
        if self.recorded.is_empty() && self.errors.is_empty() && self.interrupted.is_none() {
            println!("Nothing to record.");
        }
        if let Some(run) = self.anomalies.as_ref().filter(|run| !run.created.is_empty()) {
            println!();
            run.render_human();
        }
    }
}

impl Render for DashboardStats {
    fn render_human(&self) {
        println!("{}", "Survey dashboard".bold());
        println!("  students:   {} (male:female {})", self.students, self.sex_ratio);
        println!(
            "  this month: {} ({:.1}%)",
            self.students_this_month, self.month_share_pct
        );
        println!("  districts:  {}", self.districts);
        println!("  expenses:   {} totalling {}", self.expenses, money(self.total_amount));
        println!("  average:    {}", money(self.average_amount));

        let a = &self.anomalies;
        println!(
            "  anomalies:  {} open ({} {}, {} {}, {} {}), {} in progress, {} resolved, {} ignored",
            a.open,
            a.open_high,
            severity_label(Severity::High),
            a.open_medium,
            severity_label(Severity::Medium),
            a.open_low,
            severity_label(Severity::Low),
            a.in_progress,
            a.resolved,
            a.ignored
        );

        if !self.categories.is_empty() {
            println!("\nBy category:");
            for c in &self.categories {
                println!("  {:<16} {:>14} ({})", c.label, money(c.total), c.count);
            }
        }

        if !self.top_districts.is_empty() {
            println!("\nTop districts:");
            for d in &self.top_districts {
                println!("  {:<20} {}", d.district, d.students);
            }
        }

        if !self.daily.is_empty() {
            println!("\nLast {} days:", self.daily.len());
            for day in &self.daily {
                println!("  {} {} {:>14}", day.label, day.date, money(day.total));
            }
        }

        if !self.recent_anomalies.is_empty() {
            println!("\nRecent anomalies:");
            for r in &self.recent_anomalies {
                println!("  #{:<4} [{}] {}", r.id, severity_label(r.severity), r.description);
            }
        }
    }
}

impl Render for DistrictComparison {
    fn render_human(&self) {
        if self.districts.is_empty() {
            println!("No districts to compare.");
            return;
        }
        println!(
            "  {:<20} {:>8} {:>6} {:>14} {:>14}",
            "district", "students", "age", "average", "total"
        );
        for d in &self.districts {
            println!(
                "  {:<20} {:>8} {:>6.1} {:>14} {:>14}",
                d.district,
                d.students,
                d.average_age,
                money(d.expense_average),
                money(d.expense_total)
            );
        }
        if let (Some(most), Some(least)) = (&self.most_expensive, &self.least_expensive) {
            println!(
                "\nMost expensive: {} / least expensive: {} (difference {}, {:.2}%)",
                most.bold(),
                least,
                money(self.difference),
                self.difference_pct
            );
        }
        println!("Mean of district averages: {}", money(self.mean_of_means));
    }
}

impl Render for SelectedComparison {
    fn render_human(&self) {
        if let Some(category) = self.category {
            println!("Category: {}", category.display_name());
        }
        for r in &self.results {
            println!(
                "  {:<20} avg {:>14}  min {:>12}  max {:>12}  ({} expense(s), {} student(s))",
                r.district,
                money(r.average),
                money(r.minimum),
                money(r.maximum),
                r.expenses,
                r.students
            );
        }
        println!("Difference: {} ({:.2}%)", money(self.difference), self.percentage);
    }
}

const fn plural_y(n: usize) -> &'static str {
    if n == 1 { "y" } else { "ies" }
}
