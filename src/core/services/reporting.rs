//! Aggregation and reporting
//!
//! Read-side computations over one surveyor's students, expenses and
//! anomalies: dashboard metrics, category breakdowns, district comparisons
//! and a trailing daily series. Everything here is deterministic for a given
//! dataset and never mutates it; empty inputs yield zeros.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::core::error::{SurveyError, SurveyResult};
use crate::core::models::{
    Anomaly, AnomalyStatus, Expense, ExpenseCategory, Severity, Sex, Student,
};
use crate::core::ports::SurveyStore;

/// Most districts a selected comparison looks at
pub const MAX_SELECTED_DISTRICTS: usize = 3;

/// Knobs for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportOptions {
    /// Length of the daily series, in days
    pub trailing_days: u32,
    /// How many recent anomalies to list
    pub recent_anomalies: usize,
    /// How many districts to rank by student count
    pub top_districts: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            trailing_days: 7,
            recent_anomalies: 5,
            top_districts: 10,
        }
    }
}

/// Anomaly counts by status and, for open ones, by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyCounts {
    /// All anomalies
    pub total: usize,
    /// Status `to_treat`
    pub open: usize,
    /// Open and high severity
    pub open_high: usize,
    /// Open and medium severity
    pub open_medium: usize,
    /// Open and low severity
    pub open_low: usize,
    /// Status `in_progress`
    pub in_progress: usize,
    /// Status `resolved`
    pub resolved: usize,
    /// Status `ignored`
    pub ignored: usize,
}

/// Spending on one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category
    pub category: ExpenseCategory,
    /// Display label
    pub label: &'static str,
    /// Chart colour
    pub color: &'static str,
    /// Sum of amounts
    pub total: f64,
    /// Number of expenses
    pub count: usize,
}

/// Student head-count for one district
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictCount {
    /// District name
    pub district: String,
    /// Students living there
    pub students: usize,
}

/// One point of the daily series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    /// Calendar day
    pub date: NaiveDate,
    /// Short weekday name ("Mon")
    pub label: String,
    /// Sum of amounts entered that day
    pub total: f64,
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Number of students
    pub students: usize,
    /// Number of expenses
    pub expenses: usize,
    /// Sum of all expense amounts
    pub total_amount: f64,
    /// Mean amount per expense
    pub average_amount: f64,
    /// Male students
    pub male: usize,
    /// Female students
    pub female: usize,
    /// "male:female"
    pub sex_ratio: String,
    /// Distinct non-empty student districts
    pub districts: usize,
    /// Anomaly counts
    pub anomalies: AnomalyCounts,
    /// Most recently detected anomalies
    pub recent_anomalies: Vec<Anomaly>,
    /// Districts ranked by student count
    pub top_districts: Vec<DistrictCount>,
    /// Spending per category, largest first
    pub categories: Vec<CategoryTotal>,
    /// Trailing daily totals, oldest first
    pub daily: Vec<DailyTotal>,
    /// Students collected during the current calendar month
    pub students_this_month: usize,
    /// `students_this_month` as a percentage of all students
    pub month_share_pct: f64,
}

/// Per-district row of the comparison view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictStats {
    /// District name
    pub district: String,
    /// Students living there
    pub students: usize,
    /// Male students
    pub male: usize,
    /// Female students
    pub female: usize,
    /// Mean age over students with an age
    pub average_age: f64,
    /// Sum of expenses spent in the district
    pub expense_total: f64,
    /// Mean expense spent in the district
    pub expense_average: f64,
    /// Number of expenses spent in the district
    pub expense_count: usize,
}

/// District comparison, most expensive first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistrictComparison {
    /// Rows sorted by mean expense, descending
    pub districts: Vec<DistrictStats>,
    /// District with the highest mean expense
    pub most_expensive: Option<String>,
    /// District with the lowest mean expense
    pub least_expensive: Option<String>,
    /// Highest mean minus lowest mean
    pub difference: f64,
    /// `difference` relative to the lowest mean, in percent
    pub difference_pct: f64,
    /// Unweighted mean of the per-district means
    pub mean_of_means: f64,
}

/// Expense figures for one selected district
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedDistrict {
    /// District name
    pub district: String,
    /// Mean amount
    pub average: f64,
    /// Smallest amount
    pub minimum: f64,
    /// Largest amount
    pub maximum: f64,
    /// Sum of amounts
    pub total: f64,
    /// Number of expenses
    pub expenses: usize,
    /// Students living there
    pub students: usize,
}

/// Side-by-side comparison of a few named districts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedComparison {
    /// Category filter, if any
    pub category: Option<ExpenseCategory>,
    /// Rows sorted by mean, descending
    pub results: Vec<SelectedDistrict>,
    /// First mean minus second mean
    pub difference: f64,
    /// `difference` relative to the second mean, in percent
    pub percentage: f64,
}

/// Spending profile of one student
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStats {
    /// Student
    pub student_id: u64,
    /// Sum of amounts
    pub total: f64,
    /// Number of expenses
    pub count: usize,
    /// Total divided by the number of distinct spending days
    pub daily_average: f64,
    /// Category with the largest total
    pub top_category: Option<ExpenseCategory>,
    /// District where the student spends most often
    pub frequent_district: Option<String>,
    /// Spending per category, largest first
    pub categories: Vec<CategoryTotal>,
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Count anomalies by status and open ones by severity
#[must_use]
pub fn anomaly_counts(anomalies: &[Anomaly]) -> AnomalyCounts {
    let mut counts = AnomalyCounts {
        total: anomalies.len(),
        ..AnomalyCounts::default()
    };
    for anomaly in anomalies {
        match anomaly.status {
            AnomalyStatus::ToTreat => {
                counts.open += 1;
                match anomaly.severity {
                    Severity::High => counts.open_high += 1,
                    Severity::Medium => counts.open_medium += 1,
                    Severity::Low => counts.open_low += 1,
                }
            },
            AnomalyStatus::InProgress => counts.in_progress += 1,
            AnomalyStatus::Resolved => counts.resolved += 1,
            AnomalyStatus::Ignored => counts.ignored += 1,
        }
    }
    counts
}

/// Total spending per category, largest first
#[must_use]
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut sums: BTreeMap<ExpenseCategory, (f64, usize)> = BTreeMap::new();
    for expense in expenses {
        let entry = sums.entry(expense.category).or_default();
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut totals: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category,
            label: category.display_name(),
            color: category.color(),
            total,
            count,
        })
        .collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.category.cmp(&b.category)));
    totals
}

/// Amount entered per day over the `days` days ending at `today`, oldest first
#[must_use]
pub fn daily_series(expenses: &[Expense], today: NaiveDate, days: u32) -> Vec<DailyTotal> {
    let mut per_day: HashMap<NaiveDate, f64> = HashMap::new();
    for expense in expenses {
        *per_day.entry(expense.entered_at.date_naive()).or_default() += expense.amount;
    }

    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| DailyTotal {
            date,
            label: date.format("%a").to_string(),
            total: per_day.get(&date).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Districts ranked by how many students live there
#[must_use]
pub fn top_districts(students: &[Student], limit: usize) -> Vec<DistrictCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for student in students.iter().filter(|s| !s.lacks_district()) {
        *counts.entry(student.district.trim()).or_default() += 1;
    }

    let mut ranked: Vec<DistrictCount> = counts
        .into_iter()
        .map(|(district, students)| DistrictCount {
            district: district.to_string(),
            students,
        })
        .collect();
    // BTreeMap order already breaks ties by name; the sort is stable
    ranked.sort_by(|a, b| b.students.cmp(&a.students));
    ranked.truncate(limit);
    ranked
}

/// Dashboard metrics for one surveyor's records
#[must_use]
pub fn dashboard_stats(
    students: &[Student],
    expenses: &[Expense],
    anomalies: &[Anomaly],
    today: NaiveDate,
    options: &ReportOptions,
) -> DashboardStats {
    let total_amount: f64 = expenses.iter().map(|e| e.amount).sum();
    let male = students.iter().filter(|s| s.sex == Sex::Male).count();
    let female = students.iter().filter(|s| s.sex == Sex::Female).count();
    let districts: BTreeSet<&str> = students
        .iter()
        .filter(|s| !s.lacks_district())
        .map(|s| s.district.trim())
        .collect();

    let mut recent: Vec<Anomaly> = anomalies.to_vec();
    recent.sort_by(|a, b| b.detected_at.cmp(&a.detected_at).then(b.id.cmp(&a.id)));
    recent.truncate(options.recent_anomalies);

    let students_this_month = students
        .iter()
        .filter(|s| {
            let collected = s.collected_at.date_naive();
            collected.year() == today.year() && collected.month() == today.month()
        })
        .count();
    #[allow(clippy::cast_precision_loss)]
    let month_share_pct = percent_of(students_this_month as f64, students.len() as f64);

    DashboardStats {
        students: students.len(),
        expenses: expenses.len(),
        total_amount,
        average_amount: mean(total_amount, expenses.len()),
        male,
        female,
        sex_ratio: format!("{male}:{female}"),
        districts: districts.len(),
        anomalies: anomaly_counts(anomalies),
        recent_anomalies: recent,
        top_districts: top_districts(students, options.top_districts),
        categories: category_breakdown(expenses),
        daily: daily_series(expenses, today, options.trailing_days),
        students_this_month,
        month_share_pct,
    }
}

/// Compare every student district by mean expense
#[must_use]
pub fn district_comparison(students: &[Student], expenses: &[Expense]) -> DistrictComparison {
    let mut grouped: BTreeMap<&str, Vec<&Student>> = BTreeMap::new();
    for student in students.iter().filter(|s| !s.lacks_district()) {
        grouped.entry(student.district.trim()).or_default().push(student);
    }

    let mut rows: Vec<DistrictStats> = grouped
        .into_iter()
        .map(|(district, members)| {
            let ages: Vec<u32> = members.iter().filter_map(|s| s.age).collect();
            let age_sum: f64 = ages.iter().map(|&a| f64::from(a)).sum();
            let spent: Vec<f64> = expenses
                .iter()
                .filter(|e| e.district.trim() == district)
                .map(|e| e.amount)
                .collect();
            let expense_total: f64 = spent.iter().sum();

            DistrictStats {
                district: district.to_string(),
                students: members.len(),
                male: members.iter().filter(|s| s.sex == Sex::Male).count(),
                female: members.iter().filter(|s| s.sex == Sex::Female).count(),
                average_age: mean(age_sum, ages.len()),
                expense_total,
                expense_average: mean(expense_total, spent.len()),
                expense_count: spent.len(),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.expense_average.total_cmp(&a.expense_average).then_with(|| a.district.cmp(&b.district))
    });

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return DistrictComparison::default();
    };
    let difference = first.expense_average - last.expense_average;
    let means: f64 = rows.iter().map(|r| r.expense_average).sum();

    DistrictComparison {
        most_expensive: Some(first.district.clone()),
        least_expensive: Some(last.district.clone()),
        difference,
        difference_pct: percent_of(difference, last.expense_average),
        mean_of_means: mean(means, rows.len()),
        districts: rows,
    }
}

/// Compare two or three named districts, optionally for one category
pub fn compare_selected(
    students: &[Student],
    expenses: &[Expense],
    districts: &[String],
    category: Option<ExpenseCategory>,
) -> SurveyResult<SelectedComparison> {
    if districts.len() < 2 {
        return Err(SurveyError::InvalidInput(
            "select at least two districts to compare".to_string(),
        ));
    }

    let mut results: Vec<SelectedDistrict> = districts
        .iter()
        .take(MAX_SELECTED_DISTRICTS)
        .map(|district| {
            let district = district.trim();
            let amounts: Vec<f64> = expenses
                .iter()
                .filter(|e| e.district.trim() == district)
                .filter(|e| category.is_none_or(|c| e.category == c))
                .map(|e| e.amount)
                .collect();
            let total: f64 = amounts.iter().sum();

            SelectedDistrict {
                district: district.to_string(),
                average: mean(total, amounts.len()),
                minimum: amounts.iter().copied().reduce(f64::min).unwrap_or(0.0),
                maximum: amounts.iter().copied().reduce(f64::max).unwrap_or(0.0),
                total,
                expenses: amounts.len(),
                students: students.iter().filter(|s| s.district.trim() == district).count(),
            }
        })
        .collect();
    results.sort_by(|a, b| b.average.total_cmp(&a.average));

    let difference = results[0].average - results[1].average;
    let percentage = percent_of(difference, results[1].average);

    Ok(SelectedComparison {
        category,
        results,
        difference,
        percentage,
    })
}

/// Spending profile of one student from their expenses
#[must_use]
pub fn student_stats(student: &Student, expenses: &[Expense]) -> StudentStats {
    let own: Vec<Expense> =
        expenses.iter().filter(|e| e.student_id == student.id).cloned().collect();
    let total: f64 = own.iter().map(|e| e.amount).sum();
    let spending_days: BTreeSet<NaiveDate> = own.iter().map(|e| e.spent_on).collect();
    let categories = category_breakdown(&own);

    let mut visits: BTreeMap<&str, usize> = BTreeMap::new();
    for expense in &own {
        *visits.entry(expense.district.as_str()).or_default() += 1;
    }
    // max_by_key keeps the last maximum; iterate in reverse so the
    // alphabetically first district wins ties
    let frequent_district = visits
        .into_iter()
        .rev()
        .max_by_key(|&(_, count)| count)
        .map(|(district, _)| district.to_string());

    StudentStats {
        student_id: student.id,
        total,
        count: own.len(),
        daily_average: mean(total, spending_days.len()),
        top_category: categories.first().map(|c| c.category),
        frequent_district,
        categories,
    }
}

/// Dashboard metrics read from the store
pub fn compute_dashboard_stats(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    today: NaiveDate,
    options: &ReportOptions,
) -> SurveyResult<DashboardStats> {
    let students = store.students(surveyor_id)?;
    let expenses = store.expenses(surveyor_id)?;
    let anomalies = store.anomalies(surveyor_id)?;
    Ok(dashboard_stats(&students, &expenses, &anomalies, today, options))
}

/// District comparison read from the store
pub fn compute_district_comparison(
    store: &dyn SurveyStore,
    surveyor_id: u64,
) -> SurveyResult<DistrictComparison> {
    let students = store.students(surveyor_id)?;
    let expenses = store.expenses(surveyor_id)?;
    Ok(district_comparison(&students, &expenses))
}

/// Selected-district comparison read from the store
pub fn compare_districts(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    districts: &[String],
    category: Option<ExpenseCategory>,
) -> SurveyResult<SelectedComparison> {
    let students = store.students(surveyor_id)?;
    let expenses = store.expenses(surveyor_id)?;
    compare_selected(&students, &expenses, districts, category)
}

/// Spending profile of one student read from the store
pub fn compute_student_stats(
    store: &dyn SurveyStore,
    surveyor_id: u64,
    student_id: u64,
) -> SurveyResult<StudentStats> {
    let student = store
        .student(surveyor_id, student_id)?
        .ok_or_else(|| SurveyError::not_found("student", student_id))?;
    let expenses = store.student_expenses(surveyor_id, student_id)?;
    Ok(student_stats(&student, &expenses))
}
