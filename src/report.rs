//! Finding merge and summary record assembly.
//!
//! Every checker returns lists of human-readable messages. This module
//! collapses those lists into the per-category strings consumers key on
//! (`", "`-joined, or the literal `"None"` when empty), runs all checkers
//! over a student profile, and assembles one summary record per student.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::catalogue::Catalogue;
use crate::prereq;
use crate::programme;
use crate::scheduling;
use crate::student::Student;
use crate::timetable;

/// Sentinel value for a finding category with no findings.
///
/// Consumers (console coloring, report cells) compare against this exact
/// string, so it is part of the public contract.
pub const NO_FINDINGS: &str = "None";

/// Merge a list of messages into one `", "`-delimited string.
///
/// Entries equal to [`NO_FINDINGS`] are skipped; an empty result collapses
/// to [`NO_FINDINGS`].
pub fn merge_findings<S: AsRef<str>>(messages: &[S]) -> String {
    let mut merged = String::new();
    for message in messages {
        let message = message.as_ref();
        if message == NO_FINDINGS {
            continue;
        }
        if !merged.is_empty() {
            merged.push_str(", ");
        }
        merged.push_str(message);
    }

    if merged.is_empty() {
        merged.push_str(NO_FINDINGS);
    }
    merged
}

/// The five finding categories for one student, each merged into a single
/// string or [`NO_FINDINGS`].
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Unmet programme requirements
    pub programme_requirements: String,
    /// Missing prerequisites and violated antirequisites
    pub prerequisites: String,
    /// Modules selected when they are not running
    pub scheduling: String,
    /// Timetable clashes
    pub timetable: String,
    /// Non-blocking adviser recommendations
    pub adviser: String,
}

/// Evaluate every rule set against a student profile.
///
/// Pure function of the profile and the catalogue: re-evaluating the same
/// pair yields identical findings. The four checkers run independently and
/// their advisory notes merge into the single adviser category.
pub fn evaluate(student: &Student, catalogue: &Catalogue) -> Result<Evaluation> {
    let (programme_findings, programme_advice) =
        programme::find_missing_requirements(student, catalogue);
    let (prerequisite_findings, prerequisite_advice) =
        prereq::find_missing_prerequisites(student, catalogue)?;
    let (scheduling_findings, scheduling_advice) =
        scheduling::find_not_running_modules(student, catalogue);
    let (timetable_findings, timetable_advice) =
        timetable::find_timetable_clashes(student, catalogue);

    let adviser = merge_findings(&[
        merge_findings(&programme_advice),
        merge_findings(&prerequisite_advice),
        merge_findings(&scheduling_advice),
        merge_findings(&timetable_advice),
    ]);

    Ok(Evaluation {
        programme_requirements: merge_findings(&programme_findings),
        prerequisites: merge_findings(&prerequisite_findings),
        scheduling: merge_findings(&scheduling_findings),
        timetable: merge_findings(&timetable_findings),
        adviser,
    })
}

/// One row of the exported summary report.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRecord {
    #[serde(rename = "Student ID")]
    pub student_id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Programme")]
    pub programme: String,
    #[serde(rename = "Hon. year")]
    pub honours_year: i32,
    #[serde(rename = "Unmet programme requirements")]
    pub programme_requirements: String,
    #[serde(rename = "Missing prerequisites")]
    pub prerequisites: String,
    #[serde(rename = "Modules not running")]
    pub scheduling: String,
    #[serde(rename = "Timetable clashes")]
    pub timetable: String,
    #[serde(rename = "Adviser recommendations")]
    pub adviser: String,
}

impl SummaryRecord {
    /// Assemble the summary row for a fully processed student.
    pub fn from_evaluation(student: &Student, evaluation: &Evaluation) -> Self {
        Self {
            student_id: student.student_id,
            name: student.full_name.clone(),
            programme: student.programme_name.clone(),
            honours_year: student.current_honours_year,
            programme_requirements: evaluation.programme_requirements.clone(),
            prerequisites: evaluation.prerequisites.clone(),
            scheduling: evaluation.scheduling.clone(),
            timetable: evaluation.timetable.clone(),
            adviser: evaluation.adviser.clone(),
        }
    }

    /// Assemble the placeholder row for a form that could not be matched to
    /// a valid student record. The explanatory message sits in the
    /// programme-requirements column so the row is visibly degenerate in
    /// the exported report.
    pub fn sentinel(message: &str) -> Self {
        Self {
            student_id: 0,
            name: "Unknown".to_string(),
            programme: "Unknown".to_string(),
            honours_year: 0,
            programme_requirements: message.to_string(),
            prerequisites: " ".to_string(),
            scheduling: " ".to_string(),
            timetable: " ".to_string(),
            adviser: " ".to_string(),
        }
    }
}

/// Sort a batch of summary records by student ID for export.
pub fn sort_by_student_id(records: &mut [SummaryRecord]) {
    records.sort_by_key(|record| record.student_id);
}

/// Write the summary records to a CSV file.
pub fn write_summary_csv(records: &[SummaryRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .context("Failed to write summary row")?;
    }
    writer.flush().context("Failed to flush summary file")?;
    Ok(())
}
