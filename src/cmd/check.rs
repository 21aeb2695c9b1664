//! The `check` command: process forms, narrate findings, export the summary.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use advisor::catalogue::Catalogue;
use advisor::config::Config;
use advisor::form::{self, FormParse};
use advisor::records::{self, RecordTable};
use advisor::report::{self, SummaryRecord};
use advisor::student::{self, BuildOutcome};

use super::ui::Console;

/// Run the check over a single form file or a folder of forms.
pub fn run(
    target: &Path,
    config: &Config,
    output: &Path,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let console = Console::new(quiet || json);

    let catalogue = Catalogue::load(&config.catalogue)?;
    let tables = records::load_record_tables(&config.student_data)?;

    let mut summary = Vec::new();
    if target.is_dir() {
        let forms = collect_form_files(target)?;
        if forms.is_empty() {
            bail!(
                "there are no module choice forms in {}",
                target.display()
            );
        }
        for (index, form_path) in forms.iter().enumerate() {
            if index > 0 {
                console.separator();
            }
            summary.push(process_form_file(
                form_path, &catalogue, &tables, config, &console,
            )?);
        }
    } else if target.is_file() {
        summary.push(process_form_file(
            target, &catalogue, &tables, config, &console,
        )?);
    } else {
        bail!(
            "{} is neither a file nor a folder; does it exist?",
            target.display()
        );
    }

    report::sort_by_student_id(&mut summary);
    report::write_summary_csv(&summary, output)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to encode summary as JSON")?
        );
    } else {
        console.line(&format!("Summary written to {}", output.display()));
    }

    Ok(())
}

/// Perform all advising checks on one submitted form.
///
/// Forms that cannot be matched to a valid student record degrade to a
/// clearly-marked sentinel row; only broken shared data sources abort.
fn process_form_file(
    path: &Path,
    catalogue: &Catalogue,
    tables: &[RecordTable],
    config: &Config,
    console: &Console,
) -> Result<SummaryRecord> {
    let parsed = form::parse_form(path)?;
    let form = match parsed {
        FormParse::Valid(form) => form,
        FormParse::Invalid(issue) => {
            let message = format!("Could not process {}. {}", path.display(), issue);
            console.warn(&message);
            return Ok(SummaryRecord::sentinel(&message));
        }
    };

    let student = match student::build_student(&form, tables, config.reference_year)? {
        BuildOutcome::Student(student) => student,
        BuildOutcome::Sentinel(reason) => {
            let message = format!("Could not process {}. {}", path.display(), reason);
            console.warn(&message);
            return Ok(SummaryRecord::sentinel(&message));
        }
    };

    console.line(&format!("Processing file {}", path.display()));
    console.blank();
    console.line(&format!("Student ID: {}", student.student_id));
    console.line(&format!("Name: {}", student.full_name));
    console.line(&format!("Programme: {}", student.programme_name));
    console.blank();

    let evaluation = report::evaluate(&student, catalogue)?;

    console.line("The student is missing the following programme requirements:");
    console.category(&evaluation.programme_requirements);
    console.line("The student is missing the following prerequisites:");
    console.category(&evaluation.prerequisites);
    console.line("The student selected the following modules when they are not running:");
    console.category(&evaluation.scheduling);
    console.line("I found the following timetable clashes:");
    console.category(&evaluation.timetable);
    console.line("I have the following comments to the adviser:");
    console.advice(&evaluation.adviser);

    Ok(SummaryRecord::from_evaluation(&student, &evaluation))
}

/// Form files in a folder, in a stable order. Hidden files and other
/// extensions are skipped.
fn collect_form_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read folder: {}", dir.display()))?;

    let mut forms: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with('.'))
                .unwrap_or(true);
            let extension = path.extension().and_then(|ext| ext.to_str());
            path.is_file() && !hidden && matches!(extension, Some("yaml") | Some("yml"))
        })
        .collect();
    forms.sort();
    Ok(forms)
}
