//! Per-programme requirement rule tables.
//!
//! Each programme maps to a list of independently evaluated rules over the
//! student profile; all rules run and their findings collect, there is no
//! early exit. Adding a programme means adding a rule set to
//! [`PROGRAMME_RULES`], not new branching logic. Programmes without a rule
//! set yield a single "No programme requirements available" finding, which
//! is a deliberate stub rather than an error.

use crate::catalogue::{Catalogue, Semester};
use crate::student::Student;
use crate::subject;

/// Core 3000-level breadth list; at least four are required.
const CORE_MODULES: &[&str] = &[
    "MT3501", "MT3502", "MT3503", "MT3504", "MT3505", "MT3506", "MT3507", "MT3508",
];

/// At least one computing module is required.
const COMPUTING_MODULES: &[&str] = &["MT3510", "MT4111", "MT4112", "MT4113"];

/// Exactly one final year project is required.
const PROJECT_MODULES: &[&str] = &["MT4598", "MT4599"];

/// Modules reserved for other programmes.
const FORBIDDEN_MODULES: &[&str] = &["MT4794", "MT4795", "MT4796", "MT4797"];

/// Code prefixes counting as the subject's own honours range.
const HONOURS_LEVEL_PREFIXES: &[&str] = &["MT2", "MT3", "MT4", "MT5"];

/// Code prefixes counting towards the senior-credit minimum.
const SENIOR_PREFIXES: &[&str] = &["MT4", "MT5"];

/// Final projects excluded from the final-year split count.
const BSC_FINAL_PROJECT: &str = "MT4599";
const MMATH_FINAL_PROJECT: &str = "MT5599";

/// One independently evaluated requirement rule.
type Rule = fn(&Student, &mut Vec<String>, &mut Vec<String>);

/// Rule table entry for one programme.
struct ProgrammeRuleSet {
    programme: &'static str,
    rules: &'static [Rule],
}

static MATHEMATICS_RULES: &[Rule] = &[
    check_credit_load,
    check_core_breadth,
    check_computing_requirement,
    check_final_year_project,
    check_forbidden_modules,
    check_dip_limit,
    check_senior_credit,
    check_permission_advisories,
];

static PROGRAMME_RULES: &[ProgrammeRuleSet] = &[ProgrammeRuleSet {
    programme: "Bachelor of Science (Honours) Mathematics",
    rules: MATHEMATICS_RULES,
}];

fn rules_for(programme_name: &str) -> Option<&'static [Rule]> {
    PROGRAMME_RULES
        .iter()
        .find(|entry| entry.programme == programme_name)
        .map(|entry| entry.rules)
}

/// Evaluate the programme requirements for a student.
/// Returns (findings, adviser notes).
pub fn find_missing_requirements(
    student: &Student,
    catalogue: &Catalogue,
) -> (Vec<String>, Vec<String>) {
    let mut findings = Vec::new();
    let mut advice = Vec::new();

    check_duplicate_selection(student, &mut findings);
    check_unknown_modules(student, catalogue, &mut findings);

    match rules_for(&student.programme_name) {
        Some(rules) => {
            for rule in rules {
                rule(student, &mut findings, &mut advice);
            }
        }
        None => findings.push("No programme requirements available".to_string()),
    }

    (findings, advice)
}

/// A module code appearing twice anywhere in the full module list is
/// flagged, naming each duplicated code once.
fn check_duplicate_selection(student: &Student, findings: &mut Vec<String>) {
    let modules = student.full_module_list();
    let mut duplicates = Vec::new();
    for (index, module) in modules.iter().enumerate() {
        if modules[..index].contains(module) && !duplicates.contains(module) {
            duplicates.push(module.clone());
        }
    }

    if !duplicates.is_empty() {
        findings.push(format!(
            "Student selected the following modules twice: {}",
            duplicates.join(", ")
        ));
    }
}

/// Planned modules with the subject's own prefix must exist in the
/// catalogue; other subjects' codes are not ours to verify.
fn check_unknown_modules(student: &Student, catalogue: &Catalogue, findings: &mut Vec<String>) {
    for module in student.planned_modules() {
        if module.starts_with(subject::PREFIX) && !catalogue.contains(&module) {
            findings.push(format!(
                "Student is planning to take {} (which does not exist)",
                module
            ));
        }
    }
}

/// Credit totals per honours year, and the even-split advisories.
fn check_credit_load(student: &Student, findings: &mut Vec<String>, advice: &mut Vec<String>) {
    for year in student.honours_years_in_choices() {
        let entries: Vec<_> = student
            .choices
            .iter()
            .filter(|choice| choice.honours_year == year)
            .collect();

        let expected = match year.as_str() {
            "Year 1" | "Year 2" => Some(8),
            "Year 3" => Some(7),
            _ => None,
        };
        if let Some(expected) = expected {
            if entries.len() != expected {
                findings.push(format!("Not collecting 120 credits in {}", year));
            }
        }

        let count = |semester: Semester, excluded: Option<&str>| {
            entries
                .iter()
                .filter(|choice| choice.semester == semester)
                .filter(|choice| Some(choice.module.as_str()) != excluded)
                .count()
        };

        let final_year = year == format!("Year {}", student.expected_honours_years);
        if !final_year {
            for semester in [Semester::S1, Semester::S2] {
                if count(semester, None) != 4 {
                    advice.push(format!("Not taking even credit split in {}", year));
                }
            }
        } else if student.expected_honours_years == 2 {
            if count(Semester::S1, Some(BSC_FINAL_PROJECT)) != 4
                || count(Semester::S2, Some(BSC_FINAL_PROJECT)) != 3
            {
                advice.push(
                    "Student is taking a high course load in second semester of final honours year"
                        .to_string(),
                );
            }
        } else if count(Semester::S1, Some(MMATH_FINAL_PROJECT)) != 3
            || count(Semester::S2, Some(MMATH_FINAL_PROJECT)) != 3
        {
            advice.push("Student is taking uneven course load in final honours year".to_string());
        }
    }
}

fn check_core_breadth(student: &Student, findings: &mut Vec<String>, _advice: &mut Vec<String>) {
    let core_count = student.count_modules_in_list(CORE_MODULES);
    if core_count < 4 {
        findings.push(format!(
            "Student is only taking {} out of MT3501-MT3508",
            core_count
        ));
    }
}

fn check_computing_requirement(
    student: &Student,
    findings: &mut Vec<String>,
    _advice: &mut Vec<String>,
) {
    if student.count_modules_in_list(COMPUTING_MODULES) == 0 {
        findings.push("Student is not taking a computing module".to_string());
    }
}

/// Exactly one final year project, scheduled in the final honours year.
fn check_final_year_project(
    student: &Student,
    findings: &mut Vec<String>,
    _advice: &mut Vec<String>,
) {
    if student.count_modules_in_list(PROJECT_MODULES) != 1 {
        findings.push("Student is not taking an allowed final year project".to_string());
        return;
    }

    let final_year = format!("Year {}", student.expected_honours_years);
    let scheduled_year = student
        .choices
        .iter()
        .find(|choice| PROJECT_MODULES.contains(&choice.module.as_str()))
        .map(|choice| choice.honours_year.clone());
    if let Some(scheduled_year) = scheduled_year {
        if scheduled_year != final_year {
            findings.push(
                "Student is not taking their final year project in their final year.".to_string(),
            );
        }
    }
}

fn check_forbidden_modules(
    student: &Student,
    findings: &mut Vec<String>,
    _advice: &mut Vec<String>,
) {
    if student.count_modules_in_list(FORBIDDEN_MODULES) > 0 {
        findings.push("Student is taking a module in MT4794-MT4797".to_string());
    }
}

/// At most two modules may sit outside the subject's own honours range
/// (dip-down to 2000 level or dip-across to another subject).
fn check_dip_limit(student: &Student, findings: &mut Vec<String>, _advice: &mut Vec<String>) {
    let outside = student
        .all_honours_modules()
        .into_iter()
        .filter(|module| !has_any_prefix(module, HONOURS_LEVEL_PREFIXES))
        .count();
    if outside > 2 {
        findings.push(
            "Student is taking more than 2 modules as dip-down or dip-across, which is not allowed."
                .to_string(),
        );
    }
}

/// At least 90 credits (6 modules) at 4000 level or above.
fn check_senior_credit(student: &Student, findings: &mut Vec<String>, _advice: &mut Vec<String>) {
    let senior = student
        .all_honours_modules()
        .into_iter()
        .filter(|module| has_any_prefix(module, SENIOR_PREFIXES))
        .count();
    if senior < 6 {
        findings.push(
            "Student is not planning to take enough credits at 4000 level or above".to_string(),
        );
    }
}

/// Non-blocking reminders that certain selections need permission.
fn check_permission_advisories(
    student: &Student,
    _findings: &mut Vec<String>,
    advice: &mut Vec<String>,
) {
    let planned = student.planned_modules();

    if planned.iter().any(|module| module.starts_with("MT5")) {
        advice.push(
            "Student is planning to take 5000 level modules (which will require permission)"
                .to_string(),
        );
    }
    if planned.iter().any(|module| module.starts_with("MT2")) {
        advice.push(
            "Student is planning to take 2000 level modules (which will require permission)"
                .to_string(),
        );
    }
    if planned
        .iter()
        .any(|module| !has_any_prefix(module, HONOURS_LEVEL_PREFIXES))
    {
        advice.push(
            "Student is planning to take non-MT modules, which requires permission".to_string(),
        );
    }
}

fn has_any_prefix(module: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| module.starts_with(prefix))
}
