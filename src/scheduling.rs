//! Semester and alternation checks for planned modules.
//!
//! A module can be selected for the wrong semester, or for an academic
//! year it will not run in because it alternates. Both checks read the
//! catalogue only; unknown modules are skipped because the programme
//! checker already flags them.

use crate::catalogue::{Catalogue, Module, Semester};
use crate::student::Student;

/// How many future runs of a module to project when checking whether a
/// planned year is a running year.
const PROJECTED_RUNS: i32 = 4;

/// Find planned modules that will not run in the selected year or
/// semester. Returns (findings, adviser notes).
pub fn find_not_running_modules(
    student: &Student,
    catalogue: &Catalogue,
) -> (Vec<String>, Vec<String>) {
    let mut findings = Vec::new();

    for choice in &student.choices {
        let module = match catalogue.get(&choice.module) {
            Some(module) => module,
            None => continue,
        };

        if choice.semester != module.semester && module.semester != Semester::FullYear {
            findings.push(format!(
                "Selected module {} for Semester {} but it is actually running in {}",
                choice.module, choice.semester, module.semester
            ));
        }

        if !running_years(module).contains(&choice.academic_year) {
            findings.push(format!(
                "Selected module {} is not running in academic year {}",
                choice.module, choice.academic_year
            ));
        }
    }

    (findings, Vec::new())
}

/// Academic years the module runs in, projected forward from its intake
/// year; alternating modules step two years at a time.
fn running_years(module: &Module) -> Vec<String> {
    let step = if module.alternates { 2 } else { 1 };
    let mut years = vec![module.year.clone()];
    for run in 0..PROJECTED_RUNS {
        let start = module.intake_start + step * run;
        years.push(format!("{}/{}", start, start + 1));
    }
    years
}
