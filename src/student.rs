//! Student profile construction and derived module views.
//!
//! A profile reconciles one module choice form with the student's
//! historical academic records: it derives the year of study, the current
//! honours year (advanced-standing aware), the passed-module history and
//! its honours-eligible subset, and the planned module choices under
//! validation.

use anyhow::{bail, Result};

use crate::catalogue::Semester;
use crate::form::FormData;
use crate::records::{self, RecordTable};
use crate::subject;

/// Shape of a recognized degree programme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgrammeShape {
    /// Total length of the programme in years
    pub programme_years: i32,
    /// Years spent in the honours phase (2 or 3)
    pub honours_years: i32,
}

/// Match a programme name against the recognized set.
///
/// Returns `None` for programmes the checker does not know how to parse;
/// that is a sentinel condition for the submitting student, not an error.
pub fn recognize_programme(name: &str) -> Option<ProgrammeShape> {
    let shape = |programme_years, honours_years| ProgrammeShape {
        programme_years,
        honours_years,
    };

    if name.contains("Bachelor of Science") {
        Some(shape(4, 2))
    } else if name.contains("Master in Mathematics") {
        Some(shape(5, 3))
    } else if name.contains("Master of Arts (Honours)") {
        Some(shape(4, 2))
    } else if name == "Master in Chemistry (Honours) Chemistry with Mathematics"
        || name == "Master in Physics (Honours) Mathematics and Theoretical Physics"
    {
        Some(shape(5, 3))
    } else {
        None
    }
}

/// One planned module entry from the choice form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleChoice {
    /// Honours year label, e.g. `Year 1`
    pub honours_year: String,
    /// Academic year the entry falls in, e.g. `2023/2024`
    pub academic_year: String,
    pub semester: Semester,
    /// Module code, normalized
    pub module: String,
}

/// Normalized profile of one student under validation.
#[derive(Debug, Clone)]
pub struct Student {
    pub student_id: u32,
    pub full_name: String,
    pub email: String,
    /// Full programme name as it appears in the record tables
    pub programme_name: String,
    pub year_of_study: i32,
    /// Expected honours duration in years (2 or 3)
    pub expected_honours_years: i32,
    /// Current honours year; differs from year of study when advanced
    /// standing shortened the programme
    pub current_honours_year: i32,
    /// All passed modules from the historical records
    pub passed_modules: Vec<String>,
    /// Passed modules restricted to already-elapsed honours years
    pub passed_honours_modules: Vec<String>,
    /// Planned honours module choices, in form order
    pub choices: Vec<ModuleChoice>,
}

impl Student {
    /// All modules the student has taken or plans to take.
    pub fn full_module_list(&self) -> Vec<String> {
        let mut modules = self.passed_modules.clone();
        modules.extend(self.planned_modules());
        modules
    }

    /// Passed honours modules plus everything planned.
    pub fn all_honours_modules(&self) -> Vec<String> {
        let mut modules = self.passed_honours_modules.clone();
        modules.extend(self.planned_modules());
        modules
    }

    /// Planned module codes, in form order.
    pub fn planned_modules(&self) -> Vec<String> {
        self.choices.iter().map(|choice| choice.module.clone()).collect()
    }

    /// Distinct honours year labels appearing in the choices, in order.
    pub fn honours_years_in_choices(&self) -> Vec<String> {
        let mut years = Vec::new();
        for choice in &self.choices {
            if !years.contains(&choice.honours_year) {
                years.push(choice.honours_year.clone());
            }
        }
        years
    }

    /// How many modules of the given list the student takes, counting both
    /// passed and planned modules, each list entry at most once.
    pub fn count_modules_in_list(&self, list: &[&str]) -> usize {
        let taken = self.full_module_list();
        list.iter()
            .filter(|code| taken.iter().any(|taken_code| taken_code == *code))
            .count()
    }
}

/// Why a form could not be matched to a valid student record.
///
/// These are per-record sentinel conditions: the batch continues and the
/// student gets a clearly-marked placeholder summary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentinelReason {
    /// The student ID appears in none of the record tables
    UnknownStudentId(u32),
    /// The programme name matches no recognized programme
    UnrecognizedProgramme(String),
}

impl std::fmt::Display for SentinelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStudentId(id) => {
                write!(f, "The file contains invalid student ID {}", id)
            }
            Self::UnrecognizedProgramme(name) => {
                write!(f, "Do not recognise student programme for parsing: {}", name)
            }
        }
    }
}

/// Outcome of reconciling a form with the record tables.
#[derive(Debug)]
pub enum BuildOutcome {
    Student(Box<Student>),
    Sentinel(SentinelReason),
}

/// Build a student profile from a parsed form and the record tables.
///
/// `reference_year` is the first calendar year of the academic year the
/// student's current honours year falls in; all academic-year arithmetic
/// is relative to it. Corrupt record data (conflicting programme, name or
/// email entries for one student) is fatal.
pub fn build_student(
    form: &FormData,
    tables: &[RecordTable],
    reference_year: i32,
) -> Result<BuildOutcome> {
    let student_id = form.student_id;

    let rows = match records::find_student_rows(tables, student_id) {
        Some(rows) => rows,
        None => return Ok(BuildOutcome::Sentinel(SentinelReason::UnknownStudentId(student_id))),
    };

    let programme_name = unique_value(&rows, "Programme name", student_id, |row| {
        row.programme_name.as_str()
    })?;
    let given_names =
        unique_value(&rows, "Given names", student_id, |row| row.given_names.as_str())?;
    let family_name =
        unique_value(&rows, "Family name", student_id, |row| row.family_name.as_str())?;
    let email = unique_value(&rows, "Email", student_id, |row| row.email.as_str())?;
    let full_name = format!("{} {}", given_names, family_name);

    let shape = match recognize_programme(&programme_name) {
        Some(shape) => shape,
        None => {
            return Ok(BuildOutcome::Sentinel(SentinelReason::UnrecognizedProgramme(
                programme_name,
            )))
        }
    };

    // Year of study is inferred from the earliest recorded module year.
    let earliest_year = rows
        .iter()
        .filter_map(|row| academic_year_start(&row.academic_year))
        .min();
    let earliest_year = match earliest_year {
        Some(year) => year,
        None => bail!(
            "student {} has no parseable academic year in the record source",
            student_id
        ),
    };
    let year_of_study = reference_year - earliest_year + 1;

    // Advanced-standing credit shortens the programme by one year.
    let mut programme_years = shape.programme_years;
    if rows
        .iter()
        .any(|row| row.module_code == subject::ADVANCED_STANDING_CODE)
    {
        programme_years -= 1;
    }

    let sub_honours_years = programme_years - shape.honours_years;
    let current_honours_year = year_of_study - sub_honours_years;

    let passed_rows: Vec<_> = rows
        .iter()
        .copied()
        .filter(|row| row.result == subject::PASS_RESULT)
        .collect();
    let passed_modules: Vec<String> = passed_rows
        .iter()
        .map(|row| row.module_code.clone())
        .collect();

    // Partition passes into already-elapsed honours years.
    let mut passed_honours_modules = Vec::new();
    for previous_honours_year in 1..current_honours_year {
        let calendar_year = reference_year - (current_honours_year - previous_honours_year);
        let academic_year = academic_year_string(calendar_year);
        passed_honours_modules.extend(
            passed_rows
                .iter()
                .filter(|row| row.academic_year == academic_year)
                .map(|row| row.module_code.clone()),
        );
    }

    // Read choices for every honours year that has not elapsed yet.
    let mut choices = Vec::new();
    for honours_year in current_honours_year..=shape.honours_years {
        let year_label = format!("Year {}", honours_year);
        let calendar_year = reference_year + (honours_year - current_honours_year);
        let academic_year = academic_year_string(calendar_year);
        for (semester_number, semester) in [(1, Semester::S1), (2, Semester::S2)] {
            let header = format!("{} of Honours: Semester {}", year_label, semester_number);
            for module in form.section(&header) {
                choices.push(ModuleChoice {
                    honours_year: year_label.clone(),
                    academic_year: academic_year.clone(),
                    semester,
                    module,
                });
            }
        }
    }

    Ok(BuildOutcome::Student(Box::new(Student {
        student_id,
        full_name,
        email,
        programme_name,
        year_of_study,
        expected_honours_years: shape.honours_years,
        current_honours_year,
        passed_modules,
        passed_honours_modules,
        choices,
    })))
}

/// First calendar year of an academic year string like `2021/2022`.
fn academic_year_start(academic_year: &str) -> Option<i32> {
    academic_year.get(..4)?.parse().ok()
}

/// Academic year string starting in the given calendar year.
pub fn academic_year_string(calendar_year: i32) -> String {
    format!("{}/{}", calendar_year, calendar_year + 1)
}

/// The record source must agree on per-student fields; disagreement means
/// a corrupt source and aborts the run.
fn unique_value<'a>(
    rows: &[&'a records::RecordRow],
    field: &str,
    student_id: u32,
    extract: impl Fn(&'a records::RecordRow) -> &'a str,
) -> Result<String> {
    let mut values: Vec<&str> = rows.iter().map(|row| extract(*row)).collect();
    values.sort_unstable();
    values.dedup();
    match values.as_slice() {
        [single] => Ok(single.to_string()),
        _ => bail!(
            "record source has {} conflicting '{}' entries for student {}",
            values.len(),
            field,
            student_id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_student() -> Student {
        Student {
            student_id: 210001234,
            full_name: "Ada Lovelace".to_string(),
            email: "al42@school.test".to_string(),
            programme_name: "Bachelor of Science (Honours) Mathematics".to_string(),
            year_of_study: 3,
            expected_honours_years: 2,
            current_honours_year: 1,
            passed_modules: vec!["MT1002".to_string(), "MT2501".to_string()],
            passed_honours_modules: vec![],
            choices: vec![
                ModuleChoice {
                    honours_year: "Year 1".to_string(),
                    academic_year: "2023/2024".to_string(),
                    semester: Semester::S1,
                    module: "MT3501".to_string(),
                },
                ModuleChoice {
                    honours_year: "Year 2".to_string(),
                    academic_year: "2024/2025".to_string(),
                    semester: Semester::S2,
                    module: "MT4599".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_recognize_programmes() {
        assert_eq!(
            recognize_programme("Bachelor of Science (Honours) Mathematics"),
            Some(ProgrammeShape {
                programme_years: 4,
                honours_years: 2
            })
        );
        assert_eq!(
            recognize_programme("Master in Mathematics (Honours) Mathematics"),
            Some(ProgrammeShape {
                programme_years: 5,
                honours_years: 3
            })
        );
        assert_eq!(
            recognize_programme("Master of Arts (Honours) Economics and Mathematics"),
            Some(ProgrammeShape {
                programme_years: 4,
                honours_years: 2
            })
        );
        assert_eq!(recognize_programme("Bachelor of Divinity"), None);
    }

    #[test]
    fn test_derived_module_views() {
        let student = sample_student();
        assert_eq!(
            student.full_module_list(),
            vec!["MT1002", "MT2501", "MT3501", "MT4599"]
        );
        assert_eq!(student.all_honours_modules(), vec!["MT3501", "MT4599"]);
        assert_eq!(student.planned_modules(), vec!["MT3501", "MT4599"]);
        assert_eq!(student.honours_years_in_choices(), vec!["Year 1", "Year 2"]);
    }

    #[test]
    fn test_count_modules_in_list() {
        let student = sample_student();
        assert_eq!(student.count_modules_in_list(&["MT3501", "MT3502"]), 1);
        assert_eq!(student.count_modules_in_list(&["MT2501", "MT4599"]), 2);
        assert_eq!(student.count_modules_in_list(&["MT9999"]), 0);
    }

    #[test]
    fn test_academic_year_helpers() {
        assert_eq!(academic_year_string(2023), "2023/2024");
        assert_eq!(academic_year_start("2021/2022"), Some(2021));
        assert_eq!(academic_year_start("n/a"), None);
    }
}
