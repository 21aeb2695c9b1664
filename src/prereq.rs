//! Prerequisite and antirequisite evaluation.
//!
//! For every planned module the student's accumulated context is derived
//! (what they will have taken by then, what they take concurrently), the
//! module's prerequisite field is evaluated against it, and any
//! antirequisite overlap is reported.
//!
//! Prerequisite fields come in several shapes, tried in order: a per-module
//! override from [`prereq_override`], a recognized literal requirement, a
//! single bare module code, and finally a general boolean expression parsed
//! by [`crate::expr`].

use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::catalogue::{module_code_regex, is_module_code, Catalogue, Module, Semester};
use crate::expr;
use crate::student::{ModuleChoice, Student};

/// Requirement that only a letter from the partner school satisfies; this
/// check can only remind the adviser about it.
const LETTER_OF_AGREEMENT: &str = "Letter of agreement";

/// Admission restriction the check cannot verify, so it always fails.
const MSC_ADMISSION: &str = "Students must have gained admission onto an MSc programme";

/// Hard-coded prerequisite rule for a module whose catalogue entry does
/// not fit the expression grammar.
pub struct PrereqOverride {
    /// Human-readable requirement, quoted in findings
    pub requirement: &'static str,
    /// Module codes that count towards the requirement
    pub options: &'static [&'static str],
    /// How many of the options must be previously taken
    pub minimum: usize,
}

static MT5867_RULE: PrereqOverride = PrereqOverride {
    requirement: "two of (MT3505, MT4003, MT4004, MT4512, MT4514, MT4515, MT4526)",
    options: &[
        "MT3505", "MT4003", "MT4004", "MT4512", "MT4514", "MT4515", "MT4526",
    ],
    minimum: 2,
};

/// Grammar-exception table, consulted before the general parser. Extending
/// it is a data change.
fn prereq_override(code: &str) -> Option<&'static PrereqOverride> {
    match code {
        "MT5867" => Some(&MT5867_RULE),
        _ => None,
    }
}

/// Accumulated-module context for one planned module.
#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    /// Modules taken before the module starts: passes, earlier honours
    /// years, and same-year semester 1 for a semester 2 module
    pub previously_taken: HashSet<String>,
    /// Other modules taken in the same year and semester
    pub concurrently_taken: HashSet<String>,
}

impl ModuleContext {
    /// Whether a required module is satisfied in this context. Co-requisite
    /// requirements accept concurrent enrolment as well.
    pub fn satisfies(&self, code: &str, co_requisite: bool) -> bool {
        self.previously_taken.contains(code)
            || (co_requisite && self.concurrently_taken.contains(code))
    }
}

/// Derive the accumulated context for one choice entry.
pub fn context_for(student: &Student, choice: &ModuleChoice) -> ModuleContext {
    let this_year = year_number(&choice.honours_year);

    let mut context = ModuleContext::default();
    context
        .previously_taken
        .extend(student.passed_modules.iter().cloned());

    for other in &student.choices {
        let other_year = year_number(&other.honours_year);
        if other_year < this_year {
            context.previously_taken.insert(other.module.clone());
        }
        if choice.semester == Semester::S2
            && other.honours_year == choice.honours_year
            && other.semester == Semester::S1
        {
            context.previously_taken.insert(other.module.clone());
        }
        if other.honours_year == choice.honours_year
            && other.semester == choice.semester
            && other.module != choice.module
        {
            context.concurrently_taken.insert(other.module.clone());
        }
    }

    context
}

/// Evaluate prerequisites and antirequisites for every planned module.
/// Returns (findings, adviser notes).
pub fn find_missing_prerequisites(
    student: &Student,
    catalogue: &Catalogue,
) -> Result<(Vec<String>, Vec<String>)> {
    let mut findings = Vec::new();
    let mut advice = Vec::new();

    for choice in &student.choices {
        // Unknown modules are already flagged by the programme checker;
        // re-reporting them here would duplicate the finding.
        let module = match catalogue.get(&choice.module) {
            Some(module) => module,
            None => continue,
        };

        let context = context_for(student, choice);
        check_prerequisites(module, &context, &mut findings, &mut advice)?;
        check_antirequisites(module, &context, &mut findings);
    }

    Ok((findings, advice))
}

fn check_prerequisites(
    module: &Module,
    context: &ModuleContext,
    findings: &mut Vec<String>,
    advice: &mut Vec<String>,
) -> Result<()> {
    if let Some(rule) = prereq_override(&module.code) {
        let matching = rule
            .options
            .iter()
            .filter(|option| context.previously_taken.contains(**option))
            .count();
        if matching < rule.minimum {
            findings.push(format!(
                "Student is missing prerequisite [{}] for module {}",
                rule.requirement, module.code
            ));
        }
        return Ok(());
    }

    let raw = match module.prerequisites.as_deref() {
        Some(raw) => raw,
        None => return Ok(()),
    };

    if raw == LETTER_OF_AGREEMENT {
        advice.push(format!(
            "Module {} requires a letter of agreement",
            module.code
        ));
    } else if raw == MSC_ADMISSION {
        findings.push(format!(
            "Student cannot take module {} as this module is only available to MSc students",
            module.code
        ));
    } else if is_module_code(raw) {
        if !context.previously_taken.contains(raw) {
            findings.push(format!(
                "Student is missing prerequisite {} for module {}",
                raw, module.code
            ));
        }
    } else {
        let parsed = expr::parse(raw).with_context(|| {
            format!(
                "Unparseable prerequisite expression for module {}: '{}'",
                module.code, raw
            )
        })?;
        let resolve = |code: &str, co_requisite: bool| context.satisfies(code, co_requisite);
        if !parsed.evaluate(&resolve) {
            let substituted = expr::substitute(raw, &resolve)?;
            findings.push(format!(
                "Student is missing prerequisite [{}] for module {} ([{}])",
                raw, module.code, substituted
            ));
        }
    }

    Ok(())
}

fn check_antirequisites(module: &Module, context: &ModuleContext, findings: &mut Vec<String>) {
    let raw = match module.antirequisites.as_deref() {
        Some(raw) => raw,
        None => return,
    };

    let code_pattern = module_code_regex();
    for found in code_pattern.find_iter(raw) {
        let code = found.as_str();
        if context.previously_taken.contains(code) || context.concurrently_taken.contains(code) {
            findings.push(format!(
                "Student selected antirequisite {} for module {}",
                code, module.code
            ));
        }
    }
}

fn year_number(label: &str) -> i32 {
    label
        .trim_start_matches("Year")
        .trim()
        .parse()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Module;

    fn module(code: &str, prerequisites: Option<&str>, antirequisites: Option<&str>) -> Module {
        Module {
            code: code.to_string(),
            semester: Semester::S1,
            year: "2023/2024".to_string(),
            intake_start: 2023,
            alternates: false,
            prerequisites: prerequisites.map(str::to_string),
            antirequisites: antirequisites.map(str::to_string),
            timetable: None,
        }
    }

    fn choice(honours_year: &str, semester: Semester, code: &str) -> ModuleChoice {
        ModuleChoice {
            honours_year: honours_year.to_string(),
            academic_year: "2023/2024".to_string(),
            semester,
            module: code.to_string(),
        }
    }

    fn student(passed: &[&str], choices: Vec<ModuleChoice>) -> Student {
        Student {
            student_id: 210001234,
            full_name: "Ada Lovelace".to_string(),
            email: "al42@school.test".to_string(),
            programme_name: "Bachelor of Science (Honours) Mathematics".to_string(),
            year_of_study: 3,
            expected_honours_years: 2,
            current_honours_year: 1,
            passed_modules: passed.iter().map(|code| code.to_string()).collect(),
            passed_honours_modules: vec![],
            choices,
        }
    }

    #[test]
    fn test_single_code_prerequisite() {
        let catalogue = Catalogue::from_modules(vec![module("MT3501", Some("MT2501"), None)]);
        let missing = student(&[], vec![choice("Year 1", Semester::S1, "MT3501")]);
        let (findings, _) = find_missing_prerequisites(&missing, &catalogue).unwrap();
        assert_eq!(
            findings,
            vec!["Student is missing prerequisite MT2501 for module MT3501"]
        );

        let satisfied = student(&["MT2501"], vec![choice("Year 1", Semester::S1, "MT3501")]);
        let (findings, _) = find_missing_prerequisites(&satisfied, &catalogue).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_compound_prerequisite_requires_both() {
        let catalogue =
            Catalogue::from_modules(vec![module("MT3501", Some("MT1001 and MT1002"), None)]);
        let partially = student(&["MT1001"], vec![choice("Year 1", Semester::S1, "MT3501")]);
        let (findings, _) = find_missing_prerequisites(&partially, &catalogue).unwrap();
        assert_eq!(
            findings,
            vec![
                "Student is missing prerequisite [MT1001 and MT1002] for module MT3501 ([true and false])"
            ]
        );

        let fully = student(
            &["MT1001", "MT1002"],
            vec![choice("Year 1", Semester::S1, "MT3501")],
        );
        let (findings, _) = find_missing_prerequisites(&fully, &catalogue).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_idempotent_evaluation() {
        let catalogue =
            Catalogue::from_modules(vec![module("MT3501", Some("MT1001 or MT1002"), None)]);
        let subject = student(&[], vec![choice("Year 1", Semester::S1, "MT3501")]);
        let first = find_missing_prerequisites(&subject, &catalogue).unwrap();
        let second = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_co_requisite_satisfied_concurrently() {
        let catalogue = Catalogue::from_modules(vec![
            module("MT4003", Some("co-requisite MT4004 and MT2501"), None),
            module("MT4004", None, None),
        ]);
        let subject = student(
            &["MT2501"],
            vec![
                choice("Year 1", Semester::S1, "MT4003"),
                choice("Year 1", Semester::S1, "MT4004"),
            ],
        );
        let (findings, _) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_plain_prerequisite_not_satisfied_concurrently() {
        let catalogue = Catalogue::from_modules(vec![
            module("MT4003", Some("MT4004 and MT2501"), None),
            module("MT4004", None, None),
        ]);
        let subject = student(
            &["MT2501"],
            vec![
                choice("Year 1", Semester::S1, "MT4003"),
                choice("Year 1", Semester::S1, "MT4004"),
            ],
        );
        let (findings, _) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("MT4003"));
    }

    #[test]
    fn test_earlier_year_counts_as_previously_taken() {
        let catalogue = Catalogue::from_modules(vec![
            module("MT3501", None, None),
            module("MT4512", Some("MT3501"), None),
        ]);
        let subject = student(
            &[],
            vec![
                choice("Year 1", Semester::S1, "MT3501"),
                choice("Year 2", Semester::S1, "MT4512"),
            ],
        );
        let (findings, _) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_same_year_semester_one_counts_for_semester_two() {
        let catalogue = Catalogue::from_modules(vec![
            module("MT3501", None, None),
            module("MT3502", Some("MT3501"), None),
        ]);
        let subject = student(
            &[],
            vec![
                choice("Year 1", Semester::S1, "MT3501"),
                choice("Year 1", Semester::S2, "MT3502"),
            ],
        );
        let (findings, _) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_letter_of_agreement_is_advisory() {
        let catalogue =
            Catalogue::from_modules(vec![module("ID4001", Some("Letter of agreement"), None)]);
        let subject = student(&[], vec![choice("Year 1", Semester::S1, "ID4001")]);
        let (findings, advice) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert!(findings.is_empty());
        assert_eq!(advice, vec!["Module ID4001 requires a letter of agreement"]);
    }

    #[test]
    fn test_msc_admission_is_a_hard_finding() {
        let catalogue = Catalogue::from_modules(vec![module(
            "MT5099",
            Some("Students must have gained admission onto an MSc programme"),
            None,
        )]);
        let subject = student(&[], vec![choice("Year 1", Semester::S1, "MT5099")]);
        let (findings, _) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert_eq!(
            findings,
            vec!["Student cannot take module MT5099 as this module is only available to MSc students"]
        );
    }

    #[test]
    fn test_override_rule_counts_previously_taken() {
        let catalogue = Catalogue::from_modules(vec![module("MT5867", Some("unused"), None)]);
        let short = student(&["MT3505"], vec![choice("Year 2", Semester::S1, "MT5867")]);
        let (findings, _) = find_missing_prerequisites(&short, &catalogue).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("two of"));

        let enough = student(
            &["MT3505", "MT4003"],
            vec![choice("Year 2", Semester::S1, "MT5867")],
        );
        let (findings, _) = find_missing_prerequisites(&enough, &catalogue).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_antirequisite_overlap() {
        let catalogue =
            Catalogue::from_modules(vec![module("MT4113", None, Some("MT4112, MT4111"))]);
        let subject = student(&["MT4112"], vec![choice("Year 1", Semester::S1, "MT4113")]);
        let (findings, _) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert_eq!(
            findings,
            vec!["Student selected antirequisite MT4112 for module MT4113"]
        );
    }

    #[test]
    fn test_unknown_module_is_skipped() {
        let catalogue = Catalogue::from_modules(vec![]);
        let subject = student(&[], vec![choice("Year 1", Semester::S1, "MT9999")]);
        let (findings, advice) = find_missing_prerequisites(&subject, &catalogue).unwrap();
        assert!(findings.is_empty());
        assert!(advice.is_empty());
    }

    #[test]
    fn test_unparseable_expression_is_fatal() {
        let catalogue = Catalogue::from_modules(vec![module(
            "MT4998",
            Some("see the school handbook"),
            None,
        )]);
        let subject = student(&[], vec![choice("Year 1", Semester::S1, "MT4998")]);
        let err = find_missing_prerequisites(&subject, &catalogue).unwrap_err();
        assert!(err.to_string().contains("MT4998"));
    }
}
