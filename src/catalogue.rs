//! Module catalogue loading and lookup.
//!
//! The catalogue is loaded once per run from a CSV export of the school's
//! module table and is read-only afterwards. Every checker consults it
//! through [`Catalogue::get`]; a code that is absent means "unknown module"
//! and is reported as a finding by the programme checker, never treated as
//! an error here.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::subject;

/// Teaching semester of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
    S1,
    S2,
    FullYear,
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S1 => write!(f, "S1"),
            Self::S2 => write!(f, "S2"),
            Self::FullYear => write!(f, "Full Year"),
        }
    }
}

impl FromStr for Semester {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "S1" => Ok(Self::S1),
            "S2" => Ok(Self::S2),
            "Full Year" => Ok(Self::FullYear),
            other => bail!("unrecognized semester value '{}'", other),
        }
    }
}

/// One row of the module catalogue.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module code, e.g. `MT3501`
    pub code: String,
    /// Semester the module teaches in
    pub semester: Semester,
    /// Intake academic year as recorded, e.g. `2023/2024`
    pub year: String,
    /// First calendar year of the intake academic year
    pub intake_start: i32,
    /// Whether the module only runs every other year
    pub alternates: bool,
    /// Raw prerequisite expression, if any
    pub prerequisites: Option<String>,
    /// Raw antirequisite listing, if any
    pub antirequisites: Option<String>,
    /// Raw timetable string, if any
    pub timetable: Option<String>,
}

/// Raw CSV row as exported from the module table.
#[derive(Debug, Deserialize)]
struct CatalogueRow {
    #[serde(rename = "Module code")]
    code: String,
    #[serde(rename = "Semester")]
    semester: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Alternate years")]
    alternate_years: String,
    #[serde(rename = "Prerequisites", default)]
    prerequisites: Option<String>,
    #[serde(rename = "Antirequisites", default)]
    antirequisites: Option<String>,
    #[serde(rename = "Timetable", default)]
    timetable: Option<String>,
}

/// In-memory module catalogue keyed by module code.
#[derive(Debug, Default)]
pub struct Catalogue {
    modules: BTreeMap<String, Module>,
}

impl Catalogue {
    /// Load the catalogue from a CSV file.
    ///
    /// Data-entry errors in the table (an alternation flag that is neither
    /// `Yes` nor `No`, a malformed intake year) are fatal: they need a
    /// manual fix in the source table, not per-student handling.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open module catalogue: {}", path.display()))?;

        let mut modules = Vec::new();
        for row in reader.deserialize() {
            let row: CatalogueRow = row
                .with_context(|| format!("Malformed catalogue row in {}", path.display()))?;
            modules.push(Module::from_row(row)?);
        }

        Ok(Self::from_modules(modules))
    }

    /// Build a catalogue from already-constructed modules.
    pub fn from_modules(modules: Vec<Module>) -> Self {
        let modules = modules
            .into_iter()
            .map(|module| (module.code.clone(), module))
            .collect();
        Self { modules }
    }

    /// Look up a module by code. `None` means "unknown module".
    pub fn get(&self, code: &str) -> Option<&Module> {
        self.modules.get(code)
    }

    /// Whether the catalogue knows the given module code.
    pub fn contains(&self, code: &str) -> bool {
        self.modules.contains_key(code)
    }

    /// Number of catalogued modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Module {
    fn from_row(row: CatalogueRow) -> Result<Self> {
        let code = row.code.trim().to_string();

        let semester = row
            .semester
            .parse::<Semester>()
            .with_context(|| format!("Bad semester entry for module {}", code))?;

        let alternates = match row.alternate_years.trim() {
            "Yes" => true,
            "No" => false,
            other => bail!(
                "cannot tell if module {} is alternating or not (entry is '{}'); check the catalogue entry",
                code,
                other
            ),
        };

        let year = row.year.trim().to_string();
        let intake_start = parse_intake_start(&year)
            .with_context(|| format!("Bad intake year entry for module {}", code))?;

        Ok(Self {
            code,
            semester,
            year,
            intake_start,
            alternates,
            prerequisites: normalize_field(row.prerequisites),
            antirequisites: normalize_field(row.antirequisites),
            timetable: normalize_field(row.timetable),
        })
    }
}

/// Compile the module-code pattern used throughout the checkers.
pub fn module_code_regex() -> Regex {
    Regex::new(subject::MODULE_CODE_PATTERN).unwrap()
}

/// Whether the string is exactly one well-formed module code.
pub fn is_module_code(s: &str) -> bool {
    Regex::new(&format!("^{}$", subject::MODULE_CODE_PATTERN))
        .unwrap()
        .is_match(s)
}

fn parse_intake_start(year: &str) -> Result<i32> {
    let start = year
        .split('/')
        .next()
        .unwrap_or_default()
        .trim();
    if start.len() != 4 {
        bail!("intake year '{}' is not of the form YYYY/YYYY", year);
    }
    start
        .parse::<i32>()
        .with_context(|| format!("intake year '{}' is not of the form YYYY/YYYY", year))
}

/// Empty or whitespace-only CSV cells become `None`.
fn normalize_field(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
