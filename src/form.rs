//! Module choice form parsing.
//!
//! Forms are YAML documents with a student ID and one list of module codes
//! per honours year/semester header:
//!
//! ```yaml
//! student_id: 210001234
//! choices:
//!   "Year 1 of Honours: Semester 1":
//!     - MT3501
//!     - 3502          # bare numbers are normalized with the subject prefix
//!   "Year 1 of Honours: Semester 2":
//!     - MT3503
//! ```
//!
//! A form that cannot be matched to a student ID degrades to a sentinel
//! outcome so a bad file never aborts a batch; only I/O failures are
//! errors here.

use std::path::Path;

use anyhow::{Context, Result};
use serde_yaml::Value;

use crate::subject;

/// Structured extraction from one submitted form.
#[derive(Debug, Clone)]
pub struct FormData {
    pub student_id: u32,
    /// Section header -> ordered module codes, in document order
    sections: Vec<(String, Vec<String>)>,
}

impl FormData {
    /// Module codes under the given section header, empty when the header
    /// is absent.
    pub fn section(&self, header: &str) -> Vec<String> {
        self.sections
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, modules)| modules.clone())
            .unwrap_or_default()
    }
}

/// Why a form file could not be turned into [`FormData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIssue {
    /// No valid student ID in the document
    MissingStudentId,
    /// The document is not parseable at all
    Malformed(String),
}

impl std::fmt::Display for FormIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStudentId => write!(f, "The file does not contain a valid student ID."),
            Self::Malformed(reason) => write!(f, "The file could not be parsed: {}", reason),
        }
    }
}

/// Result of reading one form file.
#[derive(Debug)]
pub enum FormParse {
    Valid(FormData),
    Invalid(FormIssue),
}

/// Read and parse a module choice form.
pub fn parse_form(path: &Path) -> Result<FormParse> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file: {}", path.display()))?;

    let document: Value = match serde_yaml::from_str(&content) {
        Ok(document) => document,
        Err(err) => return Ok(FormParse::Invalid(FormIssue::Malformed(err.to_string()))),
    };

    let student_id = match extract_student_id(&document) {
        Some(id) => id,
        None => return Ok(FormParse::Invalid(FormIssue::MissingStudentId)),
    };

    let mut sections = Vec::new();
    if let Some(choices) = document.get("choices").and_then(Value::as_mapping) {
        for (header, entries) in choices {
            let header = match header.as_str() {
                Some(header) => header.to_string(),
                None => continue,
            };
            let modules = entries
                .as_sequence()
                .map(|entries| entries.iter().filter_map(normalize_module_entry).collect())
                .unwrap_or_default();
            sections.push((header, modules));
        }
    }

    Ok(FormParse::Valid(FormData {
        student_id,
        sections,
    }))
}

fn extract_student_id(document: &Value) -> Option<u32> {
    let id = document.get("student_id")?.as_u64()?;
    if id == 0 {
        return None;
    }
    u32::try_from(id).ok()
}

/// Form entries may be full module codes or bare catalogue numbers; bare
/// numbers get the subject prefix.
fn normalize_module_entry(entry: &Value) -> Option<String> {
    match entry {
        Value::String(code) => {
            let code = code.trim();
            if code.is_empty() {
                None
            } else {
                Some(code.to_string())
            }
        }
        Value::Number(number) => Some(format!("{}{}", subject::PREFIX, number)),
        _ => None,
    }
}
