//! Historical academic record tables.
//!
//! The school exports student records as one or more CSV tables; which
//! table holds a given student is not known up front, so lookups scan all
//! of them in enumeration order. Tables load once per run and are
//! read-only afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// One row of a record table: a single module attempt by a student.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordRow {
    #[serde(rename = "Student ID")]
    pub student_id: u32,
    #[serde(rename = "Module code")]
    pub module_code: String,
    /// Academic year of the attempt, e.g. `2021/2022`
    #[serde(rename = "Year")]
    pub academic_year: String,
    /// Assessment result code; `P` marks a pass
    #[serde(rename = "Assessment result")]
    pub result: String,
    #[serde(rename = "Programme name")]
    pub programme_name: String,
    #[serde(rename = "Given names")]
    pub given_names: String,
    #[serde(rename = "Family name")]
    pub family_name: String,
    #[serde(rename = "Email")]
    pub email: String,
}

/// One loaded record table.
#[derive(Debug)]
pub struct RecordTable {
    /// File the table was loaded from
    pub source: PathBuf,
    pub rows: Vec<RecordRow>,
}

impl RecordTable {
    /// Load a single CSV record table.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open record table: {}", path.display()))?;

        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let row: RecordRow =
                row.with_context(|| format!("Malformed record row in {}", path.display()))?;
            rows.push(row);
        }

        Ok(Self {
            source: path.to_path_buf(),
            rows,
        })
    }

    /// Whether the table contains any row for the student.
    pub fn contains(&self, student_id: u32) -> bool {
        self.rows.iter().any(|row| row.student_id == student_id)
    }
}

/// Load every `.csv` table in the student data directory.
pub fn load_record_tables(dir: &Path) -> Result<Vec<RecordTable>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read student data directory: {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("csv")
        })
        .collect();
    paths.sort();

    let mut tables = Vec::new();
    for path in paths {
        tables.push(RecordTable::load(&path)?);
    }
    Ok(tables)
}

/// All rows for a student from the first table that knows the ID, or `None`
/// when no table does.
pub fn find_student_rows(tables: &[RecordTable], student_id: u32) -> Option<Vec<&RecordRow>> {
    for table in tables {
        if table.contains(student_id) {
            return Some(
                table
                    .rows
                    .iter()
                    .filter(|row| row.student_id == student_id)
                    .collect(),
            );
        }
    }
    None
}
