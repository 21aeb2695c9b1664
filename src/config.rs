//! Run configuration.
//!
//! Configuration is an optional YAML file; every field has a default so a
//! bare checkout works without one. A config file that exists but does not
//! parse is an error - silently falling back to defaults would hide typos.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use serde::Deserialize;

/// Default config file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "advisor.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the module catalogue CSV
    pub catalogue: PathBuf,
    /// Directory holding the historical record tables
    pub student_data: PathBuf,
    /// First calendar year of the academic year being advised for;
    /// derived from the wall clock when not pinned
    pub reference_year: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalogue: PathBuf::from("module_catalogue/catalogue.csv"),
            student_data: PathBuf::from("student_data"),
            reference_year: current_academic_year(),
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// file is used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// First calendar year of the current academic year; the year rolls over
/// in August.
pub fn current_academic_year() -> i32 {
    let today = chrono::Local::now().date_naive();
    if today.month() >= 8 {
        today.year()
    } else {
        today.year() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.catalogue, PathBuf::from("module_catalogue/catalogue.csv"));
        assert_eq!(config.student_data, PathBuf::from("student_data"));
        assert!(config.reference_year >= 2025);
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("advisor.yaml");
        fs::write(
            &path,
            "catalogue: data/catalogue.csv\nstudent_data: data/records\nreference_year: 2023\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.catalogue, PathBuf::from("data/catalogue.csv"));
        assert_eq!(config.student_data, PathBuf::from("data/records"));
        assert_eq!(config.reference_year, 2023);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("advisor.yaml");
        fs::write(&path, "reference_year: 2023\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.reference_year, 2023);
        assert_eq!(config.student_data, PathBuf::from("student_data"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let missing = Path::new("/nonexistent/advisor.yaml");
        assert!(Config::load(Some(missing)).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("advisor.yaml");
        fs::write(&path, "reference_year: [not, a, year]\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
