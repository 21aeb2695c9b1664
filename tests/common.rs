//! Common fixture helpers for integration tests.
//!
//! Builds a small but complete data directory: a module catalogue, one
//! historical record table, and module choice forms. The reference academic
//! year is pinned to 2023 so tests never depend on the wall clock.

use std::fs;
use std::path::{Path, PathBuf};

/// Reference academic year used by every fixture.
pub const REFERENCE_YEAR: i32 = 2023;

/// Student ID present in the fixture record table.
pub const KNOWN_STUDENT: u32 = 210001234;

const CATALOGUE_HEADER: &str =
    "Module code,Semester,Year,Alternate years,Prerequisites,Antirequisites,Timetable\n";

const RECORD_HEADER: &str =
    "Student ID,Module code,Year,Assessment result,Programme name,Given names,Family name,Email\n";

/// Write the fixture catalogue and return its path.
///
/// Semesters, prerequisites and timetables are consistent with the clean
/// form from [`clean_form_yaml`]: every prerequisite is satisfiable and no
/// two selected modules share a timeslot.
pub fn write_catalogue(dir: &Path) -> PathBuf {
    let rows = [
        "MT3501,S1,2023/2024,No,MT2501 and MT2503,,9am Mon",
        "MT3502,S1,2023/2024,No,,,10am Mon",
        "MT3503,S1,2023/2024,No,,,11am Mon",
        "MT3504,S1,2023/2024,No,,,12noon Mon",
        "MT3505,S2,2023/2024,No,,,9am Tue",
        "MT3506,S2,2023/2024,No,,,10am Tue",
        "MT3507,S2,2023/2024,No,,,11am Tue",
        "MT3508,S2,2023/2024,No,,,12noon Tue",
        "MT3510,S2,2023/2024,No,,,1pm Tue",
        "MT3511,S2,2023/2024,No,,,9am Tue",
        "MT4003,S1,2023/2024,No,,,9am Wed",
        "MT4004,S1,2023/2024,No,,,10am Wed",
        "MT4512,S1,2023/2024,No,MT3501 or MT3502,,11am Wed",
        "MT4514,S1,2023/2024,No,,,12noon Wed",
        "MT4515,S2,2023/2024,No,co-requisite MT4526 and MT3505,,9am Thu",
        "MT4526,S2,2023/2024,No,,,10am Thu",
        "MT4527,S2,2023/2024,No,,MT2599,11am Thu",
        "MT4599,Full Year,2023/2024,No,,,",
        "MT5867,S2,2023/2024,Yes,two of special list,,1pm Thu",
    ];

    let path = dir.join("catalogue.csv");
    fs::write(&path, format!("{}{}\n", CATALOGUE_HEADER, rows.join("\n"))).unwrap();
    path
}

/// Write the fixture record tables into `dir/records` and return that
/// directory. The known student passed four sub-honours modules between
/// 2021/2022 and 2022/2023, putting them in honours year 1 of a BSc in
/// `REFERENCE_YEAR`.
pub fn write_records(dir: &Path) -> PathBuf {
    let records_dir = dir.join("records");
    fs::create_dir_all(&records_dir).unwrap();

    let row = |module: &str, year: &str, result: &str| {
        format!(
            "{},{},{},{},Bachelor of Science (Honours) Mathematics,Ada,Lovelace,al42@school.test\n",
            KNOWN_STUDENT, module, year, result
        )
    };

    let mut table = String::from(RECORD_HEADER);
    table.push_str(&row("MT1002", "2021/2022", "P"));
    table.push_str(&row("MT1003", "2021/2022", "P"));
    table.push_str(&row("MT2501", "2022/2023", "P"));
    table.push_str(&row("MT2503", "2022/2023", "P"));
    table.push_str(&row("MT2506", "2022/2023", "F"));

    fs::write(records_dir.join("cohort_2021.csv"), table).unwrap();
    records_dir
}

/// A complete, clash-free, prerequisite-satisfying module selection.
pub fn clean_form_yaml() -> String {
    clean_form_yaml_for(KNOWN_STUDENT)
}

/// The clean selection for an arbitrary student ID.
pub fn clean_form_yaml_for(student_id: u32) -> String {
    format!(
        "student_id: {}\n\
         choices:\n\
         \x20 \"Year 1 of Honours: Semester 1\": [MT3501, MT3502, MT3503, MT3504]\n\
         \x20 \"Year 1 of Honours: Semester 2\": [MT3505, MT3506, MT3507, MT3510]\n\
         \x20 \"Year 2 of Honours: Semester 1\": [MT4003, MT4004, MT4512, MT4514]\n\
         \x20 \"Year 2 of Honours: Semester 2\": [MT4515, MT4526, MT4527, MT4599]\n",
        student_id
    )
}

/// Write a form file and return its path.
pub fn write_form(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
