//! Timeslot parsing and timetable clash detection.
//!
//! Catalogue timetable strings encode one or more weekly bookings:
//!
//! ```text
//! 12noon Mon
//! 10am Tue, 11am Thu
//! 9am Mon (odd weeks), Wed, Fri        (shared time, qualified first day)
//! ```
//!
//! Bookings parse into a base slot (time + day) plus a week-parity
//! qualifier. Two bookings clash when their bases match and their parities
//! overlap: an odd-weeks booking does not clash with an even-weeks booking
//! at the same time, but either clashes with an every-week one.
//!
//! Raw strings that defy the grammar are handled by [`timetable_override`],
//! a table keyed by module code that is consulted before the parser.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::catalogue::{Catalogue, Semester};
use crate::student::Student;

/// Week-parity qualifier of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeekParity {
    Every,
    Odd,
    Even,
}

/// One weekly booking of a module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timeslot {
    /// Time and day, e.g. `10am Mon`
    pub base: String,
    pub parity: WeekParity,
}

impl Timeslot {
    pub fn every(base: &str) -> Self {
        Self {
            base: base.to_string(),
            parity: WeekParity::Every,
        }
    }

    fn with_parity(base: &str, parity: WeekParity) -> Self {
        Self {
            base: base.to_string(),
            parity,
        }
    }

    /// Whether two bookings occupy a common teaching week and time.
    pub fn overlaps(&self, other: &Timeslot) -> bool {
        if self.base != other.base {
            return false;
        }
        match (self.parity, other.parity) {
            (WeekParity::Odd, WeekParity::Even) | (WeekParity::Even, WeekParity::Odd) => false,
            _ => true,
        }
    }
}

impl fmt::Display for Timeslot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parity {
            WeekParity::Every => write!(f, "{}", self.base),
            WeekParity::Odd => write!(f, "{} (odd weeks)", self.base),
            WeekParity::Even => write!(f, "{} (even weeks)", self.base),
        }
    }
}

/// Literal booking overrides for modules whose raw timetable string does
/// not fit the grammar. Checked before the general parser; extending this
/// table is a data change.
fn timetable_override(code: &str) -> Option<Vec<Timeslot>> {
    match code {
        "MT4112" => Some(vec![
            Timeslot::with_parity("10am Wed", WeekParity::Odd),
            Timeslot::with_parity("10am Fri", WeekParity::Odd),
        ]),
        _ => None,
    }
}

/// Parse a raw timetable field into bookings.
///
/// Comma-separated segments each carry a time and day; a segment with only
/// a day inherits the time of the previous booking (the shared-time
/// multi-day form). A segment the grammar cannot make sense of is kept
/// whole as an opaque base so it still participates in literal comparison.
pub fn parse_timetable_field(raw: &str) -> Vec<Timeslot> {
    let mut slots: Vec<Timeslot> = Vec::new();

    for segment in raw.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (stripped, parity) = strip_parity(segment);
        let words: Vec<&str> = stripped.split_whitespace().collect();

        match words.as_slice() {
            [time, day] => slots.push(Timeslot::with_parity(&format!("{} {}", time, day), parity)),
            [day] => {
                // Shared-time form: inherit the time of the previous booking,
                // but not its qualifier.
                if let Some(previous) = slots.last() {
                    let time = previous
                        .base
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string();
                    slots.push(Timeslot::with_parity(&format!("{} {}", time, day), parity));
                } else {
                    slots.push(Timeslot::with_parity(day, parity));
                }
            }
            _ => slots.push(Timeslot::with_parity(stripped.trim(), parity)),
        }
    }

    slots
}

fn strip_parity(segment: &str) -> (&str, WeekParity) {
    if let Some(base) = segment.strip_suffix("(odd weeks)") {
        (base.trim_end(), WeekParity::Odd)
    } else if let Some(base) = segment.strip_suffix("(even weeks)") {
        (base.trim_end(), WeekParity::Even)
    } else {
        (segment, WeekParity::Every)
    }
}

/// All bookings for a module, or empty when the module is unknown or has no
/// timetable entry yet.
pub fn timeslots_for(code: &str, catalogue: &Catalogue) -> Vec<Timeslot> {
    if let Some(slots) = timetable_override(code) {
        return slots;
    }
    catalogue
        .get(code)
        .and_then(|module| module.timetable.as_deref())
        .map(parse_timetable_field)
        .unwrap_or_default()
}

/// Find all timetable clashes in a student's planned modules.
///
/// Modules are grouped by (honours year, semester); within a group, any
/// teaching week and time occupied by two or more modules is a clash.
/// Modules clashing on overlapping slot sets merge into a single reported
/// combination. Returns (clash findings, adviser notes).
pub fn find_timetable_clashes(
    student: &Student,
    catalogue: &Catalogue,
) -> (Vec<String>, Vec<String>) {
    let mut clashes = Vec::new();
    let mut seen = HashSet::new();

    for honours_year in student.honours_years_in_choices() {
        for semester in [Semester::S1, Semester::S2] {
            let mut slots_by_module: BTreeMap<String, BTreeSet<ClashKey>> = BTreeMap::new();
            for choice in &student.choices {
                if choice.honours_year != honours_year || choice.semester != semester {
                    continue;
                }
                let keys = slots_by_module.entry(choice.module.clone()).or_default();
                for slot in timeslots_for(&choice.module, catalogue) {
                    keys.extend(expand(&slot));
                }
            }

            for message in clash_messages(&slots_by_module, &honours_year, semester) {
                if seen.insert(message.clone()) {
                    clashes.push(message);
                }
            }
        }
    }

    (clashes, Vec::new())
}

/// A booking expanded to one concrete teaching-week stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct ClashKey {
    base: String,
    odd_weeks: bool,
}

/// Every-week bookings occupy both streams.
fn expand(slot: &Timeslot) -> Vec<ClashKey> {
    let key = |odd_weeks| ClashKey {
        base: slot.base.clone(),
        odd_weeks,
    };
    match slot.parity {
        WeekParity::Every => vec![key(true), key(false)],
        WeekParity::Odd => vec![key(true)],
        WeekParity::Even => vec![key(false)],
    }
}

fn clash_messages(
    slots_by_module: &BTreeMap<String, BTreeSet<ClashKey>>,
    honours_year: &str,
    semester: Semester,
) -> Vec<String> {
    // Count how many modules occupy each expanded key.
    let mut occupancy: BTreeMap<&ClashKey, Vec<&str>> = BTreeMap::new();
    for (module, keys) in slots_by_module {
        for key in keys {
            occupancy.entry(key).or_default().push(module.as_str());
        }
    }

    // Merge modules clashing on overlapping keys into unique combinations.
    let mut combinations: BTreeSet<BTreeSet<&str>> = BTreeSet::new();
    for modules in occupancy.values() {
        if modules.len() >= 2 {
            combinations.insert(modules.iter().copied().collect());
        }
    }

    let mut messages = Vec::new();
    for combination in combinations {
        let mut shared: Option<BTreeSet<ClashKey>> = None;
        for module in &combination {
            let keys = &slots_by_module[*module];
            shared = Some(match shared {
                None => keys.clone(),
                Some(current) => current.intersection(keys).cloned().collect(),
            });
        }
        let shared = shared.unwrap_or_default();

        let module_list = join_with_and(combination.iter().copied());
        let slot_list = join_with_and(collapse_keys(&shared).iter().map(String::as_str));
        messages.push(format!(
            "Clash for {} {} between modules {} at {}",
            honours_year, semester, module_list, slot_list
        ));
    }

    messages
}

/// Collapse expanded keys back to display strings: a base present in both
/// week streams displays bare, otherwise with its parity qualifier.
fn collapse_keys(keys: &BTreeSet<ClashKey>) -> Vec<String> {
    let mut displays = BTreeSet::new();
    for key in keys {
        let paired = ClashKey {
            base: key.base.clone(),
            odd_weeks: !key.odd_weeks,
        };
        if keys.contains(&paired) {
            displays.insert(key.base.clone());
        } else if key.odd_weeks {
            displays.insert(format!("{} (odd weeks)", key.base));
        } else {
            displays.insert(format!("{} (even weeks)", key.base));
        }
    }
    displays.into_iter().collect()
}

fn join_with_and<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.collect();
    items.join(" and ")
}
