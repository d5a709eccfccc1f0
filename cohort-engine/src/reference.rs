//! Fixed institutional lookup tables.
//!
//! School, pass/fail and proficiency are always derived from these tables at
//! read time so they can never drift away from the fields they depend on.

use crate::records::{CoarseBand, DegreeClass};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// School reported for a programme missing from [`programme_school`].
pub const UNMAPPED_SCHOOL: &str = "Other";

/// School reported when the programme field itself is blank.
pub const UNKNOWN_SCHOOL: &str = "Unknown";

/// Proficiency label for missing or out-of-range IELTS scores.
pub const PROFICIENCY_NOT_SPECIFIED: &str = "Not Specified";

/// Disability value meaning "no disability declared".
pub const NO_KNOWN_DISABILITY: &str = "00 No known disability";

/// One row of the Common Grading Scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeEntry {
    pub grade: &'static str,
    /// Lower bound of the grade-point range on the 0-22 scale.
    pub points: f64,
    pub pass: bool,
}

/// The grading scale, best grade first. `NP` (no paper) is a fail.
pub const GRADE_SCALE: &[GradeEntry] = &[
    GradeEntry { grade: "A1", points: 22.0, pass: true },
    GradeEntry { grade: "A2", points: 21.0, pass: true },
    GradeEntry { grade: "A3", points: 20.0, pass: true },
    GradeEntry { grade: "A4", points: 19.0, pass: true },
    GradeEntry { grade: "A5", points: 18.0, pass: true },
    GradeEntry { grade: "B1", points: 17.0, pass: true },
    GradeEntry { grade: "B2", points: 16.0, pass: true },
    GradeEntry { grade: "B3", points: 15.0, pass: true },
    GradeEntry { grade: "C1", points: 14.0, pass: true },
    GradeEntry { grade: "C2", points: 13.0, pass: true },
    GradeEntry { grade: "C3", points: 12.0, pass: true },
    GradeEntry { grade: "D1", points: 11.0, pass: true },
    GradeEntry { grade: "D2", points: 10.0, pass: true },
    GradeEntry { grade: "D3", points: 9.0, pass: true },
    GradeEntry { grade: "E1", points: 8.0, pass: false },
    GradeEntry { grade: "E2", points: 7.0, pass: false },
    GradeEntry { grade: "E3", points: 6.0, pass: false },
    GradeEntry { grade: "F1", points: 5.0, pass: false },
    GradeEntry { grade: "F2", points: 4.0, pass: false },
    GradeEntry { grade: "F3", points: 3.0, pass: false },
    GradeEntry { grade: "G1", points: 2.0, pass: false },
    GradeEntry { grade: "G2", points: 1.0, pass: false },
    GradeEntry { grade: "G3", points: 0.0, pass: false },
    GradeEntry { grade: "NP", points: 0.0, pass: false },
];

static GRADE_INDEX: Lazy<HashMap<&'static str, &'static GradeEntry>> =
    Lazy::new(|| GRADE_SCALE.iter().map(|entry| (entry.grade, entry)).collect());

/// Looks up a letter grade on the grading scale.
pub fn grade_entry(grade: &str) -> Option<&'static GradeEntry> {
    GRADE_INDEX.get(grade).copied()
}

/// Whether a letter grade is a pass. Unknown grades are fails.
pub fn is_pass(grade: &str) -> bool {
    grade_entry(grade).is_some_and(|entry| entry.pass)
}

/// Performance bands used to bucket letter grades, best first.
pub const GRADE_BANDS: &[(&str, &[&str])] = &[
    ("A (Excellent)", &["A1", "A2", "A3", "A4", "A5"]),
    ("B (Very Good)", &["B1", "B2", "B3"]),
    ("C (Good)", &["C1", "C2", "C3"]),
    ("D (Pass)", &["D1", "D2", "D3"]),
    ("E-F (Marginal Fail)", &["E1", "E2", "E3", "F1", "F2", "F3"]),
    ("G (Clear Fail)", &["G1", "G2", "G3"]),
];

/// Returns the performance band label for a letter grade.
pub fn grade_band(grade: &str) -> Option<&'static str> {
    GRADE_BANDS
        .iter()
        .find(|(_, grades)| grades.contains(&grade))
        .map(|(band, _)| *band)
}

/// Programme to school mapping.
pub const PROGRAMME_SCHOOLS: &[(&str, &str)] = &[
    ("Accountancy & Finance", "Business"),
    ("Business Management", "Business"),
    (
        "Business Management and Information Systems",
        "Natural & Computing Sciences",
    ),
    (
        "Business Management and International Relations",
        "Social Science",
    ),
    ("Computing Science", "Natural & Computing Sciences"),
    ("Legal Studies", "Legal Studies"),
    ("Politics and International Relations", "Social Science"),
];

static SCHOOL_INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| PROGRAMME_SCHOOLS.iter().copied().collect());

/// Returns the school a programme belongs to.
pub fn programme_school(programme: &str) -> &'static str {
    if programme.is_empty() {
        return UNKNOWN_SCHOOL;
    }
    SCHOOL_INDEX
        .get(programme)
        .copied()
        .unwrap_or(UNMAPPED_SCHOOL)
}

/// Short programme labels for hierarchy nodes.
pub const PROGRAMME_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Accountancy & Finance", "AF"),
    ("Business Management", "BM"),
    ("Business Management and Information Systems", "BM-IS"),
    ("Business Management and International Relations", "BM-IR"),
    ("Computing Science", "CS"),
    ("Legal Studies", "LS"),
    ("Politics and International Relations", "PIR"),
];

/// Abbreviated programme name, or the name itself when none is defined.
pub fn abbreviate_programme(programme: &str) -> &str {
    PROGRAMME_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == programme)
        .map(|(_, abbrev)| *abbrev)
        .unwrap_or(programme)
}

/// IELTS proficiency bands ordered by descending lower bound.
pub const IELTS_BANDS: &[(&str, f64)] = &[
    ("Advanced", 7.5),
    ("Proficient", 6.5),
    ("Intermediate", 5.5),
    ("Beginner", 0.0),
];

/// Display order of proficiency labels.
pub const PROFICIENCY_ORDER: &[&str] = &["Advanced", "Proficient", "Intermediate", "Basic", "Beginner"];

/// Maps an IELTS score onto a proficiency label.
pub fn proficiency_band(score: Option<f64>) -> &'static str {
    match score {
        Some(score) if (0.0..=9.0).contains(&score) => IELTS_BANDS
            .iter()
            .find(|(_, min)| score >= *min)
            .map(|(label, _)| *label)
            .unwrap_or(PROFICIENCY_NOT_SPECIFIED),
        _ => PROFICIENCY_NOT_SPECIFIED,
    }
}

/// Free-text referral answers that carry no information.
pub const REFERRAL_JUNK_VALUES: &[&str] = &["6.5", "7", "6", "Chemistry"];

/// Collapses near-duplicate referral answers into broader categories.
pub const REFERRAL_MERGE: &[(&str, &str)] = &[
    ("Facebook", "Social Media"),
    ("Instagram", "Social Media"),
    ("LinkedIn", "Social Media"),
    ("Social Media", "Social Media"),
    ("Website", "Website & Search"),
    ("Search Engine: Google", "Website & Search"),
    ("University Fair", "Outreach Events"),
    ("Outreach Activity: Open Day", "Outreach Events"),
    ("School Visit", "Outreach Events"),
];

/// Whether a referral answer is a stray non-answer.
pub fn is_junk_referral(source: &str) -> bool {
    REFERRAL_JUNK_VALUES.contains(&source)
}

/// Returns the merged referral category for a raw answer.
pub fn merge_referral(source: &str) -> &str {
    REFERRAL_MERGE
        .iter()
        .find(|(raw, _)| *raw == source)
        .map(|(_, merged)| *merged)
        .unwrap_or(source)
}

/// Coarse band for each fine-grained degree classification.
pub fn coarse_band(class: DegreeClass) -> CoarseBand {
    match class {
        DegreeClass::FirstClass | DegreeClass::BorderlineUpperFirst => CoarseBand::First,
        DegreeClass::UpperSecond | DegreeClass::BorderlineLowerUpper => CoarseBand::UpperSecond,
        DegreeClass::LowerSecond | DegreeClass::BorderlineThirdLower => CoarseBand::LowerSecond,
        DegreeClass::Third | DegreeClass::BorderlineFailThird => CoarseBand::Third,
        DegreeClass::Fail => CoarseBand::Fail,
    }
}
