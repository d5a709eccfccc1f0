//! Typed records for the six cohort datasets.
//!
//! Every record is keyed by a student identifier. Derived attributes that are a
//! pure function of another field (school from programme, pass/fail from grade,
//! proficiency from IELTS score) are exposed as methods rather than stored.

use crate::reference;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static START_YEAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(\d{4})").expect("Hard-coded regex pattern should be valid")
});

/// Extracts the starting calendar year from an academic-year label such as
/// `2021/22`, `2021-22` or `2021`.
pub fn academic_start_year(label: &str) -> Option<i32> {
    START_YEAR_REGEX
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Common access shared by all record types.
pub trait StudentRecord {
    /// The identifier used to join this record to the other datasets.
    fn student_id(&self) -> &str;

    /// Returns a named field rendered as text, for distinct-value queries.
    ///
    /// Unknown field names return `None`.
    fn field_value(&self, field: &str) -> Option<String>;
}

/// Admission status of an applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ApplicantStatus {
    #[default]
    Active,
    Graduated,
    Dropped,
    Suspended,
    Rejected,
    NotInterested,
}

impl ApplicantStatus {
    /// Parses a free-text status. Unrecognized text is treated as active.
    pub fn parse(raw: &str) -> Self {
        if raw.contains("Rejected") {
            Self::Rejected
        } else if raw.contains("Not Interested") {
            Self::NotInterested
        } else if raw.contains("Graduated") {
            Self::Graduated
        } else if raw.contains("Dropped") {
            Self::Dropped
        } else if raw.contains("Suspended") {
            Self::Suspended
        } else {
            Self::Active
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Graduated => "Graduated",
            Self::Dropped => "Dropped",
            Self::Suspended => "Suspended",
            Self::Rejected => "Rejected",
            Self::NotInterested => "Not Interested",
        }
    }

    /// Rejected and not-interested applicants never become students.
    pub fn is_excluded_from_students(&self) -> bool {
        matches!(self, Self::Rejected | Self::NotInterested)
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final degree classification, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DegreeClass {
    FirstClass,
    BorderlineUpperFirst,
    UpperSecond,
    BorderlineLowerUpper,
    LowerSecond,
    BorderlineThirdLower,
    Third,
    BorderlineFailThird,
    Fail,
}

impl DegreeClass {
    /// All classifications in display order.
    pub const ALL: [DegreeClass; 9] = [
        Self::FirstClass,
        Self::BorderlineUpperFirst,
        Self::UpperSecond,
        Self::BorderlineLowerUpper,
        Self::LowerSecond,
        Self::BorderlineThirdLower,
        Self::Third,
        Self::BorderlineFailThird,
        Self::Fail,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstClass => "First Class Honours",
            Self::BorderlineUpperFirst => "Borderline 2.1/1st",
            Self::UpperSecond => "Upper Second Class Honours",
            Self::BorderlineLowerUpper => "Borderline 2.2/2.1",
            Self::LowerSecond => "Lower Second Class Honours",
            Self::BorderlineThirdLower => "Borderline 3rd/2.2",
            Self::Third => "Third Class Honours",
            Self::BorderlineFailThird => "Borderline Fail/3rd",
            Self::Fail => "Fail",
        }
    }

    /// Short axis label.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::FirstClass => "1st",
            Self::BorderlineUpperFirst => "BL 2:1/1st",
            Self::UpperSecond => "2:1",
            Self::BorderlineLowerUpper => "BL 2:2/2:1",
            Self::LowerSecond => "2:2",
            Self::BorderlineThirdLower => "BL 3rd/2:2",
            Self::Third => "3rd",
            Self::BorderlineFailThird => "BL Fail/3rd",
            Self::Fail => "Fail",
        }
    }

    /// Parses an exact classification label.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.label() == raw)
    }

    pub fn coarse_band(&self) -> CoarseBand {
        reference::coarse_band(*self)
    }
}

impl fmt::Display for DegreeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five aggregated degree outcome bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoarseBand {
    First,
    UpperSecond,
    LowerSecond,
    Third,
    Fail,
}

impl CoarseBand {
    pub const ALL: [CoarseBand; 5] = [
        Self::First,
        Self::UpperSecond,
        Self::LowerSecond,
        Self::Third,
        Self::Fail,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "First",
            Self::UpperSecond => "Upper Second",
            Self::LowerSecond => "Lower Second",
            Self::Third => "Third",
            Self::Fail => "Fail",
        }
    }
}

impl fmt::Display for CoarseBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One admissions application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub nationality: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Whole years at the normalizer's reference date.
    pub age: Option<u32>,
    /// Academic year of entry, e.g. `2021/22`.
    pub entry_year: String,
    pub entry_semester: String,
    pub status: ApplicantStatus,
    pub programme: String,
    pub ielts_score: Option<f64>,
    pub education_system: String,
    pub entry_level: u32,
    /// Referral answer with junk values already removed.
    pub referral_source: Option<String>,
    pub offer_type: String,
    pub disability: String,
    pub sponsored: bool,
}

impl Applicant {
    pub fn school(&self) -> &'static str {
        reference::programme_school(&self.programme)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn english_proficiency(&self) -> &'static str {
        reference::proficiency_band(self.ielts_score)
    }

    pub fn is_disabled(&self) -> bool {
        !self.disability.is_empty() && self.disability != reference::NO_KNOWN_DISABILITY
    }

    /// Whether this applicant belongs to the student view.
    pub fn is_student(&self) -> bool {
        !self.status.is_excluded_from_students()
    }

    pub fn entry_start_year(&self) -> Option<i32> {
        academic_start_year(&self.entry_year)
    }
}

impl StudentRecord for Applicant {
    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "student_id" => self.student_id.clone(),
            "first_name" => self.first_name.clone(),
            "last_name" => self.last_name.clone(),
            "gender" => self.gender.clone(),
            "nationality" => self.nationality.clone(),
            "age" => return self.age.map(|age| age.to_string()),
            "entry_year" => self.entry_year.clone(),
            "entry_semester" => self.entry_semester.clone(),
            "status" => self.status.label().to_string(),
            "school" => self.school().to_string(),
            "programme" => self.programme.clone(),
            "english_proficiency" => self.english_proficiency().to_string(),
            "education_system" => self.education_system.clone(),
            "entry_level" => self.entry_level.to_string(),
            "referral_source" => return self.referral_source.clone(),
            "offer_type" => self.offer_type.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// One (student, academic year) enrollment snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentStudent {
    pub student_id: String,
    pub academic_year: String,
    pub surname: String,
    pub forename: String,
    pub gender: String,
    pub nationality: String,
    /// Year of study within the programme.
    pub prog_yr: u32,
    /// Years spent at the institution.
    pub stud_yr: u32,
    pub programme: String,
}

impl CurrentStudent {
    pub fn school(&self) -> &'static str {
        reference::programme_school(&self.programme)
    }
}

impl StudentRecord for CurrentStudent {
    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "student_id" => self.student_id.clone(),
            "academic_year" => self.academic_year.clone(),
            "surname" => self.surname.clone(),
            "forename" => self.forename.clone(),
            "gender" => self.gender.clone(),
            "nationality" => self.nationality.clone(),
            "prog_yr" => self.prog_yr.to_string(),
            "stud_yr" => self.stud_yr.to_string(),
            "programme" => self.programme.clone(),
            "school" => self.school().to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// One (student, course, semester) registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseEnrollment {
    pub student_id: String,
    pub academic_year: String,
    pub course_code: String,
    pub credits: u32,
    pub semester: String,
}

impl StudentRecord for CourseEnrollment {
    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "student_id" => self.student_id.clone(),
            "academic_year" => self.academic_year.clone(),
            "course_code" => self.course_code.clone(),
            "credits" => self.credits.to_string(),
            "semester" => self.semester.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// One (student, course, semester) grade outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseResult {
    pub student_id: String,
    pub academic_year: String,
    pub semester: String,
    pub course_code: String,
    pub grade_point: f64,
    /// Letter grade on the common grading scale.
    pub grade: String,
}

impl CourseResult {
    pub fn passed(&self) -> bool {
        reference::is_pass(&self.grade)
    }
}

impl StudentRecord for CourseResult {
    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "student_id" => self.student_id.clone(),
            "academic_year" => self.academic_year.clone(),
            "semester" => self.semester.clone(),
            "course_code" => self.course_code.clone(),
            "grade_point" => self.grade_point.to_string(),
            "grade" | "overall_grade" => self.grade.clone(),
            "passed" => self.passed().to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// One (student, course, semester) attendance tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub academic_year: String,
    pub semester: String,
    pub course_code: String,
    pub total_sessions: u32,
    pub sessions_attended: u32,
    pub percentage: f64,
    /// Status band such as `Good`, `Warning` or `Concern`.
    pub status: String,
}

impl AttendanceRecord {
    /// Orders records by (academic year, semester).
    pub fn is_later_than(&self, other: &AttendanceRecord) -> bool {
        (self.academic_year.as_str(), self.semester.as_str())
            > (other.academic_year.as_str(), other.semester.as_str())
    }
}

impl StudentRecord for AttendanceRecord {
    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "student_id" => self.student_id.clone(),
            "academic_year" => self.academic_year.clone(),
            "semester" => self.semester.clone(),
            "course_code" => self.course_code.clone(),
            "total_sessions" => self.total_sessions.to_string(),
            "sessions_attended" => self.sessions_attended.to_string(),
            "percentage" | "attendance_percentage" => self.percentage.to_string(),
            "status" | "attendance_status" => self.status.clone(),
            _ => return None,
        };
        Some(value)
    }
}

/// One graduate's final outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub student_id: String,
    pub programme: String,
    pub entry_year: String,
    pub entry_level: u32,
    pub total_credits: u32,
    pub year3_gpa: Option<f64>,
    pub year4_gpa: Option<f64>,
    /// Final GPA on the 0-22 scale.
    pub final_gpa: f64,
    /// `None` when the source label is not a recognized classification.
    pub classification: Option<DegreeClass>,
    pub graduation_status: String,
}

impl Classification {
    pub fn school(&self) -> &'static str {
        reference::programme_school(&self.programme)
    }

    pub fn coarse_band(&self) -> Option<CoarseBand> {
        self.classification.map(|class| class.coarse_band())
    }

    pub fn is_graduated(&self) -> bool {
        self.graduation_status == "Graduated"
    }
}

impl StudentRecord for Classification {
    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "student_id" => self.student_id.clone(),
            "programme" => self.programme.clone(),
            "school" => self.school().to_string(),
            "entry_year" => self.entry_year.clone(),
            "entry_level" => self.entry_level.to_string(),
            "total_credits" => self.total_credits.to_string(),
            "final_gpa" => self.final_gpa.to_string(),
            "classification" => return self.classification.map(|c| c.label().to_string()),
            "graduation_status" => self.graduation_status.clone(),
            _ => return None,
        };
        Some(value)
    }
}
