//! Record normalization for the six cohort datasets.
//!
//! Each normalizer maps header-keyed raw rows onto a typed record through an
//! explicit column mapping. Individual malformed fields degrade to defaults;
//! a batch is never aborted because of one bad row.

mod parse;
mod raw;
mod schema;

pub use parse::{age_on, parse_date, parse_f64, parse_f64_or_zero, parse_u32, parse_u32_or};
pub use raw::{RawRow, RawTable};
pub use schema::{required_columns, validate_columns};

use crate::config::NormalizeOptions;
use crate::records::{
    Applicant, ApplicantStatus, AttendanceRecord, Classification, CourseEnrollment, CourseResult,
    CurrentStudent, DegreeClass,
};
use crate::reference;

/// Which admissions records a normalization pass keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionsView {
    /// Every application, including rejected and not-interested ones.
    #[default]
    AllApplicants,
    /// Only applicants who went on to become students.
    Students,
}

/// Normalizes admissions rows into applicants.
pub fn normalize_admissions(
    rows: &[RawRow],
    view: AdmissionsView,
    options: &NormalizeOptions,
) -> Vec<Applicant> {
    rows.iter()
        .filter(|row| !row.is_empty())
        .map(|row| normalize_applicant(row, options))
        .filter(|applicant| view == AdmissionsView::AllApplicants || applicant.is_student())
        .collect()
}

/// Derives the student view from already-normalized applicants.
pub fn students_from_applicants(applicants: &[Applicant]) -> Vec<Applicant> {
    applicants
        .iter()
        .filter(|applicant| applicant.is_student())
        .cloned()
        .collect()
}

fn normalize_applicant(row: &RawRow, options: &NormalizeOptions) -> Applicant {
    let date_of_birth = parse_date(row.get("Date of Birth"));
    let age = date_of_birth.and_then(|dob| age_on(dob, options.reference_date));
    let referral_source = row
        .get_opt("How did you hear about us?")
        .filter(|source| !reference::is_junk_referral(source))
        .map(str::to_string);

    Applicant {
        student_id: row.get("Student_ID").to_string(),
        first_name: row.get("First Name").to_string(),
        last_name: row.get("Last Name").to_string(),
        gender: row.get_or("Gender", "Unknown").to_string(),
        nationality: row.get("Nationality").to_string(),
        date_of_birth,
        age,
        entry_year: row.get("Academic Year").to_string(),
        entry_semester: row.get("Entry Semester").to_string(),
        status: ApplicantStatus::parse(row.get("Student Status")),
        programme: row.get("Course/Degree").to_string(),
        ielts_score: parse_f64(row.get("IELTS")),
        education_system: row.get("Recent Education System").to_string(),
        entry_level: parse_u32(row.get("Preferred Entry Level"))
            .filter(|level| *level > 0)
            .unwrap_or(1),
        referral_source,
        offer_type: row.get("Offer Type").to_string(),
        disability: row.get("Disability / Health Issues").to_string(),
        sponsored: row.get("Sponsored Students (Yes / No)").eq_ignore_ascii_case("yes"),
    }
}

/// Normalizes per-year enrollment snapshot rows.
pub fn normalize_current_students(rows: &[RawRow]) -> Vec<CurrentStudent> {
    rows.iter()
        .filter(|row| !row.is_empty())
        .map(|row| CurrentStudent {
            student_id: row.get("Student_ID").to_string(),
            academic_year: row.get("Academic_Year").to_string(),
            surname: row.get("Surname").to_string(),
            forename: row.get("Forename").to_string(),
            gender: row.get_or("Gender", "Unknown").to_string(),
            nationality: row.get("Nationality").to_string(),
            prog_yr: parse_u32_or(row.get("Prog_Yr"), 0),
            stud_yr: parse_u32_or(row.get("Stud_Yr"), 0),
            programme: row.get("Programme_Name").to_string(),
        })
        .collect()
}

/// Normalizes course registration rows.
pub fn normalize_enrollments(rows: &[RawRow]) -> Vec<CourseEnrollment> {
    rows.iter()
        .filter(|row| !row.is_empty())
        .map(|row| CourseEnrollment {
            student_id: row.get("Student_ID").to_string(),
            academic_year: row.get("Academic_Year").to_string(),
            course_code: row.get("Course_Code").to_string(),
            credits: parse_u32_or(row.get("Credits"), 0),
            semester: row.get("Semester").to_string(),
        })
        .collect()
}

/// Normalizes course result rows. A grade point of `NP` becomes `0.0`.
pub fn normalize_course_results(rows: &[RawRow]) -> Vec<CourseResult> {
    rows.iter()
        .filter(|row| !row.is_empty())
        .map(|row| CourseResult {
            student_id: row.get("Student_ID").to_string(),
            academic_year: row.get("Academic_Year").to_string(),
            semester: row.get("Semester").to_string(),
            course_code: row.get("Course_Code").to_string(),
            grade_point: parse_f64_or_zero(row.get("Course_Grade_Point")),
            grade: row.get("Overall_Grade").to_uppercase(),
        })
        .collect()
}

/// Normalizes attendance rows.
pub fn normalize_attendance(rows: &[RawRow]) -> Vec<AttendanceRecord> {
    rows.iter()
        .filter(|row| !row.is_empty())
        .map(|row| AttendanceRecord {
            student_id: row.get("Student_ID").to_string(),
            academic_year: row.get("Academic_Year").to_string(),
            semester: row.get("Semester").to_string(),
            course_code: row.get("Course_Code").to_string(),
            total_sessions: parse_u32_or(row.get("Total_Sessions"), 0),
            sessions_attended: parse_u32_or(row.get("Sessions_Attended"), 0),
            percentage: parse_f64_or_zero(row.get("Attendance_Percentage")),
            status: row.get("Attendance_Status").to_string(),
        })
        .collect()
}

/// Normalizes degree classification rows.
pub fn normalize_classifications(rows: &[RawRow]) -> Vec<Classification> {
    rows.iter()
        .filter(|row| !row.is_empty())
        .map(|row| Classification {
            student_id: row.get("Student_ID").to_string(),
            programme: row.get("Programme").to_string(),
            entry_year: row.get("Entry_Year").to_string(),
            entry_level: parse_u32_or(row.get("Entry_Level"), 1),
            total_credits: parse_u32_or(row.get("Total_Credits"), 0),
            year3_gpa: parse_f64(row.get("Year_3_GPA")),
            year4_gpa: parse_f64(row.get("Year_4_GPA")),
            final_gpa: parse_f64_or_zero(row.get("Final_GPA")).clamp(0.0, 22.0),
            classification: DegreeClass::parse(row.get("Degree_Classification")),
            graduation_status: row.get("Graduation_Status").to_string(),
        })
        .collect()
}
