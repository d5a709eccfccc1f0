//! Required-column validation for user-supplied imports.

use super::RawTable;
use crate::error::{EngineError, Result};
use crate::sources::DatasetKind;
use std::collections::HashSet;
use tracing::warn;

/// Columns an imported file must carry for each dataset kind.
pub fn required_columns(kind: DatasetKind) -> &'static [&'static str] {
    match kind {
        DatasetKind::Admissions => &[
            "Student_ID",
            "First Name",
            "Last Name",
            "Gender",
            "Nationality",
            "Date of Birth",
            "Course/Degree",
            "Student Status",
            "Academic Year",
        ],
        DatasetKind::CurrentStudents => &[
            "Student_ID",
            "Academic_Year",
            "Surname",
            "Forename",
            "Gender",
            "Nationality",
            "Programme_Name",
        ],
        DatasetKind::Enrollments => &[
            "Student_ID",
            "Academic_Year",
            "Course_Code",
            "Credits",
            "Semester",
        ],
        DatasetKind::Attendance => &[
            "Student_ID",
            "Academic_Year",
            "Semester",
            "Course_Code",
            "Total_Sessions",
            "Sessions_Attended",
            "Attendance_Percentage",
            "Attendance_Status",
        ],
        DatasetKind::Classifications => &[
            "Student_ID",
            "Programme",
            "Final_GPA",
            "Degree_Classification",
            "Graduation_Status",
        ],
        DatasetKind::CourseResults => &[
            "Student_ID",
            "Academic_Year",
            "Semester",
            "Course_Code",
            "Course_Grade_Point",
            "Overall_Grade",
        ],
    }
}

/// Checks the table header against the required columns.
///
/// The header is the table's declared header, falling back to the columns of
/// the first row. All missing columns are reported in one error.
pub fn validate_columns(kind: DatasetKind, table: &RawTable) -> Result<()> {
    let present: HashSet<&str> = if table.headers.is_empty() {
        table
            .rows
            .first()
            .map(|row| row.columns().collect())
            .unwrap_or_default()
    } else {
        table.headers.iter().map(String::as_str).collect()
    };

    let missing: Vec<String> = required_columns(kind)
        .iter()
        .filter(|column| !present.contains(*column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        warn!(dataset = %kind, missing = ?missing, "Imported dataset is missing required columns");
        Err(EngineError::schema_validation(kind, missing))
    }
}
