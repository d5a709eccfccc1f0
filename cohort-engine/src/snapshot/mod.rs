//! The immutable in-memory snapshot of all six datasets.
//!
//! A [`Snapshot`] is built once, wrapped in an `Arc`, and never mutated.
//! Re-importing data builds a fresh snapshot and swaps the reference.

use crate::records::{
    Applicant, AttendanceRecord, Classification, CourseEnrollment, CourseResult, CurrentStudent,
    DegreeClass, StudentRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

mod index;
mod loader;

pub use index::StudentIndex;
pub use loader::{build_snapshot, load_snapshot, LoadOptions, LoadProgress, LoadedTables};

/// The complete set of normalized collections with their indexes.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Every admissions application.
    pub applicants: Vec<Arc<Applicant>>,
    /// Applicants that became students.
    pub students: Vec<Arc<Applicant>>,
    pub current_students: Vec<Arc<CurrentStudent>>,
    pub enrollments: Vec<Arc<CourseEnrollment>>,
    pub course_results: Vec<Arc<CourseResult>>,
    pub attendance: Vec<Arc<AttendanceRecord>>,
    pub classifications: Vec<Arc<Classification>>,
    index: StudentIndex,
    academic_years: Vec<String>,
}

impl Snapshot {
    /// Builds a snapshot from normalized records. The student view is derived
    /// from `applicants`.
    pub fn new(
        applicants: Vec<Applicant>,
        current_students: Vec<CurrentStudent>,
        enrollments: Vec<CourseEnrollment>,
        course_results: Vec<CourseResult>,
        attendance: Vec<AttendanceRecord>,
        classifications: Vec<Classification>,
    ) -> Self {
        let applicants: Vec<Arc<Applicant>> = applicants.into_iter().map(Arc::new).collect();
        let students: Vec<Arc<Applicant>> = applicants
            .iter()
            .filter(|a| a.is_student())
            .cloned()
            .collect();
        let current_students: Vec<Arc<CurrentStudent>> =
            current_students.into_iter().map(Arc::new).collect();
        let classifications: Vec<Arc<Classification>> =
            classifications.into_iter().map(Arc::new).collect();

        let index = StudentIndex::build(&students, &applicants, &classifications, &current_students);
        let academic_years = current_students
            .iter()
            .map(|s| s.academic_year.clone())
            .filter(|year| !year.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            applicants,
            students,
            current_students,
            enrollments: enrollments.into_iter().map(Arc::new).collect(),
            course_results: course_results.into_iter().map(Arc::new).collect(),
            attendance: attendance.into_iter().map(Arc::new).collect(),
            classifications,
            index,
            academic_years,
        }
    }

    pub fn index(&self) -> &StudentIndex {
        &self.index
    }

    /// Observed academic years in ascending order.
    pub fn academic_years(&self) -> &[String] {
        &self.academic_years
    }

    /// The year following `year` in the observed year list.
    pub fn next_academic_year(&self, year: &str) -> Option<&str> {
        let position = self.academic_years.iter().position(|y| y == year)?;
        self.academic_years.get(position + 1).map(String::as_str)
    }

    pub fn latest_academic_year(&self) -> Option<&str> {
        self.academic_years.last().map(String::as_str)
    }

    pub fn schools(&self) -> Vec<String> {
        sorted_unique(self.students.iter().map(|s| s.school().to_string()))
    }

    /// Programmes, optionally restricted to one school.
    pub fn programmes(&self, school: Option<&str>) -> Vec<String> {
        sorted_unique(
            self.students
                .iter()
                .filter(|s| school.map_or(true, |school| s.school() == school))
                .map(|s| s.programme.clone()),
        )
    }

    pub fn genders(&self) -> Vec<String> {
        sorted_unique(self.students.iter().map(|s| s.gender.clone()))
    }

    pub fn nationalities(&self) -> Vec<String> {
        sorted_unique(self.students.iter().map(|s| s.nationality.clone()))
    }

    pub fn attendance_statuses(&self) -> Vec<String> {
        sorted_unique(self.attendance.iter().map(|a| a.status.clone()))
    }

    /// Classifications present, in canonical best-first order.
    pub fn degree_classes(&self) -> Vec<DegreeClass> {
        let present: BTreeSet<DegreeClass> = self
            .classifications
            .iter()
            .filter_map(|c| c.classification)
            .collect();
        present.into_iter().collect()
    }

    /// Entry levels in numeric order.
    pub fn entry_levels(&self) -> Vec<u32> {
        self.students
            .iter()
            .map(|s| s.entry_level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct values of `field` within one collection.
    pub fn distinct_values(&self, field: &str, collection: Collection) -> Vec<String> {
        match collection {
            Collection::Applicants => distinct_values(&self.applicants, field),
            Collection::Students => distinct_values(&self.students, field),
            Collection::CurrentStudents => distinct_values(&self.current_students, field),
            Collection::Enrollments => distinct_values(&self.enrollments, field),
            Collection::CourseResults => distinct_values(&self.course_results, field),
            Collection::Attendance => distinct_values(&self.attendance, field),
            Collection::Classifications => distinct_values(&self.classifications, field),
        }
    }
}

/// Names a collection for distinct-value queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Applicants,
    Students,
    CurrentStudents,
    Enrollments,
    CourseResults,
    Attendance,
    Classifications,
}

impl Collection {
    pub fn from_name(name: &str) -> Option<Self> {
        let collection = match name {
            "applicants" | "all_applicants" => Self::Applicants,
            "students" | "admissions" => Self::Students,
            "current_students" => Self::CurrentStudents,
            "enrollments" => Self::Enrollments,
            "course_results" => Self::CourseResults,
            "attendance" => Self::Attendance,
            "classifications" => Self::Classifications,
            _ => return None,
        };
        Some(collection)
    }
}

/// Distinct non-blank values of `field`. Values sort numerically when all of
/// them are numbers, lexically otherwise.
pub fn distinct_values<T: StudentRecord>(records: &[Arc<T>], field: &str) -> Vec<String> {
    let mut values: Vec<String> = records
        .iter()
        .filter_map(|r| r.field_value(field))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let numeric: Option<Vec<f64>> = values.iter().map(|v| v.parse::<f64>().ok()).collect();
    if let Some(numbers) = numeric {
        let mut pairs: Vec<(f64, String)> = numbers.into_iter().zip(values).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        values = pairs.into_iter().map(|(_, v)| v).collect();
    }
    values
}

fn sorted_unique(values: impl Iterator<Item = String>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
