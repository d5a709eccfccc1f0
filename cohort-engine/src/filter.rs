//! Referentially consistent filtering across the six datasets.
//!
//! Predicates narrow the student collection only. The surviving identifier
//! set then restricts the other five collections, so no filtered collection
//! can ever contain a student that the student filter removed.

use crate::records::{
    Applicant, AttendanceRecord, Classification, CourseEnrollment, CourseResult, CurrentStudent,
    DegreeClass,
};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Lowest final GPA on the grading scale.
pub const GPA_MIN: f64 = 0.0;
/// Highest final GPA on the grading scale.
pub const GPA_MAX: f64 = 22.0;

/// A conjunction of optional predicates. Absent or blank fields impose no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    /// Case-insensitive substring of identifier, first, last or full name
    pub search: Option<String>,
    /// Student has an enrollment snapshot in this academic year
    pub year: Option<String>,
    pub school: Option<String>,
    pub programme: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub entry_level: Option<u32>,
    /// Student has a classification with exactly this label
    pub classification: Option<DegreeClass>,
    pub gpa_min: Option<f64>,
    pub gpa_max: Option<f64>,
    /// Student has at least one attendance record with this status
    pub attendance_status: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_school(mut self, school: impl Into<String>) -> Self {
        self.school = Some(school.into());
        self
    }

    pub fn with_programme(mut self, programme: impl Into<String>) -> Self {
        self.programme = Some(programme.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = Some(nationality.into());
        self
    }

    pub fn with_entry_level(mut self, level: u32) -> Self {
        self.entry_level = Some(level);
        self
    }

    pub fn with_classification(mut self, class: DegreeClass) -> Self {
        self.classification = Some(class);
        self
    }

    /// Inclusive final-GPA range. Either bound may be omitted.
    pub fn with_gpa_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.gpa_min = min;
        self.gpa_max = max;
        self
    }

    pub fn with_attendance_status(mut self, status: impl Into<String>) -> Self {
        self.attendance_status = Some(status.into());
        self
    }

    /// Whether no predicate is active.
    pub fn is_empty(&self) -> bool {
        active(&self.search).is_none()
            && active(&self.year).is_none()
            && active(&self.school).is_none()
            && active(&self.programme).is_none()
            && active(&self.gender).is_none()
            && active(&self.nationality).is_none()
            && self.entry_level.is_none()
            && self.classification.is_none()
            && !self.has_gpa_range()
            && active(&self.attendance_status).is_none()
    }

    fn has_gpa_range(&self) -> bool {
        self.gpa_min.is_some() || self.gpa_max.is_some()
    }
}

/// The six collections narrowed by a [`FilterSet`].
///
/// A view keeps a reference to the snapshot it was derived from so that
/// calculators needing full-population context (all applicants, the full
/// year list) can reach it without a second argument.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub students: Vec<Arc<Applicant>>,
    pub current_students: Vec<Arc<CurrentStudent>>,
    pub enrollments: Vec<Arc<CourseEnrollment>>,
    pub course_results: Vec<Arc<CourseResult>>,
    pub attendance: Vec<Arc<AttendanceRecord>>,
    pub classifications: Vec<Arc<Classification>>,
    snapshot: Arc<Snapshot>,
    filters: FilterSet,
}

impl FilteredView {
    /// The unfiltered view of a snapshot.
    pub fn unfiltered(snapshot: Arc<Snapshot>) -> Self {
        Self {
            students: snapshot.students.clone(),
            current_students: snapshot.current_students.clone(),
            enrollments: snapshot.enrollments.clone(),
            course_results: snapshot.course_results.clone(),
            attendance: snapshot.attendance.clone(),
            classifications: snapshot.classifications.clone(),
            snapshot,
            filters: FilterSet::default(),
        }
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Whether the student collection is narrower than the snapshot's.
    pub fn is_narrowed(&self) -> bool {
        self.students.len() < self.snapshot.students.len()
    }

    /// Identifiers of the filtered students.
    pub fn student_ids(&self) -> HashSet<&str> {
        self.students.iter().map(|s| s.student_id.as_str()).collect()
    }
}

impl PartialEq for FilteredView {
    fn eq(&self, other: &Self) -> bool {
        self.filters == other.filters
            && self.students == other.students
            && self.current_students == other.current_students
            && self.enrollments == other.enrollments
            && self.course_results == other.course_results
            && self.attendance == other.attendance
            && self.classifications == other.classifications
    }
}

/// Applies `filters` to `snapshot`.
///
/// Predicates are independent conjunctions, so their order does not matter.
/// A predicate matching nobody yields an all-empty view.
#[instrument(skip_all, fields(active = !filters.is_empty()))]
pub fn apply_filters(snapshot: &Arc<Snapshot>, filters: &FilterSet) -> FilteredView {
    if filters.is_empty() {
        return FilteredView::unfiltered(Arc::clone(snapshot));
    }

    let index = snapshot.index();
    let search = active(&filters.search).map(str::to_lowercase);
    let year = active(&filters.year);
    let school = active(&filters.school);
    let programme = active(&filters.programme);
    let gender = active(&filters.gender);
    let nationality = active(&filters.nationality);
    let attendance_ids: Option<HashSet<&str>> = active(&filters.attendance_status).map(|status| {
        snapshot
            .attendance
            .iter()
            .filter(|a| a.status == status)
            .map(|a| a.student_id.as_str())
            .collect()
    });
    let classification_ids: Option<HashSet<&str>> = filters.classification.map(|class| {
        snapshot
            .classifications
            .iter()
            .filter(|c| c.classification == Some(class))
            .map(|c| c.student_id.as_str())
            .collect()
    });
    let gpa_ids: Option<HashSet<&str>> = filters.has_gpa_range().then(|| {
        let min = filters.gpa_min.unwrap_or(GPA_MIN);
        let max = filters.gpa_max.unwrap_or(GPA_MAX);
        snapshot
            .classifications
            .iter()
            .filter(|c| c.final_gpa >= min && c.final_gpa <= max)
            .map(|c| c.student_id.as_str())
            .collect()
    });

    let students: Vec<Arc<Applicant>> = snapshot
        .students
        .iter()
        .filter(|s| search.as_deref().map_or(true, |needle| matches_search(s, needle)))
        .filter(|s| {
            year.map_or(true, |year| {
                index
                    .current_records(&s.student_id)
                    .iter()
                    .any(|r| r.academic_year == year)
            })
        })
        .filter(|s| school.map_or(true, |school| s.school() == school))
        .filter(|s| programme.map_or(true, |programme| s.programme == programme))
        .filter(|s| gender.map_or(true, |gender| s.gender == gender))
        .filter(|s| nationality.map_or(true, |nationality| s.nationality == nationality))
        .filter(|s| filters.entry_level.map_or(true, |level| s.entry_level == level))
        .filter(|s| in_set(&classification_ids, &s.student_id))
        .filter(|s| in_set(&gpa_ids, &s.student_id))
        .filter(|s| in_set(&attendance_ids, &s.student_id))
        .cloned()
        .collect();

    let ids: HashSet<&str> = students.iter().map(|s| s.student_id.as_str()).collect();
    let view = FilteredView {
        current_students: restrict(&snapshot.current_students, &ids, |r| &r.student_id),
        enrollments: restrict(&snapshot.enrollments, &ids, |r| &r.student_id),
        course_results: restrict(&snapshot.course_results, &ids, |r| &r.student_id),
        attendance: restrict(&snapshot.attendance, &ids, |r| &r.student_id),
        classifications: restrict(&snapshot.classifications, &ids, |r| &r.student_id),
        students,
        snapshot: Arc::clone(snapshot),
        filters: filters.clone(),
    };

    debug!(
        students = view.students.len(),
        of = snapshot.students.len(),
        course_results = view.course_results.len(),
        "Filters applied"
    );
    view
}

fn in_set(ids: &Option<HashSet<&str>>, id: &str) -> bool {
    ids.as_ref().map_or(true, |ids| ids.contains(id))
}

fn matches_search(student: &Applicant, needle: &str) -> bool {
    student.student_id.to_lowercase().contains(needle)
        || student.first_name.to_lowercase().contains(needle)
        || student.last_name.to_lowercase().contains(needle)
        || student.full_name().to_lowercase().contains(needle)
}

fn restrict<T>(records: &[Arc<T>], ids: &HashSet<&str>, key: impl Fn(&T) -> &String) -> Vec<Arc<T>> {
    records
        .iter()
        .filter(|r| ids.contains(key(r).as_str()))
        .cloned()
        .collect()
}
