//! Fixture builders for unit tests.

use crate::records::{
    Applicant, ApplicantStatus, AttendanceRecord, Classification, CourseResult, CurrentStudent,
    DegreeClass,
};
use crate::reference;
use crate::snapshot::Snapshot;

const DEFAULT_ENTRY_YEAR: &str = "2021/22";

/// Builds a [`Snapshot`] record by record.
///
/// Enrollment and classification records take their programme from the
/// applicant with the same identifier when one was added earlier.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    applicants: Vec<Applicant>,
    current_students: Vec<CurrentStudent>,
    course_results: Vec<CourseResult>,
    attendance: Vec<AttendanceRecord>,
    classifications: Vec<Classification>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active student.
    pub fn student(self, id: &str, programme: &str, gender: &str) -> Self {
        self.push_applicant(id, programme, gender, DEFAULT_ENTRY_YEAR, ApplicantStatus::Active)
    }

    /// Adds an active student entering in `entry_year`.
    pub fn student_entering(self, id: &str, programme: &str, entry_year: &str) -> Self {
        self.push_applicant(id, programme, "Female", entry_year, ApplicantStatus::Active)
    }

    /// Adds an applicant with an explicit status.
    pub fn applicant(self, id: &str, programme: &str, status: ApplicantStatus) -> Self {
        self.push_applicant(id, programme, "Male", DEFAULT_ENTRY_YEAR, status)
    }

    pub fn with_status(self, id: &str, status: ApplicantStatus) -> Self {
        self.update(id, |a| a.status = status)
    }

    pub fn with_referral(self, id: &str, source: &str) -> Self {
        self.update(id, |a| a.referral_source = Some(source.to_string()))
    }

    pub fn with_offer(self, id: &str, offer_type: &str) -> Self {
        self.update(id, |a| a.offer_type = offer_type.to_string())
    }

    pub fn with_ielts(self, id: &str, score: f64) -> Self {
        self.update(id, |a| a.ielts_score = Some(score))
    }

    pub fn with_age(self, id: &str, age: u32) -> Self {
        self.update(id, |a| a.age = Some(age))
    }

    pub fn with_nationality(self, id: &str, nationality: &str) -> Self {
        self.update(id, |a| a.nationality = nationality.to_string())
    }

    pub fn with_education_system(self, id: &str, system: &str) -> Self {
        self.update(id, |a| a.education_system = system.to_string())
    }

    pub fn with_entry_level(self, id: &str, level: u32) -> Self {
        self.update(id, |a| a.entry_level = level)
    }

    /// Adds an enrollment snapshot.
    pub fn enrolled(mut self, id: &str, academic_year: &str, prog_yr: u32) -> Self {
        let programme = self.programme_of(id);
        self.current_students.push(CurrentStudent {
            student_id: id.to_string(),
            academic_year: academic_year.to_string(),
            surname: "Last".to_string(),
            forename: format!("First-{id}"),
            prog_yr,
            stud_yr: prog_yr,
            programme,
            ..Default::default()
        });
        self
    }

    /// Adds a course result with the grade point taken from the grading scale.
    pub fn result(mut self, id: &str, academic_year: &str, course: &str, grade: &str) -> Self {
        self.course_results.push(CourseResult {
            student_id: id.to_string(),
            academic_year: academic_year.to_string(),
            semester: "Sem1".to_string(),
            course_code: course.to_string(),
            grade_point: reference::grade_entry(grade).map_or(0.0, |entry| entry.points),
            grade: grade.to_string(),
        });
        self
    }

    /// Adds an attendance record at 80 percent.
    pub fn attendance(self, id: &str, academic_year: &str, semester: &str, status: &str) -> Self {
        self.attendance_pct(id, academic_year, semester, status, 80.0)
    }

    pub fn attendance_pct(
        mut self,
        id: &str,
        academic_year: &str,
        semester: &str,
        status: &str,
        percentage: f64,
    ) -> Self {
        self.attendance.push(AttendanceRecord {
            student_id: id.to_string(),
            academic_year: academic_year.to_string(),
            semester: semester.to_string(),
            course_code: "CS101".to_string(),
            total_sessions: 20,
            sessions_attended: (percentage / 5.0).round() as u32,
            percentage,
            status: status.to_string(),
        });
        self
    }

    /// Adds a graduated classification.
    pub fn classification(self, id: &str, class: DegreeClass, final_gpa: f64) -> Self {
        self.push_classification(id, Some(class), final_gpa)
    }

    /// Adds a graduated classification whose label was not recognized.
    pub fn unrecognized_classification(self, id: &str, final_gpa: f64) -> Self {
        self.push_classification(id, None, final_gpa)
    }

    pub fn build(self) -> Snapshot {
        Snapshot::new(
            self.applicants,
            self.current_students,
            Vec::new(),
            self.course_results,
            self.attendance,
            self.classifications,
        )
    }

    fn push_applicant(
        mut self,
        id: &str,
        programme: &str,
        gender: &str,
        entry_year: &str,
        status: ApplicantStatus,
    ) -> Self {
        self.applicants.push(Applicant {
            student_id: id.to_string(),
            first_name: format!("First-{id}"),
            last_name: "Last".to_string(),
            gender: gender.to_string(),
            nationality: "British".to_string(),
            entry_year: entry_year.to_string(),
            entry_semester: "Sem1".to_string(),
            status,
            programme: programme.to_string(),
            entry_level: 1,
            ..Default::default()
        });
        self
    }

    fn push_classification(mut self, id: &str, class: Option<DegreeClass>, final_gpa: f64) -> Self {
        let programme = self.programme_of(id);
        self.classifications.push(Classification {
            student_id: id.to_string(),
            programme,
            entry_year: DEFAULT_ENTRY_YEAR.to_string(),
            entry_level: 1,
            total_credits: 480,
            final_gpa,
            classification: class,
            graduation_status: "Graduated".to_string(),
            ..Default::default()
        });
        self
    }

    fn update(mut self, id: &str, apply: impl FnOnce(&mut Applicant)) -> Self {
        match self.applicants.iter_mut().rev().find(|a| a.student_id == id) {
            Some(applicant) => apply(applicant),
            None => panic!("no applicant {id} in fixture"),
        }
        self
    }

    fn programme_of(&self, id: &str) -> String {
        self.applicants
            .iter()
            .rev()
            .find(|a| a.student_id == id)
            .map(|a| a.programme.clone())
            .unwrap_or_default()
    }
}
