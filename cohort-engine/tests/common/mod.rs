//! Shared fixtures for integration tests.
#![allow(dead_code)]

use cohort_engine::prelude::*;
use cohort_engine::reference;

pub const PROGRAMMES: [&str; 3] = ["Computing Science", "Business Management", "Legal Studies"];
pub const YEARS: [&str; 5] = ["2019/20", "2020/21", "2021/22", "2022/23", "2023/24"];
pub const ATTENDANCE_STATUSES: [&str; 3] = ["Good", "Warning", "Concern"];

pub fn applicant(id: &str, programme: &str, gender: &str, entry_year: &str, status: ApplicantStatus) -> Applicant {
    Applicant {
        student_id: id.to_string(),
        first_name: format!("Given{id}"),
        last_name: format!("Family{id}"),
        gender: gender.to_string(),
        nationality: "British".to_string(),
        entry_year: entry_year.to_string(),
        entry_semester: "Sem1".to_string(),
        status,
        programme: programme.to_string(),
        entry_level: 1,
        ..Default::default()
    }
}

pub fn current(id: &str, academic_year: &str, prog_yr: u32, programme: &str) -> CurrentStudent {
    CurrentStudent {
        student_id: id.to_string(),
        academic_year: academic_year.to_string(),
        prog_yr,
        stud_yr: prog_yr,
        programme: programme.to_string(),
        ..Default::default()
    }
}

pub fn result(id: &str, academic_year: &str, course: &str, grade: &str) -> CourseResult {
    CourseResult {
        student_id: id.to_string(),
        academic_year: academic_year.to_string(),
        semester: "Sem1".to_string(),
        course_code: course.to_string(),
        grade_point: reference::grade_entry(grade).map_or(0.0, |entry| entry.points),
        grade: grade.to_string(),
    }
}

pub fn attendance(id: &str, academic_year: &str, semester: &str, percentage: f64, status: &str) -> AttendanceRecord {
    AttendanceRecord {
        student_id: id.to_string(),
        academic_year: academic_year.to_string(),
        semester: semester.to_string(),
        course_code: "GEN101".to_string(),
        total_sessions: 20,
        sessions_attended: (percentage / 5.0).round() as u32,
        percentage,
        status: status.to_string(),
    }
}

pub fn classification(id: &str, programme: &str, class: DegreeClass, final_gpa: f64) -> Classification {
    Classification {
        student_id: id.to_string(),
        programme: programme.to_string(),
        entry_year: YEARS[0].to_string(),
        entry_level: 1,
        total_credits: 480,
        final_gpa,
        classification: Some(class),
        graduation_status: "Graduated".to_string(),
        ..Default::default()
    }
}

/// A deterministic multi-year cohort over three programmes.
///
/// `size` students are generated. Every seventh student drops out after one
/// year, every thirteenth applicant is rejected, students entering in the
/// first year graduate with a classification.
pub fn sample_snapshot(size: usize) -> Snapshot {
    let mut applicants = Vec::new();
    let mut current_students = Vec::new();
    let mut enrollments = Vec::new();
    let mut course_results = Vec::new();
    let mut attendance_records = Vec::new();
    let mut classifications = Vec::new();

    for i in 0..size {
        let id = format!("S{i:04}");
        let programme = PROGRAMMES[i % PROGRAMMES.len()];
        let gender = if i % 2 == 0 { "Female" } else { "Male" };
        let entry = i % 4;

        let status = if i % 13 == 12 {
            ApplicantStatus::Rejected
        } else if i % 7 == 6 {
            ApplicantStatus::Dropped
        } else if entry == 0 {
            ApplicantStatus::Graduated
        } else {
            ApplicantStatus::Active
        };
        let mut record = applicant(&id, programme, gender, YEARS[entry], status);
        record.nationality = ["British", "Chinese", "Nigerian"][i % 3].to_string();
        record.entry_level = 1 + (i % 2) as u32;
        record.referral_source = Some(["Facebook", "Website", "Agent"][i % 3].to_string());
        record.offer_type = ["Conditional", "Unconditional", ""][i % 3].to_string();
        applicants.push(record);
        if status == ApplicantStatus::Rejected {
            continue;
        }

        let years_studied = if status == ApplicantStatus::Dropped {
            1
        } else {
            (YEARS.len() - entry).min(4)
        };
        for k in 0..years_studied {
            let year = YEARS[entry + k];
            current_students.push(current(&id, year, k as u32 + 1, programme));
            enrollments.push(CourseEnrollment {
                student_id: id.clone(),
                academic_year: year.to_string(),
                course_code: format!("C{k}"),
                credits: 30,
                semester: "Sem1".to_string(),
            });
            let grade = if (i + k) % 5 == 0 { "F1" } else { "B2" };
            course_results.push(result(&id, year, &format!("C{k}"), grade));
            let pct = 60.0 + ((i * 7 + k * 3) % 40) as f64;
            let band = ATTENDANCE_STATUSES[(i + k) % ATTENDANCE_STATUSES.len()];
            attendance_records.push(attendance(&id, year, "Sem1", pct, band));
        }

        if status == ApplicantStatus::Graduated {
            let class = DegreeClass::ALL[i % DegreeClass::ALL.len()];
            classifications.push(classification(&id, programme, class, 10.0 + (i % 12) as f64));
        }
    }

    Snapshot::new(
        applicants,
        current_students,
        enrollments,
        course_results,
        attendance_records,
        classifications,
    )
}
