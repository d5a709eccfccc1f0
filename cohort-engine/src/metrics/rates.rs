//! Scalar rates and averages.

use super::{mean1, percentage, Metrics};
use crate::log_metric;
use crate::records::{academic_start_year, ApplicantStatus};
use std::collections::HashSet;

/// Years of history needed before completion can be measured.
pub(crate) const COMPLETION_HORIZON_YEARS: i32 = 4;

impl<'a> Metrics<'a> {
    /// Mean final GPA over classifications with a positive GPA.
    pub fn average_final_gpa(&self) -> f64 {
        mean1(
            self.view
                .classifications
                .iter()
                .map(|c| c.final_gpa)
                .filter(|gpa| *gpa > 0.0),
        )
    }

    /// Mean attendance percentage over all attendance records.
    pub fn average_attendance(&self) -> f64 {
        mean1(self.view.attendance.iter().map(|a| a.percentage))
    }

    /// Share of course results that are passes.
    pub fn pass_rate(&self) -> f64 {
        let results = &self.view.course_results;
        let passed = results.iter().filter(|r| r.passed()).count();
        let rate = percentage(passed, results.len());
        log_metric!(self.log, passed, total = results.len(), rate, "Pass rate computed");
        rate
    }

    /// Share of students at programme year `from_prog_yr` in `academic_year`
    /// who appear at a higher programme year in the following observed year.
    ///
    /// Returns `0.0` when `academic_year` is the last observed year, is not
    /// observed at all, or has no students at that programme year.
    pub fn retention_rate(&self, academic_year: &str, from_prog_yr: u32) -> f64 {
        let Some(next_year) = self.snapshot().next_academic_year(academic_year) else {
            return 0.0;
        };
        let current = &self.view.current_students;

        let source: HashSet<&str> = current
            .iter()
            .filter(|cs| cs.academic_year == academic_year && cs.prog_yr == from_prog_yr)
            .map(|cs| cs.student_id.as_str())
            .collect();
        if source.is_empty() {
            return 0.0;
        }

        let retained: HashSet<&str> = current
            .iter()
            .filter(|cs| {
                cs.academic_year == next_year
                    && cs.prog_yr > from_prog_yr
                    && source.contains(cs.student_id.as_str())
            })
            .map(|cs| cs.student_id.as_str())
            .collect();
        percentage(retained.len(), source.len())
    }

    /// Retention from programme year 1 for every observed year that has a
    /// successor.
    pub fn retention_by_year(&self) -> Vec<(String, f64)> {
        let years = self.snapshot().academic_years();
        years
            .iter()
            .take(years.len().saturating_sub(1))
            .map(|year| (year.clone(), self.retention_rate(year, 1)))
            .collect()
    }

    /// Share of students entering in `entry_year` who dropped out.
    pub fn attrition_rate(&self, entry_year: &str) -> f64 {
        let cohort: Vec<_> = self
            .view
            .students
            .iter()
            .filter(|s| s.entry_year == entry_year)
            .collect();
        let dropped = cohort
            .iter()
            .filter(|s| s.status == ApplicantStatus::Dropped)
            .count();
        percentage(dropped, cohort.len())
    }

    /// Share of eligible students holding a classification.
    ///
    /// A student is eligible when they entered at least four years before the
    /// latest observed academic year. Fewer than four observed years means
    /// there is not enough history and the rate is `0.0`.
    pub fn completion_rate(&self) -> f64 {
        let Some(latest) = self.completion_reference_year() else {
            return 0.0;
        };
        let eligible: HashSet<&str> = self
            .view
            .students
            .iter()
            .filter(|s| is_completion_eligible(s.entry_start_year(), latest))
            .map(|s| s.student_id.as_str())
            .collect();
        let completed: HashSet<&str> = self
            .view
            .classifications
            .iter()
            .map(|c| c.student_id.as_str())
            .filter(|id| eligible.contains(id))
            .collect();
        let rate = percentage(completed.len(), eligible.len());
        log_metric!(
            self.log,
            eligible = eligible.len(),
            completed = completed.len(),
            rate,
            "Completion rate computed"
        );
        rate
    }

    /// Start year of the latest academic year, when enough history exists.
    pub(crate) fn completion_reference_year(&self) -> Option<i32> {
        let years = self.snapshot().academic_years();
        if years.len() < COMPLETION_HORIZON_YEARS as usize {
            return None;
        }
        years.last().and_then(|year| academic_start_year(year))
    }
}

pub(crate) fn is_completion_eligible(entry_start: Option<i32>, latest_start: i32) -> bool {
    entry_start.is_some_and(|start| latest_start - start >= COMPLETION_HORIZON_YEARS)
}
