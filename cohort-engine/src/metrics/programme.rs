//! Per-programme and per-cohort comparisons.

use super::rates::{is_completion_eligible, COMPLETION_HORIZON_YEARS};
use super::{mean1, percentage, Metrics};
use crate::records::{academic_start_year, Applicant, ApplicantStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Side-by-side indicators for one programme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeComparison {
    pub programme: String,
    pub avg_gpa: f64,
    pub pass_rate: f64,
    pub completion_rate: f64,
    pub avg_attendance: f64,
}

/// Which programme-year transitions a retention figure aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Years 1→2, 2→3 and 3→4 pooled
    #[default]
    All,
    /// Only students leaving the given programme year
    From(u32),
}

impl Transition {
    pub fn from_years(&self) -> Vec<u32> {
        match self {
            Self::All => vec![1, 2, 3],
            Self::From(year) => vec![*year],
        }
    }
}

/// Pass/fail tallies for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePassRate {
    pub course: String,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
    pub pass_rate: f64,
}

/// Where a programme's students ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Classified students that did not drop out
    pub retained: usize,
    pub dropped: usize,
    pub active: usize,
    pub total: usize,
}

/// Graduation of one entry cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortCompletion {
    pub entry_year: String,
    pub total: usize,
    pub graduated: usize,
    pub rate: f64,
}

#[derive(Debug, Default)]
struct ProgrammeTally {
    gpa: Vec<f64>,
    passed: usize,
    results: usize,
    eligible: usize,
    completed: HashSet<String>,
    attendance: Vec<f64>,
}

impl<'a> Metrics<'a> {
    /// Average GPA, pass rate, completion rate and attendance per programme.
    ///
    /// A programme appears when it has a classification, a course result or
    /// an eligible student. Attendance alone does not add a programme.
    pub fn programme_comparison(&self) -> Vec<ProgrammeComparison> {
        let index = self.snapshot().index();
        let mut tallies: BTreeMap<String, ProgrammeTally> = BTreeMap::new();

        for c in &self.view.classifications {
            tallies.entry(c.programme.clone()).or_default().gpa.push(c.final_gpa);
        }

        for result in &self.view.course_results {
            let Some(student) = index.student(&result.student_id) else {
                continue;
            };
            let tally = tallies.entry(student.programme.clone()).or_default();
            tally.results += 1;
            if result.passed() {
                tally.passed += 1;
            }
        }

        if let Some(latest) = self.completion_reference_year() {
            let mut eligible: HashSet<&str> = HashSet::new();
            for student in &self.view.students {
                if is_completion_eligible(student.entry_start_year(), latest) {
                    tallies.entry(student.programme.clone()).or_default().eligible += 1;
                    eligible.insert(student.student_id.as_str());
                }
            }
            for c in &self.view.classifications {
                if !eligible.contains(c.student_id.as_str()) {
                    continue;
                }
                if let Some(tally) = tallies.get_mut(&c.programme) {
                    tally.completed.insert(c.student_id.clone());
                }
            }
        }

        for record in &self.view.attendance {
            let Some(student) = index.student(&record.student_id) else {
                continue;
            };
            if let Some(tally) = tallies.get_mut(&student.programme) {
                tally.attendance.push(record.percentage);
            }
        }

        tallies
            .into_iter()
            .map(|(programme, tally)| ProgrammeComparison {
                programme,
                avg_gpa: mean1(tally.gpa.into_iter()),
                pass_rate: percentage(tally.passed, tally.results),
                completion_rate: percentage(tally.completed.len(), tally.eligible),
                avg_attendance: mean1(tally.attendance.into_iter()),
            })
            .collect()
    }

    /// Retention per programme pooled over every pair of consecutive observed
    /// years.
    ///
    /// Every programme in the snapshot is listed; programmes with no source
    /// students report `0.0`.
    pub fn retention_by_programme(&self, transition: Transition) -> BTreeMap<String, f64> {
        let programmes = self.snapshot().programmes(None);
        let known: HashSet<&str> = programmes.iter().map(String::as_str).collect();
        let programme_of: HashMap<&str, &str> = self
            .view
            .students
            .iter()
            .map(|s| (s.student_id.as_str(), s.programme.as_str()))
            .collect();

        let mut totals: HashMap<&str, (usize, usize)> = HashMap::new();
        let years = self.snapshot().academic_years();
        for pair in years.windows(2) {
            let (year, next_year) = (pair[0].as_str(), pair[1].as_str());
            for from in transition.from_years() {
                let mut source: HashMap<&str, HashSet<&str>> = HashMap::new();
                for cs in &self.view.current_students {
                    if cs.academic_year != year || cs.prog_yr != from {
                        continue;
                    }
                    let Some(programme) = programme_of.get(cs.student_id.as_str()) else {
                        continue;
                    };
                    if known.contains(programme) {
                        source.entry(*programme).or_default().insert(cs.student_id.as_str());
                    }
                }

                let mut retained: HashMap<&str, HashSet<&str>> = HashMap::new();
                for cs in &self.view.current_students {
                    if cs.academic_year != next_year || cs.prog_yr <= from {
                        continue;
                    }
                    let Some(programme) = programme_of.get(cs.student_id.as_str()) else {
                        continue;
                    };
                    if source
                        .get(programme)
                        .is_some_and(|ids| ids.contains(cs.student_id.as_str()))
                    {
                        retained.entry(*programme).or_default().insert(cs.student_id.as_str());
                    }
                }

                for (programme, ids) in &source {
                    let entry = totals.entry(*programme).or_default();
                    entry.0 += ids.len();
                    entry.1 += retained.get(programme).map_or(0, HashSet::len);
                }
            }
        }

        programmes
            .iter()
            .map(|programme| {
                let (source, retained) = totals.get(programme.as_str()).copied().unwrap_or_default();
                (programme.clone(), percentage(retained, source))
            })
            .collect()
    }

    /// Pass rate per course, weakest course first.
    pub fn pass_rate_by_course(&self) -> Vec<CoursePassRate> {
        let mut rows: Vec<CoursePassRate> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for result in &self.view.course_results {
            let position = *positions.entry(result.course_code.as_str()).or_insert_with(|| {
                rows.push(CoursePassRate {
                    course: result.course_code.clone(),
                    passed: 0,
                    failed: 0,
                    total: 0,
                    pass_rate: 0.0,
                });
                rows.len() - 1
            });
            let row = &mut rows[position];
            row.total += 1;
            if result.passed() {
                row.passed += 1;
            } else {
                row.failed += 1;
            }
        }
        for row in &mut rows {
            row.pass_rate = percentage(row.passed, row.total);
        }
        rows.sort_by(|a, b| a.pass_rate.total_cmp(&b.pass_rate));
        rows
    }

    /// Share of each programme's students who dropped out.
    pub fn attrition_by_programme(&self) -> BTreeMap<String, f64> {
        let programmes = self.snapshot().programmes(None);
        self.attrition_by(programmes, |s| s.programme.as_str())
    }

    /// Share of each school's students who dropped out.
    pub fn attrition_by_school(&self) -> BTreeMap<String, f64> {
        let schools = self.snapshot().schools();
        self.attrition_by(schools, |s| s.school())
    }

    /// Retained, dropped and still-active students per programme.
    ///
    /// A dropped student counts as dropped even when classified.
    pub fn retention_attrition_counts(&self) -> BTreeMap<String, OutcomeCounts> {
        let classified: HashSet<&str> = self
            .view
            .classifications
            .iter()
            .map(|c| c.student_id.as_str())
            .collect();
        let mut counts: BTreeMap<String, OutcomeCounts> = self
            .snapshot()
            .programmes(None)
            .into_iter()
            .map(|p| (p, OutcomeCounts::default()))
            .collect();

        for student in &self.view.students {
            let Some(row) = counts.get_mut(&student.programme) else {
                continue;
            };
            row.total += 1;
            if student.status == ApplicantStatus::Dropped {
                row.dropped += 1;
            } else if classified.contains(student.student_id.as_str()) {
                row.retained += 1;
            } else {
                row.active += 1;
            }
        }
        counts
    }

    /// Graduation rate per entry cohort, for cohorts that entered at least
    /// four years before the latest observed year.
    pub fn cohort_completion(&self) -> Vec<CohortCompletion> {
        let Some(latest) = self
            .snapshot()
            .latest_academic_year()
            .and_then(academic_start_year)
        else {
            return Vec::new();
        };

        let mut cohorts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for student in self.view.students.iter().filter(|s| !s.entry_year.is_empty()) {
            cohorts.entry(student.entry_year.as_str()).or_default().0 += 1;
        }

        let index = self.snapshot().index();
        for c in self.view.classifications.iter().filter(|c| c.is_graduated()) {
            let Some(student) = index.student(&c.student_id) else {
                continue;
            };
            if let Some(cohort) = cohorts.get_mut(student.entry_year.as_str()) {
                cohort.1 += 1;
            }
        }

        cohorts
            .into_iter()
            .filter(|(year, _)| {
                academic_start_year(year)
                    .is_some_and(|start| latest - start >= COMPLETION_HORIZON_YEARS)
            })
            .map(|(year, (total, graduated))| CohortCompletion {
                entry_year: year.to_string(),
                total,
                graduated,
                rate: percentage(graduated, total),
            })
            .collect()
    }

    fn attrition_by(
        &self,
        keys: Vec<String>,
        key_of: impl Fn(&Applicant) -> &str,
    ) -> BTreeMap<String, f64> {
        let mut tallies: BTreeMap<String, (usize, usize)> =
            keys.into_iter().map(|k| (k, (0, 0))).collect();
        for student in &self.view.students {
            if let Some(tally) = tallies.get_mut(key_of(student.as_ref())) {
                tally.0 += 1;
                if student.status == ApplicantStatus::Dropped {
                    tally.1 += 1;
                }
            }
        }
        tallies
            .into_iter()
            .map(|(key, (total, dropped))| (key, percentage(dropped, total)))
            .collect()
    }
}
