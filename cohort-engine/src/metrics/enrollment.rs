//! Headcounts over enrollment snapshots and the student view.

use super::{LabelCount, Metrics};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Distinct students enrolled in one academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: String,
    pub count: usize,
}

/// Enrolled students in one year split by first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVsReturning {
    pub year: String,
    pub total: usize,
    pub new: usize,
    pub returning: usize,
}

impl<'a> Metrics<'a> {
    /// Distinct enrolled students per academic year, ascending by year.
    pub fn enrollment_by_year(&self) -> Vec<YearCount> {
        self.students_by_year()
            .into_iter()
            .map(|(year, ids)| YearCount {
                year: year.to_string(),
                count: ids.len(),
            })
            .collect()
    }

    /// Size of the full applicant pool. Filters do not apply.
    pub fn total_applicants(&self) -> usize {
        self.snapshot().applicants.len()
    }

    /// Distinct students with at least one enrollment snapshot.
    pub fn unique_registered_students(&self) -> usize {
        self.view
            .current_students
            .iter()
            .map(|cs| cs.student_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Per year, students seen for the first time against those seen in an
    /// earlier year.
    pub fn new_vs_returning(&self) -> Vec<NewVsReturning> {
        let by_year = self.students_by_year();
        let mut first_seen: HashMap<&str, &str> = HashMap::new();
        for (year, ids) in &by_year {
            for id in ids {
                first_seen.entry(*id).or_insert(*year);
            }
        }

        by_year
            .iter()
            .map(|(year, ids)| {
                let new = ids.iter().filter(|id| first_seen.get(*id) == Some(year)).count();
                NewVsReturning {
                    year: year.to_string(),
                    total: ids.len(),
                    new,
                    returning: ids.len() - new,
                }
            })
            .collect()
    }

    /// Students per school, ordered by school name.
    pub fn enrollment_by_school(&self) -> Vec<LabelCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for student in &self.view.students {
            *counts.entry(student.school()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(school, count)| LabelCount::new(school, count))
            .collect()
    }

    /// Students per programme, ordered by programme name.
    pub fn enrollment_by_programme(&self) -> Vec<LabelCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for student in &self.view.students {
            *counts.entry(student.programme.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(programme, count)| LabelCount::new(programme, count))
            .collect()
    }

    fn students_by_year(&self) -> BTreeMap<&'a str, HashSet<&'a str>> {
        let mut by_year: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for cs in &self.view.current_students {
            by_year
                .entry(cs.academic_year.as_str())
                .or_default()
                .insert(cs.student_id.as_str());
        }
        by_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use crate::filter::{apply_filters, FilterSet, FilteredView};
    use crate::records::ApplicantStatus;
    use crate::test_utils::SnapshotBuilder;
    use std::sync::Arc;

    fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
            .student("A", "Computing Science", "Female")
            .student("B", "Computing Science", "Male")
            .student("C", "Business Management", "Female")
            .applicant("R", "Legal Studies", ApplicantStatus::Rejected)
            .enrolled("A", "2021/22", 1)
            .enrolled("A", "2022/23", 2)
            .enrolled("B", "2022/23", 1)
            .enrolled("C", "2022/23", 1)
            .enrolled("C", "2022/23", 1)
    }

    #[test]
    fn test_enrollment_by_year_counts_distinct_students() {
        let view = FilteredView::unfiltered(Arc::new(builder().build()));
        let stats = StatsConfig::default();
        let metrics = Metrics::new(&view, &stats);
        assert_eq!(
            metrics.enrollment_by_year(),
            vec![
                YearCount { year: "2021/22".into(), count: 1 },
                YearCount { year: "2022/23".into(), count: 3 },
            ]
        );
        assert_eq!(metrics.unique_registered_students(), 3);
        assert_eq!(metrics.total_applicants(), 4);
    }

    #[test]
    fn test_new_vs_returning() {
        let view = FilteredView::unfiltered(Arc::new(builder().build()));
        let stats = StatsConfig::default();
        let split = Metrics::new(&view, &stats).new_vs_returning();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].new, 1);
        assert_eq!(split[0].returning, 0);
        assert_eq!(split[1].total, 3);
        assert_eq!(split[1].new, 2);
        assert_eq!(split[1].returning, 1);
    }

    #[test]
    fn test_school_and_programme_counts_follow_filters() {
        let snapshot = Arc::new(builder().build());
        let view = apply_filters(&snapshot, &FilterSet::new().with_gender("Female"));
        let stats = StatsConfig::default();
        let metrics = Metrics::new(&view, &stats);
        assert_eq!(
            metrics.enrollment_by_school(),
            vec![
                LabelCount::new("Business", 1),
                LabelCount::new("Natural & Computing Sciences", 1),
            ]
        );
        assert_eq!(metrics.enrollment_by_programme().len(), 2);
        // the applicant pool is never filtered
        assert_eq!(metrics.total_applicants(), 4);
    }
}
