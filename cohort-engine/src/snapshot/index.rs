//! Lookup structures keyed by student identifier.

use crate::records::{Applicant, Classification, CurrentStudent};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::warn;

/// O(1) lookups from student identifier into the snapshot collections.
///
/// Cross-dataset referential integrity is not guaranteed, so every lookup
/// returns an `Option` or an empty slice instead of failing.
///
/// When several classification rows share an identifier, the last one wins.
/// The affected identifiers are kept in
/// [`StudentIndex::duplicate_classifications`] so callers can surface them.
#[derive(Debug, Clone, Default)]
pub struct StudentIndex {
    students: HashMap<String, Arc<Applicant>>,
    applicants: HashMap<String, Arc<Applicant>>,
    classifications: HashMap<String, Arc<Classification>>,
    current_students: HashMap<String, Vec<Arc<CurrentStudent>>>,
    duplicate_classifications: Vec<String>,
}

impl StudentIndex {
    pub fn build(
        students: &[Arc<Applicant>],
        applicants: &[Arc<Applicant>],
        classifications: &[Arc<Classification>],
        current_students: &[Arc<CurrentStudent>],
    ) -> Self {
        let students = students
            .iter()
            .map(|s| (s.student_id.clone(), Arc::clone(s)))
            .collect();
        let applicants = applicants
            .iter()
            .map(|a| (a.student_id.clone(), Arc::clone(a)))
            .collect();

        let mut by_id = HashMap::with_capacity(classifications.len());
        let mut duplicates = BTreeSet::new();
        for classification in classifications {
            if by_id
                .insert(classification.student_id.clone(), Arc::clone(classification))
                .is_some()
            {
                duplicates.insert(classification.student_id.clone());
            }
        }
        if !duplicates.is_empty() {
            warn!(
                count = duplicates.len(),
                "Duplicate classification records found; the last record per student is used"
            );
        }

        let mut snapshots: HashMap<String, Vec<Arc<CurrentStudent>>> = HashMap::new();
        for record in current_students {
            snapshots
                .entry(record.student_id.clone())
                .or_default()
                .push(Arc::clone(record));
        }

        Self {
            students,
            applicants,
            classifications: by_id,
            current_students: snapshots,
            duplicate_classifications: duplicates.into_iter().collect(),
        }
    }

    pub fn student(&self, id: &str) -> Option<&Arc<Applicant>> {
        self.students.get(id)
    }

    pub fn applicant(&self, id: &str) -> Option<&Arc<Applicant>> {
        self.applicants.get(id)
    }

    pub fn classification(&self, id: &str) -> Option<&Arc<Classification>> {
        self.classifications.get(id)
    }

    /// All per-year enrollment records of a student, in input order.
    pub fn current_records(&self, id: &str) -> &[Arc<CurrentStudent>] {
        self.current_students
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_current_record(&self, id: &str) -> bool {
        self.current_students.contains_key(id)
    }

    /// Identifiers with more than one classification row, sorted.
    pub fn duplicate_classifications(&self) -> &[String] {
        &self.duplicate_classifications
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant(id: &str) -> Arc<Applicant> {
        Arc::new(Applicant {
            student_id: id.to_string(),
            ..Default::default()
        })
    }

    fn classification(id: &str, gpa: f64) -> Arc<Classification> {
        Arc::new(Classification {
            student_id: id.to_string(),
            final_gpa: gpa,
            ..Default::default()
        })
    }

    #[test]
    fn test_lookups_tolerate_missing_ids() {
        let index = StudentIndex::build(&[applicant("S1")], &[applicant("S1")], &[], &[]);
        assert!(index.student("S1").is_some());
        assert!(index.student("S9").is_none());
        assert!(index.classification("S1").is_none());
        assert!(index.current_records("S1").is_empty());
    }

    #[test]
    fn test_duplicate_classification_last_write_wins() {
        let index = StudentIndex::build(
            &[],
            &[],
            &[classification("S1", 12.0), classification("S1", 18.0), classification("S2", 9.0)],
            &[],
        );
        assert_eq!(index.classification("S1").unwrap().final_gpa, 18.0);
        assert_eq!(index.duplicate_classifications(), ["S1".to_string()]);
    }

    #[test]
    fn test_current_records_one_to_many() {
        let rows: Vec<Arc<CurrentStudent>> = ["2021/22", "2022/23"]
            .iter()
            .map(|year| {
                Arc::new(CurrentStudent {
                    student_id: "S1".to_string(),
                    academic_year: year.to_string(),
                    ..Default::default()
                })
            })
            .collect();
        let index = StudentIndex::build(&[], &[], &[], &rows);
        assert_eq!(index.current_records("S1").len(), 2);
        assert!(index.has_current_record("S1"));
    }
}
