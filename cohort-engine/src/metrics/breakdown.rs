//! Distribution and cross-tabulation breakdowns.

use super::{ranked, GroupedCounts, LabelCount, Metrics};
use crate::records::{CoarseBand, DegreeClass};
use crate::reference::{self, GRADE_BANDS, PROFICIENCY_ORDER};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Label used for blank hierarchy levels.
const UNKNOWN: &str = "Unknown";

/// Width of an age bucket in years.
const AGE_BUCKET_YEARS: u32 = 5;

/// One node of a School → Programme → Classification hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: String,
    pub label: String,
    /// Id of the parent node, empty for the root
    pub parent: String,
    pub value: usize,
}

/// A flattened hierarchy, parents before children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunburstData {
    pub nodes: Vec<HierarchyNode>,
}

impl SunburstData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&HierarchyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn push(&mut self, id: String, label: impl Into<String>, parent: &str, value: usize) {
        self.nodes.push(HierarchyNode {
            id,
            label: label.into(),
            parent: parent.to_string(),
            value,
        });
    }
}

type ClassTree = BTreeMap<String, BTreeMap<String, BTreeMap<String, usize>>>;

impl<'a> Metrics<'a> {
    /// Classification bands per programme.
    ///
    /// Classifications whose label was not recognized carry no band and are
    /// not counted.
    pub fn classification_by_programme(&self) -> GroupedCounts {
        let mut tallies: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for c in &self.view.classifications {
            let row = tallies.entry(c.programme.clone()).or_default();
            if let Some(band) = c.coarse_band() {
                *row.entry(band.label().to_string()).or_default() += 1;
            }
        }
        let bands = CoarseBand::ALL.iter().map(|b| b.label().to_string()).collect();
        GroupedCounts::from_tallies(bands, &tallies)
    }

    /// Letter-grade performance bands per programme.
    pub fn grade_band_by_programme(&self) -> GroupedCounts {
        let index = self.snapshot().index();
        let mut tallies: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for result in &self.view.course_results {
            let Some(student) = index.student(&result.student_id) else {
                continue;
            };
            let row = tallies.entry(student.programme.clone()).or_default();
            if let Some(band) = reference::grade_band(&result.grade) {
                *row.entry(band.to_string()).or_default() += 1;
            }
        }
        let bands = GRADE_BANDS.iter().map(|(band, _)| band.to_string()).collect();
        GroupedCounts::from_tallies(bands, &tallies)
    }

    /// English proficiency levels per programme, levels in proficiency order.
    pub fn proficiency_by_programme(&self) -> GroupedCounts {
        let mut tallies: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut levels: Vec<&str> = Vec::new();
        for student in &self.view.students {
            let level = student.english_proficiency();
            if !levels.contains(&level) {
                levels.push(level);
            }
            *tallies
                .entry(student.programme.clone())
                .or_default()
                .entry(level.to_string())
                .or_default() += 1;
        }
        levels.sort_by_key(|level| proficiency_rank(level));
        GroupedCounts::from_tallies(levels.into_iter().map(String::from).collect(), &tallies)
    }

    /// Genders per programme, genders in lexical order.
    pub fn gender_by_programme(&self) -> GroupedCounts {
        let mut tallies: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut genders: BTreeSet<String> = BTreeSet::new();
        for student in &self.view.students {
            genders.insert(student.gender.clone());
            *tallies
                .entry(student.programme.clone())
                .or_default()
                .entry(student.gender.clone())
                .or_default() += 1;
        }
        GroupedCounts::from_tallies(genders.into_iter().collect(), &tallies)
    }

    /// Count of every degree classification in canonical order, zeros
    /// included.
    pub fn classification_distribution(&self) -> Vec<LabelCount> {
        DegreeClass::ALL
            .iter()
            .map(|class| {
                let count = self
                    .view
                    .classifications
                    .iter()
                    .filter(|c| c.classification == Some(*class))
                    .count();
                LabelCount::new(class.label(), count)
            })
            .collect()
    }

    /// Graduates arranged by school, programme and classification.
    ///
    /// Only classifications with graduation status `Graduated` whose student
    /// is known are counted. Node ids encode the path, so they are unique.
    pub fn sunburst(&self) -> SunburstData {
        let index = self.snapshot().index();
        let mut tree: ClassTree = BTreeMap::new();
        let mut grand_total = 0;
        for c in self.view.classifications.iter().filter(|c| c.is_graduated()) {
            let Some(student) = index.student(&c.student_id) else {
                continue;
            };
            let programme = if student.programme.is_empty() {
                UNKNOWN
            } else {
                student.programme.as_str()
            };
            let class = c.classification.map_or(UNKNOWN, |class| class.label());
            *tree
                .entry(student.school().to_string())
                .or_default()
                .entry(programme.to_string())
                .or_default()
                .entry(class.to_string())
                .or_default() += 1;
            grand_total += 1;
        }

        let mut data = SunburstData::default();
        if grand_total == 0 {
            return data;
        }
        data.push("root".to_string(), "All Graduates", "", grand_total);
        for (school, programmes) in &tree {
            let school_id = format!("S_{school}");
            let school_total: usize = programmes.values().flat_map(|classes| classes.values()).sum();
            data.push(school_id.clone(), school.as_str(), "root", school_total);

            for (programme, classes) in programmes {
                let programme_id = format!("{school_id}_P_{programme}");
                let programme_total: usize = classes.values().sum();
                data.push(
                    programme_id.clone(),
                    reference::abbreviate_programme(programme),
                    &school_id,
                    programme_total,
                );
                for (class, count) in classes {
                    data.push(format!("{programme_id}_C_{class}"), class.as_str(), &programme_id, *count);
                }
            }
        }
        data
    }

    /// Students per five-year age bucket, youngest first. Students without a
    /// known age are left out.
    pub fn age_distribution(&self) -> Vec<LabelCount> {
        let mut buckets: BTreeMap<u32, usize> = BTreeMap::new();
        for age in self.view.students.iter().filter_map(|s| s.age) {
            *buckets.entry(age / AGE_BUCKET_YEARS * AGE_BUCKET_YEARS).or_default() += 1;
        }
        buckets
            .into_iter()
            .map(|(start, count)| {
                LabelCount::new(format!("{start}-{}", start + AGE_BUCKET_YEARS - 1), count)
            })
            .collect()
    }

    /// The `n` most common nationalities.
    pub fn top_nationalities(&self, n: usize) -> Vec<LabelCount> {
        let mut counts = ranked(
            self.view
                .students
                .iter()
                .map(|s| s.nationality.as_str())
                .filter(|nationality| !nationality.is_empty()),
        );
        counts.truncate(n);
        counts
    }

    /// Students per prior education system, most common first.
    pub fn education_system_counts(&self) -> Vec<LabelCount> {
        ranked(
            self.view
                .students
                .iter()
                .map(|s| s.education_system.as_str())
                .filter(|system| !system.is_empty()),
        )
    }
}

fn proficiency_rank(level: &str) -> usize {
    PROFICIENCY_ORDER
        .iter()
        .position(|known| *known == level)
        .unwrap_or(99)
}
