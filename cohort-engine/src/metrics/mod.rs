//! Derived metrics over a [`FilteredView`].
//!
//! Every calculator is a pure function of the view, plus the snapshot the
//! view carries where a metric needs full-population context (the observed
//! year list, all applicants, the full programme list). Calculators never
//! fail: empty inputs produce zeros or empty collections.
//!
//! Percentages are rounded to one decimal place. Averages over GPA and
//! attendance are rounded likewise. Statistical outputs are not rounded.

use crate::config::StatsConfig;
use crate::filter::FilteredView;
use crate::logging::LogConfig;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

mod attendance;
mod breakdown;
mod enrollment;
mod programme;
mod rates;
mod recruitment;
mod statistics;

pub use breakdown::{HierarchyNode, SunburstData};
pub use enrollment::{NewVsReturning, YearCount};
pub use programme::{CohortCompletion, CoursePassRate, OutcomeCounts, ProgrammeComparison, Transition};
pub use recruitment::{OfferFunnel, SankeyData, SankeyLink, SourceEffectiveness};

/// A label with a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Counts cross-tabulated by group (rows) and category (columns).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCounts {
    pub groups: Vec<String>,
    pub categories: Vec<String>,
    /// `counts[group][category]`
    pub counts: Vec<Vec<usize>>,
}

impl GroupedCounts {
    /// Builds a matrix from `(group, category)` tallies. Groups are sorted;
    /// categories keep the given order.
    fn from_tallies(categories: Vec<String>, tallies: &BTreeMap<String, BTreeMap<String, usize>>) -> Self {
        let groups: Vec<String> = tallies.keys().cloned().collect();
        let counts = groups
            .iter()
            .map(|group| {
                categories
                    .iter()
                    .map(|category| tallies[group].get(category).copied().unwrap_or(0))
                    .collect()
            })
            .collect();
        Self {
            groups,
            categories,
            counts,
        }
    }

    pub fn get(&self, group: &str, category: &str) -> usize {
        let row = self.groups.iter().position(|g| g == group);
        let column = self.categories.iter().position(|c| c == category);
        match (row, column) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn group_total(&self, group: &str) -> usize {
        self.groups
            .iter()
            .position(|g| g == group)
            .map(|r| self.counts[r].iter().sum())
            .unwrap_or(0)
    }
}

/// Calculator facade over one filtered view.
///
/// ```rust
/// use cohort_engine::config::StatsConfig;
/// use cohort_engine::filter::FilteredView;
/// use cohort_engine::metrics::Metrics;
/// use cohort_engine::snapshot::Snapshot;
/// use std::sync::Arc;
///
/// let view = FilteredView::unfiltered(Arc::new(Snapshot::default()));
/// let stats = StatsConfig::default();
/// let metrics = Metrics::new(&view, &stats);
/// assert_eq!(metrics.pass_rate(), 0.0);
/// assert!(metrics.enrollment_prediction(None).is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Metrics<'a> {
    view: &'a FilteredView,
    stats: &'a StatsConfig,
    log: &'a LogConfig,
}

static DEFAULT_LOG: LogConfig = LogConfig::DEFAULT;

impl<'a> Metrics<'a> {
    pub fn new(view: &'a FilteredView, stats: &'a StatsConfig) -> Self {
        Self {
            view,
            stats,
            log: &DEFAULT_LOG,
        }
    }

    /// Uses `log` to decide whether metric computations are logged.
    pub fn with_log(mut self, log: &'a LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn log_config(&self) -> &'a LogConfig {
        self.log
    }

    pub fn view(&self) -> &'a FilteredView {
        self.view
    }

    fn snapshot(&self) -> &'a Snapshot {
        self.view.snapshot()
    }

    /// Identifiers of every student in the full snapshot with an enrollment
    /// record.
    fn registered_ids(&self) -> HashSet<&'a str> {
        self.snapshot()
            .current_students
            .iter()
            .map(|cs| cs.student_id.as_str())
            .collect()
    }

    /// Identifiers of every student in the full snapshot with a
    /// classification record.
    fn classified_ids(&self) -> HashSet<&'a str> {
        self.snapshot()
            .classifications
            .iter()
            .map(|c| c.student_id.as_str())
            .collect()
    }
}

/// Occurrence counts, most frequent first. Equal counts keep first-seen
/// order.
fn ranked<'s>(labels: impl IntoIterator<Item = &'s str>) -> Vec<LabelCount> {
    let mut counts: Vec<LabelCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        let position = *positions.entry(label).or_insert_with(|| {
            counts.push(LabelCount::new(label, 0));
            counts.len() - 1
        });
        counts[position].count += 1;
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// `part / whole` as a percentage rounded to one decimal, `0.0` when `whole`
/// is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}

/// Mean rounded to one decimal, `0.0` for no values.
pub fn mean1(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        round1(sum / count as f64)
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_guards_zero_denominator() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_mean1() {
        assert_eq!(mean1(std::iter::empty()), 0.0);
        assert_eq!(mean1([15.0, 16.5, 17.0].into_iter()), 16.2);
    }

    #[test]
    fn test_ranked_keeps_first_seen_order_on_ties() {
        let ranked = ranked(["b", "a", "c", "a", "c"]);
        assert_eq!(
            ranked,
            vec![LabelCount::new("a", 2), LabelCount::new("c", 2), LabelCount::new("b", 1)]
        );
    }

    #[test]
    fn test_grouped_counts_lookup() {
        let mut tallies: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        tallies
            .entry("B".into())
            .or_default()
            .insert("x".into(), 2);
        tallies.entry("A".into()).or_default().insert("y".into(), 1);
        let grouped = GroupedCounts::from_tallies(vec!["x".into(), "y".into()], &tallies);
        assert_eq!(grouped.groups, vec!["A", "B"]);
        assert_eq!(grouped.get("B", "x"), 2);
        assert_eq!(grouped.get("A", "x"), 0);
        assert_eq!(grouped.get("C", "x"), 0);
        assert_eq!(grouped.group_total("B"), 2);
    }
}
