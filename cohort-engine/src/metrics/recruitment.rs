//! Admissions funnel metrics over the applicant pool.
//!
//! These metrics start from all applicants rather than the student view. When
//! filters narrow the student view, the pool is cut down to applicants who
//! share a school and programme with a filtered student, see
//! [`Metrics::management_applicants`]. Registration and graduation are always
//! judged against the full snapshot.

use super::{ranked, LabelCount, Metrics};
use crate::records::{Applicant, ApplicantStatus};
use crate::reference;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Outcome tallies for one merged referral source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEffectiveness {
    pub source: String,
    pub total: usize,
    pub registered: usize,
    pub graduated: usize,
    pub dropped: usize,
    pub rejected: usize,
    pub not_interested: usize,
}

/// Stage counts from application through to graduation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferFunnel {
    pub total: usize,
    pub rejected: usize,
    pub not_interested: usize,
    /// Conditional plus unconditional offers
    pub offers_given: usize,
    pub conditional: usize,
    pub unconditional: usize,
    pub registered: usize,
    pub graduated: usize,
    pub dropped: usize,
}

/// One weighted edge between two node indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: usize,
}

/// Flow diagram of applicant outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SankeyData {
    pub nodes: Vec<String>,
    pub links: Vec<SankeyLink>,
}

/// Node labels of the outcome flow, in index order.
pub const SANKEY_NODES: [&str; 7] = [
    "Applicants",
    "Rejected",
    "Not Interested",
    "Registered",
    "Graduated",
    "Dropped",
    "Active",
];

const APPLICANTS: usize = 0;
const REJECTED: usize = 1;
const NOT_INTERESTED: usize = 2;
const REGISTERED: usize = 3;
const GRADUATED: usize = 4;
const DROPPED: usize = 5;
const ACTIVE: usize = 6;

impl<'a> Metrics<'a> {
    /// The applicant pool funnel metrics are computed over.
    pub fn management_applicants(&self) -> Vec<&'a Arc<Applicant>> {
        let applicants = &self.snapshot().applicants;
        if !self.view.is_narrowed() {
            return applicants.iter().collect();
        }
        let schools: HashSet<&str> = self.view.students.iter().map(|s| s.school()).collect();
        let programmes: HashSet<&str> = self
            .view
            .students
            .iter()
            .map(|s| s.programme.as_str())
            .collect();
        applicants
            .iter()
            .filter(|a| schools.contains(a.school()) && programmes.contains(a.programme.as_str()))
            .collect()
    }

    /// Applicants per merged referral source, most frequent first.
    ///
    /// Applicants without a usable referral answer are skipped. Sources with
    /// equal counts keep the order they were first seen in.
    pub fn recruitment_by_source(&self) -> Vec<LabelCount> {
        ranked(
            self.management_applicants()
                .into_iter()
                .filter_map(|a| a.referral_source.as_deref())
                .map(reference::merge_referral),
        )
    }

    /// Outcomes per merged referral source, largest source first.
    pub fn recruitment_effectiveness(&self) -> Vec<SourceEffectiveness> {
        let registered = self.registered_ids();
        let classified = self.classified_ids();

        let mut rows: Vec<SourceEffectiveness> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for applicant in self.management_applicants() {
            let Some(source) = applicant.referral_source.as_deref() else {
                continue;
            };
            let merged = reference::merge_referral(source);
            let position = *positions.entry(merged).or_insert_with(|| {
                rows.push(SourceEffectiveness {
                    source: merged.to_string(),
                    ..Default::default()
                });
                rows.len() - 1
            });

            let row = &mut rows[position];
            row.total += 1;
            match applicant.status {
                ApplicantStatus::Rejected => row.rejected += 1,
                ApplicantStatus::NotInterested => row.not_interested += 1,
                status => {
                    let id = applicant.student_id.as_str();
                    if registered.contains(id) {
                        row.registered += 1;
                    }
                    if classified.contains(id) {
                        row.graduated += 1;
                    } else if status == ApplicantStatus::Dropped {
                        row.dropped += 1;
                    }
                }
            }
        }
        rows.sort_by(|a, b| b.total.cmp(&a.total));
        rows
    }

    /// Conversion from application to offer, registration and graduation.
    pub fn offer_funnel(&self) -> OfferFunnel {
        let registered = self.registered_ids();
        let classified = self.classified_ids();

        let mut funnel = OfferFunnel::default();
        for applicant in self.management_applicants() {
            funnel.total += 1;
            match applicant.status {
                ApplicantStatus::Rejected => {
                    funnel.rejected += 1;
                    continue;
                }
                ApplicantStatus::NotInterested => {
                    funnel.not_interested += 1;
                    continue;
                }
                _ => {}
            }
            match applicant.offer_type.as_str() {
                "Conditional" => funnel.conditional += 1,
                "Unconditional" => funnel.unconditional += 1,
                _ => {}
            }
            let id = applicant.student_id.as_str();
            if registered.contains(id) {
                funnel.registered += 1;
            }
            if classified.contains(id) {
                funnel.graduated += 1;
            } else if applicant.status == ApplicantStatus::Dropped {
                funnel.dropped += 1;
            }
        }
        funnel.offers_given = funnel.conditional + funnel.unconditional;
        funnel
    }

    /// Applicant outcome flow.
    ///
    /// Every applicant who was neither rejected nor lost interest flows into
    /// `Registered`, then into exactly one of `Graduated`, `Dropped` or
    /// `Active`.
    pub fn sankey(&self) -> SankeyData {
        let classified = self.classified_ids();
        let mut values = [0usize; 7];
        for applicant in self.management_applicants() {
            let outcome = match applicant.status {
                ApplicantStatus::Rejected => REJECTED,
                ApplicantStatus::NotInterested => NOT_INTERESTED,
                status => {
                    values[REGISTERED] += 1;
                    if classified.contains(applicant.student_id.as_str()) {
                        GRADUATED
                    } else if status == ApplicantStatus::Dropped {
                        DROPPED
                    } else {
                        ACTIVE
                    }
                }
            };
            values[outcome] += 1;
        }

        let edges = [
            (APPLICANTS, REJECTED),
            (APPLICANTS, NOT_INTERESTED),
            (APPLICANTS, REGISTERED),
            (REGISTERED, GRADUATED),
            (REGISTERED, DROPPED),
            (REGISTERED, ACTIVE),
        ];
        SankeyData {
            nodes: SANKEY_NODES.iter().map(|n| n.to_string()).collect(),
            links: edges
                .into_iter()
                .map(|(source, target)| SankeyLink {
                    source,
                    target,
                    value: values[target],
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use crate::filter::{apply_filters, FilterSet, FilteredView};
    use crate::records::DegreeClass;
    use crate::snapshot::Snapshot;
    use crate::test_utils::SnapshotBuilder;

    fn snapshot() -> Arc<Snapshot> {
        Arc::new(
            SnapshotBuilder::new()
                .student("G", "Computing Science", "Female")
                .student("D", "Computing Science", "Male")
                .student("A", "Legal Studies", "Female")
                .applicant("R", "Computing Science", ApplicantStatus::Rejected)
                .applicant("N", "Legal Studies", ApplicantStatus::NotInterested)
                .with_status("D", ApplicantStatus::Dropped)
                .with_referral("G", "Facebook")
                .with_referral("D", "Instagram")
                .with_referral("A", "Website")
                .with_referral("R", "Website")
                .with_offer("G", "Unconditional")
                .with_offer("D", "Conditional")
                .with_offer("A", "Conditional")
                .enrolled("G", "2020/21", 1)
                .enrolled("D", "2020/21", 1)
                .classification("G", DegreeClass::UpperSecond, 15.0)
                .build(),
        )
    }

    #[test]
    fn test_offer_funnel() {
        let view = FilteredView::unfiltered(snapshot());
        let stats = StatsConfig::default();
        let funnel = Metrics::new(&view, &stats).offer_funnel();
        assert_eq!(
            funnel,
            OfferFunnel {
                total: 5,
                rejected: 1,
                not_interested: 1,
                offers_given: 3,
                conditional: 2,
                unconditional: 1,
                registered: 2,
                graduated: 1,
                dropped: 1,
            }
        );
    }

    #[test]
    fn test_sankey_partitions_registered() {
        let view = FilteredView::unfiltered(snapshot());
        let stats = StatsConfig::default();
        let sankey = Metrics::new(&view, &stats).sankey();
        assert_eq!(sankey.nodes.len(), 7);
        let values: Vec<usize> = sankey.links.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![1, 1, 3, 1, 1, 1]);
        let sources: Vec<usize> = sankey.links.iter().map(|l| l.source).collect();
        assert_eq!(sources, vec![0, 0, 0, 3, 3, 3]);
        assert_eq!(values[3] + values[4] + values[5], values[2]);
    }

    #[test]
    fn test_recruitment_sources_are_merged() {
        let view = FilteredView::unfiltered(snapshot());
        let stats = StatsConfig::default();
        let metrics = Metrics::new(&view, &stats);
        assert_eq!(
            metrics.recruitment_by_source(),
            vec![
                LabelCount::new("Social Media", 2),
                LabelCount::new("Website & Search", 2),
            ]
        );

        let effectiveness = metrics.recruitment_effectiveness();
        let social = &effectiveness[0];
        assert_eq!(social.source, "Social Media");
        assert_eq!((social.registered, social.graduated, social.dropped), (2, 1, 1));
        let web = &effectiveness[1];
        assert_eq!((web.total, web.rejected, web.registered), (2, 1, 0));
    }

    #[test]
    fn test_narrowed_view_restricts_applicant_pool() {
        let snapshot = snapshot();
        let view = apply_filters(&snapshot, &FilterSet::new().with_programme("Legal Studies"));
        let stats = StatsConfig::default();
        let metrics = Metrics::new(&view, &stats);
        let pool: Vec<&str> = metrics
            .management_applicants()
            .iter()
            .map(|a| a.student_id.as_str())
            .collect();
        assert_eq!(pool, vec!["A", "N"]);
        assert_eq!(metrics.offer_funnel().total, 2);
    }
}
