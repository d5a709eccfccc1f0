//! End-to-end metric scenarios over a small hand-built cohort.

mod common;

use common::{applicant, attendance, classification, current, result};
use cohort_engine::metrics::{LabelCount, YearCount};
use cohort_engine::prelude::*;

const CS: &str = "Computing Science";
const LS: &str = "Legal Studies";

/// Seven applicants over five academic years.
///
/// CS1 and CS2 graduate, LS1 is still studying after repeating year one,
/// LS2 and LS3 drop out, R1 was rejected and NI1 lost interest.
fn cohort() -> Snapshot {
    let with = |mut a: Applicant, referral: Option<&str>, offer: &str| {
        a.referral_source = referral.map(str::to_string);
        a.offer_type = offer.to_string();
        a
    };
    let applicants = vec![
        with(applicant("CS1", CS, "Female", "2019/20", ApplicantStatus::Graduated), Some("Facebook"), "Conditional"),
        with(applicant("CS2", CS, "Male", "2019/20", ApplicantStatus::Graduated), Some("Website"), "Unconditional"),
        with(applicant("LS1", LS, "Female", "2019/20", ApplicantStatus::Active), Some("Website"), "Conditional"),
        with(applicant("LS2", LS, "Male", "2021/22", ApplicantStatus::Dropped), None, ""),
        with(applicant("LS3", LS, "Female", "2020/21", ApplicantStatus::Dropped), None, ""),
        with(applicant("R1", CS, "Male", "2022/23", ApplicantStatus::Rejected), Some("Facebook"), ""),
        with(applicant("NI1", LS, "Female", "2022/23", ApplicantStatus::NotInterested), Some("Instagram"), ""),
    ];

    let current_students = vec![
        current("CS1", "2019/20", 1, CS),
        current("CS2", "2019/20", 1, CS),
        current("LS1", "2019/20", 1, LS),
        current("CS1", "2020/21", 2, CS),
        current("CS2", "2020/21", 2, CS),
        current("LS1", "2020/21", 1, LS),
        current("LS3", "2020/21", 1, LS),
        current("CS1", "2021/22", 3, CS),
        current("CS2", "2021/22", 3, CS),
        current("LS1", "2021/22", 2, LS),
        current("LS2", "2021/22", 1, LS),
        current("CS1", "2022/23", 4, CS),
        current("CS2", "2022/23", 4, CS),
        current("LS1", "2022/23", 3, LS),
        current("LS1", "2023/24", 4, LS),
    ];

    let course_results = vec![
        result("CS1", "2019/20", "CS101", "A1"),
        result("CS2", "2019/20", "CS101", "F1"),
        result("LS1", "2020/21", "LS101", "B2"),
        result("LS1", "2021/22", "LS201", "NP"),
    ];

    let attendance_records = vec![
        attendance("CS1", "2019/20", "Sem1", 70.0, "Warning"),
        attendance("LS1", "2021/22", "Sem1", 50.0, "Concern"),
        attendance("LS1", "2022/23", "Sem2", 90.0, "Good"),
    ];

    let classifications = vec![
        classification("CS1", CS, DegreeClass::FirstClass, 20.0),
        classification("CS2", CS, DegreeClass::BorderlineUpperFirst, 17.0),
    ];

    Snapshot::new(
        applicants,
        current_students,
        Vec::new(),
        course_results,
        attendance_records,
        classifications,
    )
}

fn engine() -> Engine {
    Engine::from_snapshot(EngineConfig::default(), cohort())
}

#[test]
fn retention_follows_observed_year_order() {
    let engine = engine();
    let metrics = engine.metrics();

    assert_eq!(metrics.retention_rate("2019/20", 1), 66.7);
    // LS1 repeats year one and progresses, LS3 leaves.
    assert_eq!(metrics.retention_rate("2020/21", 1), 50.0);
    assert_eq!(metrics.retention_rate("2021/22", 1), 0.0);
    assert_eq!(metrics.retention_rate("2023/24", 1), 0.0);
    assert_eq!(metrics.retention_rate("2030/31", 1), 0.0);

    let by_year = metrics.retention_by_year();
    assert_eq!(by_year.len(), 4);
    assert_eq!(by_year[1], ("2020/21".to_string(), 50.0));
}

#[test]
fn completion_counts_eligible_cohorts_only() {
    let mut engine = engine();
    assert_eq!(engine.metrics().completion_rate(), 66.7);

    let cohorts = engine.metrics().cohort_completion();
    assert_eq!(cohorts.len(), 1);
    assert_eq!(cohorts[0].entry_year, "2019/20");
    assert_eq!((cohorts[0].total, cohorts[0].graduated), (3, 2));

    engine.apply_filters(FilterSet::new().with_programme(CS));
    assert_eq!(engine.metrics().completion_rate(), 100.0);

    engine.apply_filters(FilterSet::new().with_programme(LS));
    assert_eq!(engine.metrics().completion_rate(), 0.0);
}

#[test]
fn completion_needs_four_observed_years() {
    let snapshot = Snapshot::new(
        vec![applicant("A", CS, "Female", "2019/20", ApplicantStatus::Graduated)],
        vec![
            current("A", "2019/20", 1, CS),
            current("A", "2020/21", 2, CS),
            current("A", "2021/22", 3, CS),
        ],
        Vec::new(),
        Vec::new(),
        Vec::new(),
        vec![classification("A", CS, DegreeClass::UpperSecond, 16.0)],
    );
    let engine = Engine::from_snapshot(EngineConfig::default(), snapshot);
    assert_eq!(engine.metrics().completion_rate(), 0.0);
}

#[test]
fn headline_rates() {
    let engine = engine();
    let metrics = engine.metrics();
    assert_eq!(metrics.pass_rate(), 50.0);
    assert_eq!(metrics.average_final_gpa(), 18.5);
    assert_eq!(metrics.average_attendance(), 70.0);
    assert_eq!(metrics.attrition_rate("2020/21"), 100.0);
    assert_eq!(metrics.attrition_rate("2019/20"), 0.0);
    assert_eq!(metrics.total_applicants(), 7);
    assert_eq!(metrics.unique_registered_students(), 5);
}

#[test]
fn enrollment_series() {
    let engine = engine();
    let metrics = engine.metrics();

    let counts: Vec<usize> = metrics.enrollment_by_year().iter().map(|y| y.count).collect();
    assert_eq!(counts, vec![3, 4, 4, 3, 1]);
    assert_eq!(
        metrics.enrollment_by_year()[0],
        YearCount {
            year: "2019/20".to_string(),
            count: 3
        }
    );

    let second = &metrics.new_vs_returning()[1];
    assert_eq!(second.year, "2020/21");
    assert_eq!((second.total, second.new, second.returning), (4, 1, 3));
}

#[test]
fn recruitment_uses_all_applicants() {
    let engine = engine();
    let metrics = engine.metrics();

    assert_eq!(
        metrics.recruitment_by_source(),
        vec![LabelCount::new("Social Media", 3), LabelCount::new("Website & Search", 2)]
    );

    let effectiveness = metrics.recruitment_effectiveness();
    let social = &effectiveness[0];
    assert_eq!(social.source, "Social Media");
    assert_eq!(social.total, 3);
    assert_eq!(social.registered, 1);
    assert_eq!(social.graduated, 1);
    assert_eq!(social.rejected, 1);
    assert_eq!(social.not_interested, 1);
    let website = &effectiveness[1];
    assert_eq!((website.total, website.registered, website.graduated), (2, 2, 1));
}

#[test]
fn offer_funnel_and_outcome_flow() {
    let mut engine = engine();
    let funnel = engine.metrics().offer_funnel();
    assert_eq!(funnel.total, 7);
    assert_eq!((funnel.rejected, funnel.not_interested), (1, 1));
    assert_eq!((funnel.conditional, funnel.unconditional, funnel.offers_given), (2, 1, 3));
    assert_eq!((funnel.registered, funnel.graduated, funnel.dropped), (5, 2, 2));

    let sankey = engine.metrics().sankey();
    let values: Vec<usize> = sankey.links.iter().map(|l| l.value).collect();
    assert_eq!(values, vec![1, 1, 5, 2, 2, 1]);
    assert_eq!(sankey.nodes[sankey.links[2].target], "Registered");

    // Narrowing to one programme restricts the applicant pool to it.
    engine.apply_filters(FilterSet::new().with_programme(LS));
    let narrowed = engine.metrics().offer_funnel();
    assert_eq!(narrowed.total, 4);
    assert_eq!(narrowed.not_interested, 1);
}

#[test]
fn classification_breakdowns() {
    let engine = engine();
    let metrics = engine.metrics();

    let by_programme = metrics.classification_by_programme();
    assert_eq!(by_programme.groups, vec![CS.to_string()]);
    assert_eq!(by_programme.get(CS, "First"), 2);
    assert_eq!(by_programme.group_total(LS), 0);

    let distribution = metrics.classification_distribution();
    assert_eq!(distribution.len(), DegreeClass::ALL.len());
    assert_eq!(distribution[0].count, 1);
    assert_eq!(distribution[1].count, 1);

    let sunburst = metrics.sunburst();
    assert_eq!(sunburst.node("root").map(|n| n.value), Some(2));
    let programme = sunburst
        .node("S_Natural & Computing Sciences_P_Computing Science")
        .unwrap();
    assert_eq!(programme.label, "CS");
    assert_eq!(programme.value, 2);
}

#[test]
fn attendance_overview_counts_each_student_once() {
    let engine = engine();
    let overview = engine.metrics().attendance_risk_overview();
    assert_eq!(overview.get("Good"), Some(&1));
    assert_eq!(overview.get("Warning"), Some(&1));
    assert_eq!(overview.get("Concern"), None);
}

#[test]
fn year_filter_scopes_every_metric() {
    let mut engine = engine();
    engine.apply_filters(FilterSet::new().with_year("2023/24"));

    let view = engine.current_view();
    assert_eq!(view.students.len(), 1);
    assert_eq!(view.students[0].student_id, "LS1");

    let metrics = engine.metrics();
    assert_eq!(metrics.pass_rate(), 50.0);
    assert_eq!(metrics.completion_rate(), 0.0);
    assert_eq!(metrics.unique_registered_students(), 1);
}

#[test]
fn empty_view_yields_zeros() {
    let mut engine = engine();
    engine.apply_filters(FilterSet::new().with_programme("Astrophysics"));
    let metrics = engine.metrics();

    assert_eq!(metrics.pass_rate(), 0.0);
    assert_eq!(metrics.average_attendance(), 0.0);
    assert_eq!(metrics.average_final_gpa(), 0.0);
    assert_eq!(metrics.completion_rate(), 0.0);
    assert!(metrics.retention_by_year().iter().all(|(_, rate)| *rate == 0.0));
    assert!(metrics.sunburst().is_empty());
    assert!(metrics.attendance_risk_overview().is_empty());
    assert!(!metrics.pass_rate_significance().significant);
}

#[test]
fn report_serializes_to_json() {
    let engine = engine();
    let report = engine.report(Some(2));
    let json = JsonFormatter::new().format(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["students"], 5);
    assert_eq!(value["offer_funnel"]["registered"], 5);
    assert_eq!(value["enrollment_prediction"]["forecast"].as_array().map(Vec::len), Some(3));
}
