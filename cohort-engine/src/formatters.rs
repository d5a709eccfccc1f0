//! Report formatting and delimited-text export.
//!
//! A [`MetricsReport`] collects the headline metrics of one filtered view.
//! Formatters turn a report into JSON for programmatic consumers or plain
//! text for a terminal. [`to_delimited_text`] exports the filtered students.
//!
//! # Examples
//!
//! ```rust
//! use cohort_engine::config::StatsConfig;
//! use cohort_engine::filter::FilteredView;
//! use cohort_engine::formatters::{HumanFormatter, MetricsReport, ReportFormatter};
//! use cohort_engine::metrics::Metrics;
//! use cohort_engine::snapshot::Snapshot;
//! use std::sync::Arc;
//!
//! let view = FilteredView::unfiltered(Arc::new(Snapshot::default()));
//! let stats = StatsConfig::default();
//! let report = MetricsReport::build(&Metrics::new(&view, &stats), None);
//! let text = HumanFormatter::new().format(&report).unwrap();
//! assert!(text.contains("Students: 0"));
//! ```

use crate::error::{EngineError, Result};
use crate::filter::FilterSet;
use crate::metrics::{LabelCount, Metrics, OfferFunnel, YearCount};
use crate::records::Applicant;
use crate::stats::{ChiSquareResult, Forecast};
use arrow::array::{ArrayRef, StringArray, UInt32Array};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

/// Headline metrics of one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub filters: FilterSet,
    pub students: usize,
    pub total_applicants: usize,
    pub registered_students: usize,
    pub pass_rate: f64,
    pub completion_rate: f64,
    pub average_final_gpa: f64,
    pub average_attendance: f64,
    /// Retention from programme year 1, per academic year
    pub retention_by_year: Vec<(String, f64)>,
    pub enrollment_by_year: Vec<YearCount>,
    pub classification_distribution: Vec<LabelCount>,
    pub offer_funnel: OfferFunnel,
    pub pass_rate_significance: ChiSquareResult,
    pub enrollment_prediction: Option<Forecast>,
}

impl MetricsReport {
    /// Computes every report metric over the calculator's view.
    pub fn build(metrics: &Metrics<'_>, forecast_count: Option<usize>) -> Self {
        let view = metrics.view();
        Self {
            filters: view.filters().clone(),
            students: view.students.len(),
            total_applicants: metrics.total_applicants(),
            registered_students: metrics.unique_registered_students(),
            pass_rate: metrics.pass_rate(),
            completion_rate: metrics.completion_rate(),
            average_final_gpa: metrics.average_final_gpa(),
            average_attendance: metrics.average_attendance(),
            retention_by_year: metrics.retention_by_year(),
            enrollment_by_year: metrics.enrollment_by_year(),
            classification_distribution: metrics.classification_distribution(),
            offer_funnel: metrics.offer_funnel(),
            pass_rate_significance: metrics.pass_rate_significance(),
            enrollment_prediction: metrics.enrollment_prediction(forecast_count),
        }
    }
}

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include per-year and per-class breakdowns
    pub include_breakdowns: bool,
    /// Include the significance test and the forecast
    pub include_statistics: bool,
    /// Maximum rows shown per breakdown (-1 for all)
    pub max_rows: i32,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_breakdowns: true,
            include_statistics: true,
            max_rows: -1,
        }
    }
}

impl FormatterConfig {
    /// Headline figures only.
    pub fn minimal() -> Self {
        Self {
            include_breakdowns: false,
            include_statistics: false,
            max_rows: 0,
        }
    }

    pub fn with_breakdowns(mut self, include: bool) -> Self {
        self.include_breakdowns = include;
        self
    }

    pub fn with_statistics(mut self, include: bool) -> Self {
        self.include_statistics = include;
        self
    }

    pub fn with_max_rows(mut self, max: i32) -> Self {
        self.max_rows = max;
        self
    }

    fn row_limit(&self) -> usize {
        usize::try_from(self.max_rows).unwrap_or(usize::MAX)
    }
}

/// Renders a [`MetricsReport`].
pub trait ReportFormatter {
    fn format(&self, report: &MetricsReport) -> Result<String>;
}

/// Formats reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &MetricsReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}

/// Formats reports as plain text for terminals.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &MetricsReport) -> Result<String> {
        self.render(report)
            .map_err(|e| EngineError::Internal(format!("Failed to render report: {e}")))
    }
}

impl HumanFormatter {
    fn render(&self, report: &MetricsReport) -> std::result::Result<String, std::fmt::Error> {
        let limit = self.config.row_limit();
        let mut out = String::new();

        writeln!(out, "Cohort report")?;
        writeln!(out, "=============")?;
        writeln!(out, "Students: {}", report.students)?;
        writeln!(out, "Applicants: {}", report.total_applicants)?;
        writeln!(out, "Registered: {}", report.registered_students)?;
        writeln!(out, "Pass rate: {:.1}%", report.pass_rate)?;
        writeln!(out, "Completion rate: {:.1}%", report.completion_rate)?;
        writeln!(out, "Average final GPA: {:.1}", report.average_final_gpa)?;
        writeln!(out, "Average attendance: {:.1}%", report.average_attendance)?;

        if self.config.include_breakdowns {
            writeln!(out)?;
            writeln!(out, "Enrollment by year")?;
            for row in report.enrollment_by_year.iter().take(limit) {
                writeln!(out, "  {:<10} {:>6}", row.year, row.count)?;
            }
            writeln!(out)?;
            writeln!(out, "Year 1 retention")?;
            for (year, rate) in report.retention_by_year.iter().take(limit) {
                writeln!(out, "  {year:<10} {rate:>5.1}%")?;
            }
            writeln!(out)?;
            writeln!(out, "Classifications")?;
            for row in report.classification_distribution.iter().take(limit) {
                writeln!(out, "  {:<30} {:>6}", row.label, row.count)?;
            }
            let funnel = &report.offer_funnel;
            writeln!(out)?;
            writeln!(
                out,
                "Funnel: {} applicants, {} offers, {} registered, {} graduated",
                funnel.total, funnel.offers_given, funnel.registered, funnel.graduated
            )?;
        }

        if self.config.include_statistics {
            let test = &report.pass_rate_significance;
            writeln!(out)?;
            writeln!(
                out,
                "Pass rate by programme: chi2 = {:.2}, df = {}, p = {:.4}{}",
                test.chi_square,
                test.degrees_of_freedom,
                test.p_value,
                if test.significant { " (significant)" } else { "" }
            )?;
            match &report.enrollment_prediction {
                Some(prediction) => {
                    writeln!(out, "Enrollment forecast (R² = {:.3})", prediction.fit.r_squared)?;
                    let projected = prediction
                        .forecast
                        .iter()
                        .zip(&prediction.lower)
                        .zip(&prediction.upper)
                        .skip(1);
                    for ((point, lower), upper) in projected {
                        writeln!(
                            out,
                            "  {:<10} {:>8.0} [{:.0}, {:.0}]",
                            point.label, point.value, lower.value, upper.value
                        )?;
                    }
                }
                None => writeln!(out, "Enrollment forecast: not enough history")?,
            }
        }
        Ok(out)
    }
}

const EXPORT_COLUMNS: [&str; 12] = [
    "Student_ID",
    "First Name",
    "Last Name",
    "Gender",
    "Nationality",
    "Age",
    "Programme",
    "School",
    "Entry Year",
    "Status",
    "Entry Level",
    "English Proficiency",
];

/// Writes students as delimited text: a header line, then one line per
/// student in input order.
pub fn to_delimited_text(students: &[Arc<Applicant>], delimiter: u8) -> Result<String> {
    let text = |f: fn(&Applicant) -> String| -> ArrayRef {
        Arc::new(StringArray::from(students.iter().map(|s| f(s)).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        text(|s| s.student_id.clone()),
        text(|s| s.first_name.clone()),
        text(|s| s.last_name.clone()),
        text(|s| s.gender.clone()),
        text(|s| s.nationality.clone()),
        Arc::new(UInt32Array::from(students.iter().map(|s| s.age).collect::<Vec<_>>())),
        text(|s| s.programme.clone()),
        text(|s| s.school().to_string()),
        text(|s| s.entry_year.clone()),
        text(|s| s.status.label().to_string()),
        Arc::new(UInt32Array::from(
            students.iter().map(|s| s.entry_level).collect::<Vec<_>>(),
        )),
        text(|s| s.english_proficiency().to_string()),
    ];

    let fields: Vec<Field> = EXPORT_COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, column)| {
            let nullable = *column.data_type() != DataType::Utf8;
            Field::new(*name, column.data_type().clone(), nullable)
        })
        .collect();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;

    let mut buffer = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_delimiter(delimiter)
            .build(&mut buffer);
        writer.write(&batch)?;
    }
    String::from_utf8(buffer)
        .map_err(|e| EngineError::Internal(format!("Exported text is not valid UTF-8: {e}")))
}
