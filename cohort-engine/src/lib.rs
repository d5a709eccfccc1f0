//! # Cohort Engine - Student Cohort Analytics for Rust
//!
//! Cohort Engine loads six related student datasets (admissions, per-year
//! enrollment snapshots, course enrollments, attendance, degree
//! classifications and course results), keeps them mutually consistent under
//! arbitrary filter combinations, and computes cohort metrics and trend
//! statistics over the filtered view.
//!
//! ## Overview
//!
//! Raw rows are normalized into typed records, indexed for cross-dataset
//! lookups and held in an immutable [`snapshot::Snapshot`]. An
//! [`engine::Engine`] owns the current snapshot together with the view
//! derived from the active [`filter::FilterSet`]. Metric calculators are pure
//! functions of that view and never fail: missing data yields zeros, empty
//! collections or `None`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cohort_engine::prelude::*;
//!
//! # async fn example() -> cohort_engine::error::Result<()> {
//! let sources = SnapshotSources::from_directory("data", &DatasetPaths::default(), CsvOptions::default());
//!
//! let mut engine = Engine::new();
//! engine
//!     .load_snapshot(&sources, |p| println!("loaded {}/{} {}", p.completed, p.total, p.dataset))
//!     .await?;
//!
//! engine.apply_filters(FilterSet::new().with_school("Business").with_year("2022/23"));
//!
//! let metrics = engine.metrics();
//! println!("Pass rate: {:.1}%", metrics.pass_rate());
//! println!("Retention: {:.1}%", metrics.retention_rate("2022/23", 1));
//!
//! let significance = metrics.pass_rate_significance();
//! println!("p = {:.4}", significance.p_value);
//!
//! if let Some(prediction) = metrics.enrollment_prediction(None) {
//!     for point in &prediction.forecast {
//!         println!("{}: {:.0}", point.label, point.value);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`sources`] and [`snapshot`]: concurrent dataset loading with progress
//!   reporting and atomic snapshot replacement
//! - [`normalize`]: defensive row parsing and import-time schema checks
//! - [`filter`]: the multi-field filter pipeline
//! - [`metrics`]: enrollment, retention, attrition, completion, recruitment
//!   and classification breakdowns
//! - [`stats`]: chi-square independence testing and OLS forecasting
//! - [`formatters`]: JSON and text reports, delimited-text export

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod formatters;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod prelude;
pub mod records;
pub mod reference;
pub mod snapshot;
pub mod sources;
pub mod stats;

#[cfg(test)]
mod test_utils;
