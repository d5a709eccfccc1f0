//! The engine instance owning the current snapshot and filtered view.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::filter::{self, FilterSet, FilteredView};
use crate::formatters::{self, MetricsReport};
use crate::metrics::Metrics;
use crate::snapshot::{self, Collection, LoadOptions, LoadProgress, Snapshot};
use crate::sources::SnapshotSources;
use crate::{log_data_op, log_filter};
use std::sync::Arc;
use tracing::{instrument, warn};

/// Owns one immutable [`Snapshot`] and the view derived from the active
/// filters.
///
/// Loading builds a complete snapshot before anything is replaced, so a
/// failed load leaves the previous snapshot and view untouched.
///
/// # Examples
///
/// ```rust
/// use cohort_engine::engine::Engine;
/// use cohort_engine::filter::FilterSet;
///
/// let mut engine = Engine::new();
/// let view = engine.apply_filters(FilterSet::new().with_school("Business"));
/// assert!(view.students.is_empty());
/// assert_eq!(engine.metrics().pass_rate(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    snapshot: Arc<Snapshot>,
    view: FilteredView,
}

impl Engine {
    /// Creates an engine over an empty snapshot.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::from_snapshot(config, Snapshot::default())
    }

    /// Creates an engine over an already built snapshot.
    pub fn from_snapshot(config: EngineConfig, snapshot: Snapshot) -> Self {
        let snapshot = Arc::new(snapshot);
        let view = FilteredView::unfiltered(Arc::clone(&snapshot));
        Self {
            config,
            snapshot,
            view,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loads the six datasets and swaps them in. Active filters are reset.
    pub async fn load_snapshot<F>(&mut self, sources: &SnapshotSources, on_progress: F) -> Result<()>
    where
        F: FnMut(LoadProgress),
    {
        let options = LoadOptions::default().with_normalize(self.config.normalize.clone());
        self.load_with(sources, &options, on_progress).await
    }

    /// Loads user-supplied datasets, checking required columns first.
    pub async fn import_snapshot<F>(&mut self, sources: &SnapshotSources, on_progress: F) -> Result<()>
    where
        F: FnMut(LoadProgress),
    {
        let options = LoadOptions::import().with_normalize(self.config.normalize.clone());
        self.load_with(sources, &options, on_progress).await
    }

    #[instrument(skip_all, fields(validate_schema = options.validate_schema))]
    async fn load_with<F>(&mut self, sources: &SnapshotSources, options: &LoadOptions, on_progress: F) -> Result<()>
    where
        F: FnMut(LoadProgress),
    {
        match snapshot::load_snapshot(sources, options, on_progress).await {
            Ok(snapshot) => {
                self.replace_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Load failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    /// Replaces the snapshot wholesale and resets the view.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        log_data_op!(
            self.config.log,
            applicants = snapshot.applicants.len(),
            students = snapshot.students.len(),
            current_students = snapshot.current_students.len(),
            course_results = snapshot.course_results.len(),
            "Snapshot replaced"
        );
        self.snapshot = Arc::new(snapshot);
        self.view = FilteredView::unfiltered(Arc::clone(&self.snapshot));
    }

    /// Rebuilds the current view from `filters`.
    pub fn apply_filters(&mut self, filters: FilterSet) -> &FilteredView {
        self.view = filter::apply_filters(&self.snapshot, &filters);
        log_filter!(
            self.config.log,
            students = self.view.students.len(),
            of = self.snapshot.students.len(),
            search = %self.config.log.field(self.view.filters().search.as_deref().unwrap_or("")),
            "Filters applied"
        );
        &self.view
    }

    /// Restores the unfiltered view.
    pub fn reset_filters(&mut self) -> &FilteredView {
        self.view = FilteredView::unfiltered(Arc::clone(&self.snapshot));
        log_filter!(self.config.log, "Filters reset");
        &self.view
    }

    pub fn current_view(&self) -> &FilteredView {
        &self.view
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// Sorted distinct values of `field` in the full snapshot.
    pub fn distinct_values(&self, field: &str, collection: Collection) -> Vec<String> {
        self.snapshot.distinct_values(field, collection)
    }

    /// Metric calculators over the current view.
    pub fn metrics(&self) -> Metrics<'_> {
        Metrics::new(&self.view, &self.config.stats).with_log(&self.config.log)
    }

    /// Headline report of the current view.
    pub fn report(&self, forecast_count: Option<usize>) -> MetricsReport {
        MetricsReport::build(&self.metrics(), forecast_count)
    }

    /// Exports the filtered students as delimited text.
    pub fn export_students(&self, delimiter: u8) -> Result<String> {
        formatters::to_delimited_text(&self.view.students, delimiter)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::logging::LogConfig;
    use crate::normalize::RawRow;
    use crate::sources::{DatasetKind, DatasetSource, InMemorySource};
    use crate::test_utils::SnapshotBuilder;

    fn admissions_row(id: &str, programme: &str, status: &str) -> RawRow {
        RawRow::from_pairs([
            ("Student_ID", id),
            ("First Name", "Alex"),
            ("Last Name", "Reid"),
            ("Gender", "Female"),
            ("Nationality", "British"),
            ("Date of Birth", "2003-05-01"),
            ("Course/Degree", programme),
            ("Student Status", status),
            ("Academic Year", "2022/23"),
        ])
    }

    fn sources(admissions: Vec<RawRow>) -> SnapshotSources {
        let empty = |kind| -> Arc<dyn DatasetSource> { Arc::new(InMemorySource::empty(kind)) };
        SnapshotSources {
            admissions: Arc::new(InMemorySource::from_rows(DatasetKind::Admissions, admissions)),
            current_students: empty(DatasetKind::CurrentStudents),
            enrollments: empty(DatasetKind::Enrollments),
            attendance: empty(DatasetKind::Attendance),
            classifications: empty(DatasetKind::Classifications),
            course_results: empty(DatasetKind::CourseResults),
        }
    }

    #[tokio::test]
    async fn test_load_replaces_snapshot_and_resets_filters() {
        let mut engine = Engine::new();
        engine.apply_filters(FilterSet::new().with_gender("Male"));

        let rows = vec![
            admissions_row("S1", "Computing Science", "Active"),
            admissions_row("S2", "Legal Studies", "Rejected"),
        ];
        let mut progress = 0;
        engine
            .load_snapshot(&sources(rows), |_| progress += 1)
            .await
            .unwrap();

        assert_eq!(progress, 6);
        assert_eq!(engine.snapshot().applicants.len(), 2);
        assert_eq!(engine.current_view().students.len(), 1);
        assert!(engine.current_view().filters().is_empty());
    }

    #[tokio::test]
    async fn test_failed_import_keeps_previous_snapshot() {
        let snapshot = SnapshotBuilder::new()
            .student("KEEP", "Computing Science", "Female")
            .build();
        let mut engine = Engine::from_snapshot(EngineConfig::default(), snapshot);
        engine.apply_filters(FilterSet::new().with_programme("Computing Science"));

        let broken = vec![RawRow::from_pairs([("Student_ID", "S9")])];
        let err = engine.import_snapshot(&sources(broken), |_| {}).await.unwrap_err();

        assert!(matches!(err, EngineError::SchemaValidation { .. }));
        assert_eq!(engine.snapshot().students[0].student_id, "KEEP");
        assert_eq!(engine.current_view().students.len(), 1);
        assert!(!engine.current_view().filters().is_empty());
    }

    #[test]
    fn test_metrics_use_engine_log_config() {
        let quiet = Engine::new();
        assert!(!quiet.metrics().log_config().log_metrics);

        let verbose = Engine::with_config(EngineConfig::default().with_log(LogConfig::verbose()));
        assert!(verbose.metrics().log_config().log_metrics);
        assert_eq!(verbose.metrics().log_config().max_field_length, 1024);
    }

    #[test]
    fn test_reset_reproduces_unfiltered_metrics() {
        let snapshot = SnapshotBuilder::new()
            .student("A", "Computing Science", "Female")
            .student("B", "Legal Studies", "Male")
            .result("A", "2022/23", "CS1", "A1")
            .result("B", "2022/23", "LS1", "F1")
            .build();
        let mut engine = Engine::from_snapshot(EngineConfig::default(), snapshot);
        let before = engine.metrics().pass_rate();

        engine.apply_filters(FilterSet::new().with_gender("Female"));
        assert_eq!(engine.metrics().pass_rate(), 100.0);

        engine.reset_filters();
        assert_eq!(engine.metrics().pass_rate(), before);
        assert_eq!(before, 50.0);
    }

    #[test]
    fn test_distinct_values_and_export() {
        let snapshot = SnapshotBuilder::new()
            .student("A", "Legal Studies", "Female")
            .student("B", "Computing Science", "Male")
            .build();
        let mut engine = Engine::from_snapshot(EngineConfig::default(), snapshot);
        assert_eq!(
            engine.distinct_values("programme", Collection::Students),
            vec!["Computing Science".to_string(), "Legal Studies".to_string()]
        );

        engine.apply_filters(FilterSet::new().with_gender("Male"));
        let text = engine.export_students(b',').unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().starts_with("B,"));
        assert_eq!(engine.report(None).students, 1);
    }
}
