//! Concurrent snapshot loading.
//!
//! The six datasets are fetched concurrently. Normalization and index
//! construction then run synchronously over the complete set, so a failure in
//! any fetch aborts the load before a snapshot exists.

use super::Snapshot;
use crate::config::NormalizeOptions;
use crate::error::{EngineError, Result};
use crate::normalize::{self, AdmissionsView, RawTable};
use crate::sources::{DatasetKind, SnapshotSources};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Progress notification, emitted once per dataset as its fetch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadProgress {
    /// Datasets completed so far, including this one
    pub completed: usize,
    pub total: usize,
    pub dataset: DatasetKind,
}

/// Options for a load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Check required columns before normalizing. Used for user imports.
    pub validate_schema: bool,
    pub normalize: NormalizeOptions,
}

impl LoadOptions {
    /// Options for user-supplied files: schema validation on.
    pub fn import() -> Self {
        Self {
            validate_schema: true,
            ..Self::default()
        }
    }

    pub fn with_validate_schema(mut self, enabled: bool) -> Self {
        self.validate_schema = enabled;
        self
    }

    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }
}

/// Raw tables of all six datasets.
#[derive(Debug, Clone, Default)]
pub struct LoadedTables {
    pub admissions: RawTable,
    pub current_students: RawTable,
    pub enrollments: RawTable,
    pub attendance: RawTable,
    pub classifications: RawTable,
    pub course_results: RawTable,
}

impl LoadedTables {
    fn from_map(mut tables: HashMap<DatasetKind, RawTable>) -> Result<Self> {
        let mut take = |kind: DatasetKind| {
            tables
                .remove(&kind)
                .ok_or_else(|| EngineError::Internal(format!("dataset {kind} was not loaded")))
        };
        Ok(Self {
            admissions: take(DatasetKind::Admissions)?,
            current_students: take(DatasetKind::CurrentStudents)?,
            enrollments: take(DatasetKind::Enrollments)?,
            attendance: take(DatasetKind::Attendance)?,
            classifications: take(DatasetKind::Classifications)?,
            course_results: take(DatasetKind::CourseResults)?,
        })
    }
}

/// Fetches, validates, normalizes and indexes all six datasets.
///
/// `on_progress` is called once per dataset in completion order.
///
/// # Examples
///
/// ```rust,no_run
/// use cohort_engine::config::DatasetPaths;
/// use cohort_engine::snapshot::{load_snapshot, LoadOptions};
/// use cohort_engine::sources::{CsvOptions, SnapshotSources};
///
/// # async fn example() -> cohort_engine::error::Result<()> {
/// let sources = SnapshotSources::from_directory("data", &DatasetPaths::default(), CsvOptions::default());
/// let snapshot = load_snapshot(&sources, &LoadOptions::default(), |p| {
///     println!("{}/{} {}", p.completed, p.total, p.dataset);
/// })
/// .await?;
/// println!("{} students", snapshot.students.len());
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(validate_schema = options.validate_schema))]
pub async fn load_snapshot<F>(
    sources: &SnapshotSources,
    options: &LoadOptions,
    mut on_progress: F,
) -> Result<Snapshot>
where
    F: FnMut(LoadProgress),
{
    let start = Instant::now();
    let total = DatasetKind::ALL.len();

    let mut pending: FuturesUnordered<_> = sources
        .iter()
        .map(|(kind, source)| {
            let source = Arc::clone(source);
            async move { (kind, source.fetch().await) }
        })
        .collect();

    let mut tables = HashMap::with_capacity(total);
    while let Some((kind, result)) = pending.next().await {
        let table = result?;
        if options.validate_schema {
            normalize::validate_columns(kind, &table)?;
        }
        info!(dataset = %kind, rows = table.len(), "Dataset fetched");
        tables.insert(kind, table);
        on_progress(LoadProgress {
            completed: tables.len(),
            total,
            dataset: kind,
        });
    }

    let snapshot = build_snapshot(LoadedTables::from_map(tables)?, &options.normalize);
    info!(
        applicants = snapshot.applicants.len(),
        students = snapshot.students.len(),
        academic_years = snapshot.academic_years().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Normalizes raw tables and builds the snapshot. Never fails.
pub fn build_snapshot(tables: LoadedTables, options: &NormalizeOptions) -> Snapshot {
    Snapshot::new(
        normalize::normalize_admissions(
            &tables.admissions.rows,
            AdmissionsView::AllApplicants,
            options,
        ),
        normalize::normalize_current_students(&tables.current_students.rows),
        normalize::normalize_enrollments(&tables.enrollments.rows),
        normalize::normalize_course_results(&tables.course_results.rows),
        normalize::normalize_attendance(&tables.attendance.rows),
        normalize::normalize_classifications(&tables.classifications.rows),
    )
}
