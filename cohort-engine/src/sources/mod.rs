//! Dataset sources for cohort snapshots.
//!
//! A snapshot is always built from exactly six sources, one per dataset kind.
//! Sources only deliver raw header-keyed rows; typing happens in
//! [`crate::normalize`].

use crate::config::DatasetPaths;
use crate::error::Result;
use crate::normalize::RawTable;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::Path;
use std::sync::Arc;

mod csv;
mod memory;

pub use csv::{CsvOptions, CsvSource};
pub use memory::InMemorySource;

/// The six dataset kinds making up a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Admissions,
    CurrentStudents,
    Enrollments,
    Attendance,
    Classifications,
    CourseResults,
}

impl DatasetKind {
    /// All kinds in load order.
    pub const ALL: [DatasetKind; 6] = [
        Self::Admissions,
        Self::CurrentStudents,
        Self::Enrollments,
        Self::Attendance,
        Self::Classifications,
        Self::CourseResults,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Admissions => "admissions",
            Self::CurrentStudents => "current_students",
            Self::Enrollments => "enrollments",
            Self::Attendance => "attendance",
            Self::Classifications => "classifications",
            Self::CourseResults => "course_results",
        }
    }

    /// Parses a dataset name as produced by [`DatasetKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A source able to deliver the raw rows of one dataset.
///
/// # Examples
///
/// ```rust,no_run
/// use cohort_engine::sources::{CsvOptions, CsvSource, DatasetKind, DatasetSource};
///
/// # async fn example() -> cohort_engine::error::Result<()> {
/// let source = CsvSource::new(DatasetKind::Attendance, "data/attendance.csv", CsvOptions::default());
/// let table = source.fetch().await?;
/// println!("{} rows from {}", table.len(), source.description());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DatasetSource: Debug + Send + Sync {
    /// Retrieves every row of the dataset.
    ///
    /// Failures are reported as [`crate::error::EngineError::Fetch`] naming
    /// the dataset.
    async fn fetch(&self) -> Result<RawTable>;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}

/// Exactly one source per dataset kind.
#[derive(Debug, Clone)]
pub struct SnapshotSources {
    pub admissions: Arc<dyn DatasetSource>,
    pub current_students: Arc<dyn DatasetSource>,
    pub enrollments: Arc<dyn DatasetSource>,
    pub attendance: Arc<dyn DatasetSource>,
    pub classifications: Arc<dyn DatasetSource>,
    pub course_results: Arc<dyn DatasetSource>,
}

impl SnapshotSources {
    /// CSV sources for the six files under `dir`.
    pub fn from_directory(dir: impl AsRef<Path>, paths: &DatasetPaths, options: CsvOptions) -> Self {
        let dir = dir.as_ref();
        let csv = |kind: DatasetKind| -> Arc<dyn DatasetSource> {
            Arc::new(CsvSource::new(kind, paths.resolve(dir, kind), options.clone()))
        };
        Self {
            admissions: csv(DatasetKind::Admissions),
            current_students: csv(DatasetKind::CurrentStudents),
            enrollments: csv(DatasetKind::Enrollments),
            attendance: csv(DatasetKind::Attendance),
            classifications: csv(DatasetKind::Classifications),
            course_results: csv(DatasetKind::CourseResults),
        }
    }

    pub fn get(&self, kind: DatasetKind) -> &Arc<dyn DatasetSource> {
        match kind {
            DatasetKind::Admissions => &self.admissions,
            DatasetKind::CurrentStudents => &self.current_students,
            DatasetKind::Enrollments => &self.enrollments,
            DatasetKind::Attendance => &self.attendance,
            DatasetKind::Classifications => &self.classifications,
            DatasetKind::CourseResults => &self.course_results,
        }
    }

    /// Iterates over `(kind, source)` pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = (DatasetKind, &Arc<dyn DatasetSource>)> {
        DatasetKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}
