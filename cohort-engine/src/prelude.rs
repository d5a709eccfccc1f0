//! Prelude for commonly used types and traits in cohort-engine.

pub use crate::config::{ConfidenceLevel, DatasetPaths, EngineConfig, NormalizeOptions, StatsConfig};
pub use crate::engine::Engine;
pub use crate::error::{EngineError, Result};
pub use crate::filter::{apply_filters, FilterSet, FilteredView};
pub use crate::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, MetricsReport, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::metrics::{GroupedCounts, LabelCount, Metrics, Transition};
pub use crate::records::{
    Applicant, ApplicantStatus, AttendanceRecord, Classification, CoarseBand, CourseEnrollment,
    CourseResult, CurrentStudent, DegreeClass,
};
pub use crate::snapshot::{Collection, LoadOptions, LoadProgress, Snapshot};
pub use crate::sources::{CsvOptions, DatasetKind, DatasetSource, InMemorySource, SnapshotSources};
pub use crate::stats::{ChiSquareResult, Forecast};
