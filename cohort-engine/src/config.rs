//! Engine configuration.
//!
//! All statistical thresholds live here rather than inside the calculations
//! so that callers can state and override them.

use crate::logging::LogConfig;
use crate::sources::DatasetKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Two-sided confidence level for forecast bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Ninety,
    #[default]
    NinetyFive,
    NinetyNine,
}

impl ConfidenceLevel {
    /// The level as a fraction, e.g. `0.95`.
    pub fn fraction(&self) -> f64 {
        match self {
            Self::Ninety => 0.90,
            Self::NinetyFive => 0.95,
            Self::NinetyNine => 0.99,
        }
    }

    /// Normal-approximation critical value used for large degrees of freedom.
    pub fn normal_critical_value(&self) -> f64 {
        match self {
            Self::Ninety => 1.645,
            Self::NinetyFive => 1.96,
            Self::NinetyNine => 2.576,
        }
    }
}

/// Parameters of the statistical routines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// p-values strictly below this are significant
    pub significance_level: f64,
    /// Confidence level of forecast bands
    pub confidence: ConfidenceLevel,
    /// Forecast steps used when the caller does not specify one
    pub default_forecast_count: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            confidence: ConfidenceLevel::NinetyFive,
            default_forecast_count: 2,
        }
    }
}

impl StatsConfig {
    /// A stricter configuration: 1% significance, 99% bands.
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            confidence: ConfidenceLevel::NinetyNine,
            ..Self::default()
        }
    }

    pub fn with_significance_level(mut self, level: f64) -> Self {
        self.significance_level = level;
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_default_forecast_count(mut self, count: usize) -> Self {
        self.default_forecast_count = count;
        self
    }
}

/// Options for record normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Date ages are computed against
    pub reference_date: NaiveDate,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            reference_date: chrono::Local::now().date_naive(),
        }
    }
}

impl NormalizeOptions {
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }
}

/// File names of the six datasets, relative to a data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub admissions: PathBuf,
    pub current_students: PathBuf,
    pub enrollments: PathBuf,
    pub attendance: PathBuf,
    pub classifications: PathBuf,
    pub course_results: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            admissions: "01_Admissions_Synthetic_Data.csv".into(),
            current_students: "02_COMBINED_Current_Students_All_Years.csv".into(),
            enrollments: "03_COMBINED_Course_Enrolments_All_Years.csv".into(),
            attendance: "04_COMBINED_Attendance_All_Years.csv".into(),
            classifications: "05_Degree_Classifications.csv".into(),
            course_results: "06_COMBINED_Course_Results_All_Years.csv".into(),
        }
    }
}

impl DatasetPaths {
    pub fn get(&self, kind: DatasetKind) -> &Path {
        match kind {
            DatasetKind::Admissions => &self.admissions,
            DatasetKind::CurrentStudents => &self.current_students,
            DatasetKind::Enrollments => &self.enrollments,
            DatasetKind::Attendance => &self.attendance,
            DatasetKind::Classifications => &self.classifications,
            DatasetKind::CourseResults => &self.course_results,
        }
    }

    /// Resolves the file for `kind` against `dir`. Absolute paths are kept.
    pub fn resolve(&self, dir: &Path, kind: DatasetKind) -> PathBuf {
        dir.join(self.get(kind))
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub stats: StatsConfig,
    pub normalize: NormalizeOptions,
    #[serde(skip)]
    pub log: LogConfig,
}

impl EngineConfig {
    pub fn with_stats(mut self, stats: StatsConfig) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_defaults() {
        let config = StatsConfig::default();
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.confidence, ConfidenceLevel::NinetyFive);
        assert_eq!(config.default_forecast_count, 2);
    }

    #[test]
    fn test_strict_preset() {
        let config = StatsConfig::strict();
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.confidence.normal_critical_value(), 2.576);
    }

    #[test]
    fn test_dataset_paths_resolve() {
        let paths = DatasetPaths::default();
        let resolved = paths.resolve(Path::new("/data"), DatasetKind::Classifications);
        assert_eq!(resolved, PathBuf::from("/data/05_Degree_Classifications.csv"));

        let absolute = DatasetPaths {
            attendance: "/srv/attendance.csv".into(),
            ..Default::default()
        };
        assert_eq!(
            absolute.resolve(Path::new("/data"), DatasetKind::Attendance),
            PathBuf::from("/srv/attendance.csv")
        );
    }

    #[test]
    fn test_engine_config_serde_skips_logging() {
        let config = EngineConfig::default().with_stats(StatsConfig::strict());
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stats, config.stats);
        assert!(!json.contains("log"));
    }
}
