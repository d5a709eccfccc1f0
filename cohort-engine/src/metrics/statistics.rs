//! Inferential statistics over the filtered view.

use super::Metrics;
use crate::stats::{chi_square_independence, forecast, ChiSquareResult, ContingencyTable, Forecast};
use std::collections::BTreeMap;
use crate::log_metric;

/// Row label for course results whose student is not known.
const UNKNOWN_PROGRAMME: &str = "Unknown";

impl<'a> Metrics<'a> {
    /// Chi-square test of whether pass rates differ between programmes.
    ///
    /// Results of unknown students are left out. Fewer than two programmes
    /// gives the neutral result.
    pub fn pass_rate_significance(&self) -> ChiSquareResult {
        let index = self.snapshot().index();
        let mut tallies: BTreeMap<&str, [u64; 2]> = BTreeMap::new();
        for result in &self.view.course_results {
            let programme = index
                .student(&result.student_id)
                .map_or(UNKNOWN_PROGRAMME, |s| s.programme.as_str());
            let column = if result.passed() { 0 } else { 1 };
            tallies.entry(programme).or_default()[column] += 1;
        }

        let mut table = ContingencyTable::new(vec!["Passed".to_string(), "Failed".to_string()]);
        for (programme, counts) in tallies {
            if programme != UNKNOWN_PROGRAMME {
                table.push_row(programme, counts.to_vec());
            }
        }
        let result = chi_square_independence(&table, self.stats.significance_level);
        log_metric!(
            self.log,
            programmes = table.rows(),
            chi_square = result.chi_square,
            p_value = result.p_value,
            "Pass rate significance computed"
        );
        result
    }

    /// Linear forecast of distinct enrolled students per year.
    ///
    /// `forecast_count` defaults to the configured number of years. Returns
    /// `None` with fewer than three observed years.
    pub fn enrollment_prediction(&self, forecast_count: Option<usize>) -> Option<Forecast> {
        let by_year = self.enrollment_by_year();
        let labels: Vec<String> = by_year.iter().map(|y| y.year.clone()).collect();
        let values: Vec<f64> = by_year.iter().map(|y| y.count as f64).collect();
        let steps = forecast_count.unwrap_or(self.stats.default_forecast_count);
        let prediction = forecast(&labels, &values, steps, self.stats.confidence);
        log_metric!(
            self.log,
            years = values.len(),
            steps,
            fitted = prediction.is_some(),
            "Enrollment prediction computed"
        );
        prediction
    }
}
