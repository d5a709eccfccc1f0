//! Pearson chi-square test of independence.

use super::gamma::regularized_gamma_q;
use serde::{Deserialize, Serialize};

/// Observed counts, one row per group and one column per outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    pub fn new(column_labels: Vec<String>) -> Self {
        Self {
            row_labels: Vec::new(),
            column_labels,
            counts: Vec::new(),
        }
    }

    /// Appends a row. Missing trailing counts are taken as zero.
    pub fn push_row(&mut self, label: impl Into<String>, mut counts: Vec<u64>) {
        counts.resize(self.column_labels.len(), 0);
        self.row_labels.push(label.into());
        self.counts.push(counts);
    }

    pub fn rows(&self) -> usize {
        self.counts.len()
    }

    pub fn columns(&self) -> usize {
        self.column_labels.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

/// Outcome of a chi-square test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    /// Total observations
    pub n: u64,
    pub chi_square: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub significant: bool,
}

impl ChiSquareResult {
    /// Result reported when there are too few groups to test.
    pub fn neutral() -> Self {
        Self {
            n: 0,
            chi_square: 0.0,
            degrees_of_freedom: 0,
            p_value: 1.0,
            significant: false,
        }
    }
}

/// Upper-tail probability of the chi-square distribution.
///
/// Returns `1.0` when `df` is zero or the statistic is not positive.
pub fn chi_square_p_value(statistic: f64, df: usize) -> f64 {
    if df == 0 || statistic <= 0.0 || !statistic.is_finite() {
        return 1.0;
    }
    regularized_gamma_q(df as f64 / 2.0, statistic / 2.0)
}

/// Tests whether the row and column variables are independent.
///
/// Rows whose total is zero carry no information and are dropped before the
/// test. With fewer than two informative rows or columns the neutral result
/// is returned.
pub fn chi_square_independence(table: &ContingencyTable, significance_level: f64) -> ChiSquareResult {
    let rows: Vec<&Vec<u64>> = table
        .counts
        .iter()
        .filter(|row| row.iter().sum::<u64>() > 0)
        .collect();
    let columns = table.columns();
    if rows.len() < 2 || columns < 2 {
        return ChiSquareResult::neutral();
    }

    let row_totals: Vec<f64> = rows.iter().map(|row| row.iter().sum::<u64>() as f64).collect();
    let column_totals: Vec<f64> = (0..columns)
        .map(|j| rows.iter().map(|row| row[j]).sum::<u64>() as f64)
        .collect();
    let grand_total: f64 = row_totals.iter().sum();

    let mut statistic = 0.0;
    for (i, row) in rows.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_totals[i] * column_totals[j] / grand_total;
            if expected > 0.0 {
                statistic += (observed as f64 - expected).powi(2) / expected;
            }
        }
    }

    let df = (rows.len() - 1) * (columns - 1);
    let p_value = chi_square_p_value(statistic, df);
    ChiSquareResult {
        n: grand_total as u64,
        chi_square: statistic,
        degrees_of_freedom: df,
        p_value,
        significant: p_value < significance_level,
    }
}
