//! Ordinary least squares trend fitting and forecasting.
//!
//! Observations are indexed by ordinal position `1..=n` rather than by
//! calendar year so irregular year labels do not distort the fit.

use crate::config::ConfidenceLevel;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Degrees of freedom with tabulated two-tailed critical values.
const T_TABLE_DF: [f64; 16] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 15.0, 20.0, 30.0, 60.0, 120.0,
];

const T_TABLE_90: [f64; 16] = [
    6.314, 2.920, 2.353, 2.132, 2.015, 1.943, 1.895, 1.860, 1.833, 1.812, 1.782, 1.753, 1.725,
    1.697, 1.671, 1.658,
];

const T_TABLE_95: [f64; 16] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.179, 2.131, 2.086,
    2.042, 2.000, 1.980,
];

const T_TABLE_99: [f64; 16] = [
    63.657, 9.925, 5.841, 4.604, 4.032, 3.707, 3.499, 3.355, 3.250, 3.169, 3.055, 2.947, 2.845,
    2.750, 2.660, 2.617,
];

static ACADEMIC_YEAR_LABEL: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(\d{4})([/-])(\d{2})$").expect("Hard-coded regex pattern should be valid")
});

static CALENDAR_YEAR_LABEL: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(\d{4})$").expect("Hard-coded regex pattern should be valid")
});

/// Two-tailed critical value of Student's t distribution.
///
/// Values between tabulated degrees of freedom are interpolated linearly;
/// beyond the table the normal approximation is used.
pub fn t_critical(df: usize, level: ConfidenceLevel) -> f64 {
    let table = match level {
        ConfidenceLevel::Ninety => &T_TABLE_90,
        ConfidenceLevel::NinetyFive => &T_TABLE_95,
        ConfidenceLevel::NinetyNine => &T_TABLE_99,
    };
    let df = df.max(1) as f64;
    let last = T_TABLE_DF.len() - 1;
    if df > T_TABLE_DF[last] {
        return level.normal_critical_value();
    }
    for i in 0..last {
        let (lo, hi) = (T_TABLE_DF[i], T_TABLE_DF[i + 1]);
        if df == lo {
            return table[i];
        }
        if df < hi {
            let fraction = (df - lo) / (hi - lo);
            return table[i] + fraction * (table[i + 1] - table[i]);
        }
    }
    table[last]
}

/// A fitted straight line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Residual sum of squares over `n - 2`
    pub mse: f64,
    pub mean_x: f64,
    /// Sum of squared deviations of `x`
    pub sxx: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Standard error of the mean response at `x`.
    pub fn mean_response_error(&self, x: f64) -> f64 {
        let leverage = 1.0 / self.n as f64 + (x - self.mean_x).powi(2) / self.sxx;
        (self.mse * leverage).max(0.0).sqrt()
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.n - 2
    }
}

/// Fits a line to `values` at positions `1..=n`. Needs at least three points.
pub fn fit_sequential(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let mean_x = (nf + 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;

    let (mut sxx, mut sxy, mut sst) = (0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let dx = (i + 1) as f64 - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        sst += dy * dy;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let ssr: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &y)| (y - (intercept + slope * (i + 1) as f64)).powi(2))
        .sum();
    let r_squared = if sst == 0.0 { 0.0 } else { 1.0 - ssr / sst };

    Some(LinearFit {
        n,
        slope,
        intercept,
        r_squared,
        mse: ssr / (nf - 2.0),
        mean_x,
        sxx,
    })
}

/// One labelled value on a year axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Historical series with a linear forecast and its confidence band.
///
/// `forecast`, `lower` and `upper` share one axis that begins at the last
/// observed position. That first point holds the fitted value there, with its
/// own confidence band, so a forecast line joins the historical axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub historical: Vec<SeriesPoint>,
    pub forecast: Vec<SeriesPoint>,
    pub lower: Vec<SeriesPoint>,
    pub upper: Vec<SeriesPoint>,
    pub fit: LinearFit,
    pub confidence: ConfidenceLevel,
}

/// Fits `values` and projects `steps` positions ahead.
///
/// `labels` name the historical positions and are extended for the forecast
/// positions, see [`next_label`]. Returns `None` for fewer than three points.
pub fn forecast(
    labels: &[String],
    values: &[f64],
    steps: usize,
    confidence: ConfidenceLevel,
) -> Option<Forecast> {
    let fit = fit_sequential(values)?;
    let n = values.len();
    let t = t_critical(fit.degrees_of_freedom(), confidence);

    let historical: Vec<SeriesPoint> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let label = labels.get(i).cloned().unwrap_or_else(|| (i + 1).to_string());
            SeriesPoint::new(label, v)
        })
        .collect();

    let last_label = historical.last()?.label.clone();
    let mut forecast = Vec::with_capacity(steps + 1);
    let mut lower = Vec::with_capacity(steps + 1);
    let mut upper = Vec::with_capacity(steps + 1);

    for step in 0..=steps {
        let x = (n + step) as f64;
        let label = if step == 0 {
            last_label.clone()
        } else {
            next_label(&last_label, step)
        };
        let value = fit.predict(x);
        let margin = t * fit.mean_response_error(x);
        forecast.push(SeriesPoint::new(label.clone(), value));
        lower.push(SeriesPoint::new(label.clone(), value - margin));
        upper.push(SeriesPoint::new(label, value + margin));
    }

    Some(Forecast {
        historical,
        forecast,
        lower,
        upper,
        fit,
        confidence,
    })
}

/// Label of the position `step` places after `last`.
///
/// `2023/24` advances to `2024/25`, `2023` to `2024`; any other label yields
/// `+step`.
pub fn next_label(last: &str, step: usize) -> String {
    let step_years = step as i32;
    if let Some(caps) = ACADEMIC_YEAR_LABEL.captures(last) {
        if let Ok(start) = caps[1].parse::<i32>() {
            let year = start + step_years;
            return format!("{year}{}{:02}", &caps[2], (year + 1).rem_euclid(100));
        }
    }
    if let Some(caps) = CALENDAR_YEAR_LABEL.captures(last) {
        if let Ok(year) = caps[1].parse::<i32>() {
            return (year + step_years).to_string();
        }
    }
    format!("+{step}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_t_critical_table_and_fallback() {
        assert_eq!(t_critical(1, ConfidenceLevel::NinetyFive), 12.706);
        assert_eq!(t_critical(10, ConfidenceLevel::NinetyFive), 2.228);
        assert_eq!(t_critical(500, ConfidenceLevel::NinetyFive), 1.96);
        assert_eq!(t_critical(500, ConfidenceLevel::Ninety), 1.645);
        assert_eq!(t_critical(3, ConfidenceLevel::NinetyNine), 5.841);
        assert_eq!(t_critical(120, ConfidenceLevel::NinetyFive), 1.980);
    }

    #[test]
    fn test_t_critical_interpolates() {
        // halfway between df 10 (2.228) and 12 (2.179)
        let t = t_critical(11, ConfidenceLevel::NinetyFive);
        assert!((t - 2.2035).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_line() {
        let fit = fit_sequential(&[100.0, 120.0, 140.0, 160.0, 180.0]).unwrap();
        assert!((fit.slope - 20.0).abs() < 1e-9);
        assert!((fit.intercept - 80.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.mse.abs() < 1e-12);
    }

    #[test]
    fn test_flat_series_has_zero_r_squared() {
        let fit = fit_sequential(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn test_too_few_points() {
        assert!(fit_sequential(&[1.0, 2.0]).is_none());
        assert!(forecast(&[], &[], 2, ConfidenceLevel::NinetyFive).is_none());
    }

    #[test]
    fn test_forecast_anchor_uses_fitted_value() {
        // fitted line is 84 + 20x with mse 40
        let years = labels(&["2019/20", "2020/21", "2021/22", "2022/23", "2023/24"]);
        let result = forecast(
            &years,
            &[100.0, 130.0, 140.0, 170.0, 180.0],
            1,
            ConfidenceLevel::NinetyFive,
        )
        .unwrap();

        let anchor = &result.forecast[0];
        assert_eq!(anchor.label, "2023/24");
        assert!((anchor.value - 184.0).abs() < 1e-9);
        assert_ne!(anchor.value, result.historical[4].value);

        let half_width = 3.182 * 24.0_f64.sqrt();
        assert!((result.upper[0].value - (184.0 + half_width)).abs() < 1e-9);
        assert!((result.lower[0].value - (184.0 - half_width)).abs() < 1e-9);
        assert_eq!(result.upper[0].label, "2023/24");
    }

    #[test]
    fn test_forecast_axis_starts_at_last_observation() {
        let years = labels(&["2019/20", "2020/21", "2021/22", "2022/23", "2023/24"]);
        let result = forecast(
            &years,
            &[100.0, 120.0, 140.0, 160.0, 180.0],
            2,
            ConfidenceLevel::NinetyFive,
        )
        .unwrap();
        assert_eq!(result.forecast.len(), 3);
        assert_eq!(result.forecast[0], SeriesPoint::new("2023/24", 180.0));
        assert_eq!(result.forecast[1].label, "2024/25");
        assert!((result.forecast[1].value - 200.0).abs() < 1e-9);
        assert!((result.upper[1].value - result.lower[1].value).abs() < 1e-9);
        assert_eq!(result.lower.len(), result.forecast.len());
    }

    #[test]
    fn test_band_widens_with_distance() {
        let result = forecast(
            &labels(&["a", "b", "c", "d"]),
            &[10.0, 14.0, 11.0, 17.0],
            3,
            ConfidenceLevel::NinetyFive,
        )
        .unwrap();
        let widths: Vec<f64> = result
            .upper
            .iter()
            .zip(&result.lower)
            .map(|(u, l)| u.value - l.value)
            .collect();
        assert!(widths[1] > 0.0);
        assert!(widths[2] > widths[1]);
        assert!(widths[3] > widths[2]);
        assert_eq!(result.forecast[1].label, "+1");
    }

    #[test]
    fn test_next_label_formats() {
        assert_eq!(next_label("2023/24", 1), "2024/25");
        assert_eq!(next_label("2098-99", 2), "2100-01");
        assert_eq!(next_label("2023", 3), "2026");
        assert_eq!(next_label("Year 5", 1), "+1");
    }
}
