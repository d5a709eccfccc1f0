//! Statistical routines: chi-square independence testing and OLS trend
//! forecasting, together with the incomplete gamma function they rest on.

pub mod chi_square;
pub mod gamma;
pub mod regression;

pub use chi_square::{chi_square_independence, chi_square_p_value, ChiSquareResult, ContingencyTable};
pub use gamma::{ln_gamma, regularized_gamma_p, regularized_gamma_q};
pub use regression::{fit_sequential, forecast, next_label, t_critical, Forecast, LinearFit, SeriesPoint};
