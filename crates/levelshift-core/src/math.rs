//! Descriptive statistics shared across the levelshift crates
//!
//! Every function returns `NaN` when its statistic is undefined for the
//! input (empty slice, too few points for the requested degrees of
//! freedom). Callers decide whether NaN means "exclude"; nothing here
//! substitutes a default.

use serde::{Deserialize, Serialize};

/// Delta degrees of freedom for variance estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ddof {
    /// Divide by `n`
    Population,
    /// Divide by `n - 1`
    #[default]
    Sample,
}

impl Ddof {
    pub fn value(&self) -> usize {
        match self {
            Self::Population => 0,
            Self::Sample => 1,
        }
    }
}

/// True when every value is bitwise-equal to the first one
pub fn is_constant(values: &[f64]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => true,
    }
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    // Summing identical values can drift in the last bit; keep them exact
    if is_constant(values) {
        return values[0];
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of squared deviations from the mean
pub fn sum_squared_deviations(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|&x| (x - mean) * (x - mean)).sum()
}

/// Variance with the given degrees of freedom.
///
/// A constant sample has a variance of exactly zero.
pub fn variance(values: &[f64], ddof: Ddof) -> f64 {
    let n = values.len();
    if n == 0 || n <= ddof.value() {
        return f64::NAN;
    }
    if is_constant(values) {
        return 0.0;
    }
    let m = mean(values);
    sum_squared_deviations(values, m) / (n - ddof.value()) as f64
}

/// Standard deviation with the given degrees of freedom
pub fn std_dev(values: &[f64], ddof: Ddof) -> f64 {
    variance(values, ddof).sqrt()
}

/// Largest value, `NaN` for an empty slice
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::max)
}

/// Smallest value, `NaN` for an empty slice
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NAN, f64::min)
}
