//! Empirical quantiles with selectable interpolation
//!
//! The quantile position is `h = (n - 1) * p` over the sorted sample; the
//! methods differ only in how they resolve a fractional `h`. `Linear` is the
//! common default of dataframe libraries (Hyndman-Fan type 7).

use levelshift_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a quantile between two order statistics is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// `x[lo] + (h - lo) * (x[hi] - x[lo])`
    #[default]
    Linear,
    /// `x[lo]`
    Lower,
    /// `x[hi]`
    Higher,
    /// Closest order statistic, ties to the even index
    Nearest,
    /// `(x[lo] + x[hi]) / 2`
    Midpoint,
}

/// Quantile `p` of `values`.
///
/// NaN values are ignored. An empty (or all-NaN) sample yields `NaN`; a
/// probability outside `[0, 1]` is an error.
pub fn quantile(values: &[f64], p: f64, method: Interpolation) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::invalid_probability(p));
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return Ok(f64::NAN);
    }
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    let (x_lo, x_hi) = (sorted[lo], sorted[hi]);

    let q = match method {
        Interpolation::Linear if lo == hi => x_lo,
        Interpolation::Linear => x_lo + frac * (x_hi - x_lo),
        Interpolation::Lower => x_lo,
        Interpolation::Higher => x_hi,
        Interpolation::Nearest => {
            if frac < 0.5 || (frac == 0.5 && lo % 2 == 0) {
                x_lo
            } else {
                x_hi
            }
        }
        Interpolation::Midpoint => (x_lo + x_hi) / 2.0,
    };
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LEVELS: [f64; 5] = [10.0, 20.0, 30.0, 90.0, 95.0];

    #[test]
    fn test_linear() {
        assert_relative_eq!(quantile(&LEVELS, 0.8, Interpolation::Linear).unwrap(), 91.0);
        assert_relative_eq!(quantile(&LEVELS, 0.5, Interpolation::Linear).unwrap(), 30.0);
        assert_relative_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5, Interpolation::Linear).unwrap(), 2.5);
    }

    #[test]
    fn test_other_methods() {
        assert_eq!(quantile(&LEVELS, 0.8, Interpolation::Lower).unwrap(), 90.0);
        assert_eq!(quantile(&LEVELS, 0.8, Interpolation::Higher).unwrap(), 95.0);
        assert_eq!(quantile(&LEVELS, 0.8, Interpolation::Nearest).unwrap(), 90.0);
        assert_eq!(quantile(&LEVELS, 0.8, Interpolation::Midpoint).unwrap(), 92.5);
    }

    #[test]
    fn test_nearest_ties_to_even() {
        // h = 0.5 -> index 0; h = 1.5 -> index 2
        assert_eq!(quantile(&[1.0, 2.0], 0.5, Interpolation::Nearest).unwrap(), 1.0);
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5, Interpolation::Nearest).unwrap(), 3.0);
    }

    #[test]
    fn test_unsorted_input_and_nan() {
        let values = [95.0, f64::NAN, 10.0, 90.0, 30.0, 20.0];
        assert_relative_eq!(quantile(&values, 0.8, Interpolation::Linear).unwrap(), 91.0);
    }

    #[test]
    fn test_edges() {
        assert_eq!(quantile(&LEVELS, 0.0, Interpolation::Linear).unwrap(), 10.0);
        assert_eq!(quantile(&LEVELS, 1.0, Interpolation::Linear).unwrap(), 95.0);
        assert_eq!(quantile(&[7.0], 0.3, Interpolation::Linear).unwrap(), 7.0);
        assert!(quantile(&[], 0.5, Interpolation::Linear).unwrap().is_nan());
        assert!(quantile(&LEVELS, 1.2, Interpolation::Linear).is_err());
        assert!(quantile(&LEVELS, f64::NAN, Interpolation::Linear).is_err());
    }
}
