//! Sample moments: mean, standard deviation, skewness and kurtosis
//!
//! All four moments come from one code path so they share one bias
//! convention:
//!
//! | moment | estimator | minimum n |
//! |--------|-----------|-----------|
//! | mean | arithmetic mean | 1 |
//! | std | sample standard deviation (n - 1) | 2 |
//! | skew | adjusted Fisher-Pearson G1 | 3 |
//! | kurtosis | Fisher G2, excess (normal = 0) | 4 |
//!
//! These are the bias-corrected estimators most dataframe libraries report
//! for `skew()` and `kurt()`. Below the minimum count, or when the sample
//! has zero variance, the higher moments are `NaN`.

use levelshift_core::math::{self, Ddof};
use serde::{Deserialize, Serialize};

/// Descriptive moments of one group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentSet {
    /// Number of observations the moments were computed over
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `>= 0` when defined
    pub std: f64,
    pub skew: f64,
    /// Excess kurtosis
    pub kurtosis: f64,
}

impl MomentSet {
    /// Compute all moments of `values`
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        let mean = math::mean(values);
        let std = math::std_dev(values, Ddof::Sample);

        Self {
            count: n,
            mean,
            std,
            skew: skew_from_parts(values, mean),
            kurtosis: kurtosis_from_parts(values, mean),
        }
    }

    /// Whether a z-score can be computed against this group
    pub fn has_usable_std(&self) -> bool {
        self.std.is_finite() && self.std > 0.0
    }

    /// Whether every moment is defined
    pub fn is_complete(&self) -> bool {
        self.mean.is_finite()
            && self.std.is_finite()
            && self.skew.is_finite()
            && self.kurtosis.is_finite()
    }

    /// Standardized deviation of `value`, `None` when the group std is zero or undefined
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if !self.has_usable_std() {
            return None;
        }
        let z = (value - self.mean) / self.std;
        z.is_finite().then_some(z)
    }
}

/// Adjusted Fisher-Pearson skewness (G1)
pub fn sample_skewness(values: &[f64]) -> f64 {
    skew_from_parts(values, math::mean(values))
}

/// Fisher's unbiased excess kurtosis (G2)
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    kurtosis_from_parts(values, math::mean(values))
}

fn skew_from_parts(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 3 || math::is_constant(values) {
        return f64::NAN;
    }

    let nf = n as f64;
    let (s2, s3) = values.iter().fold((0.0, 0.0), |(s2, s3), &x| {
        let d = x - mean;
        (s2 + d * d, s3 + d * d * d)
    });
    if s2 == 0.0 {
        return f64::NAN;
    }

    let m2 = s2 / nf;
    let m3 = s3 / nf;
    let g1 = m3 / m2.powf(1.5);
    g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0)
}

fn kurtosis_from_parts(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 4 || math::is_constant(values) {
        return f64::NAN;
    }

    let nf = n as f64;
    let (s2, s4) = values.iter().fold((0.0, 0.0), |(s2, s4), &x| {
        let d2 = (x - mean) * (x - mean);
        (s2 + d2, s4 + d2 * d2)
    });
    if s2 == 0.0 {
        return f64::NAN;
    }

    let numerator = nf * (nf + 1.0) * (nf - 1.0) * s4;
    let denominator = (nf - 2.0) * (nf - 3.0) * s2 * s2;
    let adjustment = 3.0 * (nf - 1.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0));
    numerator / denominator - adjustment
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_observation() {
        let m = MomentSet::from_values(&[4.2]);
        assert_eq!(m.count, 1);
        assert_eq!(m.mean, 4.2);
        assert!(m.std.is_nan());
        assert!(m.skew.is_nan());
        assert!(m.kurtosis.is_nan());
        assert_eq!(m.z_score(4.2), None);
    }

    #[test]
    fn test_identical_values() {
        let m = MomentSet::from_values(&[0.3, 0.3, 0.3, 0.3, 0.3]);
        assert_eq!(m.std, 0.0);
        assert!(m.skew.is_nan());
        assert!(m.kurtosis.is_nan());
        assert!(!m.has_usable_std());
        assert_eq!(m.z_score(0.3), None);
    }

    #[test]
    fn test_symmetric_sample() {
        let m = MomentSet::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(m.mean, 3.0);
        assert_relative_eq!(m.std, 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(m.skew, 0.0, epsilon = 1e-12);
        assert_relative_eq!(m.kurtosis, -1.2, epsilon = 1e-12);
        assert!(m.is_complete());
    }

    #[test]
    fn test_right_skewed_sample() {
        let skew = sample_skewness(&[1.0, 2.0, 3.0, 4.0, 10.0]);
        assert_relative_eq!(skew, 1.697_056_274_847_714, epsilon = 1e-9);
    }

    #[test]
    fn test_minimum_counts() {
        let two = MomentSet::from_values(&[1.0, 3.0]);
        assert_relative_eq!(two.std, 2.0_f64.sqrt());
        assert!(two.skew.is_nan());
        assert!(two.kurtosis.is_nan());

        let three = MomentSet::from_values(&[1.0, 2.0, 6.0]);
        assert!(three.skew.is_finite());
        assert!(three.kurtosis.is_nan());

        assert!(excess_kurtosis(&[1.0, 2.0, 3.0, 7.0]).is_finite());
    }

    #[test]
    fn test_heavy_tails_have_positive_kurtosis() {
        let data = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0, -10.0];
        assert!(excess_kurtosis(&data) > 0.0);
    }

    #[test]
    fn test_z_score() {
        let m = MomentSet::from_values(&[2.0, 4.0, 6.0]);
        assert_relative_eq!(m.z_score(6.0).unwrap(), 1.0);
        assert_relative_eq!(m.z_score(2.0).unwrap(), -1.0);
    }
}
