//! Spike filter: separates level shifts from single-point outliers
//!
//! An entity whose historical peak is itself an outlier under a normal
//! approximation, `max > mean + z * std` over its full series, is treated as
//! spike-driven and removed. The test is one-sided: unusually low points are
//! never filtered.

use crate::candidate::ChangeCandidate;
use levelshift_core::math::{self, Ddof};
use levelshift_core::{series, Error, Result, SeriesByEntity};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Default z bound; the upper edge of a two-sided 95% normal interval
pub const DEFAULT_SPIKE_Z: f64 = 1.96;

/// Summary of one entity's raw series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub max: f64,
}

impl SeriesSummary {
    pub fn from_values(values: &[f64], ddof: Ddof) -> Self {
        Self {
            count: values.len(),
            mean: math::mean(values),
            std: math::std_dev(values, ddof),
            max: math::max(values),
        }
    }
}

/// Outcome of assessing one entity's series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SpikeVerdict {
    /// The peak lies within the bound
    Stable,
    /// The peak exceeds `bound`
    Spike { max: f64, bound: f64 },
    /// Too few observations to estimate a spread
    InsufficientHistory { count: usize },
}

impl SpikeVerdict {
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable)
    }

    pub fn reason(&self) -> String {
        match self {
            Self::Stable => "stable".to_string(),
            Self::Spike { max, bound } => format!("peak {max:.4} exceeds bound {bound:.4}"),
            Self::InsufficientHistory { count } => {
                format!("{count} observation(s), cannot estimate spread")
            }
        }
    }
}

/// Spike filter settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeFilter {
    /// Number of standard deviations above the mean a peak may reach
    pub z_threshold: f64,
    /// Standard deviation convention for the series spread
    pub std_convention: Ddof,
}

impl Default for SpikeFilter {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_SPIKE_Z,
            std_convention: Ddof::Population,
        }
    }
}

impl SpikeFilter {
    pub fn new(z_threshold: f64, std_convention: Ddof) -> Result<Self> {
        let filter = Self { z_threshold, std_convention };
        filter.validate()?;
        Ok(filter)
    }

    /// Bound taken from a two-sided normal confidence level (0.95 -> 1.96)
    pub fn from_confidence(level: f64, std_convention: Ddof) -> Result<Self> {
        Self::new(z_for_confidence(level)?, std_convention)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.z_threshold.is_finite() || self.z_threshold < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "spike z threshold must be finite and non-negative, got {}",
                self.z_threshold
            )));
        }
        Ok(())
    }

    /// Upper bound a series' peak may reach
    pub fn bound(&self, summary: &SeriesSummary) -> f64 {
        summary.mean + self.z_threshold * summary.std
    }

    /// Assess a single series
    pub fn assess(&self, values: &[f64]) -> SpikeVerdict {
        let summary = SeriesSummary::from_values(values, self.std_convention);
        if summary.count < 2 || !summary.std.is_finite() {
            return SpikeVerdict::InsufficientHistory { count: summary.count };
        }

        let bound = self.bound(&summary);
        if summary.max > bound {
            SpikeVerdict::Spike { max: summary.max, bound }
        } else {
            SpikeVerdict::Stable
        }
    }

    /// Split candidates into the ones that pass and the ones removed, with why.
    ///
    /// A candidate whose entity has no series cannot be checked and is removed
    /// as having insufficient history.
    pub fn partition(
        &self,
        candidates: &[ChangeCandidate],
        series_by_entity: &SeriesByEntity,
    ) -> (Vec<ChangeCandidate>, Vec<(ChangeCandidate, SpikeVerdict)>) {
        let mut kept = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();

        for candidate in candidates {
            let verdict = match series_by_entity.get(&candidate.entity_code) {
                Some(points) => self.assess(&series::values(points)),
                None => SpikeVerdict::InsufficientHistory { count: 0 },
            };
            if verdict.is_stable() {
                kept.push(candidate.clone());
            } else {
                debug!(entity = %candidate.entity_code, reason = %verdict.reason(), "spike filter rejected");
                rejected.push((candidate.clone(), verdict));
            }
        }
        (kept, rejected)
    }

    /// Candidates minus those whose series is spike-driven
    pub fn filter_spikes(
        &self,
        candidates: &[ChangeCandidate],
        series_by_entity: &SeriesByEntity,
    ) -> Vec<ChangeCandidate> {
        self.partition(candidates, series_by_entity).0
    }
}

/// Remove spike-driven candidates using `z_threshold` and the default std convention
pub fn filter_spikes(
    candidates: &[ChangeCandidate],
    series_by_entity: &SeriesByEntity,
    z_threshold: f64,
) -> Result<Vec<ChangeCandidate>> {
    let filter = SpikeFilter::new(z_threshold, Ddof::Population)?;
    Ok(filter.filter_spikes(candidates, series_by_entity))
}

/// Two-sided standard normal critical value for a confidence level in (0, 1)
pub fn z_for_confidence(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "confidence level must be in (0, 1), got {level}"
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::Computation(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use levelshift_core::{Period, SeriesPoint};

    fn series_of(entries: &[(&str, &[f64])]) -> SeriesByEntity {
        let start = Period::new(2020, 1).unwrap();
        entries
            .iter()
            .map(|(code, values)| {
                let points = values
                    .iter()
                    .enumerate()
                    .map(|(i, &value)| SeriesPoint {
                        period: start.offset_months(i as i32).unwrap(),
                        value,
                    })
                    .collect();
                (code.to_string(), points)
            })
            .collect()
    }

    #[test]
    fn test_spike_rejected_level_shift_kept() {
        let filter = SpikeFilter::default();
        assert!(matches!(
            filter.assess(&[1.0, 1.0, 1.0, 1.0, 50.0]),
            SpikeVerdict::Spike { .. }
        ));
        assert_eq!(filter.assess(&[1.0, 2.0, 3.0, 8.0, 9.0]), SpikeVerdict::Stable);
    }

    #[test]
    fn test_bound_is_mean_plus_z_std() {
        let filter = SpikeFilter::default();
        let summary = SeriesSummary::from_values(&[1.0, 1.0, 1.0, 1.0, 50.0], Ddof::Population);
        assert_relative_eq!(summary.mean, 10.8);
        assert_relative_eq!(summary.std, 19.6, epsilon = 1e-12);
        assert_relative_eq!(filter.bound(&summary), 10.8 + 1.96 * 19.6, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_convention_is_more_lenient() {
        // With n - 1 in the denominator a 5-point series can never exceed 1.96 std
        let filter = SpikeFilter::new(DEFAULT_SPIKE_Z, Ddof::Sample).unwrap();
        assert_eq!(filter.assess(&[1.0, 1.0, 1.0, 1.0, 50.0]), SpikeVerdict::Stable);
    }

    #[test]
    fn test_low_spikes_are_not_filtered() {
        let filter = SpikeFilter::default();
        assert_eq!(filter.assess(&[50.0, 50.0, 50.0, 50.0, 1.0]), SpikeVerdict::Stable);
    }

    #[test]
    fn test_constant_and_short_series() {
        let filter = SpikeFilter::default();
        assert_eq!(filter.assess(&[4.0, 4.0, 4.0]), SpikeVerdict::Stable);
        assert_eq!(
            filter.assess(&[4.0]),
            SpikeVerdict::InsufficientHistory { count: 1 }
        );
    }

    #[test]
    fn test_partition_reports_missing_series() {
        let series = series_of(&[
            ("A", &[1.0, 1.0, 1.0, 1.0, 50.0]),
            ("B", &[1.0, 2.0, 3.0, 8.0, 9.0]),
        ]);
        let candidates = vec![
            ChangeCandidate::new("A", 1.0, 5, 49.0),
            ChangeCandidate::new("B", 1.0, 4, 7.0),
            ChangeCandidate::new("C", 1.0, 2, 1.0),
        ];

        let (kept, rejected) = SpikeFilter::default().partition(&candidates, &series);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity_code, "B");
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[1].1, SpikeVerdict::InsufficientHistory { count: 0 });

        let filtered = filter_spikes(&candidates, &series, DEFAULT_SPIKE_Z).unwrap();
        assert_eq!(filtered, kept);
    }

    #[test]
    fn test_from_confidence() {
        assert_relative_eq!(z_for_confidence(0.95).unwrap(), 1.959_963_984_540_054, epsilon = 1e-6);
        let filter = SpikeFilter::from_confidence(0.95, Ddof::Population).unwrap();
        assert!((filter.z_threshold - DEFAULT_SPIKE_Z).abs() < 1e-3);
        assert!(z_for_confidence(1.0).is_err());
        assert!(SpikeFilter::new(-1.0, Ddof::Population).is_err());
        assert!(SpikeFilter::new(f64::NAN, Ddof::Population).is_err());
    }
}
