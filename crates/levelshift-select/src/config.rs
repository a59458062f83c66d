//! Configuration for candidate selection
//!
//! The 0.8 starts-high percentile and the 1.96 spike bound are empirically
//! chosen defaults, not calibrated values; both are exposed here so they can
//! be tuned per report without touching code.

use crate::quantile::Interpolation;
use crate::stability::SpikeFilter;
use levelshift_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default percentile of initial levels a candidate must exceed
pub const DEFAULT_INITIAL_LEVEL_PERCENTILE: f64 = 0.8;

/// Default number of ranked candidates to keep
pub const DEFAULT_TOP_N: usize = 10;

/// Settings for [`CandidateSelector`](crate::CandidateSelector)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Candidates must start strictly above this quantile of initial levels
    pub initial_level_percentile: f64,
    /// How the starts-high quantile is interpolated
    pub interpolation: Interpolation,
    /// Spike filter bound and std convention
    pub spike: SpikeFilter,
    /// Maximum number of ranked candidates returned
    pub top_n: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            initial_level_percentile: DEFAULT_INITIAL_LEVEL_PERCENTILE,
            interpolation: Interpolation::default(),
            spike: SpikeFilter::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl SelectionConfig {
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.initial_level_percentile = percentile;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_spike_filter(mut self, spike: SpikeFilter) -> Self {
        self.spike = spike;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_level_percentile) {
            return Err(Error::invalid_probability(self.initial_level_percentile));
        }
        if self.top_n == 0 {
            return Err(Error::InvalidParameter("top_n must be at least 1".to_string()));
        }
        self.spike.validate()
    }

    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
