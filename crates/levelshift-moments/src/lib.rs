//! Grouped descriptive moments and z-score annotation
//!
//! This crate turns a batch of [`MeasurementRow`](levelshift_core::MeasurementRow)s
//! into per-group reference distributions and scores each row against its
//! own group:
//!
//! - [`MomentAggregator`] / [`compute_moments`]: mean, sample std, skew and
//!   excess kurtosis per group-key tuple
//! - [`ZScoreAnnotator`] / [`annotate`]: `(value - mean) / std` per row, with
//!   unscorable rows dropped
//!
//! # Missing data
//!
//! Moments that need more observations than a group has are `NaN`. A NaN or
//! zero standard deviation never yields a score; such rows are simply absent
//! from the annotator's output.
//!
//! # Example
//!
//! ```rust
//! use levelshift_core::{GroupKey, Measure, MeasurementRow, Period};
//! use levelshift_moments::{annotate, compute_moments};
//!
//! let jan = Period::new(2020, 1).unwrap();
//! let rows: Vec<_> = [1.0, 2.0, 6.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &n)| MeasurementRow::new("A", jan.offset_months(i as i32).unwrap(), n, 1.0))
//!     .collect();
//!
//! let moments = compute_moments(&rows, Measure::Rate, &[GroupKey::Entity]).unwrap();
//! let scored = annotate(&rows, &moments);
//! assert_eq!(scored.len(), 3);
//! assert!(scored[2].z_score > 1.0);
//! ```
//!
//! # Features
//!
//! - `parallel`: summarize groups on the rayon thread pool

pub mod aggregator;
pub mod moments;
pub mod zscore;

pub use aggregator::{compute_moments, group_moments, GroupedMoments, MomentAggregator};
pub use moments::{excess_kurtosis, sample_skewness, MomentSet};
pub use zscore::{annotate, score_rows, DropPolicy, ScoredRow, ZScoreAnnotator};
