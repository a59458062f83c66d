//! Selection of sustained level shifts from change-detector output
//!
//! Given one batch of [`ChangeCandidate`]s (one per entity, from an external
//! change detector) and each entity's raw series, this crate keeps the
//! candidates that start high, shifted persistently rather than through a
//! single spike, and changed the most:
//!
//! - [`quantile`]: the starts-high cut over the batch's initial levels
//! - [`SpikeFilter`]: rejects series whose peak exceeds `mean + z * std`
//! - [`CandidateSelector`]: the four stages with counts per stage
//! - [`ShiftPipeline`]: builds series from rows and reports events per run
//!
//! # Example
//!
//! ```rust
//! use levelshift_core::{MeasurementRow, Period};
//! use levelshift_select::{ChangeCandidate, ShiftPipeline};
//!
//! let jan = Period::new(2020, 1).unwrap();
//! let mut rows = Vec::new();
//! for (code, values) in [("A", [1.0, 2.0, 3.0, 8.0, 9.0]), ("B", [2.0; 5])] {
//!     for (i, v) in values.iter().enumerate() {
//!         rows.push(MeasurementRow::new(code, jan.offset_months(i as i32).unwrap(), *v, 1.0));
//!     }
//! }
//! let candidates = vec![
//!     ChangeCandidate::new("A", 9.0, 4, 7.0),
//!     ChangeCandidate::new("B", 1.0, 2, 0.0),
//! ];
//!
//! let selection = ShiftPipeline::default().run(&rows, &candidates).unwrap();
//! assert_eq!(selection.len(), 1);
//! assert_eq!(selection.ranked()[0].change_date, Some(Period::new(2020, 4).unwrap()));
//! ```

pub mod candidate;
pub mod config;
pub mod pipeline;
pub mod quantile;
pub mod selector;
pub mod stability;

pub use candidate::{ChangeCandidate, FilteredCandidate, Provenance};
pub use config::{SelectionConfig, DEFAULT_INITIAL_LEVEL_PERCENTILE, DEFAULT_TOP_N};
pub use pipeline::ShiftPipeline;
pub use quantile::{quantile, Interpolation};
pub use selector::{
    deduplicate, rank_and_truncate, select_top, CandidateSelector, Rejection, Selection,
    StageCounts,
};
pub use stability::{
    filter_spikes, z_for_confidence, SeriesSummary, SpikeFilter, SpikeVerdict, DEFAULT_SPIKE_Z,
};
