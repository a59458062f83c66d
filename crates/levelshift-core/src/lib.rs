//! Core types for level-shift analysis
//!
//! This crate holds what every other levelshift crate shares:
//!
//! - [`MeasurementRow`]: one entity's numerator/denominator in one [`Period`]
//! - [`GroupKey`] / [`GroupId`]: how rows are grouped for moment computation
//! - [`SeriesPoint`] and [`series_by_entity`]: period-ordered raw series
//! - [`math`]: NaN-propagating descriptive statistics
//! - [`events`]: pipeline event bus with logging and metrics handlers
//! - [`Error`]: the shared error type
//!
//! # Example
//!
//! ```rust
//! use levelshift_core::{MeasurementRow, Measure, Period, series_by_entity};
//!
//! let jan = Period::new(2020, 1).unwrap();
//! let rows = vec![
//!     MeasurementRow::new("A", jan, 3.0, 4.0),
//!     MeasurementRow::new("A", jan.offset_months(1).unwrap(), 1.0, 0.0),
//! ];
//!
//! // The zero-denominator row has no rate and is left out of the series
//! let series = series_by_entity(&rows, Measure::Rate);
//! assert_eq!(series["A"].len(), 1);
//! ```

pub mod error;
pub mod events;
pub mod math;
pub mod period;
pub mod row;
pub mod series;

pub use error::{Error, Result};
pub use events::{
    EventBus, EventHandler, LoggingHandler, MetricsHandler, NullEventHandler, PipelineEvent,
    PipelineMetrics, Stage,
};
pub use math::Ddof;
pub use period::Period;
pub use row::{GroupId, GroupKey, Measure, MeasurementRow, RowId};
pub use series::{earliest_period, series_by_entity, SeriesByEntity, SeriesPoint};
