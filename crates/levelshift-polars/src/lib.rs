//! Polars integration for level-shift analysis
//!
//! This crate connects the level-shift crates to tabular data through a
//! single extension trait on `DataFrame`, plus CSV loaders for the two
//! external inputs (the measurement cache and the change detector's
//! results).
//!
//! # Example
//!
//! ```rust
//! use polars::prelude::*;
//! use levelshift_polars::LevelShiftExt;
//!
//! let df = df![
//!     "code" => ["A", "A", "A", "B"],
//!     "rate" => [1.0, 2.0, 6.0, 4.0],
//! ]
//! .unwrap();
//!
//! let moments = df.group_moments("rate", &["code"]).unwrap();
//! assert_eq!(moments.height(), 2);
//!
//! // B has a single observation and no spread, so none of its rows are scored
//! let scored = df.zscores("rate", &["code"]).unwrap();
//! assert_eq!(scored.height(), 3);
//! ```

mod config;
mod error;
mod io;
mod methods;
mod traits;

pub use config::{ChangeResultColumns, MeasurementColumns};
pub use error::{Error, Result};
pub use io::{read_change_results, read_csv, read_measurements};
pub use traits::LevelShiftExt;
