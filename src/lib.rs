//! Grouped outlier scoring and sustained level-shift selection
//!
//! `levelshift` finds entities whose rate series moved to a new level and
//! stayed there, and reports the largest such shifts:
//!
//! 1. [`moments`]: per-group mean, std, skew and kurtosis, and a z-score for
//!    every row against its own group
//! 2. [`select`]: from an external change detector's candidates, keep those
//!    that started high, were not driven by a single spike, and changed most
//! 3. [`report`]: an HTML table of the survivors with labels, links and
//!    rendered sparklines
//!
//! [`polars`] loads the measurement cache and detector results from CSV and
//! exposes the moment computations on `DataFrame`s.
//!
//! # Example
//!
//! ```rust
//! use levelshift::prelude::*;
//!
//! let jan = Period::new(2020, 1).unwrap();
//! let mut rows = Vec::new();
//! for (code, values) in [("A", [1.0, 1.0, 1.0, 1.0, 50.0]), ("B", [1.0, 2.0, 3.0, 8.0, 9.0])] {
//!     for (i, v) in values.iter().enumerate() {
//!         rows.push(MeasurementRow::new(code, jan.offset_months(i as i32).unwrap(), *v, 1.0));
//!     }
//! }
//! let mut candidates: Vec<_> = (0..8)
//!     .map(|i| ChangeCandidate::new(format!("C{i}"), 0.0, 2, 0.0))
//!     .collect();
//! candidates.push(ChangeCandidate::new("A", 1.0, 5, 49.0));
//! candidates.push(ChangeCandidate::new("B", 1.0, 4, 8.0));
//!
//! // A's rise is a single spike; only B's sustained shift is reported
//! let selection = ShiftPipeline::default().run(&rows, &candidates).unwrap();
//! assert_eq!(selection.len(), 1);
//! assert_eq!(selection.ranked()[0].entity_code(), "B");
//! ```

pub use levelshift_core as core;
pub use levelshift_moments as moments;
pub use levelshift_polars as polars;
pub use levelshift_report as report;
pub use levelshift_select as select;

pub mod prelude {
    pub use levelshift_core::{
        Ddof, Error, EventBus, EventHandler, GroupKey, LoggingHandler, Measure, MeasurementRow,
        MetricsHandler, Period, Result, SeriesPoint,
    };
    pub use levelshift_moments::{
        annotate, compute_moments, score_rows, DropPolicy, MomentAggregator, MomentSet, ScoredRow,
        ZScoreAnnotator,
    };
    pub use levelshift_polars::{
        read_change_results, read_measurements, ChangeResultColumns, LevelShiftExt,
        MeasurementColumns,
    };
    pub use levelshift_report::{
        assemble, distribution_table, EntityLabelResolver, LinkTemplate, RenderConfig, Renderer,
        ReportAssembler, ReportContext, ShiftReport, SvgRenderer,
    };
    pub use levelshift_select::{
        CandidateSelector, ChangeCandidate, FilteredCandidate, Selection, SelectionConfig,
        ShiftPipeline, SpikeFilter,
    };
}
