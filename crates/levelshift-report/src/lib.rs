//! HTML report tables for selected level shifts
//!
//! The report layer sits after selection: it looks up display names through
//! an [`EntityLabelResolver`], asks a [`Renderer`] for an embeddable artifact
//! per row, and writes an HTML table. Artifacts are opaque; they are only
//! ever displayed. Rendering options travel in a [`RenderConfig`] passed to
//! each call.
//!
//! [`SvgRenderer`] draws inline SVG sparklines and density plots.

mod assembler;
mod config;
mod error;
pub mod html;
mod svg;
mod traits;

pub use assembler::{
    assemble, distribution_table, DistributionRow, DistributionTable, ReportAssembler,
    ReportContext, ReportRow, ShiftReport,
};
pub use config::{
    ColumnTitles, LinkFields, LinkTemplate, RenderConfig, OPENPRESCRIBING_MEASURE_LINK,
};
pub use error::{Error, Result};
pub use svg::{gaussian_kde, SvgImage, SvgRenderer};
pub use traits::{CodeLabels, EntityLabelResolver, Renderer};
