//! CSV loaders for the warehouse cache and the change detector's results
//!
//! Both inputs are produced outside this workspace. A result table that is
//! absent or unreadable is reported as
//! [`MissingExternalResult`](levelshift_core::Error::MissingExternalResult)
//! so callers can tell "nothing changed" apart from "nothing to look at".

use crate::{ChangeResultColumns, Error, LevelShiftExt, MeasurementColumns, Result};
use levelshift_core::MeasurementRow;
use levelshift_select::ChangeCandidate;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Read a CSV file with a header row
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read an external table, reporting absence or a parse failure as a
/// missing result
fn read_external(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(levelshift_core::Error::missing_result(
            path.display().to_string(),
            "file not found",
        )
        .into());
    }
    read_csv(path).map_err(|e| match e {
        Error::Polars(inner) => {
            levelshift_core::Error::missing_result(path.display().to_string(), inner).into()
        }
        other => other,
    })
}

/// Load the cached measurement table, sorted by entity then month
pub fn read_measurements(
    path: impl AsRef<Path>,
    columns: &MeasurementColumns,
) -> Result<Vec<MeasurementRow>> {
    let path = path.as_ref();
    let rows = read_external(path)?.to_measurements(columns)?;
    info!(path = %path.display(), rows = rows.len(), "loaded measurements");
    Ok(rows)
}

/// Load the change detector's results, optionally for one measure only
pub fn read_change_results(
    path: impl AsRef<Path>,
    columns: &ChangeResultColumns,
    metric: Option<&str>,
) -> Result<Vec<ChangeCandidate>> {
    let path = path.as_ref();
    let candidates =
        read_external(path)?.to_change_candidates(columns, &source_name(path), metric)?;
    info!(
        path = %path.display(),
        candidates = candidates.len(),
        metric = metric.unwrap_or("*"),
        "loaded change results"
    );
    Ok(candidates)
}
