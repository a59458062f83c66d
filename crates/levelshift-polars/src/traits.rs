//! Extension trait for level-shift analysis on Polars DataFrames

use crate::{ChangeResultColumns, MeasurementColumns, Result};
use levelshift_core::MeasurementRow;
use levelshift_moments::DropPolicy;
use levelshift_select::ChangeCandidate;
use polars::prelude::*;

/// Level-shift operations on a Polars `DataFrame`
pub trait LevelShiftExt {
    /// Moments of `measure_col` per distinct tuple of `group_cols`
    ///
    /// # Arguments
    /// * `measure_col` - Numeric column to summarize
    /// * `group_cols` - Columns whose values identify a group (at least one)
    ///
    /// # Returns
    /// One row per group, ordered by group values, with columns
    /// `group_cols…, count, mean, std, skew, kurtosis`
    fn group_moments(&self, measure_col: &str, group_cols: &[&str]) -> Result<DataFrame>;

    /// Z-score of every row against its own group, dropping rows whose
    /// score is undefined
    ///
    /// # Returns
    /// Columns `row_nr, group_cols…, measure_col, mean, std, skew, kurtosis,
    /// z_score`, in input row order. `row_nr` is the row's index in `self`.
    fn zscores(&self, measure_col: &str, group_cols: &[&str]) -> Result<DataFrame> {
        self.zscores_with_policy(measure_col, group_cols, DropPolicy::default())
    }

    /// As [`zscores`](Self::zscores), with an explicit drop policy
    fn zscores_with_policy(
        &self,
        measure_col: &str,
        group_cols: &[&str],
        policy: DropPolicy,
    ) -> Result<DataFrame>;

    /// Convert a measurement table into rows, sorted by entity then period
    fn to_measurements(&self, columns: &MeasurementColumns) -> Result<Vec<MeasurementRow>>;

    /// Convert a change detector result table into candidates
    ///
    /// # Arguments
    /// * `columns` - Column mapping of the result table
    /// * `source` - Name recorded in each candidate's provenance
    /// * `metric` - Keep only rows detected for this measure
    fn to_change_candidates(
        &self,
        columns: &ChangeResultColumns,
        source: &str,
        metric: Option<&str>,
    ) -> Result<Vec<ChangeCandidate>>;
}
