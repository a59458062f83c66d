//! Z-score annotation of rows against their group's moments
//!
//! Rows are attached to moments with an explicit left join on the group-key
//! tuple. A row without a matching group, without a defined measure, or
//! whose group has a zero or undefined standard deviation gets no score and
//! is left out of the output. No row is ever given a substitute score.

use crate::aggregator::{GroupedMoments, MomentAggregator};
use crate::moments::MomentSet;
use levelshift_core::{GroupId, GroupKey, Measure, MeasurementRow, Result, RowId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A row with its group's moments and its standardized deviation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    pub row: MeasurementRow,
    pub group: GroupId,
    pub moments: MomentSet,
    /// The measure value the score was computed from
    pub value: f64,
    pub z_score: f64,
}

impl ScoredRow {
    /// Identity of the source row
    pub fn row_id(&self) -> RowId {
        self.row.row_id()
    }
}

/// Which rows the annotator drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Drop rows whose z-score is undefined
    #[default]
    UndefinedScore,
    /// Also drop rows whose group skew or kurtosis is undefined
    AnyUndefinedMoment,
}

/// Joins rows to group moments and derives z-scores
#[derive(Debug, Clone, Default)]
pub struct ZScoreAnnotator {
    policy: DropPolicy,
}

impl ZScoreAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DropPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DropPolicy {
        self.policy
    }

    /// Score every row that can be scored, preserving input order
    pub fn annotate(&self, rows: &[MeasurementRow], moments: &GroupedMoments) -> Vec<ScoredRow> {
        let scored: Vec<ScoredRow> = rows
            .iter()
            .filter_map(|row| self.score(row, moments))
            .collect();

        debug!(
            rows = rows.len(),
            scored = scored.len(),
            dropped = rows.len() - scored.len(),
            "annotated z-scores"
        );
        scored
    }

    /// Z-score of `value` against its group's moments, or `None` when this
    /// policy drops the row
    pub fn score_against(&self, set: &MomentSet, value: f64) -> Option<f64> {
        if self.policy == DropPolicy::AnyUndefinedMoment && !set.is_complete() {
            return None;
        }
        set.z_score(value)
    }

    fn score(&self, row: &MeasurementRow, moments: &GroupedMoments) -> Option<ScoredRow> {
        let value = row.measure(moments.measure())?;
        let (group, set) = moments.lookup(row)?;
        let z_score = self.score_against(set, value)?;

        Some(ScoredRow {
            row: row.clone(),
            group,
            moments: *set,
            value,
            z_score,
        })
    }
}

/// Annotate with the default drop policy
pub fn annotate(rows: &[MeasurementRow], moments: &GroupedMoments) -> Vec<ScoredRow> {
    ZScoreAnnotator::new().annotate(rows, moments)
}

/// Compute moments and annotate in one call.
///
/// Returns the moments alongside the scored rows so callers can report the
/// reference distribution as well.
pub fn score_rows(
    rows: &[MeasurementRow],
    measure: Measure,
    group_keys: &[GroupKey],
    policy: DropPolicy,
) -> Result<(GroupedMoments, Vec<ScoredRow>)> {
    let moments = MomentAggregator::new(measure, group_keys.to_vec())?.compute(rows);
    let scored = ZScoreAnnotator::with_policy(policy).annotate(rows, &moments);
    Ok((moments, scored))
}
