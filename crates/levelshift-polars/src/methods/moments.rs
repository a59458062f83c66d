//! Grouped moments and z-scores over DataFrame columns

use super::columns::{float_values, string_values};
use super::convert;
use crate::{ChangeResultColumns, Error, LevelShiftExt, MeasurementColumns, Result};
use levelshift_core::{GroupId, MeasurementRow};
use levelshift_moments::{group_moments, DropPolicy, MomentSet, ZScoreAnnotator};
use levelshift_select::ChangeCandidate;
use polars::prelude::*;
use tracing::debug;

/// Group id of every row; `None` where any key is null
fn group_ids(df: &DataFrame, group_cols: &[&str]) -> Result<Vec<Option<GroupId>>> {
    if group_cols.is_empty() {
        return Err(Error::InvalidInput(
            "at least one group column is required".to_string(),
        ));
    }
    let keys = group_cols
        .iter()
        .map(|name| string_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..df.height())
        .map(|i| {
            keys.iter()
                .map(|k| k[i].clone())
                .collect::<Option<Vec<_>>>()
                .map(GroupId)
        })
        .collect())
}

/// Finite measure values, or `None` for null and non-finite entries
fn measure_values(df: &DataFrame, measure_col: &str) -> Result<Vec<Option<f64>>> {
    Ok(float_values(df, measure_col)?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn key_columns<'a>(
    group_cols: &[&str],
    ids: impl Iterator<Item = &'a GroupId>,
) -> Vec<Column> {
    let mut keys: Vec<Vec<String>> = vec![Vec::new(); group_cols.len()];
    for id in ids {
        for (k, value) in id.values().iter().enumerate() {
            keys[k].push(value.clone());
        }
    }
    group_cols
        .iter()
        .zip(keys)
        .map(|(name, values)| Series::new((*name).into(), values).into())
        .collect()
}

#[derive(Default)]
struct MomentColumns {
    mean: Vec<f64>,
    std: Vec<f64>,
    skew: Vec<f64>,
    kurtosis: Vec<f64>,
}

impl MomentColumns {
    fn push(&mut self, set: &MomentSet) {
        self.mean.push(set.mean);
        self.std.push(set.std);
        self.skew.push(set.skew);
        self.kurtosis.push(set.kurtosis);
    }

    fn into_columns(self) -> Vec<Column> {
        vec![
            Series::new("mean".into(), self.mean).into(),
            Series::new("std".into(), self.std).into(),
            Series::new("skew".into(), self.skew).into(),
            Series::new("kurtosis".into(), self.kurtosis).into(),
        ]
    }
}

impl LevelShiftExt for DataFrame {
    fn group_moments(&self, measure_col: &str, group_cols: &[&str]) -> Result<DataFrame> {
        let values = measure_values(self, measure_col)?;
        let ids = group_ids(self, group_cols)?;
        let groups = group_moments(ids.into_iter().zip(values));

        let mut counts = Vec::with_capacity(groups.len());
        let mut moments = MomentColumns::default();
        for set in groups.values() {
            counts.push(set.count as u64);
            moments.push(set);
        }

        let mut columns = key_columns(group_cols, groups.keys());
        columns.push(Series::new("count".into(), counts).into());
        columns.extend(moments.into_columns());

        debug!(groups = groups.len(), rows = self.height(), measure_col, "grouped moments");
        Ok(DataFrame::new(columns)?)
    }

    fn zscores_with_policy(
        &self,
        measure_col: &str,
        group_cols: &[&str],
        policy: DropPolicy,
    ) -> Result<DataFrame> {
        let values = measure_values(self, measure_col)?;
        let ids = group_ids(self, group_cols)?;
        let groups = group_moments(ids.iter().cloned().zip(values.iter().copied()));
        let annotator = ZScoreAnnotator::with_policy(policy);

        let mut row_nr = Vec::new();
        let mut kept_ids = Vec::new();
        let mut kept_values = Vec::new();
        let mut moments = MomentColumns::default();
        let mut z_scores = Vec::new();

        for (i, (id, value)) in ids.iter().zip(&values).enumerate() {
            let (Some(id), Some(value)) = (id, value) else {
                continue;
            };
            // Left join onto the group's moments
            let Some(set) = groups.get(id) else {
                continue;
            };
            let Some(z) = annotator.score_against(set, *value) else {
                continue;
            };

            row_nr.push(i as u64);
            kept_ids.push(id);
            kept_values.push(*value);
            moments.push(set);
            z_scores.push(z);
        }

        debug!(rows = self.height(), scored = row_nr.len(), measure_col, "z-scored frame");

        let mut columns: Vec<Column> = vec![Series::new("row_nr".into(), row_nr).into()];
        columns.extend(key_columns(group_cols, kept_ids.into_iter()));
        columns.push(Series::new(measure_col.into(), kept_values).into());
        columns.extend(moments.into_columns());
        columns.push(Series::new("z_score".into(), z_scores).into());
        Ok(DataFrame::new(columns)?)
    }

    fn to_measurements(&self, columns: &MeasurementColumns) -> Result<Vec<MeasurementRow>> {
        convert::measurements(self, columns)
    }

    fn to_change_candidates(
        &self,
        columns: &ChangeResultColumns,
        source: &str,
        metric: Option<&str>,
    ) -> Result<Vec<ChangeCandidate>> {
        convert::change_candidates(self, columns, source, metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ids_skip_null_keys() {
        let df = DataFrame::new(vec![
            Series::new("code".into(), vec![Some("A"), None, Some("B")]).into(),
        ])
        .unwrap();
        let ids = group_ids(&df, &["code"]).unwrap();
        assert_eq!(ids[0], Some(GroupId(vec!["A".to_string()])));
        assert_eq!(ids[1], None);
        assert!(group_ids(&df, &[]).is_err());
    }
}
