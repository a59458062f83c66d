//! Grouped moment computation

use crate::moments::MomentSet;
use levelshift_core::{Error, GroupId, GroupKey, Measure, MeasurementRow, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Moments per group, together with the keys and measure they were built from.
///
/// Groups exist only for the duration of the call that built them; they are
/// not persisted. Iteration is in group-id order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMoments {
    keys: Vec<GroupKey>,
    measure: Measure,
    groups: BTreeMap<GroupId, MomentSet>,
}

impl GroupedMoments {
    /// Group keys the moments were computed over
    pub fn keys(&self) -> &[GroupKey] {
        &self.keys
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn get(&self, group: &GroupId) -> Option<&MomentSet> {
        self.groups.get(group)
    }

    /// Look up the group a row belongs to under these keys
    pub fn lookup(&self, row: &MeasurementRow) -> Option<(GroupId, &MomentSet)> {
        let id = row.group_id(&self.keys)?;
        let moments = self.groups.get(&id)?;
        Some((id, moments))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupId, &MomentSet)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Computes [`MomentSet`]s per group of rows
#[derive(Debug, Clone)]
pub struct MomentAggregator {
    measure: Measure,
    keys: Vec<GroupKey>,
}

impl MomentAggregator {
    /// Create an aggregator over `measure`, grouped by the ordered `keys`
    pub fn new(measure: Measure, keys: Vec<GroupKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::InvalidParameter(
                "at least one group key is required".to_string(),
            ));
        }
        Ok(Self { measure, keys })
    }

    /// Group by entity code only
    pub fn by_entity(measure: Measure) -> Self {
        Self {
            measure,
            keys: vec![GroupKey::Entity],
        }
    }

    pub fn keys(&self) -> &[GroupKey] {
        &self.keys
    }

    /// Compute moments for every group present in `rows`.
    ///
    /// Rows whose measure is undefined (zero denominator, non-finite value)
    /// or that lack one of the key attributes do not contribute.
    pub fn compute(&self, rows: &[MeasurementRow]) -> GroupedMoments {
        let groups = group_moments(
            rows.iter()
                .map(|row| (row.group_id(&self.keys), row.measure(self.measure))),
        );
        let used: usize = groups.values().map(|set| set.count).sum();
        let skipped = rows.len() - used;
        debug!(
            groups = groups.len(),
            rows = rows.len(),
            skipped,
            measure = self.measure.name(),
            "computed grouped moments"
        );

        GroupedMoments {
            keys: self.keys.clone(),
            measure: self.measure,
            groups,
        }
    }
}

/// Moments of keyed values, one [`MomentSet`] per group id.
///
/// Pairs without a group id or without a finite value do not contribute.
/// This is the grouping every caller shares, whether its values come from
/// [`MeasurementRow`]s or from table columns.
pub fn group_moments<I>(pairs: I) -> BTreeMap<GroupId, MomentSet>
where
    I: IntoIterator<Item = (Option<GroupId>, Option<f64>)>,
{
    let mut values: BTreeMap<GroupId, Vec<f64>> = BTreeMap::new();
    for pair in pairs {
        if let (Some(id), Some(value)) = pair {
            if value.is_finite() {
                values.entry(id).or_default().push(value);
            }
        }
    }
    summarize(values)
}

#[cfg(not(feature = "parallel"))]
fn summarize(values: BTreeMap<GroupId, Vec<f64>>) -> BTreeMap<GroupId, MomentSet> {
    values
        .into_iter()
        .map(|(id, v)| (id, MomentSet::from_values(&v)))
        .collect()
}

// Groups are independent, so each one can be summarized on its own thread
#[cfg(feature = "parallel")]
fn summarize(values: BTreeMap<GroupId, Vec<f64>>) -> BTreeMap<GroupId, MomentSet> {
    use rayon::prelude::*;

    values
        .into_par_iter()
        .map(|(id, v)| (id, MomentSet::from_values(&v)))
        .collect()
}

/// Compute per-group moments of `measure`, grouped by `group_keys`
pub fn compute_moments(
    rows: &[MeasurementRow],
    measure: Measure,
    group_keys: &[GroupKey],
) -> Result<GroupedMoments> {
    Ok(MomentAggregator::new(measure, group_keys.to_vec())?.compute(rows))
}
