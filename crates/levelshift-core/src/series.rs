//! Per-entity time series built from measurement rows

use crate::period::Period;
use crate::row::{MeasurementRow, Measure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observation of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub value: f64,
}

/// Raw series keyed by entity code, each sorted by period ascending
pub type SeriesByEntity = BTreeMap<String, Vec<SeriesPoint>>;

/// Group rows into one period-ascending series per entity.
///
/// Rows whose measure is undefined are left out. Rows sharing a period keep
/// their input order.
pub fn series_by_entity(rows: &[MeasurementRow], measure: Measure) -> SeriesByEntity {
    let mut series = SeriesByEntity::new();
    for row in rows {
        if let Some(value) = row.measure(measure) {
            series
                .entry(row.entity_code.clone())
                .or_default()
                .push(SeriesPoint { period: row.period, value });
        }
    }
    for points in series.values_mut() {
        points.sort_by_key(|p| p.period);
    }
    series
}

/// Earliest period across all rows of a batch, whether or not their measure is defined
pub fn earliest_period(rows: &[MeasurementRow]) -> Option<Period> {
    rows.iter().map(|row| row.period).min()
}

/// Just the values of a series, in period order
pub fn values(points: &[SeriesPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}
