//! Common test utilities for levelshift-select tests

#![allow(dead_code)]

use levelshift_core::{MeasurementRow, Period, SeriesByEntity, SeriesPoint};
use levelshift_select::ChangeCandidate;

/// First month of every generated series
pub fn start() -> Period {
    Period::new(2020, 1).unwrap()
}

/// Monthly points starting at [`start`]
pub fn points(values: &[f64]) -> Vec<SeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| SeriesPoint {
            period: start().offset_months(i as i32).unwrap(),
            value,
        })
        .collect()
}

/// Series map from `(entity, values)` pairs
pub fn series_of(entries: &[(&str, &[f64])]) -> SeriesByEntity {
    entries
        .iter()
        .map(|(code, values)| (code.to_string(), points(values)))
        .collect()
}

/// Rows whose rate equals `values` (denominator 1)
pub fn rows_for(code: &str, values: &[f64]) -> Vec<MeasurementRow> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| MeasurementRow::new(code, start().offset_months(i as i32).unwrap(), v, 1.0))
        .collect()
}

/// `count` candidates that never clear the starts-high cut
pub fn low_candidates(count: usize) -> Vec<ChangeCandidate> {
    (0..count)
        .map(|i| ChangeCandidate::new(format!("LOW{i}"), 0.0, 2, 0.0))
        .collect()
}
