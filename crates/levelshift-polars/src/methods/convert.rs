//! Conversion of measurement and detector tables into typed rows

use super::columns::{float_values, numeric_column_names, string_values};
use crate::{ChangeResultColumns, Error, MeasurementColumns, Result};
use levelshift_core::{MeasurementRow, Period};
use levelshift_select::{ChangeCandidate, Provenance};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub(super) fn measurements(df: &DataFrame, columns: &MeasurementColumns) -> Result<Vec<MeasurementRow>> {
    let entities = string_values(df, &columns.entity)?;
    let periods = string_values(df, &columns.period)?;
    let numerators = float_values(df, &columns.numerator)?;
    let denominators = float_values(df, &columns.denominator)?;
    let attributes = columns
        .attributes
        .iter()
        .map(|name| Ok((name.as_str(), string_values(df, name)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for i in 0..df.height() {
        let (Some(entity), Some(period)) = (&entities[i], &periods[i]) else {
            skipped += 1;
            continue;
        };
        // A null count makes the row's rate undefined but keeps its month
        let mut row = MeasurementRow::new(
            entity.clone(),
            Period::parse(period)?,
            numerators[i].unwrap_or(f64::NAN),
            denominators[i].unwrap_or(f64::NAN),
        );
        for (name, values) in &attributes {
            if let Some(value) = &values[i] {
                row = row.with_attribute(*name, value.clone());
            }
        }
        rows.push(row);
    }

    if skipped > 0 {
        warn!(skipped, "measurement rows without entity or month were skipped");
    }
    rows.sort_by(|a, b| {
        a.entity_code
            .cmp(&b.entity_code)
            .then(a.period.cmp(&b.period))
    });
    debug!(rows = rows.len(), "converted measurement table");
    Ok(rows)
}

/// 1-based month index from the detector's numeric column
fn change_month(value: f64, entity: &str) -> Result<u32> {
    if value < 1.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(Error::InvalidInput(format!(
            "change month for {entity} must be a positive whole number, got {value}"
        )));
    }
    Ok(value as u32)
}

pub(super) fn change_candidates(
    df: &DataFrame,
    columns: &ChangeResultColumns,
    source: &str,
    metric: Option<&str>,
) -> Result<Vec<ChangeCandidate>> {
    let entities = string_values(df, &columns.entity)?;
    let levels = float_values(df, &columns.initial_level)?;
    let months = float_values(df, &columns.change_month)?;
    let changes = float_values(df, &columns.proportional_change)?;
    let metrics = match &columns.metric {
        Some(name) => Some(string_values(df, name)?),
        None if metric.is_some() => {
            return Err(Error::InvalidInput(
                "filtering by measure needs a measure column".to_string(),
            ));
        }
        None => None,
    };

    let extra_names: Vec<String> = numeric_column_names(df)
        .into_iter()
        .filter(|name| !columns.is_mapped(name))
        .collect();
    let extras = extra_names
        .iter()
        .map(|name| float_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let mut candidates = Vec::new();
    let mut unnamed = 0usize;
    let mut undated = 0usize;
    for i in 0..df.height() {
        let row_metric = metrics.as_ref().and_then(|m| m[i].clone());
        if let Some(wanted) = metric {
            if row_metric.as_deref() != Some(wanted) {
                continue;
            }
        }
        let Some(entity) = &entities[i] else {
            unnamed += 1;
            continue;
        };

        let mut extra = BTreeMap::new();
        for (name, values) in extra_names.iter().zip(&extras) {
            if let Some(value) = values[i] {
                extra.insert(name.clone(), value);
            }
        }

        let level = levels[i].unwrap_or(f64::NAN);
        let change = changes[i].unwrap_or(f64::NAN);
        // Rows without a detected change still count towards the starts-high cut
        let candidate = match months[i].filter(|m| m.is_finite()) {
            Some(month) => {
                ChangeCandidate::new(entity.clone(), level, change_month(month, entity)?, change)
            }
            None => {
                undated += 1;
                ChangeCandidate::undated(entity.clone(), level, change)
            }
        };
        let mut candidate = candidate.with_provenance(Provenance {
            source: source.to_string(),
            record: i,
            extra,
        });
        if let Some(m) = row_metric {
            candidate = candidate.with_metric(m);
        }
        candidates.push(candidate);
    }

    if unnamed > 0 {
        warn!(unnamed, source, "result rows without an entity code were skipped");
    }
    debug!(candidates = candidates.len(), undated, source, "converted change results");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_month_validation() {
        assert_eq!(change_month(3.0, "A").unwrap(), 3);
        assert!(change_month(0.0, "A").is_err());
        assert!(change_month(2.5, "A").is_err());
    }
}
