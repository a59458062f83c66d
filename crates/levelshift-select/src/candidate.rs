//! Change candidates produced by the external detector, and the ranked survivors

use levelshift_core::{Error, Period, Result, SeriesPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a candidate came from in the detector's output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Name of the result table (usually the measure it was run for)
    pub source: String,
    /// Row index within that table
    pub record: usize,
    /// Any further numeric columns the detector emitted for the row
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

/// One entity's detected change, as reported by the change detector.
///
/// Read-only to the selection pipeline: stages filter and reorder candidates
/// but never modify them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeCandidate {
    pub entity_code: String,
    /// Metric the change was detected for, when the result covers several
    #[serde(default)]
    pub metric: Option<String>,
    /// Level of the series before the change
    pub initial_level: f64,
    /// 1-based index of the month the change was first detected in; `None`
    /// when the detector reported no change for the entity
    pub detected_change_month: Option<u32>,
    /// Size of the shift relative to the initial level
    pub proportional_change: f64,
    #[serde(default)]
    pub provenance: Provenance,
}

impl ChangeCandidate {
    pub fn new(
        entity_code: impl Into<String>,
        initial_level: f64,
        detected_change_month: u32,
        proportional_change: f64,
    ) -> Self {
        Self {
            entity_code: entity_code.into(),
            metric: None,
            initial_level,
            detected_change_month: Some(detected_change_month),
            proportional_change,
            provenance: Provenance::default(),
        }
    }

    /// A detector row with levels but no detected change month.
    ///
    /// Its initial level still counts towards the batch's starts-high cut.
    pub fn undated(
        entity_code: impl Into<String>,
        initial_level: f64,
        proportional_change: f64,
    ) -> Self {
        Self {
            detected_change_month: None,
            ..Self::new(entity_code, initial_level, 1, proportional_change)
        }
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Calendar month of the detected change, `None` for an undated candidate.
    ///
    /// `detected_change_month` indexes the batch's months from 1, so month 1
    /// is `earliest` itself.
    pub fn change_date(&self, earliest: Period) -> Result<Option<Period>> {
        let Some(month) = self.detected_change_month else {
            return Ok(None);
        };
        if month == 0 {
            return Err(Error::InvalidInput(format!(
                "detected change month for {} must be 1-based, got 0",
                self.entity_code
            )));
        }
        let offset = i32::try_from(month - 1).map_err(|_| {
            Error::InvalidInput(format!("detected change month {month} is out of range"))
        })?;
        earliest.offset_months(offset).map(Some)
    }
}

impl fmt::Display for ChangeCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (initial {:.3}, month ", self.entity_code, self.initial_level)?;
        match self.detected_change_month {
            Some(month) => write!(f, "{month}")?,
            None => f.write_str("none")?,
        }
        write!(f, ", change {:.3})", self.proportional_change)
    }
}

/// A candidate that survived every selection stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredCandidate {
    /// 1-based position in the ranking
    pub rank: usize,
    pub candidate: ChangeCandidate,
    /// Human-facing month of the detected change, if one was detected
    pub change_date: Option<Period>,
    /// The entity's full raw series, period ascending
    pub series: Vec<SeriesPoint>,
}

impl FilteredCandidate {
    pub fn entity_code(&self) -> &str {
        &self.candidate.entity_code
    }

    pub fn proportional_change(&self) -> f64 {
        self.candidate.proportional_change
    }
}
