//! Column mappings for the tables this crate reads

use serde::{Deserialize, Serialize};

/// Column names of a measurement table (one row per entity and month)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementColumns {
    pub entity: String,
    pub period: String,
    pub numerator: String,
    pub denominator: String,
    /// Extra columns copied onto each row as string attributes
    pub attributes: Vec<String>,
}

impl Default for MeasurementColumns {
    fn default() -> Self {
        Self {
            entity: "code".to_string(),
            period: "month".to_string(),
            numerator: "numerator".to_string(),
            denominator: "denominator".to_string(),
            attributes: Vec::new(),
        }
    }
}

impl MeasurementColumns {
    pub fn with_attribute(mut self, column: impl Into<String>) -> Self {
        self.attributes.push(column.into());
        self
    }
}

/// Column names of the change detector's result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeResultColumns {
    pub entity: String,
    /// Column naming the measure each row was detected for, if the table
    /// covers several
    pub metric: Option<String>,
    pub initial_level: String,
    pub change_month: String,
    pub proportional_change: String,
}

impl Default for ChangeResultColumns {
    fn default() -> Self {
        Self {
            entity: "code".to_string(),
            metric: Some("measure".to_string()),
            initial_level: "is.intlev.initlev".to_string(),
            change_month: "is.tfirst.big".to_string(),
            proportional_change: "is.intlev.levdprop".to_string(),
        }
    }
}

impl ChangeResultColumns {
    /// Mapping for a table holding a single measure
    pub fn without_metric(mut self) -> Self {
        self.metric = None;
        self
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        [
            self.entity.as_str(),
            self.initial_level.as_str(),
            self.change_month.as_str(),
            self.proportional_change.as_str(),
        ]
        .into_iter()
        .chain(self.metric.as_deref())
    }

    /// Whether `column` is one of the mapped columns
    pub fn is_mapped(&self, column: &str) -> bool {
        self.names().any(|name| name == column)
    }
}
