//! Measurement rows and the keys used to group them

use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One measurement of one entity in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    /// Entity identifier (practice, CCG, ...)
    pub entity_code: String,
    pub period: Period,
    pub numerator: f64,
    pub denominator: f64,
    /// Extra categorical columns (e.g. `metric`) that can act as group keys
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl MeasurementRow {
    pub fn new(
        entity_code: impl Into<String>,
        period: Period,
        numerator: f64,
        denominator: f64,
    ) -> Self {
        Self {
            entity_code: entity_code.into(),
            period,
            numerator,
            denominator,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a categorical attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// `numerator / denominator`, undefined for a zero or non-finite denominator
    pub fn rate(&self) -> Option<f64> {
        if !self.numerator.is_finite() || !self.denominator.is_finite() || self.denominator == 0.0
        {
            return None;
        }
        Some(self.numerator / self.denominator)
    }

    /// Value of the requested measure column, `None` when undefined
    pub fn measure(&self, measure: Measure) -> Option<f64> {
        let value = match measure {
            Measure::Rate => return self.rate(),
            Measure::Numerator => self.numerator,
            Measure::Denominator => self.denominator,
        };
        value.is_finite().then_some(value)
    }

    pub fn row_id(&self) -> RowId {
        RowId {
            entity_code: self.entity_code.clone(),
            period: self.period,
        }
    }

    /// Value of a single grouping key, `None` if the row lacks the attribute
    pub fn key_value(&self, key: &GroupKey) -> Option<String> {
        match key {
            GroupKey::Entity => Some(self.entity_code.clone()),
            GroupKey::Period => Some(self.period.to_string()),
            GroupKey::Attribute(name) => self.attributes.get(name).cloned(),
        }
    }

    /// The ordered tuple of key values for `keys`.
    ///
    /// Rows missing any attribute key belong to no group.
    pub fn group_id(&self, keys: &[GroupKey]) -> Option<GroupId> {
        keys.iter()
            .map(|key| self.key_value(key))
            .collect::<Option<Vec<_>>>()
            .map(GroupId)
    }
}

/// Stable identity of a row, used to join derived tables back to inputs
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId {
    pub entity_code: String,
    pub period: Period,
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.entity_code, self.period)
    }
}

/// Numeric column a statistic is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    #[default]
    Rate,
    Numerator,
    Denominator,
}

impl Measure {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Numerator => "numerator",
            Self::Denominator => "denominator",
        }
    }
}

/// One grouping attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// The entity code
    Entity,
    /// The period, rendered as `YYYY-MM-DD`
    Period,
    /// A named attribute from [`MeasurementRow::attributes`]
    Attribute(String),
}

impl GroupKey {
    pub fn name(&self) -> &str {
        match self {
            Self::Entity => "code",
            Self::Period => "month",
            Self::Attribute(name) => name,
        }
    }
}

/// Ordered tuple of group-key values; equality is exact string equality
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Vec<String>);

impl GroupId {
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl<S: Into<String>> FromIterator<S> for GroupId {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
