//! Seams to the label source and the artifact renderer

use crate::Result;
use levelshift_core::SeriesPoint;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Maps entity codes to display names
pub trait EntityLabelResolver {
    /// Display name for `entity_code`, `None` if unknown
    fn label(&self, entity_code: &str) -> Option<String>;
}

impl<S: BuildHasher> EntityLabelResolver for HashMap<String, String, S> {
    fn label(&self, entity_code: &str) -> Option<String> {
        self.get(entity_code).cloned()
    }
}

impl EntityLabelResolver for BTreeMap<String, String> {
    fn label(&self, entity_code: &str) -> Option<String> {
        self.get(entity_code).cloned()
    }
}

impl<T: EntityLabelResolver + ?Sized> EntityLabelResolver for &T {
    fn label(&self, entity_code: &str) -> Option<String> {
        (**self).label(entity_code)
    }
}

/// Resolver with no names; every entity is shown by its code
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeLabels;

impl EntityLabelResolver for CodeLabels {
    fn label(&self, _entity_code: &str) -> Option<String> {
        None
    }
}

/// Produces embeddable artifacts from numeric data.
///
/// The artifact is opaque to the report: it is only ever written into a
/// table cell through its `Display` impl.
pub trait Renderer {
    type Artifact: fmt::Display;

    /// Small line chart of one entity's series
    fn sparkline(&self, series: &[SeriesPoint]) -> Result<Self::Artifact>;

    /// Density of `distribution` with `value` marked on it
    fn distribution(&self, value: f64, distribution: &[f64]) -> Result<Self::Artifact>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    type Artifact = R::Artifact;

    fn sparkline(&self, series: &[SeriesPoint]) -> Result<Self::Artifact> {
        (**self).sparkline(series)
    }

    fn distribution(&self, value: f64, distribution: &[f64]) -> Result<Self::Artifact> {
        (**self).distribution(value, distribution)
    }
}
