//! Report tables for selected level shifts and scored rows

use crate::html::{escape_attribute, format_cell, format_number, format_text, HtmlTable};
use crate::{EntityLabelResolver, Error, LinkFields, RenderConfig, Renderer, Result};
use levelshift_core::{GroupId, Period, RowId};
use levelshift_moments::{MomentSet, ScoredRow};
use levelshift_select::Selection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// What the selection was run for, as used in links
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportContext {
    /// Short measure name, e.g. `doacs`
    pub measure: String,
    /// Organisation type, e.g. `ccg`
    pub entity_type: String,
}

impl ReportContext {
    pub fn new(measure: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            measure: measure.into(),
            entity_type: entity_type.into(),
        }
    }

    /// Derive the context from a dataset name like `ccg_data_doacs` and a
    /// measure id like `ccg_data_doacs`: the entity type is the dataset's
    /// first `_` segment, the measure the id's last.
    pub fn from_names(dataset: &str, measure_id: &str) -> Self {
        let entity_type = dataset.split('_').next().unwrap_or(dataset);
        let measure = measure_id.rsplit('_').next().unwrap_or(measure_id);
        Self::new(measure, entity_type)
    }
}

/// One selected entity with its label and rendered series
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow<A> {
    pub rank: usize,
    pub entity_code: String,
    /// Display name, or the entity code when no name is known
    pub label: String,
    pub link: Option<String>,
    /// `None` when the detector reported no change month
    pub change_date: Option<Period>,
    pub proportional_change: f64,
    pub artifact: A,
}

/// Ranked report rows, best first
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftReport<A> {
    pub context: ReportContext,
    pub rows: Vec<ReportRow<A>>,
}

impl<A> ShiftReport<A> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<A: std::fmt::Display> ShiftReport<A> {
    /// HTML table: entity, change month, proportional change, artifact
    pub fn to_html(&self, config: &RenderConfig) -> String {
        let titles = &config.titles;
        let mut table = HtmlTable::new(vec![
            titles.entity.clone(),
            titles.change_month.clone(),
            titles.proportional_change.clone(),
            titles.artifact.clone(),
        ]);
        for row in &self.rows {
            let label = format_text(&row.label, config);
            let entity = match &row.link {
                Some(href) => format!("<a href=\"{}\">{label}</a>", escape_attribute(href)),
                None => label,
            };
            table.push_row(vec![
                entity,
                row.change_date.map(|p| p.to_string()).unwrap_or_default(),
                format_number(row.proportional_change, config),
                format_cell(&row.artifact.to_string(), config),
            ]);
        }
        table.render()
    }
}

/// One scored row with its group's distribution rendered
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRow<A> {
    pub row_id: RowId,
    pub group: GroupId,
    pub value: f64,
    pub moments: MomentSet,
    pub z_score: f64,
    pub artifact: A,
}

/// Scored rows, each against the distribution of its group
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionTable<A> {
    pub rows: Vec<DistributionRow<A>>,
}

impl<A: std::fmt::Display> DistributionTable<A> {
    pub fn to_html(&self, config: &RenderConfig) -> String {
        let mut table = HtmlTable::new(
            [
                "code", "month", "value", "mean", "std", "skew", "kurtosis", "z_score",
            ]
            .iter()
            .map(|h| h.to_string())
            .chain(std::iter::once(config.titles.artifact.clone()))
            .collect(),
        );
        for row in &self.rows {
            let mut cells = vec![
                format_text(&row.row_id.entity_code, config),
                row.row_id.period.to_string(),
            ];
            cells.extend(
                [
                    row.value,
                    row.moments.mean,
                    row.moments.std,
                    row.moments.skew,
                    row.moments.kurtosis,
                    row.z_score,
                ]
                .iter()
                .map(|&v| format_number(v, config)),
            );
            cells.push(format_cell(&row.artifact.to_string(), config));
            table.push_row(cells);
        }
        table.render()
    }
}

/// Joins selections and scored rows with labels and rendered artifacts
#[derive(Debug, Clone)]
pub struct ReportAssembler<L, R> {
    labels: L,
    renderer: R,
    config: RenderConfig,
}

impl<L, R> ReportAssembler<L, R>
where
    L: EntityLabelResolver,
    R: Renderer,
{
    pub fn new(labels: L, renderer: R, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            labels,
            renderer,
            config,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Label, link and sparkline for every ranked candidate, in rank order
    pub fn assemble(
        &self,
        selection: &Selection,
        context: &ReportContext,
    ) -> Result<ShiftReport<R::Artifact>> {
        let rows = selection
            .ranked()
            .iter()
            .map(|selected| {
                let code = selected.entity_code();
                let label = self.labels.label(code).unwrap_or_else(|| code.to_string());
                let link = self.config.link.as_ref().map(|template| {
                    template.render(&LinkFields {
                        measure: &context.measure,
                        entity_type: &context.entity_type,
                        code,
                        name: &label,
                    })
                });
                Ok(ReportRow {
                    rank: selected.rank,
                    entity_code: code.to_string(),
                    artifact: self.renderer.sparkline(&selected.series)?,
                    label,
                    link,
                    change_date: selected.change_date,
                    proportional_change: selected.proportional_change(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(rows = rows.len(), measure = %context.measure, "assembled shift report");
        Ok(ShiftReport {
            context: context.clone(),
            rows,
        })
    }

    /// Render each scored row against the values of its own group.
    ///
    /// `subset` picks and orders the rows to show; `None` shows every row.
    pub fn distribution_table(
        &self,
        scored: &[ScoredRow],
        subset: Option<&[RowId]>,
    ) -> Result<DistributionTable<R::Artifact>> {
        let mut by_group: BTreeMap<&GroupId, Vec<f64>> = BTreeMap::new();
        for row in scored {
            by_group.entry(&row.group).or_default().push(row.value);
        }

        let chosen: Vec<&ScoredRow> = match subset {
            None => scored.iter().collect(),
            Some(ids) => ids
                .iter()
                .map(|id| {
                    scored
                        .iter()
                        .find(|row| row.row_id() == *id)
                        .ok_or_else(|| Error::UnknownRow(id.to_string()))
                })
                .collect::<Result<_>>()?,
        };

        let rows = chosen
            .into_iter()
            .map(|row| {
                let distribution = by_group.get(&row.group).map_or(&[][..], Vec::as_slice);
                Ok(DistributionRow {
                    row_id: row.row_id(),
                    group: row.group.clone(),
                    value: row.value,
                    moments: row.moments,
                    z_score: row.z_score,
                    artifact: self.renderer.distribution(row.value, distribution)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DistributionTable { rows })
    }
}

/// Assemble a shift report in one call
pub fn assemble<L, R>(
    selection: &Selection,
    context: &ReportContext,
    labels: &L,
    renderer: &R,
    config: &RenderConfig,
) -> Result<ShiftReport<R::Artifact>>
where
    L: EntityLabelResolver + ?Sized,
    R: Renderer + ?Sized,
{
    ReportAssembler::new(labels, renderer, config.clone())?.assemble(selection, context)
}

/// Render scored rows against their group distributions in one call
pub fn distribution_table<R>(
    scored: &[ScoredRow],
    subset: Option<&[RowId]>,
    renderer: &R,
    config: &RenderConfig,
) -> Result<DistributionTable<R::Artifact>>
where
    R: Renderer + ?Sized,
{
    ReportAssembler::new(crate::CodeLabels, renderer, config.clone())?
        .distribution_table(scored, subset)
}
