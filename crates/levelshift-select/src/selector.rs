//! Candidate selection: starts-high filter, spike filter, dedup, rank
//!
//! Stages run in a fixed order over one batch of candidates:
//!
//! 1. keep candidates whose `initial_level` is strictly above the configured
//!    quantile of the batch's initial levels
//! 2. drop spike-driven entities ([`SpikeFilter`])
//! 3. keep the first candidate per entity code
//! 4. stable sort by `proportional_change`, descending, and keep `top_n`
//!
//! Undated candidates (no detected change month) take part in every stage
//! and, if they survive, are ranked without a change date.
//!
//! An empty result is a successful outcome; it is never used to signal that
//! the inputs were missing.

use crate::candidate::{ChangeCandidate, FilteredCandidate};
use crate::config::SelectionConfig;
use crate::quantile::quantile;
use crate::stability::{SpikeFilter, SpikeVerdict};
use levelshift_core::{Error, Period, Result, SeriesByEntity};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Number of candidates remaining after each stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub input: usize,
    pub starts_high: usize,
    pub stable: usize,
    pub deduplicated: usize,
    pub selected: usize,
}

/// A candidate removed by the spike filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub entity_code: String,
    pub verdict: SpikeVerdict,
}

/// Result of one selection run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    ranked: Vec<FilteredCandidate>,
    counts: StageCounts,
    /// Starts-high threshold the batch was cut at (`NaN` for an empty batch)
    threshold: f64,
    rejections: Vec<Rejection>,
}

impl Selection {
    /// Ranked survivors, best first
    pub fn ranked(&self) -> &[FilteredCandidate] {
        &self.ranked
    }

    pub fn into_ranked(self) -> Vec<FilteredCandidate> {
        self.ranked
    }

    pub fn counts(&self) -> StageCounts {
        self.counts
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// True when the run succeeded but nothing qualified
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Applies the selection stages of a [`SelectionConfig`]
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    config: SelectionConfig,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self {
            config: SelectionConfig::default(),
        }
    }
}

impl CandidateSelector {
    pub fn new(config: SelectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn spike_filter(&self) -> &SpikeFilter {
        &self.config.spike
    }

    /// Quantile of the batch's initial levels a candidate has to exceed.
    ///
    /// Every candidate counts, including those without a detected change
    /// month; NaN levels are ignored.
    pub fn starts_high_threshold(&self, candidates: &[ChangeCandidate]) -> Result<f64> {
        let levels: Vec<f64> = candidates.iter().map(|c| c.initial_level).collect();
        quantile(
            &levels,
            self.config.initial_level_percentile,
            self.config.interpolation,
        )
    }

    /// Stage 1: candidates starting strictly above the batch threshold
    pub fn starts_high(&self, candidates: &[ChangeCandidate]) -> Result<Vec<ChangeCandidate>> {
        let threshold = self.starts_high_threshold(candidates)?;
        Ok(above(candidates, threshold))
    }

    /// Run every stage.
    ///
    /// The change date of each survivor is offset from the earliest period
    /// found in `series_by_entity`.
    pub fn select_top(
        &self,
        candidates: &[ChangeCandidate],
        series_by_entity: &SeriesByEntity,
    ) -> Result<Selection> {
        let earliest = series_by_entity
            .values()
            .filter_map(|points| points.first().map(|p| p.period))
            .min();
        self.select_top_from(candidates, series_by_entity, earliest)
    }

    /// Run every stage with an explicit earliest period for change dates
    pub fn select_top_from(
        &self,
        candidates: &[ChangeCandidate],
        series_by_entity: &SeriesByEntity,
        earliest: Option<Period>,
    ) -> Result<Selection> {
        let mut counts = StageCounts {
            input: candidates.len(),
            ..StageCounts::default()
        };
        if candidates.is_empty() {
            return Ok(Selection {
                ranked: Vec::new(),
                counts,
                threshold: f64::NAN,
                rejections: Vec::new(),
            });
        }

        let threshold = self.starts_high_threshold(candidates)?;
        let high = above(candidates, threshold);
        counts.starts_high = high.len();

        let (stable, rejected) = self.config.spike.partition(&high, series_by_entity);
        counts.stable = stable.len();

        let unique = deduplicate(stable);
        counts.deduplicated = unique.len();

        let top = rank_and_truncate(unique, self.config.top_n);
        counts.selected = top.len();

        debug!(
            threshold,
            input = counts.input,
            starts_high = counts.starts_high,
            stable = counts.stable,
            deduplicated = counts.deduplicated,
            selected = counts.selected,
            "candidate selection finished"
        );

        let ranked = top
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| {
                let change_date = match (candidate.detected_change_month, earliest) {
                    (None, _) => None,
                    (Some(_), Some(earliest)) => candidate.change_date(earliest)?,
                    (Some(_), None) => {
                        return Err(Error::InvalidInput(
                            "no periods available to date detected changes".to_string(),
                        ));
                    }
                };
                let series = series_by_entity
                    .get(&candidate.entity_code)
                    .cloned()
                    .unwrap_or_default();
                Ok(FilteredCandidate {
                    rank: i + 1,
                    candidate,
                    change_date,
                    series,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Selection {
            ranked,
            counts,
            threshold,
            rejections: rejected
                .into_iter()
                .map(|(candidate, verdict)| Rejection {
                    entity_code: candidate.entity_code,
                    verdict,
                })
                .collect(),
        })
    }
}

fn above(candidates: &[ChangeCandidate], threshold: f64) -> Vec<ChangeCandidate> {
    candidates
        .iter()
        .filter(|c| c.initial_level > threshold)
        .cloned()
        .collect()
}

/// Stage 3: keep the first candidate seen for each entity code
pub fn deduplicate(candidates: Vec<ChangeCandidate>) -> Vec<ChangeCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.entity_code.clone()))
        .collect()
}

/// Stage 4: stable sort by proportional change (descending, NaN last), keep `top_n`
pub fn rank_and_truncate(mut candidates: Vec<ChangeCandidate>, top_n: usize) -> Vec<ChangeCandidate> {
    candidates.sort_by(|a, b| descending_nan_last(a.proportional_change, b.proportional_change));
    candidates.truncate(top_n);
    candidates
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Select with the default stages, overriding the percentile and top N
pub fn select_top(
    candidates: &[ChangeCandidate],
    series_by_entity: &SeriesByEntity,
    initial_level_percentile: f64,
    top_n: usize,
) -> Result<Selection> {
    let config = SelectionConfig::default()
        .with_percentile(initial_level_percentile)
        .with_top_n(top_n);
    CandidateSelector::new(config)?.select_top(candidates, series_by_entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantile::Interpolation;
    use approx::assert_relative_eq;
    use levelshift_core::SeriesPoint;

    fn steady_series(codes: &[&str]) -> SeriesByEntity {
        let start = Period::new(2020, 1).unwrap();
        codes
            .iter()
            .map(|code| {
                let points = [1.0, 2.0, 3.0, 8.0, 9.0]
                    .iter()
                    .enumerate()
                    .map(|(i, &value)| SeriesPoint {
                        period: start.offset_months(i as i32).unwrap(),
                        value,
                    })
                    .collect();
                (code.to_string(), points)
            })
            .collect()
    }

    #[test]
    fn test_starts_high_linear() {
        let candidates: Vec<_> = [("A", 10.0), ("B", 20.0), ("C", 30.0), ("D", 90.0), ("E", 95.0)]
            .iter()
            .map(|&(code, level)| ChangeCandidate::new(code, level, 2, 0.1))
            .collect();

        let selector = CandidateSelector::default();
        assert_eq!(selector.starts_high_threshold(&candidates).unwrap(), 91.0);
        let high = selector.starts_high(&candidates).unwrap();
        let codes: Vec<&str> = high.iter().map(|c| c.entity_code.as_str()).collect();
        assert_eq!(codes, vec!["E"]);

        // Lower interpolation puts the cut exactly at 90, which is not strictly exceeded
        let lower = CandidateSelector::new(
            SelectionConfig::default().with_interpolation(Interpolation::Lower),
        )
        .unwrap();
        assert_eq!(lower.starts_high(&candidates).unwrap().len(), 1);
    }

    #[test]
    fn test_deduplicate_first_wins() {
        let candidates = vec![
            ChangeCandidate::new("A", 1.0, 2, 0.1),
            ChangeCandidate::new("B", 1.0, 2, 0.2),
            ChangeCandidate::new("A", 1.0, 3, 0.9),
        ];
        let unique = deduplicate(candidates);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].proportional_change, 0.1);
    }

    #[test]
    fn test_rank_is_stable_and_nan_last() {
        let candidates = vec![
            ChangeCandidate::new("A", 1.0, 2, 0.5),
            ChangeCandidate::new("B", 1.0, 2, f64::NAN),
            ChangeCandidate::new("C", 1.0, 2, 0.9),
            ChangeCandidate::new("D", 1.0, 2, 0.5),
        ];
        let ranked = rank_and_truncate(candidates, 10);
        let codes: Vec<&str> = ranked.iter().map(|c| c.entity_code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A", "D", "B"]);

        let top = rank_and_truncate(ranked, 2);
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_select_top_full_chain() {
        let mut candidates: Vec<_> = (0..12)
            .map(|i| ChangeCandidate::new(format!("LOW{i}"), i as f64, 2, 5.0))
            .collect();
        candidates.push(ChangeCandidate::new("X", 90.0, 3, 0.3));
        candidates.push(ChangeCandidate::new("Y", 95.0, 4, 0.7));
        candidates.push(ChangeCandidate::new("X", 99.0, 5, 0.9));

        let series = steady_series(&["X", "Y"]);
        let selection = CandidateSelector::default().select_top(&candidates, &series).unwrap();

        let codes: Vec<&str> = selection.ranked().iter().map(|c| c.entity_code()).collect();
        assert_eq!(codes, vec!["Y", "X"]);
        assert_eq!(selection.ranked()[0].rank, 1);
        assert_eq!(selection.ranked()[0].change_date, Some(Period::new(2020, 4).unwrap()));
        assert_eq!(selection.ranked()[1].candidate.detected_change_month, Some(3));
        assert_eq!(selection.ranked()[1].series.len(), 5);

        let counts = selection.counts();
        assert_eq!(counts.input, 15);
        assert_eq!(counts.starts_high, 3);
        assert_eq!(counts.stable, 3);
        assert_eq!(counts.deduplicated, 2);
        assert_eq!(counts.selected, 2);
    }

    #[test]
    fn test_undated_levels_raise_threshold() {
        let mut candidates: Vec<_> = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, code)| ChangeCandidate::new(*code, 0.1 * (i + 1) as f64, 2, 0.5))
            .collect();
        let selector = CandidateSelector::default();
        assert_relative_eq!(selector.starts_high_threshold(&candidates).unwrap(), 0.42, epsilon = 1e-12);

        candidates.extend(
            ["F", "G", "H", "I", "J"]
                .iter()
                .map(|code| ChangeCandidate::undated(*code, 0.9, f64::NAN)),
        );
        assert_relative_eq!(selector.starts_high_threshold(&candidates).unwrap(), 0.9, epsilon = 1e-12);

        let series = steady_series(&["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]);
        let selection = selector.select_top(&candidates, &series).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.counts().input, 10);
        assert_eq!(selection.counts().starts_high, 0);
    }

    #[test]
    fn test_undated_survivor_ranks_without_date() {
        let mut candidates: Vec<_> = (0..8)
            .map(|i| ChangeCandidate::new(format!("LOW{i}"), 0.0, 2, 0.0))
            .collect();
        candidates.push(ChangeCandidate::new("X", 5.0, 3, 0.2));
        candidates.push(ChangeCandidate::undated("U", 5.0, f64::NAN));

        let selection = CandidateSelector::default()
            .select_top(&candidates, &steady_series(&["X", "U"]))
            .unwrap();
        let codes: Vec<&str> = selection.ranked().iter().map(|c| c.entity_code()).collect();
        assert_eq!(codes, vec!["X", "U"]);
        assert_eq!(selection.ranked()[0].change_date, Some(Period::new(2020, 3).unwrap()));
        assert_eq!(selection.ranked()[1].change_date, None);

        // Undated survivors alone need no earliest period
        let undated = vec![
            ChangeCandidate::undated("U", 5.0, 0.1),
            ChangeCandidate::undated("L", 0.0, 0.1),
        ];
        let selection = CandidateSelector::default()
            .select_top_from(&undated, &steady_series(&["U"]), None)
            .unwrap();
        assert_eq!(selection.ranked()[0].change_date, None);
    }

    #[test]
    fn test_empty_batch_is_ok() {
        let selection = select_top(&[], &SeriesByEntity::new(), 0.8, 10).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.counts(), StageCounts::default());
    }

    #[test]
    fn test_rejections_are_recorded() {
        let candidates = vec![
            ChangeCandidate::new("LOW", 0.0, 2, 1.0),
            ChangeCandidate::new("GONE", 10.0, 2, 1.0),
        ];
        let selection = CandidateSelector::default()
            .select_top(&candidates, &steady_series(&["LOW"]))
            .unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.rejections().len(), 1);
        assert_eq!(selection.rejections()[0].entity_code, "GONE");
    }
}
