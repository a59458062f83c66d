//! End-to-end selection run over raw rows and detector output

use crate::candidate::ChangeCandidate;
use crate::config::SelectionConfig;
use crate::selector::{CandidateSelector, Selection};
use levelshift_core::{
    earliest_period, series_by_entity, EventBus, EventHandler, Measure, MeasurementRow,
    PipelineEvent, Result, Stage,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

/// Builds per-entity series from rows and runs the candidate selector,
/// reporting progress on its own [`EventBus`]
#[derive(Debug, Clone, Default)]
pub struct ShiftPipeline {
    selector: CandidateSelector,
    measure: Measure,
    events: EventBus,
}

impl ShiftPipeline {
    pub fn new(config: SelectionConfig) -> Result<Self> {
        Ok(Self {
            selector: CandidateSelector::new(config)?,
            measure: Measure::default(),
            events: EventBus::new(),
        })
    }

    /// Which value of each row forms the series the spike filter sees
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_handler<H>(mut self, handler: H) -> Self
    where
        H: EventHandler + 'static,
    {
        self.events.register(handler);
        self
    }

    pub fn with_shared_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.events.register_shared(handler);
        self
    }

    pub fn selector(&self) -> &CandidateSelector {
        &self.selector
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    /// Select the top sustained level shifts among `candidates`.
    ///
    /// `rows` supplies each entity's raw series and the batch's first month,
    /// from which detected change months are dated.
    #[instrument(skip(self, rows, candidates), fields(rows = rows.len(), candidates = candidates.len()))]
    pub fn run(
        &self,
        rows: &[MeasurementRow],
        candidates: &[ChangeCandidate],
    ) -> Result<Selection> {
        let trace_id = Uuid::new_v4();
        let started = Instant::now();
        let series = series_by_entity(rows, self.measure);

        self.events.emit(&PipelineEvent::PipelineStarted {
            trace_id,
            timestamp: started,
            candidates: candidates.len(),
            entities: series.len(),
        });

        let selection = match self
            .selector
            .select_top_from(candidates, &series, earliest_period(rows))
        {
            Ok(selection) => selection,
            Err(e) => {
                self.events.emit(&PipelineEvent::PipelineError {
                    trace_id,
                    stage: "select",
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let counts = selection.counts();
        for (stage, input, output) in [
            (Stage::StartsHigh, counts.input, counts.starts_high),
            (Stage::SpikeFilter, counts.starts_high, counts.stable),
            (Stage::Deduplicate, counts.stable, counts.deduplicated),
            (Stage::RankTruncate, counts.deduplicated, counts.selected),
        ] {
            self.events.emit(&PipelineEvent::StageCompleted {
                trace_id,
                stage,
                input,
                output,
            });
        }
        for rejection in selection.rejections() {
            self.events.emit(&PipelineEvent::EntityRejected {
                trace_id,
                entity_code: rejection.entity_code.clone(),
                reason: rejection.verdict.reason(),
            });
        }

        let duration = started.elapsed();
        self.events.emit(&PipelineEvent::PipelineCompleted {
            trace_id,
            duration,
            selected: selection.len(),
        });
        info!(%trace_id, selected = selection.len(), ?duration, "level-shift selection complete");

        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelshift_core::{MetricsHandler, Period};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<PipelineEvent>>,
    }

    impl EventHandler for Recorder {
        fn handle_event(&self, event: &PipelineEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn rows_for(code: &str, values: &[f64]) -> Vec<MeasurementRow> {
        let jan = Period::new(2020, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| MeasurementRow::new(code, jan.offset_months(i as i32).unwrap(), v, 1.0))
            .collect()
    }

    #[test]
    fn test_run_emits_stage_events() {
        let mut rows = rows_for("SPIKE", &[1.0, 1.0, 1.0, 1.0, 50.0]);
        rows.extend(rows_for("SHIFT", &[1.0, 2.0, 3.0, 8.0, 9.0]));
        let mut candidates: Vec<_> = (0..8)
            .map(|i| ChangeCandidate::new(format!("LOW{i}"), 0.0, 2, 0.0))
            .collect();
        candidates.push(ChangeCandidate::new("SPIKE", 5.0, 5, 49.0));
        candidates.push(ChangeCandidate::new("SHIFT", 5.0, 4, 7.0));

        let recorder = Arc::new(Recorder::default());
        let metrics = Arc::new(MetricsHandler::new());
        let pipeline = ShiftPipeline::default()
            .with_shared_handler(recorder.clone())
            .with_shared_handler(metrics.clone());

        let selection = pipeline.run(&rows, &candidates).unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.ranked()[0].entity_code(), "SHIFT");
        assert_eq!(selection.ranked()[0].change_date, Some(Period::new(2020, 4).unwrap()));

        let events = recorder.events.lock().unwrap();
        let trace_id = events[0].trace_id();
        assert!(events.iter().all(|e| e.trace_id() == trace_id));
        assert!(matches!(events[0], PipelineEvent::PipelineStarted { candidates: 10, entities: 2, .. }));
        assert!(events.iter().any(|e| matches!(
            e,
            PipelineEvent::EntityRejected { entity_code, .. } if entity_code == "SPIKE"
        )));
        assert!(matches!(
            events.last(),
            Some(PipelineEvent::PipelineCompleted { selected: 1, .. })
        ));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.completed_runs, 1);
        assert_eq!(snapshot.spike_rejections, 1);
    }

    #[test]
    fn test_empty_candidates_is_success() {
        let rows = rows_for("A", &[1.0, 2.0]);
        let selection = ShiftPipeline::default().run(&rows, &[]).unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ShiftPipeline::new(SelectionConfig::default().with_top_n(0)).is_err());
    }
}
