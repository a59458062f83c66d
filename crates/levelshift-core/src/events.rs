//! Event-based pipeline notification
//!
//! Selection runs report their progress as [`PipelineEvent`]s so logging and
//! metrics can observe a run without the pipeline knowing about them. An
//! [`EventBus`] is owned by one pipeline value; nothing here is global.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Stages of the candidate selection chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Keep candidates whose initial level is above the batch percentile
    StartsHigh,
    /// Drop candidates whose history is dominated by a single spike
    SpikeFilter,
    /// Keep the first row per entity
    Deduplicate,
    /// Sort by proportional change and keep the top N
    RankTruncate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartsHigh => "starts_high",
            Self::SpikeFilter => "spike_filter",
            Self::Deduplicate => "deduplicate",
            Self::RankTruncate => "rank_truncate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline event that can be emitted during execution
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Pipeline execution started
    PipelineStarted {
        trace_id: Uuid,
        timestamp: Instant,
        candidates: usize,
        entities: usize,
    },

    /// A selection stage finished
    StageCompleted {
        trace_id: Uuid,
        stage: Stage,
        input: usize,
        output: usize,
    },

    /// An entity was removed by the spike filter
    EntityRejected {
        trace_id: Uuid,
        entity_code: String,
        reason: String,
    },

    /// Pipeline execution completed
    PipelineCompleted {
        trace_id: Uuid,
        duration: Duration,
        selected: usize,
    },

    /// Error occurred during pipeline execution
    PipelineError {
        trace_id: Uuid,
        stage: &'static str,
        error: String,
    },
}

impl PipelineEvent {
    pub fn trace_id(&self) -> Uuid {
        match self {
            Self::PipelineStarted { trace_id, .. }
            | Self::StageCompleted { trace_id, .. }
            | Self::EntityRejected { trace_id, .. }
            | Self::PipelineCompleted { trace_id, .. }
            | Self::PipelineError { trace_id, .. } => *trace_id,
        }
    }
}

/// Trait for handling pipeline events
pub trait EventHandler: Send + Sync {
    /// Handle a pipeline event
    fn handle_event(&self, event: &PipelineEvent);

    /// Check if this handler is interested in a particular event type
    fn is_interested(&self, event: &PipelineEvent) -> bool {
        let _ = event;
        true
    }

    /// Get the name of this handler for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Distributes events to the handlers registered on one pipeline
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler
    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    /// Register a handler the caller keeps a reference to (e.g. for metrics snapshots)
    pub fn register_shared(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Emit an event to all interested handlers
    pub fn emit(&self, event: &PipelineEvent) {
        for handler in &self.handlers {
            if handler.is_interested(event) {
                handler.handle_event(event);
            }
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.name()))
            .finish()
    }
}

/// Forwards events to the `log` facade
pub struct LoggingHandler {
    level: log::Level,
}

impl LoggingHandler {
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new(log::Level::Debug)
    }
}

impl EventHandler for LoggingHandler {
    fn handle_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::PipelineStarted { trace_id, candidates, entities, .. } => {
                log::log!(
                    self.level,
                    "Selection started: {trace_id} ({candidates} candidates, {entities} entities)"
                );
            }
            PipelineEvent::StageCompleted { trace_id, stage, input, output } => {
                log::log!(self.level, "Stage {stage}: {input} -> {output} (trace: {trace_id})");
            }
            PipelineEvent::PipelineCompleted { trace_id, duration, selected } => {
                log::log!(
                    self.level,
                    "Selection completed: {trace_id} in {duration:?}, {selected} selected"
                );
            }
            PipelineEvent::PipelineError { trace_id, stage, error } => {
                log::error!("Selection error in {stage}: {error} (trace: {trace_id})");
            }
            PipelineEvent::EntityRejected { .. } => {
                log::trace!("Pipeline event: {event:?}");
            }
        }
    }
}

/// Aggregated counters over every run a handler has observed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineMetrics {
    pub total_runs: usize,
    pub completed_runs: usize,
    pub total_selected: usize,
    pub spike_rejections: usize,
    pub errors: HashMap<String, usize>,
}

/// Metrics collection handler
#[derive(Default)]
pub struct MetricsHandler {
    metrics: Mutex<PipelineMetrics>,
}

impl MetricsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> PipelineMetrics {
        match self.metrics.lock() {
            Ok(metrics) => metrics.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventHandler for MetricsHandler {
    fn handle_event(&self, event: &PipelineEvent) {
        let Ok(mut metrics) = self.metrics.lock() else {
            log::error!("Failed to lock metrics");
            return;
        };

        match event {
            PipelineEvent::PipelineStarted { .. } => metrics.total_runs += 1,
            PipelineEvent::PipelineCompleted { selected, .. } => {
                metrics.completed_runs += 1;
                metrics.total_selected += selected;
            }
            PipelineEvent::EntityRejected { .. } => metrics.spike_rejections += 1,
            PipelineEvent::PipelineError { stage, .. } => {
                *metrics.errors.entry(stage.to_string()).or_insert(0) += 1;
            }
            PipelineEvent::StageCompleted { .. } => {}
        }
    }
}

/// Null event handler that does nothing
#[derive(Default, Clone)]
pub struct NullEventHandler;

impl EventHandler for NullEventHandler {
    fn handle_event(&self, _event: &PipelineEvent) {}

    fn is_interested(&self, _event: &PipelineEvent) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(trace_id: Uuid) -> PipelineEvent {
        PipelineEvent::PipelineStarted {
            trace_id,
            timestamp: Instant::now(),
            candidates: 4,
            entities: 3,
        }
    }

    #[test]
    fn test_event_bus() {
        let mut bus = EventBus::new();
        bus.register(LoggingHandler::new(log::Level::Debug));
        bus.register(NullEventHandler);
        assert_eq!(bus.handler_count(), 2);

        bus.emit(&started(Uuid::new_v4()));
    }

    #[test]
    fn test_metrics_handler_through_bus() {
        let metrics = Arc::new(MetricsHandler::new());
        let mut bus = EventBus::new();
        bus.register_shared(metrics.clone());

        let trace_id = Uuid::new_v4();
        bus.emit(&started(trace_id));
        bus.emit(&PipelineEvent::EntityRejected {
            trace_id,
            entity_code: "A".to_string(),
            reason: "spike".to_string(),
        });
        bus.emit(&PipelineEvent::PipelineCompleted {
            trace_id,
            duration: Duration::from_millis(3),
            selected: 2,
        });
        bus.emit(&PipelineEvent::PipelineError {
            trace_id,
            stage: "load",
            error: "missing".to_string(),
        });

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_runs, 1);
        assert_eq!(snapshot.completed_runs, 1);
        assert_eq!(snapshot.total_selected, 2);
        assert_eq!(snapshot.spike_rejections, 1);
        assert_eq!(snapshot.errors.get("load"), Some(&1));
    }

    #[test]
    fn test_trace_id_accessor() {
        let id = Uuid::new_v4();
        assert_eq!(started(id).trace_id(), id);
        assert_eq!(Stage::SpikeFilter.to_string(), "spike_filter");
    }
}
