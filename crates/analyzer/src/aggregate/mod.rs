/// Streaming aggregation
///
/// # Architecture
///
/// - `frequency.rs`: Insertion-ordered counting map with stable top-N
/// - `state.rs`: Mergeable `AggregateState` (counters, maps, timeline, samples)
/// - `window.rs`: Half-open time window and bound parsing
/// - `report.rs`: Report assembly from a finished state
///
/// `StreamingAggregator` owns one state plus the run settings and applies the
/// window and line cap in front of it.

pub mod frequency;
pub mod state;
pub mod window;
pub mod report;

pub use frequency::FrequencyMap;
pub use report::Report;
pub use state::{AggregateState, ErrorSample, LineCounters};
pub use window::{TimeWindow, WindowError};

use crate::parser::CanonicalRecord;

/// Per-run knobs the aggregator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    pub window: TimeWindow,
    /// Raw lines (blank ones included) after which ingestion stops
    pub max_lines: Option<u64>,
    pub top_n: usize,
    pub sample_limit: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            window: TimeWindow::unbounded(),
            max_lines: None,
            top_n: crate::conf::DEFAULT_TOP_N,
            sample_limit: crate::conf::DEFAULT_SAMPLE_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamingAggregator {
    settings: AggregatorSettings,
    state: AggregateState,
}

impl StreamingAggregator {
    pub fn new(settings: AggregatorSettings) -> Self {
        Self {
            state: AggregateState::new(settings.sample_limit),
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// True once the line cap has been reached; further lines are ignored.
    pub fn is_capped(&self) -> bool {
        self.settings
            .max_lines
            .map_or(false, |cap| self.state.counters().total >= cap)
    }

    /// Returns false if the line was dropped because of the cap.
    pub fn observe_blank(&mut self) -> bool {
        if self.is_capped() {
            return false;
        }
        self.state.record_blank();
        true
    }

    /// Returns false if the line was dropped because of the cap.
    pub fn observe(&mut self, record: &CanonicalRecord) -> bool {
        if self.is_capped() {
            return false;
        }
        if self.settings.window.admits(record.timestamp) {
            self.state.observe(record);
        } else {
            self.state.record_filtered();
        }
        true
    }

    /// Fold in a state built elsewhere (another file, another worker).
    pub fn absorb(&mut self, other: AggregateState) {
        self.state.merge(other);
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    pub fn into_state(self) -> AggregateState {
        self.state
    }

    pub fn report(&self) -> Report {
        Report::build(&self.state, self.settings.top_n)
    }

    pub fn finish(self) -> Report {
        self.report()
    }
}
