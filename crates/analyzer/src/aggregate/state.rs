use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::{CanonicalRecord, Severity};

use super::frequency::FrequencyMap;

pub const HOUR_SECS: i64 = 3_600;
pub const DAY_SECS: i64 = 86_400;

/// Line accounting. `total == parsed + skipped` always holds; `skipped` is
/// the sum of the four breakdown counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineCounters {
    pub total: u64,
    pub parsed: u64,
    pub skipped: u64,
    /// No grammar matched
    pub unparsed: u64,
    /// Timestamp outside the time window
    pub filtered: u64,
    /// Grammar matched but the timestamp did not resolve
    pub untimed: u64,
    pub blank: u64,
    /// ERROR/CRITICAL among the parsed lines only
    pub parsed_errors: u64,
}

impl LineCounters {
    fn merge(&mut self, other: &LineCounters) {
        self.total += other.total;
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.unparsed += other.unparsed;
        self.filtered += other.filtered;
        self.untimed += other.untimed;
        self.blank += other.blank;
        self.parsed_errors += other.parsed_errors;
    }
}

/// One count per [`Severity`], indexed in [`Severity::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts([u64; 6]);

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> u64 {
        self.0[severity.index()]
    }

    fn increment(&mut self, severity: Severity) {
        self.0[severity.index()] += 1;
    }

    fn merge(&mut self, other: &SeverityCounts) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            *mine += theirs;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Severity, u64)> + '_ {
        Severity::ALL
            .into_iter()
            .map(move |sev| (sev, self.get(sev)))
    }

    /// ERROR plus CRITICAL.
    pub fn errors(&self) -> u64 {
        self.get(Severity::Error) + self.get(Severity::Critical)
    }
}

/// An ERROR/CRITICAL record kept verbatim for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSample {
    pub timestamp: Option<DateTime<Utc>>,
    pub severity: Severity,
    pub message: String,
    pub source_file: String,
    pub line_number: u64,
}

impl ErrorSample {
    fn from_record(record: &CanonicalRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            severity: record.severity,
            message: record.message.clone(),
            source_file: record.source_file.clone(),
            line_number: record.line_number,
        }
    }
}

/// Everything the report needs, accumulated one record at a time.
///
/// Memory is bounded by distinct keys, never by line count. Two states built
/// over disjoint inputs can be merged; counts add, time bounds widen.
#[derive(Debug, Clone)]
pub struct AggregateState {
    counters: LineCounters,
    severities: SeverityCounts,
    messages: FrequencyMap<String>,
    ips: FrequencyMap<String>,
    statuses: FrequencyMap<u16>,
    endpoints: FrequencyMap<String>,
    hourly: FrequencyMap<DateTime<Utc>>,
    daily: FrequencyMap<DateTime<Utc>>,
    first_seen: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
    samples: Vec<ErrorSample>,
    sample_limit: usize,
}

impl Default for AggregateState {
    fn default() -> Self {
        Self::new(crate::conf::DEFAULT_SAMPLE_LIMIT)
    }
}

impl AggregateState {
    pub fn new(sample_limit: usize) -> Self {
        Self {
            counters: LineCounters::default(),
            severities: SeverityCounts::default(),
            messages: FrequencyMap::new(),
            ips: FrequencyMap::new(),
            statuses: FrequencyMap::new(),
            endpoints: FrequencyMap::new(),
            hourly: FrequencyMap::new(),
            daily: FrequencyMap::new(),
            first_seen: None,
            last_seen: None,
            samples: Vec::new(),
            sample_limit,
        }
    }

    pub fn record_blank(&mut self) {
        self.counters.total += 1;
        self.counters.skipped += 1;
        self.counters.blank += 1;
    }

    /// A record the time window rejected. Counted, nothing else.
    pub fn record_filtered(&mut self) {
        self.counters.total += 1;
        self.counters.skipped += 1;
        self.counters.filtered += 1;
    }

    /// Fold one admitted record in.
    ///
    /// Records with an unknown timestamp still feed severity, message and
    /// IP statistics but stay out of the timeline and the parsed count.
    pub fn observe(&mut self, record: &CanonicalRecord) {
        self.counters.total += 1;
        match (record.is_matched(), record.timestamp) {
            (false, _) => {
                self.counters.skipped += 1;
                self.counters.unparsed += 1;
            }
            (true, None) => {
                self.counters.skipped += 1;
                self.counters.untimed += 1;
            }
            (true, Some(_)) => {
                self.counters.parsed += 1;
                if record.severity.is_error() {
                    self.counters.parsed_errors += 1;
                }
            }
        }

        self.severities.increment(record.severity);
        self.messages.increment(record.message_key.as_str());
        if let Some(ip) = &record.ip {
            self.ips.increment(ip.as_str());
        }
        if let Some(code) = record.status_code {
            self.statuses.increment(&code);
        }
        if let Some(endpoint) = &record.endpoint {
            self.endpoints.increment(endpoint.as_str());
        }

        if let Some(ts) = record.timestamp {
            self.hourly.increment(&truncate(ts, HOUR_SECS));
            self.daily.increment(&truncate(ts, DAY_SECS));
            self.first_seen = Some(self.first_seen.map_or(ts, |first| first.min(ts)));
            self.last_seen = Some(self.last_seen.map_or(ts, |last| last.max(ts)));
        }

        if record.severity.is_error() && self.samples.len() < self.sample_limit {
            self.samples.push(ErrorSample::from_record(record));
        }
    }

    /// Combine with a state built over a later slice of the input.
    ///
    /// Associative; commutative for every count. Tie order in rankings and
    /// the error sample follow merge order, so callers merge in input order.
    pub fn merge(&mut self, other: AggregateState) {
        self.counters.merge(&other.counters);
        self.severities.merge(&other.severities);
        self.messages.merge(other.messages);
        self.ips.merge(other.ips);
        self.statuses.merge(other.statuses);
        self.endpoints.merge(other.endpoints);
        self.hourly.merge(other.hourly);
        self.daily.merge(other.daily);
        self.first_seen = earliest(self.first_seen, other.first_seen);
        self.last_seen = latest(self.last_seen, other.last_seen);

        let room = self.sample_limit.saturating_sub(self.samples.len());
        self.samples.extend(other.samples.into_iter().take(room));
    }

    pub fn counters(&self) -> &LineCounters {
        &self.counters
    }

    pub fn severities(&self) -> &SeverityCounts {
        &self.severities
    }

    pub fn messages(&self) -> &FrequencyMap<String> {
        &self.messages
    }

    pub fn ips(&self) -> &FrequencyMap<String> {
        &self.ips
    }

    pub fn statuses(&self) -> &FrequencyMap<u16> {
        &self.statuses
    }

    pub fn endpoints(&self) -> &FrequencyMap<String> {
        &self.endpoints
    }

    /// Keyed by the start of each UTC hour.
    pub fn hourly(&self) -> &FrequencyMap<DateTime<Utc>> {
        &self.hourly
    }

    /// Keyed by UTC midnight.
    pub fn daily(&self) -> &FrequencyMap<DateTime<Utc>> {
        &self.daily
    }

    pub fn time_range(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.first_seen, self.last_seen)
    }

    pub fn samples(&self) -> &[ErrorSample] {
        &self.samples
    }

    pub fn sample_limit(&self) -> usize {
        self.sample_limit
    }

    /// Percentage of lines that parsed and passed the window, `0.0` for no input.
    pub fn parse_rate(&self) -> f64 {
        if self.counters.total == 0 {
            return 0.0;
        }
        self.counters.parsed as f64 / self.counters.total as f64 * 100.0
    }
}

/// Round `ts` down to a multiple of `step` seconds since the epoch.
pub fn truncate(ts: DateTime<Utc>, step: i64) -> DateTime<Utc> {
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(step), 0).unwrap_or(ts)
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn latest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
