use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::anomaly::{self, round2, Finding};
use crate::parser::Severity;

use super::frequency::FrequencyMap;
use super::state::{AggregateState, ErrorSample};

pub const HOUR_FORMAT: &str = "%Y-%m-%d %H:00";
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn format_hour(ts: DateTime<Utc>) -> String {
    ts.format(HOUR_FORMAT).to_string()
}

pub fn format_day(ts: DateTime<Utc>) -> String {
    ts.format(DAY_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_lines: u64,
    pub parsed_lines: u64,
    pub skipped_lines: u64,
    pub unparsed_lines: u64,
    pub filtered_lines: u64,
    pub untimed_lines: u64,
    pub blank_lines: u64,
    /// Percent, two decimals
    pub parse_rate: f64,
    /// ERROR plus CRITICAL
    pub error_count: u64,
    /// Same as `error_count`, kept for older consumers
    pub total_errors: u64,
    pub total_critical: u64,
    pub total_warnings: u64,
    pub total_info: u64,
    pub total_debug: u64,
    pub total_unknown: u64,
    pub unique_ips: usize,
    pub unique_status_codes: usize,
    pub unique_endpoints: usize,
    pub unique_messages: usize,
    pub time_range: TimeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCount {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpCount {
    pub ip: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status_code: u16,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourBucket {
    pub hour: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotableFindings {
    pub has_findings: bool,
    pub findings: Vec<Finding>,
}

impl NotableFindings {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self {
            has_findings: !findings.is_empty(),
            findings,
        }
    }
}

/// Final report. Field names are the stable output schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub severity_counts: BTreeMap<Severity, u64>,
    pub top_messages: Vec<MessageCount>,
    pub top_ips: Vec<IpCount>,
    pub top_status_codes: Vec<StatusCount>,
    pub top_endpoints: Vec<EndpointCount>,
    /// Ascending by hour
    pub timeline_by_hour: Vec<HourBucket>,
    /// Ascending by day
    pub timeline_by_day: Vec<DayBucket>,
    pub notable_findings: NotableFindings,
    pub error_samples: Vec<ErrorSample>,
}

impl Report {
    /// Pure function of the state: same state, same report.
    pub fn build(state: &AggregateState, top_n: usize) -> Self {
        let severities = state.severities();
        let counters = state.counters();
        let (start, end) = state.time_range();

        let summary = Summary {
            total_lines: counters.total,
            parsed_lines: counters.parsed,
            skipped_lines: counters.skipped,
            unparsed_lines: counters.unparsed,
            filtered_lines: counters.filtered,
            untimed_lines: counters.untimed,
            blank_lines: counters.blank,
            parse_rate: round2(state.parse_rate()),
            error_count: severities.errors(),
            total_errors: severities.errors(),
            total_critical: severities.get(Severity::Critical),
            total_warnings: severities.get(Severity::Warn),
            total_info: severities.get(Severity::Info),
            total_debug: severities.get(Severity::Debug),
            total_unknown: severities.get(Severity::Unknown),
            unique_ips: state.ips().len(),
            unique_status_codes: state.statuses().len(),
            unique_endpoints: state.endpoints().len(),
            unique_messages: state.messages().len(),
            time_range: TimeRange { start, end },
        };

        Self {
            summary,
            severity_counts: severities.iter().collect(),
            top_messages: state
                .messages()
                .top(top_n)
                .into_iter()
                .map(|(message, count)| MessageCount { message, count })
                .collect(),
            top_ips: state
                .ips()
                .top(top_n)
                .into_iter()
                .map(|(ip, count)| IpCount { ip, count })
                .collect(),
            top_status_codes: state
                .statuses()
                .top(top_n)
                .into_iter()
                .map(|(status_code, count)| StatusCount { status_code, count })
                .collect(),
            top_endpoints: state
                .endpoints()
                .top(top_n)
                .into_iter()
                .map(|(endpoint, count)| EndpointCount { endpoint, count })
                .collect(),
            timeline_by_hour: sorted_buckets(state.hourly())
                .into_iter()
                .map(|(ts, count)| HourBucket {
                    hour: format_hour(ts),
                    count,
                })
                .collect(),
            timeline_by_day: sorted_buckets(state.daily())
                .into_iter()
                .map(|(ts, count)| DayBucket {
                    day: format_day(ts),
                    count,
                })
                .collect(),
            notable_findings: NotableFindings::new(anomaly::detect(state)),
            error_samples: state.samples().to_vec(),
        }
    }

    /// The summary block plus findings, without the ranked lists.
    pub fn summary_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "summary": self.summary,
            "severity_counts": self.severity_counts,
            "notable_findings": self.notable_findings,
        })
    }
}

fn sorted_buckets(buckets: &FrequencyMap<DateTime<Utc>>) -> Vec<(DateTime<Utc>, u64)> {
    let mut sorted: Vec<(DateTime<Utc>, u64)> =
        buckets.iter().map(|(ts, count)| (*ts, count)).collect();
    sorted.sort_by_key(|(ts, _)| *ts);
    sorted
}
