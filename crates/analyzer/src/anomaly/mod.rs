/// Rule-based anomaly findings over a finished aggregate
///
/// Every rule is a pure function of [`AggregateState`]; `detect` runs them
/// in a fixed order, so the same state always yields the same findings.
use serde::Serialize;

use crate::aggregate::{report::format_hour, AggregateState};

/// parsed error lines / parsed lines above this fires `high_error_rate`.
pub const HIGH_ERROR_RATE: f64 = 0.10;
/// Hourly buckets needed before spikes are meaningful.
pub const SPIKE_MIN_BUCKETS: usize = 3;
pub const SPIKE_FACTOR: f64 = 3.0;
/// Only the most frequent IPs are candidates.
pub const SUSPICIOUS_IP_CANDIDATES: usize = 5;
pub const SUSPICIOUS_IP_FACTOR: f64 = 5.0;
pub const REPEATED_404_THRESHOLD: u64 = 10;
pub const REPEATED_5XX_THRESHOLD: u64 = 5;
/// Percent.
pub const LOW_PARSE_RATE: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    HighErrorRate {
        error_count: u64,
        parsed_count: u64,
        error_rate: f64,
    },
    ErrorSpike {
        hour: String,
        count: u64,
        mean: f64,
        buckets: usize,
    },
    SuspiciousIp {
        ip: String,
        count: u64,
        mean: f64,
    },
    #[serde(rename = "repeated_404")]
    Repeated404 { count: u64 },
    #[serde(rename = "repeated_5xx")]
    Repeated5xx { status_code: u16, count: u64 },
    LowParseRate { parse_rate: f64 },
}

impl Finding {
    pub fn kind(&self) -> &'static str {
        match self {
            Finding::HighErrorRate { .. } => "high_error_rate",
            Finding::ErrorSpike { .. } => "error_spike",
            Finding::SuspiciousIp { .. } => "suspicious_ip",
            Finding::Repeated404 { .. } => "repeated_404",
            Finding::Repeated5xx { .. } => "repeated_5xx",
            Finding::LowParseRate { .. } => "low_parse_rate",
        }
    }
}

/// Run every rule in order.
pub fn detect(state: &AggregateState) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(high_error_rate(state));
    findings.extend(error_spike(state));
    findings.extend(suspicious_ips(state));
    findings.extend(repeated_404(state));
    findings.extend(repeated_5xx(state));
    findings.extend(low_parse_rate(state));
    findings
}

/// Numerator and denominator both come from parsed lines only.
fn high_error_rate(state: &AggregateState) -> Option<Finding> {
    let parsed_count = state.counters().parsed;
    if parsed_count == 0 {
        return None;
    }
    let error_count = state.counters().parsed_errors;
    let error_rate = error_count as f64 / parsed_count as f64;
    (error_rate > HIGH_ERROR_RATE).then(|| Finding::HighErrorRate {
        error_count,
        parsed_count,
        error_rate: round2(error_rate),
    })
}

fn error_spike(state: &AggregateState) -> Option<Finding> {
    let hourly = state.hourly();
    if hourly.len() < SPIKE_MIN_BUCKETS {
        return None;
    }
    let mean = hourly.mean();
    let (hour, count) = hourly.max()?;
    (count as f64 > SPIKE_FACTOR * mean).then(|| Finding::ErrorSpike {
        hour: format_hour(*hour),
        count,
        mean: round2(mean),
        buckets: hourly.len(),
    })
}

fn suspicious_ips(state: &AggregateState) -> Vec<Finding> {
    let ips = state.ips();
    let mean = ips.mean();
    ips.top(SUSPICIOUS_IP_CANDIDATES)
        .into_iter()
        .filter(|(_, count)| *count as f64 > SUSPICIOUS_IP_FACTOR * mean)
        .map(|(ip, count)| Finding::SuspiciousIp {
            ip,
            count,
            mean: round2(mean),
        })
        .collect()
}

fn repeated_404(state: &AggregateState) -> Option<Finding> {
    let count = state.statuses().get(&404);
    (count > REPEATED_404_THRESHOLD).then_some(Finding::Repeated404 { count })
}

/// One finding per 5xx code, ascending.
fn repeated_5xx(state: &AggregateState) -> Vec<Finding> {
    let mut codes: Vec<(u16, u64)> = state
        .statuses()
        .iter()
        .filter(|(code, count)| **code >= 500 && *count > REPEATED_5XX_THRESHOLD)
        .map(|(code, count)| (*code, count))
        .collect();
    codes.sort_by_key(|(code, _)| *code);
    codes
        .into_iter()
        .map(|(status_code, count)| Finding::Repeated5xx { status_code, count })
        .collect()
}

fn low_parse_rate(state: &AggregateState) -> Option<Finding> {
    if state.counters().total == 0 {
        return None;
    }
    let parse_rate = state.parse_rate();
    (parse_rate < LOW_PARSE_RATE).then(|| Finding::LowParseRate {
        parse_rate: round2(parse_rate),
    })
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
