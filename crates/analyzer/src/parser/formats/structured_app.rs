use regex::Captures;

use crate::parser::traits::{group, opt_group, FieldExtractor, LogFormat, RawFields};

/// `2026-01-17 10:15:32.123 ERROR [database] Connection pool exhausted`
///
/// Severity keyword and `[logger]` are both optional. The keyword is matched
/// case-insensitively and must end on a word boundary (so `INFORMATION` stays
/// in the message).
pub const PATTERN: &str = concat!(
    r"^(?P<timestamp>\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?)\s+",
    r"(?:\[?(?P<severity>(?i:WARNING|WARN|ERROR|CRITICAL|FATAL|DEBUG|INFO))\b\]?[\s:]*)?",
    r"(?:\[(?P<logger>[^\]]+)\]\s*)?",
    r"(?:[-:]\s*)?(?P<message>.+)$",
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppFields<'a> {
    pub timestamp: &'a str,
    pub severity: Option<&'a str>,
    pub logger: Option<&'a str>,
    pub message: &'a str,
}

pub struct StructuredAppExtractor;

impl FieldExtractor for StructuredAppExtractor {
    fn format(&self) -> LogFormat {
        LogFormat::StructuredApp
    }

    fn pattern(&self) -> &'static str {
        PATTERN
    }

    fn required_groups(&self) -> &'static [&'static str] {
        &["timestamp", "severity", "logger", "message"]
    }

    fn fields<'a>(&self, caps: &Captures<'a>) -> RawFields<'a> {
        RawFields::StructuredApp(AppFields {
            timestamp: group(caps, "timestamp"),
            severity: opt_group(caps, "severity"),
            logger: opt_group(caps, "logger"),
            message: group(caps, "message"),
        })
    }
}
