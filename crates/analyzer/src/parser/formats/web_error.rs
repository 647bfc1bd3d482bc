use regex::Captures;

use crate::parser::traits::{group, opt_group, FieldExtractor, LogFormat, RawFields};

/// `2026/01/17 10:15:32 [error] 1234#0: *1 connect() failed ...`
pub const PATTERN: &str = concat!(
    r"^(?P<timestamp>\d{4}/\d{2}/\d{2}\s+\d{2}:\d{2}:\d{2})\s+",
    r"\[(?P<severity>\w+)\]\s+(?P<pid>\d+)#(?P<tid>\d+):\s+",
    r"(?:\*(?P<connection_id>\d+)\s+)?(?P<message>.+)$",
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFields<'a> {
    pub timestamp: &'a str,
    pub severity: &'a str,
    pub pid: &'a str,
    pub tid: &'a str,
    pub connection_id: Option<&'a str>,
    pub message: &'a str,
}

pub struct WebErrorExtractor;

impl FieldExtractor for WebErrorExtractor {
    fn format(&self) -> LogFormat {
        LogFormat::WebError
    }

    fn pattern(&self) -> &'static str {
        PATTERN
    }

    fn required_groups(&self) -> &'static [&'static str] {
        &["timestamp", "severity", "pid", "tid", "connection_id", "message"]
    }

    fn fields<'a>(&self, caps: &Captures<'a>) -> RawFields<'a> {
        RawFields::WebError(ErrorFields {
            timestamp: group(caps, "timestamp"),
            severity: group(caps, "severity"),
            pid: group(caps, "pid"),
            tid: group(caps, "tid"),
            connection_id: opt_group(caps, "connection_id"),
            message: group(caps, "message"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Grammar;

    fn extract(line: &str) -> Option<ErrorFields<'_>> {
        let grammar = Grammar::compile(Box::new(WebErrorExtractor)).unwrap();
        match grammar.extract(line)? {
            RawFields::WebError(fields) => Some(fields),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_extract_with_connection_id() {
        let f = extract("2026/01/17 10:15:32 [error] 1234#0: *1 connect() failed (111: Connection refused)")
            .unwrap();
        assert_eq!(f.timestamp, "2026/01/17 10:15:32");
        assert_eq!(f.severity, "error");
        assert_eq!(f.pid, "1234");
        assert_eq!(f.tid, "0");
        assert_eq!(f.connection_id, Some("1"));
        assert_eq!(f.message, "connect() failed (111: Connection refused)");
    }

    #[test]
    fn test_extract_without_connection_id() {
        let f = extract("2026/01/17 10:15:33 [warn] 77#77: worker process exited").unwrap();
        assert_eq!(f.severity, "warn");
        assert_eq!(f.connection_id, None);
        assert_eq!(f.message, "worker process exited");
    }

    #[test]
    fn test_rejects_dash_dates() {
        assert!(extract("2026-01-17 10:15:32 [error] 1234#0: boom").is_none());
    }
}
