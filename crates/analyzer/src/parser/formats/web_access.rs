use regex::Captures;

use crate::parser::traits::{group, opt_group, FieldExtractor, LogFormat, RawFields};

/// Combined log format; referrer and user agent are optional so plain
/// Common Log Format lines match as well. Status is restricted to 1xx-5xx.
pub const PATTERN: &str = concat!(
    r#"^(?P<ip>\S+)\s+\S+\s+\S+\s+\[(?P<timestamp>[^\]]+)\]\s+"#,
    r#""(?P<method>\S+)\s+(?P<path>\S+)\s+(?P<protocol>[^"\s]+)"\s+"#,
    r#"(?P<status>[1-5]\d{2})\s+(?P<bytes>\d+|-)"#,
    r#"(?:\s+"(?P<referrer>[^"]*)"\s+"(?P<user_agent>[^"]*)")?(?:\s.*)?$"#,
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessFields<'a> {
    pub ip: &'a str,
    pub timestamp: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub protocol: &'a str,
    pub status: &'a str,
    pub bytes: Option<&'a str>,
    pub referrer: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

pub struct WebAccessExtractor;

impl FieldExtractor for WebAccessExtractor {
    fn format(&self) -> LogFormat {
        LogFormat::WebAccess
    }

    fn pattern(&self) -> &'static str {
        PATTERN
    }

    fn required_groups(&self) -> &'static [&'static str] {
        &[
            "ip", "timestamp", "method", "path", "protocol", "status", "bytes", "referrer",
            "user_agent",
        ]
    }

    fn fields<'a>(&self, caps: &Captures<'a>) -> RawFields<'a> {
        RawFields::WebAccess(AccessFields {
            ip: group(caps, "ip"),
            timestamp: group(caps, "timestamp"),
            method: group(caps, "method"),
            path: group(caps, "path"),
            protocol: group(caps, "protocol"),
            status: group(caps, "status"),
            bytes: opt_group(caps, "bytes"),
            referrer: opt_group(caps, "referrer"),
            user_agent: opt_group(caps, "user_agent"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Grammar;

    fn extract(line: &str) -> Option<AccessFields<'_>> {
        let grammar = Grammar::compile(Box::new(WebAccessExtractor)).unwrap();
        match grammar.extract(line)? {
            RawFields::WebAccess(fields) => Some(fields),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_extract_combined_log_format() {
        let f = extract(r#"192.168.1.101 - - [17/Jan/2026:10:15:32 +0000] "GET /api/users HTTP/1.1" 200 1234 "-" "Mozilla/5.0""#)
            .unwrap();
        assert_eq!(f.ip, "192.168.1.101");
        assert_eq!(f.timestamp, "17/Jan/2026:10:15:32 +0000");
        assert_eq!(f.method, "GET");
        assert_eq!(f.path, "/api/users");
        assert_eq!(f.protocol, "HTTP/1.1");
        assert_eq!(f.status, "200");
        assert_eq!(f.bytes, Some("1234"));
        assert_eq!(f.referrer, None);
        assert_eq!(f.user_agent, Some("Mozilla/5.0"));
    }

    #[test]
    fn test_extract_common_log_format() {
        let f = extract(r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#)
            .unwrap();
        assert_eq!(f.path, "/apache_pb.gif");
        assert_eq!(f.referrer, None);
        assert_eq!(f.user_agent, None);
    }

    #[test]
    fn test_extract_dash_byte_count_and_trailing_fields() {
        let f = extract(r#"10.0.0.1 - - [01/Feb/2026:12:00:00 +0000] "POST /login HTTP/1.1" 304 - "https://example.com/" "curl/8.0" "203.0.113.9""#)
            .unwrap();
        assert_eq!(f.status, "304");
        assert_eq!(f.bytes, None);
        assert_eq!(f.referrer, Some("https://example.com/"));
    }

    #[test]
    fn test_rejects_out_of_range_status() {
        assert!(extract(r#"10.0.0.1 - - [01/Feb/2026:12:00:00 +0000] "GET / HTTP/1.1" 999 10"#).is_none());
        assert!(extract(r#"10.0.0.1 - - [01/Feb/2026:12:00:00 +0000] "GET / HTTP/1.1" 2000 10"#).is_none());
    }

    #[test]
    fn test_rejects_syslog_line() {
        assert!(extract("Jan 17 10:15:32 webserver sshd[1234]: Failed password").is_none());
    }
}
