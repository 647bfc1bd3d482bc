use regex::Captures;

use crate::parser::traits::{group, opt_group, FieldExtractor, LogFormat, RawFields};

/// `Jan 17 10:15:32 webserver sshd[1234]: message`
///
/// Deliberately loose (`word day time host token: message`); it has to be
/// tried after the web grammars or it will claim their lines.
pub const PATTERN: &str = concat!(
    r"^(?P<month>\w+)\s+(?P<day>\d+)\s+(?P<time>\d+:\d+:\d+)\s+",
    r"(?P<host>\S+)\s+(?P<process>\S+?)(?:\[(?P<pid>\d+)\])?\s*:\s*",
    r"(?P<message>.+)$",
);

/// BSD syslog captures. The source text carries no year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogFields<'a> {
    pub month: &'a str,
    pub day: &'a str,
    pub time: &'a str,
    pub host: &'a str,
    pub process: &'a str,
    pub pid: Option<&'a str>,
    pub message: &'a str,
}

pub struct SyslogExtractor;

impl FieldExtractor for SyslogExtractor {
    fn format(&self) -> LogFormat {
        LogFormat::Syslog
    }

    fn pattern(&self) -> &'static str {
        PATTERN
    }

    fn required_groups(&self) -> &'static [&'static str] {
        &["month", "day", "time", "host", "process", "pid", "message"]
    }

    fn fields<'a>(&self, caps: &Captures<'a>) -> RawFields<'a> {
        RawFields::Syslog(SyslogFields {
            month: group(caps, "month"),
            day: group(caps, "day"),
            time: group(caps, "time"),
            host: group(caps, "host"),
            process: group(caps, "process"),
            pid: opt_group(caps, "pid"),
            message: group(caps, "message"),
        })
    }
}
