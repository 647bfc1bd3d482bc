use std::sync::Arc;

use crate::parser::formats::{AccessFields, AppFields, ErrorFields, SyslogFields};
use crate::parser::{
    timestamp, CanonicalRecord, GrammarTable, LineOrigin, LogFormat, ParsedLine, RawFields,
    Severity, UNMATCHED_MESSAGE_LIMIT,
};

use super::message::MessageKeyer;
use super::severity;
use super::truncate_chars;

/// Turns raw captures into a [`CanonicalRecord`].
///
/// Never fails: a timestamp that does not parse stays `None`, a bad status
/// stays `None`, and lines without a grammar become UNKNOWN records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    table: Arc<GrammarTable>,
    keyer: MessageKeyer,
    syslog_year: i32,
}

impl Normalizer {
    /// `syslog_year` is applied to every year-less syslog stamp.
    pub fn new(table: Arc<GrammarTable>, syslog_year: i32) -> Self {
        Self {
            keyer: MessageKeyer::new(table.clone()),
            table,
            syslog_year,
        }
    }

    pub fn syslog_year(&self) -> i32 {
        self.syslog_year
    }

    pub fn keyer(&self) -> &MessageKeyer {
        &self.keyer
    }

    pub fn normalize(&self, parsed: &ParsedLine<'_>, origin: LineOrigin) -> CanonicalRecord {
        match &parsed.fields {
            Some(RawFields::Syslog(fields)) => self.syslog(fields, origin),
            Some(RawFields::WebAccess(fields)) => self.web_access(fields, origin),
            Some(RawFields::WebError(fields)) => self.web_error(fields, origin),
            Some(RawFields::StructuredApp(fields)) => self.structured_app(fields, origin),
            None => self.unmatched(parsed.line, origin),
        }
    }

    fn record(
        &self,
        origin: LineOrigin,
        format: LogFormat,
        severity: Severity,
        message: &str,
    ) -> CanonicalRecord {
        CanonicalRecord::new(
            origin,
            format,
            severity,
            message.to_string(),
            self.keyer.key(message),
        )
    }

    fn syslog(&self, fields: &SyslogFields<'_>, origin: LineOrigin) -> CanonicalRecord {
        let severity = severity::scan_keywords(fields.message).unwrap_or(Severity::Info);

        let mut record = self.record(origin, LogFormat::Syslog, severity, fields.message);
        record.timestamp =
            timestamp::parse_syslog(fields.month, fields.day, fields.time, self.syslog_year);
        record.ip = self.first_ip(fields.message);
        record.host = Some(fields.host.to_string());
        record.process = Some(fields.process.to_string());
        record.pid = fields.pid.and_then(|pid| pid.parse().ok());
        record
    }

    fn web_access(&self, fields: &AccessFields<'_>, origin: LineOrigin) -> CanonicalRecord {
        let status_code = self.status_code(fields.status);
        let severity = status_code
            .map(severity::from_status)
            .unwrap_or(Severity::Info);
        let message = format!("{} {}", fields.method, fields.path);

        let mut record = self.record(origin, LogFormat::WebAccess, severity, &message);
        record.timestamp = timestamp::parse_access(fields.timestamp);
        record.ip = self.client_ip(fields.ip);
        record.status_code = status_code;
        record.endpoint = self.endpoint(fields.path);
        record.method = Some(fields.method.to_string());
        record
    }

    fn web_error(&self, fields: &ErrorFields<'_>, origin: LineOrigin) -> CanonicalRecord {
        let severity = severity::from_label(fields.severity)
            .or_else(|| severity::scan_keywords(fields.message))
            .unwrap_or(Severity::Info);

        let mut record = self.record(origin, LogFormat::WebError, severity, fields.message);
        record.timestamp = timestamp::parse_slash(fields.timestamp);
        record.ip = self.first_ip(fields.message);
        record.pid = fields.pid.parse().ok();
        record
    }

    fn structured_app(&self, fields: &AppFields<'_>, origin: LineOrigin) -> CanonicalRecord {
        let severity = fields
            .severity
            .and_then(severity::from_label)
            .or_else(|| severity::scan_keywords(fields.message))
            .unwrap_or(Severity::Info);

        let mut record = self.record(origin, LogFormat::StructuredApp, severity, fields.message);
        record.timestamp = timestamp::parse_iso(fields.timestamp);
        record.ip = self.first_ip(fields.message);
        record.logger = fields.logger.map(str::to_string);
        record
    }

    /// No grammar applied: bounded message, keyword severity or UNKNOWN,
    /// never a timestamp.
    fn unmatched(&self, line: &str, origin: LineOrigin) -> CanonicalRecord {
        let message = truncate_chars(line, UNMATCHED_MESSAGE_LIMIT);
        let severity = severity::scan_keywords(message).unwrap_or(Severity::Unknown);

        let mut record = self.record(origin, LogFormat::Unknown, severity, message);
        record.ip = self.first_ip(message);
        record
    }

    fn first_ip(&self, text: &str) -> Option<String> {
        self.table
            .aux()
            .ipv4
            .find(text)
            .map(|m| m.as_str().to_string())
    }

    /// The whole client field must be a dotted quad; hostnames, IPv6 and `-` are dropped.
    fn client_ip(&self, raw: &str) -> Option<String> {
        self.table
            .aux()
            .ipv4
            .find(raw)
            .filter(|m| m.start() == 0 && m.end() == raw.len())
            .map(|m| m.as_str().to_string())
    }

    fn status_code(&self, raw: &str) -> Option<u16> {
        if !self.table.aux().http_status.is_match(raw) {
            return None;
        }
        raw.parse().ok()
    }

    /// Request target to endpoint: origin-form paths are kept, absolute URLs
    /// are reduced to their path, anything else (`*`) has no endpoint.
    fn endpoint(&self, target: &str) -> Option<String> {
        if target.starts_with('/') {
            return Some(target.to_string());
        }
        self.table.aux().url_path.captures(target).map(|caps| {
            caps.name("path")
                .map_or_else(|| "/".to_string(), |m| m.as_str().to_string())
        })
    }
}
