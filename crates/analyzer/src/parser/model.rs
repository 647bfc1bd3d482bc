use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::formats::{AccessFields, AppFields, ErrorFields, SyslogFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// BSD-style syslog (`Jan 17 10:15:32 host proc[pid]: msg`)
    Syslog,
    /// Combined log format access lines (nginx/Apache)
    WebAccess,
    /// nginx-style error log (`2026/01/17 10:15:32 [error] 12#0: ...`)
    WebError,
    /// Application logs with an ISO-like leading timestamp
    StructuredApp,
    /// No grammar matched
    Unknown,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Syslog => "syslog",
            LogFormat::WebAccess => "web_access",
            LogFormat::WebError => "web_error",
            LogFormat::StructuredApp => "structured_app",
            LogFormat::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LogFormat::Unknown)
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied format assertion.
///
/// `Auto` runs detection; a concrete format skips it and the line falls back
/// to [`LogFormat::Unknown`] when that grammar does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FormatHint {
    #[default]
    Auto,
    Fixed(LogFormat),
}

impl FromStr for FormatHint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hint = match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => FormatHint::Auto,
            "syslog" => FormatHint::Fixed(LogFormat::Syslog),
            "web_access" | "nginx_access" | "access" | "combined" => {
                FormatHint::Fixed(LogFormat::WebAccess)
            }
            "web_error" | "nginx_error" | "error" => FormatHint::Fixed(LogFormat::WebError),
            "structured_app" | "app" | "application" => FormatHint::Fixed(LogFormat::StructuredApp),
            other => return Err(ParseError::UnknownFormatHint(other.to_string())),
        };
        Ok(hint)
    }
}

impl TryFrom<String> for FormatHint {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormatHint> for String {
    fn from(hint: FormatHint) -> Self {
        match hint {
            FormatHint::Auto => "auto".to_string(),
            FormatHint::Fixed(format) => format.as_str().to_string(),
        }
    }
}

/// Closed severity set. Ordering runs from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warn,
    Info,
    Debug,
    Unknown,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
        Severity::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Debug => "debug",
            Severity::Unknown => "unknown",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Severity::Critical => 0,
            Severity::Error => 1,
            Severity::Warn => 2,
            Severity::Info => 3,
            Severity::Debug => 4,
            Severity::Unknown => 5,
        }
    }

    /// ERROR and CRITICAL both count toward error statistics.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Critical | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw named captures pulled out of one line by its grammar.
///
/// Borrowed from the line; converted into a [`CanonicalRecord`] by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFields<'a> {
    Syslog(SyslogFields<'a>),
    WebAccess(AccessFields<'a>),
    WebError(ErrorFields<'a>),
    StructuredApp(AppFields<'a>),
}

impl RawFields<'_> {
    pub fn format(&self) -> LogFormat {
        match self {
            RawFields::Syslog(_) => LogFormat::Syslog,
            RawFields::WebAccess(_) => LogFormat::WebAccess,
            RawFields::WebError(_) => LogFormat::WebError,
            RawFields::StructuredApp(_) => LogFormat::StructuredApp,
        }
    }
}

/// Where a line came from. Traceability only; never aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineOrigin {
    pub source_file: String,
    pub line_number: u64,
}

impl LineOrigin {
    pub fn new(source_file: impl Into<String>, line_number: u64) -> Self {
        Self {
            source_file: source_file.into(),
            line_number,
        }
    }
}

/// Format-independent representation of one log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    /// `None` is the explicit "unknown timestamp" marker
    pub timestamp: Option<DateTime<Utc>>,
    pub severity: Severity,
    /// Display text
    pub message: String,
    /// Variable tokens collapsed; used only for frequency counting
    pub message_key: String,
    pub source_format: LogFormat,
    pub ip: Option<String>,
    pub status_code: Option<u16>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub host: Option<String>,
    pub process: Option<String>,
    pub pid: Option<u32>,
    pub logger: Option<String>,
    pub source_file: String,
    pub line_number: u64,
}

impl CanonicalRecord {
    /// Record carrying only provenance, message and severity; the
    /// normalizer fills in whatever else the grammar captured.
    pub fn new(
        origin: LineOrigin,
        format: LogFormat,
        severity: Severity,
        message: String,
        message_key: String,
    ) -> Self {
        Self {
            timestamp: None,
            severity,
            message,
            message_key,
            source_format: format,
            ip: None,
            status_code: None,
            endpoint: None,
            method: None,
            host: None,
            process: None,
            pid: None,
            logger: None,
            source_file: origin.source_file,
            line_number: origin.line_number,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.source_format.is_known()
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unknown format hint: {0}")]
    UnknownFormatHint(String),
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("Grammar for {format} failed to compile: {source}")]
    Compile {
        format: LogFormat,
        #[source]
        source: regex::Error,
    },

    #[error("Grammar for {format} is missing capture group `{group}`")]
    MissingGroup { format: LogFormat, group: &'static str },

    #[error("Grammar for {0} registered twice")]
    Duplicate(LogFormat),

    #[error("Auxiliary pattern `{name}` failed to compile: {source}")]
    Auxiliary {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}
