//! Severity resolution.
//!
//! Priority, highest first:
//! 1. An explicitly captured label (web error, structured app)
//! 2. The HTTP status class (web access)
//! 3. A case-insensitive keyword scan of the message
//! 4. INFO for matched lines, UNKNOWN for unmatched ones

use crate::parser::Severity;

/// Keyword families checked in this order; the first family with a hit wins.
pub const KEYWORD_FAMILIES: &[(Severity, &[&str])] = &[
    (Severity::Error, &["ERROR", "FATAL", "CRITICAL", "FAIL"]),
    (Severity::Warn, &["WARN", "WARNING"]),
    (Severity::Info, &["INFO", "INFORMATION"]),
    (Severity::Debug, &["DEBUG"]),
];

/// Map a captured level label onto the closed severity set.
///
/// Covers the syslog-style levels nginx writes (`crit`, `alert`, `emerg`,
/// `notice`) and the application spellings (`FATAL`, `WARNING`).
pub fn from_label(label: &str) -> Option<Severity> {
    let severity = match label.trim().to_ascii_lowercase().as_str() {
        "critical" | "crit" | "fatal" | "alert" | "emerg" | "emergency" | "panic" => {
            Severity::Critical
        }
        "error" | "err" => Severity::Error,
        "warn" | "warning" => Severity::Warn,
        "info" | "information" | "notice" => Severity::Info,
        "debug" | "trace" => Severity::Debug,
        _ => return None,
    };
    Some(severity)
}

/// 5xx is ERROR, 4xx is WARN, everything else INFO.
pub fn from_status(code: u16) -> Severity {
    match code {
        500..=599 => Severity::Error,
        400..=499 => Severity::Warn,
        _ => Severity::Info,
    }
}

pub fn scan_keywords(message: &str) -> Option<Severity> {
    let upper = message.to_ascii_uppercase();
    KEYWORD_FAMILIES
        .iter()
        .find(|(_, words)| words.iter().any(|word| upper.contains(word)))
        .map(|(severity, _)| *severity)
}
