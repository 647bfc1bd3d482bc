//! Tolerant timestamp resolution.
//!
//! Each format family has an ordered list of layouts; the first one that
//! parses wins. Failure is `None` (the unknown marker), never "now".

use std::borrow::Cow;

use chrono::{DateTime, NaiveDateTime, Utc};

/// One textual layout, either carrying its own UTC offset or naive (read as UTC).
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    Zoned(&'static str),
    Naive(&'static str),
}

impl Layout {
    fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        match self {
            Layout::Zoned(fmt) => DateTime::parse_from_str(text, fmt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Naive(fmt) => NaiveDateTime::parse_from_str(text, fmt)
                .ok()
                .map(|naive| naive.and_utc()),
        }
    }
}

/// Syslog text after the assumed year has been prepended.
pub const SYSLOG_LAYOUTS: &[Layout] = &[Layout::Naive("%Y %b %d %H:%M:%S")];

/// Combined log format: `17/Jan/2026:10:15:32 +0000`
pub const ACCESS_LAYOUTS: &[Layout] = &[
    Layout::Zoned("%d/%b/%Y:%H:%M:%S %z"),
    Layout::Naive("%d/%b/%Y:%H:%M:%S"),
];

/// nginx error log: `2026/01/17 10:15:32`
pub const SLASH_LAYOUTS: &[Layout] = &[Layout::Naive("%Y/%m/%d %H:%M:%S")];

/// ISO-like: `2026-01-17 10:15:32[.123][+01:00]`, `T` separator accepted.
pub const ISO_LAYOUTS: &[Layout] = &[
    Layout::Zoned("%Y-%m-%dT%H:%M:%S%.f%:z"),
    Layout::Zoned("%Y-%m-%d %H:%M:%S%.f%:z"),
    Layout::Zoned("%Y-%m-%dT%H:%M:%S%.f%z"),
    Layout::Zoned("%Y-%m-%d %H:%M:%S%.f%z"),
    Layout::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::Naive("%Y-%m-%d %H:%M:%S%.f"),
];

/// Try `layouts` in order.
pub fn parse_with(layouts: &[Layout], text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    layouts.iter().find_map(|layout| layout.parse(text))
}

/// Year-less syslog stamp; `year` is supplied by the caller.
pub fn parse_syslog(month: &str, day: &str, time: &str, year: i32) -> Option<DateTime<Utc>> {
    let text = format!("{} {} {} {}", year, month, day, time);
    parse_with(SYSLOG_LAYOUTS, &text)
}

pub fn parse_access(text: &str) -> Option<DateTime<Utc>> {
    parse_with(ACCESS_LAYOUTS, text)
}

pub fn parse_slash(text: &str) -> Option<DateTime<Utc>> {
    parse_with(SLASH_LAYOUTS, text)
}

/// ISO stamps with comma fractions (`,123`) and a `Z` suffix are rewritten
/// into the dotted / numeric-offset spelling chrono expects.
pub fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    parse_with(ISO_LAYOUTS, &canonical_iso(text.trim()))
}

fn canonical_iso(text: &str) -> Cow<'_, str> {
    let needs_zone = text.ends_with('Z') || text.ends_with('z');
    let needs_dot = text.contains(',');
    if !needs_zone && !needs_dot {
        return Cow::Borrowed(text);
    }

    let mut owned = text.replace(',', ".");
    if needs_zone {
        owned.pop();
        owned.push_str("+00:00");
    }
    Cow::Owned(owned)
}
