//! Model: AnalyzerConfig and its defaults.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregatorSettings, TimeWindow};
use crate::parser::FormatHint;

use super::error::ConfigError;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// `auto` or a concrete format name
    pub format: FormatHint,
    /// Length of every ranked list in the report
    pub top_n: usize,
    /// Stop after this many raw lines across all inputs
    pub max_lines: Option<u64>,
    /// Inclusive lower time bound, absolute or relative (`24h`)
    pub from: Option<String>,
    /// Exclusive upper time bound
    pub to: Option<String>,
    /// Year for year-less syslog stamps; the current year when unset
    pub syslog_year: Option<i32>,
    /// ERROR/CRITICAL records kept verbatim in the report
    pub sample_limit: usize,
    /// Analyze files concurrently (ignored when `max_lines` is set)
    pub parallel: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            format: FormatHint::Auto,
            top_n: DEFAULT_TOP_N,
            max_lines: None,
            from: None,
            to: None,
            syslog_year: None,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            parallel: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid {
                field: "top_n",
                reason: "must be > 0".to_string(),
            });
        }
        if self.max_lines == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_lines",
                reason: "must be > 0 when set".to_string(),
            });
        }
        if let Some(year) = self.syslog_year {
            if !(1..=9999).contains(&year) {
                return Err(ConfigError::Invalid {
                    field: "syslog_year",
                    reason: format!("{} is out of range", year),
                });
            }
        }
        Ok(())
    }

    /// Resolve `from`/`to`; relative bounds are taken against `now`.
    pub fn window(&self, now: DateTime<Utc>) -> Result<TimeWindow, ConfigError> {
        Ok(TimeWindow::parse(
            self.from.as_deref(),
            self.to.as_deref(),
            now,
        )?)
    }

    pub fn resolved_syslog_year(&self, now: DateTime<Utc>) -> i32 {
        self.syslog_year.unwrap_or_else(|| now.year())
    }

    /// Line cap forces a single sequential pass so the cap is global.
    pub fn runs_parallel(&self) -> bool {
        self.parallel && self.max_lines.is_none()
    }

    pub fn settings(&self, now: DateTime<Utc>) -> Result<AggregatorSettings, ConfigError> {
        self.validate()?;
        Ok(AggregatorSettings {
            window: self.window(now)?,
            max_lines: self.max_lines,
            top_n: self.top_n,
            sample_limit: self.sample_limit,
        })
    }
}
