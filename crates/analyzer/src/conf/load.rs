//! Load: config from file and environment variables.
//!
//! Priority: command line > environment > config file > defaults.
//! Command-line overrides are applied by the binary after `load`.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::error::ConfigError;
use super::model::AnalyzerConfig;

pub const CONFIG_FILE_ENV: &str = "ANALYZER_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "analyzer.toml";

impl AnalyzerConfig {
    /// Config file from `$ANALYZER_CONFIG_FILE` (or `./analyzer.toml`) if
    /// present, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&config_path).exists() {
            info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            debug!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Explicit config file (must exist), then environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay `ANALYZER_*` values from `lookup`. Unparseable values are
    /// logged and ignored.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(format) = parsed(&lookup, "ANALYZER_FORMAT") {
            self.format = format;
        }
        if let Some(top_n) = parsed(&lookup, "ANALYZER_TOP_N") {
            self.top_n = top_n;
        }
        if let Some(max_lines) = parsed(&lookup, "ANALYZER_MAX_LINES") {
            self.max_lines = Some(max_lines);
        }
        if let Some(from) = lookup("ANALYZER_FROM") {
            self.from = Some(from);
        }
        if let Some(to) = lookup("ANALYZER_TO") {
            self.to = Some(to);
        }
        if let Some(year) = parsed(&lookup, "ANALYZER_SYSLOG_YEAR") {
            self.syslog_year = Some(year);
        }
        if let Some(limit) = parsed(&lookup, "ANALYZER_SAMPLE_LIMIT") {
            self.sample_limit = limit;
        }
        if let Some(parallel) = parsed(&lookup, "ANALYZER_PARALLEL") {
            self.parallel = parallel;
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
