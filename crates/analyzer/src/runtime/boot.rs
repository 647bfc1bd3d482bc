//! Boot: logging init, config resolution, grammar table construction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::aggregate::{AggregatorSettings, StreamingAggregator};
use crate::conf::AnalyzerConfig;
use crate::logs::LineProcessor;
use crate::parser::GrammarTable;

/// Initialise the tracing / logging subsystem. Logs go to stderr so the
/// report on stdout stays machine-readable.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Everything a run needs, resolved once.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub config: AnalyzerConfig,
    pub settings: AggregatorSettings,
    pub processor: LineProcessor,
}

impl Analysis {
    pub fn aggregator(&self) -> StreamingAggregator {
        StreamingAggregator::new(self.settings)
    }

    /// Per-file aggregator for concurrent runs: same settings, no line cap.
    pub fn worker_aggregator(&self) -> StreamingAggregator {
        StreamingAggregator::new(AggregatorSettings {
            max_lines: None,
            ..self.settings
        })
    }
}

/// Validate config, compile the grammar table and resolve every
/// clock-dependent setting against `now`.
///
/// Grammar construction failure is fatal.
pub fn boot(
    config: AnalyzerConfig,
    now: DateTime<Utc>,
) -> Result<Analysis, Box<dyn std::error::Error>> {
    info!("Starting log analyzer v{}", env!("CARGO_PKG_VERSION"));

    let settings = config.settings(now)?;
    let table = GrammarTable::standard().map_err(|e| {
        error!("Failed to build grammar table: {}", e);
        e
    })?;
    info!("Compiled {} grammars", table.len());

    let syslog_year = config.resolved_syslog_year(now);
    info!(
        "format={}, top_n={}, max_lines={:?}, syslog_year={}",
        String::from(config.format),
        settings.top_n,
        settings.max_lines,
        syslog_year
    );
    if !settings.window.is_unbounded() {
        info!(
            "Time window: from={:?} to={:?}",
            settings.window.from(),
            settings.window.to()
        );
    }

    let processor = LineProcessor::from_table(Arc::new(table), config.format, syslog_year);
    Ok(Analysis {
        config,
        settings,
        processor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_boot_defaults() {
        let analysis = boot(AnalyzerConfig::default(), now()).unwrap();
        assert_eq!(analysis.processor.normalizer().syslog_year(), 2026);
        assert!(analysis.settings.window.is_unbounded());
    }

    #[test]
    fn test_boot_rejects_invalid_config() {
        let config = AnalyzerConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(boot(config, now()).is_err());
    }

    #[test]
    fn test_worker_aggregator_drops_cap() {
        let config = AnalyzerConfig {
            max_lines: Some(5),
            ..Default::default()
        };
        let analysis = boot(config, now()).unwrap();
        assert_eq!(analysis.aggregator().settings().max_lines, Some(5));
        assert_eq!(analysis.worker_aggregator().settings().max_lines, None);
    }
}
