//! Run: file fan-out onto blocking workers and in-order fan-in.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::task;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregateState, Report, StreamingAggregator};
use crate::logs::{ingest_lines, ingest_reader, Ingest, LineProcessor, ReadError};

use super::boot::Analysis;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: ReadError,
    },

    #[error("Worker for {path} failed: {reason}")]
    Worker { path: String, reason: String },
}

impl InputError {
    pub fn path(&self) -> &str {
        match self {
            InputError::Open { path, .. }
            | InputError::Read { path, .. }
            | InputError::Worker { path, .. } => path,
        }
    }
}

/// A per-input failure carried alongside the report instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDiagnostic {
    pub source: String,
    pub error: String,
}

impl From<&InputError> for InputDiagnostic {
    fn from(err: &InputError) -> Self {
        Self {
            source: err.path().to_string(),
            error: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    #[serde(flatten)]
    pub report: Report,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_errors: Vec<InputDiagnostic>,
}

impl RunOutcome {
    /// [`Report::summary_payload`] plus `input_errors` when any input failed.
    pub fn summary_payload(&self) -> serde_json::Value {
        let mut payload = self.report.summary_payload();
        if !self.input_errors.is_empty() {
            payload["input_errors"] = serde_json::json!(self.input_errors);
        }
        payload
    }
}

/// Stream one file into `aggregator`. Lines read before a failure stay counted.
pub fn analyze_file(
    processor: &LineProcessor,
    aggregator: &mut StreamingAggregator,
    path: &Path,
) -> Result<Ingest, InputError> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| InputError::Open {
        path: source.clone(),
        source: e,
    })?;

    let outcome = ingest_reader(processor, aggregator, &source, BufReader::new(file)).map_err(
        |e| InputError::Read {
            path: source.clone(),
            source: e,
        },
    )?;
    debug!(source = %source, ?outcome, "Input finished");
    Ok(outcome)
}

/// In-memory input, mostly for embedding and tests.
pub fn analyze_lines<I, S>(analysis: &Analysis, source: &str, lines: I) -> Report
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut aggregator = analysis.aggregator();
    ingest_lines(&analysis.processor, &mut aggregator, source, lines);
    aggregator.finish()
}

/// Analyze `paths` and build the report.
///
/// Files run on separate blocking workers unless a line cap is set or
/// parallelism is off; either way states are merged in input order, so
/// the report does not depend on scheduling.
pub async fn analyze(analysis: Arc<Analysis>, paths: Vec<PathBuf>) -> RunOutcome {
    info!("Analyzing {} input(s)", paths.len());

    let (state, input_errors) = if analysis.config.runs_parallel() && paths.len() > 1 {
        concurrent(Arc::clone(&analysis), paths).await
    } else {
        sequential(Arc::clone(&analysis), paths).await
    };

    let report = Report::build(&state, analysis.settings.top_n);
    info!(
        total = report.summary.total_lines,
        parsed = report.summary.parsed_lines,
        findings = report.notable_findings.findings.len(),
        failed_inputs = input_errors.len(),
        "Analysis complete"
    );

    RunOutcome {
        report,
        input_errors,
    }
}

async fn sequential(
    analysis: Arc<Analysis>,
    paths: Vec<PathBuf>,
) -> (AggregateState, Vec<InputDiagnostic>) {
    let worker = Arc::clone(&analysis);
    let sources: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();

    let joined = task::spawn_blocking(move || {
        let mut aggregator = worker.aggregator();
        let mut diagnostics = Vec::new();

        for path in &paths {
            match analyze_file(&worker.processor, &mut aggregator, path) {
                Ok(Ingest::Exhausted) => {}
                Ok(Ingest::Capped) => {
                    info!("Line cap reached, remaining input skipped");
                    break;
                }
                Err(e) => {
                    warn!("{}", e);
                    diagnostics.push(InputDiagnostic::from(&e));
                }
            }
        }
        (aggregator.into_state(), diagnostics)
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(e) => {
            let diagnostics = sources
                .into_iter()
                .map(|path| {
                    InputDiagnostic::from(&InputError::Worker {
                        path,
                        reason: e.to_string(),
                    })
                })
                .collect();
            (AggregateState::new(analysis.settings.sample_limit), diagnostics)
        }
    }
}

async fn concurrent(
    analysis: Arc<Analysis>,
    paths: Vec<PathBuf>,
) -> (AggregateState, Vec<InputDiagnostic>) {
    let sources: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();

    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let worker = Arc::clone(&analysis);
            task::spawn_blocking(move || {
                let mut aggregator = worker.worker_aggregator();
                let result = analyze_file(&worker.processor, &mut aggregator, &path);
                (aggregator.into_state(), result.err())
            })
        })
        .collect();

    let mut merged = AggregateState::new(analysis.settings.sample_limit);
    let mut diagnostics = Vec::new();

    // Join in input order, not completion order
    for (source, handle) in sources.into_iter().zip(handles) {
        let failure = match handle.await {
            Ok((state, failure)) => {
                merged.merge(state);
                failure
            }
            Err(e) => Some(InputError::Worker {
                path: source,
                reason: e.to_string(),
            }),
        };

        if let Some(e) = failure {
            warn!("{}", e);
            diagnostics.push(InputDiagnostic::from(&e));
        }
    }

    (merged, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::AnalyzerConfig;
    use crate::runtime::boot::boot;
    use chrono::{TimeZone, Utc};

    fn analysis() -> Analysis {
        boot(
            AnalyzerConfig::default(),
            Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_analyze_lines() {
        let report = analyze_lines(
            &analysis(),
            "inline",
            [
                "2026-01-17 10:00:00 ERROR [db] down",
                "2026-01-17 10:00:01 INFO [db] up",
            ],
        );
        assert_eq!(report.summary.total_lines, 2);
        assert_eq!(report.summary.error_count, 1);
    }

    #[test]
    fn test_missing_file_diagnostic() {
        let a = analysis();
        let mut agg = a.aggregator();
        let err =
            analyze_file(&a.processor, &mut agg, Path::new("/no/such/file.log")).unwrap_err();
        assert!(matches!(err, InputError::Open { .. }));
        let diag = InputDiagnostic::from(&err);
        assert_eq!(diag.source, "/no/such/file.log");
        assert!(diag.error.contains("Failed to open"));
    }

    #[test]
    fn test_summary_payload_keeps_input_errors() {
        let a = analysis();
        let mut agg = a.aggregator();
        let err =
            analyze_file(&a.processor, &mut agg, Path::new("/no/such/file.log")).unwrap_err();

        let mut outcome = RunOutcome {
            report: agg.finish(),
            input_errors: Vec::new(),
        };
        assert!(outcome.summary_payload().get("input_errors").is_none());

        outcome.input_errors.push(InputDiagnostic::from(&err));
        let payload = outcome.summary_payload();
        assert_eq!(payload["input_errors"][0]["source"], "/no/such/file.log");
        assert!(payload.get("summary").is_some());
        assert!(payload.get("top_messages").is_none());
    }

    #[tokio::test]
    async fn test_analyze_without_inputs() {
        let outcome = analyze(Arc::new(analysis()), Vec::new()).await;
        assert_eq!(outcome.report.summary.total_lines, 0);
        assert!(outcome.input_errors.is_empty());
    }
}
