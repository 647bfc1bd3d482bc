use std::io::{self, BufRead};

use thiserror::Error;
use tracing::debug;

use crate::aggregate::StreamingAggregator;
use crate::parser::LineOrigin;

use super::process::LineProcessor;

/// Lines between progress messages.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// How ingestion of one source ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// Every line was consumed
    Exhausted,
    /// The line cap was reached before the source ran out
    Capped,
}

#[derive(Debug, Error)]
#[error("Read failed after line {line}: {source}")]
pub struct ReadError {
    /// Last line successfully read
    pub line: u64,
    #[source]
    pub source: io::Error,
}

/// Feed in-memory lines, numbered from 1.
pub fn ingest_lines<I, S>(
    processor: &LineProcessor,
    aggregator: &mut StreamingAggregator,
    source: &str,
    lines: I,
) -> Ingest
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (idx, line) in lines.into_iter().enumerate() {
        if aggregator.is_capped() {
            return Ingest::Capped;
        }
        feed(processor, aggregator, source, idx as u64 + 1, line.as_ref());
    }
    Ingest::Exhausted
}

/// Stream `reader` line by line. Invalid UTF-8 is replaced, not rejected.
///
/// On a read error everything consumed so far stays in `aggregator`.
pub fn ingest_reader<R: BufRead>(
    processor: &LineProcessor,
    aggregator: &mut StreamingAggregator,
    source: &str,
    mut reader: R,
) -> Result<Ingest, ReadError> {
    let mut buf = Vec::with_capacity(512);
    let mut line_number = 0u64;

    loop {
        if aggregator.is_capped() {
            debug!(source, lines = line_number, "Line cap reached");
            return Ok(Ingest::Capped);
        }

        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ReadError {
                line: line_number,
                source,
            })?;
        if read == 0 {
            return Ok(Ingest::Exhausted);
        }

        line_number += 1;
        let text = String::from_utf8_lossy(&buf);
        feed(processor, aggregator, source, line_number, &text);
    }
}

fn feed(
    processor: &LineProcessor,
    aggregator: &mut StreamingAggregator,
    source: &str,
    line_number: u64,
    line: &str,
) {
    match processor.process(line, LineOrigin::new(source, line_number)) {
        Some(record) => aggregator.observe(&record),
        None => aggregator.observe_blank(),
    };

    if line_number % PROGRESS_INTERVAL == 0 {
        debug!(source, lines = line_number, "Ingestion progress");
    }
}
