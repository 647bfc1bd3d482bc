use std::sync::Arc;

use tracing::trace;

use crate::normalize::Normalizer;
use crate::parser::{CanonicalRecord, FormatDetector, FormatHint, GrammarTable, LineOrigin};

/// Detection plus normalization for one line.
#[derive(Debug, Clone)]
pub struct LineProcessor {
    detector: FormatDetector,
    normalizer: Normalizer,
}

impl LineProcessor {
    pub fn new(detector: FormatDetector, normalizer: Normalizer) -> Self {
        Self {
            detector,
            normalizer,
        }
    }

    pub fn from_table(table: Arc<GrammarTable>, hint: FormatHint, syslog_year: i32) -> Self {
        Self::new(
            FormatDetector::new(table.clone(), hint),
            Normalizer::new(table, syslog_year),
        )
    }

    pub fn detector(&self) -> &FormatDetector {
        &self.detector
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// `None` for blank lines; every other line becomes a record.
    pub fn process(&self, line: &str, origin: LineOrigin) -> Option<CanonicalRecord> {
        if line.trim().is_empty() {
            return None;
        }

        let parsed = self.detector.parse(line);
        let record = self.normalizer.normalize(&parsed, origin);
        if !record.is_matched() {
            trace!(
                source = %record.source_file,
                line = record.line_number,
                "No grammar matched"
            );
        }
        Some(record)
    }
}
