//! Grammar table: compiled line grammars plus auxiliary patterns.
//!
//! Built once at startup and shared by reference (`Arc`) with the detector,
//! extractor and normalizer. Nothing in here is derived from input, so any
//! failure is a construction defect.

use std::fmt;

use regex::Regex;

use super::formats::{
    StructuredAppExtractor, SyslogExtractor, WebAccessExtractor, WebErrorExtractor,
};
use super::traits::{FieldExtractor, GrammarError, LogFormat, RawFields};

/// Detection priority. The syslog grammar is loose enough to swallow the
/// others, so it must come after the access and error grammars.
pub const DETECTION_ORDER: [LogFormat; 4] = [
    LogFormat::WebAccess,
    LogFormat::WebError,
    LogFormat::Syslog,
    LogFormat::StructuredApp,
];

pub const IPV4_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";
pub const HTTP_STATUS_PATTERN: &str = r"^[1-5]\d{2}$";
pub const URL_PATH_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*://[^/\s?#]+(?P<path>/\S*)?";
pub const UUID_PATTERN: &str =
    r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b";
pub const DIGIT_RUN_PATTERN: &str = r"\d+";

/// A compiled grammar bound to the extractor that interprets its captures.
pub struct Grammar {
    extractor: Box<dyn FieldExtractor>,
    pattern: Regex,
}

impl Grammar {
    pub fn compile(extractor: Box<dyn FieldExtractor>) -> Result<Self, GrammarError> {
        let format = extractor.format();
        let pattern = Regex::new(extractor.pattern())
            .map_err(|source| GrammarError::Compile { format, source })?;

        for group in extractor.required_groups() {
            if !pattern.capture_names().flatten().any(|name| name == *group) {
                return Err(GrammarError::MissingGroup { format, group });
            }
        }

        Ok(Self { extractor, pattern })
    }

    pub fn format(&self) -> LogFormat {
        self.extractor.format()
    }

    #[inline]
    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// Apply the anchor and pull out raw fields; `None` when the line does not match.
    pub fn extract<'a>(&self, line: &'a str) -> Option<RawFields<'a>> {
        self.pattern
            .captures(line)
            .map(|caps| self.extractor.fields(&caps))
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("format", &self.format())
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Patterns used outside of line detection.
#[derive(Debug)]
pub struct AuxPatterns {
    pub ipv4: Regex,
    pub http_status: Regex,
    pub url_path: Regex,
    pub uuid: Regex,
    pub digit_run: Regex,
}

impl AuxPatterns {
    pub fn compile() -> Result<Self, GrammarError> {
        Ok(Self {
            ipv4: aux("ipv4", IPV4_PATTERN)?,
            http_status: aux("http_status", HTTP_STATUS_PATTERN)?,
            url_path: aux("url_path", URL_PATH_PATTERN)?,
            uuid: aux("uuid", UUID_PATTERN)?,
            digit_run: aux("digit_run", DIGIT_RUN_PATTERN)?,
        })
    }
}

fn aux(name: &'static str, pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(pattern).map_err(|source| GrammarError::Auxiliary { name, source })
}

/// Immutable set of grammars in detection priority order.
#[derive(Debug)]
pub struct GrammarTable {
    grammars: Vec<Grammar>,
    aux: AuxPatterns,
}

impl GrammarTable {
    /// The four built-in grammars in [`DETECTION_ORDER`].
    pub fn standard() -> Result<Self, GrammarError> {
        let extractors: Vec<Box<dyn FieldExtractor>> = vec![
            // Order matters! Loose syslog grammar goes after the anchored web formats
            Box::new(WebAccessExtractor),
            Box::new(WebErrorExtractor),
            Box::new(SyslogExtractor),
            Box::new(StructuredAppExtractor),
        ];
        Self::from_extractors(extractors)
    }

    /// Build a table from extractors; slice order is detection priority.
    pub fn from_extractors(extractors: Vec<Box<dyn FieldExtractor>>) -> Result<Self, GrammarError> {
        let mut grammars: Vec<Grammar> = Vec::with_capacity(extractors.len());
        for extractor in extractors {
            let format = extractor.format();
            if grammars.iter().any(|g| g.format() == format) {
                return Err(GrammarError::Duplicate(format));
            }
            grammars.push(Grammar::compile(extractor)?);
        }

        Ok(Self {
            grammars,
            aux: AuxPatterns::compile()?,
        })
    }

    pub fn get(&self, format: LogFormat) -> Option<&Grammar> {
        self.grammars.iter().find(|g| g.format() == format)
    }

    /// Grammars in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Grammar> {
        self.grammars.iter()
    }

    pub fn aux(&self) -> &AuxPatterns {
        &self.aux
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}
