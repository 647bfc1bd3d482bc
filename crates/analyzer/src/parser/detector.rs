use std::sync::Arc;

use super::grammar::GrammarTable;
use super::model::FormatHint;
use super::traits::{LogFormat, RawFields};

/// Result of running one line through detection and extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    /// Trimmed line text
    pub line: &'a str,
    /// `None` means no grammar applied; the record is UNKNOWN
    pub fields: Option<RawFields<'a>>,
}

impl ParsedLine<'_> {
    pub fn format(&self) -> LogFormat {
        self.fields
            .as_ref()
            .map(RawFields::format)
            .unwrap_or(LogFormat::Unknown)
    }
}

/// Format detection over a shared grammar table.
///
/// 1. A concrete hint is trusted as-is (no detection)
/// 2. Otherwise grammars are tried in table priority order
/// 3. First full-line match wins, no match is UNKNOWN
#[derive(Debug, Clone)]
pub struct FormatDetector {
    table: Arc<GrammarTable>,
    hint: FormatHint,
}

impl FormatDetector {
    pub fn new(table: Arc<GrammarTable>, hint: FormatHint) -> Self {
        Self { table, hint }
    }

    pub fn hint(&self) -> FormatHint {
        self.hint
    }

    pub fn table(&self) -> &Arc<GrammarTable> {
        &self.table
    }

    /// Which grammar applies to `line`. Pure.
    pub fn detect(&self, line: &str) -> LogFormat {
        if let FormatHint::Fixed(format) = self.hint {
            return format;
        }

        let line = line.trim();
        self.table
            .iter()
            .find(|grammar| grammar.matches(line))
            .map(|grammar| grammar.format())
            .unwrap_or(LogFormat::Unknown)
    }

    /// Detect and extract in one pass.
    ///
    /// With a hint, a grammar that fails on this exact line yields UNKNOWN
    /// rather than an error.
    pub fn parse<'a>(&self, line: &'a str) -> ParsedLine<'a> {
        let line = line.trim();

        let fields = match self.hint {
            FormatHint::Fixed(format) => self
                .table
                .get(format)
                .and_then(|grammar| grammar.extract(line)),
            FormatHint::Auto => self.table.iter().find_map(|grammar| grammar.extract(line)),
        };

        ParsedLine { line, fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSLOG: &str =
        "Jan 17 10:15:32 webserver sshd[1234]: Failed password for user from 192.168.1.100";
    const ACCESS: &str = r#"192.168.1.101 - - [17/Jan/2026:10:15:32 +0000] "GET /api/users HTTP/1.1" 200 1234 "-" "Mozilla/5.0""#;
    const ERROR: &str = "2026/01/17 10:15:32 [error] 1234#0: *1 connect() failed (111: Connection refused)";
    const APP: &str = "2026-01-17 10:15:32.123 ERROR [database] Connection failed";

    fn detector(hint: FormatHint) -> FormatDetector {
        FormatDetector::new(Arc::new(GrammarTable::standard().unwrap()), hint)
    }

    #[test]
    fn test_detect_each_format() {
        let d = detector(FormatHint::Auto);
        assert_eq!(d.detect(SYSLOG), LogFormat::Syslog);
        assert_eq!(d.detect(ACCESS), LogFormat::WebAccess);
        assert_eq!(d.detect(ERROR), LogFormat::WebError);
        assert_eq!(d.detect(APP), LogFormat::StructuredApp);
    }

    #[test]
    fn test_detect_unknown() {
        let d = detector(FormatHint::Auto);
        assert_eq!(
            d.detect("This is some random text that doesn't match any pattern"),
            LogFormat::Unknown
        );
        assert_eq!(d.detect(""), LogFormat::Unknown);
    }

    #[test]
    fn test_detect_trims_line_endings() {
        let d = detector(FormatHint::Auto);
        let line = format!("{}\r\n", ERROR);
        assert_eq!(d.detect(&line), LogFormat::WebError);
    }

    #[test]
    fn test_hint_skips_detection() {
        let d = detector(FormatHint::Fixed(LogFormat::Syslog));
        assert_eq!(d.detect(ACCESS), LogFormat::Syslog);
    }

    #[test]
    fn test_hint_mismatch_parses_as_unknown() {
        let d = detector(FormatHint::Fixed(LogFormat::WebError));
        let parsed = d.parse(ACCESS);
        assert_eq!(parsed.format(), LogFormat::Unknown);
        assert!(parsed.fields.is_none());
    }

    #[test]
    fn test_hint_match_extracts() {
        let d = detector(FormatHint::Fixed(LogFormat::WebError));
        assert_eq!(d.parse(ERROR).format(), LogFormat::WebError);
    }

    #[test]
    fn test_parse_agrees_with_detect() {
        let d = detector(FormatHint::Auto);
        for line in [SYSLOG, ACCESS, ERROR, APP, "nothing to see"] {
            assert_eq!(d.parse(line).format(), d.detect(line), "line: {line}");
        }
    }

    #[test]
    fn test_alternate_table_only_knows_its_grammars() {
        use crate::parser::formats::{StructuredAppExtractor, SyslogExtractor};
        use crate::parser::traits::FieldExtractor;

        let extractors: Vec<Box<dyn FieldExtractor>> =
            vec![Box::new(SyslogExtractor), Box::new(StructuredAppExtractor)];
        let table = Arc::new(GrammarTable::from_extractors(extractors).unwrap());
        let d = FormatDetector::new(table, FormatHint::Auto);
        assert_eq!(d.detect(SYSLOG), LogFormat::Syslog);
        assert_eq!(d.detect(APP), LogFormat::StructuredApp);
        assert_eq!(d.detect(ACCESS), LogFormat::Unknown);
    }

    #[test]
    fn test_syslog_grammar_is_loose() {
        // Shows why syslog sits behind the web grammars: it happily matches
        // a line whose first tokens only look like "word day time".
        let d = detector(FormatHint::Auto);
        let line = "Build 42 12:00:00 runner step: compile finished";
        assert_eq!(d.detect(line), LogFormat::Syslog);
    }
}
