use regex::Captures;

pub use super::model::{GrammarError, LogFormat, RawFields};

/// One supported line convention: its anchored pattern and how named
/// captures become [`RawFields`].
pub trait FieldExtractor: Send + Sync {
    fn format(&self) -> LogFormat;

    /// Anchored pattern matched against the whole (trimmed) line.
    fn pattern(&self) -> &'static str;

    /// Capture groups `fields` relies on; checked once when the grammar is compiled.
    fn required_groups(&self) -> &'static [&'static str];

    fn fields<'a>(&self, caps: &Captures<'a>) -> RawFields<'a>;
}

/// Required capture. Empty only if the grammar was built without the group,
/// which [`super::grammar::Grammar::compile`] rejects.
pub(crate) fn group<'a>(caps: &Captures<'a>, name: &str) -> &'a str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Optional capture; empty captures and the CLF `-` placeholder become `None`.
pub(crate) fn opt_group<'a>(caps: &Captures<'a>, name: &str) -> Option<&'a str> {
    caps.name(name)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty() && *s != "-")
}
