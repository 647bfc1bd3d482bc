/// Record normalization: raw captures to canonical records
///
/// # Architecture
///
/// - `severity.rs`: Label vocabularies, status mapping and keyword scan
/// - `message.rs`: Dedup key for frequency counting
/// - `record.rs`: The `Normalizer` that builds a `CanonicalRecord` per line
///
/// Normalization is deterministic: it never reads the clock.

pub mod severity;
pub mod message;
pub mod record;

pub use message::{MessageKeyer, MESSAGE_KEY_LIMIT};
pub use record::Normalizer;

/// First `limit` characters of `text`, on a char boundary.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
