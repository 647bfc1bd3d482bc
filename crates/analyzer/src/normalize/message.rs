//! Message dedup key.
//!
//! Variable tokens are collapsed so lines that differ only in ids, addresses
//! or counters land on the same key. Replacement order is fixed (uuid, then
//! ip, then digit runs) so a UUID's digits are never rewritten piecemeal.

use std::sync::Arc;

use crate::parser::GrammarTable;

use super::truncate_chars;

pub const MESSAGE_KEY_LIMIT: usize = 150;

pub const UUID_TOKEN: &str = "<uuid>";
pub const IP_TOKEN: &str = "<ip>";
pub const NUM_TOKEN: &str = "<num>";

#[derive(Debug, Clone)]
pub struct MessageKeyer {
    table: Arc<GrammarTable>,
}

impl MessageKeyer {
    pub fn new(table: Arc<GrammarTable>) -> Self {
        Self { table }
    }

    /// Idempotent: keying an already keyed message returns it unchanged.
    pub fn key(&self, message: &str) -> String {
        let aux = self.table.aux();
        let keyed = aux.uuid.replace_all(message.trim(), UUID_TOKEN);
        let keyed = aux.ipv4.replace_all(&keyed, IP_TOKEN);
        let keyed = aux.digit_run.replace_all(&keyed, NUM_TOKEN);
        truncate_chars(&keyed, MESSAGE_KEY_LIMIT)
            .trim_end()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyer() -> MessageKeyer {
        MessageKeyer::new(Arc::new(GrammarTable::standard().unwrap()))
    }

    #[test]
    fn test_numbers_collapse() {
        let k = keyer();
        assert_eq!(k.key("Timeout after 30 seconds"), "Timeout after <num> seconds");
        assert_eq!(
            k.key("Timeout after 30 seconds"),
            k.key("Timeout after 45 seconds")
        );
    }

    #[test]
    fn test_ip_before_digits() {
        let k = keyer();
        assert_eq!(
            k.key("Failed password for root from 10.0.0.5 port 22"),
            "Failed password for root from <ip> port <num>"
        );
    }

    #[test]
    fn test_uuid_before_digits() {
        let k = keyer();
        assert_eq!(
            k.key("job 123e4567-e89b-12d3-a456-426614174000 finished"),
            "job <uuid> finished"
        );
    }

    #[test]
    fn test_key_is_idempotent() {
        let k = keyer();
        let once = k.key("user 42 from 192.168.0.1 req 123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(k.key(&once), once);
    }

    #[test]
    fn test_key_is_bounded() {
        let k = keyer();
        let long = "x".repeat(400);
        assert_eq!(k.key(&long).chars().count(), MESSAGE_KEY_LIMIT);
    }
}
