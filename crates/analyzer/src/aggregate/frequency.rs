use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Counting map that remembers first-insertion order.
///
/// Ranking is by count descending; equal counts keep the order in which the
/// keys were first seen, so `top` is deterministic for a given input order.
#[derive(Debug, Clone)]
pub struct FrequencyMap<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, u64)>,
}

impl<K> Default for FrequencyMap<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        self.add(key, 1);
    }

    /// Allocates an owned key only on first sight.
    pub fn add<Q>(&mut self, key: &Q, count: u64)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 += count,
            None => self.insert(key.to_owned(), count),
        }
    }

    fn add_owned(&mut self, key: K, count: u64) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += count,
            None => self.insert(key, count),
        }
    }

    fn insert(&mut self, key: K, count: u64) {
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, count));
    }

    pub fn get<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .get(key)
            .map_or(0, |&slot| self.entries[slot].1)
    }

    /// Fold `other` in. Keys new to `self` are appended in `other`'s order.
    pub fn merge(&mut self, other: FrequencyMap<K>) {
        for (key, count) in other.entries {
            self.add_owned(key, count);
        }
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    /// The `n` most frequent keys. Stable sort, so ties stay in first-seen order.
    pub fn top(&self, n: usize) -> Vec<(K, u64)> {
        let mut ranked: Vec<&(K, u64)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).cloned().collect()
    }

    /// First entry holding the highest count.
    pub fn max(&self) -> Option<(&K, u64)> {
        self.entries
            .iter()
            .fold(None, |best: Option<&(K, u64)>, entry| match best {
                Some(b) if b.1 >= entry.1 => Some(b),
                _ => Some(entry),
            })
            .map(|(key, count)| (key, *count))
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Mean count per distinct key; `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.total() as f64 / self.entries.len() as f64
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
