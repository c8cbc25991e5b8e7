use rand::{seq::index::sample, Rng};
use std::collections::BTreeMap;

/// The remaining vocabulary words that have not been sent out yet.
///
/// The pool is persisted as a keyed mapping (`{"0": "lucid", "1": "terse"}`).
/// Keys carry no meaning besides ordering and are reassigned densely from `0`
/// whenever the pool is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordPool(Vec<String>);

impl WordPool {
    pub fn new(words: Vec<String>) -> Self {
        Self(words)
    }

    /// Build a pool from its persisted keyed form. Numeric keys are ordered
    /// numerically, anything else is placed after them.
    pub fn from_keyed(keyed: BTreeMap<String, String>) -> Self {
        let mut entries: Vec<_> = keyed.into_iter().collect();
        entries.sort_by_cached_key(|(key, _)| (key.parse::<u64>().unwrap_or(u64::MAX), key.clone()));

        Self(entries.into_iter().map(|(_, word)| word).collect())
    }

    /// The persisted form of the pool, keyed `0..n-1`.
    pub fn to_keyed(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, word)| (i.to_string(), word.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.0
    }

    pub fn extend(&mut self, words: impl IntoIterator<Item = String>) {
        self.0.extend(words);
    }

    /// Remove two distinct entries picked uniformly at random and return them
    /// in the order they were drawn. Returns `None`, leaving the pool
    /// untouched, when fewer than two words remain.
    pub fn take_two<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<[String; 2]> {
        if self.0.len() < 2 {
            return None;
        }

        let picked = sample(rng, self.0.len(), 2);
        let (first, second) = (picked.index(0), picked.index(1));

        // Remove the higher index first so the lower one stays valid.
        if first > second {
            let first_word = self.0.remove(first);
            let second_word = self.0.remove(second);
            Some([first_word, second_word])
        } else {
            let second_word = self.0.remove(second);
            let first_word = self.0.remove(first);
            Some([first_word, second_word])
        }
    }
}
