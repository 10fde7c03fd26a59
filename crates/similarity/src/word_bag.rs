use crate::stop_words::is_stop_word;
use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::hash_map::{self, HashMap};
use unicode_segmentation::UnicodeSegmentation;

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Multiset of stemmed words with occurrence counts
///
/// Every stored count is at least 1; a word whose count drops to zero is
/// removed from the map rather than kept at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBag {
    counts: HashMap<String, usize>,
}

impl WordBag {
    /// Create an empty bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Occurrence count of a stem (0 when absent)
    #[must_use]
    pub fn get(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct stems
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, usize> {
        self.counts.iter()
    }

    /// Add `count` occurrences of `word`
    pub fn add(&mut self, word: impl Into<String>, count: usize) {
        if count == 0 {
            return;
        }
        *self.counts.entry(word.into()).or_insert(0) += count;
    }

    /// Overwrite the count of `word`, dropping the entry when `count` is zero
    pub fn set(&mut self, word: &str, count: usize) {
        if count == 0 {
            self.counts.remove(word);
        } else if let Some(slot) = self.counts.get_mut(word) {
            *slot = count;
        } else {
            self.counts.insert(word.to_string(), count);
        }
    }

    /// Add every count of `other` into this bag
    pub fn merge(&mut self, other: &WordBag) {
        for (word, count) in other.iter() {
            self.add(word.as_str(), *count);
        }
    }

    /// Multiset intersection size: Σ min(self[w], other[w])
    #[must_use]
    pub fn intersection_count(&self, other: &WordBag) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .iter()
            .map(|(word, count)| (*count).min(large.get(word)))
            .sum()
    }
}

impl<'a> IntoIterator for &'a WordBag {
    type Item = (&'a String, &'a usize);
    type IntoIter = hash_map::Iter<'a, String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Tokenize text into a stemmed, stop-word-filtered word bag
///
/// Splits on Unicode word boundaries, lowercases, drops stop words and
/// reduces each remaining token with the English Snowball (Porter2) stemmer.
#[must_use]
pub fn tokenize(text: &str) -> WordBag {
    let mut bag = WordBag::new();
    for word in text.unicode_words() {
        let lower = word.to_lowercase();
        if is_stop_word(&lower) {
            continue;
        }
        let stem = STEMMER.stem(&lower);
        if stem.is_empty() {
            continue;
        }
        bag.add(stem.into_owned(), 1);
    }
    bag
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_lines_yield_empty_bags() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t  ").is_empty());
        assert!(tokenize("{ } ( ) ;").is_empty());
    }

    #[test]
    fn drops_stop_words_and_counts_stems() {
        let bag = tokenize("The parser is running and the parsers run");
        assert_eq!(bag.get("the"), 0);
        assert_eq!(bag.get("is"), 0);
        assert_eq!(bag.get("run"), 2);
        assert_eq!(bag.get("parser"), 2);
        assert_eq!(bag.total(), 4);
    }

    #[test]
    fn tokenization_is_case_insensitive() {
        assert_eq!(tokenize("Window WINDOW window"), {
            let mut bag = WordBag::new();
            bag.add("window", 3);
            bag
        });
    }

    #[test]
    fn set_to_zero_removes_entry() {
        let mut bag = tokenize("alpha beta");
        bag.set("alpha", 0);
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get("alpha"), 0);
    }

    #[test]
    fn intersection_respects_counts() {
        let left = tokenize("foo foo bar");
        let right = tokenize("foo bar bar baz");
        assert_eq!(left.intersection_count(&right), 2);
        assert_eq!(right.intersection_count(&left), 2);
    }
}
