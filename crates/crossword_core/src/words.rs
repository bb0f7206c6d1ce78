//! Word source and clue lookup.

use crate::error::DictionaryError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Shortest word the dictionary offers for play.
pub const MIN_WORD_LEN: usize = 4;

/// Longest word the dictionary offers for play.
pub const MAX_WORD_LEN: usize = 12;

const BUILTIN_WORDS: &str = include_str!("../data/words.json");

/// Supplies candidate words and their clues.
pub trait WordSource: Send + Sync + std::fmt::Debug {
    /// Every playable word, in a stable order.
    fn all_words(&self) -> Vec<String>;

    /// Clue for `word`. Never fails; unknown words get a generic clue.
    fn clue(&self, word: &str) -> String;
}

/// Generic clue used when a word has no dictionary entry.
pub fn fallback_clue(word: &str) -> String {
    format!("Palavra de {} letras", word.chars().count())
}

/// Summary of a dictionary's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryStats {
    /// Number of entries.
    pub total: usize,
    /// Entries whose length is playable.
    pub playable: usize,
    /// First few playable words.
    pub sample: Vec<String>,
}

/// Static word → clue dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    clues: BTreeMap<String, String>,
}

impl Dictionary {
    /// Loads the dictionary bundled with the crate.
    #[instrument]
    pub fn builtin() -> Result<Self, DictionaryError> {
        Self::from_json_str(BUILTIN_WORDS)
    }

    /// Parses a JSON object mapping words to clues.
    #[instrument(skip(json), fields(bytes = json.len()))]
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let dictionary = Self::from_pairs(raw);
        info!(
            total = dictionary.len(),
            playable = dictionary.all_words().len(),
            "Dictionary loaded"
        );
        Ok(dictionary)
    }

    /// Reads a JSON dictionary from disk.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        debug!("Loading dictionary from file");
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Builds a dictionary from `(word, clue)` pairs. Words are lower-cased.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let clues = pairs
            .into_iter()
            .map(|(word, clue)| (word.into().to_lowercase(), clue.into()))
            .collect();
        Self { clues }
    }

    /// Number of entries, playable or not.
    pub fn len(&self) -> usize {
        self.clues.len()
    }

    /// Returns true if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }

    /// Whether the word has an entry.
    pub fn contains(&self, word: &str) -> bool {
        self.clues.contains_key(&word.to_lowercase())
    }

    /// Up to `count` distinct playable words in random order.
    pub fn random_words<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let mut words = self.all_words();
        words.shuffle(rng);
        words.truncate(count);
        words
    }

    /// Entry counts plus a short sample of playable words.
    #[instrument(skip(self))]
    pub fn stats(&self) -> DictionaryStats {
        let playable = self.all_words();
        DictionaryStats {
            total: self.len(),
            playable: playable.len(),
            sample: playable.into_iter().take(10).collect(),
        }
    }
}

impl WordSource for Dictionary {
    fn all_words(&self) -> Vec<String> {
        // BTreeMap keys come out sorted.
        self.clues
            .keys()
            .filter(|word| (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&word.chars().count()))
            .cloned()
            .collect()
    }

    fn clue(&self, word: &str) -> String {
        match self.clues.get(&word.to_lowercase()) {
            Some(clue) => clue.clone(),
            None => {
                warn!(word, "No clue found, using fallback");
                fallback_clue(word)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_parses() {
        let dictionary = Dictionary::builtin().expect("Builtin dictionary must parse");
        assert!(dictionary.all_words().len() > 50);
    }

    #[test]
    fn test_fallback_counts_chars() {
        assert_eq!(fallback_clue("maçã"), "Palavra de 4 letras");
    }
}
