use crate::WORD_LENGTH;
use std::collections::HashSet;

/// The fixed game dictionary: membership decides whether a word may be chosen
/// or guessed at all, independent of color evaluation.
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Build a word list from newline-separated text. Blank lines and `#`
    /// comments are skipped; anything that isn't exactly the game's word
    /// length is dropped.
    pub fn new(word_list: &str) -> Self {
        let words = word_list
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .map(|word| word.trim().to_lowercase())
            .filter(|word| word.chars().count() == WORD_LENGTH)
            .filter(|word| word.chars().all(|c| c.is_alphabetic()))
            .collect();

        Self { words }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
