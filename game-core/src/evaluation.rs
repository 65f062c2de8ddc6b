use game_types::{GuessRow, LetterStatus};
use std::collections::BTreeMap;

pub struct GuessEvaluator;

impl GuessEvaluator {
    /// Evaluate a guess against the secret word, Wordle-style.
    ///
    /// Two passes over a consumable copy of the answer: the exact pass marks
    /// `Hit` and consumes the matched letter, the presence pass marks `Has`
    /// and consumes the first remaining occurrence. A letter of the guess can
    /// never account for more occurrences than the answer actually has.
    /// Comparison is case-insensitive.
    pub fn evaluate(guess: &str, answer: &str) -> GuessRow {
        let guess_chars: Vec<char> = guess.to_lowercase().chars().collect();
        let mut remaining: Vec<Option<char>> =
            answer.to_lowercase().chars().map(Some).collect();
        let mut row = vec![LetterStatus::Miss; remaining.len()];

        // Exact pass: consume answer letters matched in place
        for i in 0..row.len().min(guess_chars.len()) {
            if remaining[i] == Some(guess_chars[i]) {
                row[i] = LetterStatus::Hit;
                remaining[i] = None;
            }
        }

        // Presence pass: consume the first remaining occurrence, if any
        for i in 0..row.len().min(guess_chars.len()) {
            if row[i] == LetterStatus::Hit {
                continue;
            }
            if let Some(pos) = remaining
                .iter()
                .position(|c| *c == Some(guess_chars[i]))
            {
                row[i] = LetterStatus::Has;
                remaining[pos] = None;
            }
        }

        row
    }

    pub fn is_correct(row: &GuessRow) -> bool {
        !row.is_empty() && row.iter().all(|s| *s == LetterStatus::Hit)
    }

    /// Fold a result row into the best status seen per guessed letter
    /// (Hit > Has > Miss), the shape the client keyboard is colored from.
    pub fn letter_summary(guess: &str, row: &GuessRow) -> BTreeMap<char, LetterStatus> {
        let mut summary = BTreeMap::new();
        for (ch, status) in guess.to_lowercase().chars().zip(row.iter()) {
            let entry = summary.entry(ch).or_insert(*status);
            if rank(*status) > rank(*entry) {
                *entry = *status;
            }
        }
        summary
    }
}

fn rank(status: LetterStatus) -> u8 {
    match status {
        LetterStatus::Miss => 0,
        LetterStatus::Has => 1,
        LetterStatus::Hit => 2,
    }
}
