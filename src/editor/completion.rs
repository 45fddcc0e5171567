//! Completion word boundaries, candidate merging, and list layout.

use crate::config::ReaderConfig;
use crate::core::text::width::visible_width;
use crate::editor::buffer::{EditBuffer, Outcome};

impl EditBuffer {
    /// Start of the word ending at the cursor.
    ///
    /// Scans back to the nearest break character that is not a special prefix.
    pub fn word_start(&self, config: &ReaderConfig) -> usize {
        let mut start = self.pos;
        while start > 0 {
            let ch = self.text[start - 1];
            if config.is_word_break(ch) && !config.is_special_prefix(ch) {
                break;
            }
            start -= 1;
        }
        start
    }

    /// Replace the word `start..pos` with `word`.
    pub fn replace_word(&mut self, start: usize, word: &[char]) -> Outcome {
        let end = self.pos;
        self.replace_range(start, end, word)
    }
}

/// Length in chars of the prefix shared by every candidate.
pub fn longest_common_prefix(candidates: &[Vec<char>]) -> usize {
    let Some((first, rest)) = candidates.split_first() else {
        return 0;
    };
    let mut len = first.len();
    for candidate in rest {
        len = first
            .iter()
            .zip(candidate.iter())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    len
}

/// Lay candidates out column-major, readline style.
///
/// Every column is as wide as the longest candidate plus two; the last column of
/// a row is not padded.
pub fn layout_columns(candidates: &[String], screen_width: usize) -> Vec<String> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let longest = candidates
        .iter()
        .map(|candidate| visible_width(candidate))
        .max()
        .unwrap_or(0)
        + 2;
    let column_count = (screen_width / longest).max(1);
    let row_count = candidates.len().div_ceil(column_count);

    let mut rows = Vec::with_capacity(row_count);
    for row in 0..row_count {
        let mut line = String::new();
        for column in 0..column_count {
            let idx = column * row_count + row;
            let Some(candidate) = candidates.get(idx) else {
                continue;
            };
            line.push_str(candidate);
            if (column + 1) * row_count + row < candidates.len() {
                let pad = longest - visible_width(candidate);
                line.push_str(&" ".repeat(pad));
            }
        }
        rows.push(line);
    }
    rows
}

/// Candidate rotation armed once the list has been shown.
///
/// It applies only while the line and cursor are exactly as the last
/// completion left them.
#[derive(Debug, Clone)]
pub struct CompletionCycle {
    candidates: Vec<Vec<char>>,
    start: usize,
    next: usize,
    snapshot: Vec<char>,
    snapshot_pos: usize,
}

impl CompletionCycle {
    pub fn new(candidates: &[String], start: usize, buffer: &EditBuffer) -> Self {
        Self {
            candidates: candidates.iter().map(|c| c.chars().collect()).collect(),
            start,
            next: 0,
            snapshot: buffer.text().to_vec(),
            snapshot_pos: buffer.pos(),
        }
    }

    pub fn applies_to(&self, buffer: &EditBuffer) -> bool {
        !self.candidates.is_empty()
            && buffer.pos() == self.snapshot_pos
            && buffer.text() == self.snapshot.as_slice()
    }

    /// Put the next candidate in place of the word.
    pub fn advance(&mut self, buffer: &mut EditBuffer) -> Outcome {
        let candidate = &self.candidates[self.next % self.candidates.len()];
        let outcome = buffer.replace_word(self.start, candidate);
        self.next = (self.next + 1) % self.candidates.len();
        self.snapshot = buffer.text().to_vec();
        self.snapshot_pos = buffer.pos();
        outcome
    }
}
