//! The live edit buffer: code points, cursor, and in-place edits.

/// What an edit did, so the caller knows whether to repaint or beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed.
    Unchanged,
    /// Text or cursor changed.
    Changed,
    /// Changed, but the insertion was cut short by the capacity.
    Truncated,
    /// Refused; nothing changed.
    Rejected,
}

impl Outcome {
    pub fn changed(self) -> bool {
        matches!(self, Outcome::Changed | Outcome::Truncated)
    }

    pub fn beeps(self) -> bool {
        matches!(self, Outcome::Truncated | Outcome::Rejected)
    }

    fn from_change(changed: bool) -> Self {
        if changed {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

/// Text being edited plus the cursor.
///
/// `pos <= len() <= capacity()` holds after every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub(crate) text: Vec<char>,
    pub(crate) pos: usize,
    capacity: usize,
    prefix: usize,
    hint_selection: Option<usize>,
}

impl EditBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: Vec::new(),
            pos: 0,
            capacity: capacity.max(1),
            prefix: 0,
            hint_selection: None,
        }
    }

    pub fn with_text(capacity: usize, text: &str) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.set_text(text);
        buffer
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn as_string(&self) -> String {
        self.text.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.text.len() >= self.capacity
    }

    /// Where common-prefix history search stops comparing.
    pub fn prefix(&self) -> usize {
        self.prefix
    }

    pub fn set_prefix(&mut self, prefix: usize) {
        self.prefix = prefix.min(self.text.len());
    }

    pub fn hint_selection(&self) -> Option<usize> {
        self.hint_selection
    }

    pub fn clear_hint_selection(&mut self) {
        self.hint_selection = None;
    }

    /// Step the hint selection through `[None, 0, 1, .., count - 1]`, wrapping.
    pub fn cycle_hint(&mut self, forward: bool, count: usize) {
        if count == 0 {
            self.hint_selection = None;
            return;
        }
        self.hint_selection = match (self.hint_selection, forward) {
            (None, true) => Some(0),
            (None, false) => Some(count - 1),
            (Some(idx), true) if idx + 1 < count => Some(idx + 1),
            (Some(_), true) => None,
            (Some(0), false) => None,
            (Some(idx), false) => Some(idx.min(count) - 1),
        };
    }

    /// Replace the whole text, cursor at the end. Excess is dropped.
    pub fn set_text(&mut self, text: &str) -> Outcome {
        let chars: Vec<char> = text.chars().collect();
        self.set_chars(&chars, chars.len())
    }

    /// Replace the whole text and place the cursor.
    pub fn set_chars(&mut self, text: &[char], pos: usize) -> Outcome {
        let keep = text.len().min(self.capacity);
        self.text.clear();
        self.text.extend_from_slice(&text[..keep]);
        self.pos = pos.min(keep);
        self.prefix = self.prefix.min(keep);
        if keep < text.len() {
            Outcome::Truncated
        } else {
            Outcome::Changed
        }
    }

    /// Insert one code point at the cursor.
    ///
    /// Control characters and a full buffer are refused.
    pub fn insert_char(&mut self, ch: char) -> Outcome {
        if ch.is_control() || self.is_full() {
            return Outcome::Rejected;
        }
        self.text.insert(self.pos, ch);
        self.pos += 1;
        Outcome::Changed
    }

    /// Insert as much of `chars` as fits; the cursor ends after the insertion.
    /// Returns how many were inserted.
    pub fn insert_chars(&mut self, chars: &[char]) -> usize {
        let room = self.capacity - self.text.len();
        let take = chars.len().min(room);
        self.text
            .splice(self.pos..self.pos, chars[..take].iter().copied());
        self.pos += take;
        take
    }

    /// Replace `start..end` with as much of `replacement` as fits.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &[char]) -> Outcome {
        let end = end.min(self.text.len());
        let start = start.min(end);
        let room = self.capacity - (self.text.len() - (end - start));
        let take = replacement.len().min(room);
        self.text
            .splice(start..end, replacement[..take].iter().copied());
        self.pos = start + take;
        if take < replacement.len() {
            Outcome::Truncated
        } else {
            Outcome::Changed
        }
    }

    /// Remove and return `start..end`; the cursor moves to `start`.
    pub(crate) fn remove_range(&mut self, start: usize, end: usize) -> Vec<char> {
        let end = end.min(self.text.len());
        let start = start.min(end);
        self.pos = start;
        self.text.drain(start..end).collect()
    }

    pub fn move_left(&mut self) -> Outcome {
        if self.pos == 0 {
            return Outcome::Unchanged;
        }
        self.pos -= 1;
        Outcome::Changed
    }

    pub fn move_right(&mut self) -> Outcome {
        if self.pos >= self.text.len() {
            return Outcome::Unchanged;
        }
        self.pos += 1;
        Outcome::Changed
    }

    pub fn move_home(&mut self) -> Outcome {
        let changed = self.pos != 0;
        self.pos = 0;
        Outcome::from_change(changed)
    }

    pub fn move_end(&mut self) -> Outcome {
        let changed = self.pos != self.text.len();
        self.pos = self.text.len();
        Outcome::from_change(changed)
    }

    pub fn move_word_left(&mut self) -> Outcome {
        let target = self.word_start_before(self.pos);
        let changed = target != self.pos;
        self.pos = target;
        Outcome::from_change(changed)
    }

    pub fn move_word_right(&mut self) -> Outcome {
        let target = self.word_end_after(self.pos);
        let changed = target != self.pos;
        self.pos = target;
        Outcome::from_change(changed)
    }

    /// Skip non-word chars backward, then word chars.
    pub(crate) fn word_start_before(&self, from: usize) -> usize {
        let mut idx = from.min(self.text.len());
        while idx > 0 && !is_word_char(self.text[idx - 1]) {
            idx -= 1;
        }
        while idx > 0 && is_word_char(self.text[idx - 1]) {
            idx -= 1;
        }
        idx
    }

    /// Skip non-word chars forward, then word chars.
    pub(crate) fn word_end_after(&self, from: usize) -> usize {
        let len = self.text.len();
        let mut idx = from.min(len);
        while idx < len && !is_word_char(self.text[idx]) {
            idx += 1;
        }
        while idx < len && is_word_char(self.text[idx]) {
            idx += 1;
        }
        idx
    }

    pub fn delete_backward(&mut self) -> Outcome {
        if self.pos == 0 {
            return Outcome::Unchanged;
        }
        self.pos -= 1;
        self.text.remove(self.pos);
        Outcome::Changed
    }

    pub fn delete_forward(&mut self) -> Outcome {
        if self.pos >= self.text.len() {
            return Outcome::Unchanged;
        }
        self.text.remove(self.pos);
        Outcome::Changed
    }

    /// Uppercase the first letter of the next word and lowercase the rest.
    pub fn capitalize_word(&mut self) -> Outcome {
        let mut first = true;
        self.map_next_word(|ch| {
            let mapped = if first { upper(ch) } else { lower(ch) };
            if ch.is_alphabetic() {
                first = false;
            }
            mapped
        })
    }

    pub fn upcase_word(&mut self) -> Outcome {
        self.map_next_word(upper)
    }

    pub fn downcase_word(&mut self) -> Outcome {
        self.map_next_word(lower)
    }

    /// Apply `map` to each char of the next word; the cursor ends after it.
    fn map_next_word(&mut self, mut map: impl FnMut(char) -> char) -> Outcome {
        let len = self.text.len();
        if self.pos >= len {
            return Outcome::Unchanged;
        }
        while self.pos < len && !is_word_char(self.text[self.pos]) {
            self.pos += 1;
        }
        while self.pos < len && is_word_char(self.text[self.pos]) {
            self.text[self.pos] = map(self.text[self.pos]);
            self.pos += 1;
        }
        Outcome::Changed
    }

    /// Swap the chars around the cursor (the last two at end of line).
    pub fn transpose_chars(&mut self) -> Outcome {
        let len = self.text.len();
        if self.pos == 0 || len < 2 {
            return Outcome::Unchanged;
        }
        let left = if self.pos == len { self.pos - 2 } else { self.pos - 1 };
        self.text.swap(left, left + 1);
        if self.pos != len {
            self.pos += 1;
        }
        Outcome::Changed
    }
}

// Case mappings that would change the length (e.g. 'ß' -> "SS") leave the char alone.
fn upper(ch: char) -> char {
    single(ch.to_uppercase()).unwrap_or(ch)
}

fn lower(ch: char) -> char {
    single(ch.to_lowercase()).unwrap_or(ch)
}

fn single(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    match chars.next() {
        Some(_) => None,
        None => Some(first),
    }
}

#[cfg(test)]
mod tests {
    use super::{EditBuffer, Outcome};
    use crate::core::kill_ring::KillRing;

    fn buffer_at(text: &str, pos: usize) -> EditBuffer {
        let mut buffer = EditBuffer::with_text(64, text);
        buffer.pos = pos;
        buffer
    }

    fn assert_invariant(buffer: &EditBuffer) {
        assert!(buffer.pos() <= buffer.len(), "pos past end: {buffer:?}");
        assert!(buffer.len() <= buffer.capacity(), "len past capacity: {buffer:?}");
    }

    #[test]
    fn insert_respects_capacity_and_controls() {
        let mut buffer = EditBuffer::new(3);
        assert_eq!(buffer.insert_char('a'), Outcome::Changed);
        assert_eq!(buffer.insert_char('\x07'), Outcome::Rejected);
        assert_eq!(buffer.insert_char('b'), Outcome::Changed);
        assert_eq!(buffer.insert_char('c'), Outcome::Changed);
        assert_eq!(buffer.insert_char('d'), Outcome::Rejected);
        assert_eq!(buffer.as_string(), "abc");
        assert_invariant(&buffer);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut buffer = buffer_at("ac", 1);
        buffer.insert_char('b');
        assert_eq!(buffer.as_string(), "abc");
        assert_eq!(buffer.pos(), 2);
    }

    #[test]
    fn word_motion_uses_alphanumeric_runs() {
        let mut buffer = buffer_at("foo-bar  baz", 12);
        buffer.move_word_left();
        assert_eq!(buffer.pos(), 9);
        buffer.move_word_left();
        assert_eq!(buffer.pos(), 4);
        buffer.move_word_left();
        assert_eq!(buffer.pos(), 0);
        assert_eq!(buffer.move_word_left(), Outcome::Unchanged);
        buffer.move_word_right();
        assert_eq!(buffer.pos(), 3);
        buffer.move_word_right();
        assert_eq!(buffer.pos(), 7);
    }

    #[test]
    fn deletes_at_the_edges_are_noops() {
        let mut buffer = buffer_at("ab", 0);
        assert_eq!(buffer.delete_backward(), Outcome::Unchanged);
        assert_eq!(buffer.delete_forward(), Outcome::Changed);
        assert_eq!(buffer.as_string(), "b");
        buffer.move_end();
        assert_eq!(buffer.delete_forward(), Outcome::Unchanged);
        assert_eq!(buffer.delete_backward(), Outcome::Changed);
        assert!(buffer.is_empty());
        assert_invariant(&buffer);
    }

    #[test]
    fn case_operators_keep_length_and_advance() {
        let mut buffer = buffer_at("hello WORLD", 0);
        buffer.capitalize_word();
        assert_eq!(buffer.as_string(), "Hello WORLD");
        assert_eq!(buffer.pos(), 5);
        buffer.downcase_word();
        assert_eq!(buffer.as_string(), "Hello world");
        buffer.pos = 0;
        buffer.upcase_word();
        assert_eq!(buffer.as_string(), "HELLO world");

        let mut sharp = buffer_at("straße", 0);
        sharp.upcase_word();
        assert_eq!(sharp.as_string(), "STRAßE");
        assert_eq!(sharp.len(), 6);
    }

    #[test]
    fn transpose_in_middle_and_at_end() {
        let mut buffer = buffer_at("abcd", 2);
        buffer.transpose_chars();
        assert_eq!(buffer.as_string(), "acbd");
        assert_eq!(buffer.pos(), 3);
        buffer.move_end();
        buffer.transpose_chars();
        assert_eq!(buffer.as_string(), "acdb");
        assert_eq!(buffer.pos(), 4);

        let mut single = buffer_at("a", 1);
        assert_eq!(single.transpose_chars(), Outcome::Unchanged);
    }

    #[test]
    fn replace_range_clamps_to_capacity() {
        let mut buffer = EditBuffer::with_text(6, "ab foo");
        buffer.pos = 6;
        let outcome = buffer.replace_range(3, 6, &"foobar".chars().collect::<Vec<_>>());
        assert_eq!(outcome, Outcome::Truncated);
        assert_eq!(buffer.as_string(), "ab foo");
        assert_eq!(buffer.pos(), 6);
        assert_invariant(&buffer);
    }

    #[test]
    fn set_text_truncates() {
        let mut buffer = EditBuffer::new(4);
        assert_eq!(buffer.set_text("abcdef"), Outcome::Truncated);
        assert_eq!(buffer.as_string(), "abcd");
        assert_eq!(buffer.pos(), 4);
    }

    #[test]
    fn hint_selection_cycles_through_none() {
        let mut buffer = EditBuffer::new(8);
        let mut seen = Vec::new();
        for _ in 0..4 {
            buffer.cycle_hint(true, 3);
            seen.push(buffer.hint_selection());
        }
        assert_eq!(seen, vec![Some(0), Some(1), Some(2), None]);
        buffer.cycle_hint(false, 3);
        assert_eq!(buffer.hint_selection(), Some(2));
        buffer.cycle_hint(false, 3);
        buffer.cycle_hint(false, 3);
        buffer.cycle_hint(false, 3);
        assert_eq!(buffer.hint_selection(), None);
        buffer.cycle_hint(true, 0);
        assert_eq!(buffer.hint_selection(), None);
    }

    #[test]
    fn operations_preserve_the_cursor_invariant() {
        let mut buffer = EditBuffer::new(5);
        let ops: [fn(&mut EditBuffer) -> Outcome; 10] = [
            |b| b.insert_char('x'),
            |b| b.insert_char(' '),
            EditBuffer::move_left,
            EditBuffer::move_right,
            EditBuffer::move_word_left,
            EditBuffer::move_word_right,
            EditBuffer::delete_backward,
            EditBuffer::delete_forward,
            EditBuffer::transpose_chars,
            EditBuffer::capitalize_word,
        ];
        // A fixed pseudo-random walk over the operations.
        let mut state = 7u32;
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let op = ops[(state >> 16) as usize % ops.len()];
            op(&mut buffer);
            assert_invariant(&buffer);
        }
    }

    #[test]
    fn kills_yanks_and_replacements_preserve_the_cursor_invariant() {
        let mut buffer = EditBuffer::new(6);
        let mut ring = KillRing::new();
        type Op = fn(&mut EditBuffer, &mut KillRing) -> Outcome;
        let ops: [Op; 14] = [
            |b, _| b.insert_char('w'),
            |b, _| b.insert_char(' '),
            |b, _| b.move_left(),
            |b, _| b.move_home(),
            |b, _| b.move_word_right(),
            |b, ring| b.kill_to_end(ring),
            |b, ring| b.kill_to_start(ring),
            |b, ring| b.kill_word_forward(ring),
            |b, ring| b.kill_word_backward(ring),
            |b, ring| b.kill_whitespace_word_backward(ring),
            |b, ring| b.yank(ring),
            |b, ring| b.yank_pop(ring),
            |b, _| b.set_text("seven chars"),
            |b, _| {
                let end = b.pos();
                let start = b.word_start_before(end);
                b.replace_range(start, end, &['r', 'e', 'p', 'l', 'a', 'c', 'e'])
            },
        ];
        let mut state = 11u32;
        for _ in 0..1_000 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let op = ops[(state >> 16) as usize % ops.len()];
            op(&mut buffer, &mut ring);
            assert_invariant(&buffer);
        }
    }
}
