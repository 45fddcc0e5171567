//! Kill and yank operations on the edit buffer.

use crate::core::kill_ring::{KillRing, LastAction};
use crate::editor::buffer::{EditBuffer, Outcome};

impl EditBuffer {
    /// Kill from the cursor to the end of the line.
    pub fn kill_to_end(&mut self, ring: &mut KillRing) -> Outcome {
        let (start, end) = (self.pos, self.text.len());
        self.kill_range(ring, start, end, true)
    }

    /// Kill from the start of the line to the cursor.
    pub fn kill_to_start(&mut self, ring: &mut KillRing) -> Outcome {
        let end = self.pos;
        self.kill_range(ring, 0, end, false)
    }

    /// Kill to the end of the next word.
    pub fn kill_word_forward(&mut self, ring: &mut KillRing) -> Outcome {
        let (start, end) = (self.pos, self.word_end_after(self.pos));
        self.kill_range(ring, start, end, true)
    }

    /// Kill back to the start of the previous word.
    pub fn kill_word_backward(&mut self, ring: &mut KillRing) -> Outcome {
        let (start, end) = (self.word_start_before(self.pos), self.pos);
        self.kill_range(ring, start, end, false)
    }

    /// Kill back over trailing whitespace and then non-whitespace.
    pub fn kill_whitespace_word_backward(&mut self, ring: &mut KillRing) -> Outcome {
        let end = self.pos;
        let mut start = end;
        while start > 0 && self.text[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.text[start - 1].is_whitespace() {
            start -= 1;
        }
        self.kill_range(ring, start, end, false)
    }

    fn kill_range(&mut self, ring: &mut KillRing, start: usize, end: usize, forward: bool) -> Outcome {
        if start >= end {
            // Still counts as a kill, so a following kill keeps accumulating.
            ring.set_last_action(LastAction::Kill);
            return Outcome::Unchanged;
        }
        let killed = self.remove_range(start, end);
        ring.kill(&killed, forward);
        Outcome::Changed
    }

    /// Insert the current kill-ring span at the cursor.
    pub fn yank(&mut self, ring: &mut KillRing) -> Outcome {
        let Some(span) = ring.yank() else {
            return Outcome::Rejected;
        };
        let span = span.to_vec();
        let inserted = self.insert_chars(&span);
        ring.record_yank(inserted);
        if inserted < span.len() {
            Outcome::Truncated
        } else {
            Outcome::Changed
        }
    }

    /// Replace the text inserted by the last yank with the next older span.
    ///
    /// Only valid directly after a yank or another yank-pop.
    pub fn yank_pop(&mut self, ring: &mut KillRing) -> Outcome {
        if ring.last_action() != LastAction::Yank {
            return Outcome::Rejected;
        }
        let previous = ring.last_yank_len().min(self.pos);
        let Some(span) = ring.yank_pop() else {
            return Outcome::Rejected;
        };
        let span = span.to_vec();
        let start = self.pos - previous;
        let outcome = self.replace_range(start, self.pos, &span);
        ring.record_yank(self.pos - start);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use crate::core::kill_ring::{KillRing, LastAction};
    use crate::editor::buffer::{EditBuffer, Outcome};

    fn buffer_at(text: &str, pos: usize) -> EditBuffer {
        let mut buffer = EditBuffer::with_text(64, text);
        buffer.pos = pos;
        buffer
    }

    #[test]
    fn kill_to_end_then_yank_restores() {
        let mut ring = KillRing::new();
        let mut buffer = buffer_at("hello world", 5);
        buffer.kill_to_end(&mut ring);
        assert_eq!(buffer.as_string(), "hello");
        buffer.move_home();
        ring.set_last_action(LastAction::Other);
        buffer.yank(&mut ring);
        assert_eq!(buffer.as_string(), " worldhello");
        assert_eq!(buffer.pos(), 6);
    }

    #[test]
    fn consecutive_backward_word_kills_concatenate() {
        let mut ring = KillRing::new();
        let mut buffer = buffer_at("one two three", 13);
        buffer.kill_word_backward(&mut ring);
        buffer.kill_word_backward(&mut ring);
        assert_eq!(buffer.as_string(), "one ");
        ring.set_last_action(LastAction::Other);
        buffer.yank(&mut ring);
        assert_eq!(buffer.as_string(), "one two three");
    }

    #[test]
    fn whitespace_word_kill_stops_at_spaces() {
        let mut ring = KillRing::new();
        let mut buffer = buffer_at("ls -la /tmp  ", 13);
        buffer.kill_whitespace_word_backward(&mut ring);
        assert_eq!(buffer.as_string(), "ls -la ");
        assert_eq!(ring.yank().map(|s| s.iter().collect::<String>()), Some("/tmp  ".into()));
    }

    #[test]
    fn forward_word_kill_skips_leading_punctuation() {
        let mut ring = KillRing::new();
        let mut buffer = buffer_at("a -- bc d", 1);
        buffer.kill_word_forward(&mut ring);
        assert_eq!(buffer.as_string(), "a d");
        assert_eq!(buffer.pos(), 1);
    }

    #[test]
    fn yank_pop_replaces_previous_yank() {
        let mut ring = KillRing::new();
        let mut buffer = buffer_at("alpha beta", 10);
        buffer.kill_word_backward(&mut ring);
        ring.set_last_action(LastAction::Other);
        buffer.kill_word_backward(&mut ring);
        assert!(buffer.is_empty());
        ring.set_last_action(LastAction::Other);

        buffer.yank(&mut ring);
        assert_eq!(buffer.as_string(), "alpha ");
        buffer.yank_pop(&mut ring);
        assert_eq!(buffer.as_string(), "beta");
        buffer.yank_pop(&mut ring);
        assert_eq!(buffer.as_string(), "alpha ");
        assert_eq!(buffer.pos(), 6);
    }

    #[test]
    fn yank_pop_requires_a_preceding_yank() {
        let mut ring = KillRing::new();
        let mut buffer = buffer_at("word", 4);
        buffer.kill_word_backward(&mut ring);
        assert_eq!(buffer.yank_pop(&mut ring), Outcome::Rejected);
        let mut empty = KillRing::new();
        assert_eq!(buffer.yank(&mut empty), Outcome::Rejected);
    }

    #[test]
    fn yank_truncates_at_capacity() {
        let mut ring = KillRing::new();
        ring.kill(&"abcdef".chars().collect::<Vec<_>>(), true);
        ring.set_last_action(LastAction::Other);
        let mut buffer = EditBuffer::with_text(4, "xy");
        assert_eq!(buffer.yank(&mut ring), Outcome::Truncated);
        assert_eq!(buffer.as_string(), "xyab");
        assert_eq!(ring.last_yank_len(), 2);
    }
}
