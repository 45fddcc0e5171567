//! Emacs-style kill ring.

/// Number of kills remembered.
pub const KILL_RING_CAPACITY: usize = 10;

/// What the editor did last, as far as kill/yank chaining is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LastAction {
    #[default]
    Other,
    Kill,
    Yank,
}

/// Fixed-capacity ring of killed spans.
///
/// `index_to_slot` maps logical position (0 = most recent) to a physical slot, so
/// a new kill moves to the front by shifting small indices instead of text.
#[derive(Debug, Clone, Default)]
pub struct KillRing {
    slots: Vec<Vec<char>>,
    index_to_slot: [usize; KILL_RING_CAPACITY],
    index: usize,
    last_action: LastAction,
    last_yank_len: usize,
}

impl KillRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn last_action(&self) -> LastAction {
        self.last_action
    }

    pub fn set_last_action(&mut self, action: LastAction) {
        self.last_action = action;
    }

    /// Length of the span inserted by the most recent yank.
    pub fn last_yank_len(&self) -> usize {
        self.last_yank_len
    }

    /// Mark a yank of `len` chars as the last action.
    pub fn record_yank(&mut self, len: usize) {
        self.last_action = LastAction::Yank;
        self.last_yank_len = len;
    }

    /// Store a killed span.
    ///
    /// Directly after another kill the span joins the newest slot: appended when
    /// killing forward, prepended when killing backward.
    pub fn kill(&mut self, text: &[char], forward: bool) {
        if text.is_empty() {
            return;
        }
        if self.last_action == LastAction::Kill && !self.slots.is_empty() {
            let slot = &mut self.slots[self.index_to_slot[0]];
            if forward {
                slot.extend_from_slice(text);
            } else {
                slot.splice(0..0, text.iter().copied());
            }
        } else {
            let size = self.slots.len();
            if size < KILL_RING_CAPACITY {
                self.index_to_slot.copy_within(0..size, 1);
                self.index_to_slot[0] = size;
                self.slots.push(text.to_vec());
            } else {
                let recycled = self.index_to_slot[KILL_RING_CAPACITY - 1];
                self.slots[recycled] = text.to_vec();
                self.index_to_slot.copy_within(0..KILL_RING_CAPACITY - 1, 1);
                self.index_to_slot[0] = recycled;
            }
            self.index = 0;
        }
        self.last_action = LastAction::Kill;
    }

    /// The span at the current logical position.
    pub fn yank(&self) -> Option<&[char]> {
        if self.slots.is_empty() {
            return None;
        }
        Some(&self.slots[self.index_to_slot[self.index]])
    }

    /// Advance to the next older span, wrapping after the oldest.
    pub fn yank_pop(&mut self) -> Option<&[char]> {
        if self.slots.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.slots.len();
        Some(&self.slots[self.index_to_slot[self.index]])
    }
}

#[cfg(test)]
mod tests {
    use super::{KillRing, LastAction, KILL_RING_CAPACITY};

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn string(span: Option<&[char]>) -> String {
        span.map(|span| span.iter().collect()).unwrap_or_default()
    }

    fn kill_separately(ring: &mut KillRing, text: &str) {
        ring.set_last_action(LastAction::Other);
        ring.kill(&chars(text), true);
    }

    #[test]
    fn empty_ring_yields_nothing() {
        let mut ring = KillRing::new();
        assert!(ring.yank().is_none());
        assert!(ring.yank_pop().is_none());
        ring.kill(&[], true);
        assert!(ring.is_empty());
    }

    #[test]
    fn consecutive_kills_accumulate_by_direction() {
        let mut ring = KillRing::new();
        ring.kill(&chars("world"), true);
        ring.kill(&chars("!"), true);
        ring.kill(&chars("hello "), false);
        assert_eq!(ring.len(), 1);
        assert_eq!(string(ring.yank()), "hello world!");
    }

    #[test]
    fn interrupted_kills_use_new_slots() {
        let mut ring = KillRing::new();
        kill_separately(&mut ring, "one");
        kill_separately(&mut ring, "two");
        assert_eq!(ring.len(), 2);
        assert_eq!(string(ring.yank()), "two");
        assert_eq!(string(ring.yank_pop()), "one");
        assert_eq!(string(ring.yank_pop()), "two");
    }

    #[test]
    fn yank_pop_cycles_most_recent_ten_and_never_the_evicted_one() {
        let mut ring = KillRing::new();
        for n in 1..=11 {
            kill_separately(&mut ring, &format!("span{n}"));
        }
        assert_eq!(ring.len(), KILL_RING_CAPACITY);
        assert_eq!(string(ring.yank()), "span11");

        let mut seen = Vec::new();
        for _ in 0..11 {
            seen.push(string(ring.yank_pop()));
        }
        let expected: Vec<String> = (2..=10)
            .rev()
            .chain([11, 10])
            .map(|n| format!("span{n}"))
            .collect();
        assert_eq!(seen, expected);
        assert!(!seen.contains(&"span1".to_string()));
    }

    #[test]
    fn new_kill_resets_logical_index() {
        let mut ring = KillRing::new();
        kill_separately(&mut ring, "a");
        kill_separately(&mut ring, "b");
        ring.yank_pop();
        kill_separately(&mut ring, "c");
        assert_eq!(string(ring.yank()), "c");
    }

    #[test]
    fn record_yank_tracks_length() {
        let mut ring = KillRing::new();
        ring.kill(&chars("abc"), true);
        ring.record_yank(3);
        assert_eq!(ring.last_action(), LastAction::Yank);
        assert_eq!(ring.last_yank_len(), 3);
        // A kill after a yank starts a fresh slot.
        ring.kill(&chars("z"), true);
        assert_eq!(ring.len(), 2);
    }
}
