//! Incremental (ctrl-R / ctrl-S) history search state.

use crate::core::history::History;
use crate::core::key::KeyEvent;
use crate::core::keybindings::EditorAction;

/// What the edit loop should do after a key in search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// Stay in search mode and redraw; `beep` when nothing matched.
    Continue { beep: bool },
    /// Leave search mode.
    Leave {
        /// Keep the found line (otherwise restore the original).
        keep_line: bool,
        /// Key to handle again in normal editing.
        redispatch: Option<KeyEvent>,
    },
}

#[derive(Debug, Clone)]
pub struct IncrementalSearch {
    backward: bool,
    text: Vec<char>,
    /// History slot of the shown line.
    index: usize,
    line: Vec<char>,
    /// Cursor within `line`; the start of the match when there is one.
    pos: usize,
    origin_index: usize,
    origin_line: Vec<char>,
}

impl IncrementalSearch {
    /// Start from the line being edited, which sits at history slot `index`.
    pub fn new(backward: bool, index: usize, line: &[char], pos: usize) -> Self {
        Self {
            backward,
            text: Vec::new(),
            index,
            line: line.to_vec(),
            pos,
            origin_index: index,
            origin_line: line.to_vec(),
        }
    }

    pub fn is_backward(&self) -> bool {
        self.backward
    }

    pub fn search_text(&self) -> &[char] {
        &self.text
    }

    pub fn line(&self) -> &[char] {
        &self.line
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    /// The prompt shown while searching.
    pub fn prompt(&self) -> String {
        let text: String = self.text.iter().collect();
        if self.backward {
            format!("(reverse-i-search)`{text}': ")
        } else {
            format!("(i-search)`{text}': ")
        }
    }

    /// Apply one key. `previous` is the search text of the last search, reused
    /// when a search key arrives with nothing typed yet.
    pub fn handle(
        &mut self,
        key: KeyEvent,
        action: Option<EditorAction>,
        history: &History,
        previous: &[char],
    ) -> SearchStep {
        match action {
            Some(EditorAction::Abort | EditorAction::Cancel) => SearchStep::Leave {
                keep_line: false,
                redispatch: None,
            },
            Some(EditorAction::ClearScreen) => SearchStep::Leave {
                keep_line: false,
                redispatch: Some(key),
            },
            Some(action @ (EditorAction::SearchBackward | EditorAction::SearchForward)) => {
                if self.text.is_empty() && !previous.is_empty() {
                    self.text = previous.to_vec();
                }
                let backward = action == EditorAction::SearchBackward;
                let again = backward == self.backward;
                self.backward = backward;
                self.step(history, again)
            }
            Some(EditorAction::DeleteBackward) => {
                if self.text.pop().is_none() {
                    return SearchStep::Continue { beep: true };
                }
                self.step(history, false)
            }
            Some(EditorAction::Yank) => SearchStep::Continue { beep: false },
            Some(_) => SearchStep::Leave {
                keep_line: true,
                redispatch: Some(key),
            },
            None => match key.printable() {
                Some(ch) => {
                    self.text.push(ch);
                    self.step(history, false)
                }
                None => SearchStep::Continue { beep: true },
            },
        }
    }

    fn step(&mut self, history: &History, again: bool) -> SearchStep {
        let found = self.search(history, again);
        SearchStep::Continue { beep: !found }
    }

    fn line_at(&self, history: &History, idx: usize) -> Vec<char> {
        if idx == self.origin_index {
            return self.origin_line.clone();
        }
        history
            .entry(idx)
            .map(|entry| entry.chars().collect())
            .unwrap_or_default()
    }

    /// Find the next match at or past the cursor, moving through history in the
    /// search direction. `again` skips the match under the cursor.
    fn search(&mut self, history: &History, again: bool) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle: String = self.text.iter().collect();
        let mut idx = self.index;
        let mut line = self.line.clone();
        let mut start = Some(self.pos);
        if again {
            start = if self.backward {
                self.pos.checked_sub(1)
            } else {
                Some(self.pos + 1)
            };
        }
        loop {
            if let Some(start) = start {
                if let Some(found) = find_in_line(&line, &self.text, start, self.backward) {
                    self.index = idx;
                    self.line = line;
                    self.pos = found;
                    return true;
                }
            }
            let next = if self.backward {
                idx.checked_sub(1)
                    .and_then(|from| history.find_containing(&needle, from, true))
            } else if idx + 1 < history.slot_count() {
                history.find_containing(&needle, idx + 1, false)
            } else {
                None
            };
            let Some(next) = next else {
                return false;
            };
            idx = next;
            line = self.line_at(history, idx);
            start = if self.backward {
                line.len().checked_sub(self.text.len())
            } else {
                Some(0)
            };
        }
    }
}

/// Position of `needle` in `line`, scanning from `start` in the given direction.
fn find_in_line(line: &[char], needle: &[char], start: usize, backward: bool) -> Option<usize> {
    let matches_at = |at: usize| line.get(at..at + needle.len()) == Some(needle);
    if backward {
        let from = start.min(line.len());
        (0..=from).rev().find(|&at| matches_at(at))
    } else {
        (start..line.len()).find(|&at| matches_at(at))
    }
}

#[cfg(test)]
mod tests {
    use super::{find_in_line, IncrementalSearch, SearchStep};
    use crate::core::history::History;
    use crate::core::key::KeyEvent;
    use crate::core::keybindings::EditorAction;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn history(lines: &[&str]) -> History {
        let mut history = History::new(100);
        for line in lines {
            history.add(line);
        }
        history.start_recall();
        history
    }

    fn type_text(search: &mut IncrementalSearch, history: &History, text: &str) -> SearchStep {
        let mut step = SearchStep::Continue { beep: false };
        for ch in text.chars() {
            step = search.handle(KeyEvent::from_char(ch), None, history, &[]);
        }
        step
    }

    fn shown(search: &IncrementalSearch) -> String {
        search.line().iter().collect()
    }

    #[test]
    fn finds_in_line_both_directions() {
        let line = chars("abcabc");
        let needle = chars("bc");
        assert_eq!(find_in_line(&line, &needle, 0, false), Some(1));
        assert_eq!(find_in_line(&line, &needle, 2, false), Some(4));
        assert_eq!(find_in_line(&line, &needle, 6, true), Some(4));
        assert_eq!(find_in_line(&line, &needle, 3, true), Some(1));
        assert_eq!(find_in_line(&line, &needle, 0, true), None);
    }

    #[test]
    fn reverse_search_finds_newest_match_first() {
        let history = history(&["ls -la", "git status", "ls -a"]);
        let mut search = IncrementalSearch::new(true, history.index(), &[], 0);
        let step = type_text(&mut search, &history, "ls");
        assert_eq!(step, SearchStep::Continue { beep: false });
        assert_eq!(shown(&search), "ls -a");
        assert_eq!(search.pos(), 0);
        assert_eq!(search.prompt(), "(reverse-i-search)`ls': ");
    }

    #[test]
    fn repeating_the_key_finds_older_matches() {
        let history = history(&["ls -la", "git status", "ls -a"]);
        let mut search = IncrementalSearch::new(true, history.index(), &[], 0);
        type_text(&mut search, &history, "ls");
        let again = search.handle(
            KeyEvent::ctrl('R'),
            Some(EditorAction::SearchBackward),
            &history,
            &[],
        );
        assert_eq!(again, SearchStep::Continue { beep: false });
        assert_eq!(shown(&search), "ls -la");

        let exhausted = search.handle(
            KeyEvent::ctrl('R'),
            Some(EditorAction::SearchBackward),
            &history,
            &[],
        );
        assert_eq!(exhausted, SearchStep::Continue { beep: true });
        assert_eq!(shown(&search), "ls -la");
    }

    #[test]
    fn direction_switch_and_previous_text() {
        let history = history(&["make test", "cargo build", "make"]);
        let mut search = IncrementalSearch::new(true, history.index(), &[], 0);
        let previous = chars("make");
        search.handle(
            KeyEvent::ctrl('R'),
            Some(EditorAction::SearchBackward),
            &history,
            &previous,
        );
        assert_eq!(search.search_text(), previous.as_slice());
        assert_eq!(shown(&search), "make");
        search.handle(
            KeyEvent::ctrl('R'),
            Some(EditorAction::SearchBackward),
            &history,
            &previous,
        );
        assert_eq!(shown(&search), "make test");
        search.handle(
            KeyEvent::ctrl('S'),
            Some(EditorAction::SearchForward),
            &history,
            &previous,
        );
        assert!(!search.is_backward());
        assert_eq!(search.prompt(), "(i-search)`make': ");
    }

    #[test]
    fn backspace_shortens_and_beeps_when_empty() {
        let history = history(&["alpha"]);
        let mut search = IncrementalSearch::new(true, history.index(), &[], 0);
        type_text(&mut search, &history, "al");
        let step = search.handle(
            KeyEvent::BACKSPACE,
            Some(EditorAction::DeleteBackward),
            &history,
            &[],
        );
        assert_eq!(step, SearchStep::Continue { beep: false });
        assert_eq!(search.search_text(), &['a']);
        search.handle(KeyEvent::BACKSPACE, Some(EditorAction::DeleteBackward), &history, &[]);
        let empty = search.handle(
            KeyEvent::BACKSPACE,
            Some(EditorAction::DeleteBackward),
            &history,
            &[],
        );
        assert_eq!(empty, SearchStep::Continue { beep: true });
    }

    #[test]
    fn exit_keys() {
        let history = history(&["alpha"]);
        let mut search = IncrementalSearch::new(true, history.index(), &[], 0);
        assert_eq!(
            search.handle(KeyEvent::ctrl('G'), Some(EditorAction::Cancel), &history, &[]),
            SearchStep::Leave { keep_line: false, redispatch: None }
        );
        assert_eq!(
            search.handle(KeyEvent::ctrl('L'), Some(EditorAction::ClearScreen), &history, &[]),
            SearchStep::Leave { keep_line: false, redispatch: Some(KeyEvent::ctrl('L')) }
        );
        assert_eq!(
            search.handle(KeyEvent::ENTER, Some(EditorAction::Accept), &history, &[]),
            SearchStep::Leave { keep_line: true, redispatch: Some(KeyEvent::ENTER) }
        );
    }

    #[test]
    fn no_match_keeps_previous_line_and_beeps() {
        let history = history(&["alpha"]);
        let mut search = IncrementalSearch::new(true, history.index(), &chars("typed"), 5);
        let step = type_text(&mut search, &history, "zz");
        assert_eq!(step, SearchStep::Continue { beep: true });
        assert_eq!(shown(&search), "typed");
    }
}
