//! One interactive `read_line`: the key loop and its sub-modes.

use tracing::{debug, trace};

use crate::config::ReaderConfig;
use crate::core::completion::{Callbacks, Color, MATCH_COLOR, MISMATCH_COLOR};
use crate::core::history::History;
use crate::core::key::KeyEvent;
use crate::core::keybindings::{EditorAction, Keymap};
use crate::core::kill_ring::{KillRing, LastAction};
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::Terminal;
use crate::core::text::width::columns_of;
use crate::editor::brackets;
use crate::editor::completion::{layout_columns, longest_common_prefix, CompletionCycle};
use crate::editor::hints::{self, HintContext, HintLayout};
use crate::editor::{EditBuffer, IncrementalSearch, Outcome, SearchStep};
use crate::error::{ReadlineError, Result};
use crate::render::{paint, LineView, PaintMode, Prompt};
use crate::runtime::keys::{KeyRead, KeyReader};

/// State that outlives a single read.
pub(crate) struct ReaderState {
    pub(crate) config: ReaderConfig,
    pub(crate) keymap: Keymap,
    pub(crate) history: History,
    pub(crate) kill_ring: KillRing,
    pub(crate) callbacks: Callbacks,
    pub(crate) keys: KeyReader,
    /// Search text of the last incremental search.
    pub(crate) previous_search: Vec<char>,
}

impl ReaderState {
    pub(crate) fn new(config: ReaderConfig) -> Self {
        Self {
            keymap: Keymap::default(),
            history: History::new(config.max_history_size),
            kill_ring: KillRing::new(),
            callbacks: Callbacks::default(),
            keys: KeyReader::default(),
            previous_search: Vec::new(),
            config,
        }
    }
}

/// Answer to a `--More--` pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum More {
    Page,
    Line,
    Stop,
    Interrupt,
}

/// Result of reading one key in the main loop.
enum Input {
    Key(KeyEvent),
    Nothing,
    Eof,
}

pub(crate) struct EditSession<'a, T: Terminal + ?Sized> {
    term: &'a mut T,
    state: &'a mut ReaderState,
    buffer: EditBuffer,
    prompt: Prompt,
    gate: OutputGate,
    cycle: Option<CompletionCycle>,
    hint_count: usize,
    pending: Option<KeyEvent>,
    resize_pending: bool,
}

impl<'a, T: Terminal + ?Sized> EditSession<'a, T> {
    pub(crate) fn new(term: &'a mut T, state: &'a mut ReaderState, prompt: &str) -> Self {
        let columns = term.columns();
        let strip_colors = !term.output_is_tty();
        Self {
            buffer: EditBuffer::new(state.config.max_line_len),
            prompt: Prompt::new(prompt, columns, strip_colors),
            term,
            state,
            gate: OutputGate::new(),
            cycle: None,
            hint_count: 0,
            pending: None,
            resize_pending: false,
        }
    }

    /// Edit until the line is accepted, abandoned, or input ends.
    pub(crate) fn run(mut self) -> Result<String> {
        self.state.history.start_recall();
        let result = self.edit();
        self.state.history.finish_recall(result.is_ok());
        result
    }

    fn edit(&mut self) -> Result<String> {
        self.paint(PaintMode::Full);
        self.flush()?;
        loop {
            if self.term.take_resize() || std::mem::take(&mut self.resize_pending) {
                self.resize()?;
            }
            let key = match self.next_key()? {
                Input::Key(key) => key,
                Input::Nothing => continue,
                Input::Eof if self.buffer.is_empty() => return Err(self.end_of_input()?),
                Input::Eof => return self.accept(),
            };
            if let Some(line) = self.dispatch(key)? {
                return Ok(line);
            }
        }
    }

    fn next_key(&mut self) -> Result<Input> {
        if let Some(key) = self.pending.take() {
            return Ok(Input::Key(key));
        }
        Ok(match self.state.keys.read(&mut *self.term)? {
            KeyRead::Key(key) => Input::Key(key),
            KeyRead::Invalid => {
                self.beep()?;
                Input::Nothing
            }
            KeyRead::Resized => Input::Nothing,
            KeyRead::Eof => Input::Eof,
        })
    }

    /// Next key for a sub-prompt. `None` at end of input.
    fn wait_key(&mut self) -> Result<Option<KeyEvent>> {
        loop {
            match self.state.keys.read(&mut *self.term)? {
                KeyRead::Key(key) => return Ok(Some(key)),
                KeyRead::Invalid => continue,
                KeyRead::Resized => {
                    self.term.take_resize();
                    self.resize_pending = true;
                }
                KeyRead::Eof => return Ok(None),
            }
        }
    }

    fn dispatch(&mut self, key: KeyEvent) -> Result<Option<String>> {
        use EditorAction::*;

        let action = self.state.keymap.action_for(key);
        trace!(%key, ?action, "dispatch");
        let Some(action) = action else {
            self.state.kill_ring.set_last_action(LastAction::Other);
            match key.printable() {
                Some(ch) => self.insert(ch)?,
                None => self.beep()?,
            }
            self.after_action(None);
            return Ok(None);
        };

        let chains_kills = matches!(
            action,
            KillToEnd
                | KillToStart
                | KillWordForward
                | KillWordBackward
                | KillWhitespaceWordBackward
                | Yank
                | YankPop
        );
        if !chains_kills {
            self.state.kill_ring.set_last_action(LastAction::Other);
        }

        let outcome = match action {
            MoveHome => self.buffer.move_home(),
            MoveEnd => self.buffer.move_end(),
            MoveLeft => self.buffer.move_left(),
            MoveRight => self.buffer.move_right(),
            MoveWordLeft => self.buffer.move_word_left(),
            MoveWordRight => self.buffer.move_word_right(),
            DeleteBackward => self.buffer.delete_backward(),
            DeleteForward => self.buffer.delete_forward(),
            DeleteOrEof if self.buffer.is_empty() => return Err(self.end_of_input()?),
            DeleteOrEof => self.buffer.delete_forward(),
            KillToEnd => self.buffer.kill_to_end(&mut self.state.kill_ring),
            KillToStart => self.buffer.kill_to_start(&mut self.state.kill_ring),
            KillWordForward => self.buffer.kill_word_forward(&mut self.state.kill_ring),
            KillWordBackward => self.buffer.kill_word_backward(&mut self.state.kill_ring),
            KillWhitespaceWordBackward => self
                .buffer
                .kill_whitespace_word_backward(&mut self.state.kill_ring),
            Yank => self.buffer.yank(&mut self.state.kill_ring),
            YankPop => self.buffer.yank_pop(&mut self.state.kill_ring),
            CapitalizeWord => self.buffer.capitalize_word(),
            UpcaseWord => self.buffer.upcase_word(),
            DowncaseWord => self.buffer.downcase_word(),
            TransposeChars => self.buffer.transpose_chars(),
            HistoryPrevious => self.history_step(true),
            HistoryNext => self.history_step(false),
            HistoryFirst => self.history_jump(true),
            HistoryLast => self.history_jump(false),
            HistoryPrefixBackward => self.history_prefix(true),
            HistoryPrefixForward => self.history_prefix(false),
            SearchBackward => {
                self.incremental_search(true)?;
                Outcome::Unchanged
            }
            SearchForward => {
                self.incremental_search(false)?;
                Outcome::Unchanged
            }
            Complete => self.complete()?,
            HintPrevious => self.cycle_hint(false),
            HintNext => self.cycle_hint(true),
            ClearScreen => {
                self.clear_screen()?;
                Outcome::Unchanged
            }
            Abort => return Err(self.abort()?),
            Cancel => Outcome::Rejected,
            Accept => return self.accept().map(Some),
        };

        self.after_action(Some(action));
        self.apply(outcome)?;
        Ok(None)
    }

    fn after_action(&mut self, action: Option<EditorAction>) {
        use EditorAction::*;

        if !matches!(action, Some(HistoryPrefixBackward | HistoryPrefixForward)) {
            let pos = self.buffer.pos();
            self.buffer.set_prefix(pos);
        }
        if !matches!(action, Some(HintPrevious | HintNext)) {
            self.buffer.clear_hint_selection();
        }
    }

    fn apply(&mut self, outcome: Outcome) -> Result<()> {
        if outcome.beeps() {
            self.gate.push(TerminalCmd::Beep);
        }
        if outcome.changed() {
            self.paint(PaintMode::Input);
        }
        self.flush()
    }

    fn insert(&mut self, ch: char) -> Result<()> {
        let at_end = self.buffer.pos() == self.buffer.len();
        let outcome = self.buffer.insert_char(ch);
        if outcome == Outcome::Changed && at_end && self.can_echo() {
            self.gate.chars(&[ch]);
            return self.flush();
        }
        self.apply(outcome)
    }

    /// Whether a char appended at the end can be written without a repaint.
    fn can_echo(&self) -> bool {
        let decorated = !self.state.config.no_color && self.state.callbacks.affects_rendering();
        !decorated
            && self.prompt.cursor_row_offset == self.prompt.extra_lines()
            && self.prompt.indentation() + columns_of(self.buffer.text()) < self.prompt.columns()
    }

    fn history_step(&mut self, up: bool) -> Outcome {
        let line = self.buffer.as_string();
        self.state.history.update_current(&line);
        if !self.state.history.move_by(up) {
            return Outcome::Unchanged;
        }
        self.load_history_line()
    }

    fn history_jump(&mut self, to_start: bool) -> Outcome {
        let line = self.buffer.as_string();
        self.state.history.update_current(&line);
        if !self.state.history.jump(to_start) {
            return Outcome::Unchanged;
        }
        self.load_history_line()
    }

    fn history_prefix(&mut self, backward: bool) -> Outcome {
        let line = self.buffer.as_string();
        self.state.history.update_current(&line);
        let prefix = self.buffer.prefix();
        if !self
            .state
            .history
            .common_prefix_search(&line, prefix, backward)
        {
            return Outcome::Rejected;
        }
        self.load_history_line()
    }

    fn load_history_line(&mut self) -> Outcome {
        let entry = self.state.history.current().unwrap_or_default().to_string();
        self.buffer.set_text(&entry)
    }

    fn cycle_hint(&mut self, forward: bool) -> Outcome {
        if self.state.config.no_color || self.state.callbacks.hinter.is_none() {
            return Outcome::Unchanged;
        }
        self.buffer.cycle_hint(forward, self.hint_count);
        Outcome::Changed
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.gate.push(TerminalCmd::ClearScreen);
        self.prompt.cursor_row_offset = 0;
        self.paint(PaintMode::Full);
        self.flush()
    }

    fn resize(&mut self) -> Result<()> {
        let columns = self.term.columns();
        debug!(columns, "terminal resized");
        self.prompt.resize(columns);
        self.paint(PaintMode::Full);
        self.flush()
    }

    fn accept(&mut self) -> Result<String> {
        self.buffer.move_end();
        self.paint_with(PaintMode::Input, false);
        self.gate.push(TerminalCmd::Newline);
        self.flush()?;
        Ok(self.buffer.as_string())
    }

    fn abort(&mut self) -> Result<ReadlineError> {
        self.buffer.move_end();
        self.paint_with(PaintMode::Input, false);
        self.gate.text("^C");
        self.gate.push(TerminalCmd::Newline);
        self.flush()?;
        Ok(ReadlineError::Interrupted)
    }

    fn end_of_input(&mut self) -> Result<ReadlineError> {
        self.paint_with(PaintMode::Input, false);
        self.gate.push(TerminalCmd::Newline);
        self.flush()?;
        Ok(ReadlineError::Eof)
    }

    fn incremental_search(&mut self, backward: bool) -> Result<()> {
        let line = self.buffer.as_string();
        self.state.history.update_current(&line);
        let mut search = IncrementalSearch::new(
            backward,
            self.state.history.index(),
            self.buffer.text(),
            self.buffer.pos(),
        );
        let search_prompt = Prompt::search(&search.prompt(), self.prompt.columns())
            .with_cursor_row_offset(self.prompt.cursor_row_offset);
        let saved_prompt = std::mem::replace(&mut self.prompt, search_prompt);
        self.paint_search(&search)?;

        loop {
            if self.term.take_resize() {
                let columns = self.term.columns();
                self.prompt.resize(columns);
                self.paint_search(&search)?;
            }
            let step = match self.state.keys.read(&mut *self.term)? {
                KeyRead::Key(key) => {
                    let action = self.state.keymap.action_for(key);
                    search.handle(key, action, &self.state.history, &self.state.previous_search)
                }
                KeyRead::Invalid => SearchStep::Continue { beep: true },
                KeyRead::Resized => continue,
                KeyRead::Eof => SearchStep::Leave {
                    keep_line: false,
                    redispatch: None,
                },
            };
            match step {
                SearchStep::Continue { beep } => {
                    if beep {
                        self.gate.push(TerminalCmd::Beep);
                    }
                    self.prompt = Prompt::search(&search.prompt(), self.prompt.columns())
                        .with_cursor_row_offset(self.prompt.cursor_row_offset);
                    self.paint_search(&search)?;
                }
                SearchStep::Leave {
                    keep_line,
                    redispatch,
                } => {
                    debug!(keep_line, index = search.index(), "leaving incremental search");
                    self.state.previous_search = search.search_text().to_vec();
                    if keep_line {
                        self.buffer.set_chars(search.line(), search.pos());
                        if search.index() != search.origin_index() {
                            self.state.history.select(search.index());
                        }
                    }
                    let columns = self.prompt.columns();
                    let offset = self.prompt.cursor_row_offset;
                    self.prompt = saved_prompt.with_cursor_row_offset(offset);
                    self.prompt.resize(columns);
                    self.paint(PaintMode::Full);
                    self.pending = redispatch;
                    return self.flush();
                }
            }
        }
    }

    fn paint_search(&mut self, search: &IncrementalSearch) -> Result<()> {
        let view = LineView::plain(search.line(), search.pos());
        paint(&mut self.gate, &mut self.prompt, &view, PaintMode::Full);
        self.flush()
    }

    fn complete(&mut self) -> Result<Outcome> {
        if let Some(outcome) = self.accept_selected_hint() {
            return Ok(outcome);
        }
        let Some(completer) = self.state.callbacks.completer.as_deref() else {
            return Ok(Outcome::Rejected);
        };
        if !self.state.config.complete_on_empty && self.buffer.pos() == 0 {
            return Ok(Outcome::Rejected);
        }
        if let Some(cycle) = self
            .cycle
            .as_mut()
            .filter(|cycle| cycle.applies_to(&self.buffer))
        {
            return Ok(cycle.advance(&mut self.buffer));
        }

        let start = self.buffer.word_start(&self.state.config);
        let pos = self.buffer.pos();
        let text: String = self.buffer.text()[..pos].iter().collect();
        let candidates = completer.complete(&text, start);
        debug!(count = candidates.len(), start, "completion candidates");
        if candidates.is_empty() {
            return Ok(Outcome::Rejected);
        }
        if self.state.config.beep_on_ambiguous_completion && candidates.len() > 1 {
            self.gate.push(TerminalCmd::Beep);
        }

        let words: Vec<Vec<char>> = candidates.iter().map(|c| c.chars().collect()).collect();
        let common = longest_common_prefix(&words);
        if common > pos - start {
            return Ok(self.buffer.replace_word(start, &words[0][..common]));
        }

        if self.state.config.double_tab_completion {
            self.flush()?;
            match self.wait_key()? {
                Some(key) if self.state.keymap.matches(key, EditorAction::Complete) => {}
                Some(key) => {
                    self.pending = Some(key);
                    return Ok(Outcome::Unchanged);
                }
                None => return Ok(Outcome::Unchanged),
            }
        }
        if self.show_candidates(&candidates)? {
            self.cycle = Some(CompletionCycle::new(&candidates, start, &self.buffer));
        }
        Ok(Outcome::Unchanged)
    }

    /// Tab with a hint selected takes that hint as the word.
    fn accept_selected_hint(&mut self) -> Option<Outcome> {
        let selected = self.buffer.hint_selection()?;
        let hinter = self.state.callbacks.hinter.as_deref()?;
        let start = self.buffer.word_start(&self.state.config);
        let hints = hinter.hint(&self.buffer.as_string(), start);
        let hint: Vec<char> = hints.hints.get(selected)?.chars().collect();
        self.buffer.clear_hint_selection();
        Some(self.buffer.replace_word(start, &hint))
    }

    /// List `candidates` below the line, asking first when there are many.
    /// Returns whether the list was shown.
    fn show_candidates(&mut self, candidates: &[String]) -> Result<bool> {
        let count = candidates.len();
        let mut show = true;
        let mut asked = false;
        let mut interrupted = false;
        if count > self.state.config.completion_count_cutoff {
            self.paint_at_end();
            self.gate.push(TerminalCmd::Newline);
            self.gate
                .text(&format!("Display all {count} possibilities? (y or n)"));
            self.flush()?;
            asked = true;
            loop {
                let Some(key) = self.wait_key()? else {
                    show = false;
                    break;
                };
                match key.code_point() {
                    Some('y' | 'Y') => break,
                    Some('n' | 'N') => {
                        show = false;
                        break;
                    }
                    Some('\x03') => {
                        self.gate.text("^C");
                        show = false;
                        interrupted = true;
                        break;
                    }
                    _ => {}
                }
            }
        }

        let mut stopped = false;
        if show {
            let rows = layout_columns(candidates, self.prompt.columns());
            if !asked {
                self.paint_at_end();
            }
            let page = self
                .state
                .config
                .completion_page_rows
                .unwrap_or_else(|| self.term.rows().saturating_sub(1))
                .max(1);
            let mut pause_row = page;
            for (idx, row) in rows.iter().enumerate() {
                self.gate.push(TerminalCmd::Newline);
                if idx == pause_row {
                    self.gate.text("--More--");
                    self.flush()?;
                    match self.more_prompt()? {
                        More::Page => pause_row += page,
                        More::Line => pause_row += 1,
                        More::Stop => stopped = true,
                        More::Interrupt => {
                            stopped = true;
                            interrupted = true;
                        }
                    }
                    if stopped {
                        break;
                    }
                }
                self.gate.text(row);
            }
        }

        if !stopped || interrupted {
            self.gate.push(TerminalCmd::Newline);
        }
        self.flush()?;
        self.prompt.cursor_row_offset = 0;
        self.paint(PaintMode::Full);
        self.flush()?;
        Ok(show)
    }

    fn more_prompt(&mut self) -> Result<More> {
        loop {
            let Some(key) = self.wait_key()? else {
                self.gate.text("\r        \r");
                return Ok(More::Stop);
            };
            let answer = match key.code_point() {
                Some(' ' | 'y' | 'Y') => More::Page,
                Some('\r' | '\n') => More::Line,
                Some('n' | 'N' | 'q' | 'Q') => More::Stop,
                Some('\x03') => More::Interrupt,
                _ => {
                    self.beep()?;
                    continue;
                }
            };
            if answer == More::Interrupt {
                self.gate.text("^C");
            } else {
                self.gate.text("\r        \r");
            }
            return Ok(answer);
        }
    }

    /// Repaint with the cursor at the end so output below does not overwrite input.
    fn paint_at_end(&mut self) {
        let pos = self.buffer.pos();
        self.buffer.move_end();
        self.paint_with(PaintMode::Input, false);
        self.buffer.pos = pos;
    }

    fn paint(&mut self, mode: PaintMode) {
        self.paint_with(mode, true);
    }

    /// Repaint the line; `decorate` adds highlighting and hints.
    fn paint_with(&mut self, mode: PaintMode, decorate: bool) {
        let decorate = decorate && !self.state.config.no_color;
        let colors = if decorate { self.colors() } else { None };
        let hints = if decorate { self.hints() } else { None };
        let view = LineView {
            text: self.buffer.text(),
            pos: self.buffer.pos(),
            colors: colors.as_deref(),
            hints: hints.as_ref(),
        };
        paint(&mut self.gate, &mut self.prompt, &view, mode);
    }

    fn colors(&self) -> Option<Vec<Color>> {
        let text = self.buffer.text();
        let mut colors = None;
        if let Some(highlighter) = self.state.callbacks.highlighter.as_deref() {
            let mut slots = vec![Color::Default; text.len()];
            highlighter.highlight(&self.buffer.as_string(), &mut slots);
            colors = Some(slots);
        }
        if let Some(found) = brackets::find_match(text, self.buffer.pos()) {
            let slots = colors.get_or_insert_with(|| vec![Color::Default; text.len()]);
            slots[found.index] = if found.mismatched {
                MISMATCH_COLOR
            } else {
                MATCH_COLOR
            };
        }
        colors
    }

    fn hints(&mut self) -> Option<HintLayout> {
        self.hint_count = 0;
        let hinter = self.state.callbacks.hinter.as_deref()?;
        if self.buffer.pos() != self.buffer.len() {
            return None;
        }
        let start = self.buffer.word_start(&self.state.config);
        let found = hinter.hint(&self.buffer.as_string(), start);
        let text = self.buffer.text();
        let layout = hints::layout(
            &found,
            self.buffer.hint_selection(),
            HintContext {
                word: &text[start..],
                columns_before_word: columns_of(&text[..start]),
                indentation: self.prompt.indentation(),
                screen_columns: self.prompt.columns(),
                max_rows: self.state.config.max_hint_rows,
            },
        );
        self.hint_count = layout.count;
        Some(layout)
    }

    fn beep(&mut self) -> Result<()> {
        self.gate.push(TerminalCmd::Beep);
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.gate.flush(&mut *self.term)?;
        Ok(())
    }
}
