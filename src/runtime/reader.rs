//! The public line reader.

use std::path::Path;

use tracing::debug;

use crate::config::ReaderConfig;
use crate::core::completion::{Completer, Highlighter, Hinter};
use crate::core::history::History;
use crate::core::keybindings::Keymap;
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::terminal::{InputKind, RawModeGuard, Terminal};
use crate::error::{HistoryError, ReadlineError, Result};
use crate::platform::process_terminal::ProcessTerminal;
use crate::runtime::session::{EditSession, ReaderState};

/// Reads lines from a terminal with editing, history, and completion.
///
/// One reader owns its history, kill ring, and callbacks across calls to
/// [`LineReader::read_line`].
pub struct LineReader<T: Terminal> {
    terminal: T,
    state: ReaderState,
}

impl LineReader<ProcessTerminal> {
    /// A reader on the process stdin/stdout, configured from the environment.
    pub fn stdio() -> Self {
        Self::with_config(ProcessTerminal::new(), ReaderConfig::from_env())
    }
}

impl<T: Terminal> LineReader<T> {
    pub fn new(terminal: T) -> Self {
        Self::with_config(terminal, ReaderConfig::default())
    }

    pub fn with_config(terminal: T, config: ReaderConfig) -> Self {
        Self {
            terminal,
            state: ReaderState::new(config),
        }
    }

    /// Show `prompt` and read one line.
    ///
    /// Returns [`ReadlineError::Interrupted`] on ctrl-C and [`ReadlineError::Eof`]
    /// when input ends on an empty line. Accepted non-empty lines are added to
    /// the history.
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        let kind = self.terminal.input_kind();
        debug!(?kind, "read_line");
        let line = match kind {
            InputKind::NotATty => self.read_plain_line()?,
            InputKind::Unsupported => {
                let mut gate = OutputGate::new();
                gate.text(prompt);
                gate.flush(&mut self.terminal)?;
                self.read_plain_line()?
            }
            InputKind::Interactive => {
                let mut guard = RawModeGuard::new(&mut self.terminal)?;
                EditSession::new(&mut *guard, &mut self.state, prompt).run()?
            }
        };
        if !line.is_empty() {
            self.state.history.add(&line);
        }
        Ok(line)
    }

    fn read_plain_line(&mut self) -> Result<String> {
        self.terminal
            .read_plain_line()?
            .ok_or(ReadlineError::Eof)
    }

    /// Clear the screen, leaving the cursor at the top left.
    pub fn clear_screen(&mut self) -> Result<()> {
        let mut gate = OutputGate::new();
        gate.push(TerminalCmd::ClearScreen);
        gate.flush(&mut self.terminal)?;
        Ok(())
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.state.history
    }

    /// Add a line to the history. Returns false if it was dropped as a duplicate
    /// of the newest entry or the history has zero capacity.
    pub fn add_history(&mut self, line: &str) -> bool {
        self.state.history.add(line)
    }

    pub fn set_max_history_size(&mut self, max_size: usize) {
        self.state.config.max_history_size = max_size;
        self.state.history.set_max_size(max_size);
    }

    pub fn load_history(&mut self, path: impl AsRef<Path>) -> std::result::Result<(), HistoryError> {
        self.state.history.load(path)
    }

    pub fn save_history(&self, path: impl AsRef<Path>) -> std::result::Result<(), HistoryError> {
        self.state.history.save(path)
    }

    pub fn set_completer(&mut self, completer: impl Completer + 'static) {
        self.state.callbacks.completer = Some(Box::new(completer));
    }

    pub fn set_hinter(&mut self, hinter: impl Hinter + 'static) {
        self.state.callbacks.hinter = Some(Box::new(hinter));
    }

    pub fn set_highlighter(&mut self, highlighter: impl Highlighter + 'static) {
        self.state.callbacks.highlighter = Some(Box::new(highlighter));
    }

    pub fn keymap(&self) -> &Keymap {
        &self.state.keymap
    }

    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.state.keymap = keymap;
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.state.config
    }

    /// History capacity changes go through [`LineReader::set_max_history_size`].
    pub fn config_mut(&mut self) -> &mut ReaderConfig {
        &mut self.state.config
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }
}
