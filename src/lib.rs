//! Interactive line editing for terminal REPLs.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to
//! the terminal.
//!
//! # Public API Overview
//! - Read lines with [`LineReader`]; [`LineReader::stdio`] binds it to the process
//!   terminal, [`LineReader::new`] to any [`Terminal`].
//! - Plug in completion, hints, and highlighting through [`Completer`], [`Hinter`], and
//!   [`Highlighter`] (closures work).
//! - Keep history across sessions with [`History::save`] and [`History::load`].
//! - Rebind keys with [`Keymap`] and [`KeymapConfig`].

#![allow(clippy::needless_range_loop, clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod editor;
pub mod platform;
pub mod render;
pub mod runtime;

/// Reader configuration.
pub use crate::config::ReaderConfig;

/// Errors.
pub use crate::error::{HistoryError, LoggingError, ReadlineError, Result};

/// Callback traits and colors.
pub use crate::core::completion::{
    words_with_prefix, Callbacks, Color, Completer, Highlighter, Hinter, Hints,
};

/// Byte/code point conversion mode.
pub use crate::core::codec::{codec_mode, set_codec_mode, CodecMode};

/// History store.
pub use crate::core::history::History;

/// Keys and keybindings.
pub use crate::core::key::{parse_key_id, KeyEvent};
pub use crate::core::keybindings::{EditorAction, KeyId, Keymap, KeymapConfig, DEFAULT_KEYMAP};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::{InputKind, InputUnit, RawModeGuard, Terminal};
pub use crate::platform::process_terminal::ProcessTerminal;

/// The reader.
pub use crate::runtime::LineReader;

/// Column width of text as the terminal draws it.
pub use crate::core::text::width::visible_width;
