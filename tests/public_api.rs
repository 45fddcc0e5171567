#![allow(unused_imports)]

use tape_line::{
    parse_key_id, visible_width, words_with_prefix, Callbacks, Color, Completer, EditorAction,
    Highlighter, Hinter, Hints, History, HistoryError, InputKind, InputUnit, KeyEvent, KeyId,
    Keymap, KeymapConfig, LineReader, LoggingError, ProcessTerminal, RawModeGuard, ReadlineError,
    ReaderConfig, Result, Terminal, DEFAULT_KEYMAP,
};

#[test]
fn public_api_exports_compile() {}
