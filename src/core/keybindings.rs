//! Line editor keybindings.

use std::collections::HashMap;
use once_cell::sync::Lazy;

use tracing::warn;

use crate::core::key::{parse_key_id, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    MoveHome,
    MoveEnd,
    MoveLeft,
    MoveRight,
    MoveWordLeft,
    MoveWordRight,
    DeleteBackward,
    DeleteForward,
    /// Delete under the cursor, or end input on an empty line.
    DeleteOrEof,
    KillToEnd,
    KillToStart,
    KillWordForward,
    KillWordBackward,
    /// Kill back to the previous whitespace.
    KillWhitespaceWordBackward,
    Yank,
    YankPop,
    CapitalizeWord,
    UpcaseWord,
    DowncaseWord,
    TransposeChars,
    HistoryPrevious,
    HistoryNext,
    HistoryFirst,
    HistoryLast,
    HistoryPrefixBackward,
    HistoryPrefixForward,
    SearchBackward,
    SearchForward,
    Complete,
    HintPrevious,
    HintNext,
    ClearScreen,
    /// Abandon the line (ctrl-C).
    Abort,
    /// Leave a sub-mode without side effects (ctrl-G).
    Cancel,
    Accept,
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<String> for KeyBinding {
    fn from(value: String) -> Self {
        KeyBinding::Single(value)
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(|item| item.to_string()).collect())
    }
}

impl From<Vec<String>> for KeyBinding {
    fn from(value: Vec<String>) -> Self {
        KeyBinding::Multiple(value)
    }
}

/// Per-action overrides; each replaces the default key list for its action.
#[derive(Debug, Clone, Default)]
pub struct KeymapConfig {
    entries: HashMap<EditorAction, KeyBinding>,
}

impl KeymapConfig {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn set<K: Into<KeyBinding>>(&mut self, action: EditorAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

fn ids(keys: &[&str]) -> Vec<KeyId> {
    keys.iter().map(|key| key.to_string()).collect()
}

pub static DEFAULT_KEYMAP: Lazy<HashMap<EditorAction, Vec<KeyId>>> = Lazy::new(|| {
    use EditorAction::*;

    let mut map = HashMap::new();
    map.insert(MoveHome, ids(&["ctrl+a", "home"]));
    map.insert(MoveEnd, ids(&["ctrl+e", "end"]));
    map.insert(MoveLeft, ids(&["ctrl+b", "left"]));
    map.insert(MoveRight, ids(&["ctrl+f", "right"]));
    map.insert(
        MoveWordLeft,
        ids(&["alt+b", "alt+B", "ctrl+left", "alt+left"]),
    );
    map.insert(
        MoveWordRight,
        ids(&["alt+f", "alt+F", "ctrl+right", "alt+right"]),
    );
    map.insert(DeleteBackward, ids(&["backspace"]));
    map.insert(DeleteForward, ids(&["delete"]));
    map.insert(DeleteOrEof, ids(&["ctrl+d"]));
    map.insert(KillToEnd, ids(&["ctrl+k"]));
    map.insert(KillToStart, ids(&["ctrl+u"]));
    map.insert(KillWordForward, ids(&["alt+d", "alt+D"]));
    map.insert(KillWordBackward, ids(&["alt+backspace"]));
    map.insert(KillWhitespaceWordBackward, ids(&["ctrl+w"]));
    map.insert(Yank, ids(&["ctrl+y"]));
    map.insert(YankPop, ids(&["alt+y", "alt+Y"]));
    map.insert(CapitalizeWord, ids(&["alt+c", "alt+C"]));
    map.insert(UpcaseWord, ids(&["alt+u", "alt+U"]));
    map.insert(DowncaseWord, ids(&["alt+l", "alt+L"]));
    map.insert(TransposeChars, ids(&["ctrl+t"]));
    map.insert(HistoryPrevious, ids(&["ctrl+p", "up"]));
    map.insert(HistoryNext, ids(&["ctrl+n", "down"]));
    map.insert(HistoryFirst, ids(&["alt+<", "pageUp"]));
    map.insert(HistoryLast, ids(&["alt+>", "pageDown"]));
    map.insert(HistoryPrefixBackward, ids(&["alt+p", "alt+P"]));
    map.insert(HistoryPrefixForward, ids(&["alt+n", "alt+N"]));
    map.insert(SearchBackward, ids(&["ctrl+r"]));
    map.insert(SearchForward, ids(&["ctrl+s"]));
    map.insert(Complete, ids(&["tab"]));
    map.insert(HintPrevious, ids(&["ctrl+up"]));
    map.insert(HintNext, ids(&["ctrl+down"]));
    map.insert(ClearScreen, ids(&["ctrl+l"]));
    map.insert(Abort, ids(&["ctrl+c"]));
    map.insert(Cancel, ids(&["ctrl+g"]));
    map.insert(Accept, ids(&["enter", "ctrl+j"]));

    map
});

/// Resolved bindings in both directions.
#[derive(Debug, Clone)]
pub struct Keymap {
    action_to_keys: HashMap<EditorAction, Vec<KeyId>>,
    key_to_action: HashMap<KeyEvent, EditorAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new(KeymapConfig::default())
    }
}

impl Keymap {
    pub fn new(config: KeymapConfig) -> Self {
        let mut keymap = Self {
            action_to_keys: HashMap::new(),
            key_to_action: HashMap::new(),
        };
        keymap.build_maps(&config);
        keymap
    }

    fn build_maps(&mut self, config: &KeymapConfig) {
        self.action_to_keys.clear();
        self.key_to_action.clear();

        for (action, keys) in DEFAULT_KEYMAP.iter() {
            self.action_to_keys.insert(*action, keys.clone());
        }

        for (action, binding) in config.entries.iter() {
            let key_list = match binding {
                KeyBinding::Single(key) => vec![key.clone()],
                KeyBinding::Multiple(keys) => keys.clone(),
            };
            self.action_to_keys.insert(*action, key_list);
        }

        // Overridden actions claim their keys last so they win collisions.
        let (overridden, defaults): (Vec<_>, Vec<_>) = self
            .action_to_keys
            .iter()
            .partition(|(action, _)| config.entries.contains_key(*action));
        let mut resolved = HashMap::new();
        for (action, keys) in defaults.into_iter().chain(overridden) {
            for key_id in keys {
                match parse_key_id(key_id) {
                    Some(key) => {
                        resolved.insert(key, *action);
                    }
                    None => warn!(key = %key_id, ?action, "ignoring unparsable key binding"),
                }
            }
        }
        self.key_to_action = resolved;
    }

    /// The action bound to a decoded key.
    pub fn action_for(&self, key: KeyEvent) -> Option<EditorAction> {
        self.key_to_action.get(&key.normalized()).copied()
    }

    pub fn matches(&self, key: KeyEvent, action: EditorAction) -> bool {
        self.action_for(key) == Some(action)
    }

    pub fn get_keys(&self, action: EditorAction) -> Vec<KeyId> {
        self.action_to_keys.get(&action).cloned().unwrap_or_default()
    }

    pub fn set_config(&mut self, config: KeymapConfig) {
        self.build_maps(&config);
    }
}
