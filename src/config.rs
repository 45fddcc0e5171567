//! Reader configuration and environment overrides.

use std::env;

/// Word-break characters used when no override is given.
pub const DEFAULT_WORD_BREAK_CHARS: &str = " \t\n\"\\'`@$><=;|&{(";

/// Knobs consumed by the edit buffer and the driving loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Characters that end the "current word" for completion and hints.
    pub word_break_chars: String,
    /// Break characters that still belong to the word being completed.
    pub special_prefixes: String,
    /// Maximum number of code points in the edit buffer.
    pub max_line_len: usize,
    /// Maximum rows used by the hint list below the input line.
    pub max_hint_rows: usize,
    /// Wait for a second Tab before listing candidates.
    pub double_tab_completion: bool,
    /// Run the completer when the cursor is at column zero.
    pub complete_on_empty: bool,
    /// Beep whenever completion finds more than one candidate.
    pub beep_on_ambiguous_completion: bool,
    /// Disable highlighter colors, bracket highlighting, and colored hints.
    pub no_color: bool,
    /// History capacity.
    pub max_history_size: usize,
    /// Ask before listing more candidates than this.
    pub completion_count_cutoff: usize,
    /// Rows between `--More--` pauses; `None` uses the terminal height minus one.
    pub completion_page_rows: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            word_break_chars: DEFAULT_WORD_BREAK_CHARS.to_string(),
            special_prefixes: String::new(),
            max_line_len: 4096,
            max_hint_rows: 4,
            double_tab_completion: false,
            complete_on_empty: true,
            beep_on_ambiguous_completion: false,
            no_color: false,
            max_history_size: 1000,
            completion_count_cutoff: 100,
            completion_page_rows: None,
        }
    }
}

impl ReaderConfig {
    /// Defaults overlaid with `TAPE_LINE_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if env_flag("TAPE_LINE_NO_COLOR") || env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }
        if env_flag("TAPE_LINE_DOUBLE_TAB") {
            config.double_tab_completion = true;
        }
        if let Some(size) = env_usize("TAPE_LINE_MAX_HISTORY") {
            config.max_history_size = size;
        }
        if let Some(len) = env_usize("TAPE_LINE_MAX_LINE") {
            config.max_line_len = len.max(1);
        }
        config
    }

    pub fn is_word_break(&self, ch: char) -> bool {
        self.word_break_chars.contains(ch)
    }

    pub fn is_special_prefix(&self, ch: char) -> bool {
        self.special_prefixes.contains(ch)
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_usize(key: &str) -> Option<usize> {
    env_string_opt(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::ReaderConfig;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_match_default_config() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_LINE_NO_COLOR", None);
        let _g2 = set_env_guard("NO_COLOR", None);
        let _g3 = set_env_guard("TAPE_LINE_MAX_HISTORY", None);
        let _g4 = set_env_guard("TAPE_LINE_MAX_LINE", None);
        let _g5 = set_env_guard("TAPE_LINE_DOUBLE_TAB", None);

        assert_eq!(ReaderConfig::from_env(), ReaderConfig::default());
    }

    #[test]
    fn env_overrides_apply() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_LINE_NO_COLOR", Some("1"));
        let _g2 = set_env_guard("TAPE_LINE_MAX_HISTORY", Some("25"));
        let _g3 = set_env_guard("TAPE_LINE_MAX_LINE", Some(" 80 "));
        let _g4 = set_env_guard("TAPE_LINE_DOUBLE_TAB", Some("1"));

        let config = ReaderConfig::from_env();
        assert!(config.no_color);
        assert_eq!(config.max_history_size, 25);
        assert_eq!(config.max_line_len, 80);
        assert!(config.double_tab_completion);
    }

    #[test]
    fn unparsable_numbers_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_LINE_MAX_HISTORY", Some("lots"));
        let _g2 = set_env_guard("TAPE_LINE_MAX_LINE", Some(""));
        let config = ReaderConfig::from_env();
        assert_eq!(config.max_history_size, 1000);
        assert_eq!(config.max_line_len, 4096);
    }

    #[test]
    fn no_color_convention_is_honored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_LINE_NO_COLOR", None);
        let _g2 = set_env_guard("NO_COLOR", Some(""));
        assert!(ReaderConfig::from_env().no_color);
    }

    #[test]
    fn break_and_prefix_membership() {
        let config = ReaderConfig {
            special_prefixes: "$".to_string(),
            ..ReaderConfig::default()
        };
        assert!(config.is_word_break(' '));
        assert!(config.is_word_break('$'));
        assert!(config.is_special_prefix('$'));
        assert!(!config.is_word_break('a'));
    }
}
