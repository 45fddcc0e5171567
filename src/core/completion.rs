//! Caller-supplied completion, hint, and highlight callbacks.
//!
//! All three run synchronously inside the edit loop. `break_pos` is the char index
//! where the word under the cursor starts; candidates and hints are whole words
//! that replace `text[break_pos..]`.

/// Terminal colors available to hints and highlighters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Brown,
    Blue,
    Magenta,
    Cyan,
    LightGray,
    Gray,
    BrightRed,
    BrightGreen,
    Yellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    White,
    /// Highlight for mismatched brackets.
    Error,
}

impl Color {
    /// The SGR sequence selecting this color.
    pub fn sgr(self) -> &'static str {
        match self {
            Color::Default => "\x1b[0m",
            Color::Black => "\x1b[0;22;30m",
            Color::Red => "\x1b[0;22;31m",
            Color::Green => "\x1b[0;22;32m",
            Color::Brown => "\x1b[0;22;33m",
            Color::Blue => "\x1b[0;22;34m",
            Color::Magenta => "\x1b[0;22;35m",
            Color::Cyan => "\x1b[0;22;36m",
            Color::LightGray => "\x1b[0;22;37m",
            Color::Gray => "\x1b[0;1;30m",
            Color::BrightRed => "\x1b[0;1;31m",
            Color::BrightGreen => "\x1b[0;1;32m",
            Color::Yellow => "\x1b[0;1;33m",
            Color::BrightBlue => "\x1b[0;1;34m",
            Color::BrightMagenta => "\x1b[0;1;35m",
            Color::BrightCyan => "\x1b[0;1;36m",
            Color::White => "\x1b[0;1;37m",
            Color::Error => "\x1b[101;1;33m",
        }
    }
}

/// Bracket-match highlight colors.
pub const MATCH_COLOR: Color = Color::BrightBlue;
pub const MISMATCH_COLOR: Color = Color::Error;

pub trait Completer {
    /// Whole-word candidates for the word starting at `break_pos`.
    fn complete(&self, text: &str, break_pos: usize) -> Vec<String>;
}

impl<F> Completer for F
where
    F: Fn(&str, usize) -> Vec<String>,
{
    fn complete(&self, text: &str, break_pos: usize) -> Vec<String> {
        self(text, break_pos)
    }
}

/// Hinter output: candidate words plus the color to draw them in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hints {
    pub hints: Vec<String>,
    pub color: Color,
}

impl Hints {
    pub fn new(hints: Vec<String>, color: Color) -> Self {
        Self { hints, color }
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

pub trait Hinter {
    fn hint(&self, text: &str, break_pos: usize) -> Hints;
}

impl<F> Hinter for F
where
    F: Fn(&str, usize) -> Hints,
{
    fn hint(&self, text: &str, break_pos: usize) -> Hints {
        self(text, break_pos)
    }
}

pub trait Highlighter {
    /// Fill `colors` (one slot per char of `text`, preset to `Color::Default`).
    fn highlight(&self, text: &str, colors: &mut [Color]);
}

impl<F> Highlighter for F
where
    F: Fn(&str, &mut [Color]),
{
    fn highlight(&self, text: &str, colors: &mut [Color]) {
        self(text, colors)
    }
}

/// Optional callbacks consulted by the editor.
#[derive(Default)]
pub struct Callbacks {
    pub completer: Option<Box<dyn Completer>>,
    pub hinter: Option<Box<dyn Hinter>>,
    pub highlighter: Option<Box<dyn Highlighter>>,
}

impl Callbacks {
    pub fn is_empty(&self) -> bool {
        self.completer.is_none() && self.hinter.is_none() && self.highlighter.is_none()
    }

    /// Hints and highlights change the rendering of every keystroke.
    pub fn affects_rendering(&self) -> bool {
        self.hinter.is_some() || self.highlighter.is_some()
    }
}

/// Candidates from `words` that start with the word being completed.
pub fn words_with_prefix<'a>(
    words: impl IntoIterator<Item = &'a str>,
    text: &str,
    break_pos: usize,
) -> Vec<String> {
    let prefix: String = text.chars().skip(break_pos).collect();
    words
        .into_iter()
        .filter(|word| word.starts_with(&prefix))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{words_with_prefix, Callbacks, Color, Completer, Highlighter, Hinter, Hints};

    #[test]
    fn closures_implement_callbacks() {
        let completer =
            |text: &str, pos: usize| words_with_prefix(["foobar", "foobaz", "bar"], text, pos);
        assert_eq!(completer.complete("x foo", 2), vec!["foobar", "foobaz"]);

        let hinter = |_: &str, _: usize| Hints::new(vec!["help".into()], Color::Gray);
        assert_eq!(hinter.hint("he", 0).hints, vec!["help"]);

        let highlighter = |text: &str, colors: &mut [Color]| {
            for (slot, ch) in colors.iter_mut().zip(text.chars()) {
                if ch.is_ascii_digit() {
                    *slot = Color::Yellow;
                }
            }
        };
        let mut colors = vec![Color::Default; 3];
        highlighter.highlight("a1b", &mut colors);
        assert_eq!(colors, vec![Color::Default, Color::Yellow, Color::Default]);
    }

    #[test]
    fn callbacks_report_what_is_installed() {
        let mut callbacks = Callbacks::default();
        assert!(callbacks.is_empty());
        callbacks.completer = Some(Box::new(|_: &str, _: usize| Vec::<String>::new()));
        assert!(!callbacks.is_empty());
        assert!(!callbacks.affects_rendering());
        callbacks.hinter = Some(Box::new(|_: &str, _: usize| Hints::default()));
        assert!(callbacks.affects_rendering());
    }

    #[test]
    fn every_color_is_an_sgr_sequence() {
        for color in [Color::Default, Color::Red, Color::Gray, Color::White, Color::Error] {
            let sgr = color.sgr();
            assert!(sgr.starts_with("\x1b[") && sgr.ends_with('m'));
        }
    }
}
