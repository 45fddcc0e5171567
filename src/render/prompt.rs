//! Prompt text and its on-screen geometry.

use crate::core::text::ansi::sgr_len;
use crate::core::text::width::column_width;

/// A prompt prepared for display at a given screen width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    raw: String,
    strip: bool,
    text: String,
    columns: usize,
    extra_lines: usize,
    indentation: usize,
    ends_at_margin: bool,
    /// Rows from the first prompt row down to the row holding the cursor.
    pub cursor_row_offset: usize,
}

impl Prompt {
    /// Prepare `raw` for a screen `columns` wide.
    ///
    /// Newlines are kept, other control characters are dropped. SGR color
    /// sequences are kept unless `strip_colors` is set.
    pub fn new(raw: &str, columns: usize, strip_colors: bool) -> Self {
        let mut prompt = Self {
            raw: raw.to_string(),
            strip: strip_colors,
            text: String::new(),
            columns: columns.max(1),
            extra_lines: 0,
            indentation: 0,
            ends_at_margin: false,
            cursor_row_offset: 0,
        };
        prompt.measure();
        prompt
    }

    /// The incremental-search prompt.
    pub fn search(prompt_text: &str, columns: usize) -> Self {
        Self::new(prompt_text, columns, true)
    }

    pub fn with_cursor_row_offset(mut self, offset: usize) -> Self {
        self.cursor_row_offset = offset;
        self
    }

    /// Re-measure for a new screen width.
    pub fn resize(&mut self, columns: usize) {
        self.columns = columns.max(1);
        self.measure();
    }

    fn measure(&mut self) {
        let chars: Vec<char> = self.raw.chars().collect();
        let mut text = String::with_capacity(self.raw.len());
        let mut x = 0usize;
        let mut extra = 0usize;
        let mut ends_at_margin = false;
        let mut idx = 0;
        while idx < chars.len() {
            let ch = chars[idx];
            if ch == '\n' {
                text.push(ch);
                extra += 1;
                x = 0;
                ends_at_margin = false;
                idx += 1;
                continue;
            }
            if ch == '\x1b' {
                let len = sgr_len(&chars, idx).unwrap_or(1);
                if !self.strip {
                    text.extend(&chars[idx..idx + len]);
                }
                idx += len;
                continue;
            }
            idx += 1;
            if ch.is_control() {
                continue;
            }
            let width = column_width(ch);
            if x + width > self.columns {
                extra += 1;
                x = 0;
            }
            text.push(ch);
            x += width;
            ends_at_margin = false;
            if x >= self.columns {
                extra += 1;
                x = 0;
                ends_at_margin = true;
            }
        }
        self.text = text;
        self.extra_lines = extra;
        self.indentation = x;
        self.ends_at_margin = ends_at_margin;
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The prompt as written to the terminal.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Rows the prompt occupies beyond the first.
    pub fn extra_lines(&self) -> usize {
        self.extra_lines
    }

    /// Column where input starts on the last prompt row.
    pub fn indentation(&self) -> usize {
        self.indentation
    }

    /// The last visible char filled the row; the terminal has not wrapped yet.
    pub fn ends_at_margin(&self) -> bool {
        self.ends_at_margin
    }
}

#[cfg(test)]
mod tests {
    use super::Prompt;

    #[test]
    fn single_line_prompt() {
        let prompt = Prompt::new("> ", 80, false);
        assert_eq!(prompt.text(), "> ");
        assert_eq!(prompt.extra_lines(), 0);
        assert_eq!(prompt.indentation(), 2);
        assert_eq!(prompt.cursor_row_offset, 0);
    }

    #[test]
    fn newlines_add_rows() {
        let prompt = Prompt::new("status\n>> ", 80, false);
        assert_eq!(prompt.extra_lines(), 1);
        assert_eq!(prompt.indentation(), 3);
    }

    #[test]
    fn long_prompts_wrap() {
        let prompt = Prompt::new("abcdefghijkl", 5, false);
        assert_eq!(prompt.extra_lines(), 2);
        assert_eq!(prompt.indentation(), 2);
        assert!(!prompt.ends_at_margin());

        let exact = Prompt::new("abcde", 5, false);
        assert_eq!(exact.extra_lines(), 1);
        assert_eq!(exact.indentation(), 0);
        assert!(exact.ends_at_margin());
    }

    #[test]
    fn colors_are_zero_width_and_optionally_stripped() {
        let colored = "\x1b[1;32mok\x1b[0m> ";
        let kept = Prompt::new(colored, 80, false);
        assert_eq!(kept.text(), colored);
        assert_eq!(kept.indentation(), 4);

        let stripped = Prompt::new(colored, 80, true);
        assert_eq!(stripped.text(), "ok> ");
        assert_eq!(stripped.indentation(), 4);
    }

    #[test]
    fn other_controls_are_dropped() {
        let prompt = Prompt::new("a\x07b\tc ", 80, false);
        assert_eq!(prompt.text(), "abc ");
        assert_eq!(prompt.indentation(), 4);
    }

    #[test]
    fn wide_chars_do_not_split_across_rows() {
        let prompt = Prompt::new("abcd日", 5, false);
        assert_eq!(prompt.extra_lines(), 1);
        assert_eq!(prompt.indentation(), 2);
    }

    #[test]
    fn resize_remeasures() {
        let mut prompt = Prompt::new("abcdefgh", 80, false);
        assert_eq!(prompt.extra_lines(), 0);
        prompt.resize(3);
        assert_eq!(prompt.extra_lines(), 2);
        assert_eq!(prompt.indentation(), 2);
    }
}
