//! Column widths and screen-position arithmetic.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::strip_ansi;

/// A cell on screen relative to the first row of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPosition {
    pub x: usize,
    pub y: usize,
}

impl ScreenPosition {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Display columns for one code point: 0, 1, or 2.
pub fn column_width(ch: char) -> usize {
    if ch.is_control() {
        return 0;
    }
    UnicodeWidthChar::width(ch).unwrap_or(0).min(2)
}

/// Sum of column widths.
pub fn columns_of(text: &[char]) -> usize {
    text.iter().map(|&ch| column_width(ch)).sum()
}

/// Where the cursor lands after writing `columns` cells starting at `origin`.
///
/// Fills the remainder of each row before wrapping. Landing exactly on the right
/// margin is reported as the start of the next row.
pub fn advance(origin: ScreenPosition, screen_width: usize, columns: usize) -> ScreenPosition {
    let screen_width = screen_width.max(1);
    let mut x = origin.x;
    let mut y = origin.y;
    let mut out = origin;
    let mut remaining = columns;
    while remaining > 0 {
        let this_row = if x + remaining < screen_width {
            remaining
        } else {
            screen_width.saturating_sub(x)
        };
        out = ScreenPosition::new(x + this_row, y);
        remaining -= this_row;
        x = 0;
        y += 1;
    }
    if out.x >= screen_width {
        out = ScreenPosition::new(0, out.y + 1);
    }
    out
}

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }

    if emoji_get(grapheme).is_some() {
        return 2;
    }

    grapheme.chars().map(column_width).sum()
}

/// Visible width of a string, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}

/// Longest prefix of `text` that fits in `max_width` columns.
pub fn fit_to_width(text: &[char], max_width: usize) -> &[char] {
    let mut used = 0;
    for (idx, &ch) in text.iter().enumerate() {
        let width = column_width(ch);
        if used + width > max_width {
            return &text[..idx];
        }
        used += width;
    }
    text
}
