//! Inline and multi-row hint layout.

use crate::core::completion::{Color, Hints};
use crate::core::text::width::{columns_of, fit_to_width};

/// One row drawn under the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintRow {
    /// Blank columns before the colored body.
    pub indent: usize,
    pub body: Vec<char>,
}

/// What the renderer draws for the current hints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HintLayout {
    /// Suffix drawn right after the input.
    pub inline: Vec<char>,
    pub rows: Vec<HintRow>,
    pub color: Color,
    /// Number of hints the hinter returned.
    pub count: usize,
}

impl HintLayout {
    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.rows.is_empty()
    }
}

/// Geometry of the input line the hints attach to.
#[derive(Debug, Clone, Copy)]
pub struct HintContext<'a> {
    /// The partial word being hinted (text from the break position to the cursor).
    pub word: &'a [char],
    /// Columns of input before the word.
    pub columns_before_word: usize,
    /// Prompt indentation on the cursor row.
    pub indentation: usize,
    pub screen_columns: usize,
    pub max_rows: usize,
}

/// Lay out `hints` for the word ending at the cursor.
///
/// A single hint is shown inline. With several, the selected one (if any) is
/// shown inline and up to `max_rows` are listed below, starting with the one
/// after the selection; a row without a hint marks the unselected state.
pub fn layout(hints: &Hints, selection: Option<usize>, ctx: HintContext<'_>) -> HintLayout {
    let candidates: Vec<Vec<char>> = hints.hints.iter().map(|h| h.chars().collect()).collect();
    let count = candidates.len();
    let mut result = HintLayout {
        color: hints.color,
        count,
        ..HintLayout::default()
    };
    let context_len = ctx.word.len();
    let width = ctx.screen_columns.max(1);
    let word_col = (ctx.indentation + ctx.columns_before_word) % width;
    let cursor_col = (word_col + columns_of(ctx.word)) % width;

    if count == 1 {
        if let Some(suffix) = candidates[0].get(context_len..) {
            result.inline = suffix.to_vec();
        }
        return result;
    }
    if count == 0 || ctx.max_rows == 0 {
        return result;
    }

    if let Some(selected) = selection.filter(|&idx| idx < count) {
        if let Some(suffix) = candidates[selected].get(context_len..) {
            result.inline = fit_to_width(suffix, width - cursor_col).to_vec();
        }
    }

    let selected = selection.filter(|&idx| idx < count).map_or(0, |idx| idx + 1);
    for row in 0..count.min(ctx.max_rows) {
        let indent = word_col.min(width);
        let mut body = ctx.word.to_vec();
        let mut hint_no = row + selected;
        if hint_no != count {
            if hint_no > count {
                hint_no -= 1;
            }
            if let Some(suffix) = candidates[hint_no % count].get(context_len..) {
                body.extend_from_slice(suffix);
            }
        }
        let body = fit_to_width(&body, width - indent).to_vec();
        result.rows.push(HintRow { indent, body });
    }
    result
}
