//! Repainting the prompt, the input line, and hints.

use crate::core::completion::Color;
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::text::width::{advance, columns_of, ScreenPosition};
use crate::editor::hints::HintLayout;
use crate::render::prompt::Prompt;

/// How much of the display to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    /// Prompt and input.
    Full,
    /// Input only; the prompt is assumed intact.
    Input,
}

/// The input line as it should appear.
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    pub text: &'a [char],
    pub pos: usize,
    /// Per-char colors; missing entries draw in the default color.
    pub colors: Option<&'a [Color]>,
    pub hints: Option<&'a HintLayout>,
}

impl<'a> LineView<'a> {
    pub fn plain(text: &'a [char], pos: usize) -> Self {
        Self {
            text,
            pos,
            colors: None,
            hints: None,
        }
    }
}

/// Queue the commands that redraw `view` under `prompt`.
///
/// Starts from the row recorded in `prompt.cursor_row_offset`, clears to the end
/// of the screen, and leaves the cursor at `view.pos`, recording its new row.
pub fn paint(gate: &mut OutputGate, prompt: &mut Prompt, view: &LineView<'_>, mode: PaintMode) {
    let columns = prompt.columns();
    let indent = prompt.indentation();

    match mode {
        PaintMode::Full => {
            gate.push(TerminalCmd::MoveUp(prompt.cursor_row_offset));
            gate.push(TerminalCmd::MoveToColumn(0));
            gate.push(TerminalCmd::EraseDown);
            gate.text(&prompt.text().replace('\n', "\r\n"));
            if prompt.ends_at_margin() {
                gate.push(TerminalCmd::Newline);
            }
        }
        PaintMode::Input => {
            let rows_below_prompt = prompt
                .cursor_row_offset
                .saturating_sub(prompt.extra_lines());
            gate.push(TerminalCmd::MoveUp(rows_below_prompt));
            gate.push(TerminalCmd::MoveToColumn(indent));
            gate.push(TerminalCmd::EraseDown);
        }
    }

    write_colored(gate, view.text, view.colors);

    let inline: &[char] = view.hints.map_or(&[], |hints| hints.inline.as_slice());
    if let Some(hints) = view.hints.filter(|_| !inline.is_empty()) {
        gate.push(TerminalCmd::SetColor(hints.color));
        gate.chars(inline);
        gate.push(TerminalCmd::ResetColor);
    }

    let origin = ScreenPosition::new(indent, 0);
    let end = advance(origin, columns, columns_of(view.text) + columns_of(inline));
    let pos = view.pos.min(view.text.len());
    let cursor = advance(origin, columns, columns_of(&view.text[..pos]));

    // The terminal does not wrap until the next char, so do it ourselves.
    if end.x == 0 && end.y > 0 {
        gate.push(TerminalCmd::Newline);
    }

    let mut hint_rows = 0;
    if let Some(hints) = view.hints {
        for row in &hints.rows {
            gate.push(TerminalCmd::Newline);
            gate.text(&" ".repeat(row.indent));
            gate.push(TerminalCmd::SetColor(hints.color));
            gate.chars(&row.body);
            gate.push(TerminalCmd::ResetColor);
            hint_rows += 1;
        }
    }

    gate.push(TerminalCmd::MoveUp(end.y + hint_rows - cursor.y));
    gate.push(TerminalCmd::MoveToColumn(cursor.x));
    prompt.cursor_row_offset = prompt.extra_lines() + cursor.y;
}

/// Write `text` in runs of equal color.
fn write_colored(gate: &mut OutputGate, text: &[char], colors: Option<&[Color]>) {
    let Some(colors) = colors else {
        gate.chars(text);
        return;
    };
    let mut current = Color::Default;
    let mut run = String::new();
    for (idx, &ch) in text.iter().enumerate() {
        let color = colors.get(idx).copied().unwrap_or_default();
        if color != current {
            gate.text(&run);
            run.clear();
            gate.push(match color {
                Color::Default => TerminalCmd::ResetColor,
                color => TerminalCmd::SetColor(color),
            });
            current = color;
        }
        run.push(ch);
    }
    gate.text(&run);
    if current != Color::Default {
        gate.push(TerminalCmd::ResetColor);
    }
}
