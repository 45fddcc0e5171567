//! Escape sequences embedded in prompts and candidate strings.

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Length in chars of the escape sequence at `text[pos]`, if one starts there.
///
/// Recognizes CSI (`ESC [ ... final`), SS3 (`ESC O x`), and the string forms
/// OSC, APC, and DCS terminated by BEL or `ESC \`. Unterminated sequences are
/// not sequences.
pub fn escape_len(text: &[char], pos: usize) -> Option<usize> {
    if text.get(pos) != Some(&ESC) {
        return None;
    }
    let body = text.get(pos + 2..)?;
    match text.get(pos + 1)? {
        '[' => body
            .iter()
            .position(|ch| ('\x40'..='\x7e').contains(ch))
            .map(|end| end + 3),
        'O' => body.first().filter(|ch| ch.is_ascii()).map(|_| 3),
        ']' | '_' | 'P' => body.iter().enumerate().find_map(|(idx, &ch)| match ch {
            BEL => Some(idx + 3),
            ESC if body.get(idx + 1) == Some(&'\\') => Some(idx + 4),
            _ => None,
        }),
        _ => None,
    }
}

/// Length in chars of an SGR sequence (`ESC [ [0-9;]* m`) starting at `text[pos]`.
///
/// A sequence missing its final `m` still counts up to where the digits end, so
/// a truncated color code never leaks its parameters into visible text.
pub fn sgr_len(text: &[char], pos: usize) -> Option<usize> {
    if text.get(pos) != Some(&ESC) {
        return None;
    }
    let mut idx = pos + 1;
    if text.get(idx) == Some(&'[') {
        idx += 1;
        while let Some(ch) = text.get(idx) {
            if *ch == ';' || ch.is_ascii_digit() {
                idx += 1;
            } else {
                break;
            }
        }
        if text.get(idx) == Some(&'m') {
            idx += 1;
        }
    }
    Some(idx - pos)
}

/// Remove every recognized escape sequence.
pub fn strip_ansi(input: &str) -> String {
    let text: Vec<char> = input.chars().collect();
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < text.len() {
        match escape_len(&text, idx) {
            Some(len) => idx += len,
            None => {
                clean.push(text[idx]);
                idx += 1;
            }
        }
    }
    clean
}
