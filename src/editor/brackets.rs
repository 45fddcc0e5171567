//! Matching-bracket lookup for the char under the cursor.

const OPENERS: [char; 3] = ['(', '[', '{'];
const CLOSERS: [char; 3] = [')', ']', '}'];

/// The bracket paired with the one under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketMatch {
    pub index: usize,
    /// Another bracket kind is unbalanced between the pair.
    pub mismatched: bool,
}

/// Scan from `pos` for the partner of the bracket there.
///
/// Brackets of the same kind nest. Brackets of other kinds are counted
/// separately; a non-zero count at the partner marks the pair mismatched.
pub fn find_match(text: &[char], pos: usize) -> Option<BracketMatch> {
    let ch = *text.get(pos)?;
    let (kind, forward) = if let Some(kind) = OPENERS.iter().position(|&c| c == ch) {
        (kind, true)
    } else {
        (CLOSERS.iter().position(|&c| c == ch)?, false)
    };
    let (own_open, own_close) = (OPENERS[kind], CLOSERS[kind]);
    // Depth grows with brackets facing the scan direction.
    let (deeper, shallower) = if forward {
        (own_open, own_close)
    } else {
        (own_close, own_open)
    };

    let mut depth = 1usize;
    let mut other = 0isize;
    let mut idx = pos;
    loop {
        if forward {
            idx += 1;
            if idx >= text.len() {
                return None;
            }
        } else {
            idx = idx.checked_sub(1)?;
        }
        let c = text[idx];
        if c == deeper {
            depth += 1;
        } else if c == shallower {
            depth -= 1;
            if depth == 0 {
                return Some(BracketMatch {
                    index: idx,
                    mismatched: other != 0,
                });
            }
        } else if OPENERS.contains(&c) {
            other += if forward { 1 } else { -1 };
        } else if CLOSERS.contains(&c) {
            other -= if forward { 1 } else { -1 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{find_match, BracketMatch};

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn forward_and_backward_pairs() {
        let text = chars("f(a, (b))");
        assert_eq!(
            find_match(&text, 1),
            Some(BracketMatch { index: 8, mismatched: false })
        );
        assert_eq!(
            find_match(&text, 8),
            Some(BracketMatch { index: 1, mismatched: false })
        );
        assert_eq!(
            find_match(&text, 5),
            Some(BracketMatch { index: 7, mismatched: false })
        );
    }

    #[test]
    fn other_kind_imbalance_is_flagged() {
        let text = chars("([)]");
        assert_eq!(
            find_match(&text, 0),
            Some(BracketMatch { index: 2, mismatched: true })
        );
        let balanced = chars("{[]}");
        assert_eq!(
            find_match(&balanced, 3),
            Some(BracketMatch { index: 0, mismatched: false })
        );
    }

    #[test]
    fn no_partner_or_no_bracket() {
        assert_eq!(find_match(&chars("(abc"), 0), None);
        assert_eq!(find_match(&chars("abc)"), 3), None);
        assert_eq!(find_match(&chars("abc"), 1), None);
        assert_eq!(find_match(&chars("()"), 2), None);
    }
}
