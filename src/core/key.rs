//! Canonical key values produced by the escape decoder.

use std::fmt;

/// A decoded keystroke.
///
/// The low 21 bits hold a Unicode scalar value. Special keys use tags above
/// `0x10FFFF`, and the modifiers are single high bits, so none of the three ranges
/// overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyEvent(u32);

const CODE_POINT_MASK: u32 = 0x001F_FFFF;
const SPECIAL_MASK: u32 = 0x03E0_0000;
const MODIFIER_MASK: u32 = 0x6000_0000;

impl KeyEvent {
    pub const META: u32 = 0x2000_0000;
    pub const CTRL: u32 = 0x4000_0000;

    pub const UP: KeyEvent = KeyEvent(0x0120_0000);
    pub const DOWN: KeyEvent = KeyEvent(0x0140_0000);
    pub const RIGHT: KeyEvent = KeyEvent(0x0160_0000);
    pub const LEFT: KeyEvent = KeyEvent(0x0180_0000);
    pub const HOME: KeyEvent = KeyEvent(0x01A0_0000);
    pub const END: KeyEvent = KeyEvent(0x01C0_0000);
    pub const DELETE: KeyEvent = KeyEvent(0x01E0_0000);
    pub const PAGE_UP: KeyEvent = KeyEvent(0x0200_0000);
    pub const PAGE_DOWN: KeyEvent = KeyEvent(0x0220_0000);

    pub const BACKSPACE: KeyEvent = KeyEvent::ctrl('H');
    pub const TAB: KeyEvent = KeyEvent(0x09);
    pub const ENTER: KeyEvent = KeyEvent(0x0D);
    pub const ESCAPE: KeyEvent = KeyEvent(0x1B);

    pub const fn from_char(ch: char) -> Self {
        KeyEvent(ch as u32)
    }

    /// The ASCII control code for `ctrl` + `letter` (`ctrl('A')` is 0x01).
    pub const fn ctrl(letter: char) -> Self {
        KeyEvent((letter as u32) & 0x1F)
    }

    pub const fn meta(ch: char) -> Self {
        KeyEvent(ch as u32 | Self::META)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn with_modifiers(self, modifiers: u32) -> Self {
        KeyEvent(self.0 | (modifiers & MODIFIER_MASK))
    }

    pub const fn without_modifiers(self) -> Self {
        KeyEvent(self.0 & !MODIFIER_MASK)
    }

    pub const fn has_ctrl(self) -> bool {
        self.0 & Self::CTRL != 0
    }

    pub const fn has_meta(self) -> bool {
        self.0 & Self::META != 0
    }

    pub const fn is_special(self) -> bool {
        self.0 & SPECIAL_MASK != 0
    }

    /// The plain code point, when this key carries no tag and no modifier.
    pub fn code_point(self) -> Option<char> {
        if self.0 & !CODE_POINT_MASK != 0 {
            return None;
        }
        char::from_u32(self.0)
    }

    /// A code point that inserts as text: not a control char, no modifiers.
    pub fn printable(self) -> Option<char> {
        self.code_point().filter(|ch| !ch.is_control())
    }

    /// Fold `CTRL` + letter into the ASCII control code, keeping `META`.
    ///
    /// Sources that report modifiers separately (for example `ctrl+a` bindings
    /// in a keymap file) produce the same value as a terminal sending 0x01.
    pub fn normalized(self) -> Self {
        if !self.has_ctrl() || self.is_special() {
            return self;
        }
        let base = self.0 & CODE_POINT_MASK;
        let folded = match char::from_u32(base) {
            Some(ch) if ch.is_ascii_alphabetic() => u32::from(ch.to_ascii_uppercase()) & 0x1F,
            Some(ch @ ('@' | '[' | '\\' | ']' | '^' | '_')) => u32::from(ch) & 0x1F,
            _ => return self,
        };
        KeyEvent(folded | (self.0 & Self::META))
    }
}

impl From<char> for KeyEvent {
    fn from(ch: char) -> Self {
        KeyEvent::from_char(ch)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_ctrl() {
            f.write_str("ctrl+")?;
        }
        if self.has_meta() {
            f.write_str("alt+")?;
        }
        let base = self.without_modifiers();
        let name = match base {
            KeyEvent::UP => "up",
            KeyEvent::DOWN => "down",
            KeyEvent::RIGHT => "right",
            KeyEvent::LEFT => "left",
            KeyEvent::HOME => "home",
            KeyEvent::END => "end",
            KeyEvent::DELETE => "delete",
            KeyEvent::PAGE_UP => "pageUp",
            KeyEvent::PAGE_DOWN => "pageDown",
            KeyEvent::BACKSPACE => "backspace",
            KeyEvent::TAB => "tab",
            KeyEvent::ENTER => "enter",
            KeyEvent::ESCAPE => "escape",
            _ => match base.code_point() {
                Some(' ') => "space",
                Some(ch) if u32::from(ch) < 0x20 => {
                    let letter = char::from(b'@' + ch as u8).to_ascii_lowercase();
                    return write!(f, "ctrl+{letter}");
                }
                Some(ch) => return write!(f, "{ch}"),
                None => return write!(f, "<{:#x}>", base.raw()),
            },
        };
        f.write_str(name)
    }
}

/// Parse a key id such as `"ctrl+a"`, `"alt+left"`, or `"pageUp"`.
///
/// `ctrl` combined with a letter yields the ASCII control code, so ids match what
/// the decoder produces for the same keystroke.
pub fn parse_key_id(key_id: &str) -> Option<KeyEvent> {
    let parts: Vec<&str> = key_id.split('+').collect();
    let (key, modifiers) = match parts.split_last() {
        // "ctrl++" style ids name the plus key itself.
        Some((last, rest)) if last.is_empty() && key_id.ends_with("++") => {
            ("+", &rest[..rest.len().saturating_sub(1)])
        }
        Some((last, rest)) => (*last, rest),
        None => return None,
    };

    let mut bits = 0;
    for modifier in modifiers {
        match modifier.to_ascii_lowercase().as_str() {
            "ctrl" => bits |= KeyEvent::CTRL,
            "alt" | "meta" => bits |= KeyEvent::META,
            _ => return None,
        }
    }

    let base = match key.to_ascii_lowercase().as_str() {
        "up" => KeyEvent::UP,
        "down" => KeyEvent::DOWN,
        "left" => KeyEvent::LEFT,
        "right" => KeyEvent::RIGHT,
        "home" => KeyEvent::HOME,
        "end" => KeyEvent::END,
        "delete" => KeyEvent::DELETE,
        "pageup" => KeyEvent::PAGE_UP,
        "pagedown" => KeyEvent::PAGE_DOWN,
        "backspace" => KeyEvent::BACKSPACE,
        "tab" => KeyEvent::TAB,
        "enter" | "return" => KeyEvent::ENTER,
        "escape" | "esc" => KeyEvent::ESCAPE,
        "space" => KeyEvent::from_char(' '),
        _ => {
            let mut chars = key.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyEvent::from_char(ch)
        }
    };

    Some(base.with_modifiers(bits).normalized())
}
