//! Escape-sequence decoding.
//!
//! Every state owns a static table of `(pattern, action)` rows. Lookup is linear
//! and the last row of each table is its default route. Modifier bits gathered
//! along the way (ESC prefix, `ESC [ 1 ; 5`) live in the decoder, so independent
//! readers never share state.

use tracing::debug;

use crate::core::key::KeyEvent;

/// Result of feeding one input unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Mid-sequence; nothing to report yet.
    Pending,
    Key(KeyEvent),
    /// The sequence matched nothing. Callers beep and carry on.
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    Escape,
    LeftBracket,
    LeftBracket1,
    LeftBracketDigit(u8),
    LeftBracket1Semicolon,
    LeftBracket1SemicolonMod,
    O,
    /// Inside an unknown CSI sequence; swallow through its final byte.
    Discard,
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Unit(char),
    Range(char, char),
    Any,
}

impl Pattern {
    fn matches(self, unit: char) -> bool {
        match self {
            Pattern::Unit(expected) => unit == expected,
            Pattern::Range(low, high) => (low..=high).contains(&unit),
            Pattern::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Goto(State),
    Emit(KeyEvent),
    AddModifier(u32, State),
    /// Emit the unit itself, with any pending modifiers.
    EmitInput,
    /// `ESC x`: META, then dispatch `x` through the initial table.
    MetaThenInitial,
    /// `ESC ESC`: META, and stay in the escape state.
    MetaStayEscape,
    Fail,
}

type Row = (Pattern, Action);

const ESC: char = '\x1b';
const DEL: char = '\x7f';

const CSI_PARAMETERS: Pattern = Pattern::Range('\x20', '\x3f');

const INITIAL: &[Row] = &[
    (Pattern::Unit(ESC), Action::Goto(State::Escape)),
    (Pattern::Unit(DEL), Action::Emit(KeyEvent::BACKSPACE)),
    (Pattern::Any, Action::EmitInput),
];

const ESCAPE: &[Row] = &[
    (Pattern::Unit('['), Action::Goto(State::LeftBracket)),
    (Pattern::Unit('O'), Action::Goto(State::O)),
    (Pattern::Unit(ESC), Action::MetaStayEscape),
    (Pattern::Any, Action::MetaThenInitial),
];

const LEFT_BRACKET: &[Row] = &[
    (Pattern::Unit('A'), Action::Emit(KeyEvent::UP)),
    (Pattern::Unit('B'), Action::Emit(KeyEvent::DOWN)),
    (Pattern::Unit('C'), Action::Emit(KeyEvent::RIGHT)),
    (Pattern::Unit('D'), Action::Emit(KeyEvent::LEFT)),
    (Pattern::Unit('H'), Action::Emit(KeyEvent::HOME)),
    (Pattern::Unit('F'), Action::Emit(KeyEvent::END)),
    (Pattern::Unit('1'), Action::Goto(State::LeftBracket1)),
    (Pattern::Unit('2'), Action::Goto(State::LeftBracketDigit(2))),
    (Pattern::Unit('3'), Action::Goto(State::LeftBracketDigit(3))),
    (Pattern::Unit('4'), Action::Goto(State::LeftBracketDigit(4))),
    (Pattern::Unit('5'), Action::Goto(State::LeftBracketDigit(5))),
    (Pattern::Unit('6'), Action::Goto(State::LeftBracketDigit(6))),
    (Pattern::Unit('7'), Action::Goto(State::LeftBracketDigit(7))),
    (Pattern::Unit('8'), Action::Goto(State::LeftBracketDigit(8))),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_1: &[Row] = &[
    (Pattern::Unit('~'), Action::Emit(KeyEvent::HOME)),
    (Pattern::Unit(';'), Action::Goto(State::LeftBracket1Semicolon)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

// ESC [ 2 ~ is Insert, which has no binding.
const LEFT_BRACKET_2: &[Row] = &[
    (Pattern::Unit('~'), Action::Fail),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_3: &[Row] = &[
    (Pattern::Unit('~'), Action::Emit(KeyEvent::DELETE)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_4: &[Row] = &[
    (Pattern::Unit('~'), Action::Emit(KeyEvent::END)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_5: &[Row] = &[
    (Pattern::Unit('~'), Action::Emit(KeyEvent::PAGE_UP)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_6: &[Row] = &[
    (Pattern::Unit('~'), Action::Emit(KeyEvent::PAGE_DOWN)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_7: &[Row] = &[
    (Pattern::Unit('~'), Action::Emit(KeyEvent::HOME)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_8: &[Row] = &[
    (Pattern::Unit('~'), Action::Emit(KeyEvent::END)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_1_SEMICOLON: &[Row] = &[
    (
        Pattern::Unit('3'),
        Action::AddModifier(KeyEvent::META, State::LeftBracket1SemicolonMod),
    ),
    (
        Pattern::Unit('5'),
        Action::AddModifier(KeyEvent::CTRL, State::LeftBracket1SemicolonMod),
    ),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const LEFT_BRACKET_1_SEMICOLON_MOD: &[Row] = &[
    (Pattern::Unit('A'), Action::Emit(KeyEvent::UP)),
    (Pattern::Unit('B'), Action::Emit(KeyEvent::DOWN)),
    (Pattern::Unit('C'), Action::Emit(KeyEvent::RIGHT)),
    (Pattern::Unit('D'), Action::Emit(KeyEvent::LEFT)),
    (CSI_PARAMETERS, Action::Goto(State::Discard)),
    (Pattern::Any, Action::Fail),
];

const O: &[Row] = &[
    (Pattern::Unit('A'), Action::Emit(KeyEvent::UP)),
    (Pattern::Unit('B'), Action::Emit(KeyEvent::DOWN)),
    (Pattern::Unit('C'), Action::Emit(KeyEvent::RIGHT)),
    (Pattern::Unit('D'), Action::Emit(KeyEvent::LEFT)),
    (Pattern::Unit('H'), Action::Emit(KeyEvent::HOME)),
    (Pattern::Unit('F'), Action::Emit(KeyEvent::END)),
    // rxvt reports ctrl-arrows as lowercase SS3 finals.
    (
        Pattern::Unit('a'),
        Action::Emit(KeyEvent::UP.with_modifiers(KeyEvent::CTRL)),
    ),
    (
        Pattern::Unit('b'),
        Action::Emit(KeyEvent::DOWN.with_modifiers(KeyEvent::CTRL)),
    ),
    (
        Pattern::Unit('c'),
        Action::Emit(KeyEvent::RIGHT.with_modifiers(KeyEvent::CTRL)),
    ),
    (
        Pattern::Unit('d'),
        Action::Emit(KeyEvent::LEFT.with_modifiers(KeyEvent::CTRL)),
    ),
    (Pattern::Any, Action::Fail),
];

const DISCARD: &[Row] = &[
    (Pattern::Range('\x40', '\x7e'), Action::Fail),
    (Pattern::Any, Action::Goto(State::Discard)),
];

fn table(state: State) -> &'static [Row] {
    match state {
        State::Initial => INITIAL,
        State::Escape => ESCAPE,
        State::LeftBracket => LEFT_BRACKET,
        State::LeftBracket1 => LEFT_BRACKET_1,
        State::LeftBracketDigit(2) => LEFT_BRACKET_2,
        State::LeftBracketDigit(3) => LEFT_BRACKET_3,
        State::LeftBracketDigit(4) => LEFT_BRACKET_4,
        State::LeftBracketDigit(5) => LEFT_BRACKET_5,
        State::LeftBracketDigit(6) => LEFT_BRACKET_6,
        State::LeftBracketDigit(7) => LEFT_BRACKET_7,
        State::LeftBracketDigit(_) => LEFT_BRACKET_8,
        State::LeftBracket1Semicolon => LEFT_BRACKET_1_SEMICOLON,
        State::LeftBracket1SemicolonMod => LEFT_BRACKET_1_SEMICOLON_MOD,
        State::O => O,
        State::Discard => DISCARD,
    }
}

fn lookup(state: State, unit: char) -> Action {
    let rows = table(state);
    rows.iter()
        .find(|(pattern, _)| pattern.matches(unit))
        .map(|(_, action)| *action)
        .unwrap_or(Action::Fail)
}

/// Turns code points into keys, one unit at a time.
#[derive(Debug)]
pub struct EscapeDecoder {
    state: State,
    modifiers: u32,
    consumed: String,
}

impl Default for EscapeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EscapeDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Initial,
            modifiers: 0,
            consumed: String::new(),
        }
    }

    /// True between the first byte of a sequence and its last.
    pub fn in_sequence(&self) -> bool {
        self.state != State::Initial
    }

    pub fn reset(&mut self) {
        self.state = State::Initial;
        self.modifiers = 0;
        self.consumed.clear();
    }

    pub fn feed(&mut self, unit: char) -> Decoded {
        self.consumed.push(unit);
        let mut state = self.state;
        loop {
            match lookup(state, unit) {
                Action::Goto(next) => {
                    self.state = next;
                    return Decoded::Pending;
                }
                Action::AddModifier(bit, next) => {
                    self.modifiers |= bit;
                    self.state = next;
                    return Decoded::Pending;
                }
                Action::Emit(key) => return self.emit(key),
                Action::EmitInput => return self.emit(KeyEvent::from_char(unit)),
                Action::MetaThenInitial => {
                    self.modifiers |= KeyEvent::META;
                    state = State::Initial;
                }
                Action::MetaStayEscape => {
                    self.modifiers |= KeyEvent::META;
                    self.state = State::Escape;
                    return Decoded::Pending;
                }
                Action::Fail => {
                    debug!(sequence = ?self.consumed, "undecodable escape sequence");
                    self.reset();
                    return Decoded::Invalid;
                }
            }
        }
    }

    /// Decode a whole slice, collecting everything that is not `Pending`.
    pub fn feed_all(&mut self, units: impl IntoIterator<Item = char>) -> Vec<Decoded> {
        units
            .into_iter()
            .map(|unit| self.feed(unit))
            .filter(|decoded| *decoded != Decoded::Pending)
            .collect()
    }

    fn emit(&mut self, key: KeyEvent) -> Decoded {
        let key = key.with_modifiers(self.modifiers).normalized();
        self.reset();
        Decoded::Key(key)
    }
}
