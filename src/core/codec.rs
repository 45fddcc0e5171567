//! UTF-8 / UTF-32 conversion with a legacy 8-bit fallback.

use std::env;

use once_cell::sync::OnceCell;

/// How bytes map to code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecMode {
    /// Standard UTF-8; malformed input decodes to U+FFFD.
    Utf8,
    /// One byte per code point (Latin-1).
    EightBit,
}

static MODE: OnceCell<CodecMode> = OnceCell::new();

impl CodecMode {
    /// Decide the mode from `LC_ALL`, `LC_CTYPE`, then `LANG`.
    pub fn detect() -> Self {
        Self::from_locale_vars(
            env::var("LC_ALL").ok().as_deref(),
            env::var("LC_CTYPE").ok().as_deref(),
            env::var("LANG").ok().as_deref(),
        )
    }

    pub fn from_locale_vars(
        lc_all: Option<&str>,
        lc_ctype: Option<&str>,
        lang: Option<&str>,
    ) -> Self {
        let effective = [lc_all, lc_ctype, lang]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty());

        match effective {
            None => CodecMode::Utf8,
            Some(locale) => {
                let lower = locale.to_ascii_lowercase();
                if lower.contains("utf-8") || lower.contains("utf8") {
                    CodecMode::Utf8
                } else {
                    CodecMode::EightBit
                }
            }
        }
    }
}

/// Process-wide mode, decided on first use.
pub fn codec_mode() -> CodecMode {
    *MODE.get_or_init(CodecMode::detect)
}

/// Force the process-wide mode. Returns `false` if it was already decided.
pub fn set_codec_mode(mode: CodecMode) -> bool {
    MODE.set(mode).is_ok()
}

pub fn decode(bytes: &[u8], mode: CodecMode) -> Vec<char> {
    match mode {
        CodecMode::Utf8 => String::from_utf8_lossy(bytes).chars().collect(),
        CodecMode::EightBit => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

pub fn encode(text: &[char], mode: CodecMode) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    encode_into(text.iter().copied(), mode, &mut out);
    out
}

pub fn encode_str(text: &str, mode: CodecMode) -> Vec<u8> {
    match mode {
        CodecMode::Utf8 => text.as_bytes().to_vec(),
        CodecMode::EightBit => {
            let mut out = Vec::with_capacity(text.len());
            encode_into(text.chars(), mode, &mut out);
            out
        }
    }
}

pub(crate) fn encode_into<I>(chars: I, mode: CodecMode, out: &mut Vec<u8>)
where
    I: IntoIterator<Item = char>,
{
    let mut scratch = [0u8; 4];
    for ch in chars {
        match mode {
            CodecMode::Utf8 => out.extend_from_slice(ch.encode_utf8(&mut scratch).as_bytes()),
            CodecMode::EightBit => match u8::try_from(u32::from(ch)) {
                Ok(byte) => out.push(byte),
                Err(_) => out.push(b'?'),
            },
        }
    }
}

/// Incremental UTF-8 decoder fed one byte at a time.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: [u8; 4],
    len: usize,
    needed: usize,
    deferred: Option<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a code point once a sequence completes.
    ///
    /// Invalid lead bytes and overlong/surrogate encodings yield U+FFFD. A
    /// sequence cut short by a non-continuation byte also yields U+FFFD, and that
    /// byte waits in [`Utf8Decoder::take_deferred`].
    pub fn push(&mut self, byte: u8) -> Option<char> {
        if self.needed == 0 {
            return self.start(byte);
        }

        if byte & 0xC0 != 0x80 {
            self.reset();
            self.deferred = Some(byte);
            return Some(char::REPLACEMENT_CHARACTER);
        }

        self.pending[self.len] = byte;
        self.len += 1;
        if self.len < self.needed {
            return None;
        }

        let decoded = std::str::from_utf8(&self.pending[..self.len])
            .ok()
            .and_then(|text| text.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.reset();
        Some(decoded)
    }

    /// Decode the byte that ended a truncated sequence, if one is waiting.
    pub fn take_deferred(&mut self) -> Option<char> {
        let byte = self.deferred.take()?;
        self.start(byte)
    }

    pub fn is_idle(&self) -> bool {
        self.needed == 0 && self.deferred.is_none()
    }

    pub fn reset(&mut self) {
        self.len = 0;
        self.needed = 0;
        self.deferred = None;
    }

    fn start(&mut self, byte: u8) -> Option<char> {
        let needed = match byte {
            0x00..=0x7F => return Some(char::from(byte)),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Some(char::REPLACEMENT_CHARACTER),
        };
        self.pending[0] = byte;
        self.len = 1;
        self.needed = needed;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, encode_str, CodecMode, Utf8Decoder};

    #[test]
    fn utf8_round_trips_bytes() {
        let input = "héllo wörld ✓ 日本語 😀";
        let chars = decode(input.as_bytes(), CodecMode::Utf8);
        assert_eq!(chars.len(), input.chars().count());
        assert_eq!(encode(&chars, CodecMode::Utf8), input.as_bytes());
    }

    #[test]
    fn utf32_round_trips_code_points() {
        let chars: Vec<char> = vec!['a', '\u{e9}', '\u{4e2d}', '\u{1f600}', '\u{10ffff}'];
        let bytes = encode(&chars, CodecMode::Utf8);
        assert_eq!(decode(&bytes, CodecMode::Utf8), chars);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let chars = decode(b"a\xffb", CodecMode::Utf8);
        assert_eq!(chars, vec!['a', char::REPLACEMENT_CHARACTER, 'b']);
    }

    #[test]
    fn eight_bit_mode_is_byte_per_code_point() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let chars = decode(&bytes, CodecMode::EightBit);
        assert_eq!(chars.len(), 256);
        assert_eq!(chars[0xe9], '\u{e9}');
        assert_eq!(encode(&chars, CodecMode::EightBit), bytes);
    }

    #[test]
    fn eight_bit_mode_replaces_wide_code_points() {
        assert_eq!(encode_str("a\u{4e2d}", CodecMode::EightBit), b"a?");
    }

    #[test]
    fn locale_detection() {
        assert_eq!(
            CodecMode::from_locale_vars(None, None, None),
            CodecMode::Utf8
        );
        assert_eq!(
            CodecMode::from_locale_vars(None, None, Some("en_US.UTF-8")),
            CodecMode::Utf8
        );
        assert_eq!(
            CodecMode::from_locale_vars(Some("C"), None, Some("en_US.UTF-8")),
            CodecMode::EightBit
        );
        assert_eq!(
            CodecMode::from_locale_vars(Some(""), Some("de_DE.utf8"), None),
            CodecMode::Utf8
        );
        assert_eq!(
            CodecMode::from_locale_vars(None, None, Some("en_US.ISO-8859-1")),
            CodecMode::EightBit
        );
    }

    #[test]
    fn incremental_decoder_assembles_sequences() {
        let mut decoder = Utf8Decoder::new();
        let mut out = Vec::new();
        for byte in "a✓😀".bytes() {
            if let Some(ch) = decoder.push(byte) {
                out.push(ch);
            }
        }
        assert_eq!(out, vec!['a', '✓', '😀']);
        assert!(decoder.is_idle());
    }

    #[test]
    fn incremental_decoder_recovers_from_truncated_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.push(0xE2), None);
        assert_eq!(decoder.push(b'x'), Some(char::REPLACEMENT_CHARACTER));
        assert!(!decoder.is_idle());
        assert_eq!(decoder.take_deferred(), Some('x'));
        assert!(decoder.is_idle());
        assert_eq!(decoder.take_deferred(), None);
        assert_eq!(decoder.push(0xFF), Some(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn truncated_sequence_before_a_new_lead_byte_keeps_the_new_char() {
        let mut decoder = Utf8Decoder::new();
        let mut out = Vec::new();
        for &byte in b"\xC3\xE2\x9C\x93" {
            if let Some(ch) = decoder.push(byte) {
                out.push(ch);
            }
            out.extend(decoder.take_deferred());
        }
        assert_eq!(out, vec![char::REPLACEMENT_CHARACTER, '✓']);
        assert!(decoder.is_idle());
    }
}
