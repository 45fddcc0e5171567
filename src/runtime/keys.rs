//! Terminal input to decoded keys.

use std::io;

use tracing::trace;

use crate::core::codec::{self, CodecMode, Utf8Decoder};
use crate::core::key::KeyEvent;
use crate::core::terminal::{InputUnit, Terminal};
use crate::platform::escape_decoder::{Decoded, EscapeDecoder};

/// One result of reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRead {
    Key(KeyEvent),
    /// An escape sequence nothing recognizes.
    Invalid,
    /// The window changed size; any partial sequence is kept.
    Resized,
    Eof,
}

/// Bytes to code points to keys.
#[derive(Debug)]
pub struct KeyReader {
    utf8: Utf8Decoder,
    escape: EscapeDecoder,
    mode: CodecMode,
}

impl Default for KeyReader {
    fn default() -> Self {
        Self::new(codec::codec_mode())
    }
}

impl KeyReader {
    pub fn new(mode: CodecMode) -> Self {
        Self {
            utf8: Utf8Decoder::new(),
            escape: EscapeDecoder::new(),
            mode,
        }
    }

    /// Block until a key, a resize, or the end of input.
    pub fn read<T: Terminal + ?Sized>(&mut self, term: &mut T) -> io::Result<KeyRead> {
        loop {
            if let Some(ch) = self.utf8.take_deferred() {
                if let Some(read) = self.feed(ch) {
                    return Ok(read);
                }
                continue;
            }
            let unit = match term.read_unit()? {
                InputUnit::Byte(byte) => match self.mode {
                    CodecMode::Utf8 => match self.utf8.push(byte) {
                        Some(ch) => ch,
                        None => continue,
                    },
                    CodecMode::EightBit => char::from(byte),
                },
                InputUnit::CodePoint(ch) => ch,
                InputUnit::Resized => return Ok(KeyRead::Resized),
                InputUnit::Eof => {
                    self.utf8.reset();
                    self.escape.reset();
                    return Ok(KeyRead::Eof);
                }
            };
            if let Some(read) = self.feed(unit) {
                return Ok(read);
            }
        }
    }

    fn feed(&mut self, unit: char) -> Option<KeyRead> {
        match self.escape.feed(unit) {
            Decoded::Pending => None,
            Decoded::Key(key) => {
                trace!(%key, "key");
                Some(KeyRead::Key(key))
            }
            Decoded::Invalid => Some(KeyRead::Invalid),
        }
    }
}
