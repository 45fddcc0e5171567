//! Terminal trait and raw-mode guard.

use std::io;
use std::ops::{Deref, DerefMut};

use crate::core::codec;

/// One unit from the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputUnit {
    /// A raw byte from a byte-oriented source (decoded by the reader).
    Byte(u8),
    /// A code point from a source that decodes on its own.
    CodePoint(char),
    /// The window size changed while waiting for input.
    Resized,
    Eof,
}

/// How the line should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A capable terminal; edit interactively.
    Interactive,
    /// A terminal that cannot handle cursor movement (`TERM=dumb` and friends).
    Unsupported,
    /// Input is a pipe or file.
    NotATty,
}

/// The collaborator that owns the file descriptors.
pub trait Terminal {
    fn enable_raw_mode(&mut self) -> io::Result<()>;

    fn disable_raw_mode(&mut self) -> io::Result<()>;

    /// Block until one unit of input (or a resize) is available.
    fn read_unit(&mut self) -> io::Result<InputUnit>;

    /// Write output bytes in full.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Terminal dimensions.
    fn columns(&self) -> usize;
    fn rows(&self) -> usize;

    /// Returns and clears the pending-resize flag.
    fn take_resize(&mut self) -> bool;

    fn input_kind(&self) -> InputKind;

    /// Whether output goes to a terminal. Prompt colors are stripped otherwise.
    fn output_is_tty(&self) -> bool {
        true
    }

    /// Read one line without editing. `None` at end of input.
    ///
    /// The default collects bytes from [`Terminal::read_unit`] up to a newline and
    /// strips a trailing CR.
    fn read_plain_line(&mut self) -> io::Result<Option<String>> {
        let mut bytes = Vec::new();
        let mut text = String::new();
        let mut saw_input = false;
        loop {
            match self.read_unit()? {
                InputUnit::Byte(b'\n') | InputUnit::CodePoint('\n') => {
                    saw_input = true;
                    break;
                }
                InputUnit::Byte(byte) => {
                    saw_input = true;
                    bytes.push(byte);
                }
                InputUnit::CodePoint(ch) => {
                    saw_input = true;
                    text.extend(codec::decode(&bytes, codec::codec_mode()));
                    bytes.clear();
                    text.push(ch);
                }
                InputUnit::Resized => continue,
                InputUnit::Eof => break,
            }
        }
        if !saw_input {
            return Ok(None);
        }
        text.extend(codec::decode(&bytes, codec::codec_mode()));
        if text.ends_with('\r') {
            text.pop();
        }
        Ok(Some(text))
    }
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        (**self).enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        (**self).disable_raw_mode()
    }

    fn read_unit(&mut self) -> io::Result<InputUnit> {
        (**self).read_unit()
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write(data)
    }

    fn columns(&self) -> usize {
        (**self).columns()
    }

    fn rows(&self) -> usize {
        (**self).rows()
    }

    fn take_resize(&mut self) -> bool {
        (**self).take_resize()
    }

    fn input_kind(&self) -> InputKind {
        (**self).input_kind()
    }

    fn output_is_tty(&self) -> bool {
        (**self).output_is_tty()
    }

    fn read_plain_line(&mut self) -> io::Result<Option<String>> {
        (**self).read_plain_line()
    }
}

/// RAII guard that restores cooked mode on drop.
pub struct RawModeGuard<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
}

impl<'a, T: Terminal + ?Sized> RawModeGuard<'a, T> {
    /// Enter raw mode; the guard leaves it again.
    pub fn new(terminal: &'a mut T) -> io::Result<Self> {
        terminal.enable_raw_mode()?;
        Ok(Self { terminal })
    }
}

impl<T: Terminal + ?Sized> Deref for RawModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> DerefMut for RawModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self.terminal.disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use super::{InputKind, InputUnit, RawModeGuard, Terminal};

    #[derive(Default)]
    struct Fake {
        input: VecDeque<InputUnit>,
        raw: bool,
        transitions: usize,
    }

    impl Terminal for Fake {
        fn enable_raw_mode(&mut self) -> io::Result<()> {
            self.raw = true;
            self.transitions += 1;
            Ok(())
        }

        fn disable_raw_mode(&mut self) -> io::Result<()> {
            self.raw = false;
            self.transitions += 1;
            Ok(())
        }

        fn read_unit(&mut self) -> io::Result<InputUnit> {
            Ok(self.input.pop_front().unwrap_or(InputUnit::Eof))
        }

        fn write(&mut self, _data: &[u8]) -> io::Result<()> {
            Ok(())
        }

        fn columns(&self) -> usize {
            80
        }

        fn rows(&self) -> usize {
            24
        }

        fn take_resize(&mut self) -> bool {
            false
        }

        fn input_kind(&self) -> InputKind {
            InputKind::NotATty
        }
    }

    fn bytes(text: &str) -> VecDeque<InputUnit> {
        text.bytes().map(InputUnit::Byte).collect()
    }

    #[test]
    fn guard_restores_mode_on_drop() {
        let mut fake = Fake::default();
        {
            let guard = RawModeGuard::new(&mut fake).expect("raw");
            assert!(guard.raw);
        }
        assert!(!fake.raw);
        assert_eq!(fake.transitions, 2);
    }

    #[test]
    fn plain_line_reading_splits_on_newline() {
        let mut fake = Fake {
            input: bytes("first\r\nsecond\nlast"),
            ..Fake::default()
        };
        assert_eq!(fake.read_plain_line().expect("read"), Some("first".to_string()));
        assert_eq!(fake.read_plain_line().expect("read"), Some("second".to_string()));
        assert_eq!(fake.read_plain_line().expect("read"), Some("last".to_string()));
        assert_eq!(fake.read_plain_line().expect("read"), None);
    }
}
