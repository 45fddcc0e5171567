//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes must flow through `OutputGate::flush(..)`.

use std::io;

use crate::core::codec::{self, CodecMode};
use crate::core::completion::Color;
use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Text, encoded per codec mode.
    Text(String),
    /// Static control bytes.
    Static(&'static str),

    /// `CSI n A`; zero emits nothing.
    MoveUp(usize),
    /// `CSI n G` with a 0-based column.
    MoveToColumn(usize),
    /// `CSI J`.
    EraseDown,
    /// Home the cursor and clear the screen.
    ClearScreen,

    SetColor(Color),
    ResetColor,
    /// CR LF; output post-processing is off in raw mode.
    Newline,
    Beep,
}

impl TerminalCmd {
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text(data.into())
    }

    fn encode_into(&self, mode: CodecMode, out: &mut Vec<u8>) {
        match self {
            TerminalCmd::Text(data) => codec::encode_into(data.chars(), mode, out),
            TerminalCmd::Static(data) => out.extend_from_slice(data.as_bytes()),
            TerminalCmd::MoveUp(0) => {}
            TerminalCmd::MoveUp(rows) => out.extend_from_slice(format!("\x1b[{rows}A").as_bytes()),
            TerminalCmd::MoveToColumn(col) => {
                out.extend_from_slice(format!("\x1b[{}G", col + 1).as_bytes())
            }
            TerminalCmd::EraseDown => out.extend_from_slice(b"\x1b[J"),
            TerminalCmd::ClearScreen => out.extend_from_slice(b"\x1b[H\x1b[2J"),
            TerminalCmd::SetColor(color) => out.extend_from_slice(color.sgr().as_bytes()),
            TerminalCmd::ResetColor => out.extend_from_slice(b"\x1b[0m"),
            TerminalCmd::Newline => out.extend_from_slice(b"\r\n"),
            TerminalCmd::Beep => out.push(0x07),
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    /// Queue a string, merging with a preceding text command.
    pub fn text(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        if let Some(TerminalCmd::Text(last)) = self.cmds.last_mut() {
            last.push_str(data);
            return;
        }
        self.cmds.push(TerminalCmd::Text(data.to_string()));
    }

    pub fn chars(&mut self, data: &[char]) {
        if data.is_empty() {
            return;
        }
        let text: String = data.iter().collect();
        self.text(&text);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn commands(&self) -> &[TerminalCmd] {
        &self.cmds
    }

    /// Encode the queued commands without draining them.
    pub fn encode(&self, mode: CodecMode) -> Vec<u8> {
        let mut out = Vec::new();
        for cmd in &self.cmds {
            cmd.encode_into(mode, &mut out);
        }
        out
    }

    /// Flush buffered commands to the terminal in one write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) -> io::Result<()> {
        if self.cmds.is_empty() {
            return Ok(());
        }
        let bytes = self.encode(codec::codec_mode());
        self.cmds.clear();
        if bytes.is_empty() {
            return Ok(());
        }
        term.write(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputGate, TerminalCmd};
    use crate::core::codec::CodecMode;
    use crate::core::completion::Color;

    #[test]
    fn cursor_commands_encode_to_csi() {
        let mut gate = OutputGate::new();
        gate.extend([
            TerminalCmd::MoveUp(2),
            TerminalCmd::MoveToColumn(4),
            TerminalCmd::EraseDown,
            TerminalCmd::MoveUp(0),
        ]);
        assert_eq!(gate.encode(CodecMode::Utf8), b"\x1b[2A\x1b[5G\x1b[J");
    }

    #[test]
    fn adjacent_text_is_merged() {
        let mut gate = OutputGate::new();
        gate.text("ab");
        gate.chars(&['c', 'd']);
        gate.push(TerminalCmd::SetColor(Color::Red));
        gate.text("e");
        assert_eq!(gate.commands().len(), 3);
        assert_eq!(gate.encode(CodecMode::Utf8), b"abcd\x1b[0;22;31me");
    }

    #[test]
    fn text_respects_codec_mode() {
        let mut gate = OutputGate::new();
        gate.text("é日");
        assert_eq!(gate.encode(CodecMode::EightBit), vec![0xE9, b'?']);
        assert_eq!(gate.encode(CodecMode::Utf8), "é日".as_bytes());
    }
}
