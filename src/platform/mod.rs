//! Platform-specific terminal integrations.

pub mod escape_decoder;
pub mod process_terminal;

pub use escape_decoder::{Decoded, EscapeDecoder};
pub use process_terminal::ProcessTerminal;
