//! Core types shared by the editor, the renderer, and the platform layer.

pub mod codec;
pub mod completion;
pub mod history;
pub mod key;
pub mod keybindings;
pub mod kill_ring;
pub mod output;
pub mod terminal;
pub mod text;
