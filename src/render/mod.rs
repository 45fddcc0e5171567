//! Rendering: prompt geometry and line repaint.

pub mod prompt;
pub mod refresh;

pub use prompt::Prompt;
pub use refresh::{paint, LineView, PaintMode};
