//! The edit loop and the reader that drives it.

pub mod keys;
pub mod reader;
pub(crate) mod session;

pub use keys::{KeyRead, KeyReader};
pub use reader::LineReader;
