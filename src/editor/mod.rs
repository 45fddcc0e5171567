//! Edit buffer and the editing operations layered on it.

pub mod brackets;
pub mod buffer;
pub mod completion;
pub mod hints;
pub mod kill;
pub mod search;

pub use buffer::{EditBuffer, Outcome};
pub use hints::{HintLayout, HintRow};
pub use search::{IncrementalSearch, SearchStep};
