//! Text helpers (ANSI scanning, column widths, screen-position arithmetic).
//!
//! These helpers are pure and live under `core` so the editor and the renderer can
//! share them.

pub mod ansi;
pub mod width;
