//! # Rendering Module
//!
//! Text rendering of boards, HUD lines and menu screens. Output is plain
//! strings so the CLI and tests can show or inspect it.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
