//! # Utilities Module
//!
//! Utility functions for mathematics, grid search, and general game operations.

pub mod grid;
pub mod math;

pub use grid::*;
pub use math::*;
