#![deny(missing_docs)]
//! Byte grids addressed by inclusive `[i0..i1] x [j0..j1]` index ranges.

/// Inclusive index ranges.
pub mod bounds;

/// Error types for the grid module.
pub mod error;

/// Owned 2D byte buffer.
pub mod grid;

pub use crate::bounds::Bounds;
pub use crate::error::GridError;
pub use crate::grid::Grid;
