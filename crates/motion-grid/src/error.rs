use std::collections::TryReserveError;

use crate::Bounds;

/// An error type for the grid module.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The backing buffer could not be allocated.
    #[error("failed to allocate grid buffer: {0}")]
    Allocation(#[from] TryReserveError),

    /// The bounds describe an empty range.
    #[error("Invalid bounds {0}")]
    InvalidBounds(Bounds),

    /// The requested range is not covered by the grid.
    #[error("Bounds {requested} are out of the grid range {available}")]
    OutOfRange {
        /// The range that was requested.
        requested: Bounds,
        /// The range the grid was allocated with.
        available: Bounds,
    },

    /// A size cannot be expressed as bounds.
    #[error("Invalid grid size {0}x{1}")]
    InvalidSize(usize, usize),

    /// The data length does not match the bounds.
    #[error("Data length ({0}) does not match the grid size ({1})")]
    InvalidDataLength(usize, usize),
}
