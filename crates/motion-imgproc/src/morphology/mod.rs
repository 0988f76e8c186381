//! Binary morphology with the fixed 3x3 structuring element.
//!
//! Pixels are binary: `0` is background and `255` is foreground. Since `255`
//! has every bit set, erosion and dilation reduce to bitwise AND and OR over
//! the neighborhood.

/// Bit manipulation helpers for the packed layout.
pub mod bits;

/// Non-separable 3x3 erosion and dilation.
mod full;
pub use full::*;

/// Row kernels shared by every pass.
pub(crate) mod ops;

/// Separable 1x3 and 3x1 passes.
pub(crate) mod passes;

/// Bit-packed binary morphology.
mod packed;
pub use packed::*;

/// Opening and closing through reusable scratch grids.
mod state;
pub use state::*;
