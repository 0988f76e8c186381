#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the image processing kernels.
pub mod error;

/// binary morphology module.
pub mod morphology;

/// module containing parallization utilities.
pub mod parallel;

/// fused Sigma-Delta and morphology pipeline.
pub mod pipeline;

/// Sigma-Delta background estimation module.
pub mod sigma_delta;

pub use crate::error::ImgprocError;
pub use motion_grid::{Bounds, Grid, GridError};
