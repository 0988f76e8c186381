use motion_grid::GridError;

use crate::parallel::ParallelError;

/// An error type for the image processing kernels.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImgprocError {
    /// A grid could not be allocated or does not cover the requested range.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// The rows could not be scheduled.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// The variance clamp range is inverted.
    #[error("vmin ({vmin}) must not exceed vmax ({vmax})")]
    InvalidThresholdRange {
        /// Lower clamp limit.
        vmin: u8,
        /// Upper clamp limit.
        vmax: u8,
    },
}
