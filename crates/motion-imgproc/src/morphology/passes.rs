use motion_grid::{Bounds, Grid};

use super::bits;
use super::ops::{self, MorphOp};
use crate::parallel::{self, ExecutionStrategy, ParallelError};

/// A horizontal kernel turning one source row span into one output row span.
pub(crate) type RowKernel = fn(&[u8], &mut [u8]);

/// How pixels are stored in a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layout {
    /// One pixel per byte, `0` or `255`.
    Bytes,
    /// Eight pixels per byte, most significant bit first.
    Bits,
}

impl Layout {
    /// The horizontal row kernel of `O` for this layout.
    ///
    /// Vertical passes combine whole bytes and are the same for both layouts.
    pub(crate) fn horizontal<O: MorphOp>(self) -> RowKernel {
        match self {
            Layout::Bytes => ops::horizontal_row::<O> as RowKernel,
            Layout::Bits => bits::horizontal_row::<O> as RowKernel,
        }
    }
}

/// Apply `kernel` to every row of `bounds`. Rows are independent.
pub(crate) fn horizontal_pass(
    src: &Grid,
    dst: &mut Grid,
    bounds: Bounds,
    kernel: RowKernel,
    strategy: ExecutionStrategy,
) -> Result<(), ParallelError> {
    let rows = src
        .rows_span(bounds)
        .zip(dst.rows_span_mut(bounds))
        .collect::<Vec<_>>();
    parallel::for_each_row(strategy, rows, |(s, d)| kernel(s, d))
}

/// Vertical 3x1 pass. The first and last rows of `bounds` are copied.
pub(crate) fn vertical_pass<O: MorphOp>(
    src: &Grid,
    dst: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ParallelError> {
    let src_rows = src.rows_span(bounds).collect::<Vec<_>>();
    let last = src_rows.len() - 1;
    let rows = dst.rows_span_mut(bounds).enumerate().collect::<Vec<_>>();
    parallel::for_each_row(strategy, rows, |(k, d)| {
        if k == 0 || k == last {
            d.copy_from_slice(src_rows[k]);
        } else {
            ops::vertical_row::<O>(src_rows[k - 1], src_rows[k], src_rows[k + 1], d);
        }
    })
}

/// Run `A` then `B` as four separable passes through two scratch grids.
///
/// The passes are `A` horizontal, `A` vertical, `B` horizontal and `B`
/// vertical. When `src` is `None` the first pass reads `dst`, which is only
/// written by the last pass.
#[allow(clippy::too_many_arguments)]
pub(crate) fn separable3<A: MorphOp, B: MorphOp>(
    src: Option<&Grid>,
    dst: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
    layout: Layout,
    strategy: ExecutionStrategy,
) -> Result<(), ParallelError> {
    horizontal_pass(
        src.unwrap_or(&*dst),
        tmp1,
        bounds,
        layout.horizontal::<A>(),
        strategy,
    )?;
    vertical_pass::<A>(tmp1, tmp2, bounds, strategy)?;
    horizontal_pass(tmp2, tmp1, bounds, layout.horizontal::<B>(), strategy)?;
    vertical_pass::<B>(tmp1, dst, bounds, strategy)
}
