use motion_grid::{Bounds, Grid};

use super::ops::{Dilate, Erode, MorphOp};
use crate::parallel::{self, ExecutionStrategy};
use crate::ImgprocError;

/// Erode a binary image with the full 3x3 structuring element.
///
/// Every interior pixel becomes the AND of its 3x3 neighborhood. Pixels on the
/// first or last row or column of `bounds` are copied from `src`.
///
/// # Arguments
///
/// * `src` - The input binary image (`0` or `255`).
/// * `dst` - The output binary image. It cannot alias `src`.
/// * `bounds` - The inclusive range to process. Both grids must cover it.
///
/// # Examples
///
/// ```
/// use motion_imgproc::{Bounds, Grid};
/// use motion_imgproc::morphology::erosion3;
///
/// let bounds = Bounds::new(0, 4, 0, 4);
/// let src = Grid::from_fn(bounds, |i, j| if (i, j) == (2, 2) { 0 } else { 255 }).unwrap();
/// let mut dst = Grid::new(bounds).unwrap();
///
/// erosion3(&src, &mut dst, bounds).unwrap();
/// assert_eq!(dst.get(1, 1), 0);
/// assert_eq!(dst.get(0, 0), 255);
/// ```
pub fn erosion3(src: &Grid, dst: &mut Grid, bounds: Bounds) -> Result<(), ImgprocError> {
    erosion3_with(src, dst, bounds, ExecutionStrategy::default())
}

/// [`erosion3`] with an explicit [`ExecutionStrategy`].
pub fn erosion3_with(
    src: &Grid,
    dst: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    full3::<Erode>(src, dst, bounds, strategy)
}

/// Dilate a binary image with the full 3x3 structuring element.
///
/// Every interior pixel becomes the OR of its 3x3 neighborhood. Pixels on the
/// first or last row or column of `bounds` are copied from `src`.
pub fn dilation3(src: &Grid, dst: &mut Grid, bounds: Bounds) -> Result<(), ImgprocError> {
    dilation3_with(src, dst, bounds, ExecutionStrategy::default())
}

/// [`dilation3`] with an explicit [`ExecutionStrategy`].
pub fn dilation3_with(
    src: &Grid,
    dst: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    full3::<Dilate>(src, dst, bounds, strategy)
}

fn full3<O: MorphOp>(
    src: &Grid,
    dst: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    src.check_contains(bounds)?;
    dst.check_contains(bounds)?;

    let src_rows = src.rows_span(bounds).collect::<Vec<_>>();
    let last = src_rows.len() - 1;
    let rows = dst.rows_span_mut(bounds).enumerate().collect::<Vec<_>>();

    parallel::for_each_row(strategy, rows, |(k, d)| {
        let c = src_rows[k];
        let n = c.len();
        if k == 0 || k == last || n < 3 {
            d.copy_from_slice(c);
            return;
        }
        let (a, b) = (src_rows[k - 1], src_rows[k + 1]);
        d[0] = c[0];
        d[n - 1] = c[n - 1];
        for j in 1..n - 1 {
            let r0 = O::combine(a[j - 1], a[j], a[j + 1]);
            let r1 = O::combine(c[j - 1], c[j], c[j + 1]);
            let r2 = O::combine(b[j - 1], b[j], b[j + 1]);
            d[j] = O::combine(r0, r1, r2);
        }
    })?;

    Ok(())
}
