/// A binary combination of three neighbors along one axis.
pub(crate) trait MorphOp: Copy + Send + Sync + 'static {
    fn combine(a: u8, b: u8, c: u8) -> u8;
}

/// Foreground survives only if every neighbor is foreground.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Erode;

/// Foreground spreads to every neighbor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Dilate;

impl MorphOp for Erode {
    #[inline(always)]
    fn combine(a: u8, b: u8, c: u8) -> u8 {
        a & b & c
    }
}

impl MorphOp for Dilate {
    #[inline(always)]
    fn combine(a: u8, b: u8, c: u8) -> u8 {
        a | b | c
    }
}

/// Horizontal 1x3 pass over one row span.
///
/// The first and last pixels are copied from `src`.
pub(crate) fn horizontal_row<O: MorphOp>(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let n = src.len();
    if n < 3 {
        dst.copy_from_slice(src);
        return;
    }
    dst[0] = src[0];
    dst[n - 1] = src[n - 1];
    dst[1..n - 1]
        .iter_mut()
        .zip(src.windows(3))
        .for_each(|(out, w)| *out = O::combine(w[0], w[1], w[2]));
}

/// Vertical 3x1 pass producing one row span from its three source rows.
#[inline]
pub(crate) fn vertical_row<O: MorphOp>(above: &[u8], center: &[u8], below: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(center.len(), dst.len());
    dst.iter_mut()
        .zip(above.iter().zip(center).zip(below))
        .for_each(|(out, ((&a, &c), &b))| *out = O::combine(a, c, b));
}
