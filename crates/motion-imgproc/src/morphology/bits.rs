//! Each packed byte holds 8 horizontally consecutive pixels, most significant
//! bit first: bit 7 is the leftmost pixel and bit 0 the rightmost.

use super::ops::MorphOp;

/// Mask of the leftmost pixel of a packed byte.
pub const FIRST_PIXEL: u8 = 0x80;

/// Mask of the rightmost pixel of a packed byte.
pub const LAST_PIXEL: u8 = 0x01;

/// Move every pixel one position to the left, borrowing from the next byte.
///
/// Pixel `k` of the result holds pixel `k + 1` of `curr`. The rightmost pixel
/// is the leftmost pixel of `next`, so each pixel sees its right neighbor.
///
/// ```
/// use motion_imgproc::morphology::bits::shift_in_next;
///
/// assert_eq!(shift_in_next(0b0100_0001, 0b1000_0000), 0b1000_0011);
/// ```
#[inline(always)]
pub fn shift_in_next(curr: u8, next: u8) -> u8 {
    (curr << 1) | (next >> 7)
}

/// Move every pixel one position to the right, borrowing from the previous byte.
///
/// Pixel `k` of the result holds pixel `k - 1` of `curr`. The leftmost pixel
/// is the rightmost pixel of `prev`, so each pixel sees its left neighbor.
///
/// ```
/// use motion_imgproc::morphology::bits::shift_in_prev;
///
/// assert_eq!(shift_in_prev(0b1000_0010, 0b0000_0001), 0b1100_0001);
/// ```
#[inline(always)]
pub fn shift_in_prev(curr: u8, prev: u8) -> u8 {
    (curr >> 1) | (prev << 7)
}

/// Pack 8 binary pixels into one byte. Any non-zero pixel sets its bit.
#[inline]
pub fn pack8(pixels: &[u8]) -> u8 {
    debug_assert_eq!(pixels.len(), 8);
    pixels
        .iter()
        .fold(0u8, |acc, &p| (acc << 1) | u8::from(p != 0))
}

/// Expand one packed byte into 8 pixels of value `0` or `255`.
#[inline]
pub fn unpack8(byte: u8, pixels: &mut [u8]) {
    debug_assert_eq!(pixels.len(), 8);
    pixels
        .iter_mut()
        .enumerate()
        .for_each(|(k, p)| {
            *p = if byte & (FIRST_PIXEL >> k) != 0 { 255 } else { 0 }
        });
}

/// Replace the bits selected by `mask` in `bits` with those of `from`.
#[inline(always)]
fn keep(bits: u8, from: u8, mask: u8) -> u8 {
    (bits & !mask) | (from & mask)
}

/// Horizontal 1x3 pass over one packed row span.
///
/// Neighbors are borrowed across byte boundaries. Only the leftmost pixel of
/// the first byte and the rightmost pixel of the last byte are copied, which
/// matches the unpacked pass pixel for pixel.
pub(crate) fn horizontal_row<O: MorphOp>(src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let n = src.len();
    if n == 0 {
        return;
    }
    for k in 0..n {
        let prev = if k > 0 { src[k - 1] } else { 0 };
        let next = if k + 1 < n { src[k + 1] } else { 0 };
        let curr = src[k];
        dst[k] = O::combine(shift_in_prev(curr, prev), curr, shift_in_next(curr, next));
    }
    dst[0] = keep(dst[0], src[0], FIRST_PIXEL);
    dst[n - 1] = keep(dst[n - 1], src[n - 1], LAST_PIXEL);
}
