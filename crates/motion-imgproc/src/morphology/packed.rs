use motion_grid::{Bounds, Grid};

use super::bits;
use super::ops::{Dilate, Erode, MorphOp};
use super::passes::{self, Layout};
use crate::parallel::{self, ExecutionStrategy};
use crate::ImgprocError;

/// Pack a binary image into 8 pixels per byte, most significant bit first.
///
/// Packed column `jp` of row `i` holds pixels `j0 + 8 * (jp - j0) ..` of that
/// row, so `dst` must cover [`Bounds::packed`] of `bounds`. The width of
/// `bounds` must be a multiple of 8; a trailing partial group is dropped.
///
/// # Examples
///
/// ```
/// use motion_imgproc::{Bounds, Grid};
/// use motion_imgproc::morphology::pack_binary;
///
/// let bounds = Bounds::new(0, 0, 0, 15);
/// let src = Grid::from_fn(bounds, |_, j| if j == 0 || j == 15 { 255 } else { 0 }).unwrap();
/// let mut packed = Grid::new(bounds.packed()).unwrap();
///
/// pack_binary(&src, &mut packed, bounds).unwrap();
/// assert_eq!(packed.as_slice(), &[0x80, 0x01]);
/// ```
pub fn pack_binary(src: &Grid, dst: &mut Grid, bounds: Bounds) -> Result<(), ImgprocError> {
    pack_binary_with(src, dst, bounds, ExecutionStrategy::default())
}

/// [`pack_binary`] with an explicit [`ExecutionStrategy`].
pub fn pack_binary_with(
    src: &Grid,
    dst: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    debug_assert!(
        bounds.cols() % 8 == 0,
        "width {} is not a multiple of 8",
        bounds.cols()
    );
    let packed = bounds.packed();
    src.check_contains(bounds)?;
    dst.check_contains(packed)?;

    let rows = src
        .rows_span(bounds)
        .zip(dst.rows_span_mut(packed))
        .collect::<Vec<_>>();
    parallel::for_each_row(strategy, rows, |(s, d)| {
        d.iter_mut()
            .zip(s.chunks_exact(8))
            .for_each(|(byte, pixels)| *byte = bits::pack8(pixels));
    })?;
    Ok(())
}

/// Expand a packed image back to one pixel per byte (`0` or `255`).
///
/// `bounds` is the pixel range, as given to [`pack_binary`].
pub fn unpack_binary(src: &Grid, dst: &mut Grid, bounds: Bounds) -> Result<(), ImgprocError> {
    unpack_binary_with(src, dst, bounds, ExecutionStrategy::default())
}

/// [`unpack_binary`] with an explicit [`ExecutionStrategy`].
pub fn unpack_binary_with(
    src: &Grid,
    dst: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    debug_assert!(
        bounds.cols() % 8 == 0,
        "width {} is not a multiple of 8",
        bounds.cols()
    );
    let packed = bounds.packed();
    src.check_contains(packed)?;
    dst.check_contains(bounds)?;

    let rows = src
        .rows_span(packed)
        .zip(dst.rows_span_mut(bounds))
        .collect::<Vec<_>>();
    parallel::for_each_row(strategy, rows, |(s, d)| {
        d.chunks_exact_mut(8)
            .zip(s)
            .for_each(|(pixels, &byte)| bits::unpack8(byte, pixels));
    })?;
    Ok(())
}

/// Opening of a packed image, in place.
///
/// # Arguments
///
/// * `img` - The packed image, overwritten with the result.
/// * `tmp1` - Scratch grid covering `bounds`.
/// * `tmp2` - Scratch grid covering `bounds`.
/// * `bounds` - The packed range `[i0..=i1] x [jp0..=jp1]`.
pub fn opening3_packed(
    img: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
) -> Result<(), ImgprocError> {
    opening3_packed_with(img, tmp1, tmp2, bounds, ExecutionStrategy::default())
}

/// [`opening3_packed`] with an explicit [`ExecutionStrategy`].
pub fn opening3_packed_with(
    img: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    run_packed::<Erode, Dilate>(img, tmp1, tmp2, bounds, strategy)
}

/// Closing of a packed image, in place. See [`opening3_packed`].
pub fn closing3_packed(
    img: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
) -> Result<(), ImgprocError> {
    closing3_packed_with(img, tmp1, tmp2, bounds, ExecutionStrategy::default())
}

/// [`closing3_packed`] with an explicit [`ExecutionStrategy`].
pub fn closing3_packed_with(
    img: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    run_packed::<Dilate, Erode>(img, tmp1, tmp2, bounds, strategy)
}

fn run_packed<A: MorphOp, B: MorphOp>(
    img: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    img.check_contains(bounds)?;
    tmp1.check_contains(bounds)?;
    tmp2.check_contains(bounds)?;
    passes::separable3::<A, B>(None, img, tmp1, tmp2, bounds, Layout::Bits, strategy)?;
    Ok(())
}

/// Packed buffers for running opening and closing on unpacked frames.
///
/// Each call packs the input, filters it with 8 pixels per byte and unpacks
/// the result, which trades two conversions for an 8x smaller working set.
#[derive(Debug, Clone)]
pub struct PackedMorphoState {
    bounds: Bounds,
    packed: Grid,
    tmp1: Grid,
    tmp2: Grid,
}

impl PackedMorphoState {
    /// Allocate the packed buffers for the pixel range `bounds`.
    ///
    /// The width of `bounds` must be a multiple of 8.
    pub fn new(bounds: Bounds) -> Result<Self, ImgprocError> {
        debug_assert!(
        bounds.cols() % 8 == 0,
        "width {} is not a multiple of 8",
        bounds.cols()
    );
        let packed_bounds = bounds.packed();
        let packed = Grid::new(packed_bounds)?;
        let tmp1 = Grid::new(packed_bounds)?;
        let tmp2 = Grid::new(packed_bounds)?;
        log::debug!("allocated packed morphology buffers for {bounds} ({packed_bounds} packed)");
        Ok(Self {
            bounds,
            packed,
            tmp1,
            tmp2,
        })
    }

    /// Zero every packed buffer.
    pub fn init(&mut self) {
        self.packed.zero();
        self.tmp1.zero();
        self.tmp2.zero();
    }

    /// The pixel range the buffers were allocated for.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Opening of an unpacked frame through the packed layout.
    pub fn opening3(&mut self, src: &Grid, dst: &mut Grid) -> Result<(), ImgprocError> {
        self.opening3_with(src, dst, ExecutionStrategy::default())
    }

    /// [`PackedMorphoState::opening3`] with an explicit [`ExecutionStrategy`].
    pub fn opening3_with(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        self.run::<Erode, Dilate>(src, dst, strategy)
    }

    /// Closing of an unpacked frame through the packed layout.
    pub fn closing3(&mut self, src: &Grid, dst: &mut Grid) -> Result<(), ImgprocError> {
        self.closing3_with(src, dst, ExecutionStrategy::default())
    }

    /// [`PackedMorphoState::closing3`] with an explicit [`ExecutionStrategy`].
    pub fn closing3_with(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        self.run::<Dilate, Erode>(src, dst, strategy)
    }

    fn run<A: MorphOp, B: MorphOp>(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        pack_binary_with(src, &mut self.packed, self.bounds, strategy)?;
        run_packed::<A, B>(
            &mut self.packed,
            &mut self.tmp1,
            &mut self.tmp2,
            self.bounds.packed(),
            strategy,
        )?;
        unpack_binary_with(&self.packed, dst, self.bounds, strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(0, 1, 3, 18);
        #[rustfmt::skip]
        let src = Grid::from_vec(bounds, vec![
            255, 0, 0, 0, 0, 0, 0, 255, 0, 255, 255, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 255, 255, 255, 255, 255, 255, 255, 255,
        ])?;
        let mut packed = Grid::new(bounds.packed())?;
        pack_binary(&src, &mut packed, bounds)?;
        assert_eq!(packed.bounds(), Bounds::new(0, 1, 3, 4));
        assert_eq!(packed.as_slice(), &[0x81, 0x60, 0x00, 0xFF]);

        let mut unpacked = Grid::new(bounds)?;
        unpack_binary(&packed, &mut unpacked, bounds)?;
        assert_eq!(unpacked, src);
        Ok(())
    }

    #[test]
    fn test_opening_packed_removes_speck() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(0, 4, 0, 2);
        // one pixel at column 8 of row 2
        let mut img = Grid::from_fn(bounds, |i, j| if i == 2 && j == 1 { 0x80 } else { 0 })?;
        let mut tmp1 = Grid::new(bounds)?;
        let mut tmp2 = Grid::new(bounds)?;
        opening3_packed(&mut img, &mut tmp1, &mut tmp2, bounds)?;
        assert!(img.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn test_closing_packed_fills_hole_across_bytes() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(0, 4, 0, 2);
        // every pixel set except column 7 of row 2, the last bit of byte 0
        let mut img = Grid::from_fn(bounds, |i, j| if i == 2 && j == 0 { 0xFE } else { 0xFF })?;
        let mut tmp1 = Grid::new(bounds)?;
        let mut tmp2 = Grid::new(bounds)?;
        closing3_packed(&mut img, &mut tmp1, &mut tmp2, bounds)?;
        assert!(img.as_slice().iter().all(|&v| v == 0xFF));
        Ok(())
    }

    #[test]
    fn test_packed_state_matches_unpacked() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(0, 5, 0, 23);
        let src = Grid::from_fn(bounds, |i, j| {
            if (i + j) % 3 == 0 || j == 9 { 255 } else { 0 }
        })?;
        let mut packed_state = PackedMorphoState::new(bounds)?;
        let mut state = crate::morphology::MorphoState::new(bounds)?;

        let mut expected = Grid::new(bounds)?;
        let mut actual = Grid::new(bounds)?;
        state.closing3(&src, &mut expected, bounds)?;
        packed_state.closing3_with(&src, &mut actual, ExecutionStrategy::Serial)?;
        assert_eq!(actual, expected);

        state.opening3(&src, &mut expected, bounds)?;
        packed_state.opening3_with(&src, &mut actual, ExecutionStrategy::Serial)?;
        assert_eq!(actual, expected);

        packed_state.opening3(&src, &mut actual)?;
        assert_eq!(actual, expected);
        Ok(())
    }
}
