use motion_grid::{Bounds, Grid};

use super::ops::{Dilate, Erode, MorphOp};
use super::passes::{self, Layout};
use crate::parallel::ExecutionStrategy;
use crate::ImgprocError;

/// Scratch grids for separable opening and closing.
///
/// The state is allocated once for a frame range and reused across frames.
/// A state must not be shared by concurrent calls; give each worker its own.
///
/// # Examples
///
/// ```
/// use motion_imgproc::{Bounds, Grid};
/// use motion_imgproc::morphology::MorphoState;
///
/// let bounds = Bounds::new(0, 4, 0, 4);
/// let mut state = MorphoState::new(bounds).unwrap();
///
/// // a single foreground pixel is removed by the opening
/// let src = Grid::from_fn(bounds, |i, j| if (i, j) == (2, 2) { 255 } else { 0 }).unwrap();
/// let mut dst = Grid::new(bounds).unwrap();
/// state.opening3(&src, &mut dst, bounds).unwrap();
///
/// assert!(dst.as_slice().iter().all(|&v| v == 0));
/// ```
#[derive(Debug, Clone)]
pub struct MorphoState {
    bounds: Bounds,
    ib: Grid,
    ib2: Grid,
}

impl MorphoState {
    /// Allocate the scratch grids for `bounds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are empty or the grids cannot be allocated.
    pub fn new(bounds: Bounds) -> Result<Self, ImgprocError> {
        let ib = Grid::new(bounds)?;
        let ib2 = Grid::new(bounds)?;
        log::debug!("allocated morphology scratch grids for {bounds}");
        Ok(Self { bounds, ib, ib2 })
    }

    /// Zero both scratch grids.
    pub fn init(&mut self) {
        self.ib.zero();
        self.ib2.zero();
    }

    /// The range the scratch grids were allocated with.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Opening: erosion followed by dilation, as four separable passes.
    ///
    /// # Arguments
    ///
    /// * `src` - The input binary image.
    /// * `dst` - The output binary image.
    /// * `bounds` - The range to process. It must lie inside the state bounds
    ///   and inside both images.
    pub fn opening3(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        bounds: Bounds,
    ) -> Result<(), ImgprocError> {
        self.opening3_with(src, dst, bounds, ExecutionStrategy::default())
    }

    /// [`MorphoState::opening3`] with an explicit [`ExecutionStrategy`].
    pub fn opening3_with(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        bounds: Bounds,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        src.check_contains(bounds)?;
        self.run::<Erode, Dilate>(Some(src), dst, bounds, strategy)
    }

    /// Opening computed in place.
    pub fn opening3_in_place(
        &mut self,
        img: &mut Grid,
        bounds: Bounds,
    ) -> Result<(), ImgprocError> {
        self.opening3_in_place_with(img, bounds, ExecutionStrategy::default())
    }

    /// [`MorphoState::opening3_in_place`] with an explicit [`ExecutionStrategy`].
    pub fn opening3_in_place_with(
        &mut self,
        img: &mut Grid,
        bounds: Bounds,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        self.run::<Erode, Dilate>(None, img, bounds, strategy)
    }

    /// Closing: dilation followed by erosion, as four separable passes.
    pub fn closing3(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        bounds: Bounds,
    ) -> Result<(), ImgprocError> {
        self.closing3_with(src, dst, bounds, ExecutionStrategy::default())
    }

    /// [`MorphoState::closing3`] with an explicit [`ExecutionStrategy`].
    pub fn closing3_with(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        bounds: Bounds,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        src.check_contains(bounds)?;
        self.run::<Dilate, Erode>(Some(src), dst, bounds, strategy)
    }

    /// Closing computed in place.
    pub fn closing3_in_place(
        &mut self,
        img: &mut Grid,
        bounds: Bounds,
    ) -> Result<(), ImgprocError> {
        self.closing3_in_place_with(img, bounds, ExecutionStrategy::default())
    }

    /// [`MorphoState::closing3_in_place`] with an explicit [`ExecutionStrategy`].
    pub fn closing3_in_place_with(
        &mut self,
        img: &mut Grid,
        bounds: Bounds,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        self.run::<Dilate, Erode>(None, img, bounds, strategy)
    }

    fn run<A: MorphOp, B: MorphOp>(
        &mut self,
        src: Option<&Grid>,
        dst: &mut Grid,
        bounds: Bounds,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        dst.check_contains(bounds)?;
        self.ib.check_contains(bounds)?;
        passes::separable3::<A, B>(
            src,
            dst,
            &mut self.ib,
            &mut self.ib2,
            bounds,
            Layout::Bytes,
            strategy,
        )?;
        Ok(())
    }
}
