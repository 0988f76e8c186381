//! Sigma-Delta followed by opening and closing, with two scratch grids.
//!
//! The stages alternate between the scratch grids:
//!
//! | stage | operation            | reads  | writes |
//! |-------|----------------------|--------|--------|
//! | 1     | Sigma-Delta          | frame  | tmp1   |
//! | 2     | erosion 1x3          | tmp1   | tmp2   |
//! | 3     | erosion 3x1          | tmp2   | tmp1   |
//! | 4     | dilation 1x3         | tmp1   | tmp2   |
//! | 5     | dilation 3x1         | tmp2   | tmp1   |
//! | 6     | dilation 1x3         | tmp1   | tmp2   |
//! | 7     | dilation 3x1         | tmp2   | tmp1   |
//! | 8     | erosion 1x3          | tmp1   | tmp2   |
//! | 9     | erosion 3x1          | tmp2   | output |
//!
//! Stages 1 and 2 only touch the current row, so they run in the same row task
//! while the row is still hot in cache. Vertical stages read the neighboring
//! rows written by the previous stage and start only once it is complete.

use motion_grid::{Bounds, Grid};

use crate::morphology::ops::{self, Dilate, Erode, MorphOp};
use crate::morphology::passes::{self, Layout};
use crate::parallel::{self, ExecutionStrategy, ParallelError};
use crate::sigma_delta::{sigma_delta_row, SigmaDeltaConfig, SigmaDeltaState};
use crate::ImgprocError;

/// Compute the Sigma-Delta mask of `src`, then its opening, then its closing.
///
/// The result is identical to [`SigmaDeltaState::compute`] followed by
/// [`crate::morphology::MorphoState::opening3`] and
/// [`crate::morphology::MorphoState::closing3`].
///
/// # Arguments
///
/// * `sd` - The Sigma-Delta state, updated with the frame.
/// * `src` - The grayscale frame.
/// * `dst` - The filtered binary mask.
/// * `tmp1` - Scratch grid covering `bounds`.
/// * `tmp2` - Scratch grid covering `bounds`.
/// * `bounds` - The range to process.
/// * `n` - The Sigma-Delta deviation multiplier.
#[allow(clippy::too_many_arguments)]
pub fn sigma_delta_morpho_fused(
    sd: &mut SigmaDeltaState,
    src: &Grid,
    dst: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
    n: u8,
) -> Result<(), ImgprocError> {
    sigma_delta_morpho_fused_with(
        sd,
        src,
        dst,
        tmp1,
        tmp2,
        bounds,
        n,
        ExecutionStrategy::default(),
    )
}

/// [`sigma_delta_morpho_fused`] with an explicit [`ExecutionStrategy`].
#[allow(clippy::too_many_arguments)]
pub fn sigma_delta_morpho_fused_with(
    sd: &mut SigmaDeltaState,
    src: &Grid,
    dst: &mut Grid,
    tmp1: &mut Grid,
    tmp2: &mut Grid,
    bounds: Bounds,
    n: u8,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    sd.check_frame(src, dst, bounds)?;
    tmp1.check_contains(bounds)?;
    tmp2.check_contains(bounds)?;

    let (vmin, vmax) = (sd.vmin(), sd.vmax());
    let rows = src
        .rows_span(bounds)
        .zip(tmp1.rows_span_mut(bounds))
        .zip(tmp2.rows_span_mut(bounds))
        .zip(sd.state_rows(bounds))
        .collect::<Vec<_>>();
    parallel::for_each_row(strategy, rows, |(((s, t1), t2), (m, o, v))| {
        sigma_delta_row(s, t1, m, o, v, n, vmin, vmax);
        ops::horizontal_row::<Erode>(t1, t2);
    })?;

    passes::vertical_pass::<Erode>(tmp2, tmp1, bounds, strategy)?;
    // tmp1 holds the opening after this one
    half_pass::<Dilate>(tmp1, tmp2, bounds, strategy)?;
    half_pass::<Dilate>(tmp1, tmp2, bounds, strategy)?;
    passes::horizontal_pass(
        tmp1,
        tmp2,
        bounds,
        Layout::Bytes.horizontal::<Erode>(),
        strategy,
    )?;
    passes::vertical_pass::<Erode>(tmp2, dst, bounds, strategy)?;
    Ok(())
}

/// Horizontal then vertical pass of `O`, leaving the result in `a`.
fn half_pass<O: MorphOp>(
    a: &mut Grid,
    b: &mut Grid,
    bounds: Bounds,
    strategy: ExecutionStrategy,
) -> Result<(), ParallelError> {
    passes::horizontal_pass(a, b, bounds, Layout::Bytes.horizontal::<O>(), strategy)?;
    passes::vertical_pass::<O>(b, a, bounds, strategy)
}

/// A Sigma-Delta state bundled with the scratch grids of the fused pipeline.
///
/// # Examples
///
/// ```
/// use motion_imgproc::{Bounds, Grid};
/// use motion_imgproc::pipeline::MotionPipeline;
/// use motion_imgproc::sigma_delta::SigmaDeltaConfig;
///
/// let bounds = Bounds::new(0, 15, 0, 15);
/// let background = Grid::from_fn(bounds, |_, _| 40).unwrap();
///
/// let mut pipeline = MotionPipeline::new(bounds, SigmaDeltaConfig::default()).unwrap();
/// pipeline.init(Some(&background)).unwrap();
///
/// // a bright 5x5 object appears in the middle of the frame
/// let frame = Grid::from_fn(bounds, |i, j| {
///     if (5..10).contains(&i) && (5..10).contains(&j) { 220 } else { 40 }
/// })
/// .unwrap();
/// let mut mask = Grid::new(bounds).unwrap();
/// pipeline.process(&frame, &mut mask).unwrap();
///
/// assert_eq!(mask.get(7, 7), 255);
/// assert_eq!(mask.get(0, 0), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MotionPipeline {
    config: SigmaDeltaConfig,
    strategy: ExecutionStrategy,
    sigma_delta: SigmaDeltaState,
    tmp1: Grid,
    tmp2: Grid,
}

impl MotionPipeline {
    /// Allocate the pipeline for frames covering `bounds`.
    pub fn new(bounds: Bounds, config: SigmaDeltaConfig) -> Result<Self, ImgprocError> {
        config.validate()?;
        let sigma_delta = SigmaDeltaState::from_config(bounds, &config)?;
        let tmp1 = Grid::new(bounds)?;
        let tmp2 = Grid::new(bounds)?;
        Ok(Self {
            config,
            strategy: ExecutionStrategy::default(),
            sigma_delta,
            tmp1,
            tmp2,
        })
    }

    /// Use `strategy` to schedule the rows of every stage.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Seed the Sigma-Delta state and clear the scratch grids.
    pub fn init(&mut self, reference: Option<&Grid>) -> Result<(), ImgprocError> {
        let bounds = self.bounds();
        self.sigma_delta.init(reference, bounds)?;
        self.tmp1.zero();
        self.tmp2.zero();
        Ok(())
    }

    /// Process one frame into a filtered motion mask.
    pub fn process(&mut self, src: &Grid, dst: &mut Grid) -> Result<(), ImgprocError> {
        let bounds = self.bounds();
        log::trace!("processing frame over {bounds} with {:?}", self.strategy);
        sigma_delta_morpho_fused_with(
            &mut self.sigma_delta,
            src,
            dst,
            &mut self.tmp1,
            &mut self.tmp2,
            bounds,
            self.config.n,
            self.strategy,
        )
    }

    /// The frame range of the pipeline.
    pub fn bounds(&self) -> Bounds {
        self.sigma_delta.bounds()
    }

    /// The Sigma-Delta parameters.
    pub fn config(&self) -> &SigmaDeltaConfig {
        &self.config
    }

    /// The execution strategy.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// The Sigma-Delta state.
    pub fn sigma_delta(&self) -> &SigmaDeltaState {
        &self.sigma_delta
    }
}
