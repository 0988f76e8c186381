//! Sigma-Delta background estimation.
//!
//! Every pixel keeps a background estimate `M` and an adaptive threshold `V`.
//! Both move by at most one unit per frame toward their target, which makes
//! the filter cheap and robust to slow illumination changes. A pixel is
//! reported as moving when its deviation from `M` reaches `V`.

use std::cmp::Ordering;

use motion_grid::{Bounds, Grid};

use crate::parallel::{self, ExecutionStrategy};
use crate::ImgprocError;

/// Parameters of the Sigma-Delta filter.
///
/// # Examples
///
/// ```
/// use motion_imgproc::sigma_delta::SigmaDeltaConfig;
///
/// let config = SigmaDeltaConfig { n: 4, ..Default::default() };
/// assert_eq!(config.vmin, 1);
/// assert_eq!(config.vmax, 254);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SigmaDeltaConfig {
    /// Lower clamp limit of the threshold `V`.
    pub vmin: u8,
    /// Upper clamp limit of the threshold `V`.
    pub vmax: u8,
    /// Multiplier applied to the deviation before it drives `V`.
    pub n: u8,
}

impl Default for SigmaDeltaConfig {
    fn default() -> Self {
        Self {
            vmin: 1,
            vmax: 254,
            n: 2,
        }
    }
}

impl SigmaDeltaConfig {
    /// Check that `vmin <= vmax`.
    pub fn validate(&self) -> Result<(), ImgprocError> {
        if self.vmin > self.vmax {
            return Err(ImgprocError::InvalidThresholdRange {
                vmin: self.vmin,
                vmax: self.vmax,
            });
        }
        Ok(())
    }
}

#[inline(always)]
fn step_toward(value: u8, target: u8) -> u8 {
    match value.cmp(&target) {
        Ordering::Less => value + 1,
        Ordering::Greater => value - 1,
        Ordering::Equal => value,
    }
}

/// Advance the Sigma-Delta recurrence of a single pixel.
///
/// Updates the background estimate `m`, the deviation `o` and the threshold
/// `v` for the new `sample`, and returns the binary output: `255` when the
/// deviation reaches the threshold, `0` otherwise. `v` stays in `[vmin, vmax]`.
///
/// # Examples
///
/// ```
/// use motion_imgproc::sigma_delta::sigma_delta_step;
///
/// let (mut m, mut o, mut v) = (100, 0, 1);
/// let out = sigma_delta_step(&mut m, &mut o, &mut v, 110, 2, 1, 254);
///
/// assert_eq!((m, o, v, out), (101, 9, 2, 255));
/// ```
#[inline(always)]
pub fn sigma_delta_step(
    m: &mut u8,
    o: &mut u8,
    v: &mut u8,
    sample: u8,
    n: u8,
    vmin: u8,
    vmax: u8,
) -> u8 {
    *m = step_toward(*m, sample);
    *o = m.abs_diff(sample);
    *v = step_toward(*v, o.saturating_mul(n)).clamp(vmin, vmax);
    if *o >= *v {
        255
    } else {
        0
    }
}

/// Sigma-Delta over one row span. All slices have the same length.
#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn sigma_delta_row(
    src: &[u8],
    dst: &mut [u8],
    m: &mut [u8],
    o: &mut [u8],
    v: &mut [u8],
    n: u8,
    vmin: u8,
    vmax: u8,
) {
    debug_assert!(src.len() == dst.len() && m.len() == dst.len());
    dst.iter_mut()
        .zip(src)
        .zip(m.iter_mut().zip(o.iter_mut()).zip(v.iter_mut()))
        .for_each(|((out, &sample), ((m, o), v))| {
            *out = sigma_delta_step(m, o, v, sample, n, vmin, vmax);
        });
}

/// Mutable rows of the three state grids.
pub(crate) type StateRows<'a> = (&'a mut [u8], &'a mut [u8], &'a mut [u8]);

/// Persistent per-pixel state of the Sigma-Delta filter.
///
/// # Examples
///
/// ```
/// use motion_imgproc::{Bounds, Grid};
/// use motion_imgproc::sigma_delta::SigmaDeltaState;
///
/// let bounds = Bounds::new(0, 1, 0, 3);
/// let background = Grid::from_fn(bounds, |_, _| 50).unwrap();
///
/// let mut state = SigmaDeltaState::new(bounds, 1, 254).unwrap();
/// state.init(Some(&background), bounds).unwrap();
///
/// let frame = Grid::from_fn(bounds, |_, j| if j == 0 { 200 } else { 50 }).unwrap();
/// let mut mask = Grid::new(bounds).unwrap();
/// state.compute(&frame, &mut mask, bounds, 2).unwrap();
///
/// assert_eq!(mask.row(0), &[255, 0, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct SigmaDeltaState {
    bounds: Bounds,
    vmin: u8,
    vmax: u8,
    m: Grid,
    o: Grid,
    v: Grid,
}

impl SigmaDeltaState {
    /// Allocate the state grids for `bounds`.
    ///
    /// The grids start as after [`SigmaDeltaState::init`] without a reference:
    /// `M` at `vmax`, `V` at `vmin` and `O` at zero. `vmin == vmax` gives a
    /// constant threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ImgprocError::InvalidThresholdRange`] when `vmin > vmax`, or a
    /// grid error when the bounds are empty or allocation fails.
    pub fn new(bounds: Bounds, vmin: u8, vmax: u8) -> Result<Self, ImgprocError> {
        if vmin > vmax {
            return Err(ImgprocError::InvalidThresholdRange { vmin, vmax });
        }
        let mut m = Grid::new(bounds)?;
        let o = Grid::new(bounds)?;
        let mut v = Grid::new(bounds)?;
        m.fill(vmax);
        v.fill(vmin);
        log::debug!("allocated sigma-delta state for {bounds} with V in [{vmin}, {vmax}]");
        Ok(Self {
            bounds,
            vmin,
            vmax,
            m,
            o,
            v,
        })
    }

    /// Allocate the state with the clamp limits of `config`.
    pub fn from_config(bounds: Bounds, config: &SigmaDeltaConfig) -> Result<Self, ImgprocError> {
        Self::new(bounds, config.vmin, config.vmax)
    }

    /// Seed the state over `bounds`.
    ///
    /// `M` is copied from `reference` when given and set to `vmax` otherwise.
    /// `V` is set to `vmin` and `O` to zero.
    pub fn init(&mut self, reference: Option<&Grid>, bounds: Bounds) -> Result<(), ImgprocError> {
        self.m.check_contains(bounds)?;
        match reference {
            Some(reference) => self.m.copy_from(reference, bounds)?,
            None => self.m.rows_span_mut(bounds).for_each(|row| row.fill(self.vmax)),
        }
        let vmin = self.vmin;
        self.v.rows_span_mut(bounds).for_each(|row| row.fill(vmin));
        self.o.rows_span_mut(bounds).for_each(|row| row.fill(0));
        log::debug!(
            "initialized sigma-delta state over {bounds} from {}",
            if reference.is_some() { "a reference frame" } else { "vmax" }
        );
        Ok(())
    }

    /// Process one frame and write the binary motion mask.
    ///
    /// # Arguments
    ///
    /// * `src` - The grayscale frame.
    /// * `dst` - The output mask, `255` for moving pixels and `0` otherwise.
    /// * `bounds` - The range to process. It must lie inside the state bounds
    ///   and inside both images.
    /// * `n` - Multiplier applied to the deviation before it drives `V`.
    pub fn compute(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        bounds: Bounds,
        n: u8,
    ) -> Result<(), ImgprocError> {
        self.compute_with(src, dst, bounds, n, ExecutionStrategy::default())
    }

    /// [`SigmaDeltaState::compute`] with an explicit [`ExecutionStrategy`].
    pub fn compute_with(
        &mut self,
        src: &Grid,
        dst: &mut Grid,
        bounds: Bounds,
        n: u8,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        self.check_frame(src, dst, bounds)?;
        let (vmin, vmax) = (self.vmin, self.vmax);
        let rows = src
            .rows_span(bounds)
            .zip(dst.rows_span_mut(bounds))
            .zip(self.state_rows(bounds))
            .collect::<Vec<_>>();
        parallel::for_each_row(strategy, rows, |((s, d), (m, o, v))| {
            sigma_delta_row(s, d, m, o, v, n, vmin, vmax);
        })?;
        Ok(())
    }

    pub(crate) fn check_frame(
        &self,
        src: &Grid,
        dst: &Grid,
        bounds: Bounds,
    ) -> Result<(), ImgprocError> {
        self.m.check_contains(bounds)?;
        src.check_contains(bounds)?;
        dst.check_contains(bounds)?;
        Ok(())
    }

    /// Rows of `M`, `O` and `V` covered by `bounds`.
    pub(crate) fn state_rows(
        &mut self,
        bounds: Bounds,
    ) -> impl Iterator<Item = StateRows<'_>> + '_ {
        self.m
            .rows_span_mut(bounds)
            .zip(self.o.rows_span_mut(bounds))
            .zip(self.v.rows_span_mut(bounds))
            .map(|((m, o), v)| (m, o, v))
    }

    /// The range the state was allocated with.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Lower clamp limit of `V`.
    pub fn vmin(&self) -> u8 {
        self.vmin
    }

    /// Upper clamp limit of `V`.
    pub fn vmax(&self) -> u8 {
        self.vmax
    }

    /// The background estimate `M`.
    pub fn mean(&self) -> &Grid {
        &self.m
    }

    /// The deviation `O = |M - I|` of the last processed frame.
    pub fn deviation(&self) -> &Grid {
        &self.o
    }

    /// The adaptive threshold `V`.
    pub fn variance(&self) -> &Grid {
        &self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_moves_one_unit() {
        let (mut m, mut o, mut v) = (50u8, 0u8, 1u8);
        let out = sigma_delta_step(&mut m, &mut o, &mut v, 40, 2, 1, 254);
        assert_eq!((m, o, v, out), (49, 9, 2, 255));

        let out = sigma_delta_step(&mut m, &mut o, &mut v, 49, 2, 1, 254);
        assert_eq!((m, o, v, out), (49, 0, 1, 0));
    }

    #[test]
    fn test_step_saturates_target() {
        let (mut m, mut o, mut v) = (0u8, 0u8, 254u8);
        let out = sigma_delta_step(&mut m, &mut o, &mut v, 255, 2, 1, 254);
        assert_eq!((m, o, v, out), (1, 254, 254, 255));
    }

    #[test]
    fn test_step_constant_threshold() {
        let (mut m, mut o, mut v) = (10u8, 0u8, 7u8);
        for sample in [200, 0, 255, 10, 10] {
            sigma_delta_step(&mut m, &mut o, &mut v, sample, 4, 7, 7);
            assert_eq!(v, 7);
        }
    }

    #[test]
    fn test_invalid_threshold_range() {
        let res = SigmaDeltaState::new(Bounds::new(0, 1, 0, 1), 10, 9);
        assert!(matches!(
            res,
            Err(ImgprocError::InvalidThresholdRange { vmin: 10, vmax: 9 })
        ));
        let config = SigmaDeltaConfig {
            vmin: 3,
            vmax: 2,
            n: 2,
        };
        assert!(config.validate().is_err());
        assert!(SigmaDeltaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_new_state_in_range() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(-1, 2, 0, 4);
        let state = SigmaDeltaState::new(bounds, 12, 90)?;
        assert!(state.variance().as_slice().iter().all(|&v| v == 12));
        assert!(state.mean().as_slice().iter().all(|&m| m == 90));
        assert!(state.deviation().as_slice().iter().all(|&o| o == 0));
        Ok(())
    }

    #[test]
    fn test_init_without_reference() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(0, 2, 0, 2);
        let mut state = SigmaDeltaState::new(bounds, 3, 200)?;
        state.init(None, bounds)?;
        assert!(state.mean().as_slice().iter().all(|&m| m == 200));
        assert!(state.variance().as_slice().iter().all(|&v| v == 3));
        Ok(())
    }

    #[test]
    fn test_convergence_on_constant_frame() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(0, 3, 0, 5);
        let mut state = SigmaDeltaState::new(bounds, 1, 254)?;
        let reference = Grid::from_fn(bounds, |_, _| 10)?;
        state.init(Some(&reference), bounds)?;

        let frame = Grid::from_fn(bounds, |_, _| 30)?;
        let mut mask = Grid::new(bounds)?;
        for _ in 0..20 {
            state.compute_with(&frame, &mut mask, bounds, 2, ExecutionStrategy::Serial)?;
        }
        assert!(state.mean().as_slice().iter().all(|&m| m == 30));
        assert!(state.deviation().as_slice().iter().all(|&o| o == 0));

        for _ in 0..254 {
            state.compute(&frame, &mut mask, bounds, 2)?;
        }
        assert!(state.variance().as_slice().iter().all(|&v| v == 1));
        assert!(mask.as_slice().iter().all(|&p| p == 0));
        Ok(())
    }

    #[test]
    fn test_compute_sub_bounds_leaves_rest() -> Result<(), ImgprocError> {
        let bounds = Bounds::new(0, 3, 0, 3);
        let inner = Bounds::new(1, 2, 1, 2);
        let mut state = SigmaDeltaState::new(bounds, 1, 254)?;
        state.init(None, bounds)?;
        let frame = Grid::new(bounds)?;
        let mut mask = Grid::new(bounds)?;
        state.compute(&frame, &mut mask, inner, 2)?;
        assert_eq!(state.mean().get(0, 0), 254);
        assert_eq!(state.mean().get(1, 1), 253);
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(2, 2), 255);
        Ok(())
    }
}
