use motion_imgproc::morphology::MorphoState;
use motion_imgproc::parallel::ExecutionStrategy;
use motion_imgproc::pipeline::{sigma_delta_morpho_fused, MotionPipeline};
use motion_imgproc::sigma_delta::{SigmaDeltaConfig, SigmaDeltaState};
use motion_imgproc::{Bounds, Grid, ImgprocError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_frame(bounds: Bounds, rng: &mut StdRng) -> Grid {
    Grid::from_fn(bounds, |_, _| rng.random()).unwrap()
}

#[test]
fn test_variance_stays_in_range() -> Result<(), ImgprocError> {
    init_logger();
    let bounds = Bounds::new(0, 15, 0, 23);
    let mut rng = StdRng::seed_from_u64(42);
    for (vmin, vmax) in [(1, 254), (20, 40), (9, 9), (0, 255)] {
        let mut state = SigmaDeltaState::new(bounds, vmin, vmax)?;
        state.init(None, bounds)?;
        let mut mask = Grid::new(bounds)?;
        for n in [1, 2, 4, 200] {
            for _ in 0..12 {
                let frame = random_frame(bounds, &mut rng);
                state.compute(&frame, &mut mask, bounds, n)?;
                assert!(state
                    .variance()
                    .as_slice()
                    .iter()
                    .all(|v| (vmin..=vmax).contains(v)));
                assert!(mask.as_slice().iter().all(|&p| p == 0 || p == 255));
            }
        }
    }
    Ok(())
}

#[test]
fn test_mean_reaches_constant_frame() -> Result<(), ImgprocError> {
    let bounds = Bounds::new(0, 7, 0, 7);
    let mut rng = StdRng::seed_from_u64(5);
    let reference = random_frame(bounds, &mut rng);
    let mut state = SigmaDeltaState::new(bounds, 1, 254)?;
    state.init(Some(&reference), bounds)?;

    let c = 128u8;
    let steps = reference
        .as_slice()
        .iter()
        .map(|&m| m.abs_diff(c))
        .max()
        .unwrap_or(0);
    let frame = Grid::from_fn(bounds, |_, _| c)?;
    let mut mask = Grid::new(bounds)?;
    for _ in 0..steps {
        state.compute(&frame, &mut mask, bounds, 2)?;
    }
    assert!(state.mean().as_slice().iter().all(|&m| m == c));
    assert!(state.deviation().as_slice().iter().all(|&o| o == 0));
    Ok(())
}

#[test]
fn test_strategies_agree() -> Result<(), ImgprocError> {
    let bounds = Bounds::new(-4, 35, -4, 43);
    let mut rng = StdRng::seed_from_u64(11);
    let frames = (0..5)
        .map(|_| random_frame(bounds, &mut rng))
        .collect::<Vec<_>>();

    let mut results = Vec::new();
    for strategy in [
        ExecutionStrategy::Serial,
        ExecutionStrategy::ParallelRows,
        ExecutionStrategy::Fixed(2),
    ] {
        let mut state = SigmaDeltaState::new(bounds, 2, 180)?;
        state.init(Some(&frames[0]), bounds)?;
        let mut mask = Grid::new(bounds)?;
        for frame in &frames[1..] {
            state.compute_with(frame, &mut mask, bounds, 3, strategy)?;
        }
        results.push((mask, state.mean().clone(), state.variance().clone()));
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], results[2]);
    Ok(())
}

#[test]
fn test_fused_matches_sequential_on_random_frames() -> Result<(), ImgprocError> {
    init_logger();
    let bounds = Bounds::new(0, 29, 0, 39);
    let mut rng = StdRng::seed_from_u64(2024);
    let background = random_frame(bounds, &mut rng);

    let mut fused_sd = SigmaDeltaState::new(bounds, 1, 254)?;
    let mut sd = SigmaDeltaState::new(bounds, 1, 254)?;
    fused_sd.init(Some(&background), bounds)?;
    sd.init(Some(&background), bounds)?;
    let mut morpho = MorphoState::new(bounds)?;

    let mut tmp1 = Grid::new(bounds)?;
    let mut tmp2 = Grid::new(bounds)?;
    let mut fused = Grid::new(bounds)?;
    let mut mask = Grid::new(bounds)?;
    let mut expected = Grid::new(bounds)?;

    for _ in 0..6 {
        let frame = Grid::from_fn(bounds, |i, j| {
            let jitter: i16 = rng.random_range(-3..=3);
            (background.get(i, j) as i16 + jitter).clamp(0, 255) as u8
        })?;
        sigma_delta_morpho_fused(
            &mut fused_sd,
            &frame,
            &mut fused,
            &mut tmp1,
            &mut tmp2,
            bounds,
            2,
        )?;

        sd.compute(&frame, &mut mask, bounds, 2)?;
        morpho.opening3_in_place(&mut mask, bounds)?;
        morpho.closing3(&mask, &mut expected, bounds)?;
        assert_eq!(fused, expected);
    }
    Ok(())
}

#[test]
fn test_pipeline_tracks_moving_block() -> Result<(), ImgprocError> {
    init_logger();
    let bounds = Bounds::new(0, 31, 0, 31);
    let background = Grid::from_fn(bounds, |_, _| 50)?;
    let mut pipeline = MotionPipeline::new(bounds, SigmaDeltaConfig::default())?
        .with_strategy(ExecutionStrategy::Fixed(2));
    pipeline.init(Some(&background))?;

    let mut mask = Grid::new(bounds)?;
    for t in 0..4 {
        let block = |i: i32, j: i32| (10..18).contains(&i) && (4 + 3 * t..12 + 3 * t).contains(&j);
        let frame = Grid::from_fn(bounds, |i, j| if block(i, j) { 200 } else { 50 })?;
        pipeline.process(&frame, &mut mask)?;

        let expected = Grid::from_fn(bounds, |i, j| if block(i, j) { 255 } else { 0 })?;
        assert_eq!(mask, expected, "frame {t}");
    }
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_config_from_partial_json() {
    let config: SigmaDeltaConfig = serde_json::from_str(r#"{ "n": 3 }"#).unwrap();
    assert_eq!(
        config,
        SigmaDeltaConfig {
            vmin: 1,
            vmax: 254,
            n: 3
        }
    );
    let strategy: ExecutionStrategy = serde_json::from_str(r#"{ "Fixed": 4 }"#).unwrap();
    assert_eq!(strategy, ExecutionStrategy::Fixed(4));
}
