use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use motion_imgproc::morphology::MorphoState;
use motion_imgproc::parallel::ExecutionStrategy;
use motion_imgproc::pipeline::MotionPipeline;
use motion_imgproc::sigma_delta::{SigmaDeltaConfig, SigmaDeltaState};
use motion_imgproc::{Bounds, Grid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_frames(width: usize, height: usize, count: usize) -> Vec<Grid> {
    let mut rng = StdRng::seed_from_u64(42);
    let bounds = Bounds::from_size(height, width).unwrap();
    (0..count)
        .map(|_| Grid::from_fn(bounds, |_, _| rng.random()).unwrap())
        .collect()
}

fn bench_sigma_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("SigmaDelta");

    // Full HD only
    let (w, h) = (1920, 1080);
    let frames = create_test_frames(w, h, 4);
    let bounds = frames[0].bounds();
    let id = format!("{}x{}", w, h);
    let config = SigmaDeltaConfig::default();

    for (name, strategy) in [
        ("serial", ExecutionStrategy::Serial),
        ("parallel_rows", ExecutionStrategy::ParallelRows),
        ("fixed_4", ExecutionStrategy::Fixed(4)),
    ] {
        group.bench_with_input(
            BenchmarkId::new(format!("compute_{name}"), &id),
            &frames,
            |b, frames| {
                let mut state = SigmaDeltaState::from_config(bounds, &config).unwrap();
                state.init(Some(&frames[0]), bounds).unwrap();
                let mut dst = Grid::new(bounds).unwrap();
                let mut k = 0;
                b.iter(|| {
                    k = (k + 1) % frames.len();
                    state
                        .compute_with(&frames[k], &mut dst, bounds, config.n, strategy)
                        .unwrap();
                })
            },
        );
    }

    // separate stages against the fused pipeline
    group.bench_with_input(
        BenchmarkId::new("sequential_stages", &id),
        &frames,
        |b, frames| {
            let mut state = SigmaDeltaState::from_config(bounds, &config).unwrap();
            state.init(Some(&frames[0]), bounds).unwrap();
            let mut morpho = MorphoState::new(bounds).unwrap();
            let mut mask = Grid::new(bounds).unwrap();
            let mut dst = Grid::new(bounds).unwrap();
            let mut k = 0;
            b.iter(|| {
                k = (k + 1) % frames.len();
                state.compute(&frames[k], &mut mask, bounds, config.n).unwrap();
                morpho.opening3_in_place(&mut mask, bounds).unwrap();
                morpho.closing3(&mask, &mut dst, bounds).unwrap();
            })
        },
    );

    group.bench_with_input(BenchmarkId::new("fused_pipeline", &id), &frames, |b, frames| {
        let mut pipeline = MotionPipeline::new(bounds, config).unwrap();
        pipeline.init(Some(&frames[0])).unwrap();
        let mut dst = Grid::new(bounds).unwrap();
        let mut k = 0;
        b.iter(|| {
            k = (k + 1) % frames.len();
            pipeline.process(&frames[k], &mut dst).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sigma_delta);
criterion_main!(benches);
