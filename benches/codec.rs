//! Benchmarks for frame analysis and the container codec.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

use levelshift::{
    animation::{AnimationPlayer, AnimationRecorder, analyze_sequence},
    compute::analyze,
    schema::{Asset, Cell, Grid},
};

/// Grids where each frame changes roughly `churn` of the cells of the one
/// before it, drawn from a small alphabet so runs and fills occur.
fn synthetic_frames(width: usize, height: usize, frames: usize, churn: f64) -> Vec<(u16, Grid)> {
    let mut rng = StdRng::seed_from_u64(42);
    let random_cell = |rng: &mut StdRng| {
        Cell::new(
            rng.gen_range(0..4),
            rng.gen_range(0..4),
            0,
            rng.gen_range(b'A'..b'E'),
        )
    };

    let mut grid = Grid::filled(width, height, Cell::new(0, 1, 0, b' '));
    let mut out = Vec::with_capacity(frames);
    for _ in 0..frames {
        for cell in grid.cells_mut() {
            if rng.gen_bool(churn) {
                *cell = random_cell(&mut rng);
            }
        }
        out.push((1, grid.clone()));
    }
    out
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_frame");

    for churn in [0.01, 0.1, 0.5] {
        let frames = synthetic_frames(80, 50, 2, churn);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("churn_{}", churn)),
            &frames,
            |b, frames| {
                b.iter(|| analyze(black_box(&frames[1].1), Some(&frames[0].1)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_sequence");
    let frames = synthetic_frames(80, 50, 64, 0.05);

    group.bench_function("sequential", |b| {
        b.iter(|| {
            let mut recorder = AnimationRecorder::new(80, 50, 0);
            for (duration, grid) in &frames {
                recorder.record_frame(*duration, grid).unwrap();
            }
            recorder.finish()
        });
    });

    group.bench_function("parallel", |b| {
        b.iter(|| analyze_sequence(80, 50, 0, black_box(&frames)).unwrap());
    });

    group.finish();
}

fn bench_container(c: &mut Criterion) {
    let mut group = c.benchmark_group("container");
    let frames = synthetic_frames(80, 50, 64, 0.05);
    let (animation, _) = analyze_sequence(80, 50, 0, &frames).unwrap();
    let asset = Asset::new(None, None, vec![animation]);
    let bytes = asset.encode().unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(&asset).encode().unwrap());
    });

    group.bench_function("decode", |b| {
        b.iter(|| Asset::decode(black_box(&bytes)).unwrap());
    });

    group.bench_function("playback", |b| {
        b.iter(|| {
            let mut player = AnimationPlayer::new(&asset.animations[0]);
            while player.next_frame().unwrap().is_some() {}
            black_box(player.grid().len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_record, bench_container);
criterion_main!(benches);
