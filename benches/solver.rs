//! Benchmarks for the cube solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cubelets::geometry::SliceName;
use cubelets::{scramble, AnimationConfig, Cube, Direction, Headless, MoveExecutor, Solver};

fn executor() -> MoveExecutor<Headless> {
    MoveExecutor::new(Cube::solved(), Headless, AnimationConfig::instant())
}

/// Benchmark scrambling and solving a fresh cube.
fn bench_scramble_and_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver");
    group.sample_size(20);
    group.bench_function("scramble_and_solve", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        b.iter(|| {
            let mut executor = executor();
            scramble(&mut executor, &mut rng).unwrap();
            black_box(Solver::new(&mut executor).solve().unwrap())
        })
    });
    group.finish();
}

/// Benchmark a single instant quarter turn.
fn bench_rotate_slice(c: &mut Criterion) {
    let mut executor = executor();

    c.bench_function("rotate_slice", |b| {
        b.iter(|| {
            executor
                .rotate_slice(black_box(SliceName::Vertical), Direction::Clockwise)
                .unwrap()
        })
    });
}

/// Benchmark the full-correctness query on a scrambled cube.
fn bench_is_solved(c: &mut Criterion) {
    let mut executor = executor();
    scramble(&mut executor, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
    let cube = executor.cube();

    c.bench_function("is_solved", |b| b.iter(|| black_box(cube).is_solved().unwrap()));
}

criterion_group!(
    benches,
    bench_scramble_and_solve,
    bench_rotate_slice,
    bench_is_solved
);
criterion_main!(benches);
