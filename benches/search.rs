//! Move generation and search benchmarks.
//!
//! Run with: `cargo bench --bench search`
//!
//! These benchmarks measure:
//! - Move application and legal-move enumeration on the bit boards
//! - Full search batches with varying iteration counts
//! - Search from the opening and from a midgame position

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use uttt::{Budget, EngineConfig, GameState, Move, MCTS};

/// Position after a short, fixed opening sequence.
fn midgame() -> GameState {
    let mut state = GameState::new();
    let line = [
        (4, 4), (4, 0), (0, 4), (4, 8), (8, 4), (4, 2),
        (2, 4), (4, 6), (6, 4), (4, 1), (1, 4), (3, 3),
    ];
    for &(sub, cell) in &line {
        state.make_move(Move::new(sub, cell));
    }
    state
}

fn bench_board(c: &mut Criterion) {
    let mut group = c.benchmark_group("board");
    let opening = GameState::new();
    let middle = midgame();

    group.bench_function("legal_moves_opening", |b| {
        let mut moves = Vec::with_capacity(81);
        b.iter(|| {
            moves.clear();
            black_box(&opening).legal_moves_into(opening.forced_sub(), &mut moves);
            black_box(moves.len())
        });
    });

    group.bench_function("legal_move_count_midgame", |b| {
        b.iter(|| black_box(&middle).legal_move_count(middle.forced_sub()));
    });

    group.bench_function("duplicate_and_apply", |b| {
        let mut scratch = GameState::new();
        let mv = middle.legal_moves()[0];
        b.iter(|| {
            scratch.duplicate(black_box(&middle));
            black_box(scratch.make_move(mv))
        });
    });

    group.finish();
}

fn bench_search_iterations(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_iterations");
    group.sample_size(20);

    for iterations in [100u64, 1_000, 5_000] {
        group.throughput(Throughput::Elements(iterations));
        for (name, state) in [("opening", GameState::new()), ("midgame", midgame())] {
            group.bench_with_input(BenchmarkId::new(name, iterations), &iterations, |b, &n| {
                let config = EngineConfig::default()
                    .with_arena_capacity(2_000_000)
                    .with_seed(Some(42));
                b.iter_batched_ref(
                    || MCTS::new(config.clone()),
                    |engine| {
                        let stats = engine.search(&state, Budget::Iterations(n));
                        black_box((stats, engine.best_move(&state)))
                    },
                    BatchSize::PerIteration,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_board, bench_search_iterations);
criterion_main!(benches);
