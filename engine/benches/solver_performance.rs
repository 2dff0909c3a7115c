//! Criterion benchmarks for the MCCFR solver's throughput.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use oracle_engine::card::Card;
use oracle_engine::ranks::RankTables;
use oracle_engine::solver::Solver;
use std::str::FromStr;
use std::sync::Arc;

fn card(s: &str) -> Card {
    Card::from_str(s).unwrap()
}

fn benchmark_solve_single_iteration(c: &mut Criterion) {
    let tables = Arc::new(RankTables::generate().unwrap());
    let hand_p0 = [card("Ah"), card("Ad")];
    let hand_p1 = [card("Kh"), card("Kd")];
    let board = [card("2c"), card("7d"), card("9s"), card("Tc"), card("3h")];

    c.bench_function("solve_single_iteration", |b| {
        b.iter_batched(
            || Solver::create(hand_p0, hand_p1, board, Arc::clone(&tables)),
            |mut solver| {
                solver.solve(1);
                black_box(solver.info_set_count());
            },
            BatchSize::SmallInput,
        )
    });
}

fn benchmark_solve_300_iterations(c: &mut Criterion) {
    let tables = Arc::new(RankTables::generate().unwrap());
    let hand_p0 = [card("Ah"), card("Ad")];
    let hand_p1 = [card("Kh"), card("Kd")];
    let board = [card("2c"), card("7d"), card("9s"), card("Tc"), card("3h")];

    c.bench_function("solve_300_iterations", |b| {
        b.iter_batched(
            || Solver::create(hand_p0, hand_p1, board, Arc::clone(&tables)),
            |mut solver| {
                solver.solve(300);
                black_box(solver.info_set_count());
            },
            BatchSize::SmallInput,
        )
    });
}

fn benchmark_query_strategy_after_solve(c: &mut Criterion) {
    let tables = Arc::new(RankTables::generate().unwrap());
    let hand_p0 = [card("Ah"), card("Ad")];
    let hand_p1 = [card("Kh"), card("Kd")];
    let board = [card("2c"), card("7d"), card("9s"), card("Tc"), card("3h")];
    let mut solver = Solver::create(hand_p0, hand_p1, board, Arc::clone(&tables));
    solver.solve(300);

    c.bench_function("query_root_strategy", |b| {
        b.iter(|| black_box(solver.root_strategy()))
    });
}

criterion_group!(
    benches,
    benchmark_solve_single_iteration,
    benchmark_solve_300_iterations,
    benchmark_query_strategy_after_solve,
);
criterion_main!(benches);
