//! Benchmark harness for info-set store growth and iteration.
//!
//! Exercises the open-addressed store's insert path across enough distinct
//! keys to trigger several resizes, and measures iteration over the
//! resulting slot layout.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oracle_engine::betting::{alphabet_size, Action, BetState, Street, TreeConfig};
use oracle_engine::infoset::InfoSetStore;

fn populate(n_keys: u64) -> InfoSetStore {
    let config = TreeConfig::new(vec![1.0]);
    let mut store = InfoSetStore::new(alphabet_size(config.n()));
    let bet_state = BetState { pot: 1.5, to_call: 0.0, p0_contrib: 0.75, p1_contrib: 0.75 };
    for board in 0..n_keys {
        store.get_or_create_index(board, Street::Flop, 0, &[Action::Check], bet_state);
    }
    store
}

fn benchmark_store_insertion(c: &mut Criterion) {
    c.bench_function("infoset_store_insert_10k_distinct_keys", |b| {
        b.iter(|| {
            let store = populate(black_box(10_000));
            black_box(store.len())
        })
    });
}

fn benchmark_store_lookup(c: &mut Criterion) {
    let store = populate(10_000);
    let bet_state = BetState { pot: 1.5, to_call: 0.0, p0_contrib: 0.75, p1_contrib: 0.75 };

    c.bench_function("infoset_store_repeated_lookup", |b| {
        b.iter(|| {
            let mut hits = 0u64;
            for board in 0..10_000u64 {
                if store.get(black_box(board), Street::Flop, 0, &[Action::Check], bet_state).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

criterion_group!(benches, benchmark_store_insertion, benchmark_store_lookup);
criterion_main!(benches);
