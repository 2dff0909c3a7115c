//! `oracle` — the heads-up postflop solver driver (§6).
//!
//! Takes a small-blind range and a big-blind range, solves a sample of
//! concrete (hero, villain, board) deals drawn from them, and prints each
//! hero hand category's aggregated root strategy.

use clap::Parser;
use log::{info, warn};
use oracle_engine::betting::{alphabet_size, TreeConfig};
use oracle_engine::card::{parse_board, Card};
use oracle_engine::error::SolverError;
use oracle_engine::range::{Range, RangeEntry};
use oracle_engine::ranks::RankTables;
use oracle_engine::solver::Solver;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

/// Fixed default seed (§9's RNG open question): default invocations are
/// reproducible without the caller having to think about seeding.
const DEFAULT_SEED: u64 = 0x0AC1_E5EED;

const TABLE_SEARCH_PATHS: [&str; 2] = ["output/handranks.dat", "handranks.dat"];

#[derive(Parser, Debug)]
#[command(name = "oracle")]
#[command(about = "Heads-up postflop MCCFR solver driver")]
struct Args {
    /// Small-blind hole-card range, e.g. "QQ+,AKs".
    sb_range: String,

    /// Big-blind hole-card range.
    bb_range: String,

    /// Optional board: a concatenation of 2-char card tokens (0, 3, 4, or 5
    /// cards). Missing cards are sampled at random per deal.
    board: Option<String>,

    /// Accepted for compatibility with the historical positional contract;
    /// this build implements no GUI and refuses to run with it set.
    #[arg(long)]
    gui: bool,

    #[arg(long, default_value_t = 300)]
    iterations: u32,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Comma-separated bet/raise sizes, in big blinds.
    #[arg(long, default_value = "1.0")]
    bet_sizes: String,

    /// Villain hands sampled per small-blind hand category.
    #[arg(long, default_value_t = 6)]
    samples: usize,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.gui {
        eprintln!("oracle: --gui is not supported by this build (no GUI is implemented)");
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("oracle: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let tables = Arc::new(load_or_generate_tables()?);

    let bet_sizes = parse_bet_sizes(&args.bet_sizes)?;
    let config = TreeConfig {
        big_blind: 1.0,
        starting_pot_bb: 1.5,
        bet_sizes_bb: bet_sizes,
        starting_stack_bb: 100.0,
    };

    let given_board = parse_board(args.board.as_deref().unwrap_or(""))?;

    let sb_range = Range::parse(&args.sb_range);
    let bb_range = Range::parse(&args.bb_range);
    if sb_range.is_empty() {
        return Err(format!("small-blind range {:?} contains no combos", args.sb_range).into());
    }
    if bb_range.is_empty() {
        return Err(format!("big-blind range {:?} contains no combos", args.bb_range).into());
    }

    let categories = group_by_category(sb_range.combos());
    info!(
        "solving {} hero categories x {} villain samples, {} iterations each",
        categories.len(),
        args.samples,
        args.iterations
    );

    let mut results: Vec<(String, usize, Vec<f64>)> = categories
        .into_par_iter()
        .map(|(label, combos)| {
            let hero = combos[0].cards;
            let mut rng = StdRng::seed_from_u64(args.seed ^ label_seed(&label));
            let deals = sample_deals(&bb_range, &given_board, hero, args.samples, &mut rng);
            if deals.is_empty() {
                warn!("category {label}: no conflict-free villain/board samples found, skipping");
                return (label, 0, vec![0.0; alphabet_size(config.n())]);
            }

            let mut acc = vec![0.0; alphabet_size(config.n())];
            for (villain, board) in &deals {
                let mut solver = Solver::create([hero.0, hero.1], [villain.0, villain.1], *board, Arc::clone(&tables));
                solver.set_stakes(config.big_blind, config.starting_pot_bb, config.bet_sizes_bb.clone());
                solver.solve(args.iterations);
                let strategy = solver.root_strategy();
                for (a, s) in acc.iter_mut().zip(strategy.iter()) {
                    *a += s;
                }
            }
            let n = deals.len() as f64;
            for a in acc.iter_mut() {
                *a /= n;
            }
            (label, deals.len(), acc)
        })
        .collect();

    results.sort_by(|a, b| a.0.cmp(&b.0));
    print_results(&config, &results);
    Ok(())
}

fn load_or_generate_tables() -> Result<RankTables, SolverError> {
    for candidate in TABLE_SEARCH_PATHS {
        if Path::new(candidate).exists() {
            info!("loading rank tables from {candidate}");
            return RankTables::load_from_file(candidate);
        }
    }
    info!("no rank table file found at {TABLE_SEARCH_PATHS:?}; generating tables in-process");
    RankTables::generate()
}

fn parse_bet_sizes(s: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    let sizes: Result<Vec<f64>, _> = s.split(',').map(str::trim).filter(|t| !t.is_empty()).map(|t| t.parse::<f64>()).collect();
    let sizes = sizes.map_err(|_| format!("invalid --bet-sizes list {s:?}"))?;
    if sizes.is_empty() || sizes.len() > 4 {
        return Err(format!("--bet-sizes must list 1 to 4 sizes, got {s:?}").into());
    }
    Ok(sizes)
}

/// Group a range's combos by their hand-category label ("AA", "AKs", "AKo",
/// ...), keeping one representative combo per category to solve from (the
/// per-category aggregate strategy is reported for that representative).
fn group_by_category(combos: &[RangeEntry]) -> Vec<(String, Vec<RangeEntry>)> {
    let mut groups: BTreeMap<String, Vec<RangeEntry>> = BTreeMap::new();
    for &entry in combos {
        groups.entry(category_label(&entry)).or_default().push(entry);
    }
    groups.into_iter().collect()
}

fn category_label(entry: &RangeEntry) -> String {
    let (c0, c1) = entry.cards;
    let rank_char = |c: Card| c.to_string().chars().next().unwrap();
    if c0.rank() == c1.rank() {
        let r = rank_char(c0);
        return format!("{r}{r}");
    }
    let (hi, lo) = if c0.rank() > c1.rank() { (c0, c1) } else { (c1, c0) };
    let suited = if hi.suit() == lo.suit() { 's' } else { 'o' };
    format!("{}{}{}", rank_char(hi), rank_char(lo), suited)
}

/// A stable per-category seed offset so different categories draw
/// independent-looking but still-reproducible samples from the shared
/// `--seed`.
fn label_seed(label: &str) -> u64 {
    label.bytes().fold(0u64, |acc, b| acc.wrapping_mul(131).wrapping_add(b as u64))
}

/// Draw up to `n` conflict-free (villain hand, full board) deals: a villain
/// combo from `bb_range` disjoint from the hero's hole cards, and the given
/// partial board completed with uniformly sampled remaining cards disjoint
/// from every card already in play (§7's `CardConflict` is the driver's
/// responsibility to rule out before constructing a [`Solver`]).
fn sample_deals(
    bb_range: &Range,
    given_board: &[Card],
    hero: (Card, Card),
    n: usize,
    rng: &mut StdRng,
) -> Vec<((Card, Card), [Card; 5])> {
    let mut deck: Vec<Card> = (0..52u8).map(Card::new).collect();
    let mut deals = Vec::with_capacity(n);
    let mut attempts = 0;
    while deals.len() < n && attempts < n * 20 + 50 {
        attempts += 1;
        let villain = match bb_range.combos().choose(rng) {
            Some(e) => e.cards,
            None => break,
        };
        let mut hero_and_board: Vec<Card> = vec![hero.0, hero.1];
        hero_and_board.extend_from_slice(given_board);
        if Range::combo_conflicts(&RangeEntry { cards: villain, weight: 1.0 }, &hero_and_board) {
            continue;
        }

        let mut dead = hero_and_board;
        dead.push(villain.0);
        dead.push(villain.1);

        deck.shuffle(rng);
        let mut board = [given_board.first().copied(), given_board.get(1).copied(), given_board.get(2).copied(), given_board.get(3).copied(), given_board.get(4).copied()];
        let mut fill = deck.iter().filter(|c| !dead.contains(c));
        for slot in board.iter_mut() {
            if slot.is_none() {
                match fill.next() {
                    Some(&c) => *slot = Some(c),
                    None => break,
                }
            }
        }
        if let [Some(a), Some(b), Some(c), Some(d), Some(e)] = board {
            deals.push((villain, [a, b, c, d, e]));
        }
    }
    deals
}

fn print_results(config: &TreeConfig, results: &[(String, usize, Vec<f64>)]) {
    let n = config.n();
    print!("{:<6}{:>8}", "hand", "samples");
    print!("{:>10}", "CHECK");
    for i in 0..n {
        print!("{:>10}", format!("BET_{i}"));
    }
    print!("{:>10}", "FOLD");
    print!("{:>10}", "CALL");
    for i in 0..n {
        print!("{:>10}", format!("RAISE_{i}"));
    }
    println!();

    for (label, samples, strategy) in results {
        print!("{label:<6}{samples:>8}");
        for p in strategy {
            print!("{:>10.4}", p);
        }
        println!();
    }
}
