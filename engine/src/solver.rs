//! Public `Solver` facade (§4.7, §6). Owns one info-set store exclusively;
//! never shares state with another solver instance.

use crate::betting::{
    action_index, alphabet_size, board_bits_for_street, legal_actions, raises_used, Action,
    BetState, Player, Street, TreeConfig,
};
use crate::card::Card;
use crate::cfr::cfr_recurse;
use crate::infoset::InfoSetStore;
use crate::ranks::RankTables;
use std::sync::Arc;

/// A fixed-deal solver instance: one (hero hand, villain hand, board)
/// triple, one exclusively-owned [`InfoSetStore`] (§3's "Ownership &
/// lifecycle"). The rank tables are shared read-only across every solver
/// running in parallel (§5), hence the `Arc`.
pub struct Solver {
    tables: Arc<RankTables>,
    hand_p0: [Card; 2],
    hand_p1: [Card; 2],
    board: [Card; 5],
    config: TreeConfig,
    store: InfoSetStore,
}

impl Solver {
    /// `create(hand_p0, hand_p1, board, rank_tables)` of §6. The board must
    /// be the complete 5-card runout: each solver instance is fixed-deal
    /// (§1's non-goals rule out in-solver chance sampling), so a caller
    /// holding a partial board must complete it before construction.
    ///
    /// The solver does not validate that `hand_p0`, `hand_p1`, and `board`
    /// are pairwise disjoint — `CardConflict` (§7) is the caller's
    /// responsibility to rule out.
    pub fn create(hand_p0: [Card; 2], hand_p1: [Card; 2], board: [Card; 5], tables: Arc<RankTables>) -> Self {
        let config = TreeConfig::default();
        let store = InfoSetStore::new(alphabet_size(config.n()));
        Solver { tables, hand_p0, hand_p1, board, config, store }
    }

    /// `set_stakes(solver, big_blind, starting_pot_bb, bet_sizes_bb, n)` of
    /// §6. Replaces the tree configuration and, since the action alphabet's
    /// size may change with `bet_sizes_bb.len()`, resets the info-set store
    /// — any strategy accumulated under the old alphabet is no longer
    /// addressable by the new one.
    pub fn set_stakes(&mut self, big_blind: f64, starting_pot_bb: f64, bet_sizes_bb: Vec<f64>) {
        self.config = TreeConfig {
            big_blind,
            starting_pot_bb,
            bet_sizes_bb,
            starting_stack_bb: self.config.starting_stack_bb,
        };
        self.store = InfoSetStore::new(alphabet_size(self.config.n()));
    }

    /// `solve(solver, iterations)` of §6: repeatedly construct the root
    /// InfoSet and invoke the CFR recursion with `r0 = r1 = 1` (§4.6's
    /// "Solve").
    pub fn solve(&mut self, iterations: u32) {
        for _ in 0..iterations {
            let bet_state = self.config.root_bet_state();
            cfr_recurse(
                self.tables.as_ref(),
                self.hand_p0,
                self.hand_p1,
                self.board,
                &self.config,
                &mut self.store,
                Street::Flop,
                Player::P0,
                Vec::new(),
                0,
                bet_state,
                1.0,
                1.0,
                0,
            );
        }
    }

    /// `query_strategy(...)` of §6 (§4.7): rebuild the InfoSet key, look it
    /// up, and normalize its strategy-sum row into a probability
    /// distribution over the full action alphabet. Illegal actions at the
    /// node are masked to zero; if the node was never visited, the uniform
    /// distribution over the *legal* actions is returned.
    pub fn query_strategy(&self, street: Street, player: Player, history: &[Action], bet_state: BetState) -> Vec<f64> {
        let n = self.config.n();
        let mut dist = vec![0.0; alphabet_size(n)];
        let legal = legal_actions(&bet_state, raises_used(history), &self.config);
        if legal.is_empty() {
            return dist;
        }

        let board_bits = board_bits_for_street(&self.board, street);
        match self.store.get(board_bits, street, player.as_index() as u8, history, bet_state) {
            Some(data) => {
                let total: f64 = legal.iter().map(|&a| data.strategy_sum[action_index(a, n)]).sum();
                if total > 0.0 {
                    for &a in &legal {
                        let i = action_index(a, n);
                        dist[i] = data.strategy_sum[i] / total;
                    }
                } else {
                    let uniform = 1.0 / legal.len() as f64;
                    for &a in &legal {
                        dist[action_index(a, n)] = uniform;
                    }
                }
            }
            None => {
                let uniform = 1.0 / legal.len() as f64;
                for &a in &legal {
                    dist[action_index(a, n)] = uniform;
                }
            }
        }
        dist
    }

    /// Strategy at the solve's root decision node (flop, P0 to act, empty
    /// history), the node the driver aggregates across villain-hand samples.
    pub fn root_strategy(&self) -> Vec<f64> {
        self.query_strategy(Street::Flop, Player::P0, &[], self.config.root_bet_state())
    }

    /// `table_size(solver)` of §6, renamed to its Rust-idiomatic form:
    /// the number of distinct info sets visited so far.
    pub fn info_set_count(&self) -> usize {
        self.store.len()
    }

    /// `true` once the info-set store has degraded to bucket reuse under
    /// capacity pressure (§4.4, §7's `CapacityExceeded`).
    pub fn degraded(&self) -> bool {
        self.store.degraded()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tables() -> Arc<RankTables> {
        Arc::new(RankTables::generate().unwrap())
    }

    fn card(s: &str) -> Card {
        Card::from_str(s).unwrap()
    }

    #[test]
    fn query_before_any_solve_is_uniform_over_legal_actions() {
        let t = tables();
        let hand_p0 = [card("Ah"), card("Ad")];
        let hand_p1 = [card("Kh"), card("Kd")];
        let board = [card("2c"), card("7d"), card("9s"), card("Tc"), card("3h")];
        let solver = Solver::create(hand_p0, hand_p1, board, t);

        let dist = solver.root_strategy();
        let legal = legal_actions(&solver.config.root_bet_state(), 0, &solver.config);
        let sum: f64 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for &a in &legal {
            assert!(dist[action_index(a, solver.config.n())] > 0.0);
        }
        for (i, &p) in dist.iter().enumerate() {
            if !legal.iter().any(|&a| action_index(a, solver.config.n()) == i) {
                assert_eq!(p, 0.0);
            }
        }
    }

    #[test]
    fn solving_grows_the_info_set_store_and_normalizes_root_strategy() {
        let t = tables();
        let hand_p0 = [card("Ah"), card("Ad")];
        let hand_p1 = [card("Kh"), card("Kd")];
        let board = [card("2c"), card("7d"), card("9s"), card("Tc"), card("3h")];
        let mut solver = Solver::create(hand_p0, hand_p1, board, t);

        solver.solve(50);
        assert!(solver.info_set_count() > 0);

        let dist = solver.root_strategy();
        let sum: f64 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(dist.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn set_stakes_resets_the_store_for_the_new_alphabet() {
        let t = tables();
        let hand_p0 = [card("Ah"), card("Ad")];
        let hand_p1 = [card("Kh"), card("Kd")];
        let board = [card("2c"), card("7d"), card("9s"), card("Tc"), card("3h")];
        let mut solver = Solver::create(hand_p0, hand_p1, board, t);
        solver.solve(20);
        assert!(solver.info_set_count() > 0);

        solver.set_stakes(1.0, 1.5, vec![0.5, 1.0]);
        assert_eq!(solver.info_set_count(), 0);
        assert_eq!(solver.config().n(), 2);
    }
}
