//! Vanilla CFR recursion over the betting tree (§4.6).
//!
//! Walks the tree directly by recursive descent — there is no materialized
//! graph to traverse, since each solver instance is fixed-deal and has no
//! internal chance nodes (§5). `regret_match` is a free function exercised
//! both by the recursion below and, standalone, by the rock-paper-scissors
//! convergence test of §8 that has nothing to do with a poker tree at all.

use crate::betting::{
    action_index, advances_street, apply_action, board_bits_for_street, is_double_check,
    is_immediately_terminal, legal_actions, payoff_fold, payoff_showdown, Action, BetState, Player,
    Street, TreeConfig,
};
use crate::card::Card;
use crate::evaluator;
use crate::infoset::InfoSetStore;
use crate::ranks::RankTables;

/// Recursion depth safety bound (§4.6).
pub const DEPTH_CAP: u32 = 20;
/// Reach-probability floor below which a subtree is pruned as negligible
/// (§4.6).
pub const REACH_EPS: f64 = 1e-10;

/// `σ(a) = max(0, regret(a)) / Σ_b max(0, regret(b))`; uniform if the
/// denominator is zero. The same routine the poker recursion calls and the
/// standalone RPS test below exercises directly.
pub fn regret_match(regrets: &[f64]) -> Vec<f64> {
    let pos_sum: f64 = regrets.iter().map(|&r| r.max(0.0)).sum();
    let n = regrets.len();
    if pos_sum <= 0.0 {
        vec![1.0 / n as f64; n]
    } else {
        regrets.iter().map(|&r| r.max(0.0) / pos_sum).collect()
    }
}

/// The recursive MCCFR step of §4.6. Returns the node's expected value from
/// P0's perspective.
///
/// `history` holds the actions already played on the *current* street (reset
/// to empty on every street transition, per the InfoSet invariant of §3).
#[allow(clippy::too_many_arguments)]
pub fn cfr_recurse(
    tables: &RankTables,
    hand_p0: [Card; 2],
    hand_p1: [Card; 2],
    board: [Card; 5],
    config: &TreeConfig,
    store: &mut InfoSetStore,
    street: Street,
    acting: Player,
    history: Vec<Action>,
    raises_used: u8,
    bet_state: BetState,
    r0: f64,
    r1: f64,
    depth: u32,
) -> f64 {
    if depth > DEPTH_CAP || r0 < REACH_EPS || r1 < REACH_EPS {
        return 0.0;
    }

    let n = config.n();
    let legal = legal_actions(&bet_state, raises_used, config);
    let board_bits = board_bits_for_street(&board, street);

    let idx = store.get_or_create_index(board_bits, street, acting.as_index() as u8, &history, bet_state);
    let idxs: Vec<usize> = legal.iter().map(|&a| action_index(a, n)).collect();
    let legal_regrets: Vec<f64> = {
        let data = store.data(idx);
        idxs.iter().map(|&i| data.regrets[i]).collect()
    };
    let sigma = regret_match(&legal_regrets);

    let mut child_utils = Vec::with_capacity(legal.len());
    for (i, &action) in legal.iter().enumerate() {
        let util = if is_immediately_terminal(action) {
            let next_state = apply_action(&bet_state, action, acting, config);
            match action {
                Action::Fold => payoff_fold(&bet_state, acting),
                Action::Call => showdown_at(tables, hand_p0, hand_p1, &board, &next_state),
                _ => unreachable!("only FOLD and CALL are immediately terminal"),
            }
        } else if advances_street(&history, action, street) {
            let next_street = street.next().expect("double-check on non-river advances");
            let (nr0, nr1) = reach_after(acting, r0, r1, sigma[i]);
            cfr_recurse(
                tables, hand_p0, hand_p1, board, config, store, next_street, Player::P0,
                Vec::new(), 0, bet_state, nr0, nr1, depth + 1,
            )
        } else if is_double_check(&history, action) && street == Street::River {
            showdown_at(tables, hand_p0, hand_p1, &board, &bet_state)
        } else {
            let next_state = apply_action(&bet_state, action, acting, config);
            let mut next_history = history.clone();
            next_history.push(action);
            let next_raises = raises_used + if matches!(action, Action::Raise(_)) { 1 } else { 0 };
            let (nr0, nr1) = reach_after(acting, r0, r1, sigma[i]);
            cfr_recurse(
                tables, hand_p0, hand_p1, board, config, store, street, acting.opponent(),
                next_history, next_raises, next_state, nr0, nr1, depth + 1,
            )
        };
        child_utils.push(util);
    }

    let node_value: f64 = sigma.iter().zip(child_utils.iter()).map(|(&s, &u)| s * u).sum();

    // Re-resolve the slot: a nested call above may have triggered a resize,
    // invalidating `idx`.
    let idx = store.get_or_create_index(board_bits, street, acting.as_index() as u8, &history, bet_state);
    let (cf_reach, own_reach) = match acting {
        Player::P0 => (r1, r0),
        Player::P1 => (r0, r1),
    };
    let sign = if acting == Player::P0 { 1.0 } else { -1.0 };
    let util_acting: Vec<f64> = child_utils.iter().map(|&u| u * sign).collect();
    let v_acting = node_value * sign;

    let data = store.data_mut(idx);
    data.visits += 1;
    for (pos, &slot) in idxs.iter().enumerate() {
        data.regrets[slot] += cf_reach * (util_acting[pos] - v_acting);
        data.strategy_sum[slot] += own_reach * sigma[pos];
    }

    node_value
}

fn reach_after(acting: Player, r0: f64, r1: f64, sigma_a: f64) -> (f64, f64) {
    match acting {
        Player::P0 => (r0 * sigma_a, r1),
        Player::P1 => (r0, r1 * sigma_a),
    }
}

/// Showdown always resolves against the complete 5-card board regardless of
/// which street triggered it (§4.5) — a turn or flop CALL still sees the
/// river.
fn showdown_at(tables: &RankTables, hand_p0: [Card; 2], hand_p1: [Card; 2], board: &[Card; 5], bet_state: &BetState) -> f64 {
    let r0 = evaluator::evaluate(hand_p0, board, tables);
    let r1 = evaluator::evaluate(hand_p1, board, tables);
    payoff_showdown(bet_state, r0.value(), r1.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::{alphabet_size, TreeConfig};
    use std::str::FromStr;

    fn tables() -> RankTables {
        RankTables::generate().unwrap()
    }

    fn card(s: &str) -> Card {
        Card::from_str(s).unwrap()
    }

    #[test]
    fn regret_match_is_uniform_with_no_regret() {
        let sigma = regret_match(&[0.0, 0.0, 0.0]);
        assert_eq!(sigma, vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn regret_match_is_proportional_to_positive_regret() {
        let sigma = regret_match(&[2.0, 1.0]);
        assert!((sigma[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((sigma[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn regret_match_floors_negative_regret_at_read_time() {
        let sigma = regret_match(&[-5.0, 3.0]);
        assert_eq!(sigma[0], 0.0);
        assert_eq!(sigma[1], 1.0);
    }

    /// Rock-paper-scissors via two independently regret-matching players,
    /// full-traversal (exact expectation, no sampling) vanilla CFR. §8
    /// requires average play to approach 1/3 per action.
    #[test]
    fn rock_paper_scissors_converges_to_one_third_each_action() {
        // payoff(a, b): row player's utility playing a against column b.
        // 0=rock,1=paper,2=scissors; a beats b iff b == (a+1) % 3.
        let payoff = |a: usize, b: usize| -> f64 {
            if a == b {
                0.0
            } else if (a + 1) % 3 == b {
                1.0
            } else {
                -1.0
            }
        };

        let mut regrets0 = [0.0_f64; 3];
        let mut regrets1 = [0.0_f64; 3];
        let mut sum0 = [0.0_f64; 3];
        let mut sum1 = [0.0_f64; 3];
        let iterations = 100_000;

        for _ in 0..iterations {
            let s0 = regret_match(&regrets0);
            let s1 = regret_match(&regrets1);

            let util0: Vec<f64> = (0..3).map(|a| (0..3).map(|b| s1[b] * payoff(a, b)).sum()).collect();
            let v0: f64 = (0..3).map(|a| s0[a] * util0[a]).sum();
            let util1: Vec<f64> = (0..3).map(|b| (0..3).map(|a| s0[a] * payoff(b, a)).sum()).collect();
            let v1: f64 = (0..3).map(|b| s1[b] * util1[b]).sum();

            for a in 0..3 {
                regrets0[a] += util0[a] - v0;
                regrets1[a] += util1[a] - v1;
                sum0[a] += s0[a];
                sum1[a] += s1[a];
            }
        }

        for a in 0..3 {
            let avg0 = sum0[a] / iterations as f64;
            let avg1 = sum1[a] / iterations as f64;
            assert!((avg0 - 1.0 / 3.0).abs() < 0.01, "player 0 action {a}: {avg0}");
            assert!((avg1 - 1.0 / 3.0).abs() < 0.01, "player 1 action {a}: {avg1}");
        }
    }

    #[test]
    fn strategy_sum_normalizes_to_a_distribution_after_a_short_solve() {
        let t = tables();
        let config = TreeConfig::new(vec![1.0]);
        let mut store = InfoSetStore::new(alphabet_size(config.n()));
        let hand_p0 = [card("Ah"), card("Ad")];
        let hand_p1 = [card("Kh"), card("Kd")];
        let board = [card("2c"), card("7d"), card("9s"), card("Tc"), card("3h")];

        for _ in 0..200 {
            let bet_state = config.root_bet_state();
            cfr_recurse(
                &t, hand_p0, hand_p1, board, &config, &mut store, Street::Flop, Player::P0,
                Vec::new(), 0, bet_state, 1.0, 1.0, 0,
            );
        }

        let root_bits = board_bits_for_street(&board, Street::Flop);
        let idx = store.get_or_create_index(root_bits, Street::Flop, Player::P0.as_index() as u8, &[], config.root_bet_state());
        let data = store.data(idx);
        let legal = legal_actions(&config.root_bet_state(), 0, &config);
        let total: f64 = legal.iter().map(|&a| data.strategy_sum[action_index(a, config.n())]).sum();
        assert!(total > 0.0);
        let probs: Vec<f64> = legal.iter().map(|&a| data.strategy_sum[action_index(a, config.n())] / total).collect();
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for p in probs {
            assert!(p >= 0.0);
        }
    }

    #[test]
    fn deterministic_winner_on_the_river_favors_betting_and_calling() {
        let t = tables();
        let config = TreeConfig::new(vec![1.0]);
        let mut store = InfoSetStore::new(alphabet_size(config.n()));
        // P0 holds the nut flush on a river board that gives P1 nothing
        // better than a pair; solve directly on the river so there's a
        // single betting round between the fixed hands.
        let hand_p0 = [card("Ah"), card("Kh")];
        let hand_p1 = [card("2c"), card("3d")];
        let board = [card("2h"), card("5h"), card("9h"), card("Qh"), card("4s")];

        for _ in 0..12_000 {
            let bet_state = config.root_bet_state();
            cfr_recurse(
                &t, hand_p0, hand_p1, board, &config, &mut store, Street::River, Player::P0,
                Vec::new(), 0, bet_state, 1.0, 1.0, 0,
            );
        }

        let root_bits = board_bits_for_street(&board, Street::River);
        let idx = store.get_or_create_index(root_bits, Street::River, Player::P0.as_index() as u8, &[], config.root_bet_state());
        let data = store.data(idx);
        let legal = legal_actions(&config.root_bet_state(), 0, &config);
        let total: f64 = legal.iter().map(|&a| data.strategy_sum[action_index(a, config.n())]).sum();
        let bet_prob: f64 = legal
            .iter()
            .filter(|&&a| matches!(a, Action::Bet(_)))
            .map(|&a| data.strategy_sum[action_index(a, config.n())])
            .sum::<f64>()
            / total;
        assert!(bet_prob >= 0.99, "bet probability with the nuts should dominate, got {bet_prob}");
    }
}
