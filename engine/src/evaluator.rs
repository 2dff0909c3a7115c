//! Hand evaluator: reduces any 5-, 6-, or 7-card combination of hole and
//! board cards to a single strength in 1..7462.
//!
//! Every 5-card subset is scored with the same flush/unique5/product lookup
//! the [`crate::ranks`] generator built its tables for — the evaluator never
//! maintains a second, independently-hashed table the way a canonicalize-
//! and-hash runtime would. For 6 or 7 combined cards this means checking all
//! C(6,5)=6 or C(7,5)=21 five-card subsets and keeping the best, which is
//! still O(1) (a small fixed number of table lookups) and needs no data
//! structure beyond the three tables already on hand.

use crate::card::{Card, RANK_PRIMES};
use crate::ranks::RankTables;

/// A hand strength in 1..7462. Lower is stronger. Newtype-wrapped so it can
/// never be confused with a raw index at a call site, and so `a < b` reads
/// naturally as "a is the better hand."
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank(u16);

impl HandRank {
    pub fn new(rank: u16) -> Self {
        HandRank(rank)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

/// The broad category a [`HandRank`] falls into, derived by floor comparison
/// against the boundaries of §3. Not on the evaluator's hot path — an
/// ambient convenience for driver-layer aggregation (per-category BET
/// frequency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandCategory {
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    OnePair,
    HighCard,
}

impl From<HandRank> for HandCategory {
    fn from(rank: HandRank) -> Self {
        match rank.value() {
            1..=10 => HandCategory::StraightFlush,
            11..=166 => HandCategory::FourOfAKind,
            167..=322 => HandCategory::FullHouse,
            323..=1599 => HandCategory::Flush,
            1600..=1609 => HandCategory::Straight,
            1610..=2467 => HandCategory::ThreeOfAKind,
            2468..=3325 => HandCategory::TwoPair,
            3326..=6185 => HandCategory::OnePair,
            _ => HandCategory::HighCard,
        }
    }
}

/// Score exactly 5 cards against the generated tables.
pub fn evaluate_5(cards: [Card; 5], tables: &RankTables) -> HandRank {
    let mut suit_masks = [0u16; 4];
    for c in cards {
        suit_masks[c.suit() as usize] |= 1 << c.rank();
    }
    for &mask in &suit_masks {
        if mask.count_ones() >= 5 {
            return HandRank::new(tables.flush_rank(mask) as u16);
        }
    }

    let mut rank_counts = [0u8; 13];
    for c in cards {
        rank_counts[c.rank() as usize] += 1;
    }
    let presence: u16 = (0..13u8).fold(0u16, |m, r| {
        if rank_counts[r as usize] > 0 {
            m | (1 << r)
        } else {
            m
        }
    });

    if presence.count_ones() == 5 {
        return HandRank::new(tables.unique5_rank(presence) as u16);
    }

    let product: u64 = (0..13usize)
        .filter(|&r| rank_counts[r] > 0)
        .map(|r| (RANK_PRIMES[r] as u64).pow(rank_counts[r] as u32))
        .product();
    HandRank::new(tables.product_rank(product as u32) as u16)
}

fn best_of_subsets(cards: &[Card], tables: &RankTables) -> HandRank {
    let n = cards.len();
    assert!((5..=7).contains(&n), "evaluator requires 5, 6, or 7 cards, got {n}");
    let mut best = u16::MAX;
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                for l in (k + 1)..n {
                    for m in (l + 1)..n {
                        let five = [cards[i], cards[j], cards[k], cards[l], cards[m]];
                        let r = evaluate_5(five, tables).value();
                        if r < best {
                            best = r;
                        }
                    }
                }
            }
        }
    }
    HandRank::new(best)
}

/// Evaluate a hole-card pair against a partial or full board (3, 4, or 5
/// community cards). Pure; thread-safe once `tables` is built.
pub fn evaluate(hole: [Card; 2], board: &[Card], tables: &RankTables) -> HandRank {
    let mut all = Vec::with_capacity(2 + board.len());
    all.push(hole[0]);
    all.push(hole[1]);
    all.extend_from_slice(board);
    best_of_subsets(&all, tables)
}

fn card_from_bit(pos: u32) -> Card {
    let suit = (pos / 16) as u8;
    let rank = (pos % 16) as u8;
    Card::from_rank_suit(rank, suit)
}

fn cards_from_bitboard(bb: u64) -> Vec<Card> {
    let mut cards = Vec::new();
    let mut bits = bb;
    while bits != 0 {
        let pos = bits.trailing_zeros();
        cards.push(card_from_bit(pos));
        bits &= bits - 1;
    }
    cards
}

/// Evaluate from the bitboard encoding of §3 (`1 << (rank + 16*suit)`),
/// matching the `evaluate(hand_bitboard, board_bitboard)` contract of §4.2.
/// `hand` and `board` combined must encode exactly 5, 6, or 7 cards.
pub fn evaluate_bitboards(hand: u64, board: u64, tables: &RankTables) -> HandRank {
    let cards = cards_from_bitboard(hand | board);
    best_of_subsets(&cards, tables)
}

/// Repeated scalar evaluation over parallel slices of hole cards and boards,
/// for benchmarking and for the driver's category-aggregation pass. Carries
/// no SIMD-specific path: each call is already O(1), and architecture-
/// specific vectorization is out of scope for a portable workspace.
pub fn evaluate_batch(holes: &[[Card; 2]], boards: &[Vec<Card>], tables: &RankTables) -> Vec<HandRank> {
    assert_eq!(holes.len(), boards.len());
    holes
        .iter()
        .zip(boards.iter())
        .map(|(&hole, board)| evaluate(hole, board, tables))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tables() -> RankTables {
        RankTables::generate().unwrap()
    }

    fn cards(spec: &[&str]) -> Vec<Card> {
        spec.iter().map(|s| Card::from_str(s).unwrap()).collect()
    }

    #[test]
    fn royal_flush_is_rank_one() {
        let t = tables();
        let c = cards(&["Ts", "Js", "Qs", "Ks", "As"]);
        let r = evaluate_5([c[0], c[1], c[2], c[3], c[4]], &t);
        assert_eq!(r.value(), 1);
    }

    #[test]
    fn wheel_straight_flush_is_rank_ten() {
        let t = tables();
        let c = cards(&["As", "2s", "3s", "4s", "5s"]);
        let r = evaluate_5([c[0], c[1], c[2], c[3], c[4]], &t);
        assert_eq!(r.value(), 10);
    }

    #[test]
    fn quad_aces_with_king_kicker_is_rank_eleven() {
        let t = tables();
        let c = cards(&["Ac", "Ad", "Ah", "As", "Kc"]);
        let r = evaluate_5([c[0], c[1], c[2], c[3], c[4]], &t);
        assert_eq!(r.value(), 11);
    }

    #[test]
    fn broadway_straight_mixed_suits_is_rank_1600() {
        let t = tables();
        let c = cards(&["Tc", "Jd", "Qh", "Ks", "Ac"]);
        let r = evaluate_5([c[0], c[1], c[2], c[3], c[4]], &t);
        assert_eq!(r.value(), 1600);
    }

    #[test]
    fn wheel_straight_mixed_suits_is_rank_1609() {
        let t = tables();
        let c = cards(&["Ac", "2d", "3h", "4s", "5c"]);
        let r = evaluate_5([c[0], c[1], c[2], c[3], c[4]], &t);
        assert_eq!(r.value(), 1609);
    }

    #[test]
    fn worst_high_card_is_rank_7462() {
        let t = tables();
        let c = cards(&["7c", "5d", "4h", "3s", "2c"]);
        let r = evaluate_5([c[0], c[1], c[2], c[3], c[4]], &t);
        assert_eq!(r.value(), 7462);
    }

    #[test]
    fn seven_card_evaluation_finds_the_best_five() {
        let t = tables();
        // Hole cards give a flush; board is unrelated high cards.
        let hole = [Card::from_str("2s").unwrap(), Card::from_str("7s").unwrap()];
        let board = cards(&["3s", "Ks", "Jd", "4h", "9s"]);
        let r = evaluate(hole, &board, &t);
        // Flush (2s 3s 7s 9s Ks) should score in the flush band.
        assert!((323..=1599).contains(&r.value()));
    }

    #[test]
    fn permutation_of_seven_cards_does_not_change_the_result() {
        let t = tables();
        let hole = [Card::from_str("Ah").unwrap(), Card::from_str("Kh").unwrap()];
        let board = cards(&["Qh", "Jh", "Th", "2c", "3d"]);
        let baseline = evaluate(hole, &board, &t);

        let mut all = vec![hole[0], hole[1]];
        all.extend_from_slice(&board);
        // Reverse the combined card order and re-split into hole/board.
        all.reverse();
        let reordered = evaluate([all[0], all[1]], &all[2..], &t);
        assert_eq!(baseline, reordered);
    }

    #[test]
    fn suit_isomorphism_holds_for_non_flush_hands() {
        let t = tables();
        // Two pair, no flush possible regardless of how suits are assigned.
        let hole = [Card::from_str("Ac").unwrap(), Card::from_str("Kd").unwrap()];
        let board = cards(&["Ah", "Ks", "2c", "7d", "9h"]);
        let baseline = evaluate(hole, &board, &t);

        // Relabel every suit c<->d, h<->s (a fixed bijection); rank multiset
        // and flush-ness are unaffected.
        let relabel = |c: Card| -> Card {
            let suit = match c.suit() {
                0 => 1,
                1 => 0,
                2 => 3,
                3 => 2,
                _ => unreachable!(),
            };
            Card::from_rank_suit(c.rank(), suit)
        };
        let hole2 = [relabel(hole[0]), relabel(hole[1])];
        let board2: Vec<Card> = board.iter().map(|&c| relabel(c)).collect();
        let relabeled = evaluate(hole2, &board2, &t);
        assert_eq!(baseline, relabeled);
    }

    #[test]
    fn bitboard_contract_matches_card_based_evaluation() {
        let t = tables();
        let hole = [Card::from_str("Th").unwrap(), Card::from_str("2c").unwrap()];
        let board = cards(&["7s", "7d", "7h", "Kc", "2d"]);
        let via_cards = evaluate(hole, &board, &t);

        let hand_bb = hole[0].bitboard() | hole[1].bitboard();
        let board_bb = board.iter().fold(0u64, |acc, c| acc | c.bitboard());
        let via_bitboards = evaluate_bitboards(hand_bb, board_bb, &t);
        assert_eq!(via_cards, via_bitboards);
    }

    #[test]
    fn exhaustive_five_card_enumeration_matches_documented_category_counts() {
        let t = tables();
        let mut counts = [0u64; 9];
        let deck: Vec<Card> = (0u8..52).map(Card::new).collect();
        for a in 0..52 {
            for b in (a + 1)..52 {
                for c in (b + 1)..52 {
                    for d in (c + 1)..52 {
                        for e in (d + 1)..52 {
                            let five = [deck[a], deck[b], deck[c], deck[d], deck[e]];
                            let rank = evaluate_5(five, &t);
                            let idx = match HandCategory::from(rank) {
                                HandCategory::StraightFlush => 0,
                                HandCategory::FourOfAKind => 1,
                                HandCategory::FullHouse => 2,
                                HandCategory::Flush => 3,
                                HandCategory::Straight => 4,
                                HandCategory::ThreeOfAKind => 5,
                                HandCategory::TwoPair => 6,
                                HandCategory::OnePair => 7,
                                HandCategory::HighCard => 8,
                            };
                            counts[idx] += 1;
                        }
                    }
                }
            }
        }
        let expected: [u64; 9] = [40, 624, 3744, 5108, 10200, 54912, 123552, 1098240, 1302540];
        assert_eq!(counts, expected);
        assert_eq!(counts.iter().sum::<u64>(), 2_598_960);
    }
}
