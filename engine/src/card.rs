//! Card representation and parsing.
//!
//! A card is an integer in 0..51, encoded `rank * 4 + suit` with rank in
//! {2..A} -> {0..12} and suit in {c,d,h,s} -> {0..3}. The evaluator consumes
//! the alternate bitboard form `1 << (rank + 16*suit)`; everything else
//! (ranges, betting trees, the solver) consumes the plain integer.

use crate::error::SolverError;
use std::fmt;
use std::str::FromStr;

const RANK_CHARS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// Prime assigned to each rank (2..A), used by the rank table generator's
/// product encoding of paired hand classes.
pub const RANK_PRIMES: [u32; 13] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

/// A single playing card, encoded `rank * 4 + suit` in 0..51.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card(u8);

impl Card {
    /// Construct a card from its raw 0..51 encoding.
    pub fn new(value: u8) -> Self {
        assert!(value < 52, "card value must be 0..51, got {value}");
        Card(value)
    }

    /// Construct a card from a rank (0..12, 2-through-A) and suit (0..3).
    pub fn from_rank_suit(rank: u8, suit: u8) -> Self {
        assert!(rank < 13, "rank must be 0..12, got {rank}");
        assert!(suit < 4, "suit must be 0..3, got {suit}");
        Card(rank * 4 + suit)
    }

    /// Raw 0..51 encoding.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Rank in 0..12 (0 = deuce, 12 = ace).
    pub fn rank(self) -> u8 {
        self.0 / 4
    }

    /// Suit in 0..3 (c, d, h, s).
    pub fn suit(self) -> u8 {
        self.0 % 4
    }

    /// The bitboard form the evaluator operates on: `1 << (rank + 16*suit)`.
    pub fn bitboard(self) -> u64 {
        1u64 << (self.rank() as u32 + 16 * self.suit() as u32)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANK_CHARS[self.rank() as usize],
            SUIT_CHARS[self.suit() as usize]
        )
    }
}

impl FromStr for Card {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(SolverError::CardParse(s.to_string()));
        }
        let rank = RANK_CHARS
            .iter()
            .position(|&c| c == chars[0].to_ascii_uppercase())
            .ok_or_else(|| SolverError::CardParse(s.to_string()))?;
        let suit = SUIT_CHARS
            .iter()
            .position(|&c| c == chars[1].to_ascii_lowercase())
            .ok_or_else(|| SolverError::CardParse(s.to_string()))?;
        Ok(Card::from_rank_suit(rank as u8, suit as u8))
    }
}

/// Parse a concatenation of 2-character card tokens (the board-argument
/// grammar of the driver CLI): 0, 3, 4, or 5 cards.
pub fn parse_board(s: &str) -> Result<Vec<Card>, SolverError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    if s.len() % 2 != 0 {
        return Err(SolverError::BoardParse(s.to_string()));
    }
    let mut cards = Vec::with_capacity(s.len() / 2);
    for chunk in s.as_bytes().chunks(2) {
        let token = std::str::from_utf8(chunk).map_err(|_| SolverError::BoardParse(s.to_string()))?;
        cards.push(Card::from_str(token)?);
    }
    match cards.len() {
        0 | 3 | 4 | 5 => Ok(cards),
        _ => Err(SolverError::BoardParse(s.to_string())),
    }
}
