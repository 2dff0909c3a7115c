//! Range representation and the range-string parser of §4.3.
//!
//! Grounded in a reference range-string parser: a comma-separated grammar of
//! `RR` / `RRs` / `RRo` tokens, optional `+` upward extension, and an
//! optional `@W` weight suffix either per-token or as a trailing
//! whole-range scale factor.

use crate::card::Card;
use crate::error::RangeParseError;
use log::warn;
use std::collections::HashSet;

const RANK_CHARS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];

/// Maximum number of distinct combos a range can hold: the full 13x13 grid.
const MAX_COMBOS: usize = 1326;

fn rank_index(c: char) -> Option<u8> {
    RANK_CHARS.iter().position(|&r| r == c.to_ascii_uppercase()).map(|i| i as u8)
}

fn parse_weight(s: &str) -> Result<f64, RangeParseError> {
    let value: f64 = s
        .parse()
        .map_err(|_| RangeParseError::WeightOutOfRange { token: s.to_string(), value: f64::NAN })?;
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    if !(0.0..=1.0).contains(&fraction) {
        return Err(RangeParseError::WeightOutOfRange { token: s.to_string(), value });
    }
    Ok(fraction)
}

/// One weighted (c0, c1) combo in a [`Range`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeEntry {
    pub cards: (Card, Card),
    pub weight: f64,
}

/// A weighted multiset of hole-card combos (§3). Duplicates across
/// overlapping specifiers are resolved first-occurrence-wins, per the data
/// model's documented default.
#[derive(Debug, Clone)]
pub struct Range {
    entries: Vec<RangeEntry>,
    seen: HashSet<(u8, u8)>,
    overall_weight: f64,
}

impl Default for Range {
    fn default() -> Self {
        Range { entries: Vec::new(), seen: HashSet::new(), overall_weight: 1.0 }
    }
}

impl Range {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the comma-separated grammar of §4.3. Unrecognized tokens are
    /// logged as warnings and skipped; parsing never aborts over one bad
    /// token.
    pub fn parse(s: &str) -> Self {
        let mut range = Range::new();
        let tokens: Vec<&str> = s.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();

        for (i, tok) in tokens.iter().enumerate() {
            if let Some(rest) = tok.strip_prefix('@') {
                if i + 1 == tokens.len() {
                    match parse_weight(rest) {
                        Ok(w) => range.overall_weight = w,
                        Err(e) => warn!("range parse: {e}"),
                    }
                } else {
                    warn!("range parse: unexpected overall-weight token {tok:?} before the end of the range");
                }
                continue;
            }
            if let Err(e) = range.parse_token(tok) {
                warn!("range parse: {e}");
            }
        }
        range
    }

    fn parse_token(&mut self, tok: &str) -> Result<(), RangeParseError> {
        let (spec, weight) = match tok.rfind('@') {
            Some(idx) => (&tok[..idx], parse_weight(&tok[idx + 1..])?),
            None => (tok, 1.0),
        };

        let (body, extend) = match spec.strip_suffix('+') {
            Some(b) => (b, true),
            None => (spec, false),
        };

        let chars: Vec<char> = body.chars().collect();
        if chars.len() == 2 {
            let r0 = rank_index(chars[0]).ok_or(RangeParseError::InvalidRank(chars[0]))?;
            let r1 = rank_index(chars[1]).ok_or(RangeParseError::InvalidRank(chars[1]))?;
            if r0 != r1 {
                return Err(RangeParseError::UnrecognizedToken(tok.to_string()));
            }
            return self.add_pairs(r0, extend, weight);
        }

        if chars.len() == 3 {
            let r0 = rank_index(chars[0]).ok_or(RangeParseError::InvalidRank(chars[0]))?;
            let r1 = rank_index(chars[1]).ok_or(RangeParseError::InvalidRank(chars[1]))?;
            let suited = match chars[2].to_ascii_lowercase() {
                's' => true,
                'o' => false,
                _ => return Err(RangeParseError::UnrecognizedToken(tok.to_string())),
            };
            if r0 == r1 {
                return Err(RangeParseError::UnrecognizedToken(tok.to_string()));
            }
            return self.add_suited_or_offsuit(r0, r1, suited, extend, weight);
        }

        Err(RangeParseError::UnrecognizedToken(tok.to_string()))
    }

    fn add_pairs(&mut self, rank: u8, extend: bool, weight: f64) -> Result<(), RangeParseError> {
        let top = if extend { 12 } else { rank };
        for r in rank..=top {
            for s0 in 0..4u8 {
                for s1 in (s0 + 1)..4u8 {
                    self.push(Card::from_rank_suit(r, s0), Card::from_rank_suit(r, s1), weight)?;
                }
            }
        }
        Ok(())
    }

    /// Extends by raising the lower (kicker) rank up to one below the fixed
    /// higher rank, e.g. `A2s+` = A2s..AKs. The higher rank stays fixed.
    fn add_suited_or_offsuit(
        &mut self,
        r0: u8,
        r1: u8,
        suited: bool,
        extend: bool,
        weight: f64,
    ) -> Result<(), RangeParseError> {
        let (hi, lo) = if r0 > r1 { (r0, r1) } else { (r1, r0) };
        let top_lo = if extend { hi.saturating_sub(1) } else { lo };
        for kicker in lo..=top_lo {
            if suited {
                for s in 0..4u8 {
                    self.push(Card::from_rank_suit(hi, s), Card::from_rank_suit(kicker, s), weight)?;
                }
            } else {
                for s0 in 0..4u8 {
                    for s1 in 0..4u8 {
                        if s0 == s1 {
                            continue;
                        }
                        self.push(Card::from_rank_suit(hi, s0), Card::from_rank_suit(kicker, s1), weight)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, c0: Card, c1: Card, weight: f64) -> Result<(), RangeParseError> {
        if c0 == c1 {
            return Ok(());
        }
        let key = if c0.value() < c1.value() {
            (c0.value(), c1.value())
        } else {
            (c1.value(), c0.value())
        };
        if self.seen.contains(&key) {
            return Ok(());
        }
        if self.entries.len() >= MAX_COMBOS {
            return Err(RangeParseError::CapacityExceeded(format!("{c0}{c1}")));
        }
        self.seen.insert(key);
        self.entries.push(RangeEntry { cards: (c0, c1), weight });
        Ok(())
    }

    pub fn combos(&self) -> &[RangeEntry] {
        &self.entries
    }

    pub fn overall_weight(&self) -> f64 {
        self.overall_weight
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` iff neither card of `entry` collides with `dead` cards (used
    /// by the driver to filter out combos sharing a card with the board or
    /// the opponent's sampled hand — the `CardConflict` the solver itself
    /// does not validate, per §7).
    pub fn combo_conflicts(entry: &RangeEntry, dead: &[Card]) -> bool {
        dead.contains(&entry.cards.0) || dead.contains(&entry.cards.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pocket_pair_expands_to_six_combos() {
        let r = Range::parse("AA");
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn suited_hand_expands_to_four_combos() {
        let r = Range::parse("AKs");
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn offsuit_hand_expands_to_twelve_combos() {
        let r = Range::parse("AKo");
        assert_eq!(r.len(), 12);
    }

    #[test]
    fn pair_plus_extends_upward_through_aces() {
        let r = Range::parse("QQ+");
        // QQ, KK, AA = 3 * 6
        assert_eq!(r.len(), 18);
    }

    #[test]
    fn suited_plus_extends_the_kicker_up_to_the_fixed_high_card() {
        let r = Range::parse("A2s+");
        // A2s..AKs = 12 kickers * 4 combos
        assert_eq!(r.len(), 48);
    }

    #[test]
    fn per_combo_weight_attaches_to_the_token_not_the_whole_range() {
        let r = Range::parse("AA@50");
        assert_eq!(r.overall_weight(), 1.0);
        assert!(r.combos().iter().all(|e| (e.weight - 0.5).abs() < 1e-9));
    }

    #[test]
    fn trailing_bare_at_weight_scales_the_range() {
        let r = Range::parse("AA,KK,@75");
        assert_eq!(r.overall_weight(), 0.75);
        assert_eq!(r.len(), 12);
    }

    #[test]
    fn fraction_form_of_weight_is_accepted() {
        let r = Range::parse("AA@0.5");
        assert!(r.combos().iter().all(|e| (e.weight - 0.5).abs() < 1e-9));
    }

    #[test]
    fn overlapping_specifiers_keep_the_first_occurrence() {
        let r = Range::parse("AA@20,AA@80");
        assert_eq!(r.len(), 6);
        assert!(r.combos().iter().all(|e| (e.weight - 0.2).abs() < 1e-9));
    }

    #[test]
    fn unrecognized_token_is_skipped_not_fatal() {
        let r = Range::parse("ZZ,AA");
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn out_of_range_percentage_drops_the_whole_token() {
        let r = Range::parse("AA@150,KK");
        assert_eq!(r.len(), 6);
        assert!(r.combos().iter().all(|e| e.weight == 1.0));
    }
}
