//! The betting tree's primitive types and pure transition functions.
//!
//! This module is the shared vocabulary between the CFR recursion
//! ([`crate::cfr`], which walks the tree directly without ever materializing
//! it) and the `tree` crate (which builds an explicit, inspectable graph of
//! these same nodes for tests and benchmarks). Everything here is a pure
//! function of its inputs — no InfoSet storage, no regrets, nothing that
//! depends on a particular solve.

use crate::card::Card;
use std::fmt;

/// Betting street. Community-card count is implied (3/4/5) but not tracked
/// here; the solver's fixed board supplies the actual cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Street {
    Flop,
    Turn,
    River,
}

impl Street {
    /// The street after this one, or `None` on the river.
    pub fn next(self) -> Option<Street> {
        match self {
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    pub fn as_index(self) -> u8 {
        match self {
            Street::Flop => 0,
            Street::Turn => 1,
            Street::River => 2,
        }
    }
}

/// One of the two heads-up players. `P0` acts first at the root of every
/// street (§4.6's "Solve").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    P0,
    P1,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::P0 => Player::P1,
            Player::P1 => Player::P0,
        }
    }

    pub fn as_index(self) -> usize {
        match self {
            Player::P0 => 0,
            Player::P1 => 1,
        }
    }
}

/// One action in the fixed-layout alphabet of §3: CHECK, BET(size index),
/// FOLD, CALL, RAISE(size index). The size index selects into
/// [`TreeConfig::bet_sizes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Check,
    Bet(u8),
    Fold,
    Call,
    Raise(u8),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Check => write!(f, "CHECK"),
            Action::Bet(i) => write!(f, "BET_{i}"),
            Action::Fold => write!(f, "FOLD"),
            Action::Call => write!(f, "CALL"),
            Action::Raise(i) => write!(f, "RAISE_{i}"),
        }
    }
}

/// Maximum number of raises permitted on a single street (§3).
pub const MAX_RAISES: u8 = 2;

/// Size of the action alphabet for `n` configured bet sizes: CHECK, n BETs,
/// FOLD, CALL, n RAISEs.
pub fn alphabet_size(n: usize) -> usize {
    2 * n + 3
}

/// The fixed position of `action` in a strategy/regret vector sized for `n`
/// bet sizes, per §3's layout (0: CHECK, 1..n: BET, n+1: FOLD, n+2: CALL,
/// n+3..n+2+n: RAISE).
pub fn action_index(action: Action, n: usize) -> usize {
    match action {
        Action::Check => 0,
        Action::Bet(i) => 1 + i as usize,
        Action::Fold => n + 1,
        Action::Call => n + 2,
        Action::Raise(i) => n + 3 + i as usize,
    }
}

/// Pot-state quadruple, in big-blind units (§3). `pot == p0_contrib +
/// p1_contrib` is an invariant maintained by [`apply_action`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetState {
    pub pot: f64,
    pub to_call: f64,
    pub p0_contrib: f64,
    pub p1_contrib: f64,
}

impl BetState {
    /// The contribution belonging to `player`.
    pub fn contribution(&self, player: Player) -> f64 {
        match player {
            Player::P0 => self.p0_contrib,
            Player::P1 => self.p1_contrib,
        }
    }

    /// Quantize to integer hundredths of a BB, per §9's hash-key rule. Bounds
    /// the distinct info-set count and avoids float drift fragmenting states
    /// that should hash identically.
    pub fn quantized(&self) -> (i64, i64, i64, i64) {
        let q = |x: f64| (x * 100.0).round() as i64;
        (q(self.pot), q(self.to_call), q(self.p0_contrib), q(self.p1_contrib))
    }
}

/// Bet sizing and stakes configuration, shared by the tree builder and the
/// CFR recursion so both agree on the action alphabet's size `n` (§4.5).
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub big_blind: f64,
    pub starting_pot_bb: f64,
    /// Up to 4 configured bet/raise sizes, in BB.
    pub bet_sizes_bb: Vec<f64>,
    /// Carried for API completeness; stack-depth/all-in truncation is out of
    /// scope (§1's non-goals), so no action is ever capped by it.
    pub starting_stack_bb: f64,
}

impl TreeConfig {
    /// Defaults named in §6: big blind 1.0, starting pot 1.5bb, a single
    /// pot-size bet of 1.0bb.
    pub fn new(bet_sizes_bb: Vec<f64>) -> Self {
        TreeConfig {
            big_blind: 1.0,
            starting_pot_bb: 1.5,
            bet_sizes_bb,
            starting_stack_bb: 100.0,
        }
    }

    pub fn n(&self) -> usize {
        self.bet_sizes_bb.len()
    }

    /// The root `BetState` of every solve: pot split evenly between the two
    /// contributions, nothing owed (§4.6's "Solve").
    pub fn root_bet_state(&self) -> BetState {
        BetState {
            pot: self.starting_pot_bb,
            to_call: 0.0,
            p0_contrib: self.starting_pot_bb / 2.0,
            p1_contrib: self.starting_pot_bb / 2.0,
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig::new(vec![1.0])
    }
}

/// Legal actions at a node facing `bet_state`, given `raises_used` raises
/// already made on the current street (§4.5).
pub fn legal_actions(bet_state: &BetState, raises_used: u8, config: &TreeConfig) -> Vec<Action> {
    let n = config.n();
    if bet_state.to_call == 0.0 {
        let mut actions = Vec::with_capacity(1 + n);
        actions.push(Action::Check);
        for i in 0..n {
            actions.push(Action::Bet(i as u8));
        }
        actions
    } else {
        let mut actions = Vec::with_capacity(2 + n);
        actions.push(Action::Fold);
        actions.push(Action::Call);
        if raises_used < MAX_RAISES {
            for i in 0..n {
                actions.push(Action::Raise(i as u8));
            }
        }
        actions
    }
}

/// Apply `action`, taken by `acting`, to `bet_state` (§4.5's "Action
/// application"). FOLD leaves the state unchanged — it only matters for
/// payoff computation, never for further play.
pub fn apply_action(bet_state: &BetState, action: Action, acting: Player, config: &TreeConfig) -> BetState {
    let mut next = *bet_state;
    match action {
        Action::Check | Action::Fold => {}
        Action::Bet(i) => {
            let s = config.bet_sizes_bb[i as usize];
            next.pot += s;
            next.to_call = s;
            match acting {
                Player::P0 => next.p0_contrib += s,
                Player::P1 => next.p1_contrib += s,
            }
        }
        Action::Call => {
            let owed = bet_state.to_call;
            next.pot += owed;
            match acting {
                Player::P0 => next.p0_contrib += owed,
                Player::P1 => next.p1_contrib += owed,
            }
            next.to_call = 0.0;
        }
        Action::Raise(i) => {
            let s = config.bet_sizes_bb[i as usize];
            let before = bet_state.to_call;
            next.pot += before + s;
            next.to_call = s;
            match acting {
                Player::P0 => next.p0_contrib += before + s,
                Player::P1 => next.p1_contrib += before + s,
            }
        }
    }
    next
}

/// `true` iff `action` ends the hand outright (fold or call into showdown),
/// without needing to look at the rest of the street's history.
pub fn is_immediately_terminal(action: Action) -> bool {
    matches!(action, Action::Fold | Action::Call)
}

/// `true` iff `action` is a CHECK immediately following another CHECK on the
/// same street (§4.5's double-check rule) — terminal on the river, a street
/// advance otherwise.
pub fn is_double_check(history_before: &[Action], action: Action) -> bool {
    action == Action::Check && history_before.last() == Some(&Action::Check)
}

/// Full terminal test for the action just taken, given the history of
/// actions already played on the current street (before `action`) and the
/// current street.
pub fn is_terminal(history_before: &[Action], action: Action, street: Street) -> bool {
    is_immediately_terminal(action) || (is_double_check(history_before, action) && street == Street::River)
}

/// `true` iff this action ends the street without ending the hand (a
/// double-check on flop or turn): the caller should reset history, flip to
/// `P0`, and advance the street, carrying `BetState` unchanged.
pub fn advances_street(history_before: &[Action], action: Action, street: Street) -> bool {
    is_double_check(history_before, action) && street != Street::River
}

/// Number of `RAISE` actions already played on the current street, derived
/// from its action history — the quantity [`legal_actions`] checks against
/// [`MAX_RAISES`].
pub fn raises_used(history: &[Action]) -> u8 {
    history.iter().filter(|a| matches!(a, Action::Raise(_))).count() as u8
}

/// The community-card bitboard visible at `street` (3/4/5 cards), combined
/// by bitwise OR (§3's bitboard form). Shared by the CFR recursion and the
/// solver's strategy-query path so both key the info-set store identically.
pub fn board_bits_for_street(board: &[Card; 5], street: Street) -> u64 {
    let count = match street {
        Street::Flop => 3,
        Street::Turn => 4,
        Street::River => 5,
    };
    board[..count].iter().fold(0u64, |acc, c| acc | c.bitboard())
}

/// P0's profit (in BB) when `folder` folds, from a `BetState` reached right
/// before the fold (§4.5's "Payoff").
pub fn payoff_fold(bet_state: &BetState, folder: Player) -> f64 {
    match folder {
        Player::P1 => bet_state.pot - bet_state.p0_contrib,
        Player::P0 => -bet_state.p0_contrib,
    }
}

/// P0's profit (in BB) at showdown, given both players' final hand
/// strengths (lower is stronger, per [`crate::evaluator::HandRank`]'s
/// ordering) and the pot state (§4.5's "Payoff").
pub fn payoff_showdown(bet_state: &BetState, p0_strength: u16, p1_strength: u16) -> f64 {
    use std::cmp::Ordering;
    let winnings = match p0_strength.cmp(&p1_strength) {
        Ordering::Less => bet_state.pot,
        Ordering::Greater => 0.0,
        Ordering::Equal => bet_state.pot / 2.0,
    };
    winnings - bet_state.p0_contrib
}
