//! Explicit betting-tree construction (§4.5).
//!
//! The CFR recursion in `oracle_engine::cfr` walks the same tree by
//! recursive descent without ever materializing it. This crate builds an
//! explicit, inspectable graph of the same nodes — for tests, benchmarks,
//! and anything that wants to enumerate the tree rather than recurse it.

use oracle_engine::betting::{
    action_index, advances_street, alphabet_size, apply_action, is_double_check,
    is_immediately_terminal, is_terminal, legal_actions, payoff_fold, Action, BetState, Player,
    Street, TreeConfig,
};

pub type NodeId = usize;

/// Why a terminal node ended the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Fold { folder: Player },
    Showdown,
}

/// One node of the explicit tree: either a decision awaiting an action from
/// `player`, or a terminal leaf.
#[derive(Debug, Clone)]
pub enum Node {
    Decision {
        id: NodeId,
        player: Player,
        street: Street,
        bet_state: BetState,
        /// Actions already played on the current street (reset on a street
        /// transition, matching the InfoSet key's history field).
        history: Vec<Action>,
        raises_used: u8,
        /// Parallel to `children`: the action that reaches each child.
        actions: Vec<Action>,
        children: Vec<NodeId>,
    },
    Terminal {
        id: NodeId,
        kind: TerminalKind,
        bet_state: BetState,
        street: Street,
    },
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Decision { id, .. } => *id,
            Node::Terminal { id, .. } => *id,
        }
    }
}

/// A fully materialized betting tree for one [`TreeConfig`], rooted at the
/// flop with P0 to act and the pot split evenly (§4.6's "Solve").
pub struct BettingTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    root: NodeId,
}

impl BettingTree {
    /// Build the full tree for `config`. Depth is naturally bounded: at most
    /// [`oracle_engine::betting::MAX_RAISES`] raises per street across three
    /// streets, so this always terminates without needing the CFR
    /// recursion's depth cap.
    pub fn build(config: TreeConfig) -> Self {
        let mut nodes = Vec::new();
        let root_state = config.root_bet_state();
        let root = Self::build_node(&config, &mut nodes, Street::Flop, Player::P0, Vec::new(), 0, root_state);
        BettingTree { config, nodes, root }
    }

    fn push_terminal(nodes: &mut Vec<Node>, kind: TerminalKind, bet_state: BetState, street: Street) -> NodeId {
        let id = nodes.len();
        nodes.push(Node::Terminal { id, kind, bet_state, street });
        id
    }

    fn build_node(
        config: &TreeConfig,
        nodes: &mut Vec<Node>,
        street: Street,
        acting: Player,
        history: Vec<Action>,
        raises_used: u8,
        bet_state: BetState,
    ) -> NodeId {
        let legal = legal_actions(&bet_state, raises_used, config);
        let id = nodes.len();
        // Reserve the slot so children always land at higher ids than their
        // parent, even though the parent isn't finalized until after they're
        // all built.
        nodes.push(Node::Decision {
            id,
            player: acting,
            street,
            bet_state,
            history: history.clone(),
            raises_used,
            actions: Vec::new(),
            children: Vec::new(),
        });

        let mut actions = Vec::with_capacity(legal.len());
        let mut children = Vec::with_capacity(legal.len());
        for action in legal {
            let child_id = if is_immediately_terminal(action) {
                let next_state = apply_action(&bet_state, action, acting, config);
                let kind = match action {
                    Action::Fold => TerminalKind::Fold { folder: acting },
                    Action::Call => TerminalKind::Showdown,
                    _ => unreachable!("only FOLD and CALL are immediately terminal"),
                };
                Self::push_terminal(nodes, kind, next_state, street)
            } else if advances_street(&history, action, street) {
                let next_street = street.next().expect("double-check on non-river advances");
                Self::build_node(config, nodes, next_street, Player::P0, Vec::new(), 0, bet_state)
            } else if is_double_check(&history, action) && street == Street::River {
                Self::push_terminal(nodes, TerminalKind::Showdown, bet_state, street)
            } else {
                let next_state = apply_action(&bet_state, action, acting, config);
                let mut next_history = history.clone();
                next_history.push(action);
                let next_raises = raises_used + if matches!(action, Action::Raise(_)) { 1 } else { 0 };
                Self::build_node(config, nodes, street, acting.opponent(), next_history, next_raises, next_state)
            };
            actions.push(action);
            children.push(child_id);
        }

        if let Node::Decision { actions: a, children: c, .. } = &mut nodes[id] {
            *a = actions;
            *c = children;
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// `true` iff every decision node's terminal test agrees with
    /// [`is_terminal`] applied to the action that reached each child — a
    /// consistency check between this explicit builder and the pure
    /// functions it's built from.
    pub fn is_consistent(&self) -> bool {
        for node in &self.nodes {
            if let Node::Decision { street, history, actions, children, .. } = node {
                for (action, &child_id) in actions.iter().zip(children.iter()) {
                    let terminal = is_terminal(history, *action, *street);
                    let child_is_terminal = matches!(self.nodes[child_id], Node::Terminal { .. });
                    let street_advanced = advances_street(history, *action, *street);
                    if terminal && !child_is_terminal {
                        return false;
                    }
                    if !terminal && !street_advanced && child_is_terminal {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Total payoff-bearing leaves reachable from `tree`'s root, counted by
/// walking every node. Useful for sizing benchmarks and sanity-checking a
/// configuration's branching factor.
pub fn count_terminals(tree: &BettingTree) -> usize {
    tree.nodes.iter().filter(|n| matches!(n, Node::Terminal { .. })).count()
}

/// The size of the action alphabet this tree's config implies, re-exported
/// so callers that only hold a [`BettingTree`] don't need a separate
/// `oracle_engine` dependency just for it.
pub fn action_alphabet_size(tree: &BettingTree) -> usize {
    alphabet_size(tree.config.n())
}

/// `action_index`, re-exported for the same reason.
pub fn index_of(action: Action, tree: &BettingTree) -> usize {
    action_index(action, tree.config.n())
}

/// Payoff to P0 at a fold terminal, re-exported for convenience.
pub fn fold_payoff(bet_state: &BetState, folder: Player) -> f64 {
    payoff_fold(bet_state, folder)
}
