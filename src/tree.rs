//! Program trees evolved by the genetic programming engine
//!
//! A program tree is a binary decision tree. Internal [`Rule`] nodes look at
//! one row or column and branch on how promising the drawn card would be
//! there; [`Decision`] leaves pick a cell with a fixed placement heuristic.
//!
//! Nodes live in an arena owned by the tree and are addressed by
//! [`NodeId`]. Identifiers are handed out in insertion order and never
//! reused by the editing operations, so a stale identifier is detected
//! instead of silently aliasing a newer node. Parent links are stored as
//! identifiers, which lets the evolution operators replace any node in
//! place. Replaced nodes leave empty slots behind; [`ProgramTree::compact`]
//! renumbers the tree densely once those outnumber the live nodes.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;

use crate::card::Card;
use crate::grid::{Cell, Grid, Orientation, SIZE};
use crate::hand::{Hand, PokerHand, HAND_SIZE};
use crate::point_system::PointSystem;
use crate::{PokerSquaresError, Result};

/// Identifier of a node within its tree
pub type NodeId = usize;

/// Placement heuristics available to decision leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The line holding the fewest cards
    FewestCards,
    /// The line holding the most cards
    MostCards,
    /// The line with the most cards of the drawn card's suit
    MostSuit,
    /// The line with the most cards of the drawn card's rank
    MostRank,
    /// The line where the drawn card extends the longest run of ranks
    ExtendStraight,
    /// The topmost row or leftmost column with space
    TopLeft,
    /// A uniformly random empty cell
    Random,
}

impl Strategy {
    pub const ALL: [Strategy; 7] = [
        Strategy::FewestCards,
        Strategy::MostCards,
        Strategy::MostSuit,
        Strategy::MostRank,
        Strategy::ExtendStraight,
        Strategy::TopLeft,
        Strategy::Random,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Ranking key of a line; higher keys are tried first
    fn line_key(self, hand: &Hand, line: usize, card: Card) -> i32 {
        let cards = hand.iter().flatten();
        match self {
            Strategy::FewestCards => -(cards.count() as i32),
            Strategy::MostCards => cards.count() as i32,
            Strategy::MostSuit => cards.filter(|c| c.suit() == card.suit()).count() as i32,
            Strategy::MostRank => cards.filter(|c| c.rank() == card.rank()).count() as i32,
            Strategy::ExtendStraight => straight_run(hand, card) as i32,
            Strategy::TopLeft => -(line as i32),
            Strategy::Random => 0,
        }
    }
}

pub(crate) fn random_orientation<R: Rng + ?Sized>(rng: &mut R) -> Orientation {
    if rng.gen::<bool>() {
        Orientation::Row
    } else {
        Orientation::Column
    }
}

/// Length of the run of consecutive ranks through `card` that the hand
/// would hold; zero if the hand already has the card's rank
///
/// Aces count both low and high.
fn straight_run(hand: &Hand, card: Card) -> usize {
    let mut ranks = 0u16;
    for c in hand.iter().flatten() {
        ranks |= 1 << c.rank();
    }
    if ranks & (1 << card.rank()) != 0 {
        return 0;
    }
    ranks |= 1 << card.rank();
    // Bit 13 mirrors the ace above the king.
    if ranks & 1 != 0 {
        ranks |= 1 << 13;
    }

    let run_at = |pos: u32| -> usize {
        let mut low = pos;
        while low > 0 && ranks & (1 << (low - 1)) != 0 {
            low -= 1;
        }
        let mut high = pos;
        while high < 13 && ranks & (1 << (high + 1)) != 0 {
            high += 1;
        }
        (high - low + 1) as usize
    };

    let run = run_at(card.rank() as u32);
    if card.is_ace() {
        run.max(run_at(13))
    } else {
        run
    }
}

/// Largest number of distinct ranks inside any five-rank straight window
fn straight_window(hand: &Hand) -> usize {
    let mut ranks = 0u16;
    for c in hand.iter().flatten() {
        ranks |= 1 << c.rank();
    }
    if ranks & 1 != 0 {
        ranks |= 1 << 13;
    }
    (0..=9)
        .map(|low| ((ranks >> low) & 0b1_1111).count_ones() as usize)
        .max()
        .unwrap_or(0)
}

fn largest_suit(hand: &Hand) -> usize {
    let mut counts = [0usize; 4];
    for c in hand.iter().flatten() {
        counts[c.suit()] += 1;
    }
    counts.into_iter().max().unwrap_or(0)
}

/// Point-system values used by rule nodes, computed once per point system
#[derive(Debug, Clone)]
pub struct EvalContext {
    system: Arc<PointSystem>,
    flush_score: i32,
    straight_score: i32,
    threshold: i32,
}

impl EvalContext {
    /// Precomputes the rule values for `system`
    pub fn new(system: Arc<PointSystem>) -> Self {
        EvalContext {
            flush_score: system.score_for(PokerHand::Flush),
            straight_score: system.score_for(PokerHand::Straight),
            threshold: system.median_score(),
            system,
        }
    }

    /// The point system rules are evaluated against
    pub fn system(&self) -> &Arc<PointSystem> {
        &self.system
    }

    /// Score a rule branches on: the hand score, or the flush or straight
    /// score scaled by how much of it the hand already holds
    pub fn potential(&self, hand: &Hand) -> i32 {
        let made = self.system.hand_score(hand);
        let flush = self.flush_score * largest_suit(hand) as i32 / HAND_SIZE as i32;
        let straight = self.straight_score * straight_window(hand) as i32 / HAND_SIZE as i32;
        made.max(flush).max(straight)
    }

    /// Branch threshold: the median category score
    pub fn threshold(&self) -> i32 {
        self.threshold
    }
}

/// Internal node: branches on the prospects of one row or column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub orientation: Orientation,
    pub line: usize,
    pub left: NodeId,
    pub right: NodeId,
}

impl Rule {
    /// Returns true to branch right
    ///
    /// The card goes hypothetically into the first open slot of the rule's
    /// line, or of the next line with space if that one is full.
    pub fn holds(&self, grid: &Grid, card: Card, ctx: &EvalContext) -> bool {
        for offset in 0..SIZE {
            let line = (self.line + offset) % SIZE;
            let mut hand = grid.line(self.orientation, line);
            // Full lines pass the card on to the next one, wrapping around.
            if let Some(slot) = hand.iter_mut().find(|slot| slot.is_none()) {
                *slot = Some(card);
                return ctx.potential(&hand) > ctx.threshold();
            }
        }
        false
    }
}

/// Leaf node: a fixed placement heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub strategy: Strategy,
    pub orientation: Orientation,
}

impl Decision {
    pub fn new(strategy: Strategy, orientation: Orientation) -> Self {
        Decision {
            strategy,
            orientation,
        }
    }

    /// A decision with uniformly chosen strategy and orientation
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Decision::new(Strategy::random(rng), random_orientation(rng))
    }

    /// Picks an empty cell for `card`
    ///
    /// Lines are ranked by the strategy's key with ties broken uniformly at
    /// random; the first empty cell along the ranked lines wins.
    pub fn place<R: Rng + ?Sized>(&self, grid: &Grid, card: Card, rng: &mut R) -> Result<Cell> {
        if self.strategy != Strategy::Random {
            let mut keys = [0i32; SIZE];
            for (line, key) in keys.iter_mut().enumerate() {
                *key = self
                    .strategy
                    .line_key(&grid.line(self.orientation, line), line, card);
            }
            // The sort is stable, so shuffling first randomizes equal keys.
            let mut lines = [0, 1, 2, 3, 4];
            lines.shuffle(rng);
            lines.sort_by_key(|&line| Reverse(keys[line]));

            for line in lines {
                for offset in 0..SIZE {
                    let cell = self.orientation.cell(line, offset);
                    if grid.is_empty(cell) {
                        return Ok(cell);
                    }
                }
            }
        }

        grid.empty_cells()
            .choose(rng)
            .ok_or(PokerSquaresError::NoEmptyCell)
    }
}

/// The two node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Rule(Rule),
    Decision(Decision),
}

/// A node stored in a tree's arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl TreeNode {
    /// Returns true for internal rule nodes
    pub fn is_rule(&self) -> bool {
        matches!(self.kind, NodeKind::Rule(_))
    }

    /// Left and right children of a rule node
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Rule(rule) => Some((rule.left, rule.right)),
            NodeKind::Decision(_) => None,
        }
    }

    /// A short description of what the node does
    pub fn label(&self) -> String {
        match self.kind {
            NodeKind::Rule(rule) => format!("check {:?} {}", rule.orientation, rule.line),
            NodeKind::Decision(decision) => {
                format!("{:?} by {:?}", decision.strategy, decision.orientation)
            }
        }
    }
}

/// A program tree
#[derive(Debug, PartialEq, Eq)]
pub struct ProgramTree {
    nodes: Vec<Option<TreeNode>>,
    root: NodeId,
}

impl ProgramTree {
    /// Creates the starting shape: a random rule with two random decisions
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tree = ProgramTree {
            nodes: Vec::with_capacity(3),
            root: 0,
        };
        let rule = Rule {
            orientation: random_orientation(rng),
            line: rng.gen_range(0..SIZE),
            left: 1,
            right: 2,
        };
        tree.insert(NodeKind::Rule(rule), None);
        tree.insert(NodeKind::Decision(Decision::random(rng)), Some(0));
        tree.insert(NodeKind::Decision(Decision::random(rng)), Some(0));
        tree
    }

    /// A tree consisting of a single decision leaf
    pub fn leaf(decision: Decision) -> Self {
        let mut tree = ProgramTree {
            nodes: Vec::new(),
            root: 0,
        };
        tree.root = tree.insert(NodeKind::Decision(decision), None);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Result<&TreeNode> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(PokerSquaresError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(PokerSquaresError::NodeNotFound(id))
    }

    /// Identifiers of all nodes currently in the tree, in insertion order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().flatten().map(|node| node.id).collect()
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of arena slots, including those of removed nodes
    pub fn slots(&self) -> usize {
        self.nodes.len()
    }

    /// Renumbers the live nodes densely if removed slots outnumber them
    ///
    /// Returns true if the tree was rebuilt. Identifiers taken before a
    /// rebuild are stale afterwards and may name unrelated nodes.
    pub fn compact(&mut self) -> Result<bool> {
        let live = self.len();
        if self.nodes.len() - live <= live {
            return Ok(false);
        }
        *self = self.deep_copy()?;
        Ok(true)
    }

    fn insert(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(TreeNode { id, parent, kind }));
        id
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.get_mut(id)?.parent = parent;
        Ok(())
    }

    /// Points whatever referred to `old` (its parent, or the root) at `new`
    fn relink(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self.get(old)?.parent;
        self.set_parent(new, parent)?;
        match parent {
            None => self.root = new,
            Some(parent_id) => {
                let NodeKind::Rule(rule) = &mut self.get_mut(parent_id)?.kind else {
                    return Err(PokerSquaresError::CorruptTree(parent_id));
                };
                if rule.left == old {
                    rule.left = new;
                } else if rule.right == old {
                    rule.right = new;
                } else {
                    return Err(PokerSquaresError::CorruptTree(old));
                }
            }
        }
        Ok(())
    }

    /// Number of rule nodes above `id`
    pub fn rule_depth(&self, id: NodeId) -> Result<usize> {
        let mut depth = 0;
        let mut current = self.get(id)?.parent;
        while let Some(parent) = current {
            let node = self.get(parent)?;
            if node.is_rule() {
                depth += 1;
            }
            current = node.parent;
        }
        Ok(depth)
    }

    /// Largest number of rule nodes on a path from `id` down to a leaf
    pub fn rule_height(&self, id: NodeId) -> Result<usize> {
        match self.get(id)?.children() {
            None => Ok(0),
            Some((left, right)) => Ok(1 + self.rule_height(left)?.max(self.rule_height(right)?)),
        }
    }

    /// Largest number of rule nodes on any root-to-leaf path
    pub fn max_depth(&self) -> Result<usize> {
        self.rule_height(self.root)
    }

    /// Replaces rule `id` by a rule with new parameters and the same children
    pub fn replace_rule(
        &mut self,
        id: NodeId,
        orientation: Orientation,
        line: usize,
    ) -> Result<NodeId> {
        let (left, right) = self
            .get(id)?
            .children()
            .ok_or(PokerSquaresError::WrongNodeKind(id))?;
        let new = self.insert(
            NodeKind::Rule(Rule {
                orientation,
                line,
                left,
                right,
            }),
            None,
        );
        self.relink(id, new)?;
        self.set_parent(left, Some(new))?;
        self.set_parent(right, Some(new))?;
        self.nodes[id] = None;
        Ok(new)
    }

    /// Replaces node `id` (a leaf) by a new decision leaf
    pub fn replace_decision(&mut self, id: NodeId, decision: Decision) -> Result<NodeId> {
        if self.get(id)?.is_rule() {
            return Err(PokerSquaresError::WrongNodeKind(id));
        }
        // Replacement gets a fresh id so stale handles to `id` fail.
        let new = self.insert(NodeKind::Decision(decision), None);
        self.relink(id, new)?;
        self.nodes[id] = None;
        Ok(new)
    }

    /// Replaces leaf `id` by a rule with two new decision leaves
    pub fn grow(
        &mut self,
        id: NodeId,
        orientation: Orientation,
        line: usize,
        left: Decision,
        right: Decision,
    ) -> Result<NodeId> {
        if self.get(id)?.is_rule() {
            return Err(PokerSquaresError::WrongNodeKind(id));
        }
        let left = self.insert(NodeKind::Decision(left), None);
        let right = self.insert(NodeKind::Decision(right), None);
        let new = self.insert(
            NodeKind::Rule(Rule {
                orientation,
                line,
                left,
                right,
            }),
            None,
        );
        self.relink(id, new)?;
        self.set_parent(left, Some(new))?;
        self.set_parent(right, Some(new))?;
        self.nodes[id] = None;
        Ok(new)
    }

    /// Copies the subtree rooted at `id` into `dst`, returning the new
    /// identifier of its root (with no parent set)
    fn copy_into(&self, id: NodeId, dst: &mut ProgramTree) -> Result<NodeId> {
        match self.get(id)?.kind {
            NodeKind::Decision(decision) => Ok(dst.insert(NodeKind::Decision(decision), None)),
            NodeKind::Rule(rule) => {
                let left = self.copy_into(rule.left, dst)?;
                let right = self.copy_into(rule.right, dst)?;
                let new = dst.insert(NodeKind::Rule(Rule { left, right, ..rule }), None);
                dst.set_parent(left, Some(new))?;
                dst.set_parent(right, Some(new))?;
                Ok(new)
            }
        }
    }

    /// A standalone copy of the subtree rooted at `id`
    pub fn subtree(&self, id: NodeId) -> Result<ProgramTree> {
        let mut copy = ProgramTree {
            nodes: Vec::with_capacity(self.nodes.len()),
            root: 0,
        };
        copy.root = self.copy_into(id, &mut copy)?;
        Ok(copy)
    }

    /// Deep copy with freshly numbered nodes and the same shape
    pub fn deep_copy(&self) -> Result<ProgramTree> {
        self.subtree(self.root)
    }

    fn remove_subtree(&mut self, id: NodeId) -> Result<()> {
        if let Some((left, right)) = self.get(id)?.children() {
            self.remove_subtree(left)?;
            self.remove_subtree(right)?;
        }
        self.nodes[id] = None;
        Ok(())
    }

    /// Replaces the subtree at `id` with a copy of `donor`
    pub fn graft(&mut self, id: NodeId, donor: &ProgramTree) -> Result<NodeId> {
        // Check first so a missing id leaves no orphaned copy behind.
        self.get(id)?;
        let new = donor.copy_into(donor.root, self)?;
        self.relink(id, new)?;
        // The old subtree is unreachable now; free its slots.
        self.remove_subtree(id)?;
        Ok(new)
    }

    /// Walks from the root to a decision leaf and returns its cell
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        card: Card,
        ctx: &EvalContext,
        rng: &mut R,
    ) -> Result<Cell> {
        let mut current = self.root;
        loop {
            match self.get(current)?.kind {
                NodeKind::Rule(rule) => {
                    // Right branch when the line looks promising.
                    current = if rule.holds(grid, card, ctx) {
                        rule.right
                    } else {
                        rule.left
                    };
                }
                NodeKind::Decision(decision) => return decision.place(grid, card, rng),
            }
        }
    }

    /// Returns a visualization of the tree
    pub fn visualize(&self) -> String {
        let mut result = String::new();
        self.visualize_node(self.root, 0, &mut result);
        result
    }

    fn visualize_node(&self, id: NodeId, depth: usize, output: &mut String) {
        let indent = "  ".repeat(depth);
        match self.get(id) {
            Ok(node) => {
                output.push_str(&format!("{}[{}] {}\n", indent, node.id, node.label()));
                if let Some((left, right)) = node.children() {
                    self.visualize_node(left, depth + 1, output);
                    self.visualize_node(right, depth + 1, output);
                }
            }
            Err(_) => output.push_str(&format!("{}[{}] <missing>\n", indent, id)),
        }
    }

    /// Checks parent links, child links and reachability of every node
    pub fn validate(&self) -> Result<()> {
        if self.get(self.root)?.parent.is_some() {
            return Err(PokerSquaresError::CorruptTree(self.root));
        }
        let mut reached = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            reached += 1;
            if reached > self.nodes.len() {
                // More visits than slots means a cycle.
                return Err(PokerSquaresError::CorruptTree(id));
            }
            if let Some((left, right)) = self.get(id)?.children() {
                for child in [left, right] {
                    if self.get(child)?.parent != Some(id) {
                        return Err(PokerSquaresError::CorruptTree(child));
                    }
                    stack.push(child);
                }
            }
        }
        if reached != self.len() {
            return Err(PokerSquaresError::CorruptTree(self.root));
        }
        Ok(())
    }
}

impl fmt::Display for ProgramTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.visualize())
    }
}
