//! Child selection: UCT blended with positional heuristics.
//!
//! Each child is scored from its parent's perspective by adding up
//!
//! - the UCT score of the child's own statistics,
//! - a mobility term, `ln(mobility + 1) / (visits + 1)`,
//! - an inner-board term, the UCT score over the distance from the centre,
//! - a positional term, a flat multiple of the UCT score for corners and the
//!   squares around them,
//! - a greed penalty, the mover's disc gain over the discs on the board.
//!
//! [`SelectMode::Max`] takes the best sum while descending the tree.
//! [`SelectMode::Min`] reads the final move off the root: child statistics
//! are kept from the child's side, so the move that leaves the opponent the
//! lowest score wins, with the inner and positional bonuses subtracted and
//! the greed penalty added. Ties go to the earliest child.

use crate::config::HeuristicWeights;
use crate::constants::{BAD_SQUARES, CORNERS, VERY_BAD_SQUARES};
use crate::mcts::SearchError;
use crate::position::Position;
use crate::tree::{Node, NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Highest composite score; used while descending.
    Max,
    /// Lowest composite score among visited children; used to seed the
    /// search and to pick the final move.
    Min,
}

/// Upper Confidence bound applied to Trees.
#[inline]
pub fn uct(wins: f64, visits: f64, total_visits: f64, exploration: f64) -> f64 {
    wins / (visits + 1.0)
        + exploration.sqrt() * ((total_visits + 1.0).ln() / (visits + 1.0)).sqrt()
}

/// Positional multiplier for a move. Corners are checked first.
pub fn positional_multiplier(mv: Position, weights: &HeuristicWeights) -> f64 {
    if CORNERS.contains(&mv) {
        weights.corner
    } else if BAD_SQUARES.contains(&mv) {
        weights.bad
    } else if VERY_BAD_SQUARES.contains(&mv) {
        weights.very_bad
    } else {
        0.0
    }
}

/// The individual terms of a child's composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreTerms {
    pub uct: f64,
    pub mobility: f64,
    pub inner: f64,
    pub positional: f64,
    pub greed: f64,
}

impl ScoreTerms {
    pub fn total(&self, mode: SelectMode) -> f64 {
        match mode {
            SelectMode::Max => {
                self.uct + self.mobility + self.inner + self.positional - self.greed
            }
            SelectMode::Min => {
                self.uct + self.mobility - self.inner - self.positional + self.greed
            }
        }
    }
}

pub fn score_terms(
    parent: &Node,
    child: &Node,
    total_visits: u64,
    weights: &HeuristicWeights,
) -> ScoreTerms {
    let visits = child.visits as f64;
    let uct = uct(
        child.wins as f64,
        visits,
        total_visits as f64,
        weights.exploration,
    );
    let mobility = weights.mobility * (child.mobility + 1.0).ln() / (visits + 1.0);

    let (inner, positional) = match child.move_position {
        Some(mv) => (
            uct * weights.inner / mv.distance_from_centre(),
            uct * positional_multiplier(mv, weights),
        ),
        None => (0.0, 0.0),
    };

    let mover = parent.board.turn();
    let gained = child.board.score(mover) as f64 - parent.board.score(mover) as f64;
    let greed = gained / child.board.occupied_count().max(1) as f64;

    ScoreTerms {
        uct,
        mobility,
        inner,
        positional,
        greed,
    }
}

/// Pick a child of `parent` according to `mode`.
///
/// `total_visits` is the number of playouts run so far in the whole search.
/// In `Min` mode unvisited children are skipped; if none has been visited
/// the first child is returned.
pub fn select_child(
    tree: &Tree,
    parent: NodeId,
    total_visits: u64,
    weights: &HeuristicWeights,
    mode: SelectMode,
) -> Result<NodeId, SearchError> {
    let children = tree.children(parent);
    let Some(&first) = children.first() else {
        return Err(SearchError::EmptySelection(parent));
    };

    let parent_node = tree.get(parent);
    let mut best = first;
    let mut best_score = match mode {
        SelectMode::Max => f64::NEG_INFINITY,
        SelectMode::Min => f64::INFINITY,
    };

    for &id in children {
        let child = tree.get(id);
        if mode == SelectMode::Min && child.visits == 0 {
            continue;
        }
        let score = score_terms(parent_node, child, total_visits, weights).total(mode);
        let better = match mode {
            SelectMode::Max => score > best_score,
            SelectMode::Min => score < best_score,
        };
        if better {
            best = id;
            best_score = score;
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Color};

    fn expanded_root() -> Tree {
        let mut tree = Tree::new(Board::fresh_game());
        tree.expand(tree.root()).unwrap();
        tree
    }

    #[test]
    fn test_uct() {
        assert_eq!(uct(0.0, 0.0, 0.0, 3.0), 0.0);
        let expected = 1.0 + 3f64.sqrt() * (4f64.ln() / 2.0).sqrt();
        assert!((uct(2.0, 1.0, 3.0, 3.0) - expected).abs() < 1e-12);
        // More visits shrink the exploration bonus
        assert!(uct(0.0, 10.0, 100.0, 3.0) < uct(0.0, 1.0, 100.0, 3.0));
    }

    #[test]
    fn test_positional_buckets() {
        let w = HeuristicWeights::default();
        assert_eq!(positional_multiplier(Position::new(0, 0), &w), 0.5);
        assert_eq!(positional_multiplier(Position::new(0, 1), &w), -0.15);
        assert_eq!(positional_multiplier(Position::new(6, 6), &w), -0.35);
        assert_eq!(positional_multiplier(Position::new(2, 3), &w), 0.0);
    }

    #[test]
    fn test_empty_selection_is_an_error() {
        let tree = Tree::new(Board::fresh_game());
        let err = select_child(
            &tree,
            tree.root(),
            0,
            &HeuristicWeights::default(),
            SelectMode::Max,
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::EmptySelection(id) if id == tree.root()));
    }

    #[test]
    fn test_ties_go_to_first_child() {
        let mut tree = expanded_root();
        let root = tree.root();
        let children = tree.children(root).to_vec();
        for &id in &children {
            let node = tree.get_mut(id);
            node.visits = 10;
            node.wins = 5;
            node.mobility = 3.0;
        }

        let w = HeuristicWeights::default();
        let a = select_child(&tree, root, 40, &w, SelectMode::Max).unwrap();
        let b = select_child(&tree, root, 40, &w, SelectMode::Max).unwrap();
        // The four opening moves are symmetric, so every score ties
        assert_eq!(a, children[0]);
        assert_eq!(a, b);
        assert_eq!(
            select_child(&tree, root, 40, &w, SelectMode::Min).unwrap(),
            children[0]
        );
    }

    #[test]
    fn test_min_falls_back_to_first_child() {
        let tree = expanded_root();
        let first = tree.children(tree.root())[0];
        let picked = select_child(
            &tree,
            tree.root(),
            0,
            &HeuristicWeights::default(),
            SelectMode::Min,
        )
        .unwrap();
        assert_eq!(picked, first);
    }

    #[test]
    fn test_min_skips_unvisited() {
        let mut tree = expanded_root();
        let root = tree.root();
        let third = tree.children(root)[2];
        {
            let node = tree.get_mut(third);
            node.visits = 20;
            node.wins = 15;
        }
        // Unvisited siblings would score lower, but only visited ones count
        let picked =
            select_child(&tree, root, 0, &HeuristicWeights::default(), SelectMode::Min).unwrap();
        assert_eq!(picked, third);
    }

    #[test]
    fn test_max_prefers_higher_win_count() {
        let mut tree = expanded_root();
        let root = tree.root();
        let children = tree.children(root).to_vec();
        for (i, &id) in children.iter().enumerate() {
            let node = tree.get_mut(id);
            node.visits = 10;
            node.wins = if i == 1 { 9 } else { 2 };
        }
        let w = HeuristicWeights::default();
        assert_eq!(
            select_child(&tree, root, 40, &w, SelectMode::Max).unwrap(),
            children[1]
        );
        assert_eq!(
            select_child(&tree, root, 40, &w, SelectMode::Min).unwrap(),
            children[0]
        );
    }

    #[test]
    fn test_score_terms_for_corner_capture() {
        let p = Position::new;
        // Black's only move is the corner, flipping (0,1)
        let board = Board::reconstruct_from(&[p(0, 2)], &[p(0, 1)], Color::Black)
            .unwrap();
        let mut tree = Tree::new(board);
        tree.expand(tree.root()).unwrap();
        let child_id = tree.children(tree.root())[0];
        {
            let child = tree.get_mut(child_id);
            assert_eq!(child.move_position, Some(p(0, 0)));
            child.visits = 4;
            child.wins = 3;
            child.mobility = 5.0;
        }

        let w = HeuristicWeights::default();
        let terms = score_terms(tree.get(tree.root()), tree.get(child_id), 20, &w);

        let uct = 3.0 / 5.0 + 3f64.sqrt() * (21f64.ln() / 5.0).sqrt();
        let mobility = 0.5 * 6f64.ln() / 5.0;
        let inner = uct * 0.8 / (2.0 * 3.5f64 * 3.5).sqrt();
        let positional = uct * 0.5;
        // Black goes from one disc to three, with three on the board
        let greed = 2.0 / 3.0;

        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
        assert!(close(terms.uct, uct));
        assert!(close(terms.mobility, mobility));
        assert!(close(terms.inner, inner));
        assert!(close(terms.positional, positional));
        assert!(close(terms.greed, greed));
        assert!(close(
            terms.total(SelectMode::Max),
            uct + mobility + inner + positional - greed
        ));
        assert!(close(
            terms.total(SelectMode::Min),
            uct + mobility - inner - positional + greed
        ));
    }

    #[test]
    fn test_score_terms_penalise_very_bad_square() {
        let mut tree = expanded_root();
        let root = tree.root();
        let id = tree.children(root)[0];
        {
            let node = tree.get_mut(id);
            node.visits = 2;
            node.wins = 1;
            node.move_position = Some(Position::new(1, 1));
        }
        let terms = score_terms(tree.get(root), tree.get(id), 10, &HeuristicWeights::default());
        assert!(terms.uct > 0.0);
        assert!(terms.positional < 0.0);
        assert!((terms.positional - terms.uct * -0.35).abs() < 1e-12);
    }

    #[test]
    fn test_greed_term() {
        let tree = expanded_root();
        let root = tree.get(tree.root());
        let child = tree.get(root.children[0]);
        let terms = score_terms(root, child, 0, &HeuristicWeights::default());
        // Black gains two discs (one placed, one flipped) with five on the board
        assert!((terms.greed - 2.0 / 5.0).abs() < 1e-12);
        assert_eq!(terms.uct, 0.0);
        assert_eq!(terms.positional, 0.0);
    }
}
