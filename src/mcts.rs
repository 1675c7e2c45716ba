//! Monte Carlo Tree Search driver.
//!
//! One search runs a fixed budget of iterations over a fresh [`Tree`]:
//!
//! 1. Expand the root and seed the search by rolling out the child picked in
//!    `Min` mode.
//! 2. Each iteration descends from the root in `Max` mode to a leaf. An
//!    unvisited leaf is rolled out directly. A visited leaf is expanded and
//!    one new child (picked in `Max` mode) is rolled out instead, or the leaf
//!    itself if it turns out to be terminal.
//! 3. Every rollout batch is backpropagated to the root.
//! 4. The answer is the root child picked in `Min` mode.
//!
//! The search owns its random source; the tree is dropped once the move has
//! been read off.

use std::time::{Duration, Instant};

use fastrand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::board::{Board, BoardError};
use crate::config::SearchConfig;
use crate::playout::{rollout, rollout_parallel};
use crate::position::Position;
use crate::selection::{select_child, SelectMode};
use crate::tree::{NodeId, Tree};

/// Errors that can occur during search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("node {0} has no children to select from")]
    EmptySelection(NodeId),

    #[error("search config rejected: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Statistics of one root child after the search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary {
    pub position: Position,
    pub visits: u64,
    pub wins: u64,
    pub win_rate: f64,
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Recommended move for the side to move at the root
    pub best: Position,
    pub iterations: u32,
    /// Playouts run over the whole search
    pub total_simulations: u64,
    pub root_visits: u64,
    pub tree_size: usize,
    pub children: Vec<ChildSummary>,
    pub elapsed: Duration,
}

/// Search `board` with default heuristics and fresh entropy.
pub fn search(
    board: &Board,
    simulations_per_rollout: u32,
    max_iterations: u32,
) -> Result<Position, SearchError> {
    let config = SearchConfig::with_budget(simulations_per_rollout, max_iterations);
    tree_search(board, &config).map(|outcome| outcome.best)
}

/// Run a search configured by `config`, seeding its generator from
/// `config.seed` when set.
pub fn tree_search(board: &Board, config: &SearchConfig) -> Result<SearchOutcome, SearchError> {
    let mut rng = match config.seed {
        Some(seed) => Rng::with_seed(seed),
        None => Rng::new(),
    };
    tree_search_with_rng(board, config, &mut rng)
}

/// Run a search drawing all randomness from `rng`.
///
/// The config is validated first, since one built in code never went
/// through [`SearchConfig::load`].
pub fn tree_search_with_rng(
    board: &Board,
    config: &SearchConfig,
    rng: &mut Rng,
) -> Result<SearchOutcome, SearchError> {
    config
        .validate()
        .map_err(|e| SearchError::InvalidConfig(e.to_string()))?;
    if board.legal_moves().is_empty() {
        return Err(SearchError::NoLegalMoves);
    }

    let start = Instant::now();
    let mut search = Search {
        tree: Tree::new(board.clone()),
        config,
        rng,
        total_simulations: 0,
    };

    let root = search.tree.root();
    search.tree.expand(root)?;
    let seed_node = search.select(root, SelectMode::Min)?;
    search.evaluate(seed_node);

    for i in 0..config.max_iterations {
        search.iterate()?;
        trace!(iteration = i, nodes = search.tree.len(), "iteration done");
    }

    search.finish(start)
}

struct Search<'a> {
    tree: Tree,
    config: &'a SearchConfig,
    rng: &'a mut Rng,
    /// Playouts run so far; the `N` of the UCT formula.
    total_simulations: u64,
}

impl Search<'_> {
    fn select(&self, parent: NodeId, mode: SelectMode) -> Result<NodeId, SearchError> {
        select_child(
            &self.tree,
            parent,
            self.total_simulations,
            &self.config.heuristics,
            mode,
        )
    }

    /// Follow `Max` selections from the root to a node without children.
    fn descend(&self) -> Result<NodeId, SearchError> {
        let mut id = self.tree.root();
        while !self.tree.get(id).is_leaf() {
            id = self.select(id, SelectMode::Max)?;
        }
        Ok(id)
    }

    fn iterate(&mut self) -> Result<(), SearchError> {
        let leaf = self.descend()?;

        if self.tree.get(leaf).visits == 0 {
            self.evaluate(leaf);
            return Ok(());
        }

        if self.tree.expand(leaf)? == 0 {
            self.evaluate(leaf);
        } else {
            let child = self.select(leaf, SelectMode::Max)?;
            self.evaluate(child);
        }
        Ok(())
    }

    /// Roll out `id` once and credit the batch up to the root.
    fn evaluate(&mut self, id: NodeId) {
        let n = self.config.simulations_per_rollout;
        let board = &self.tree.get(id).board;
        let stats = if self.config.parallel_rollouts {
            rollout_parallel(board, n, self.config.playout, self.rng)
        } else {
            rollout(board, n, self.config.playout, self.rng)
        };

        self.tree.backpropagate(id, stats.wins, stats.losses, n);
        self.total_simulations += u64::from(n);
        trace!(
            node = %id,
            wins = stats.wins,
            losses = stats.losses,
            draws = stats.draws,
            elapsed_us = stats.elapsed.as_micros() as u64,
            "rollout"
        );
    }

    fn finish(self, start: Instant) -> Result<SearchOutcome, SearchError> {
        let root = self.tree.root();
        let best_id = select_child(
            &self.tree,
            root,
            0,
            &self.config.heuristics,
            SelectMode::Min,
        )?;
        let best = self
            .tree
            .get(best_id)
            .move_position
            .ok_or(SearchError::EmptySelection(root))?;

        let children: Vec<ChildSummary> = self
            .tree
            .children(root)
            .iter()
            .filter_map(|&id| {
                let node = self.tree.get(id);
                node.move_position.map(|position| ChildSummary {
                    position,
                    visits: node.visits,
                    wins: node.wins,
                    win_rate: node.win_rate(),
                })
            })
            .collect();

        for child in &children {
            debug!(
                "move {} v={} w={} wr={:.3}",
                child.position, child.visits, child.wins, child.win_rate
            );
        }

        let outcome = SearchOutcome {
            best,
            iterations: self.config.max_iterations,
            total_simulations: self.total_simulations,
            root_visits: self.tree.get(root).visits,
            tree_size: self.tree.len(),
            children,
            elapsed: start.elapsed(),
        };
        debug!(
            best = %outcome.best,
            nodes = outcome.tree_size,
            simulations = outcome.total_simulations,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(outcome)
    }
}
