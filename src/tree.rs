//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`].
//! Children are owned through the arena; the parent link is a plain index
//! used only to walk back up during backpropagation. Each node holds its own
//! copy of the board reached by its move.
//!
//! The tree is indexed by move sequence, not by position: two paths that
//! reach the same board produce two distinct nodes.

use std::fmt;

use crate::board::{Board, BoardError};
use crate::position::Position;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Board after `move_position` was played on the parent's board
    pub board: Board,
    /// Move that produced this node (`None` for the root)
    pub move_position: Option<Position>,
    /// Parent node (`None` for the root)
    pub parent: Option<NodeId>,
    /// Empty until expanded, never shrunk afterwards
    pub children: Vec<NodeId>,
    /// Playouts credited to this node
    pub visits: u64,
    /// Wins credited from this node's turn perspective
    pub wins: u64,
    /// Sum of legal-move counts observed while backpropagating
    pub mobility: f64,
    pub depth: u32,
}

impl Node {
    fn root(board: Board) -> Self {
        Self {
            board,
            move_position: None,
            parent: None,
            children: Vec::new(),
            visits: 0,
            wins: 0,
            mobility: 0.0,
            depth: 0,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Fraction of credited playouts won, or 0 when unvisited.
    pub fn win_rate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Arena-backed search tree.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// A tree holding only a root for `board`.
    pub fn new(board: Board) -> Self {
        Self {
            nodes: vec![Node::root(board)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Materialise one child per legal move of a leaf.
    ///
    /// Returns the number of children created: zero for a terminal board,
    /// and zero for a node that was already expanded (it is left as is).
    pub fn expand(&mut self, id: NodeId) -> Result<usize, BoardError> {
        let node = self.get(id);
        if !node.is_leaf() || node.board.is_terminal() {
            return Ok(0);
        }

        let depth = node.depth + 1;
        let new_nodes = node
            .board
            .legal_moves()
            .iter()
            .map(|&mv| {
                let mut board = node.board.clone();
                board.apply_move(mv)?;
                Ok(Node {
                    board,
                    move_position: Some(mv),
                    parent: Some(id),
                    children: Vec::new(),
                    visits: 0,
                    wins: 0,
                    mobility: 0.0,
                    depth,
                })
            })
            .collect::<Result<Vec<Node>, BoardError>>()?;

        // Link only once every move has been applied
        let first = self.nodes.len() as u32;
        let created = new_nodes.len();
        self.nodes.extend(new_nodes);
        self.get_mut(id).children = (first..first + created as u32).map(NodeId).collect();
        Ok(created)
    }

    /// Credit a rollout batch run at `leaf` to it and every ancestor.
    ///
    /// Nodes whose side to move matches the leaf's get `wins` and add their
    /// own legal-move count to `mobility`; the others get `losses`, which are
    /// wins from their perspective. Every node gains `simulations` visits.
    pub fn backpropagate(&mut self, leaf: NodeId, wins: u32, losses: u32, simulations: u32) {
        let turn = self.get(leaf).board.turn();
        let mut current = Some(leaf);

        while let Some(id) = current {
            let node = self.get_mut(id);
            if node.board.turn() == turn {
                node.wins += u64::from(wins);
                node.mobility += node.board.legal_moves().len() as f64;
            } else {
                node.wins += u64::from(losses);
            }
            node.visits += u64::from(simulations);
            current = node.parent;
        }
    }
}
