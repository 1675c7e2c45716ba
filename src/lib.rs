//! Reversi-MCTS: an Othello move engine built on Monte Carlo Tree Search.
//!
//! Given any 8x8 position, the engine grows a search tree with UCT selection
//! blended with positional heuristics, evaluates leaves with random
//! playouts, and recommends one move.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, positional tables and default budgets
//! - [`position`] - Board coordinates and Othello notation
//! - [`board`] - Rules engine (legality, flips, passes, scoring)
//! - [`playout`] - Random playouts and rollout batches
//! - [`tree`] - Arena-backed search tree
//! - [`selection`] - UCT and the composite child score
//! - [`mcts`] - The search driver
//! - [`config`] - Search budget and heuristic weights
//! - [`protocol`] - JSON request boundary and line engine
//! - [`selfplay`] - Benchmark matches between agents
//!
//! ## Example
//!
//! ```
//! use reversi_mcts::board::Board;
//! use reversi_mcts::mcts::search;
//!
//! let mut board = Board::fresh_game();
//! let mv = search(&board, 4, 50).unwrap();
//! board.apply_move(mv).unwrap();
//! println!("Played {mv}\n{board}");
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod mcts;
pub mod playout;
pub mod position;
pub mod protocol;
pub mod selection;
pub mod selfplay;
pub mod tree;
