//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays random legal moves until the game ends. A rollout runs a
//! batch of independent playouts from the same position and tallies the
//! results from the perspective of the side to move at the start.
//!
//! Every playout gets its own generator seeded from the caller's `Rng`, so a
//! batch produces the same tally whether it runs sequentially or on the rayon
//! pool.

use std::time::{Duration, Instant};

use fastrand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Status};
use crate::constants::{VERY_BAD_REDRAWS, VERY_BAD_SQUARES};
use crate::position::Position;

/// How a playout picks among the legal moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoutPolicy {
    /// Uniformly at random.
    #[default]
    Uniform,
    /// Uniformly, but redraw up to twice after landing on a square
    /// diagonal to a corner.
    AvoidVeryBad,
}

/// Tally of one rollout batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloutStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Wall time of the batch; diagnostic only.
    pub elapsed: Duration,
}

impl RolloutStats {
    #[inline]
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// Pick a playout move, or `None` if the side to move has no legal move.
pub fn choose_move(board: &Board, policy: PlayoutPolicy, rng: &mut Rng) -> Option<Position> {
    let moves = board.legal_moves();
    if moves.is_empty() {
        return None;
    }

    let mut mv = moves[rng.usize(..moves.len())];
    if policy == PlayoutPolicy::AvoidVeryBad {
        for _ in 0..VERY_BAD_REDRAWS {
            if !VERY_BAD_SQUARES.contains(&mv) {
                break;
            }
            mv = moves[rng.usize(..moves.len())];
        }
    }
    Some(mv)
}

/// Play `board` to the end with the given policy and return the final board.
pub fn simulate(mut board: Board, policy: PlayoutPolicy, rng: &mut Rng) -> Board {
    while !board.is_terminal() {
        let Some(mv) = choose_move(&board, policy, rng) else {
            break;
        };
        let applied = board.apply_move(mv);
        debug_assert!(applied.is_ok(), "playout move {mv} rejected: {applied:?}");
        if applied.is_err() {
            break;
        }
    }
    board
}

/// Uniform random playout.
pub fn simulate_random(board: Board, rng: &mut Rng) -> Board {
    simulate(board, PlayoutPolicy::Uniform, rng)
}

/// Random playout that shies away from squares diagonal to a corner.
pub fn simulate_random_plus(board: Board, rng: &mut Rng) -> Board {
    simulate(board, PlayoutPolicy::AvoidVeryBad, rng)
}

/// Outcome counts `(wins, losses, draws)` of one finished game for `side`.
fn score_outcome(side: Color, status: Status) -> (u32, u32, u32) {
    match status.winner() {
        Some(winner) if winner == side => (1, 0, 0),
        Some(_) => (0, 1, 0),
        None if status == Status::Draw => (0, 0, 1),
        // Unreachable for a finished playout; count as a loss.
        None => (0, 1, 0),
    }
}

fn playout_once(board: &Board, policy: PlayoutPolicy, seed: u64) -> (u32, u32, u32) {
    let mut rng = Rng::with_seed(seed);
    let end = simulate(board.clone(), policy, &mut rng);
    debug_assert!(end.is_terminal(), "playout stopped before the game ended");
    score_outcome(board.turn(), end.status())
}

fn add(a: (u32, u32, u32), b: (u32, u32, u32)) -> (u32, u32, u32) {
    (a.0 + b.0, a.1 + b.1, a.2 + b.2)
}

/// Run `n_sim` independent playouts from `board` on the current thread.
pub fn rollout(board: &Board, n_sim: u32, policy: PlayoutPolicy, rng: &mut Rng) -> RolloutStats {
    let start = Instant::now();
    let (wins, losses, draws) = (0..n_sim)
        .map(|_| playout_once(board, policy, rng.u64(..)))
        .fold((0, 0, 0), add);

    RolloutStats {
        wins,
        losses,
        draws,
        elapsed: start.elapsed(),
    }
}

/// Like [`rollout`], but the playouts run on the rayon thread pool.
pub fn rollout_parallel(
    board: &Board,
    n_sim: u32,
    policy: PlayoutPolicy,
    rng: &mut Rng,
) -> RolloutStats {
    let start = Instant::now();
    let seeds: Vec<u64> = (0..n_sim).map(|_| rng.u64(..)).collect();
    let (wins, losses, draws) = seeds
        .into_par_iter()
        .map(|seed| playout_once(board, policy, seed))
        .reduce(|| (0, 0, 0), add);

    RolloutStats {
        wins,
        losses,
        draws,
        elapsed: start.elapsed(),
    }
}
