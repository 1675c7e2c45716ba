//! Self-play drivers for benchmarking the search.
//!
//! A match plays full games from the standard opening between two agents and
//! tallies the results. All randomness, including the MCTS agent's, comes
//! from the single generator handed to the match.

use std::fmt;

use fastrand::Rng;
use tracing::info;

use crate::board::{Board, Color, Status};
use crate::config::SearchConfig;
use crate::mcts::{tree_search_with_rng, SearchError};
use crate::playout::{choose_move, PlayoutPolicy};
use crate::position::Position;

/// A move-choosing player.
#[derive(Debug, Clone, PartialEq)]
pub enum Agent {
    /// Tree search with the given budget and weights (its `seed` is ignored).
    Mcts(SearchConfig),
    /// Uniformly random legal moves.
    Random,
    /// Random moves that shy away from squares diagonal to a corner.
    RandomPlus,
}

impl Agent {
    pub fn choose(&self, board: &Board, rng: &mut Rng) -> Result<Position, SearchError> {
        match self {
            Agent::Mcts(config) => Ok(tree_search_with_rng(board, config, rng)?.best),
            Agent::Random => {
                choose_move(board, PlayoutPolicy::Uniform, rng).ok_or(SearchError::NoLegalMoves)
            }
            Agent::RandomPlus => choose_move(board, PlayoutPolicy::AvoidVeryBad, rng)
                .ok_or(SearchError::NoLegalMoves),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Agent::Mcts(_) => "mcts",
            Agent::Random => "random",
            Agent::RandomPlus => "random-plus",
        }
    }
}

/// Results of a series of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchTally {
    pub black_wins: u32,
    pub white_wins: u32,
    pub draws: u32,
}

impl MatchTally {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::BlackWins => self.black_wins += 1,
            Status::WhiteWins => self.white_wins += 1,
            Status::Draw => self.draws += 1,
            Status::Undetermined => {}
        }
    }

    pub fn games(&self) -> u32 {
        self.black_wins + self.white_wins + self.draws
    }
}

impl fmt::Display for MatchTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Black wins: {}, White wins: {}, Draws: {}",
            self.black_wins, self.white_wins, self.draws
        )
    }
}

/// Play one game from the opening and return the final board.
pub fn play_game(black: &Agent, white: &Agent, rng: &mut Rng) -> Result<Board, SearchError> {
    let mut board = Board::fresh_game();
    while !board.is_terminal() {
        let agent = match board.turn() {
            Color::Black => black,
            Color::White => white,
        };
        let mv = agent.choose(&board, rng)?;
        board.apply_move(mv)?;
    }
    Ok(board)
}

/// Play `games` games with fixed colours and tally the outcomes.
pub fn play_match(
    games: u32,
    black: &Agent,
    white: &Agent,
    rng: &mut Rng,
) -> Result<MatchTally, SearchError> {
    let mut tally = MatchTally::default();
    for game in 0..games {
        let board = play_game(black, white, rng)?;
        info!(
            game,
            status = ?board.status(),
            black = board.black_score(),
            white = board.white_score(),
            "game finished"
        );
        tally.record(board.status());
    }
    Ok(tally)
}
