//! JSON request boundary.
//!
//! A request carries a board as two disc lists plus the side to move:
//!
//! ```text
//! {"blackFilled": [[3,4],[4,3]], "whiteFilled": [[3,3],[4,4]], "turn": 1}
//! ```
//!
//! The engine searches, plays its move, and answers with the move, the colour
//! that played it, the side to move afterwards, and both scores:
//!
//! ```text
//! {"move": [2,3], "colour": 1, "turn": -1, "blackScore": 4, "whiteScore": 1}
//! ```
//!
//! [`Engine::run`] speaks this one request per line over any reader/writer
//! pair, which is how the HTTP and function-as-a-service front ends (or a
//! shell pipe) talk to the engine.

use std::collections::HashSet;
use std::io::{BufRead, Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::board::{Board, BoardError, Color};
use crate::config::SearchConfig;
use crate::constants::MAX_REQUEST_BYTES;
use crate::mcts::{tree_search, SearchError};
use crate::position::Position;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("request exceeds the limit of {} bytes", MAX_REQUEST_BYTES)]
    PayloadTooLarge,

    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("square {0} is listed as both black and white")]
    Inconsistent(Position),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A board position as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub black_filled: Vec<[i64; 2]>,
    pub white_filled: Vec<[i64; 2]>,
    /// `1` for Black, `-1` for White
    pub turn: i64,
}

impl GameState {
    pub fn from_board(board: &Board) -> Self {
        let pairs = |color: Color| -> Vec<[i64; 2]> {
            board.discs(color).into_iter().map(Position::to_pair).collect()
        };
        Self {
            black_filled: pairs(Color::Black),
            white_filled: pairs(Color::White),
            turn: board.turn().value().into(),
        }
    }

    /// Validate the request and build the board it describes.
    pub fn to_board(&self) -> Result<Board, ProtocolError> {
        let turn = Color::from_value(self.turn)?;
        let positions = |pairs: &[[i64; 2]]| -> Vec<Position> {
            pairs.iter().copied().map(Position::from_pair).collect()
        };
        let black = positions(&self.black_filled);
        let white = positions(&self.white_filled);

        if let Some(&bad) = black.iter().chain(&white).find(|p| !p.is_in_range()) {
            return Err(BoardError::MalformedPosition(bad).into());
        }
        let black_set: HashSet<Position> = black.iter().copied().collect();
        if let Some(&clash) = white.iter().find(|p| black_set.contains(*p)) {
            return Err(ProtocolError::Inconsistent(clash));
        }

        Ok(Board::reconstruct_from(&black, &white, turn)?)
    }
}

/// The engine's answer to a [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    #[serde(rename = "move")]
    pub mv: [i64; 2],
    /// Colour that played `mv`
    pub colour: i64,
    /// Side to move after `mv`
    pub turn: i64,
    pub black_score: u32,
    pub white_score: u32,
}

/// Parse a size-bounded request body.
pub fn decode_request(body: &[u8]) -> Result<GameState, ProtocolError> {
    if body.len() > MAX_REQUEST_BYTES {
        return Err(ProtocolError::PayloadTooLarge);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Build the board, search it, play the chosen move and report.
///
/// `colour` is the side that actually moved, which differs from the
/// requested turn when that side had to pass.
pub fn decide(
    state: &GameState,
    config: &SearchConfig,
) -> Result<DecisionResponse, ProtocolError> {
    let mut board = state.to_board()?;
    let mover = board.turn();
    let outcome = tree_search(&board, config)?;
    board.apply_move(outcome.best)?;

    info!(
        colour = %mover,
        mv = %outcome.best,
        black = board.black_score(),
        white = board.white_score(),
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "decision"
    );

    Ok(DecisionResponse {
        mv: outcome.best.to_pair(),
        colour: mover.value().into(),
        turn: board.turn().value().into(),
        black_score: board.black_score(),
        white_score: board.white_score(),
    })
}

/// Line-oriented JSON engine.
pub struct Engine {
    config: SearchConfig,
}

impl Engine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Answer one request body with a JSON line (an `error` object on failure).
    pub fn handle(&self, body: &[u8]) -> String {
        match decode_request(body).and_then(|state| decide(&state, &self.config)) {
            Ok(response) => serde_json::to_string(&response)
                .unwrap_or_else(|e| error_json(&ProtocolError::Json(e))),
            Err(e) => {
                warn!(error = %e, "request rejected");
                error_json(&e)
            }
        }
    }

    /// Serve requests, one per line, until EOF or a `quit` line.
    pub fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), ProtocolError>
    where
        R: BufRead,
        W: Write,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader
                .by_ref()
                .take(MAX_REQUEST_BYTES as u64 + 1)
                .read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }

            let response = if buf.len() > MAX_REQUEST_BYTES && buf.last() != Some(&b'\n') {
                reader.skip_until(b'\n')?;
                warn!("oversized request dropped");
                error_json(&ProtocolError::PayloadTooLarge)
            } else {
                let line = buf.trim_ascii();
                // Skip empty lines and comments
                if line.is_empty() || line.starts_with(b"#") {
                    continue;
                }
                if line.eq_ignore_ascii_case(b"quit") {
                    break;
                }
                self.handle(line)
            };

            writeln!(writer, "{response}")?;
            writer.flush()?;
        }
        Ok(())
    }
}

fn error_json(e: &ProtocolError) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}
