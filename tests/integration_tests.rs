//! Integration tests for reversi-mcts
//!
//! These drive the public API the way the engine's callers do: build a board,
//! play or search moves, and check the rules engine invariants along the way.

use std::collections::HashSet;

use fastrand::Rng;

use reversi_mcts::board::{Board, BoardError, Color, Status};
use reversi_mcts::config::SearchConfig;
use reversi_mcts::constants::{DIRECTIONS, N};
use reversi_mcts::mcts::{search, tree_search};
use reversi_mcts::playout::{rollout, PlayoutPolicy};
use reversi_mcts::position::Position;
use reversi_mcts::protocol::{decide, GameState};
use reversi_mcts::selfplay::{play_game, Agent};

// =============================================================================
// Helpers
// =============================================================================

fn all_squares() -> impl Iterator<Item = Position> {
    (0..N as i8).flat_map(|row| (0..N as i8).map(move |col| Position::new(row, col)))
}

fn count_discs(board: &Board) -> (u32, u32) {
    all_squares().fold((0, 0), |(b, w), p| match board.cell(p) {
        Some(Color::Black) => (b + 1, w),
        Some(Color::White) => (b, w + 1),
        None => (b, w),
    })
}

/// Empty squares touching a disc, computed from scratch.
fn brute_force_frontier(board: &Board) -> HashSet<Position> {
    all_squares()
        .filter(|&p| board.cell(p).is_none())
        .filter(|&p| {
            DIRECTIONS
                .iter()
                .any(|&d| board.cell(p.offset(d)).is_some())
        })
        .collect()
}

/// Play a random game, calling `check` on every board along the way.
fn random_game(seed: u64, mut check: impl FnMut(&Board, &Board, Position, u32)) -> Board {
    let mut rng = Rng::with_seed(seed);
    let mut board = Board::fresh_game();
    while !board.is_terminal() {
        let moves = board.legal_moves();
        let mv = moves[rng.usize(..moves.len())];
        let before = board.clone();
        let flipped = board.apply_move(mv).expect("move drawn from legal_moves");
        check(&before, &board, mv, flipped);
    }
    board
}

fn p(row: i8, col: i8) -> Position {
    Position::new(row, col)
}

// =============================================================================
// Rules engine
// =============================================================================

#[test]
fn test_opening_moves() {
    let board = Board::fresh_game();
    let legal: HashSet<Position> = board.legal_moves().iter().copied().collect();
    let expected: HashSet<Position> = [p(2, 3), p(3, 2), p(4, 5), p(5, 4)].into_iter().collect();
    assert_eq!(board.turn(), Color::Black);
    assert_eq!(legal, expected);
}

#[test]
fn test_scores_match_discs_on_every_board() {
    for seed in 0..10 {
        let end = random_game(seed, |_, after, _, _| {
            let (black, white) = count_discs(after);
            assert_eq!(after.black_score(), black);
            assert_eq!(after.white_score(), white);
            assert!(after.occupied_count() <= 64);
        });
        assert!((4..=64).contains(&end.occupied_count()));
        assert!(matches!(
            end.status(),
            Status::BlackWins | Status::WhiteWins | Status::Draw
        ));
    }
}

#[test]
fn test_move_changes_scores_by_flip_count() {
    random_game(21, |before, after, _, flipped| {
        let mover = before.turn();
        let opponent = mover.opponent();
        assert_eq!(after.score(mover), before.score(mover) + flipped + 1);
        assert_eq!(after.score(opponent), before.score(opponent) - flipped);
    });
}

#[test]
fn test_frontier_and_legal_moves_stay_consistent() {
    random_game(33, |_, after, mv, _| {
        let frontier: HashSet<Position> = after.frontier().iter().copied().collect();
        assert_eq!(frontier.len(), after.frontier().len(), "duplicate frontier entry");
        assert_eq!(frontier, brute_force_frontier(after));
        assert!(!frontier.contains(&mv));
        for m in after.legal_moves() {
            assert!(frontier.contains(m));
            assert!(after.has_legal_direction(*m));
        }
        if !after.is_terminal() {
            assert!(!after.legal_moves().is_empty());
        }
    });
}

#[test]
fn test_winner_follows_scores() {
    for seed in 100..110 {
        let end = random_game(seed, |_, _, _, _| {});
        let expected = match end.black_score().cmp(&end.white_score()) {
            std::cmp::Ordering::Greater => Status::BlackWins,
            std::cmp::Ordering::Less => Status::WhiteWins,
            std::cmp::Ordering::Equal => Status::Draw,
        };
        assert_eq!(end.status(), expected);
    }
}

#[test]
fn test_pass_keeps_scores() {
    // After Black takes (0,2), White has no reply and Black moves again
    let mut board =
        Board::reconstruct_from(&[p(0, 0), p(7, 0)], &[p(0, 1), p(7, 1), p(7, 2)], Color::Black)
            .unwrap();
    board.apply_move(p(0, 2)).unwrap();
    assert_eq!(board.turn(), Color::Black);
    assert_eq!(count_discs(&board), (4, 2));
    assert_eq!((board.black_score(), board.white_score()), (4, 2));
}

#[test]
fn test_illegal_moves_rejected() {
    let mut board = Board::fresh_game();
    board.apply_move(p(2, 3)).unwrap();
    let snapshot = board.clone();

    for bad in [p(2, 3), p(0, 0), p(5, 4)] {
        assert_eq!(board.apply_move(bad), Err(BoardError::IllegalMove(bad)));
    }
    assert_eq!(
        board.apply_move(p(-1, 3)),
        Err(BoardError::MalformedPosition(p(-1, 3)))
    );
    assert_eq!(board, snapshot);
}

// =============================================================================
// Rollouts and search
// =============================================================================

#[test]
fn test_rollout_with_no_simulations() {
    let stats = rollout(
        &Board::fresh_game(),
        0,
        PlayoutPolicy::AvoidVeryBad,
        &mut Rng::with_seed(0),
    );
    assert_eq!((stats.wins, stats.losses, stats.draws), (0, 0, 0));
}

#[test]
fn test_search_picks_a_legal_opening_move() {
    let board = Board::fresh_game();
    for (sims, iterations) in [(1, 1), (2, 10), (5, 30)] {
        let mv = search(&board, sims, iterations).unwrap();
        assert!(board.legal_moves().contains(&mv), "{mv} is not legal");
    }
}

#[test]
fn test_search_midgame_position() {
    let mut board = Board::fresh_game();
    let mut rng = Rng::with_seed(4);
    for _ in 0..20 {
        let moves = board.legal_moves();
        board.apply_move(moves[rng.usize(..moves.len())]).unwrap();
    }
    let outcome = tree_search(&board, &SearchConfig::for_testing()).unwrap();
    assert!(board.legal_moves().contains(&outcome.best));
    assert_eq!(outcome.children.len(), board.legal_moves().len());
}

#[test]
fn test_full_game_against_random() {
    let mcts = Agent::Mcts(SearchConfig::with_budget(2, 8));
    let end = play_game(&mcts, &Agent::RandomPlus, &mut Rng::with_seed(99)).unwrap();
    assert!(end.is_terminal());
    assert!((4..=64).contains(&end.occupied_count()));
}

// =============================================================================
// Request boundary
// =============================================================================

#[test]
fn test_decide_for_white() {
    let mut board = Board::fresh_game();
    board.apply_move(p(2, 3)).unwrap();
    let state = GameState::from_board(&board);
    assert_eq!(state.turn, -1);

    let response = decide(&state, &SearchConfig::for_testing()).unwrap();
    assert!(board.legal_moves().contains(&Position::from_pair(response.mv)));
    assert_eq!(response.colour, -1);
    assert_eq!(response.turn, 1);
    assert_eq!(response.black_score + response.white_score, 6);
}
