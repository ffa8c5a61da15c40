//! Candidate board reconfigurations and how they are scored and committed.

use crate::board::BoardError;
use crate::{Board, Hand, Tile};
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Score of a move that loses a board tile or uses a tile from nowhere
pub const INVALID_SCORE: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("cannot commit an invalid move")]
    Invalid,
    #[error("board changed since the move was generated")]
    StaleBoard,
    #[error("hand changed since the move was generated")]
    StaleHand,
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Outcome of scoring a move
#[derive(Debug, Clone, PartialEq, Eq)]
struct Evaluation {
    score: i32,
    /// Hand tiles the move places, in the order they were matched
    hand_tiles_used: Vec<Tile>,
}

impl Evaluation {
    fn invalid() -> Self {
        Evaluation {
            score: INVALID_SCORE,
            hand_tiles_used: Vec::new(),
        }
    }
}

/// A proposed full board layout, relative to the board and hand it was built from.
///
/// The snapshots are shared between every candidate of one search and are
/// never mutated; the live game state is only touched by [`Move::commit`].
#[derive(Debug, Clone)]
pub struct Move {
    source_board: Rc<Board>,
    source_hand: Rc<Hand>,
    sets: Vec<Vec<Tile>>,
    evaluation: OnceCell<Evaluation>,
}

impl Move {
    pub fn new(source_board: Rc<Board>, source_hand: Rc<Hand>, sets: Vec<Vec<Tile>>) -> Self {
        Move {
            source_board,
            source_hand,
            sets,
            evaluation: OnceCell::new(),
        }
    }

    /// Build a move against copies of `board` and `hand`
    pub fn from_snapshot(board: &Board, hand: &Hand, sets: Vec<Vec<Tile>>) -> Self {
        Self::new(Rc::new(board.clone()), Rc::new(hand.clone()), sets)
    }

    /// The board layout this move would produce, one tile sequence per set
    pub fn sets(&self) -> &[Vec<Tile>] {
        &self.sets
    }

    pub fn source_board(&self) -> &Board {
        &self.source_board
    }

    pub fn source_hand(&self) -> &Hand {
        &self.source_hand
    }

    /// Number of hand tiles placed, or [`INVALID_SCORE`]. Computed once.
    pub fn score(&self) -> i32 {
        self.evaluation().score
    }

    pub fn is_valid(&self) -> bool {
        self.score() != INVALID_SCORE
    }

    /// Hand tiles this move places. Empty for an invalid move.
    pub fn hand_tiles_used(&self) -> &[Tile] {
        &self.evaluation().hand_tiles_used
    }

    /// Whether the score has already been computed
    pub fn is_evaluated(&self) -> bool {
        self.evaluation.get().is_some()
    }

    fn evaluation(&self) -> &Evaluation {
        self.evaluation
            .get_or_init(|| evaluate(&self.source_board, &self.source_hand, &self.sets))
    }

    /// Apply the move to the live board and hand.
    ///
    /// `board` and `hand` must hold the same tiles as the snapshots the move
    /// was generated from. Nothing is modified when an error is returned.
    pub fn commit(&self, board: &mut Board, hand: &mut Hand) -> Result<(), MoveError> {
        if !self.is_valid() {
            return Err(MoveError::Invalid);
        }
        if *board != *self.source_board {
            return Err(MoveError::StaleBoard);
        }
        if !hand.same_tiles(&self.source_hand) {
            return Err(MoveError::StaleHand);
        }

        let next = Board::from_sets(&self.sets)?;
        *board = next;
        for tile in self.hand_tiles_used() {
            hand.remove_tile(tile);
        }
        Ok(())
    }

    pub fn summary(&self) -> MoveSummary {
        MoveSummary {
            score: self.score(),
            sets: self.sets.clone(),
            hand_tiles_used: self.hand_tiles_used().to_vec(),
        }
    }
}

/// Serializable view of a scored move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSummary {
    pub score: i32,
    pub sets: Vec<Vec<Tile>>,
    pub hand_tiles_used: Vec<Tile>,
}

fn count_tiles<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> HashMap<Tile, usize> {
    let mut counts = HashMap::new();
    for tile in tiles {
        *counts.entry(*tile).or_insert(0) += 1;
    }
    counts
}

fn evaluate(board: &Board, hand: &Hand, sets: &[Vec<Tile>]) -> Evaluation {
    let board_tiles = board.tiles();
    let used = count_tiles(sets.iter().flatten());

    // Every board tile must survive into the new layout
    let mut from_board = count_tiles(&board_tiles);
    let conserved = from_board
        .iter()
        .all(|(tile, needed)| used.get(tile).copied().unwrap_or(0) >= *needed);
    if !conserved {
        return Evaluation::invalid();
    }

    let mut from_hand = count_tiles(hand.iter());
    let mut hand_tiles_used = Vec::new();
    for tile in sets.iter().flatten() {
        if let Some(remaining) = from_board.get_mut(tile).filter(|n| **n > 0) {
            *remaining -= 1;
            continue;
        }
        match from_hand.get_mut(tile).filter(|n| **n > 0) {
            Some(remaining) => {
                *remaining -= 1;
                hand_tiles_used.push(*tile);
            }
            None => return Evaluation::invalid(),
        }
    }

    Evaluation {
        score: hand_tiles_used.len() as i32,
        hand_tiles_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_tiles;

    fn tiles(s: &str) -> Vec<Tile> {
        parse_tiles(s).unwrap()
    }

    fn hand(s: &str) -> Hand {
        Hand::from_tiles(tiles(s))
    }

    #[test]
    fn test_score_counts_hand_tiles() {
        let board = Board::from_sets(&[tiles("b4 b5 b6")]).unwrap();
        let mv = Move::from_snapshot(&board, &hand("b7 k1"), vec![tiles("b4 b5 b6 b7")]);
        assert_eq!(mv.score(), 1);
        assert_eq!(mv.hand_tiles_used(), &tiles("b7")[..]);
    }

    #[test]
    fn test_dropping_a_board_tile_is_invalid() {
        let board = Board::from_sets(&[tiles("b4 b5 b6 b7")]).unwrap();
        let mv = Move::from_snapshot(&board, &hand("r1 r2 r3"), vec![tiles("b4 b5 b6"), tiles("r1 r2 r3")]);
        assert_eq!(mv.score(), INVALID_SCORE);
        assert!(!mv.is_valid());
        assert!(mv.hand_tiles_used().is_empty());
    }

    #[test]
    fn test_tile_from_nowhere_is_invalid() {
        let mv = Move::from_snapshot(&Board::new(), &hand("r1 r2"), vec![tiles("r1 r2 r3")]);
        assert_eq!(mv.score(), INVALID_SCORE);

        // A single hand copy cannot be used twice
        let mv = Move::from_snapshot(&Board::new(), &hand("r5 b5 y5"), vec![tiles("r5 b5 y5"), tiles("r5 b5 k5")]);
        assert_eq!(mv.score(), INVALID_SCORE);
    }

    #[test]
    fn test_duplicate_tiles_split_between_board_and_hand() {
        let board = Board::from_sets(&[tiles("r5 b5 y5")]).unwrap();
        let mv = Move::from_snapshot(
            &board,
            &hand("r5 r6 r7"),
            vec![tiles("r5 b5 y5"), tiles("r5 r6 r7")],
        );
        assert_eq!(mv.score(), 3);
        assert_eq!(mv.hand_tiles_used(), &tiles("r5 r6 r7")[..]);
    }

    #[test]
    fn test_no_op_move_scores_zero() {
        let board = Board::from_sets(&[tiles("r1 r2 r3"), tiles("k9 b9 y9")]).unwrap();
        let mv = Move::from_snapshot(&board, &hand("y1"), board.sets());
        assert_eq!(mv.score(), 0);
    }

    #[test]
    fn test_score_is_memoized() {
        let mv = Move::from_snapshot(&Board::new(), &hand("r1 r2 r3"), vec![tiles("r1 r2 r3")]);
        assert!(!mv.is_evaluated());
        assert_eq!(mv.score(), 3);
        assert!(mv.is_evaluated());
        assert_eq!(mv.score(), 3);
    }

    #[test]
    fn test_valid_move_conserves_tiles() {
        let board = Board::from_sets(&[tiles("r9 b9 y9 k9")]).unwrap();
        let source = hand("r7 r8 k2");
        let mv = Move::from_snapshot(&board, &source, vec![tiles("b9 y9 k9"), tiles("r7 r8 r9")]);
        assert_eq!(mv.score(), 2);

        let mut placed: Vec<Tile> = mv.sets().iter().flatten().copied().collect();
        let mut expected = board.tiles();
        expected.extend_from_slice(mv.hand_tiles_used());
        placed.sort();
        expected.sort();
        assert_eq!(placed, expected);
    }

    #[test]
    fn test_commit_rewrites_board_and_hand() {
        let mut board = Board::from_sets(&[tiles("b4 b5 b6")]).unwrap();
        let mut live_hand = hand("k1 b7 b3");
        let mv = Move::from_snapshot(&board, &live_hand, vec![tiles("b3 b4 b5 b6 b7")]);
        assert_eq!(mv.score(), 2);

        mv.commit(&mut board, &mut live_hand).unwrap();
        assert_eq!(board.sets(), vec![tiles("b3 b4 b5 b6 b7")]);
        assert_eq!(live_hand.tiles(), &tiles("k1")[..]);
        assert!(board.is_valid());
    }

    #[test]
    fn test_commit_rejects_invalid_and_stale_moves() {
        let mut board = Board::new();
        let mut live_hand = hand("r1 r2");
        let invalid = Move::from_snapshot(&board, &live_hand, vec![tiles("r1 r2 r3")]);
        assert_eq!(invalid.commit(&mut board, &mut live_hand), Err(MoveError::Invalid));

        let mut live_hand = hand("r1 r2 r3");
        let mv = Move::from_snapshot(&board, &live_hand, vec![tiles("r1 r2 r3")]);

        let mut other_board = Board::from_sets(&[tiles("k1 k2 k3")]).unwrap();
        assert_eq!(mv.commit(&mut other_board, &mut live_hand), Err(MoveError::StaleBoard));

        let mut other_hand = hand("r1 r2");
        assert_eq!(mv.commit(&mut board, &mut other_hand), Err(MoveError::StaleHand));
        assert!(board.is_empty());
        assert_eq!(other_hand.count(), 2);

        // Order within the hand does not matter
        let mut reordered = hand("r3 r1 r2");
        mv.commit(&mut board, &mut reordered).unwrap();
        assert!(reordered.is_empty());
    }

    #[test]
    fn test_commit_without_space_leaves_state_untouched() {
        let long_run = tiles("k1 k2 k3 k4 k5 k6 k7 k8 k9 k10 k11 k12 k13");
        let sets: Vec<Vec<Tile>> = std::iter::repeat_n(long_run.clone(), 10).collect();
        let mut all = Vec::new();
        for set in &sets {
            all.extend_from_slice(set);
        }
        let mut board = Board::new();
        let mut live_hand = Hand::from_tiles(all);
        let mv = Move::from_snapshot(&board, &live_hand, sets);
        assert_eq!(mv.score(), 130);

        let result = mv.commit(&mut board, &mut live_hand);
        assert!(matches!(result, Err(MoveError::Board(BoardError::NoSpace { .. }))));
        assert!(board.is_empty());
        assert_eq!(live_hand.count(), 130);
    }

    #[test]
    fn test_summary_serializes() {
        let mv = Move::from_snapshot(&Board::new(), &hand("r1 r2 r3"), vec![tiles("r1 r2 r3")]);
        let json = serde_json::to_string(&mv.summary()).unwrap();
        assert_eq!(
            json,
            r#"{"score":3,"sets":[["r1","r2","r3"]],"hand_tiles_used":["r1","r2","r3"]}"#
        );
    }
}
