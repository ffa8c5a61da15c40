//! Headless two-player turn loop.

use crate::deck::INITIAL_HAND_SIZE;
use crate::moves::MoveError;
use crate::solver::SearchResult;
use crate::{Board, Deck, Hand, MoveSearchEngine, Position, Tile, TileError};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Waiting on the given seat
    InProgress(Seat),
    Won(Seat),
    /// Both players passed in succession with an empty deck
    Tie,
}

/// What ending a turn did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Number of hand tiles laid on the board
    Placed(usize),
    /// Nothing was placed, so a tile was drawn
    Drew(Tile),
    /// Nothing was placed and the deck was empty
    Passed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("the game is over")]
    GameOver,
    #[error("the board holds an invalid set")]
    InvalidBoard,
    #[error("the hand holds tiles that were on the board when the turn started")]
    BoardTilesInHand,
    #[error("no tile at ({}, {})", .0.col, .0.row)]
    EmptyCell(Position),
    #[error("cell ({}, {}) is occupied", .0.col, .0.row)]
    CellOccupied(Position),
    #[error("no tile at hand position {0}")]
    NoSuchHandTile(usize),
    #[error(transparent)]
    Tiles(#[from] TileError),
    #[error(transparent)]
    Move(#[from] MoveError),
}

/// A computer turn: the search that drove it and how the turn ended
#[derive(Debug, Clone)]
pub struct ComputerTurn {
    pub search: SearchResult,
    pub outcome: TurnOutcome,
}

/// Game state for two players sharing one board and deck.
///
/// The player to move edits the board and their hand freely; nothing is
/// checked until [`Game::end_turn`]. [`Game::undo`] rolls back to the start
/// of the turn.
#[derive(Debug, Clone)]
pub struct Game {
    deck: Deck,
    board: Board,
    hands: [Hand; 2],
    status: GameStatus,
    turn_start_board: Board,
    turn_start_hand: Hand,
    previous_turn_passed: bool,
}

impl Game {
    /// Shuffle a full deck and deal both hands
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Deck::shuffled(rng);
        let mut hands = [Hand::new(), Hand::new()];
        for hand in &mut hands {
            deck.deal(hand, INITIAL_HAND_SIZE);
        }
        Self::from_parts(deck, Board::new(), hands)
    }

    /// Start from an arbitrary position, first seat to move
    pub fn from_parts(deck: Deck, board: Board, hands: [Hand; 2]) -> Self {
        let turn_start_hand = hands[Seat::First.index()].clone();
        Game {
            deck,
            turn_start_board: board.clone(),
            board,
            hands,
            status: GameStatus::InProgress(Seat::First),
            turn_start_hand,
            previous_turn_passed: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        !matches!(self.status, GameStatus::InProgress(_))
    }

    /// Seat to move, or `GameOver`
    pub fn current_seat(&self) -> Result<Seat, TurnError> {
        match self.status {
            GameStatus::InProgress(seat) => Ok(seat),
            _ => Err(TurnError::GameOver),
        }
    }

    fn current_hand_mut(&mut self) -> Result<&mut Hand, TurnError> {
        let seat = self.current_seat()?;
        Ok(&mut self.hands[seat.index()])
    }

    /// Move the tile at `index` in the current hand onto an empty cell
    pub fn place_from_hand(&mut self, index: usize, pos: Position) -> Result<(), TurnError> {
        if !self.board.is_cell_empty(pos) {
            return Err(TurnError::CellOccupied(pos));
        }
        let hand = self.current_hand_mut()?;
        if index >= hand.count() {
            return Err(TurnError::NoSuchHandTile(index));
        }
        let tile = hand.remove_at(index);
        self.board.place_tile(pos, tile);
        Ok(())
    }

    /// Pick a tile up off the board into the current hand
    pub fn take_from_board(&mut self, pos: Position) -> Result<Tile, TurnError> {
        self.current_seat()?;
        let tile = self.board.remove_tile_at(pos).ok_or(TurnError::EmptyCell(pos))?;
        self.current_hand_mut()?.add(tile);
        Ok(tile)
    }

    /// Slide a board tile to another empty cell
    pub fn move_on_board(&mut self, from: Position, to: Position) -> Result<(), TurnError> {
        self.current_seat()?;
        if !self.board.is_cell_empty(to) {
            return Err(TurnError::CellOccupied(to));
        }
        let tile = self.board.remove_tile_at(from).ok_or(TurnError::EmptyCell(from))?;
        self.board.place_tile(to, tile);
        Ok(())
    }

    /// Throw away everything done since the turn started
    pub fn undo(&mut self) {
        if let GameStatus::InProgress(seat) = self.status {
            self.board = self.turn_start_board.clone();
            self.hands[seat.index()] = self.turn_start_hand.clone();
        }
    }

    /// Finish the current turn.
    ///
    /// The board must be valid and the hand may only have lost tiles. A
    /// player who placed nothing draws; with an empty deck that is a pass,
    /// and a second pass in a row ties the game.
    pub fn end_turn(&mut self) -> Result<TurnOutcome, TurnError> {
        let seat = self.current_seat()?;
        if !self.board.is_valid() {
            return Err(TurnError::InvalidBoard);
        }
        let hand = &mut self.hands[seat.index()];
        if !hand.is_subset_of(&self.turn_start_hand) {
            return Err(TurnError::BoardTilesInHand);
        }

        let placed = self.turn_start_hand.count() - hand.count();
        let outcome = if placed > 0 {
            TurnOutcome::Placed(placed)
        } else {
            match self.deck.pop() {
                Some(tile) => {
                    hand.add(tile);
                    TurnOutcome::Drew(tile)
                }
                None => TurnOutcome::Passed,
            }
        };

        let passed = outcome == TurnOutcome::Passed;
        self.status = if hand.is_empty() {
            GameStatus::Won(seat)
        } else if passed && self.previous_turn_passed {
            GameStatus::Tie
        } else {
            GameStatus::InProgress(seat.other())
        };
        self.previous_turn_passed = passed;

        if let GameStatus::InProgress(next) = self.status {
            self.turn_start_board = self.board.clone();
            self.turn_start_hand = self.hands[next.index()].clone();
        }
        Ok(outcome)
    }

    /// Let `engine` play the current seat's turn from its starting position
    pub fn play_computer_turn<R: Rng>(&mut self, engine: &mut MoveSearchEngine<R>) -> Result<ComputerTurn, TurnError> {
        let seat = self.current_seat()?;
        self.undo();

        let search = engine.find_move(&self.board, &self.hands[seat.index()])?;
        if let Some(chosen) = &search.chosen {
            match chosen.commit(&mut self.board, &mut self.hands[seat.index()]) {
                // A layout that does not fit on the board counts as no move
                Ok(()) | Err(MoveError::Board(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }

        let outcome = self.end_turn()?;
        Ok(ComputerTurn { search, outcome })
    }
}
