//! The shared table: a fixed grid of cells holding placed tiles.

use crate::{Tile, is_set};
use thiserror::Error;

/// Number of cell columns on the board
pub const BOARD_COLS: usize = 16;
/// Number of cell rows on the board
pub const BOARD_ROWS: usize = 9;

/// Screen-space origin of cell (0, 0)
pub const BOARD_ORIGIN_X: i32 = 45;
pub const BOARD_ORIGIN_Y: i32 = 20;
/// Side length of a drawn tile, in pixels
pub const TILE_SIZE: i32 = 60;
/// Gap between neighbouring cells, in pixels
pub const TILE_SPACING: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("no row has {needed} contiguous empty cells for a set of {len} tiles")]
    NoSpace { len: usize, needed: usize },
    #[error("cell ({col}, {row}) is outside the 16x9 board")]
    OutOfBounds { col: usize, row: usize },
}

/// A cell coordinate: column within a row, and row from the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    /// Checked constructor
    pub fn new(col: usize, row: usize) -> Result<Self, BoardError> {
        if col >= BOARD_COLS || row >= BOARD_ROWS {
            return Err(BoardError::OutOfBounds { col, row });
        }
        Ok(Position { col, row })
    }
}

/// Screen rectangle of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// A maximal run of occupied cells within one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSet {
    pub row: usize,
    pub start_col: usize,
    pub tiles: Vec<Tile>,
}

impl PlacedSet {
    /// Cell holding the tile at `offset` within this set
    pub fn position(&self, offset: usize) -> Position {
        Position {
            col: self.start_col + offset,
            row: self.row,
        }
    }
}

/// The board. Cloning produces a fully independent copy.
///
/// Legality is checked on demand with [`Board::is_valid`]; mutations never
/// enforce it, since players pass through invalid layouts mid-turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Tile>; BOARD_COLS]; BOARD_ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Board {
            cells: [[None; BOARD_COLS]; BOARD_ROWS],
        }
    }

    /// Create a board by placing each tile sequence in turn
    pub fn from_sets<S: AsRef<[Tile]>>(sets: &[S]) -> Result<Self, BoardError> {
        let mut board = Board::new();
        for set in sets {
            board.place_set(set.as_ref())?;
        }
        Ok(board)
    }

    /// Tile at a cell, or `None` if the cell is empty
    pub fn tile_at(&self, pos: Position) -> Option<Tile> {
        self.cells[pos.row][pos.col]
    }

    pub fn is_cell_empty(&self, pos: Position) -> bool {
        self.tile_at(pos).is_none()
    }

    /// All tiles on the board, row-major
    pub fn tiles(&self) -> Vec<Tile> {
        self.cells.iter().flatten().filter_map(|cell| *cell).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// Every maximal run of occupied cells, scanning row-major, with its location
    pub fn placed_sets(&self) -> Vec<PlacedSet> {
        let mut sets = Vec::new();

        for (row, cells) in self.cells.iter().enumerate() {
            let mut current: Option<PlacedSet> = None;
            for (col, cell) in cells.iter().enumerate() {
                match cell {
                    Some(tile) => match current.as_mut() {
                        Some(set) => set.tiles.push(*tile),
                        None => {
                            current = Some(PlacedSet {
                                row,
                                start_col: col,
                                tiles: vec![*tile],
                            })
                        }
                    },
                    None => sets.extend(current.take()),
                }
            }
            // Sets never continue onto the next row
            sets.extend(current.take());
        }

        sets
    }

    /// Every maximal run of occupied cells as a raw (unvalidated) tile sequence
    pub fn sets(&self) -> Vec<Vec<Tile>> {
        self.placed_sets().into_iter().map(|set| set.tiles).collect()
    }

    /// True iff every placed run of tiles is a group or a run. An empty board is valid.
    pub fn is_valid(&self) -> bool {
        self.placed_sets().iter().all(|set| is_set(&set.tiles))
    }

    /// Put a tile in a cell, returning whatever was there
    pub fn place_tile(&mut self, pos: Position, tile: Tile) -> Option<Tile> {
        self.cells[pos.row][pos.col].replace(tile)
    }

    /// Clear one cell, returning the tile it held
    pub fn remove_tile_at(&mut self, pos: Position) -> Option<Tile> {
        self.cells[pos.row][pos.col].take()
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells = [[None; BOARD_COLS]; BOARD_ROWS];
    }

    /// Place a set in the first stretch of `len + 2` empty cells (row-major).
    ///
    /// The set goes one cell into the stretch so that it is separated from
    /// its neighbours, unless the stretch starts at the row edge. Returns the
    /// position of the first tile placed.
    pub fn place_set(&mut self, set: &[Tile]) -> Result<Position, BoardError> {
        let needed = set.len() + 2;
        let start = self
            .find_empty_stretch(needed)
            .ok_or(BoardError::NoSpace { len: set.len(), needed })?;

        let first_col = if start.col == 0 { 0 } else { start.col + 1 };
        for (offset, tile) in set.iter().enumerate() {
            self.cells[start.row][first_col + offset] = Some(*tile);
        }

        Ok(Position {
            col: first_col,
            row: start.row,
        })
    }

    fn find_empty_stretch(&self, needed: usize) -> Option<Position> {
        for (row, cells) in self.cells.iter().enumerate() {
            let mut run_start = 0;
            let mut run_len = 0;
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_some() {
                    run_len = 0;
                    continue;
                }
                if run_len == 0 {
                    run_start = col;
                }
                run_len += 1;
                if run_len == needed {
                    return Some(Position { col: run_start, row });
                }
            }
        }
        None
    }

    /// Screen rectangle where a cell is drawn
    pub fn cell_rect(pos: Position) -> CellRect {
        CellRect {
            x: BOARD_ORIGIN_X + pos.col as i32 * (TILE_SIZE + TILE_SPACING),
            y: BOARD_ORIGIN_Y + pos.row as i32 * (TILE_SIZE + TILE_SPACING),
            width: TILE_SIZE,
            height: TILE_SIZE,
        }
    }

    /// Cell under a screen point, if any
    pub fn cell_at(x: i32, y: i32) -> Option<Position> {
        let pitch = TILE_SIZE + TILE_SPACING;
        let dx = x - BOARD_ORIGIN_X;
        let dy = y - BOARD_ORIGIN_Y;
        if dx < 0 || dy < 0 {
            return None;
        }

        let pos = Position::new((dx / pitch) as usize, (dy / pitch) as usize).ok()?;
        Self::cell_rect(pos).contains(x, y).then_some(pos)
    }
}
