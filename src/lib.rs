use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod board;
pub mod config;
pub mod deck;
pub mod game;
pub mod moves;
pub mod runs;
pub mod solver;
pub mod tiles;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use board::{Board, Position};
pub use config::SearchConfig;
pub use deck::Deck;
pub use moves::Move;
pub use solver::{MoveSearchEngine, SearchResult, Strategy};
pub use tiles::TileMultiset;

/// Smallest tile rank.
pub const MIN_RANK: u8 = 1;
/// Largest tile rank.
pub const MAX_RANK: u8 = 13;
/// Number of ranks per colour.
pub const NUM_RANKS: usize = 13;
/// Number of tile colours.
pub const NUM_COLOURS: usize = 4;
/// Number of distinct (colour, rank) tile types.
pub const NUM_DISTINCT_TILES: usize = NUM_RANKS * NUM_COLOURS;
/// Physical copies of every tile type in a full deck.
pub const COPIES_PER_TILE: u8 = 2;
/// Minimum number of tiles in a group or run.
pub const MIN_SET_SIZE: usize = 3;

/// Errors produced while reading tiles and melds, or when a tile
/// multiset would hold more copies than physically exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("empty tile string")]
    Empty,
    #[error("invalid colour: {0}")]
    InvalidColour(String),
    #[error("invalid rank: {0}")]
    InvalidRank(String),
    #[error("invalid meld: {0}")]
    InvalidMeld(String),
    #[error("more than two copies of {0}")]
    CopyLimit(Tile),
}

/// Tile colour. The discriminant order is the canonical colour order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    Red = 0,
    Blue = 1,
    Yellow = 2,
    Black = 3,
}

impl Colour {
    /// All colours in canonical order
    pub const ALL: [Colour; NUM_COLOURS] = [Colour::Red, Colour::Blue, Colour::Yellow, Colour::Black];

    /// Position of this colour in the canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Colour at a canonical index (0-3)
    pub fn from_index(index: usize) -> Self {
        assert!(index < NUM_COLOURS, "Colour index must be 0-3");
        Self::ALL[index]
    }

    /// Single-letter code: r, b, y, k
    pub fn letter(self) -> char {
        match self {
            Colour::Red => 'r',
            Colour::Blue => 'b',
            Colour::Yellow => 'y',
            Colour::Black => 'k',
        }
    }

    /// Parse a single-letter colour code
    pub fn from_letter(s: &str) -> Result<Self, TileError> {
        match s {
            "r" => Ok(Colour::Red),
            "b" => Ok(Colour::Blue),
            "y" => Ok(Colour::Yellow),
            "k" => Ok(Colour::Black),
            _ => Err(TileError::InvalidColour(s.to_string())),
        }
    }
}

/// A numbered tile packed into a u8.
/// - Bits 0-1: Colour (00 = Red, 01 = Blue, 10 = Yellow, 11 = Black)
/// - Bits 2-5: Rank (1-13)
///
/// Two tiles are equal iff they share rank and colour; copies of the same
/// tile carry no identity of their own. Empty board cells are `None`
/// rather than a tile value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile(u8);

impl Tile {
    const COLOUR_MASK: u8 = 0b0000_0011;
    const RANK_MASK: u8 = 0b0011_1100;
    const RANK_SHIFT: u8 = 2;

    /// Create a new tile from colour and rank (1-13)
    pub fn new(colour: Colour, rank: u8) -> Self {
        assert!((MIN_RANK..=MAX_RANK).contains(&rank), "Rank must be 1-13");
        Tile((rank << Self::RANK_SHIFT) | colour as u8)
    }

    /// Create a tile, or `None` if the rank is outside 1-13
    pub fn try_new(colour: Colour, rank: u8) -> Option<Self> {
        (MIN_RANK..=MAX_RANK)
            .contains(&rank)
            .then(|| Tile::new(colour, rank))
    }

    /// Tile at a canonical multiset index (colour-major, then rank)
    pub fn from_index(index: usize) -> Self {
        assert!(index < NUM_DISTINCT_TILES, "Tile index must be 0-51");
        Tile::new(Colour::from_index(index / NUM_RANKS), (index % NUM_RANKS) as u8 + 1)
    }

    pub fn colour(&self) -> Colour {
        Colour::from_index((self.0 & Self::COLOUR_MASK) as usize)
    }

    pub fn rank(&self) -> u8 {
        (self.0 & Self::RANK_MASK) >> Self::RANK_SHIFT
    }

    /// Canonical multiset index: colour-major, then ascending rank
    pub fn index(&self) -> usize {
        self.colour().index() * NUM_RANKS + self.rank() as usize - 1
    }

    /// Same colour, one rank lower
    pub fn pred(&self) -> Option<Tile> {
        Tile::try_new(self.colour(), self.rank() - 1)
    }

    /// Same colour, one rank higher
    pub fn succ(&self) -> Option<Tile> {
        Tile::try_new(self.colour(), self.rank() + 1)
    }

    /// Key for sorting colour-then-rank
    pub fn colour_rank_key(&self) -> (Colour, u8) {
        (self.colour(), self.rank())
    }

    /// Key for sorting rank-then-colour
    pub fn rank_colour_key(&self) -> (u8, Colour) {
        (self.rank(), self.colour())
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.colour().letter(), self.rank())
    }
}

/// Format: "r13" (red 13), "b1" (blue 1), "y7" (yellow 7), "k9" (black 9)
impl FromStr for Tile {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TileError::Empty);
        }
        if s.len() < 2 || !s.is_char_boundary(1) {
            return Err(TileError::InvalidRank(s.to_string()));
        }

        let colour = Colour::from_letter(&s[0..1])?;
        let rank: u8 = s[1..]
            .parse()
            .map_err(|_| TileError::InvalidRank(s[1..].to_string()))?;

        Tile::try_new(colour, rank).ok_or_else(|| TileError::InvalidRank(rank.to_string()))
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a whitespace-separated list of tiles, e.g. "r1 r2 b7"
pub fn parse_tiles(input: &str) -> Result<Vec<Tile>, TileError> {
    input.split_whitespace().map(str::parse).collect()
}

/// Type of meld in rummy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeldType {
    /// A group: same rank, different colours
    Group,
    /// A run: consecutive ranks, same colour
    Run,
}

/// True iff `tiles` holds 3 or 4 tiles of one rank in pairwise distinct colours.
pub fn is_group(tiles: &[Tile]) -> bool {
    if tiles.len() < MIN_SET_SIZE || tiles.len() > NUM_COLOURS {
        return false;
    }

    let mut per_colour = [0u8; NUM_COLOURS];
    for tile in tiles {
        per_colour[tile.colour().index()] += 1;
    }
    if per_colour.iter().any(|&count| count > 1) {
        return false;
    }

    tiles.windows(2).all(|pair| pair[0].rank() == pair[1].rank())
}

/// True iff `tiles`, in the given order, is at least 3 tiles of one colour
/// with each rank exactly one above the previous. Does not sort.
pub fn is_run(tiles: &[Tile]) -> bool {
    if tiles.len() < MIN_SET_SIZE {
        return false;
    }

    tiles
        .windows(2)
        .all(|pair| pair[0].colour() == pair[1].colour() && pair[0].rank() + 1 == pair[1].rank())
}

/// True iff `tiles` is a group or a run
pub fn is_set(tiles: &[Tile]) -> bool {
    is_group(tiles) || is_run(tiles)
}

/// Determine which kind of set `tiles` forms, if any
pub fn classify(tiles: &[Tile]) -> Option<MeldType> {
    if is_group(tiles) {
        Some(MeldType::Group)
    } else if is_run(tiles) {
        Some(MeldType::Run)
    } else {
        None
    }
}

/// A validated group or run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    #[serde(rename = "type")]
    pub meld_type: MeldType,
    pub tiles: Vec<Tile>,
}

impl Meld {
    /// Classify a tile sequence, returning `None` if it is not a set
    pub fn from_tiles(tiles: Vec<Tile>) -> Option<Self> {
        classify(&tiles).map(|meld_type| Meld { meld_type, tiles })
    }

    /// Parse a meld from a string, auto-detecting type
    /// Formats:
    /// - Group: "5 r b k" (rank followed by colour letters)
    /// - Run: "y 6 7 8" (colour letter followed by ranks)
    pub fn from_string(input: &str) -> Result<Self, TileError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let first = tokens
            .first()
            .ok_or_else(|| TileError::InvalidMeld("empty meld string".to_string()))?;

        if first.parse::<u8>().is_ok() {
            return Self::from_group_string(input);
        }
        if Colour::from_letter(first).is_ok() {
            return Self::from_run_string(input);
        }

        Err(TileError::InvalidMeld(format!(
            "'{}': use 'N c1 c2 c3' for a group or 'C n1 n2 n3' for a run",
            input
        )))
    }

    /// Parse a group meld: "5 r b k"
    pub fn from_group_string(input: &str) -> Result<Self, TileError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let (rank_token, colour_tokens) = tokens
            .split_first()
            .ok_or_else(|| TileError::InvalidMeld("empty meld string".to_string()))?;

        let rank: u8 = rank_token
            .parse()
            .map_err(|_| TileError::InvalidRank(rank_token.to_string()))?;

        let mut tiles = Vec::with_capacity(colour_tokens.len());
        for token in colour_tokens {
            let colour = Colour::from_letter(token)?;
            let tile = Tile::try_new(colour, rank)
                .ok_or_else(|| TileError::InvalidRank(rank.to_string()))?;
            tiles.push(tile);
        }

        if !is_group(&tiles) {
            return Err(TileError::InvalidMeld(format!("'{}' is not a group", input)));
        }
        Ok(Meld { meld_type: MeldType::Group, tiles })
    }

    /// Parse a run meld: "y 6 7 8"
    pub fn from_run_string(input: &str) -> Result<Self, TileError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let (colour_token, rank_tokens) = tokens
            .split_first()
            .ok_or_else(|| TileError::InvalidMeld("empty meld string".to_string()))?;

        let colour = Colour::from_letter(colour_token)?;
        let mut tiles = Vec::with_capacity(rank_tokens.len());
        for token in rank_tokens {
            let rank: u8 = token
                .parse()
                .map_err(|_| TileError::InvalidRank(token.to_string()))?;
            let tile = Tile::try_new(colour, rank)
                .ok_or_else(|| TileError::InvalidRank(rank.to_string()))?;
            tiles.push(tile);
        }

        if !is_run(&tiles) {
            return Err(TileError::InvalidMeld(format!("'{}' is not a run", input)));
        }
        Ok(Meld { meld_type: MeldType::Run, tiles })
    }
}

/// A player's hand of tiles. Order is for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand(Vec<Tile>);

impl Hand {
    /// Create a new empty hand
    pub fn new() -> Self {
        Hand(Vec::new())
    }

    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Hand(tiles)
    }

    /// Tiles in display order
    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }

    /// Add a tile to the end of the hand
    pub fn add(&mut self, tile: Tile) {
        self.0.push(tile);
    }

    /// Remove one copy of a tile from the hand
    pub fn remove_tile(&mut self, tile: &Tile) -> bool {
        match self.0.iter().position(|t| t == tile) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove the tile at a display position
    pub fn remove_at(&mut self, index: usize) -> Tile {
        self.0.remove(index)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        self.0.contains(tile)
    }

    /// Number of copies of a tile held
    pub fn count_of(&self, tile: &Tile) -> usize {
        self.0.iter().filter(|t| *t == tile).count()
    }

    pub fn sort_colour_then_rank(&mut self) {
        self.0.sort_by_key(Tile::colour_rank_key);
    }

    pub fn sort_rank_then_colour(&mut self) {
        self.0.sort_by_key(Tile::rank_colour_key);
    }

    /// Every tile of this hand appears in `other`, respecting multiplicity
    pub fn is_subset_of(&self, other: &Hand) -> bool {
        let mut remaining = other.0.clone();
        self.0.iter().all(|tile| match remaining.iter().position(|t| t == tile) {
            Some(index) => {
                remaining.swap_remove(index);
                true
            }
            None => false,
        })
    }

    /// Same tiles as `other` regardless of order
    pub fn same_tiles(&self, other: &Hand) -> bool {
        self.count() == other.count() && self.is_subset_of(other)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.0.iter()
    }
}

impl FromIterator<Tile> for Hand {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        Hand(iter.into_iter().collect())
    }
}
