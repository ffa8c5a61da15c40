use crate::config::SearchConfig;
use crate::moves::Move;
use crate::runs::{extract_all_runs, find_set};
use crate::{Board, Colour, Hand, MAX_RANK, MIN_RANK, MIN_SET_SIZE, Tile, TileError, TileMultiset, is_group, is_run};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Cross-platform stopwatch for search diagnostics
#[derive(Clone, Copy)]
struct TimeTracker {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
}

impl TimeTracker {
    fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            start_ms: Self::now_ms(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn elapsed_ms(&self) -> f64 {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed().as_secs_f64() * 1000.0
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::now_ms() - self.start_ms
        }
    }
}

/// Move-finding strategies, from cheapest to most thorough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Play one new set straight from the hand
    Simple,
    /// Extend existing board sets with hand tiles
    Moderate,
    /// Take one or two tiles off the board to complete a new set
    Good,
    /// Rebuild the whole board from sampled group combinations plus runs
    Best,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [Strategy::Simple, Strategy::Moderate, Strategy::Good, Strategy::Best];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Simple => "simple",
            Strategy::Moderate => "moderate",
            Strategy::Good => "good",
            Strategy::Best => "best",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Board and hand frozen for the duration of one search.
///
/// Every candidate move shares these snapshots; speculative boards are
/// separate clones, so nothing a strategy does can reach the live game.
#[derive(Debug, Clone)]
pub struct Snapshot {
    board: Rc<Board>,
    hand: Rc<Hand>,
    pool: TileMultiset,
}

impl Snapshot {
    /// Copy `board` and `hand`, rejecting a state with a third copy of any tile
    pub fn new(board: &Board, hand: &Hand) -> Result<Self, TileError> {
        let mut pool = TileMultiset::from_tiles(&board.tiles())?;
        pool.try_add_all(hand.iter())?;
        Ok(Snapshot {
            board: Rc::new(board.clone()),
            hand: Rc::new(hand.clone()),
            pool,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Every board and hand tile together
    pub fn pool(&self) -> &TileMultiset {
        &self.pool
    }

    fn candidate(&self, sets: Vec<Vec<Tile>>) -> Move {
        Move::new(Rc::clone(&self.board), Rc::clone(&self.hand), sets)
    }

    /// The do-nothing move: keep the board as it is
    fn baseline(&self) -> Move {
        self.candidate(self.board.sets())
    }
}

/// Best move one strategy produced, and how many moves it scored to find it
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub best: Move,
    pub candidates_evaluated: usize,
}

/// Highest-scoring of `baseline` and `candidates`. Ties keep the earliest.
fn pick_best<I: IntoIterator<Item = Move>>(baseline: Move, candidates: I) -> StrategyOutcome {
    let mut best = baseline;
    let mut evaluated = 1;
    for candidate in candidates {
        evaluated += 1;
        if candidate.score() > best.score() {
            best = candidate;
        }
    }
    StrategyOutcome {
        best,
        candidates_evaluated: evaluated,
    }
}

/// Keep the board and lay down one new set formed from the hand alone
pub fn simple_move(snapshot: &Snapshot) -> StrategyOutcome {
    let mut sets = snapshot.board.sets();
    if let Some(set) = find_set(snapshot.hand.tiles()) {
        sets.push(set);
    }
    StrategyOutcome {
        best: snapshot.candidate(sets),
        candidates_evaluated: 1,
    }
}

/// Remove one copy of `tile` from `pool`, reporting whether it was there
fn take(pool: &mut Vec<Tile>, tile: Tile) -> bool {
    match pool.iter().position(|t| *t == tile) {
        Some(index) => {
            pool.remove(index);
            true
        }
        None => false,
    }
}

/// The tile that would turn a group of three into a group of four
fn missing_group_tile(group: &[Tile]) -> Option<Tile> {
    let rank = group.first()?.rank();
    Colour::ALL
        .into_iter()
        .find(|colour| group.iter().all(|tile| tile.colour() != *colour))
        .map(|colour| Tile::new(colour, rank))
}

/// Grow each board set by the hand tiles that fit it: one at either end of a
/// run, or the fourth colour of a group of three
pub fn moderate_move(snapshot: &Snapshot) -> StrategyOutcome {
    let mut spare = snapshot.hand.tiles().to_vec();

    let sets = snapshot
        .board
        .sets()
        .into_iter()
        .map(|mut set| {
            if is_run(&set) {
                let before = set[0].pred();
                let after = set[set.len() - 1].succ();
                if let Some(tile) = before {
                    if take(&mut spare, tile) {
                        set.insert(0, tile);
                    }
                }
                if let Some(tile) = after {
                    if take(&mut spare, tile) {
                        set.push(tile);
                    }
                }
            } else if set.len() == MIN_SET_SIZE && is_group(&set) {
                if let Some(tile) = missing_group_tile(&set) {
                    if take(&mut spare, tile) {
                        set.push(tile);
                    }
                }
            }
            set
        })
        .collect();

    StrategyOutcome {
        best: snapshot.candidate(sets),
        candidates_evaluated: 1,
    }
}

/// Every tile that can come off the board while leaving it valid, paired
/// with the board after its removal.
///
/// - Group of four: any tile. Removing an inner tile slides its outer
///   neighbour in so the remaining three stay contiguous.
/// - Run longer than three: either end.
/// - Run: an inner tile with at least three tiles on each side, leaving two runs.
pub fn removable_tiles(board: &Board) -> Vec<(Tile, Board)> {
    let mut removable = Vec::new();

    for set in board.placed_sets() {
        let tiles = &set.tiles;
        let len = tiles.len();

        if len == 4 && is_group(tiles) {
            let mut first = board.clone();
            first.remove_tile_at(set.position(0));
            removable.push((tiles[0], first));

            let mut second = board.clone();
            second.remove_tile_at(set.position(0));
            second.place_tile(set.position(1), tiles[0]);
            removable.push((tiles[1], second));

            let mut third = board.clone();
            third.remove_tile_at(set.position(3));
            third.place_tile(set.position(2), tiles[3]);
            removable.push((tiles[2], third));

            let mut fourth = board.clone();
            fourth.remove_tile_at(set.position(3));
            removable.push((tiles[3], fourth));
        } else if is_run(tiles) {
            for i in (MIN_SET_SIZE..len).take_while(|i| i + MIN_SET_SIZE < len) {
                let mut split = board.clone();
                split.remove_tile_at(set.position(i));
                removable.push((tiles[i], split));
            }

            if len > MIN_SET_SIZE {
                let mut head = board.clone();
                head.remove_tile_at(set.position(0));
                removable.push((tiles[0], head));

                let mut tail = board.clone();
                tail.remove_tile_at(set.position(len - 1));
                removable.push((tiles[len - 1], tail));
            }
        }
    }

    removable
}

/// Single removals, followed by pairs (a removal, then a removal from the
/// resulting board) when `pairs` is set
pub fn removable_combinations(board: &Board, pairs: bool) -> Vec<(Vec<Tile>, Board)> {
    let singles = removable_tiles(board);

    let doubles: Vec<(Vec<Tile>, Board)> = if pairs {
        singles
            .iter()
            .flat_map(|(first, after)| {
                removable_tiles(after)
                    .into_iter()
                    .map(move |(second, board)| (vec![*first, second], board))
            })
            .collect()
    } else {
        Vec::new()
    };

    singles
        .into_iter()
        .map(|(tile, board)| (vec![tile], board))
        .chain(doubles)
        .collect()
}

/// Reclaim board tiles into the hand and look for a new set.
///
/// Score is still measured against the real hand, so reclaimed tiles that
/// go back down never count.
pub fn good_move(snapshot: &Snapshot, reclaim_pairs: bool) -> StrategyOutcome {
    let reclaims = removable_combinations(&snapshot.board, reclaim_pairs);

    let candidates = reclaims.into_iter().map(|(taken, after)| {
        let mut sets = after.sets();
        let mut pool = snapshot.hand.tiles().to_vec();
        pool.extend(taken);
        if let Some(set) = find_set(&pool) {
            sets.push(set);
        }
        snapshot.candidate(sets)
    });

    pick_best(snapshot.baseline(), candidates)
}

fn group_of<I: IntoIterator<Item = Colour>>(rank: u8, colours: I) -> Vec<Tile> {
    colours.into_iter().map(|colour| Tile::new(colour, rank)).collect()
}

/// The four-colour group followed by each three-colour group, dropping red,
/// blue, yellow, then black
fn every_group(rank: u8) -> Vec<Vec<Tile>> {
    let mut groups = vec![group_of(rank, Colour::ALL)];
    for skipped in Colour::ALL {
        groups.push(group_of(rank, Colour::ALL.into_iter().filter(|c| *c != skipped)));
    }
    groups
}

/// Groups that can be formed at one rank, as lists of mutually exclusive options.
///
/// Each inner list offers alternatives of which at most one can be laid;
/// options from different lists can coexist within the two copies per tile.
pub fn rank_group_alternatives(pool: &TileMultiset, rank: u8) -> Vec<Vec<Vec<Tile>>> {
    let counts = Colour::ALL.map(|colour| pool.count(&Tile::new(colour, rank)));
    let colours_with = |keep: fn(u8) -> bool| -> Vec<Colour> {
        Colour::ALL
            .into_iter()
            .filter(|colour| keep(counts[colour.index()]))
            .collect()
    };
    let missing = colours_with(|c| c == 0).len();
    let single = colours_with(|c| c == 1).len();

    if missing >= 2 {
        return Vec::new();
    }
    if missing == 1 {
        let present = group_of(rank, colours_with(|c| c > 0));
        return if single >= 1 {
            vec![vec![present]]
        } else {
            vec![vec![present.clone()], vec![present]]
        };
    }

    match single {
        0 => vec![every_group(rank), every_group(rank)],
        1 => vec![every_group(rank), vec![group_of(rank, colours_with(|c| c == 2))]],
        _ => vec![every_group(rank)],
    }
}

/// Group alternative lists for every rank, lowest rank first
pub fn group_alternatives(pool: &TileMultiset) -> Vec<Vec<Vec<Tile>>> {
    (MIN_RANK..=MAX_RANK)
        .flat_map(|rank| rank_group_alternatives(pool, rank))
        .collect()
}

/// Every way of picking at most one option from each list.
///
/// Built as a fold: each list multiplies the combinations so far by
/// "skip it" plus one extension per option. No lists gives one empty
/// combination.
pub fn combine_alternatives(lists: &[Vec<Vec<Tile>>]) -> Vec<Vec<Vec<Tile>>> {
    lists.iter().fold(vec![Vec::new()], |combinations, options| {
        let mut next = Vec::with_capacity(combinations.len() * (options.len() + 1));
        for combination in combinations {
            let extended: Vec<Vec<Vec<Tile>>> = options
                .iter()
                .map(|option| {
                    let mut grown = combination.clone();
                    grown.push(option.clone());
                    grown
                })
                .collect();
            next.push(combination);
            next.extend(extended);
        }
        next
    })
}

/// Rebuild the board from scratch: choose groups from a random sample of
/// ranks, then greedily form runs from whatever is left.
pub fn best_move<R: Rng + ?Sized>(snapshot: &Snapshot, rng: &mut R, sample_limit: usize) -> StrategyOutcome {
    let mut lists = group_alternatives(&snapshot.pool);
    lists.shuffle(rng);
    lists.truncate(sample_limit);

    let candidates = combine_alternatives(&lists).into_iter().map(|groups| {
        let mut remaining = snapshot.pool;
        for tile in groups.iter().flatten() {
            remaining.remove(tile);
        }
        let mut sets = groups;
        sets.extend(extract_all_runs(remaining.tiles()));
        snapshot.candidate(sets)
    });

    pick_best(snapshot.baseline(), candidates)
}

/// How one strategy fared during a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub best_score: i32,
    pub candidates_evaluated: usize,
}

/// Result of a full search, with diagnostics
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The winning move, or `None` if no strategy places a tile
    pub chosen: Option<Move>,
    /// Strategy that produced `chosen`
    pub strategy: Option<Strategy>,
    /// One entry per strategy tried, in order
    pub reports: Vec<StrategyReport>,
    pub candidates_evaluated: usize,
    pub elapsed_ms: f64,
}

impl SearchResult {
    /// Tiles the chosen move places, or 0 when there is none
    pub fn score(&self) -> i32 {
        self.chosen.as_ref().map_or(0, Move::score)
    }

    pub fn found_move(&self) -> bool {
        self.chosen.is_some()
    }
}

/// The computer opponent.
///
/// Tries each configured strategy in order and settles for the first one
/// that places at least one tile. The search is deliberately greedy and the
/// exhaustive strategy samples ranks at random, so the opponent is not
/// optimal; seeding the RNG makes it reproducible.
pub struct MoveSearchEngine<R: Rng = SmallRng> {
    config: SearchConfig,
    rng: R,
}

impl MoveSearchEngine<SmallRng> {
    /// Reproducible engine
    pub fn seeded(config: SearchConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MoveSearchEngine<R> {
    pub fn with_rng(config: SearchConfig, rng: R) -> Self {
        MoveSearchEngine { config, rng }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run a single strategy against a snapshot
    pub fn run_strategy(&mut self, strategy: Strategy, snapshot: &Snapshot) -> StrategyOutcome {
        match strategy {
            Strategy::Simple => simple_move(snapshot),
            Strategy::Moderate => moderate_move(snapshot),
            Strategy::Good => good_move(snapshot, self.config.reclaim_pairs),
            Strategy::Best => best_move(snapshot, &mut self.rng, self.config.group_sample_limit),
        }
    }

    /// Find a move for `hand` on `board`. Neither is modified.
    ///
    /// Fails only if board and hand together hold a third copy of some tile.
    pub fn find_move(&mut self, board: &Board, hand: &Hand) -> Result<SearchResult, TileError> {
        let timer = TimeTracker::new();
        let snapshot = Snapshot::new(board, hand)?;

        let mut reports = Vec::with_capacity(self.config.strategies.len());
        let mut candidates_evaluated = 0;
        let strategies = self.config.strategies.clone();

        for strategy in strategies {
            let outcome = self.run_strategy(strategy, &snapshot);
            let best_score = outcome.best.score();
            candidates_evaluated += outcome.candidates_evaluated;
            reports.push(StrategyReport {
                strategy,
                best_score,
                candidates_evaluated: outcome.candidates_evaluated,
            });

            if best_score > 0 {
                return Ok(SearchResult {
                    chosen: Some(outcome.best),
                    strategy: Some(strategy),
                    reports,
                    candidates_evaluated,
                    elapsed_ms: timer.elapsed_ms(),
                });
            }
        }

        Ok(SearchResult {
            chosen: None,
            strategy: None,
            reports,
            candidates_evaluated,
            elapsed_ms: timer.elapsed_ms(),
        })
    }
}
