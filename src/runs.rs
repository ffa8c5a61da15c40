//! Greedy extraction of runs and groups from a pool of tiles.

use crate::{MIN_SET_SIZE, NUM_RANKS, Tile};

fn count_in(tiles: &[Tile], tile: Option<Tile>) -> usize {
    tile.map_or(0, |tile| tiles.iter().filter(|t| **t == tile).count())
}

fn contains(tiles: &[Tile], tile: Option<Tile>) -> bool {
    count_in(tiles, tile) > 0
}

/// Find one run in `tiles`, scanning in colour-then-rank order.
///
/// When the tail of the run is doubled, the scan looks ahead to decide who
/// keeps the spare copy. If the next rank is doubled too, both copies stay
/// in play and the run continues. Otherwise the run is closed early when the
/// spare copies can seed a run of their own:
///
/// - one doubled rank: the two ranks above the tail must be available
/// - two doubled ranks: the rank above the tail must be available
/// - three or more: always
///
/// If the run is not closed, scanning resumes from the tile after the spare.
pub fn extract_run(tiles: &[Tile]) -> Option<Vec<Tile>> {
    let mut tiles = tiles.to_vec();
    tiles.sort_by_key(Tile::colour_rank_key);

    let mut run = vec![*tiles.first()?];
    let mut found_duplicate = false;
    let mut num_duplicates = 0;

    let mut i = 1;
    while i < tiles.len() {
        let tile = tiles[i];
        let tail = run[run.len() - 1];

        if found_duplicate {
            if tile.colour() != tail.colour() {
                if run.len() >= MIN_SET_SIZE {
                    return Some(run);
                }
                run = vec![tile];
                found_duplicate = false;
                num_duplicates = 0;
            } else if count_in(&tiles, tail.succ()) == 2 {
                // Next rank is doubled as well: take one copy, skip the other
                run.push(tile);
                num_duplicates += 1;
                i += 1;
            } else {
                if run.len() >= MIN_SET_SIZE {
                    let next = tail.succ();
                    let after_next = next.and_then(|t| t.succ());
                    let spare_has_a_home = match num_duplicates {
                        1 => contains(&tiles, next) && contains(&tiles, after_next),
                        2 => contains(&tiles, next),
                        _ => true,
                    };
                    if spare_has_a_home {
                        return Some(run);
                    }
                }
                found_duplicate = false;
                num_duplicates = 0;
                // Look at this tile again without the duplicate in play
                continue;
            }
        } else if tile.colour() != tail.colour() {
            if run.len() >= MIN_SET_SIZE {
                return Some(run);
            }
            run = vec![tile];
        } else if tile.rank() == tail.rank() {
            found_duplicate = true;
            num_duplicates = 1;
        } else if tile.rank() == tail.rank() + 1 {
            run.push(tile);
        } else {
            if run.len() >= MIN_SET_SIZE {
                return Some(run);
            }
            run = vec![tile];
        }
        i += 1;
    }

    (run.len() >= MIN_SET_SIZE).then_some(run)
}

/// Repeatedly extract runs, removing each one's tiles from the pool, until none is left
pub fn extract_all_runs(mut tiles: Vec<Tile>) -> Vec<Vec<Tile>> {
    let mut runs = Vec::new();
    while let Some(run) = extract_run(&tiles) {
        for tile in &run {
            if let Some(index) = tiles.iter().position(|t| t == tile) {
                tiles.remove(index);
            }
        }
        runs.push(run);
    }
    runs
}

/// First group that can be formed from `tiles`.
///
/// Distinct tiles are bucketed by rank in the order given; the first bucket
/// to reach three tiles is returned.
pub fn find_group(tiles: &[Tile]) -> Option<Vec<Tile>> {
    let mut distinct: Vec<Tile> = Vec::with_capacity(tiles.len());
    for tile in tiles {
        if !distinct.contains(tile) {
            distinct.push(*tile);
        }
    }

    let mut by_rank: [Vec<Tile>; NUM_RANKS] = Default::default();
    for tile in distinct {
        let bucket = &mut by_rank[tile.rank() as usize - 1];
        bucket.push(tile);
        if bucket.len() >= MIN_SET_SIZE {
            return Some(bucket.clone());
        }
    }
    None
}

/// A run if one exists, otherwise a group
pub fn find_set(tiles: &[Tile]) -> Option<Vec<Tile>> {
    extract_run(tiles).or_else(|| find_group(tiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_group, is_run, parse_tiles};

    fn tiles(s: &str) -> Vec<Tile> {
        parse_tiles(s).unwrap()
    }

    #[test]
    fn test_extract_simple_run() {
        assert_eq!(extract_run(&tiles("r3 r1 r2")), Some(tiles("r1 r2 r3")));
        assert_eq!(extract_run(&tiles("k1 r1 r2")), None);
        assert_eq!(extract_run(&[]), None);
    }

    #[test]
    fn test_extract_run_skips_short_fragments() {
        assert_eq!(extract_run(&tiles("r1 r2 r5 r6 r7 r8")), Some(tiles("r5 r6 r7 r8")));
        assert_eq!(extract_run(&tiles("r12 r13 b2 b3 b4")), Some(tiles("b2 b3 b4")));
    }

    #[test]
    fn test_extract_run_stops_at_colour_change() {
        assert_eq!(extract_run(&tiles("r1 r2 r3 b4 b5 b6")), Some(tiles("r1 r2 r3")));
    }

    #[test]
    fn test_duplicate_tail_with_room_for_a_second_run() {
        // r3 is doubled and r4 r5 exist, so the spare r3 seeds r3 r4 r5
        let pool = tiles("r1 r2 r3 r3 r4 r5");
        assert_eq!(extract_run(&pool), Some(tiles("r1 r2 r3")));
        assert_eq!(extract_all_runs(pool), vec![tiles("r1 r2 r3"), tiles("r3 r4 r5")]);
    }

    #[test]
    fn test_duplicate_tail_without_room_is_absorbed() {
        // Only r4 follows the doubled r3: keep extending
        assert_eq!(extract_run(&tiles("r1 r2 r3 r3 r4")), Some(tiles("r1 r2 r3 r4")));
    }

    #[test]
    fn test_doubled_ranks_are_carried_in_pairs() {
        // r2 and r3 are both doubled: the run takes one copy of each and
        // leaves the spares with r4 for a second run
        let pool = tiles("r1 r2 r2 r3 r3 r4");
        assert_eq!(extract_run(&pool), Some(tiles("r1 r2 r3")));
        assert_eq!(extract_all_runs(pool), vec![tiles("r1 r2 r3"), tiles("r2 r3 r4")]);
    }

    #[test]
    fn test_two_doubled_ranks_close_when_next_exists() {
        // Duplicates at r3 and r4; r5 single. The spare r3 r4 plus r5 form a run.
        let pool = tiles("r1 r2 r3 r3 r4 r4 r5");
        assert_eq!(extract_run(&pool), Some(tiles("r1 r2 r3 r4")));
        assert_eq!(extract_all_runs(pool), vec![tiles("r1 r2 r3 r4"), tiles("r3 r4 r5")]);
    }

    #[test]
    fn test_three_doubled_ranks_always_close() {
        let pool = tiles("b4 b5 b5 b6 b6 b7 b7 b8");
        assert_eq!(extract_run(&pool), Some(tiles("b4 b5 b6 b7")));
        assert_eq!(extract_all_runs(pool), vec![tiles("b4 b5 b6 b7"), tiles("b5 b6 b7 b8")]);
    }

    #[test]
    fn test_doubled_first_tile() {
        // The run is too short to close at the duplicate, so scanning resumes
        let pool = tiles("y1 y1 y2 y3");
        assert_eq!(extract_run(&pool), Some(tiles("y1 y2 y3")));
        assert_eq!(extract_all_runs(pool), vec![tiles("y1 y2 y3")]);
    }

    #[test]
    fn test_extract_all_runs_across_colours() {
        let runs = extract_all_runs(tiles("k11 r1 k12 r2 k13 r3 b7"));
        assert_eq!(runs, vec![tiles("r1 r2 r3"), tiles("k11 k12 k13")]);
        assert!(runs.iter().all(|run| is_run(run)));
        assert!(extract_all_runs(tiles("r1 b1 y1")).is_empty());
    }

    #[test]
    fn test_find_group() {
        assert_eq!(find_group(&tiles("r5 b5 y5")), Some(tiles("r5 b5 y5")));
        assert_eq!(find_group(&tiles("r5 r5 b5 k1 y5")), Some(tiles("r5 b5 y5")));
        // First bucket to fill wins, even if another rank has more
        assert_eq!(find_group(&tiles("k2 r9 b9 r2 b2 y9")), Some(tiles("k2 r2 b2")));
        assert_eq!(find_group(&tiles("r5 r5 b5")), None);
        assert!(is_group(&find_group(&tiles("y1 k1 b1 r1")).unwrap()));
    }

    #[test]
    fn test_find_set_prefers_runs() {
        assert_eq!(find_set(&tiles("r5 b5 y5 r6 r7")), Some(tiles("r5 r6 r7")));
        assert_eq!(find_set(&tiles("r5 b5 y5")), Some(tiles("r5 b5 y5")));
        assert_eq!(find_set(&tiles("r5 b6")), None);
    }
}
