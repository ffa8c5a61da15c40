//! Counting structure over the 52 distinct tile types.

use crate::{COPIES_PER_TILE, NUM_DISTINCT_TILES, Tile, TileError};

/// A multiset of tiles stored as one count (0-2) per distinct tile.
///
/// Enumeration is canonical: ascending colour, then ascending rank, each
/// tile repeated by its count. Run extraction depends on that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMultiset {
    counts: [u8; NUM_DISTINCT_TILES],
}

impl Default for TileMultiset {
    fn default() -> Self {
        Self::new()
    }
}

impl TileMultiset {
    /// Create an empty multiset
    pub fn new() -> Self {
        TileMultiset {
            counts: [0; NUM_DISTINCT_TILES],
        }
    }

    /// Build a multiset from tiles, rejecting a third copy of any tile
    pub fn from_tiles<'a, I>(tiles: I) -> Result<Self, TileError>
    where
        I: IntoIterator<Item = &'a Tile>,
    {
        let mut multiset = Self::new();
        multiset.try_add_all(tiles)?;
        Ok(multiset)
    }

    /// Add a tile.
    ///
    /// # Panics
    /// If the multiset already holds both physical copies of `tile`.
    pub fn add(&mut self, tile: Tile) {
        if let Err(err) = self.try_add(tile) {
            panic!("{}", err);
        }
    }

    /// Add a tile, failing if both physical copies are already present
    pub fn try_add(&mut self, tile: Tile) -> Result<(), TileError> {
        let count = &mut self.counts[tile.index()];
        if *count >= COPIES_PER_TILE {
            return Err(TileError::CopyLimit(tile));
        }
        *count += 1;
        Ok(())
    }

    /// Add every tile, stopping at the first copy-limit violation
    pub fn try_add_all<'a, I>(&mut self, tiles: I) -> Result<(), TileError>
    where
        I: IntoIterator<Item = &'a Tile>,
    {
        tiles.into_iter().try_for_each(|tile| self.try_add(*tile))
    }

    /// Remove one copy of a tile. Returns false (and changes nothing) if absent.
    pub fn remove(&mut self, tile: &Tile) -> bool {
        let count = &mut self.counts[tile.index()];
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Number of copies held (0-2)
    pub fn count(&self, tile: &Tile) -> u8 {
        self.counts[tile.index()]
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        self.count(tile) > 0
    }

    /// Total number of tiles held
    pub fn len(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Iterate tiles in canonical order, each repeated by its count
    pub fn iter(&self) -> impl Iterator<Item = Tile> + '_ {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(index, &count)| std::iter::repeat_n(Tile::from_index(index), count as usize))
    }

    /// All tiles in canonical order
    pub fn tiles(&self) -> Vec<Tile> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_tiles;

    #[test]
    fn test_tiles_are_canonically_ordered() {
        let input = parse_tiles("k2 r5 b1 r1 r5 y13").unwrap();
        let multiset = TileMultiset::from_tiles(&input).unwrap();
        assert_eq!(multiset.tiles(), parse_tiles("r1 r5 r5 b1 y13 k2").unwrap());
        assert_eq!(multiset.len(), 6);
    }

    #[test]
    fn test_add_and_remove() {
        let r5 = "r5".parse().unwrap();
        let mut multiset = TileMultiset::new();
        assert!(multiset.is_empty());
        multiset.add(r5);
        multiset.add(r5);
        assert_eq!(multiset.count(&r5), 2);
        assert!(multiset.remove(&r5));
        assert!(multiset.remove(&r5));
        assert!(!multiset.remove(&r5));
        assert!(!multiset.contains(&r5));
        assert!(multiset.is_empty());
    }

    #[test]
    fn test_third_copy_is_rejected() {
        let b3 = "b3".parse().unwrap();
        let mut multiset = TileMultiset::new();
        multiset.try_add(b3).unwrap();
        multiset.try_add(b3).unwrap();
        assert_eq!(multiset.try_add(b3), Err(TileError::CopyLimit(b3)));
        assert_eq!(multiset.count(&b3), 2);

        let input = parse_tiles("b3 b3 b3").unwrap();
        assert!(TileMultiset::from_tiles(&input).is_err());
    }

    #[test]
    #[should_panic(expected = "more than two copies")]
    fn test_unchecked_add_panics_on_third_copy() {
        let y9 = "y9".parse().unwrap();
        let mut multiset = TileMultiset::new();
        multiset.add(y9);
        multiset.add(y9);
        multiset.add(y9);
    }
}
