//! The draw pile: two copies of every tile, shuffled by a caller-supplied RNG.

use crate::{COPIES_PER_TILE, Hand, NUM_DISTINCT_TILES, Tile};
use rand::Rng;
use rand::seq::SliceRandom;

/// Tiles dealt to each player at the start of a game
pub const INITIAL_HAND_SIZE: usize = 14;
/// Tiles in a full deck
pub const DECK_SIZE: usize = NUM_DISTINCT_TILES * COPIES_PER_TILE as usize;

/// A stack of tiles. Tiles are drawn from the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck(Vec<Tile>);

impl Deck {
    /// Every tile twice, in canonical order (unshuffled)
    pub fn full() -> Self {
        let tiles = (0..DECK_SIZE)
            .map(|i| Tile::from_index(i % NUM_DISTINCT_TILES))
            .collect();
        Deck(tiles)
    }

    /// A full deck shuffled with `rng`
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::full();
        deck.0.shuffle(rng);
        deck
    }

    /// A deck that draws `tiles` from last to first
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Deck(tiles)
    }

    /// Draw the top tile, or `None` when the deck is empty
    pub fn pop(&mut self) -> Option<Tile> {
        self.0.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Draw up to `count` tiles into `hand`, returning how many were drawn
    pub fn deal(&mut self, hand: &mut Hand, count: usize) -> usize {
        let mut dealt = 0;
        while dealt < count {
            match self.pop() {
                Some(tile) => hand.add(tile),
                None => break,
            }
            dealt += 1;
        }
        dealt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileMultiset;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_full_deck_has_two_of_each() {
        let deck = Deck::full();
        assert_eq!(deck.len(), 104);
        let multiset = TileMultiset::from_tiles(&deck.0).unwrap();
        assert!((0..NUM_DISTINCT_TILES).all(|i| multiset.count(&Tile::from_index(i)) == 2));
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let a = Deck::shuffled(&mut SmallRng::seed_from_u64(42));
        let b = Deck::shuffled(&mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.len(), DECK_SIZE);
        assert_ne!(a, Deck::full());
    }

    #[test]
    fn test_pop_until_empty() {
        let mut deck = Deck::from_tiles(vec!["r1".parse().unwrap(), "b2".parse().unwrap()]);
        assert_eq!(deck.pop(), Some("b2".parse().unwrap()));
        assert_eq!(deck.pop(), Some("r1".parse().unwrap()));
        assert!(deck.is_empty());
        assert_eq!(deck.pop(), None);
    }

    #[test]
    fn test_deal() {
        let mut deck = Deck::full();
        let mut hand = Hand::new();
        assert_eq!(deck.deal(&mut hand, INITIAL_HAND_SIZE), 14);
        assert_eq!(hand.count(), 14);
        assert_eq!(deck.len(), 90);

        let mut short = Deck::from_tiles(vec!["k7".parse().unwrap()]);
        let mut other = Hand::new();
        assert_eq!(short.deal(&mut other, 3), 1);
        assert_eq!(other.count(), 1);
    }
}
