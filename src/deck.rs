//! The Threes! tile deck.
//!
//! Upcoming tiles are not independent draws: they come, without replacement,
//! from two shuffled copies of a 12-tile base stack. When the deck runs dry a
//! new one is built, possibly led by a single bonus tile derived from the
//! highest tile on the board.

use std::collections::VecDeque;
use std::fmt;

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{Tile, HIGHEST_TILE_FLOOR};

/// One stack of regular tiles. Each regenerated deck holds two of these.
pub const BASE_TILES: [Tile; 12] = [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3];

/// Number of base stacks shuffled into a fresh deck.
pub const STACKS_PER_DECK: usize = 2;

/// Maximum number of bonus candidates considered per regeneration.
pub const BONUS_CAP: usize = 3;

/// Smallest highest-tile value that produces bonus candidates.
pub const BONUS_THRESHOLD: Tile = 48;

/// Bonus candidates for a board whose highest tile is `highest`.
///
/// Starting from `h = highest`, while `h >= 48` and fewer than [`BONUS_CAP`]
/// candidates exist, push `h / 8` and halve `h`. Integer floor division.
///
/// ```
/// use threes_ai::deck::bonus_candidates;
/// assert!(bonus_candidates(24).is_empty());
/// assert_eq!(bonus_candidates(48), vec![6]);
/// assert_eq!(bonus_candidates(192), vec![24, 12, 6]);
/// ```
pub fn bonus_candidates(highest: Tile) -> Vec<Tile> {
    let mut h = highest;
    let mut out = Vec::with_capacity(BONUS_CAP);
    while h >= BONUS_THRESHOLD && out.len() < BONUS_CAP {
        out.push(h / 8);
        h /= 2;
    }
    out
}

/// FIFO of pending tiles that refills itself when exhausted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDeck {
    pending: VecDeque<Tile>,
}

impl TileDeck {
    /// The opening deck of a game. Never carries a bonus tile.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        TileDeck { pending: build_deck(HIGHEST_TILE_FLOOR, rng) }
    }

    /// Resume from a known pending sequence (front is drawn first).
    ///
    /// An empty sequence is allowed; the next draw regenerates.
    pub fn from_tiles<I: IntoIterator<Item = Tile>>(tiles: I) -> Self {
        TileDeck { pending: tiles.into_iter().collect() }
    }

    /// Pop the next tile, building a new deck first if this one is empty.
    ///
    /// `highest_tile_hint` is the board's current highest tile and only matters
    /// when a regeneration happens.
    ///
    /// ```
    /// use threes_ai::deck::TileDeck;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let mut deck = TileDeck::from_tiles([2]);
    /// assert_eq!(deck.draw_next(3, &mut rng), 2);
    /// // Exhausted: a fresh 24-tile deck is built transparently.
    /// let t = deck.draw_next(3, &mut rng);
    /// assert!((1..=3).contains(&t));
    /// assert_eq!(deck.len(), 23);
    /// ```
    pub fn draw_next<R: Rng + ?Sized>(&mut self, highest_tile_hint: Tile, rng: &mut R) -> Tile {
        if self.pending.is_empty() {
            self.pending = build_deck(highest_tile_hint, rng);
        }
        // A freshly built deck always holds at least the base tiles.
        self.pending.pop_front().unwrap_or(BASE_TILES[0])
    }

    /// Peek at the pending tiles in draw order.
    pub fn remaining(&self) -> impl Iterator<Item = Tile> + '_ { self.pending.iter().copied() }

    /// Next tile to be drawn, if the deck is not exhausted.
    pub fn peek(&self) -> Option<Tile> { self.pending.front().copied() }

    #[inline]
    pub fn len(&self) -> usize { self.pending.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }
}

fn build_deck<R: Rng + ?Sized>(highest: Tile, rng: &mut R) -> VecDeque<Tile> {
    let mut deck = VecDeque::with_capacity(BASE_TILES.len() * STACKS_PER_DECK + 1);
    // Only one candidate survives; the rest are dropped.
    if let Some(&bonus) = bonus_candidates(highest).choose(rng) {
        trace!("deck regenerated with bonus tile {bonus} (highest {highest})");
        deck.push_back(bonus);
    }
    for _ in 0..STACKS_PER_DECK {
        let mut stack = BASE_TILES;
        stack.shuffle(rng);
        deck.extend(stack);
    }
    deck
}

impl fmt::Debug for TileDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileDeck({:?})", self.pending)
    }
}

impl fmt::Display for TileDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Current Deck: {:?}>", self.pending.iter().collect::<Vec<_>>())
    }
}
