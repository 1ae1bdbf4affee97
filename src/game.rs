//! Game state: board, deck, upcoming tile and move history.
//!
//! [`GameState::apply_move`] is the only mutating operation. A rejected move
//! is an ordinary `false`, not an error; only construction can fail.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::deck::TileDeck;
use crate::engine::{Board, Move, Tile, DEFAULT_SIZE, HIGHEST_TILE_FLOOR};

/// Label of the sentinel history entry written at game start.
pub const START_LABEL: &str = "start";

/// Standard number of tiles placed before the first move.
pub const DEFAULT_STARTING_TILES: usize = 9;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("cannot place {tiles} starting tiles on a board with {capacity} cells")]
    TooManyTiles { tiles: usize, capacity: usize },
    #[error("board size must be at least 1")]
    ZeroSize,
    #[error("board size {size} is too large")]
    SizeTooLarge { size: usize },
    #[error("row {row} has {len} cells; expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
}

/// Knobs for starting a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board edge length.
    pub size: usize,
    /// Tiles dealt onto the board before the first move.
    pub starting_tiles: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { size: DEFAULT_SIZE, starting_tiles: DEFAULT_STARTING_TILES }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.size == 0 {
            return Err(GameError::ZeroSize);
        }
        let capacity = self.size.checked_mul(self.size).ok_or(GameError::SizeTooLarge { size: self.size })?;
        if self.starting_tiles > capacity {
            return Err(GameError::TooManyTiles { tiles: self.starting_tiles, capacity });
        }
        Ok(())
    }
}

/// One step of history: what was played, the board it produced and the tile shown next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: String,
    pub board: Board,
    pub next_tile: Tile,
}

impl HistoryEntry {
    /// The move that produced this entry; `None` for the start sentinel.
    pub fn mv(&self) -> Option<Move> { self.label.parse().ok() }
}

/// A game of Threes! in progress.
///
/// `Clone` is a deep copy; clones never share a board, deck or history.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    deck: TileDeck,
    next_tile: Tile,
    highest_tile: Tile,
    history: Vec<HistoryEntry>,
}

impl GameState {
    /// Deal a new game.
    ///
    /// ```
    /// use threes_ai::game::{GameConfig, GameState};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let game = GameState::new(GameConfig::default(), &mut rng).unwrap();
    /// assert_eq!(game.board().count_tiles(), 9);
    /// assert_eq!(game.history().len(), 1);
    ///
    /// let too_many = GameConfig { size: 2, starting_tiles: 5 };
    /// assert!(GameState::new(too_many, &mut rng).is_err());
    /// ```
    pub fn new<R: Rng + ?Sized>(cfg: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        cfg.validate()?;
        let mut board = Board::empty(cfg.size);
        let mut deck = TileDeck::new(rng);

        let mut positions: Vec<(usize, usize)> =
            (0..cfg.size).flat_map(|r| (0..cfg.size).map(move |c| (r, c))).collect();
        positions.shuffle(rng);
        for &(r, c) in positions.iter().take(cfg.starting_tiles) {
            board.set(r, c, deck.draw_next(HIGHEST_TILE_FLOOR, rng));
        }
        let next_tile = deck.draw_next(HIGHEST_TILE_FLOOR, rng);
        Ok(Self::assemble(board, deck, next_tile))
    }

    /// Rebuild a game from an existing board, deck and upcoming tile.
    ///
    /// A `next_tile` of `0` means the upcoming tile is unknown; one is drawn
    /// from `deck`. History restarts with a single `"start"` entry.
    pub fn resume<R: Rng + ?Sized>(board: Board, mut deck: TileDeck, next_tile: Tile, rng: &mut R) -> Self {
        let next_tile = if next_tile == 0 { deck.draw_next(board.highest_tile(), rng) } else { next_tile };
        Self::assemble(board, deck, next_tile)
    }

    fn assemble(board: Board, deck: TileDeck, next_tile: Tile) -> Self {
        let highest_tile = board.highest_tile();
        let history = vec![HistoryEntry { label: START_LABEL.to_string(), board: board.clone(), next_tile }];
        GameState { board, deck, next_tile, highest_tile, history }
    }

    /// Swipe in `dir`. Returns `false` and leaves the game untouched if nothing moves.
    ///
    /// ```
    /// use threes_ai::deck::TileDeck;
    /// use threes_ai::engine::{Board, Move};
    /// use threes_ai::game::GameState;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let board = Board::from_rows(vec![vec![3, 3, 0], vec![0; 3], vec![0; 3]]).unwrap();
    /// let mut game = GameState::resume(board, TileDeck::from_tiles([2, 1]), 1, &mut rng);
    /// assert!(!game.apply_move(Move::Up, &mut rng));
    /// assert!(game.apply_move(Move::Left, &mut rng));
    /// assert_eq!(game.board().rows()[0], vec![6, 0, 1]);
    /// assert_eq!(game.next_tile(), 2);
    /// ```
    pub fn apply_move<R: Rng + ?Sized>(&mut self, dir: Move, rng: &mut R) -> bool {
        let moved = self.board.swipe(dir, self.next_tile, rng);
        if moved == self.board {
            return false;
        }
        self.board = moved;
        self.highest_tile = self.board.highest_tile();
        self.next_tile = self.deck.draw_next(self.highest_tile, rng);
        self.history.push(HistoryEntry {
            label: dir.label().to_string(),
            board: self.board.clone(),
            next_tile: self.next_tile,
        });
        if self.is_over() {
            debug!("game over after {} moves, highest tile {}", self.moves_played(), self.highest_tile);
        }
        true
    }

    /// Directions that would change the board.
    #[inline]
    pub fn legal_moves(&self) -> Vec<Move> { self.board.legal_moves() }

    /// True once no direction can change the board.
    #[inline]
    pub fn is_over(&self) -> bool { self.board.is_terminal() }

    #[inline]
    pub fn board(&self) -> &Board { &self.board }

    #[inline]
    pub fn deck(&self) -> &TileDeck { &self.deck }

    /// Tile that the next successful move will insert.
    #[inline]
    pub fn next_tile(&self) -> Tile { self.next_tile }

    #[inline]
    pub fn highest_tile(&self) -> Tile { self.highest_tile }

    /// Ordered history, starting with the `"start"` entry.
    #[inline]
    pub fn history(&self) -> &[HistoryEntry] { &self.history }

    /// Successful moves so far.
    #[inline]
    pub fn moves_played(&self) -> usize { self.history.len() - 1 }
}

/// Games compare by board, deck and upcoming tile; history is ignored.
impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board && self.deck == other.deck && self.next_tile == other.next_tile
    }
}

impl Eq for GameState {}
