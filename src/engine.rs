use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::GameError;

/// A tile value. `0` is an empty cell; live tiles are 1, 2, 3, 6, 12, 24, ...
pub type Tile = u32;

/// Standard Threes! board edge length.
pub const DEFAULT_SIZE: usize = 4;

/// Highest tile reported for a board that has nothing above 3 yet.
pub const HIGHEST_TILE_FLOOR: Tile = 3;

/// A direction to swipe the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

impl Move {
    /// All four directions in canonical order.
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    /// Lowercase label used in game history.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Move::Left => "left",
            Move::Right => "right",
            Move::Up => "up",
            Move::Down => "down",
        }
    }

    /// Position of this direction in [`Move::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Left => 0,
            Move::Right => 1,
            Move::Up => 2,
            Move::Down => 3,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown move {0:?}; expected left, right, up or down")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Move::Left),
            "right" | "r" => Ok(Move::Right),
            "up" | "u" => Ok(Move::Up),
            "down" | "d" => Ok(Move::Down),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

/// Square `n x n` Threes! board stored row-major.
///
/// All operations are pure: they return a new board and never mutate `self`.
/// Serializes as a list of rows.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Tile>>", try_from = "Vec<Vec<Tile>>")]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
}

impl Board {
    /// An empty `size x size` board.
    ///
    /// # Panics
    /// If `size` is 0. Use [`Board::from_rows`] or validate a
    /// [`GameConfig`](crate::game::GameConfig) to get an error instead.
    pub fn empty(size: usize) -> Self {
        assert!(size > 0, "board size must be at least 1");
        Board { size, cells: vec![0; size * size] }
    }

    /// Build a board from rows. Rows must form a non-empty square.
    ///
    /// ```
    /// use threes_ai::engine::Board;
    /// let b = Board::from_rows(vec![vec![1, 0], vec![0, 2]]).unwrap();
    /// assert_eq!(b.size(), 2);
    /// assert!(Board::from_rows(vec![vec![1, 2, 3], vec![0, 0]]).is_err());
    /// ```
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GameError> {
        let size = rows.len();
        if size == 0 {
            return Err(GameError::ZeroSize);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(GameError::NotSquare { row: row_idx, len: row.len(), size });
            }
            cells.extend(row);
        }
        Ok(Board { size, cells })
    }

    /// Edge length of the board.
    #[inline]
    pub fn size(&self) -> usize { self.size }

    /// Tile at row `r`, column `c`.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> Tile { self.cells[r * self.size + c] }

    #[inline]
    pub(crate) fn set(&mut self, r: usize, c: usize, tile: Tile) { self.cells[r * self.size + c] = tile; }

    /// Copy of the board as a list of rows.
    pub fn rows(&self) -> Vec<Vec<Tile>> {
        self.cells.chunks(self.size).map(|row| row.to_vec()).collect()
    }

    /// Cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Tile] { &self.cells }

    /// Number of empty cells.
    pub fn count_empty(&self) -> usize { self.cells.iter().filter(|&&t| t == 0).count() }

    /// Number of occupied cells.
    pub fn count_tiles(&self) -> usize { self.cells.len() - self.count_empty() }

    /// Sum of all tile values.
    pub fn tile_sum(&self) -> u64 { self.cells.iter().map(|&t| t as u64).sum() }

    /// Highest tile on the board, never less than [`HIGHEST_TILE_FLOOR`].
    ///
    /// ```
    /// use threes_ai::engine::Board;
    /// assert_eq!(Board::empty(4).highest_tile(), 3);
    /// let b = Board::from_rows(vec![vec![48, 1], vec![2, 0]]).unwrap();
    /// assert_eq!(b.highest_tile(), 48);
    /// ```
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0).max(HIGHEST_TILE_FLOOR)
    }

    /// Slide/merge tiles in `dir` without inserting anything.
    ///
    /// Equivalent to a swipe with an empty incoming tile. Returns an equal
    /// board when the move is illegal.
    pub fn shift(&self, dir: Move) -> Board {
        let (work, changed) = self.slide(dir);
        if changed.is_empty() {
            return self.clone();
        }
        work.restore(dir)
    }

    /// Swipe in `dir` and place `incoming` on the trailing edge of one line that moved.
    ///
    /// The line receiving the tile is chosen uniformly among the lines that
    /// changed. When nothing moves the board is returned unchanged; that is the
    /// only signal that `dir` is illegal.
    ///
    /// ```
    /// use threes_ai::engine::{Board, Move};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let b = Board::from_rows(vec![vec![1, 2, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]]).unwrap();
    /// let after = b.swipe(Move::Left, 3, &mut rng);
    /// assert_eq!(after.rows()[0], vec![3, 0, 0, 3]);
    /// ```
    pub fn swipe<R: Rng + ?Sized>(&self, dir: Move, incoming: Tile, rng: &mut R) -> Board {
        let (mut work, changed) = self.slide(dir);
        if changed.is_empty() {
            return self.clone();
        }
        let line = changed[rng.gen_range(0..changed.len())];
        let last = work.size - 1;
        work.set(line, last, incoming);
        work.restore(dir)
    }

    /// True if swiping in `dir` would move or merge at least one tile.
    pub fn is_legal(&self, dir: Move) -> bool {
        let mut work = self.orient(dir);
        (0..work.size).any(|r| shift_line_left(work.line_mut(r)))
    }

    /// Directions that change the board, in [`Move::ALL`] order.
    pub fn legal_moves(&self) -> Vec<Move> {
        Move::ALL.iter().copied().filter(|&dir| self.is_legal(dir)).collect()
    }

    /// True when no direction changes the board.
    ///
    /// ```
    /// use threes_ai::engine::Board;
    /// let stuck = Board::from_rows(vec![vec![1, 3], vec![3, 1]]).unwrap();
    /// assert!(stuck.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        !Move::ALL.iter().any(|&dir| self.is_legal(dir))
    }

    /// Mirror left/right.
    pub fn reversed(&self) -> Board {
        let mut out = self.clone();
        for row in out.cells.chunks_mut(self.size) {
            row.reverse();
        }
        out
    }

    /// Reflect across the main diagonal.
    pub fn transposed(&self) -> Board {
        let n = self.size;
        let mut out = Board::empty(n);
        for r in 0..n {
            for c in 0..n {
                out.cells[c * n + r] = self.cells[r * n + c];
            }
        }
        out
    }

    #[inline]
    fn line_mut(&mut self, r: usize) -> &mut [Tile] {
        let n = self.size;
        &mut self.cells[r * n..(r + 1) * n]
    }

    // Map `dir` onto a left swipe.
    fn orient(&self, dir: Move) -> Board {
        match dir {
            Move::Left => self.clone(),
            Move::Right => self.reversed(),
            Move::Up => self.transposed(),
            Move::Down => self.transposed().reversed(),
        }
    }

    // Inverse of `orient`.
    fn restore(self, dir: Move) -> Board {
        match dir {
            Move::Left => self,
            Move::Right => self.reversed(),
            Move::Up => self.transposed(),
            Move::Down => self.reversed().transposed(),
        }
    }

    // Left-shift every line of the oriented board; returns it with the indices of changed lines.
    fn slide(&self, dir: Move) -> (Board, Vec<usize>) {
        let mut work = self.orient(dir);
        let changed = (0..work.size).filter(|&r| shift_line_left(work.line_mut(r))).collect();
        (work, changed)
    }
}

/// Shift one line towards index 0 in place; returns true if anything changed.
///
/// A single left-to-right pass over the live buffer: each cell slides into an
/// empty left neighbour, doubles with an equal multiple-of-3 neighbour, or
/// combines with a 1/2 partner into a 3. Later steps see earlier writes, so a
/// tile can slide into a gap opened earlier in the same pass.
///
/// ```
/// use threes_ai::engine::shift_line_left;
/// let mut line = [1, 2, 0, 0];
/// assert!(shift_line_left(&mut line));
/// assert_eq!(line, [3, 0, 0, 0]);
/// ```
pub fn shift_line_left(line: &mut [Tile]) -> bool {
    let mut changed = false;
    for i in 1..line.len() {
        let (left, right) = (line[i - 1], line[i]);
        if right == 0 {
            continue;
        }
        if left == 0 {
            line[i - 1] = right;
            line[i] = 0;
        } else if left == right && right % 3 == 0 {
            line[i - 1] = left * 2;
            line[i] = 0;
        } else if left + right == 3 {
            line[i - 1] = 3;
            line[i] = 0;
        } else {
            continue;
        }
        changed = true;
    }
    changed
}

impl From<Board> for Vec<Vec<Tile>> {
    fn from(b: Board) -> Self { b.rows() }
}

impl TryFrom<Vec<Vec<Tile>>> for Board {
    type Error = GameError;

    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> { Board::from_rows(rows) }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.rows())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .cells
            .iter()
            .map(|t| t.to_string().len())
            .max()
            .unwrap_or(1)
            .max(4)
            + 2;
        let rule = "-".repeat((width + 1) * self.size - 1);
        for (r, row) in self.cells.chunks(self.size).enumerate() {
            if r > 0 {
                writeln!(f, "{}", rule)?;
            }
            let cells: Vec<String> = row
                .iter()
                .map(|&t| if t == 0 { " ".repeat(width) } else { format!("{:^width$}", t, width = width) })
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}
