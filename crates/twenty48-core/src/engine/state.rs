use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ops;

/// Side length of the board.
pub const SIZE: usize = 4;

/// Tile value whose first appearance latches the `won` flag.
pub const WIN_TILE: u32 = 2048;

/// Largest tile a 4x4 board can hold. Two of them never merge.
pub const MAX_TILE: u32 = 1 << 17;

pub(crate) type Row = [u32; SIZE];

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in the fixed `[Up, Down, Left, Right]` order used by
    /// `legal_moves`.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Map a key name to a direction.
    ///
    /// Accepts browser key names (`ArrowUp`), WASD and vi keys. Returns `None`
    /// for anything else so input layers can ignore unrelated keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" | "k" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" | "j" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" | "h" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" | "l" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Direction::from_key(s.trim())
                .ok_or_else(|| ParseDirectionError(s.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid tile {value} at ({row}, {col}): expected 0 or a power of two in 2..=131072")]
    InvalidTile { row: usize, col: usize, value: u32 },
    #[error("expected 4x4 rows")]
    Shape,
}

/// 4x4 2048 board, row-major, each cell 0 (empty) or a power of two >= 2.
///
/// `Grid` is `Copy`: every engine operation takes it by value and hands back a
/// new one, so a caller's snapshot is never touched behind its back.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct Grid(pub(crate) [Row; SIZE]);

impl Grid {
    /// A constant empty board (all zeros).
    pub const EMPTY: Grid = Grid([[0; SIZE]; SIZE]);

    /// Build a grid from trusted rows.
    ///
    /// Panics if any value breaks the tile invariant; use [`Grid::from_rows`]
    /// for input that crosses a trust boundary.
    ///
    /// ```
    /// use twenty48_core::engine::Grid;
    /// let g = Grid::new([[2, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
    /// assert_eq!(g.count_empty(), 14);
    /// ```
    pub fn new(rows: [[u32; SIZE]; SIZE]) -> Self {
        match Self::from_rows(rows) {
            Ok(grid) => grid,
            Err(err) => panic!("grid contract violated: {err}"),
        }
    }

    /// Validate and build a grid from untrusted rows.
    pub fn from_rows(rows: [[u32; SIZE]; SIZE]) -> Result<Self, GridError> {
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if !is_tile_value(value) {
                    return Err(GridError::InvalidTile { row: r, col: c, value });
                }
            }
        }
        Ok(Grid(rows))
    }

    /// Borrow the rows.
    #[inline]
    pub fn rows(&self) -> &[[u32; SIZE]; SIZE] {
        &self.0
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.0[row][col]
    }

    /// Slide/merge tiles in `dir`. No randomness.
    ///
    /// ```
    /// use twenty48_core::engine::{Direction, Grid};
    /// let g = Grid::new([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
    /// let t = g.shift(Direction::Left);
    /// assert_eq!(t.grid.rows()[0], [4, 4, 0, 0]);
    /// assert_eq!(t.score_delta, 8);
    /// assert!(t.moved);
    /// ```
    #[inline]
    pub fn shift(self, dir: Direction) -> ops::Transition {
        ops::transition(self, dir)
    }

    /// True if no empty cell remains and no adjacent pair can merge.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        ops::is_terminal(self)
    }

    #[inline]
    pub fn count_empty(&self) -> usize {
        ops::count_empty(self)
    }

    /// Highest tile value on the board (0 on an empty board).
    #[inline]
    pub fn highest_tile(&self) -> u32 {
        ops::highest_tile(self)
    }

    /// Sum of all tile values.
    #[inline]
    pub fn tile_sum(&self) -> u64 {
        ops::tile_sum(self)
    }

    /// Iterate over cell values in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }
}

/// 0 or 2^k with 1 <= k <= 17.
#[inline]
pub(crate) fn is_tile_value(value: u32) -> bool {
    value == 0 || (value >= 2 && value <= MAX_TILE && value.is_power_of_two())
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({:?})", self.0)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(SIZE * 7 + SIZE - 1);
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 {
                writeln!(f, "{separator}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| ops::format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<Grid> for [[u32; SIZE]; SIZE] {
    fn from(g: Grid) -> Self {
        g.0
    }
}

impl From<Grid> for Vec<Vec<u32>> {
    fn from(g: Grid) -> Self {
        g.0.iter().map(|row| row.to_vec()).collect()
    }
}

impl TryFrom<[[u32; SIZE]; SIZE]> for Grid {
    type Error = GridError;
    fn try_from(rows: [[u32; SIZE]; SIZE]) -> Result<Self, Self::Error> {
        Grid::from_rows(rows)
    }
}

impl TryFrom<Vec<Vec<u32>>> for Grid {
    type Error = GridError;
    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self, Self::Error> {
        if rows.len() != SIZE || rows.iter().any(|row| row.len() != SIZE) {
            return Err(GridError::Shape);
        }
        let mut out = [[0u32; SIZE]; SIZE];
        for (dst, src) in out.iter_mut().zip(rows.iter()) {
            dst.copy_from_slice(src);
        }
        Grid::from_rows(out)
    }
}
