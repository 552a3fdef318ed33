//! Hex addressing and the tile grid.
//!
//! Hexes are addressed by `(col, row)` in a skewed layout: column `c` holds
//! rows `(c+1)/2 .. (c+1)/2 + height`. Moving along direction 1 raises both
//! column and row, so every column has the same number of hexes and the grid
//! is stored as a dense `columns * height` array.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::world::CritterId;

/// Most hexes a grid may hold.
pub const MAX_HEXES: usize = 1 << 22;

/// A hex address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Column.
    pub col: i32,
    /// Row.
    pub row: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The coordinate `distance` hexes along `dir`, or `None` on overflow.
    ///
    /// Negative distances walk backwards.
    #[must_use]
    pub fn step(self, dir: Direction, distance: i32) -> Option<Self> {
        let (dc, dr) = dir.offset();
        let col = i64::from(self.col) + i64::from(dc) * i64::from(distance);
        let row = i64::from(self.row) + i64::from(dr) * i64::from(distance);
        Some(Self {
            col: i32::try_from(col).ok()?,
            row: i32::try_from(row).ok()?,
        })
    }

    /// The adjacent coordinate along `dir`.
    #[must_use]
    pub fn neighbor(self, dir: Direction) -> Option<Self> {
        self.step(dir, 1)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// One of the six facings, clockwise from 0 (up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Direction(u8);

/// `(col, row)` delta of each direction.
const OFFSETS: [(i32, i32); 6] = [(0, 1), (1, 1), (1, 0), (0, -1), (-1, -1), (-1, 0)];

impl Direction {
    /// Every direction in clockwise order.
    pub const ALL: [Direction; 6] = [
        Direction(0),
        Direction(1),
        Direction(2),
        Direction(3),
        Direction(4),
        Direction(5),
    ];

    /// Direction `value` mod 6.
    #[must_use]
    pub fn new(value: i32) -> Self {
        Self(u8::try_from(value.rem_euclid(6)).unwrap_or(0))
    }

    /// Numeric value in `[0, 6)`.
    #[must_use]
    pub fn value(self) -> i32 {
        i32::from(self.0)
    }

    /// One step counter-clockwise.
    #[must_use]
    pub const fn left(self) -> Self {
        Self((self.0 + 5) % 6)
    }

    /// One step clockwise.
    #[must_use]
    pub const fn right(self) -> Self {
        Self((self.0 + 1) % 6)
    }

    /// The facing directly behind.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self((self.0 + 3) % 6)
    }

    /// `self` rotated `turns` steps clockwise.
    #[must_use]
    pub fn rotate(self, turns: i32) -> Self {
        Self::new(self.value() + turns)
    }

    /// `(col, row)` delta of one step.
    #[must_use]
    pub fn offset(self) -> (i32, i32) {
        OFFSETS[usize::from(self.0)]
    }

    /// Number of single turns needed to face `other`.
    #[must_use]
    pub fn turn_cost(self, other: Self) -> i32 {
        let diff = self.relative(other);
        diff.min(6 - diff)
    }

    /// Clockwise steps from `self` to `other`, in `[0, 6)`.
    #[must_use]
    pub fn relative(self, other: Self) -> i32 {
        i32::from((other.0 + 6 - self.0) % 6)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a hex holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Content {
    /// Nothing.
    #[default]
    Empty,
    /// An impassable rock.
    Rock,
    /// A positive amount of food.
    Food(i32),
    /// A live critter.
    Critter(CritterId),
}

impl Content {
    /// Whether the hex holds nothing.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Content::Empty)
    }
}

/// One tile of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hex {
    /// Current content.
    pub content: Content,
    /// World version of the last change to this hex.
    pub last_updated: u64,
}

/// The dense hex array.
#[derive(Debug, Clone)]
pub struct Grid {
    columns: i32,
    rows: i32,
    height: i32,
    cells: Vec<Hex>,
}

impl Grid {
    /// An empty grid, or `None` when no column would hold a hex or the grid
    /// would exceed [`MAX_HEXES`].
    #[must_use]
    pub fn new(columns: i32, rows: i32) -> Option<Self> {
        if columns < 1 {
            return None;
        }
        let height = rows.checked_sub(Self::first_row(columns))?;
        if height < 0 {
            return None;
        }
        let len = usize::try_from(columns)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?;
        if len > MAX_HEXES {
            return None;
        }
        Some(Self {
            columns,
            rows,
            height,
            cells: vec![Hex::default(); len],
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Nominal number of rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Hexes per column.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Number of hexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no hexes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First valid row of column `col`.
    #[must_use]
    pub const fn first_row(col: i32) -> i32 {
        col / 2 + col % 2
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.col < 0 || coord.col >= self.columns {
            return None;
        }
        let offset = coord.row.checked_sub(Self::first_row(coord.col))?;
        if offset < 0 || offset >= self.height {
            return None;
        }
        let col = usize::try_from(coord.col).ok()?;
        let offset = usize::try_from(offset).ok()?;
        let height = usize::try_from(self.height).ok()?;
        Some(col * height + offset)
    }

    /// Whether `coord` names a hex of this grid.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.index(coord).is_some()
    }

    /// The hex at `coord`.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Hex> {
        self.index(coord).map(|i| &self.cells[i])
    }

    /// Content at `coord`, or `None` off the grid.
    #[must_use]
    pub fn content(&self, coord: Coord) -> Option<Content> {
        self.get(coord).map(|hex| hex.content)
    }

    /// Replace the content at `coord`, stamping the hex with `version`.
    ///
    /// Returns `false` if the coordinate is off the grid.
    pub fn set(&mut self, coord: Coord, content: Content, version: u64) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.cells[i] = Hex {
                    content,
                    last_updated: version,
                };
                true
            }
            None => false,
        }
    }

    /// Stamp one hex with `version`, keeping its content.
    pub(crate) fn touch(&mut self, coord: Coord, version: u64) {
        if let Some(i) = self.index(coord) {
            self.cells[i].last_updated = version;
        }
    }

    /// Stamp every hex with `version`.
    pub(crate) fn touch_all(&mut self, version: u64) {
        for hex in &mut self.cells {
            hex.last_updated = version;
        }
    }

    /// Every coordinate, column by column.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.columns).flat_map(move |col| {
            let first = Self::first_row(col);
            (first..first + self.height).map(move |row| Coord::new(col, row))
        })
    }

    /// Every coordinate with its hex.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Hex)> + '_ {
        self.coords().zip(self.cells.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layout() {
        let grid = Grid::new(5, 6).unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 15);
        assert!(grid.contains(Coord::new(0, 0)));
        assert!(grid.contains(Coord::new(0, 2)));
        assert!(!grid.contains(Coord::new(0, 3)));
        assert!(!grid.contains(Coord::new(1, 0)));
        assert!(grid.contains(Coord::new(1, 1)));
        assert!(grid.contains(Coord::new(4, 4)));
        assert!(!grid.contains(Coord::new(5, 3)));
        assert!(!grid.contains(Coord::new(-1, 0)));
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(Grid::new(0, 10).is_none());
        assert!(Grid::new(5, 2).is_none());
        assert!(Grid::new(-3, 10).is_none());
        assert!(Grid::new(1, 1).is_some());
        assert!(Grid::new(100_000, 100_000).is_none());
        assert!(Grid::new(i32::MAX, i32::MAX).is_none());
    }

    #[test]
    fn test_coords_match_storage() {
        let grid = Grid::new(4, 5).unwrap();
        let coords: Vec<Coord> = grid.coords().collect();
        assert_eq!(coords.len(), grid.len());
        for coord in coords {
            assert!(grid.contains(coord), "{coord}");
        }
    }

    #[test]
    fn test_directions() {
        let d = Direction::new(-1);
        assert_eq!(d.value(), 5);
        assert_eq!(d.right().value(), 0);
        assert_eq!(d.left().value(), 4);
        assert_eq!(Direction::new(1).opposite().value(), 4);
        assert_eq!(Direction::new(0).turn_cost(Direction::new(5)), 1);
        assert_eq!(Direction::new(1).turn_cost(Direction::new(4)), 3);
        assert_eq!(Direction::new(4).relative(Direction::new(1)), 3);
        for dir in Direction::ALL {
            let there = Coord::new(3, 3).neighbor(dir).unwrap();
            assert_eq!(there.neighbor(dir.opposite()), Some(Coord::new(3, 3)));
        }
    }

    #[test]
    fn test_step_overflow() {
        assert_eq!(Coord::new(i32::MAX, 0).step(Direction::new(2), 1), None);
        assert_eq!(
            Coord::new(2, 2).step(Direction::new(1), -2),
            Some(Coord::new(0, 0))
        );
    }

    #[test]
    fn test_set_stamps_version() {
        let mut grid = Grid::new(3, 3).unwrap();
        assert!(grid.set(Coord::new(1, 1), Content::Rock, 4));
        assert!(!grid.set(Coord::new(1, 0), Content::Rock, 4));
        let hex = grid.get(Coord::new(1, 1)).unwrap();
        assert_eq!(hex.content, Content::Rock);
        assert_eq!(hex.last_updated, 4);
    }
}
