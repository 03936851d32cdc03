use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ParseBoardError;

use super::{
    coord::Coord,
    stone::{Cell, PerStone, Stone},
};

/// Square grid of intersections.
///
/// The dimension is fixed at creation. Cells are stored in row-major scan order,
/// the same order used by [`Board::coords`] and by the network encoding.
///
/// Groups and empty regions are never stored; they are recomputed on demand with
/// explicit worklist flood fills ([`Board::group_at`], [`Board::empty_regions`]).
///
/// # Text form
///
/// Boards serialize as one string per row, `.` for an empty cell, `X` for black and
/// `O` for white:
///
/// ```
/// use gogo_engine::{Board, Cell, Coord};
///
/// let board = Board::from_rows(&[".X.", "XO.", "..."]).unwrap();
/// assert_eq!(board.get(Coord::new(1, 1)), Some(Cell::White));
/// assert_eq!(board.to_rows(), vec![".X.", "XO.", "..."]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    dimension: usize,
    cells: Vec<Cell>,
}

/// Maximal set of same-colored, orthogonally connected stones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    stone: Stone,
    stones: Vec<Coord>,
    liberties: usize,
}

impl Group {
    #[must_use]
    pub fn stone(&self) -> Stone {
        self.stone
    }

    #[must_use]
    pub fn stones(&self) -> &[Coord] {
        &self.stones
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }

    /// Number of distinct empty cells adjacent to the group.
    #[must_use]
    pub fn liberties(&self) -> usize {
        self.liberties
    }

    #[must_use]
    pub fn has_liberties(&self) -> bool {
        self.liberties > 0
    }
}

/// Maximal set of orthogonally connected empty cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    cells: Vec<Coord>,
    owner: Option<Stone>,
}

impl Region {
    #[must_use]
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Color of every stone bordering the region.
    ///
    /// `None` when the region touches both colors or no stone at all.
    #[must_use]
    pub fn owner(&self) -> Option<Stone> {
        self.owner
    }
}

impl Board {
    /// Creates an empty `dimension`×`dimension` board.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            cells: vec![Cell::Empty; dimension * dimension],
        }
    }

    /// Parses the text form of a board (see the type-level documentation).
    pub fn from_rows<S>(rows: &[S]) -> Result<Self, ParseBoardError>
    where
        S: AsRef<str>,
    {
        let dimension = rows.len();
        if dimension == 0 {
            return Err(ParseBoardError::Empty);
        }
        let mut cells = Vec::with_capacity(dimension * dimension);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != dimension {
                return Err(ParseBoardError::NotSquare {
                    rows: dimension,
                    row: y,
                    len,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell =
                    Cell::from_glyph(glyph).ok_or(ParseBoardError::UnknownGlyph { glyph, x, y })?;
                cells.push(cell);
            }
        }
        Ok(Self { dimension, cells })
    }

    /// Text form of the board, one string per row.
    #[must_use]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.dimension.max(1))
            .map(|row| row.iter().map(|cell| cell.glyph()).collect())
            .collect()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.dimension && coord.y < self.dimension
    }

    /// Returns the cell at `coord`, or `None` when it lies outside the board.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        self.contains(coord)
            .then(|| self.cells[coord.index(self.dimension)])
    }

    /// Overwrites the cell at `coord`.
    ///
    /// # Panics
    ///
    /// Panics if `coord` lies outside the board.
    pub fn set(&mut self, coord: Coord, cell: Cell) {
        assert!(self.contains(coord), "{coord} is outside the board");
        self.cells[coord.index(self.dimension)] = cell;
    }

    /// Iterates over every coordinate in row-major scan order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let dimension = self.dimension;
        (0..dimension * dimension).map(move |i| Coord::from_index(i, dimension))
    }

    /// Iterates over every cell in row-major scan order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        self.coords().zip(self.cells.iter().copied())
    }

    /// Number of cells with the given content.
    #[must_use]
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Returns the board with every black stone turned white and vice versa.
    #[must_use]
    pub fn swapped_colors(&self) -> Self {
        Self {
            dimension: self.dimension,
            cells: self.cells.iter().map(|cell| cell.swapped()).collect(),
        }
    }

    /// Finds the group containing the stone at `start`.
    ///
    /// Returns `None` if `start` is empty or outside the board.
    #[must_use]
    pub fn group_at(&self, start: Coord) -> Option<Group> {
        let stone = self.get(start)?.stone()?;
        let own = Cell::from(stone);

        // Stones and liberties are disjoint cells, so one visited set covers both.
        let mut visited = vec![false; self.cells.len()];
        let mut stack = vec![start];
        visited[start.index(self.dimension)] = true;

        let mut stones = vec![];
        let mut liberties = 0;
        while let Some(coord) = stack.pop() {
            stones.push(coord);
            for neighbor in coord.neighbors(self.dimension) {
                let i = neighbor.index(self.dimension);
                if visited[i] {
                    continue;
                }
                match self.cells[i] {
                    Cell::Empty => {
                        visited[i] = true;
                        liberties += 1;
                    }
                    cell if cell == own => {
                        visited[i] = true;
                        stack.push(neighbor);
                    }
                    _ => {}
                }
            }
        }

        Some(Group {
            stone,
            stones,
            liberties,
        })
    }

    /// Partitions every empty cell into maximal connected regions.
    ///
    /// Each empty cell belongs to exactly one returned region.
    #[must_use]
    pub fn empty_regions(&self) -> Vec<Region> {
        let mut visited = vec![false; self.cells.len()];
        let mut regions = vec![];

        for start in self.coords() {
            let start_index = start.index(self.dimension);
            if visited[start_index] || !self.cells[start_index].is_empty() {
                continue;
            }

            visited[start_index] = true;
            let mut stack = vec![start];
            let mut cells = vec![];
            let mut borders = PerStone::new(false, false);
            while let Some(coord) = stack.pop() {
                cells.push(coord);
                for neighbor in coord.neighbors(self.dimension) {
                    let i = neighbor.index(self.dimension);
                    match self.cells[i].stone() {
                        Some(stone) => borders[stone] = true,
                        None if !visited[i] => {
                            visited[i] = true;
                            stack.push(neighbor);
                        }
                        None => {}
                    }
                }
            }

            let owner = match (borders.black, borders.white) {
                (true, false) => Some(Stone::Black),
                (false, true) => Some(Stone::White),
                _ => None,
            };
            regions.push(Region { cells, owner });
        }

        regions
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            let mut glyphs = row.chars();
            if let Some(first) = glyphs.next() {
                write!(f, "{first}")?;
            }
            for glyph in glyphs {
                write!(f, " {glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Board::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}
