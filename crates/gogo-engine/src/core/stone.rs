use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Color of a stone (and of the player placing it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Stone {
    #[display("black")]
    Black,
    #[display("white")]
    White,
}

impl Stone {
    pub const ALL: [Stone; 2] = [Stone::Black, Stone::White];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

/// Content of a single board intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[must_use]
    pub const fn stone(self) -> Option<Stone> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Stone::Black),
            Cell::White => Some(Stone::White),
        }
    }

    /// Character used by the text form of a board (`.`, `X`, `O`).
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'X',
            Cell::White => 'O',
        }
    }

    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Cell::Empty),
            'X' => Some(Cell::Black),
            'O' => Some(Cell::White),
            _ => None,
        }
    }

    /// Returns the cell with black and white exchanged.
    #[must_use]
    pub const fn swapped(self) -> Self {
        match self {
            Cell::Empty => Cell::Empty,
            Cell::Black => Cell::White,
            Cell::White => Cell::Black,
        }
    }
}

impl From<Stone> for Cell {
    fn from(stone: Stone) -> Self {
        match stone {
            Stone::Black => Cell::Black,
            Stone::White => Cell::White,
        }
    }
}

/// A pair of values, one per color, indexable by [`Stone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerStone<T> {
    pub black: T,
    pub white: T,
}

impl<T> PerStone<T> {
    pub const fn new(black: T, white: T) -> Self {
        Self { black, white }
    }
}

impl<T> Index<Stone> for PerStone<T> {
    type Output = T;

    fn index(&self, stone: Stone) -> &T {
        match stone {
            Stone::Black => &self.black,
            Stone::White => &self.white,
        }
    }
}

impl<T> IndexMut<Stone> for PerStone<T> {
    fn index_mut(&mut self, stone: Stone) -> &mut T {
        match stone {
            Stone::Black => &mut self.black,
            Stone::White => &mut self.white,
        }
    }
}
