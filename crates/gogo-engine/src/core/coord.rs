use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Intersection on the board, `(0, 0)` being the top-left corner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Converts a row-major scan index into a coordinate.
    #[must_use]
    pub const fn from_index(index: usize, dimension: usize) -> Self {
        Self {
            x: index % dimension,
            y: index / dimension,
        }
    }

    /// Row-major scan index of this coordinate.
    #[must_use]
    pub const fn index(self, dimension: usize) -> usize {
        self.y * dimension + self.x
    }

    /// Orthogonal neighbors that lie on a `dimension`×`dimension` board.
    ///
    /// Neighbors are yielded in left, right, up, down order.
    #[must_use]
    pub fn neighbors(self, dimension: usize) -> ArrayVec<Coord, 4> {
        let mut result = ArrayVec::new();
        if self.x > 0 {
            result.push(Coord::new(self.x - 1, self.y));
        }
        if self.x + 1 < dimension {
            result.push(Coord::new(self.x + 1, self.y));
        }
        if self.y > 0 {
            result.push(Coord::new(self.x, self.y - 1));
        }
        if self.y + 1 < dimension {
            result.push(Coord::new(self.x, self.y + 1));
        }
        result
    }
}
