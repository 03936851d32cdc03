//! Rules engine for Go on an arbitrary N×N board.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - plain data: stones, coordinates and the [`Board`] grid together with
//!   the flood fills used to find groups and empty regions.
//! - [`engine`] - game logic: placement legality, captures, the ko rule and area
//!   scoring ([`GameState`]), the turn protocol driving two [`Player`]s ([`Game`]) and
//!   serializable [`GameRecord`]s of finished games.
//!
//! # Example
//!
//! ```
//! use gogo_engine::{Action, Coord, GameState, Stone, Turn};
//!
//! let mut state = GameState::new(5);
//! state.apply(Turn::new(Stone::Black, Action::Place(Coord::new(2, 2)))).unwrap();
//! state.apply(Turn::new(Stone::White, Action::Pass)).unwrap();
//!
//! assert_eq!(state.stones(Stone::Black), 1);
//! assert!(state.last_move_passed());
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reason a stone placement was rejected by the rules engine.
///
/// Rejections are ordinary outcomes consumed by the turn protocol; the game state
/// is left untouched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum IllegalMove {
    #[display("{coord} is outside the board")]
    OutOfBounds { coord: Coord },
    #[display("{coord} is already occupied")]
    Occupied { coord: Coord },
    #[display("{coord} would immediately recapture the ko stone")]
    Ko { coord: Coord },
    #[display("{coord} would leave the placed stone without liberties")]
    Suicide { coord: Coord },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("board has no rows")]
    Empty,
    #[display("board has {rows} rows but row {row} has {len} cells")]
    NotSquare { rows: usize, row: usize, len: usize },
    #[display("unknown cell glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ReplayError {
    #[display("turn {index} was played by {found} but {expected} was to move")]
    OutOfOrder {
        index: usize,
        expected: Stone,
        found: Stone,
    },
    #[display("turn {index} is illegal: {source}")]
    Illegal { index: usize, source: IllegalMove },
}
