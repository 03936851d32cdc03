//! Game logic built on top of the [`core`](crate::core) data structures.
//!
//! - [`GameState`] - board plus running counters; implements placement legality,
//!   captures, the ko rule and scoring
//! - [`Game`] - turn protocol asking two [`Player`]s for moves until both pass
//! - [`GameRecord`] - serializable history of a finished game that can be replayed
//!
//! # Game Flow
//!
//! 1. Create a [`Game`] with a board dimension and two players (black moves first)
//! 2. Each [`Game::step`] asks the player to move for a [`MoveRequest`]
//! 3. Rejected placements keep the turn with the same player; after
//!    [`MAX_FAILED_ATTEMPTS`] rejections the turn becomes a forced pass
//! 4. Two consecutive passes finish the game
//!
//! ```
//! use gogo_engine::{Coord, Game, MoveRequest, ScriptedPlayer};
//!
//! let black = ScriptedPlayer::new([MoveRequest::Place(Coord::new(1, 1))]);
//! let white = ScriptedPlayer::new([]);
//! let mut game = Game::new(3, Box::new(black), Box::new(white));
//! let outcome = game.play_to_end();
//!
//! // black owns the whole board: 1 stone + 8 territory, minus the 0.5 tie breaker
//! assert_eq!(outcome.score(), -9.5);
//! ```

pub use self::{game::*, game_state::*, player::*, record::*};

mod game;
mod game_state;
mod player;
mod record;
