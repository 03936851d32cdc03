use serde::{Deserialize, Serialize};

use crate::{
    ReplayError,
    core::{Board, Stone},
    engine::{EndReason, GameState, Turn},
};

/// Serializable history of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub(super) dimension: usize,
    pub(super) turns: Vec<Turn>,
    pub(super) end_reason: Option<EndReason>,
    pub(super) moves: usize,
    pub(super) score: f32,
    pub(super) final_board: Board,
}

impl GameRecord {
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Accepted turns in the order they were played.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[must_use]
    pub fn final_board(&self) -> &Board {
        &self.final_board
    }

    /// Rebuilds the final state by applying the recorded turns to an empty board.
    ///
    /// Turns must alternate, black first, and every one of them must be legal.
    pub fn replay(&self) -> Result<GameState, ReplayError> {
        let mut state = GameState::new(self.dimension);
        let mut expected = Stone::Black;
        for (index, turn) in self.turns.iter().enumerate() {
            if turn.stone != expected {
                return Err(ReplayError::OutOfOrder {
                    index,
                    expected,
                    found: turn.stone,
                });
            }
            state
                .apply(*turn)
                .map_err(|source| ReplayError::Illegal { index, source })?;
            expected = expected.opponent();
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Action, Coord, Game, IllegalMove, MoveRequest, ScriptedPlayer};

    use super::*;

    fn finished_game() -> GameRecord {
        let black = ScriptedPlayer::new([
            MoveRequest::Place(Coord::new(1, 0)),
            MoveRequest::Place(Coord::new(0, 1)),
            MoveRequest::Place(Coord::new(2, 2)),
        ]);
        let white = ScriptedPlayer::new([
            MoveRequest::Place(Coord::new(0, 0)),
            MoveRequest::Place(Coord::new(4, 4)),
            MoveRequest::Place(Coord::new(3, 3)),
        ]);
        let mut game = Game::new(5, Box::new(black), Box::new(white));
        game.play_to_end();
        game.into_record()
    }

    #[test]
    fn test_serialized_record_replays_to_same_score() {
        let record = finished_game();
        assert_eq!(record.end_reason(), Some(EndReason::ConsecutivePasses));
        // The white corner stone was captured by black's second move.
        assert_eq!(record.final_board().get(Coord::new(0, 0)), Some(crate::Cell::Empty));

        let json = serde_json::to_string(&record).unwrap();
        let restored: GameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);

        let state = restored.replay().unwrap();
        assert_eq!(state.score(), record.score());
        assert_eq!(state.move_count(), record.moves());
        assert_eq!(state.board(), record.final_board());
        assert_eq!(state.captured(Stone::White), 1);
    }

    #[test]
    fn test_replay_rejects_bad_records() {
        let mut record = finished_game();
        record.turns.swap(0, 1);
        assert_eq!(
            record.replay(),
            Err(ReplayError::OutOfOrder {
                index: 0,
                expected: Stone::Black,
                found: Stone::White,
            })
        );

        let mut record = finished_game();
        record.turns[2] = Turn::new(Stone::Black, Action::Place(Coord::new(1, 0)));
        assert_eq!(
            record.replay(),
            Err(ReplayError::Illegal {
                index: 2,
                source: IllegalMove::Occupied {
                    coord: Coord::new(1, 0)
                },
            })
        );
    }
}
