//! Conversion of a [`GameState`] into network input.
//!
//! The input row is laid out as:
//!
//! 1. three indicators per cell in scan order: empty, own stone, opponent stone
//! 2. the scalar [`STATE_FEATURES`], in declaration order
//!
//! "Own" and "opponent" are relative to the color the network plays, so the same
//! network can play either side.

use gogo_engine::{Cell, GameState, Stone};

/// Scalar feature appended after the per-cell indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StateFeature {
    #[display("opponent passed")]
    OpponentPassed,
    #[display("own stones")]
    OwnStones,
    #[display("opponent stones")]
    OpponentStones,
    #[display("own stones captured")]
    OwnCaptured,
    #[display("opponent stones captured")]
    OpponentCaptured,
}

pub const STATE_FEATURES: [StateFeature; 5] = [
    StateFeature::OpponentPassed,
    StateFeature::OwnStones,
    StateFeature::OpponentStones,
    StateFeature::OwnCaptured,
    StateFeature::OpponentCaptured,
];

impl StateFeature {
    /// Value of this feature for the player of color `perspective` about to move.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn extract(self, state: &GameState, perspective: Stone) -> f32 {
        let opponent = perspective.opponent();
        match self {
            StateFeature::OpponentPassed => f32::from(u8::from(state.last_move_passed())),
            StateFeature::OwnStones => state.stones(perspective) as f32,
            StateFeature::OpponentStones => state.stones(opponent) as f32,
            StateFeature::OwnCaptured => state.captured(perspective) as f32,
            StateFeature::OpponentCaptured => state.captured(opponent) as f32,
        }
    }
}

/// Network input width for a `dimension`×`dimension` board.
#[must_use]
pub const fn input_width(dimension: usize) -> usize {
    3 * dimension * dimension + STATE_FEATURES.len()
}

/// Network output width: one score per cell plus the pass signal.
#[must_use]
pub const fn output_width(dimension: usize) -> usize {
    dimension * dimension + 1
}

#[must_use]
pub fn encode(state: &GameState, perspective: Stone) -> Vec<f32> {
    let own = Cell::from(perspective);
    let mut input = Vec::with_capacity(input_width(state.dimension()));
    for (_, cell) in state.board().cells() {
        let indicators = [cell.is_empty(), cell == own, !cell.is_empty() && cell != own];
        input.extend(indicators.map(|on| f32::from(u8::from(on))));
    }
    input.extend(
        STATE_FEATURES
            .iter()
            .map(|feature| feature.extract(state, perspective)),
    );
    input
}

#[cfg(test)]
mod tests {
    use gogo_engine::{Action, Board, Coord, Turn};

    use super::*;

    #[test]
    fn test_layout() {
        let board = Board::from_rows(&["X.", ".O"]).unwrap();
        let state = GameState::from_board(board);

        let black = encode(&state, Stone::Black);
        assert_eq!(black.len(), input_width(2));
        assert_eq!(
            &black[..12],
            &[
                0.0, 1.0, 0.0, // X
                1.0, 0.0, 0.0, // .
                1.0, 0.0, 0.0, // .
                0.0, 0.0, 1.0, // O
            ]
        );
        assert_eq!(&black[12..], &[0.0, 1.0, 1.0, 0.0, 0.0]);

        let white = encode(&state, Stone::White);
        assert_eq!(&white[..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&white[9..12], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_state_features_follow_perspective() {
        let mut state = GameState::new(3);
        state
            .apply(Turn::new(Stone::Black, Action::Place(Coord::new(0, 0))))
            .unwrap();
        state.apply(Turn::new(Stone::White, Action::Pass)).unwrap();

        let input = encode(&state, Stone::Black);
        let features = &input[input_width(3) - STATE_FEATURES.len()..];
        assert_eq!(features, &[1.0, 1.0, 0.0, 0.0, 0.0]);

        let input = encode(&state, Stone::White);
        let features = &input[input_width(3) - STATE_FEATURES.len()..];
        assert_eq!(features, &[1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_widths() {
        assert_eq!(input_width(9), 3 * 81 + 5);
        assert_eq!(output_width(9), 82);
    }
}
