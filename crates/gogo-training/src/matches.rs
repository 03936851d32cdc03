use gogo_agent::{Agent, AgentPlayer, NetworkError};
use gogo_engine::{Game, GameRecord};

/// Result of one match between two members of a group.
///
/// `white` and `black` are indices within the group.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub white: usize,
    pub black: usize,
    score: f32,
    moves: usize,
    record: GameRecord,
}

impl MatchOutcome {
    /// Final score from white's point of view.
    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Score divided by the number of moves, so quick wins are worth more.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn adjusted_score(&self) -> f32 {
        self.score / self.moves.max(1) as f32
    }

    #[must_use]
    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    #[must_use]
    pub fn into_record(self) -> GameRecord {
        self.record
    }
}

/// Plays one game to completion between two agents.
///
/// Black moves first. The game ends after two consecutive passes or, when
/// `max_moves` is set, after that many accepted turns.
///
/// # Arguments
///
/// * `white` - In-group index and agent playing white
/// * `black` - In-group index and agent playing black
/// * `dimension` - Board dimension
/// * `max_moves` - Optional limit on accepted turns
///
/// # Errors
///
/// Returns a [`NetworkError`] when either network does not fit a
/// `dimension`×`dimension` board.
pub fn play_match(
    (white_index, white): (usize, &Agent),
    (black_index, black): (usize, &Agent),
    dimension: usize,
    max_moves: Option<usize>,
) -> Result<MatchOutcome, NetworkError> {
    let white_player = AgentPlayer::new(white, dimension)?;
    let black_player = AgentPlayer::new(black, dimension)?;
    let mut game = Game::new(dimension, Box::new(black_player), Box::new(white_player))
        .with_max_moves(max_moves);
    let outcome = game.play_to_end();
    Ok(MatchOutcome {
        white: white_index,
        black: black_index,
        score: outcome.score(),
        moves: outcome.moves(),
        record: game.into_record(),
    })
}
