use serde::{Deserialize, Serialize};

use crate::{
    core::Stone,
    engine::{Action, GameRecord, GameState, MoveRequest, Player, Turn},
};

/// Rejected requests a non-human player may make in a row before its turn is
/// turned into a forced pass.
pub const MAX_FAILED_ATTEMPTS: usize = 3;

/// Why a game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    #[display("both players passed")]
    ConsecutivePasses,
    #[display("move limit reached")]
    MoveLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameStatus {
    BlackToMove,
    WhiteToMove,
    Finished(EndReason),
}

impl GameStatus {
    /// Color whose turn it is, or `None` once the game is over.
    #[must_use]
    pub fn to_move(self) -> Option<Stone> {
        match self {
            GameStatus::BlackToMove => Some(Stone::Black),
            GameStatus::WhiteToMove => Some(Stone::White),
            GameStatus::Finished(_) => None,
        }
    }

    fn waiting_for(stone: Stone) -> Self {
        match stone {
            Stone::Black => GameStatus::BlackToMove,
            Stone::White => GameStatus::WhiteToMove,
        }
    }
}

/// Summary of a finished game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOutcome {
    score: f32,
    moves: usize,
    end_reason: EndReason,
}

impl GameOutcome {
    /// Final score from white's point of view.
    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Accepted turns, passes included.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn end_reason(&self) -> EndReason {
        self.end_reason
    }

    #[must_use]
    pub fn winner(&self) -> Stone {
        GameState::winner(self.score)
    }
}

/// Turn protocol between two players.
///
/// Black moves first. Each [`step`](Self::step) consults the player to move once;
/// accepted actions hand the turn over, rejected ones keep it with the same player.
#[derive(Debug)]
pub struct Game<'a> {
    state: GameState,
    black: Box<dyn Player + 'a>,
    white: Box<dyn Player + 'a>,
    status: GameStatus,
    failed_attempts: usize,
    max_moves: Option<usize>,
    history: Vec<Turn>,
}

impl<'a> Game<'a> {
    #[must_use]
    pub fn new(dimension: usize, black: Box<dyn Player + 'a>, white: Box<dyn Player + 'a>) -> Self {
        Self {
            state: GameState::new(dimension),
            black,
            white,
            status: GameStatus::BlackToMove,
            failed_attempts: 0,
            max_moves: None,
            history: vec![],
        }
    }

    /// Finishes the game once `max_moves` turns have been accepted.
    #[must_use]
    pub fn with_max_moves(mut self, max_moves: Option<usize>) -> Self {
        self.max_moves = max_moves;
        self
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Asks the player to move for one request and applies it.
    ///
    /// Does nothing once the game is finished.
    pub fn step(&mut self) -> GameStatus {
        let Some(stone) = self.status.to_move() else {
            return self.status;
        };
        let player = match stone {
            Stone::Black => &mut self.black,
            Stone::White => &mut self.white,
        };

        let request = if self.failed_attempts >= MAX_FAILED_ATTEMPTS {
            MoveRequest::Pass
        } else {
            player.request_move(&self.state, stone)
        };

        let action = match request {
            MoveRequest::Pass => Action::Pass,
            MoveRequest::Place(coord) => Action::Place(coord),
            MoveRequest::Undecided => {
                if !player.is_human() {
                    self.failed_attempts += 1;
                }
                return self.status;
            }
        };

        let previous_passed = self.state.last_move_passed();
        let turn = Turn::new(stone, action);
        if self.state.apply(turn).is_err() {
            if !player.is_human() {
                self.failed_attempts += 1;
            }
            return self.status;
        }

        self.failed_attempts = 0;
        self.history.push(turn);
        self.status = if previous_passed && action == Action::Pass {
            GameStatus::Finished(EndReason::ConsecutivePasses)
        } else if self
            .max_moves
            .is_some_and(|limit| self.state.move_count() >= limit)
        {
            GameStatus::Finished(EndReason::MoveLimit)
        } else {
            GameStatus::waiting_for(stone.opponent())
        };
        self.status
    }

    /// Steps until the game is finished.
    ///
    /// Only terminates if every human player eventually passes; non-human players
    /// are bounded by the forced-pass rule.
    pub fn play_to_end(&mut self) -> GameOutcome {
        loop {
            if let GameStatus::Finished(end_reason) = self.step() {
                return GameOutcome {
                    score: self.state.score(),
                    moves: self.state.move_count(),
                    end_reason,
                };
            }
        }
    }

    /// Converts the game into a record of its accepted turns.
    ///
    /// `end_reason` is `None` for games that have not finished.
    #[must_use]
    pub fn into_record(self) -> GameRecord {
        let end_reason = match self.status {
            GameStatus::Finished(reason) => Some(reason),
            GameStatus::BlackToMove | GameStatus::WhiteToMove => None,
        };
        GameRecord {
            dimension: self.state.dimension(),
            turns: self.history,
            end_reason,
            moves: self.state.move_count(),
            score: self.state.score(),
            final_board: self.state.board().clone(),
        }
    }
}
