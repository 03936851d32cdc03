use std::{collections::VecDeque, fmt};

use crate::{
    core::{Coord, Stone},
    engine::GameState,
};

/// What a player wants to do on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MoveRequest {
    Pass,
    Place(Coord),
    /// The player has no move to offer right now.
    Undecided,
}

/// Source of moves for one side of a [`Game`](crate::Game).
///
/// Players only ever see a shared view of the state. A rejected request is answered
/// by asking the same player again, so implementations that keep per-turn state
/// (e.g. a ranked candidate list) should hand out a different request on retry.
pub trait Player: fmt::Debug {
    fn request_move(&mut self, state: &GameState, stone: Stone) -> MoveRequest;

    /// Humans are never forced to pass after repeated rejections.
    fn is_human(&self) -> bool {
        false
    }
}

/// Player replaying a fixed list of requests, then passing forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    script: VecDeque<MoveRequest>,
    human: bool,
}

impl ScriptedPlayer {
    pub fn new(script: impl IntoIterator<Item = MoveRequest>) -> Self {
        Self {
            script: script.into_iter().collect(),
            human: false,
        }
    }

    /// Marks the player as human, exempting it from the forced-pass rule.
    #[must_use]
    pub fn human(mut self) -> Self {
        self.human = true;
        self
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Player for ScriptedPlayer {
    fn request_move(&mut self, _state: &GameState, _stone: Stone) -> MoveRequest {
        self.script.pop_front().unwrap_or(MoveRequest::Pass)
    }

    fn is_human(&self) -> bool {
        self.human
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_player_passes_when_exhausted() {
        let state = GameState::new(3);
        let mut player = ScriptedPlayer::new([MoveRequest::Place(Coord::new(0, 0))]);
        assert_eq!(
            player.request_move(&state, Stone::Black),
            MoveRequest::Place(Coord::new(0, 0))
        );
        assert_eq!(player.remaining(), 0);
        assert!(player.request_move(&state, Stone::Black).is_pass());
        assert!(!player.is_human());
        assert!(ScriptedPlayer::default().human().is_human());
    }
}
