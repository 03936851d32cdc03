use serde::{Deserialize, Serialize};

use crate::{
    IllegalMove,
    core::{Board, Cell, Coord, PerStone, Stone},
};

/// Tie breaker subtracted from every score.
pub const KOMI: f32 = 0.5;

/// Action taken by a player on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Pass,
    Place(Coord),
}

/// An accepted action together with the color that played it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub stone: Stone,
    pub action: Action,
}

impl Turn {
    #[must_use]
    pub const fn new(stone: Stone, action: Action) -> Self {
        Self { stone, action }
    }
}

/// Result of a legal placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    captured: usize,
}

impl Placement {
    /// Number of opponent stones removed by the placement.
    #[must_use]
    pub fn captured(&self) -> usize {
        self.captured
    }
}

/// Single-point ko restriction.
///
/// `point` is the stone that just captured exactly one stone. `pending` delays the
/// unlock by one turn: the lock survives the turn that created it and is cleared at
/// the end of the following turn unless that turn arms a new lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KoLock {
    point: Option<Coord>,
    pending: bool,
}

impl KoLock {
    #[must_use]
    pub fn point(&self) -> Option<Coord> {
        self.point
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Board plus the running counters of a single game.
///
/// The state is exclusively owned by the game running it; players only ever see a
/// shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    move_count: usize,
    stones: PerStone<usize>,
    captured: PerStone<usize>,
    last_move_passed: bool,
    ko: KoLock,
}

impl GameState {
    /// Creates the state of a new game on an empty `dimension`×`dimension` board.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self::from_board(Board::new(dimension))
    }

    /// Creates a state from an arbitrary position, with no captures recorded.
    #[must_use]
    pub fn from_board(board: Board) -> Self {
        let stones = PerStone::new(board.count(Cell::Black), board.count(Cell::White));
        Self {
            board,
            move_count: 0,
            stones,
            captured: PerStone::default(),
            last_move_passed: false,
            ko: KoLock::default(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.board.dimension()
    }

    /// Number of turns completed so far, passes included.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    /// Stones of the given color currently on the board.
    #[must_use]
    pub fn stones(&self, stone: Stone) -> usize {
        self.stones[stone]
    }

    /// Stones of the given color that have been captured and removed.
    #[must_use]
    pub fn captured(&self, stone: Stone) -> usize {
        self.captured[stone]
    }

    #[must_use]
    pub fn last_move_passed(&self) -> bool {
        self.last_move_passed
    }

    #[must_use]
    pub fn ko(&self) -> KoLock {
        self.ko
    }

    /// Places a stone, resolving captures.
    ///
    /// Opponent groups left without liberties are removed. The placement is rejected,
    /// leaving the state unchanged, when the cell is off the board or occupied, when it
    /// would retake the locked ko stone, or when the placed stone would end up without
    /// liberties and captures nothing.
    ///
    /// This does not finish the turn; see [`Self::apply`].
    pub fn place(&mut self, coord: Coord, stone: Stone) -> Result<Placement, IllegalMove> {
        match self.board.get(coord) {
            None => return Err(IllegalMove::OutOfBounds { coord }),
            Some(cell) if !cell.is_empty() => return Err(IllegalMove::Occupied { coord }),
            Some(_) => {}
        }

        let opponent = stone.opponent();
        self.board.set(coord, stone.into());

        let mut doomed: Vec<Coord> = vec![];
        for neighbor in coord.neighbors(self.dimension()) {
            if doomed.contains(&neighbor) {
                continue;
            }
            if let Some(group) = self.board.group_at(neighbor) {
                if group.stone() == opponent && !group.has_liberties() {
                    doomed.extend_from_slice(group.stones());
                }
            }
        }

        if doomed.len() == 1 && self.ko.point == Some(doomed[0]) {
            self.board.set(coord, Cell::Empty);
            return Err(IllegalMove::Ko { coord });
        }

        if doomed.is_empty() {
            let has_liberties = self
                .board
                .group_at(coord)
                .is_some_and(|group| group.has_liberties());
            if !has_liberties {
                self.board.set(coord, Cell::Empty);
                return Err(IllegalMove::Suicide { coord });
            }
        }

        for captured in &doomed {
            self.board.set(*captured, Cell::Empty);
        }
        self.stones[stone] += 1;
        self.stones[opponent] -= doomed.len();
        self.captured[opponent] += doomed.len();
        if doomed.len() == 1 {
            self.ko = KoLock {
                point: Some(coord),
                pending: true,
            };
        }
        self.last_move_passed = false;

        Ok(Placement {
            captured: doomed.len(),
        })
    }

    /// Records a pass.
    ///
    /// This does not finish the turn; see [`Self::apply`].
    pub fn pass(&mut self) {
        self.last_move_passed = true;
    }

    /// Finishes the current turn.
    ///
    /// Clears the ko lock unless it was armed during this turn, then advances the
    /// move counter.
    pub fn end_turn(&mut self) {
        if !self.ko.pending {
            self.ko.point = None;
        }
        self.ko.pending = false;
        self.move_count += 1;
    }

    /// Plays a full turn: the action followed by [`Self::end_turn`].
    ///
    /// Rejected placements leave the state (including the move counter) unchanged.
    pub fn apply(&mut self, turn: Turn) -> Result<Option<Placement>, IllegalMove> {
        let placement = match turn.action {
            Action::Pass => {
                self.pass();
                None
            }
            Action::Place(coord) => Some(self.place(coord, turn.stone)?),
        };
        self.end_turn();
        Ok(placement)
    }

    /// Area score from white's point of view.
    ///
    /// Stones on the board count for their owner, captured stones count against the
    /// color that lost them, and every empty region bordered by a single color counts
    /// for that color. Positive values favor white; [`KOMI`] is subtracted from the
    /// total.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(&self) -> f32 {
        let material = self.stones.white as f32 - self.captured.white as f32
            - self.stones.black as f32
            + self.captured.black as f32;

        let territory: f32 = self
            .board
            .empty_regions()
            .iter()
            .map(|region| match region.owner() {
                Some(Stone::White) => region.len() as f32,
                Some(Stone::Black) => -(region.len() as f32),
                None => 0.0,
            })
            .sum();

        material + territory - KOMI
    }

    /// Winner of a game with the given final score.
    ///
    /// White takes the game unless black is ahead by more than the tie breaker.
    #[must_use]
    pub fn winner(score: f32) -> Stone {
        if score >= -KOMI {
            Stone::White
        } else {
            Stone::Black
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(state: &mut GameState, stone: Stone, x: usize, y: usize) -> Result<(), IllegalMove> {
        state
            .apply(Turn::new(stone, Action::Place(Coord::new(x, y))))
            .map(|_| ())
    }

    fn pass(state: &mut GameState, stone: Stone) {
        state.apply(Turn::new(stone, Action::Pass)).unwrap();
    }

    fn state(rows: &[&str]) -> GameState {
        GameState::from_board(Board::from_rows(rows).unwrap())
    }

    #[test]
    fn test_legal_placement_adds_one_stone() {
        let mut state = GameState::new(5);
        for (i, (x, y)) in [(0, 0), (4, 4), (2, 2), (1, 3)].into_iter().enumerate() {
            let stone = if i % 2 == 0 { Stone::Black } else { Stone::White };
            let before = state.stones(stone);
            play(&mut state, stone, x, y).unwrap();
            assert_eq!(state.stones(stone), before + 1);
        }
        assert_eq!(state.move_count(), 4);
    }

    #[test]
    fn test_out_of_bounds_and_occupied() {
        let mut state = GameState::new(5);
        play(&mut state, Stone::Black, 1, 1).unwrap();
        let before = state.clone();

        assert_eq!(
            play(&mut state, Stone::White, 5, 0),
            Err(IllegalMove::OutOfBounds {
                coord: Coord::new(5, 0)
            })
        );
        assert_eq!(
            play(&mut state, Stone::White, 1, 1),
            Err(IllegalMove::Occupied {
                coord: Coord::new(1, 1)
            })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_single_stone_capture() {
        let mut state = GameState::new(5);
        play(&mut state, Stone::White, 2, 2).unwrap();
        play(&mut state, Stone::Black, 1, 2).unwrap();
        play(&mut state, Stone::Black, 3, 2).unwrap();
        play(&mut state, Stone::Black, 2, 1).unwrap();
        assert_eq!(state.captured(Stone::White), 0);

        play(&mut state, Stone::Black, 2, 3).unwrap();
        assert_eq!(state.board().get(Coord::new(2, 2)), Some(Cell::Empty));
        assert_eq!(state.captured(Stone::White), 1);
        assert_eq!(state.stones(Stone::White), 0);
        assert_eq!(state.stones(Stone::Black), 4);
    }

    #[test]
    fn test_capture_multiple_groups() {
        let mut state = state(&[
            "OXO..", //
            "X.XO.", //
            "OXO..", //
            ".O...", //
            ".....", //
        ]);
        let placement = state.place(Coord::new(1, 1), Stone::White).unwrap();
        assert_eq!(placement.captured(), 4);
        assert_eq!(state.captured(Stone::Black), 4);
        assert_eq!(state.stones(Stone::Black), 0);
        assert_eq!(state.stones(Stone::White), 7);
        assert_eq!(state.ko().point(), None);
    }

    #[test]
    fn test_suicide_rejected() {
        let mut state = state(&[
            ".X...", //
            "X....", //
            ".....", //
            ".....", //
            ".....", //
        ]);
        let before = state.clone();
        assert_eq!(
            state.place(Coord::new(0, 0), Stone::White),
            Err(IllegalMove::Suicide {
                coord: Coord::new(0, 0)
            })
        );
        assert_eq!(state, before);

        // Filling an own eye is fine as long as the group keeps a liberty.
        assert!(state.place(Coord::new(0, 0), Stone::Black).is_ok());
    }

    #[test]
    fn test_capture_beats_suicide() {
        let mut state = state(&[
            ".OX..", //
            "OX...", //
            "X....", //
            ".....", //
            ".....", //
        ]);
        let placement = state.place(Coord::new(0, 0), Stone::Black).unwrap();
        assert_eq!(placement.captured(), 2);
        assert_eq!(state.board().get(Coord::new(1, 0)), Some(Cell::Empty));
        assert_eq!(state.board().get(Coord::new(0, 1)), Some(Cell::Empty));
    }

    fn ko_position() -> GameState {
        // Black at (2, 1) captures the white stone at (1, 1); white could then
        // immediately retake at (1, 1).
        state(&[
            ".XO..", //
            "XO.O.", //
            ".XO..", //
            ".....", //
            ".....", //
        ])
    }

    #[test]
    fn test_ko_immediate_recapture_rejected() {
        let mut state = ko_position();
        play(&mut state, Stone::Black, 2, 1).unwrap();
        assert_eq!(state.captured(Stone::White), 1);
        assert_eq!(state.ko().point(), Some(Coord::new(2, 1)));

        // White retaking at (1, 1) would capture exactly the stone on the ko point.
        let before = state.clone();
        assert_eq!(
            play(&mut state, Stone::White, 1, 1),
            Err(IllegalMove::Ko {
                coord: Coord::new(1, 1)
            })
        );
        assert_eq!(state, before);

        // White plays elsewhere; black answers elsewhere; the lock is gone.
        play(&mut state, Stone::White, 4, 4).unwrap();
        assert_eq!(state.ko().point(), None);
        play(&mut state, Stone::Black, 0, 4).unwrap();

        let placement = state.place(Coord::new(1, 1), Stone::White).unwrap();
        assert_eq!(placement.captured(), 1);
    }

    #[test]
    fn test_ko_released_after_one_turn() {
        let mut state = ko_position();
        play(&mut state, Stone::Black, 2, 1).unwrap();
        pass(&mut state, Stone::White);
        assert_eq!(state.ko().point(), None);
        // White's turn comes back after black passes; the retake is legal now.
        pass(&mut state, Stone::Black);
        assert!(play(&mut state, Stone::White, 1, 1).is_ok());
    }

    #[test]
    fn test_score_empty_board() {
        let state = GameState::new(5);
        assert_eq!(state.score(), -0.5);
        assert_eq!(GameState::winner(state.score()), Stone::White);
    }

    #[test]
    fn test_score_counts_territory_and_captures() {
        let mut state = state(&[
            "..X..", //
            "..X..", //
            "XXX..", //
            "...OO", //
            "...O.", //
        ]);
        // black: 5 stones + 4 territory, white: 3 stones + 1 territory
        assert_eq!(state.score(), 3.0 + 1.0 - 5.0 - 4.0 - 0.5);
        assert_eq!(GameState::winner(state.score()), Stone::Black);

        state.captured[Stone::Black] = 2;
        state.captured[Stone::White] = 1;
        assert_eq!(state.score(), 3.0 + 1.0 - 5.0 - 4.0 - 0.5 + 2.0 - 1.0);
    }

    #[test]
    fn test_score_color_swap_symmetry() {
        let rows = [
            ".X.O.", //
            "XX.OO", //
            "..X.O", //
            "OO.X.", //
            ".O.XX", //
        ];
        let board = Board::from_rows(&rows).unwrap();
        let original = GameState::from_board(board.clone()).score();
        let swapped = GameState::from_board(board.swapped_colors()).score();
        assert_eq!(original + KOMI, -(swapped + KOMI));
    }

    #[test]
    fn test_even_position_scores_minus_komi() {
        let mut state = GameState::new(3);
        play(&mut state, Stone::Black, 0, 0).unwrap();
        play(&mut state, Stone::White, 2, 2).unwrap();
        // Symmetric position: only the tie breaker remains.
        assert_eq!(state.score(), -KOMI);
        assert_eq!(GameState::winner(state.score()), Stone::White);
    }
}
