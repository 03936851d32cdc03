use gogo_engine::{Coord, MoveRequest};

use crate::{NetworkError, encoding};

/// Pass signal threshold on the last network output.
pub const PASS_THRESHOLD: f32 = 0.5;

/// Network output turned into an ordered list of move candidates.
///
/// The first `D²` outputs score the cells in scan order; the last one is the pass
/// signal. Candidates are handed out best first, one per call to
/// [`next_request`](Self::next_request), so a rejected placement falls back to the
/// next-ranked cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRanking {
    pass: bool,
    candidates: Vec<Coord>,
    cursor: usize,
}

impl MoveRanking {
    pub fn interpret(output: &[f32], dimension: usize) -> Result<Self, NetworkError> {
        let expected = encoding::output_width(dimension);
        if output.len() != expected {
            return Err(NetworkError::OutputWidth {
                expected,
                found: output.len(),
            });
        }

        let cells = dimension * dimension;
        let pass = output[cells] >= PASS_THRESHOLD;
        let mut order: Vec<usize> = (0..cells).collect();
        // stable: equal scores keep scan order
        order.sort_by(|&a, &b| output[b].total_cmp(&output[a]));
        let candidates = order
            .into_iter()
            .map(|index| Coord::from_index(index, dimension))
            .collect();

        Ok(Self {
            pass,
            candidates,
            cursor: 0,
        })
    }

    #[must_use]
    pub fn wants_pass(&self) -> bool {
        self.pass
    }

    /// Cells ordered from most to least preferred.
    #[must_use]
    pub fn candidates(&self) -> &[Coord] {
        &self.candidates
    }

    /// Next request to try this turn.
    ///
    /// Returns [`MoveRequest::Undecided`] once every candidate has been offered.
    pub fn next_request(&mut self) -> MoveRequest {
        if self.pass {
            return MoveRequest::Pass;
        }
        match self.candidates.get(self.cursor) {
            Some(&coord) => {
                self.cursor += 1;
                MoveRequest::Place(coord)
            }
            None => MoveRequest::Undecided,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_is_descending_and_stable() {
        let output = [0.2, 0.9, 0.2, 0.5, 0.1];
        let mut ranking = MoveRanking::interpret(&output, 2).unwrap();
        assert!(!ranking.wants_pass());
        assert_eq!(
            ranking.candidates(),
            &[
                Coord::new(1, 0),
                Coord::new(1, 1),
                Coord::new(0, 0),
                Coord::new(0, 1)
            ]
        );

        for &coord in &ranking.candidates().to_vec() {
            assert_eq!(ranking.next_request(), MoveRequest::Place(coord));
        }
        assert_eq!(ranking.next_request(), MoveRequest::Undecided);
    }

    #[test]
    fn test_pass_threshold() {
        let mut ranking = MoveRanking::interpret(&[0.0, 0.0, 0.0, 0.0, 0.5], 2).unwrap();
        assert!(ranking.wants_pass());
        assert_eq!(ranking.next_request(), MoveRequest::Pass);

        let ranking = MoveRanking::interpret(&[0.0, 0.0, 0.0, 0.0, 0.49], 2).unwrap();
        assert!(!ranking.wants_pass());
    }

    #[test]
    fn test_output_width_mismatch() {
        assert_eq!(
            MoveRanking::interpret(&[0.0; 4], 2),
            Err(NetworkError::OutputWidth {
                expected: 5,
                found: 4
            })
        );
    }
}
