use gogo_engine::{GameState, MoveRequest, Player, Stone};

use crate::{Agent, MoveRanking, NetworkError, encoding};

/// [`Player`] backed by an [`Agent`]'s network.
///
/// The network runs once per turn. The resulting ranking is kept until the move
/// counter changes, so every retry during the same turn gets the next-ranked cell.
#[derive(Debug)]
pub struct AgentPlayer<'a> {
    agent: &'a Agent,
    dimension: usize,
    ranking: Option<(usize, MoveRanking)>,
}

impl<'a> AgentPlayer<'a> {
    /// Wraps `agent` for games on a `dimension`×`dimension` board.
    ///
    /// Fails if the network's input or output width does not fit the board.
    pub fn new(agent: &'a Agent, dimension: usize) -> Result<Self, NetworkError> {
        let network = agent.network();
        network.validate()?;

        let structure = network.structure();
        let inputs = encoding::input_width(dimension);
        if structure.inputs != inputs {
            return Err(NetworkError::InputWidth {
                expected: inputs,
                found: structure.inputs,
            });
        }
        let outputs = encoding::output_width(dimension);
        if structure.outputs != outputs {
            return Err(NetworkError::OutputWidth {
                expected: outputs,
                found: structure.outputs,
            });
        }

        Ok(Self {
            agent,
            dimension,
            ranking: None,
        })
    }

    fn rank(&self, state: &GameState, stone: Stone) -> Result<MoveRanking, NetworkError> {
        let input = encoding::encode(state, stone);
        let output = self.agent.network().predict(&input)?;
        MoveRanking::interpret(&output, self.dimension)
    }
}

impl Player for AgentPlayer<'_> {
    fn request_move(&mut self, state: &GameState, stone: Stone) -> MoveRequest {
        let move_count = state.move_count();
        if self
            .ranking
            .as_ref()
            .is_none_or(|(turn, _)| *turn != move_count)
        {
            let Ok(ranking) = self.rank(state, stone) else {
                return MoveRequest::Undecided;
            };
            self.ranking = Some((move_count, ranking));
        }
        match &mut self.ranking {
            Some((_, ranking)) => ranking.next_request(),
            None => MoveRequest::Undecided,
        }
    }
}

#[cfg(test)]
mod tests {
    use gogo_engine::{Coord, Game, ScriptedPlayer};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::{Activation, AgentParams, Network, Structure};

    use super::*;

    fn agent(dimension: usize, seed: u64) -> Agent {
        let params = AgentParams {
            activation: Activation::Sigmoid,
            hidden_layers: vec![6],
            mutation_rate: 0.9,
            stabilization_rate: 0.1,
        };
        Agent::random(dimension, &params, &mut Pcg32::seed_from_u64(seed))
    }

    /// Agent whose output prefers cells in scan order and never passes.
    #[expect(clippy::cast_precision_loss)]
    fn scan_order_agent(dimension: usize) -> Agent {
        let cells = dimension * dimension;
        let structure = Structure::new(encoding::input_width(dimension), vec![], cells + 1);
        let weights = vec![0.0; structure.inputs * structure.outputs];
        let biases = (0..cells).map(|i| -(i as f32)).chain([-100.0]);
        let parameters: Vec<f32> = weights.into_iter().chain(biases).collect();
        let network =
            Network::from_parameters(structure, Activation::Identity, &parameters).unwrap();
        Agent::new(network, 1.0, 0.0)
    }

    #[test]
    fn test_rejects_wrong_board() {
        let agent = agent(3, 1);
        assert!(AgentPlayer::new(&agent, 3).is_ok());
        assert_eq!(
            AgentPlayer::new(&agent, 4).unwrap_err(),
            NetworkError::InputWidth {
                expected: encoding::input_width(4),
                found: encoding::input_width(3),
            }
        );
    }

    #[test]
    fn test_retry_falls_back_to_next_candidate() {
        let agent = scan_order_agent(3);
        let mut player = AgentPlayer::new(&agent, 3).unwrap();
        let state = GameState::new(3);

        assert_eq!(
            player.request_move(&state, Stone::Black),
            MoveRequest::Place(Coord::new(0, 0))
        );
        assert_eq!(
            player.request_move(&state, Stone::Black),
            MoveRequest::Place(Coord::new(1, 0))
        );
    }

    #[test]
    fn test_ranking_recomputed_on_new_turn() {
        let agent = scan_order_agent(3);
        let black = AgentPlayer::new(&agent, 3).unwrap();
        let white = ScriptedPlayer::new([MoveRequest::Place(Coord::new(1, 0))]);
        let mut game = Game::new(3, Box::new(black), Box::new(white));

        game.step(); // black (0, 0)
        game.step(); // white (1, 0)
        // fresh ranking: (0, 0) and (1, 0) are taken, (2, 0) is next
        game.step();
        game.step();
        assert_eq!(game.state().board().get(Coord::new(2, 0)), Some(gogo_engine::Cell::Empty));
        game.step();
        assert_eq!(
            game.state().board().get(Coord::new(2, 0)),
            Some(gogo_engine::Cell::Black)
        );
    }

    #[test]
    fn test_agents_finish_games() {
        let black = agent(3, 2);
        let white = agent(3, 3);
        let mut game = Game::new(
            3,
            Box::new(AgentPlayer::new(&black, 3).unwrap()),
            Box::new(AgentPlayer::new(&white, 3).unwrap()),
        )
        .with_max_moves(Some(200));
        let outcome = game.play_to_end();
        assert!(outcome.moves() <= 200);
    }
}
