//! Persistence of training progress.
//!
//! Snapshots are plain JSON. The trainer never touches the file system itself; it
//! hands snapshots to a [`SnapshotSink`] and treats failures as recoverable.

use std::io;

use chrono::{DateTime, Utc};
use gogo_engine::GameRecord;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::Population;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub saved_at: DateTime<Utc>,
    pub population: Population,
}

impl PopulationSnapshot {
    #[must_use]
    pub fn now(population: Population) -> Self {
        Self {
            saved_at: Utc::now(),
            population,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub saved_at: DateTime<Utc>,
    pub name: String,
    pub record: GameRecord,
}

impl GameSnapshot {
    #[must_use]
    pub fn now(name: String, record: GameRecord) -> Self {
        Self {
            saved_at: Utc::now(),
            name,
            record,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SnapshotError {
    #[display("snapshot encoding failed: {_0}")]
    Json(serde_json::Error),
    #[display("snapshot I/O failed: {_0}")]
    Io(io::Error),
}

/// Destination of the snapshots taken during training.
pub trait SnapshotSink {
    fn save_population(&mut self, snapshot: &PopulationSnapshot) -> Result<(), SnapshotError>;

    fn save_game(&mut self, snapshot: &GameSnapshot) -> Result<(), SnapshotError>;
}

pub fn to_bytes<T>(value: &T) -> Result<Vec<u8>, SnapshotError>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_vec(value)?)
}

pub fn from_bytes<T>(bytes: &[u8]) -> Result<T, SnapshotError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use gogo_agent::{Activation, AgentParams};
    use gogo_engine::{Coord, Game, MoveRequest, ScriptedPlayer};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_population_snapshot_round_trip() {
        let params = AgentParams {
            activation: Activation::Tanh,
            hidden_layers: vec![4],
            mutation_rate: 0.9,
            stabilization_rate: 0.1,
        };
        let population = Population::random(3, 3, &params, &mut Pcg32::seed_from_u64(1));
        let snapshot = PopulationSnapshot::now(population);

        let bytes = to_bytes(&snapshot).unwrap();
        let restored: PopulationSnapshot = from_bytes(&bytes).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_game_snapshot_replays() {
        let black = ScriptedPlayer::new([MoveRequest::Place(Coord::new(1, 1))]);
        let mut game = Game::new(3, Box::new(black), Box::new(ScriptedPlayer::new([])));
        game.play_to_end();
        let snapshot = GameSnapshot::now("group_0_0_0_1".to_owned(), game.into_record());

        let restored: GameSnapshot = from_bytes(&to_bytes(&snapshot).unwrap()).unwrap();
        assert_eq!(restored.name, "group_0_0_0_1");
        assert_eq!(restored.record.replay().unwrap().score(), snapshot.record.score());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            from_bytes::<PopulationSnapshot>(b"{ not json"),
            Err(SnapshotError::Json(_))
        ));
    }
}
