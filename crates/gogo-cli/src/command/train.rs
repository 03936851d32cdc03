use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use gogo_training::{
    Trainer, TrainingConfig,
    snapshot::{self, GameSnapshot, PopulationSnapshot, SnapshotError, SnapshotSink},
};

use crate::util::{read_json_file, read_population_file};

const POPULATION_FILE: &str = "population.json";
const GAMES_DIR: &str = "games";

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration (JSON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Resume from a saved population snapshot
    #[arg(long)]
    population: Option<PathBuf>,
    /// Override the random seed of the configuration
    #[arg(long)]
    seed: Option<u64>,
    /// Override the number of rounds of the configuration
    #[arg(long)]
    rounds: Option<usize>,
    /// Directory receiving population and game snapshots
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

/// Writes snapshots below one output directory.
///
/// The population goes to `population.json`, games to `games/<name>.json`.
#[derive(Debug)]
struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    fn create(root: &Path) -> anyhow::Result<Self> {
        let games = root.join(GAMES_DIR);
        fs::create_dir_all(&games)
            .with_context(|| format!("Failed to create output directory: {}", games.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn population_path(&self) -> PathBuf {
        self.root.join(POPULATION_FILE)
    }

    fn game_path(&self, name: &str) -> PathBuf {
        self.root.join(GAMES_DIR).join(format!("{name}.json"))
    }
}

impl SnapshotSink for DirectorySink {
    fn save_population(&mut self, snapshot: &PopulationSnapshot) -> Result<(), SnapshotError> {
        let bytes = snapshot::to_bytes(snapshot)?;
        let target = self.population_path();
        let partial = target.with_extension("json.partial");
        fs::write(&partial, bytes)?;
        fs::rename(&partial, &target)?;
        Ok(())
    }

    fn save_game(&mut self, snapshot: &GameSnapshot) -> Result<(), SnapshotError> {
        let bytes = snapshot::to_bytes(snapshot)?;
        fs::write(self.game_path(&snapshot.name), bytes)?;
        Ok(())
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        population,
        seed,
        rounds,
        output,
    } = arg;

    let mut config = match config {
        Some(path) => read_json_file::<TrainingConfig, _>("training config", path)?,
        None => TrainingConfig::default(),
    };
    if let Some(seed) = seed {
        config.random_seed = *seed;
    }
    if let Some(rounds) = rounds {
        config.rounds = *rounds;
    }

    let sink = DirectorySink::create(output)?;
    let mut trainer = Trainer::new(config, sink).context("Failed to set up training")?;
    let mut population = match population {
        Some(path) => {
            let snapshot = read_population_file(path)?;
            tracing::info!(
                path = %path.display(),
                age = snapshot.population.age(),
                saved_at = %snapshot.saved_at,
                "resuming population"
            );
            snapshot.population
        }
        None => trainer.initial_population(),
    };

    let summary = trainer
        .run(&mut population)
        .context("Training aborted")?;

    eprintln!("Trained {} rounds, population age {}", summary.rounds, summary.final_age);
    if let Some(report) = &summary.last_report {
        eprintln!(
            "  Fitness: min {:.3}, max {:.3}, mean {:.3}, std dev {:.3}",
            report.fitness.min, report.fitness.max, report.fitness.mean, report.fitness.std_dev
        );
    }
    eprintln!(
        "  Saved {} populations and {} games to {} ({} failed)",
        summary.populations_saved,
        summary.games_saved,
        output.display(),
        summary.snapshot_failures
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use gogo_agent::{Activation, AgentParams};
    use gogo_engine::{Coord, Game, MoveRequest, ScriptedPlayer};
    use gogo_training::Population;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("gogo-{label}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn test_directory_sink_layout() {
        let root = scratch_dir("sink");
        let mut sink = DirectorySink::create(&root).unwrap();

        let params = AgentParams {
            activation: Activation::Sigmoid,
            hidden_layers: vec![4],
            mutation_rate: 0.9,
            stabilization_rate: 0.0,
        };
        let population = Population::random(3, 2, &params, &mut Pcg32::seed_from_u64(3));
        sink.save_population(&PopulationSnapshot::now(population.clone()))
            .unwrap();

        let black = ScriptedPlayer::new([MoveRequest::Place(Coord::new(0, 0))]);
        let mut game = Game::new(3, Box::new(black), Box::new(ScriptedPlayer::new([])));
        game.play_to_end();
        sink.save_game(&GameSnapshot::now("group_0_0_1_0".to_owned(), game.into_record()))
            .unwrap();

        let restored = read_population_file(root.join(POPULATION_FILE)).unwrap();
        assert_eq!(restored.population, population);
        assert!(!root.join("population.json.partial").exists());
        let game = crate::util::read_game_file(root.join("games/group_0_0_1_0.json")).unwrap();
        assert_eq!(game.record.turns().len(), 3);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let mut sink = DirectorySink {
            root: scratch_dir("missing"),
        };
        let params = AgentParams {
            activation: Activation::Sigmoid,
            hidden_layers: vec![],
            mutation_rate: 0.9,
            stabilization_rate: 0.0,
        };
        let population = Population::random(3, 1, &params, &mut Pcg32::seed_from_u64(0));
        assert!(matches!(
            sink.save_population(&PopulationSnapshot::now(population)),
            Err(SnapshotError::Io(_))
        ));
    }
}
