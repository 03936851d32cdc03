use std::time::Instant;

use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{
    Population, RoundReport, RoundSettings, TrainingConfig, TrainingError,
    snapshot::{GameSnapshot, PopulationSnapshot, SnapshotError, SnapshotSink},
};

/// Consecutive snapshot failures after which they are reported as errors.
const FAILURE_ALERT_THRESHOLD: usize = 3;

/// Totals of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub rounds: usize,
    pub final_age: usize,
    pub populations_saved: usize,
    pub games_saved: usize,
    pub snapshot_failures: usize,
    pub last_report: Option<RoundReport>,
}

/// Drives the evolution loop and snapshotting.
///
/// All randomness comes from one [`Pcg32`] seeded with
/// [`TrainingConfig::random_seed`], so a run is reproducible from its configuration.
#[derive(Debug)]
pub struct Trainer<S> {
    config: TrainingConfig,
    rng: Pcg32,
    sink: S,
    populations_saved: usize,
    games_saved: usize,
    failures: usize,
    consecutive_failures: usize,
}

impl<S> Trainer<S>
where
    S: SnapshotSink,
{
    /// Validates `config` and seeds the generator from its `random_seed`.
    ///
    /// # Arguments
    ///
    /// * `config` - Training configuration
    /// * `sink` - Receives population and game snapshots
    pub fn new(config: TrainingConfig, sink: S) -> Result<Self, TrainingError> {
        config.validate()?;
        let rng = Pcg32::seed_from_u64(config.random_seed);
        Ok(Self {
            config,
            rng,
            sink,
            populations_saved: 0,
            games_saved: 0,
            failures: 0,
            consecutive_failures: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Creates a fresh random population from the configuration.
    pub fn initial_population(&mut self) -> Population {
        Population::random(
            self.config.dimension,
            self.config.population_size,
            &self.config.agent_params(),
            &mut self.rng,
        )
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs the configured number of rounds on `population`.
    ///
    /// The population is saved every `save_interval` rounds and once more at the end
    /// unless the last round already saved it. Each group's closest game is saved
    /// every `save_game_interval` rounds. Failed saves are logged and counted in the
    /// returned summary.
    ///
    /// # Arguments
    ///
    /// * `population` - Population to evolve in place; a fresh one from
    ///   [`initial_population`](Self::initial_population) or a resumed snapshot
    ///
    /// # Errors
    ///
    /// Fails when the population was trained on another board dimension or a round
    /// cannot be played.
    pub fn run(&mut self, population: &mut Population) -> Result<TrainingSummary, TrainingError> {
        if population.dimension() != self.config.dimension {
            return Err(TrainingError::DimensionMismatch {
                expected: self.config.dimension,
                found: population.dimension(),
            });
        }

        let settings = RoundSettings {
            groups: self.config.groups,
            keep_best: self.config.keep_best,
            recombination: self.config.recombination,
            max_moves: self.config.max_moves,
        };
        let rounds = self.config.rounds;
        tracing::info!(
            rounds,
            population = population.len(),
            age = population.age(),
            dimension = population.dimension(),
            "starting training"
        );

        let mut last_report = None;
        let mut saved_last_round = false;
        for round in 0..rounds {
            let started = Instant::now();
            let report = population.play_round(&settings, &mut self.rng)?;
            tracing::info!(
                round,
                age = report.age,
                best = report.fitness.max,
                mean = report.fitness.mean,
                std_dev = report.fitness.std_dev,
                elapsed = ?started.elapsed(),
                "round finished"
            );

            if (round + 1) % self.config.save_game_interval == 0 {
                for group in &report.groups {
                    if let Some(showcase) = &group.showcase {
                        let snapshot =
                            GameSnapshot::now(showcase.name.clone(), showcase.record.clone());
                        let result = self.sink.save_game(&snapshot);
                        if self.track("game", result) {
                            self.games_saved += 1;
                        }
                    }
                }
            }

            saved_last_round = (round + 1) % self.config.save_interval == 0;
            if saved_last_round {
                self.save_population(population);
            }
            last_report = Some(report);
        }

        if !saved_last_round {
            self.save_population(population);
        }

        if self.failures > 0 {
            tracing::warn!(failures = self.failures, "some snapshots could not be saved");
        }
        Ok(TrainingSummary {
            rounds,
            final_age: population.age(),
            populations_saved: self.populations_saved,
            games_saved: self.games_saved,
            snapshot_failures: self.failures,
            last_report,
        })
    }

    fn save_population(&mut self, population: &Population) {
        let snapshot = PopulationSnapshot::now(population.clone());
        let result = self.sink.save_population(&snapshot);
        if self.track("population", result) {
            self.populations_saved += 1;
            tracing::info!(age = population.age(), "saved population");
        }
    }

    /// Records the outcome of a save; returns whether it succeeded.
    fn track(&mut self, kind: &str, result: Result<(), SnapshotError>) -> bool {
        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                true
            }
            Err(error) => {
                self.failures += 1;
                self.consecutive_failures += 1;
                if self.consecutive_failures >= FAILURE_ALERT_THRESHOLD {
                    tracing::error!(
                        kind,
                        consecutive = self.consecutive_failures,
                        %error,
                        "snapshots keep failing"
                    );
                } else {
                    tracing::warn!(kind, %error, "failed to save snapshot");
                }
                false
            }
        }
    }
}
