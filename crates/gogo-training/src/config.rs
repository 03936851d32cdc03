use gogo_agent::{Activation, AgentParams};
use serde::{Deserialize, Serialize};

/// How a child is produced from the pair of parents picked during regeneration.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Recombination {
    /// Mutated copy of the first parent; the second parent is ignored.
    #[default]
    Asexual,
    /// Uniform crossover of both parents, then mutation.
    Uniform,
}

/// Everything a training run needs; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Board dimension used for every match.
    pub dimension: usize,
    pub random_seed: u64,
    pub activation: Activation,
    pub hidden_layers: Vec<usize>,
    pub population_size: usize,
    /// Probability that a network parameter survives mutation.
    pub mutation_rate: f32,
    /// Per-generation decay of the mutation rate.
    pub stabilization_rate: f32,
    pub recombination: Recombination,
    pub rounds: usize,
    pub groups: usize,
    /// Entities of each group kept as breeding stock.
    pub keep_best: usize,
    /// Save the population every this many rounds.
    pub save_interval: usize,
    /// Save each group's closest game every this many rounds.
    pub save_game_interval: usize,
    /// Finish matches after this many accepted turns.
    pub max_moves: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dimension: 5,
            random_seed: 0,
            activation: Activation::Sigmoid,
            hidden_layers: vec![64, 32],
            population_size: 40,
            mutation_rate: 0.9,
            stabilization_rate: 0.01,
            recombination: Recombination::Asexual,
            rounds: 100,
            groups: 4,
            keep_best: 3,
            save_interval: 10,
            save_game_interval: 10,
            max_moves: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board dimension must be at least 1")]
    ZeroDimension,
    #[display("hidden layer {index} has no neurons")]
    EmptyHiddenLayer { index: usize },
    #[display("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },
    #[display("at least one group is required")]
    ZeroGroups,
    #[display(
        "population of {population_size} split into {groups} groups leaves fewer than 2 entities per group"
    )]
    GroupTooSmall {
        population_size: usize,
        groups: usize,
    },
    #[display("keep_best must be between 1 and the group size {group_size}, got {keep_best}")]
    KeepBestOutOfRange { keep_best: usize, group_size: usize },
    #[display("{name} must be at least 1")]
    ZeroInterval { name: &'static str },
}

impl TrainingConfig {
    /// Number of entities in each group.
    #[must_use]
    pub fn group_size(&self) -> usize {
        self.population_size.checked_div(self.groups).unwrap_or(0)
    }

    #[must_use]
    pub fn agent_params(&self) -> AgentParams {
        AgentParams {
            activation: self.activation,
            hidden_layers: self.hidden_layers.clone(),
            mutation_rate: self.mutation_rate,
            stabilization_rate: self.stabilization_rate,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if let Some(index) = self.hidden_layers.iter().position(|&width| width == 0) {
            return Err(ConfigError::EmptyHiddenLayer { index });
        }
        for (name, value) in [
            ("mutation_rate", self.mutation_rate),
            ("stabilization_rate", self.stabilization_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        if self.groups == 0 {
            return Err(ConfigError::ZeroGroups);
        }
        let group_size = self.group_size();
        if group_size < 2 {
            return Err(ConfigError::GroupTooSmall {
                population_size: self.population_size,
                groups: self.groups,
            });
        }
        if self.keep_best == 0 || self.keep_best > group_size {
            return Err(ConfigError::KeepBestOutOfRange {
                keep_best: self.keep_best,
                group_size,
            });
        }
        for (name, value) in [
            ("save_interval", self.save_interval),
            ("save_game_interval", self.save_game_interval),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
        }
        Ok(())
    }
}
