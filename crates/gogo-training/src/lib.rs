//! Neuro-evolution of Go agents through self-play.
//!
//! The trainer repeatedly lets the agents of a [`Population`] play each other with
//! the rules engine, scores them by the results and breeds the next generation from
//! the best of every group.
//!
//! # How Training Works
//!
//! 1. **Population** - [`Population::random`] creates agents with random networks
//! 2. **Matches** - every group plays a round robin where each ordered pair meets
//!    once ([`matches::play_match`])
//! 3. **Fitness** - each match adds `score / moves` to white and subtracts it from
//!    black
//! 4. **Selection** - the top `keep_best` entities of every group are kept as
//!    breeding stock
//! 5. **Regeneration** - offspring (or uniform crossovers, see [`Recombination`])
//!    refill the population and its age advances
//! 6. **Snapshots** - the [`Trainer`] periodically hands the population and each
//!    group's closest game to a [`SnapshotSink`](snapshot::SnapshotSink)
//!
//! # Architecture
//!
//! ```text
//! Trainer (rounds, snapshots, seeded Pcg32)
//!     ↓ drives
//! Population (partition, selection, regeneration)
//!     ↓ runs groups on scoped threads
//! play_match
//!     ↓ turn protocol
//! gogo_engine::Game ← gogo_agent::AgentPlayer
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use gogo_training::{Trainer, TrainingConfig};
//!
//! let mut trainer = Trainer::new(TrainingConfig::default(), sink)?;
//! let mut population = trainer.initial_population();
//! let summary = trainer.run(&mut population)?;
//! println!("trained up to age {}", summary.final_age);
//! ```

use gogo_agent::NetworkError;

pub use self::{config::*, population::*, stats::*, trainer::*};

mod config;
pub mod matches;
mod population;
pub mod snapshot;
mod stats;
mod trainer;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid training configuration: {_0}")]
    Config(ConfigError),
    #[display("network does not fit the board: {_0}")]
    Network(NetworkError),
    #[display("{population} entities cannot fill {groups} non-empty groups")]
    #[from(ignore)]
    EmptyGroup { population: usize, groups: usize },
    #[display("keep_best {keep_best} exceeds the group size {group_size}")]
    #[from(ignore)]
    KeepBest { keep_best: usize, group_size: usize },
    #[display("population plays on a {found}x{found} board but the configuration uses {expected}x{expected}")]
    #[from(ignore)]
    DimensionMismatch { expected: usize, found: usize },
}
