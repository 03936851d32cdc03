//! Neural-network move policies for the Go engine.
//!
//! An [`Agent`] wraps a small feed-forward [`Network`] that reads an encoding of the
//! board and scores every cell plus a pass signal. [`AgentPlayer`] plugs an agent into
//! the engine's turn protocol through the [`Player`](gogo_engine::Player) trait.
//!
//! # Decision Pipeline
//!
//! ```text
//! GameState
//!     ↓ encoding::encode (per-cell indicators + STATE_FEATURES)
//! input row (3·D² + 5)
//!     ↓ Network::predict (ReLU hidden layers, configured output activation)
//! output row (D² + 1)
//!     ↓ MoveRanking::interpret (pass threshold, stable descending sort)
//! MoveRequest, with fallback to the next-ranked cell on every retry
//! ```
//!
//! # Evolution Operators
//!
//! Agents never change once created. [`Agent::offspring`] mutates a copy of the
//! parent's network, and [`Agent::crossover`] first mixes two parents' parameters
//! uniformly. Both decay the child's mutation rate by the stabilization rate.

pub use self::{activation::*, agent::*, network::*, player::*, ranking::*};

mod activation;
mod agent;
pub mod encoding;
mod network;
mod player;
mod ranking;

/// Structural mismatch between a network and the data it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("network expects {expected} inputs but got {found}")]
    InputWidth { expected: usize, found: usize },
    #[display("network produces {found} outputs but {expected} are needed")]
    OutputWidth { expected: usize, found: usize },
    #[display("network has {found} layers but its structure declares {expected}")]
    LayerCount { expected: usize, found: usize },
    #[display("layer {index} does not match the network structure")]
    MalformedLayer { index: usize },
    #[display("expected {expected} parameters but got {found}")]
    ParameterCount { expected: usize, found: usize },
    #[display("networks have different structures")]
    StructureMismatch,
}
