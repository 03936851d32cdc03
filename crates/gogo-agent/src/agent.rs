use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Activation, Network, NetworkError, Structure, encoding};

/// Parameters shared by every agent of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    pub activation: Activation,
    pub hidden_layers: Vec<usize>,
    pub mutation_rate: f32,
    pub stabilization_rate: f32,
}

/// A network together with the rates controlling how its offspring mutate.
///
/// `mutation_rate` is the probability that a parameter survives mutation. Each
/// generation scales the child's rate by `1 - stabilization_rate`, so lineages
/// mutate more aggressively the older they get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    network: Network,
    mutation_rate: f32,
    stabilization_rate: f32,
}

impl Agent {
    #[must_use]
    pub fn new(network: Network, mutation_rate: f32, stabilization_rate: f32) -> Self {
        Self {
            network,
            mutation_rate,
            stabilization_rate,
        }
    }

    /// Creates an agent with a random network sized for a `dimension`×`dimension`
    /// board.
    ///
    /// The network reads [`encoding::input_width`] inputs and produces one output
    /// per board cell plus the pass output.
    ///
    /// # Arguments
    ///
    /// * `dimension` - Board dimension the agent will play on
    /// * `params` - Hidden layer widths, output activation and mutation rates
    /// * `rng` - Source of the initial network parameters
    pub fn random<R>(dimension: usize, params: &AgentParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let structure = Structure::new(
            encoding::input_width(dimension),
            params.hidden_layers.clone(),
            encoding::output_width(dimension),
        );
        Self::new(
            Network::random(structure, params.activation, rng),
            params.mutation_rate,
            params.stabilization_rate,
        )
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn mutation_rate(&self) -> f32 {
        self.mutation_rate
    }

    #[must_use]
    pub fn stabilization_rate(&self) -> f32 {
        self.stabilization_rate
    }

    fn child(&self, network: &Network, rng: &mut (impl Rng + ?Sized)) -> Self {
        Self {
            network: network.mutate(self.mutation_rate, rng),
            mutation_rate: self.mutation_rate * (1.0 - self.stabilization_rate),
            stabilization_rate: self.stabilization_rate,
        }
    }

    /// Mutated copy of this agent.
    ///
    /// The network is mutated with this agent's rate; the child inherits the decayed
    /// rate `mutation_rate * (1 - stabilization_rate)`.
    ///
    /// # Arguments
    ///
    /// * `rng` - Source of the replacement parameters
    #[must_use]
    pub fn offspring<R>(&self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        self.child(&self.network, rng)
    }

    /// Child mixing the networks of `self` and `other`, then mutated like
    /// [`offspring`](Self::offspring).
    ///
    /// Each parameter is taken from either parent with equal probability. The child
    /// inherits the rates of `self`.
    ///
    /// # Arguments
    ///
    /// * `other` - Second parent; its network must have the same structure
    /// * `rng` - Source of the parent choices and replacement parameters
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::StructureMismatch`] when the networks differ in shape.
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let mixed = self.network.crossover(&other.network, rng)?;
        Ok(self.child(&mixed, rng))
    }
}
