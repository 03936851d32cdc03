//! Fully connected feed-forward network.
//!
//! A [`Network`] holds one [`Layer`] per hidden width plus an output layer. Every
//! layer computes `input · W + b` with `W` stored row-major as `inputs × outputs`.
//! Hidden layers apply ReLU, the output layer applies the network's [`Activation`].
//!
//! Parameters are plain `f32`s initialized uniformly in `[-1, 1]`. Evolution never
//! modifies a network in place: [`Network::mutate`] and [`Network::crossover`]
//! return new instances.

use std::{iter, ops::RangeInclusive};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Activation, NetworkError};

const PARAM_RANGE: RangeInclusive<f32> = -1.0..=1.0;

/// Layer widths of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub inputs: usize,
    pub hidden: Vec<usize>,
    pub outputs: usize,
}

impl Structure {
    #[must_use]
    pub fn new(inputs: usize, hidden: Vec<usize>, outputs: usize) -> Self {
        Self {
            inputs,
            hidden,
            outputs,
        }
    }

    /// `(inputs, outputs)` of every layer, output layer last.
    fn layer_shapes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let widths = iter::once(self.inputs)
            .chain(self.hidden.iter().copied())
            .chain(iter::once(self.outputs));
        widths.clone().zip(widths.skip(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    fn random<R>(inputs: usize, outputs: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            inputs,
            outputs,
            weights: (0..inputs * outputs)
                .map(|_| rng.random_range(PARAM_RANGE))
                .collect(),
            biases: (0..outputs).map(|_| rng.random_range(PARAM_RANGE)).collect(),
        }
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Row-major `inputs × outputs` weight matrix.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    fn is_well_formed(&self) -> bool {
        self.weights.len() == self.inputs * self.outputs && self.biases.len() == self.outputs
    }

    fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        self.weights.iter().chain(&self.biases).copied()
    }

    /// Builds a layer of the same shape from a per-parameter function.
    fn map_parameters<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, f32) -> f32,
    {
        let weight_count = self.weights.len();
        Self {
            inputs: self.inputs,
            outputs: self.outputs,
            weights: self
                .weights
                .iter()
                .enumerate()
                .map(|(i, &w)| f(i, w))
                .collect(),
            biases: self
                .biases
                .iter()
                .enumerate()
                .map(|(i, &b)| f(weight_count + i, b))
                .collect(),
        }
    }

    fn forward(&self, input: &[f32], activation: impl Fn(f32) -> f32) -> Vec<f32> {
        let mut output = self.biases.clone();
        if self.outputs == 0 {
            return output;
        }
        for (x, row) in iter::zip(input, self.weights.chunks_exact(self.outputs)) {
            for (o, w) in iter::zip(&mut output, row) {
                *o += x * w;
            }
        }
        for o in &mut output {
            *o = activation(*o);
        }
        output
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    structure: Structure,
    activation: Activation,
    layers: Vec<Layer>,
}

impl Network {
    /// Creates a network with every parameter drawn uniformly from `[-1, 1]`.
    pub fn random<R>(structure: Structure, activation: Activation, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = structure
            .layer_shapes()
            .map(|(inputs, outputs)| Layer::random(inputs, outputs, rng))
            .collect();
        Self {
            structure,
            activation,
            layers,
        }
    }

    /// Builds a network from a flat parameter list laid out like
    /// [`parameters`](Self::parameters): per layer, the row-major weights followed
    /// by the biases.
    pub fn from_parameters(
        structure: Structure,
        activation: Activation,
        parameters: &[f32],
    ) -> Result<Self, NetworkError> {
        let expected: usize = structure
            .layer_shapes()
            .map(|(inputs, outputs)| inputs * outputs + outputs)
            .sum();
        if parameters.len() != expected {
            return Err(NetworkError::ParameterCount {
                expected,
                found: parameters.len(),
            });
        }

        let mut rest = parameters;
        let layers = structure
            .layer_shapes()
            .map(|(inputs, outputs)| {
                let (weights, tail) = rest.split_at(inputs * outputs);
                let (biases, tail) = tail.split_at(outputs);
                rest = tail;
                Layer {
                    inputs,
                    outputs,
                    weights: weights.to_vec(),
                    biases: biases.to_vec(),
                }
            })
            .collect();
        Ok(Self {
            structure,
            activation,
            layers,
        })
    }

    #[must_use]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// All weights and biases, layer by layer.
    pub fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        self.layers.iter().flat_map(Layer::parameters)
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Checks that the layers agree with the declared structure.
    ///
    /// Networks built by this module always pass; deserialized ones may not.
    pub fn validate(&self) -> Result<(), NetworkError> {
        let shapes: Vec<_> = self.structure.layer_shapes().collect();
        if shapes.len() != self.layers.len() {
            return Err(NetworkError::LayerCount {
                expected: shapes.len(),
                found: self.layers.len(),
            });
        }
        for (index, (layer, (inputs, outputs))) in iter::zip(&self.layers, shapes).enumerate() {
            if layer.inputs != inputs || layer.outputs != outputs || !layer.is_well_formed() {
                return Err(NetworkError::MalformedLayer { index });
            }
        }
        Ok(())
    }

    /// Runs the network on one input row.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if input.len() != self.structure.inputs {
            return Err(NetworkError::InputWidth {
                expected: self.structure.inputs,
                found: input.len(),
            });
        }

        let Some((output_layer, hidden_layers)) = self.layers.split_last() else {
            return Err(NetworkError::LayerCount {
                expected: self.structure.hidden.len() + 1,
                found: 0,
            });
        };

        let mut values = input.to_vec();
        for (index, layer) in hidden_layers.iter().enumerate() {
            if values.len() != layer.inputs || !layer.is_well_formed() {
                return Err(NetworkError::MalformedLayer { index });
            }
            values = layer.forward(&values, |v| v.max(0.0));
        }
        if values.len() != output_layer.inputs || !output_layer.is_well_formed() {
            return Err(NetworkError::MalformedLayer {
                index: hidden_layers.len(),
            });
        }
        let activation = self.activation;
        Ok(output_layer.forward(&values, |v| activation.apply(v)))
    }

    /// Returns a mutated copy.
    ///
    /// Each parameter is kept with probability `rate` and otherwise replaced by a
    /// fresh uniform value in `[-1, 1]`: `rate = 1.0` copies the network, `rate = 0.0`
    /// re-draws every parameter.
    #[must_use]
    pub fn mutate<R>(&self, rate: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                layer.map_parameters(|_, value| {
                    if rng.random::<f32>() >= rate {
                        rng.random_range(PARAM_RANGE)
                    } else {
                        value
                    }
                })
            })
            .collect();
        Self {
            structure: self.structure.clone(),
            activation: self.activation,
            layers,
        }
    }

    /// Uniform crossover: every parameter is taken from either parent with equal
    /// probability.
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        if self.structure != other.structure || self.layers.len() != other.layers.len() {
            return Err(NetworkError::StructureMismatch);
        }
        let mut layers = Vec::with_capacity(self.layers.len());
        for (index, (mine, theirs)) in iter::zip(&self.layers, &other.layers).enumerate() {
            if mine.weights.len() != theirs.weights.len() || mine.biases.len() != theirs.biases.len() {
                return Err(NetworkError::MalformedLayer { index });
            }
            let their_params: Vec<f32> = theirs.parameters().collect();
            layers.push(mine.map_parameters(|i, value| {
                if rng.random_bool(0.5) {
                    value
                } else {
                    their_params[i]
                }
            }));
        }
        Ok(Self {
            structure: self.structure.clone(),
            activation: self.activation,
            layers,
        })
    }
}
