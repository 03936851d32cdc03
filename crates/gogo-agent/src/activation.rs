use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Activation applied to the output layer of a [`Network`](crate::Network).
///
/// Hidden layers always use ReLU. Names are parsed case-insensitively, so `SIGMOID`
/// and `sigmoid` both select [`Activation::Sigmoid`].
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
pub enum Activation {
    #[default]
    #[display("sigmoid")]
    Sigmoid,
    #[display("tanh")]
    Tanh,
    #[display("relu")]
    Relu,
    #[display("identity")]
    Identity,
}

impl Activation {
    pub const ALL: [Self; 4] = [
        Activation::Sigmoid,
        Activation::Tanh,
        Activation::Relu,
        Activation::Identity,
    ];

    #[must_use]
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-value).exp()),
            Activation::Tanh => value.tanh(),
            Activation::Relu => value.max(0.0),
            Activation::Identity => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown activation function {name:?}")]
pub struct ParseActivationError {
    name: String,
}

impl FromStr for Activation {
    type Err = ParseActivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|activation| activation.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseActivationError { name: s.to_owned() })
    }
}

impl TryFrom<String> for Activation {
    type Error = ParseActivationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Activation> for String {
    fn from(value: Activation) -> Self {
        value.to_string()
    }
}
