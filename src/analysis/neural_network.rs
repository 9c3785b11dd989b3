use std::{str::FromStr, time::Duration};

use serde::Serialize;

use super::{predictions, Analysis, Prediction};
use crate::error::{check_range, ForestryErr, Result};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

pub const LAYERS_RANGE: (u32, u32) = (1, 10);
pub const NEURONS_RANGE: (u32, u32) = (1, 1024);
pub const LEARNING_RATE_RANGE: (f64, f64) = (0.0001, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Relu,
    Sigmoid,
    Tanh,
}

impl FromStr for Activation {
    type Err = ForestryErr;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relu" => Ok(Self::Relu),
            "sigmoid" => Ok(Self::Sigmoid),
            "tanh" => Ok(Self::Tanh),
            other => Err(ForestryErr::UnknownActivation(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeuralNetworkParams {
    layers: u32,
    neurons: u32,
    epochs: u32,
    #[serde(rename = "learningRate")]
    learning_rate: f64,
    activation: Activation,
}

impl NeuralNetworkParams {
    /// Creates the network shape and training knobs.
    ///
    /// # Arguments
    /// * `layers` - Hidden layer count within `[1, 10]`.
    /// * `neurons` - Neurons per hidden layer within `[1, 1024]`.
    /// * `epochs` - Training epochs, at least 1.
    /// * `learning_rate` - Step size within `[0.0001, 1]`.
    /// * `activation` - Hidden layer activation.
    ///
    /// # Errors
    /// Returns `ForestryErr::OutOfRange` naming the first offending input.
    pub fn new(
        layers: u32,
        neurons: u32,
        epochs: u32,
        learning_rate: f64,
        activation: Activation,
    ) -> Result<Self> {
        check_range(
            "layers",
            layers as f64,
            LAYERS_RANGE.0 as f64,
            LAYERS_RANGE.1 as f64,
        )?;
        check_range(
            "neurons",
            neurons as f64,
            NEURONS_RANGE.0 as f64,
            NEURONS_RANGE.1 as f64,
        )?;
        check_range("epochs", epochs as f64, 1.0, f64::INFINITY)?;
        let learning_rate = check_range(
            "learning_rate",
            learning_rate,
            LEARNING_RATE_RANGE.0,
            LEARNING_RATE_RANGE.1,
        )?;

        Ok(Self {
            layers,
            neurons,
            epochs,
            learning_rate,
            activation,
        })
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    pub fn neurons(&self) -> u32 {
        self.neurons
    }
}

impl Default for NeuralNetworkParams {
    fn default() -> Self {
        Self {
            layers: 3,
            neurons: 64,
            epochs: 100,
            learning_rate: 0.001,
            activation: Activation::Relu,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeuralNetworkResults {
    pub accuracy: f64,
    pub predictions: Vec<Prediction>,
    pub loss_history: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct NeuralNetworkAnalysis {
    params: NeuralNetworkParams,
    delay: Duration,
}

impl NeuralNetworkAnalysis {
    pub fn new(params: NeuralNetworkParams) -> Self {
        Self {
            params,
            delay: DEFAULT_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Analysis for NeuralNetworkAnalysis {
    type Params = NeuralNetworkParams;
    type Output = NeuralNetworkResults;

    fn name(&self) -> &'static str {
        "Neural Network"
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn params(&self) -> &NeuralNetworkParams {
        &self.params
    }

    fn compute(&self) -> Result<NeuralNetworkResults> {
        Ok(NeuralNetworkResults {
            accuracy: 0.89,
            predictions: predictions(&[
                ("Pine", "Pine"),
                ("Oak", "Oak"),
                ("Maple", "Maple"),
                ("Birch", "Pine"),
            ]),
            loss_history: vec![0.8, 0.6, 0.4, 0.3, 0.25, 0.2],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learning_rate_bounds() {
        let new = |lr| NeuralNetworkParams::new(3, 64, 100, lr, Activation::Tanh);
        assert!(new(0.0001).is_ok());
        assert!(new(1.0).is_ok());
        assert!(new(0.00001).is_err());
        assert!(new(1.5).is_err());
    }

    #[test]
    fn network_shape_bounds() {
        let new = |layers, neurons| {
            NeuralNetworkParams::new(layers, neurons, 100, 0.001, Activation::Relu)
        };
        assert!(new(1, 1).is_ok());
        assert!(new(10, 1024).is_ok());
        assert!(matches!(new(0, 64), Err(ForestryErr::OutOfRange { .. })));
        assert!(matches!(new(11, 64), Err(ForestryErr::OutOfRange { .. })));
        assert!(matches!(new(3, 4_000_000_000), Err(ForestryErr::OutOfRange { .. })));
    }

    #[test]
    fn parameters_keep_the_camel_case_learning_rate_key() {
        let value = serde_json::to_value(NeuralNetworkParams::default()).unwrap();
        assert_eq!(value["learningRate"], serde_json::json!(0.001));
        assert_eq!(value["activation"], serde_json::json!("relu"));
    }

    #[test]
    fn loss_history_decreases() {
        let results = NeuralNetworkAnalysis::new(NeuralNetworkParams::default())
            .compute()
            .unwrap();
        assert!(results.loss_history.windows(2).all(|w| w[1] < w[0]));
    }
}
