use std::{str::FromStr, time::Duration};

use serde::Serialize;

use super::{predictions, Analysis, Prediction};
use crate::error::{check_range, ForestryErr, Result};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
    Minkowski,
}

impl FromStr for DistanceMetric {
    type Err = ForestryErr;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "euclidean" => Ok(Self::Euclidean),
            "manhattan" => Ok(Self::Manhattan),
            "minkowski" => Ok(Self::Minkowski),
            other => Err(ForestryErr::UnknownMetric(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    #[default]
    Uniform,
    Distance,
}

impl FromStr for Weighting {
    type Err = ForestryErr;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "distance" => Ok(Self::Distance),
            other => Err(ForestryErr::UnknownWeighting(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnnParams {
    n_neighbors: u32,
    metric: DistanceMetric,
    weights: Weighting,
}

impl KnnParams {
    /// # Errors
    /// Returns `ForestryErr::OutOfRange` if `n_neighbors` is zero.
    pub fn new(n_neighbors: u32, metric: DistanceMetric, weights: Weighting) -> Result<Self> {
        check_range("n_neighbors", n_neighbors as f64, 1.0, f64::INFINITY)?;
        Ok(Self {
            n_neighbors,
            metric,
            weights,
        })
    }

    pub fn n_neighbors(&self) -> u32 {
        self.n_neighbors
    }
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            metric: DistanceMetric::Euclidean,
            weights: Weighting::Uniform,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnnResults {
    pub accuracy: f64,
    pub predictions: Vec<Prediction>,
    pub confusion_matrix: Vec<Vec<u32>>,
}

/// Species classification by nearest neighbors.
#[derive(Debug, Clone)]
pub struct KnnAnalysis {
    params: KnnParams,
    delay: Duration,
}

impl KnnAnalysis {
    pub fn new(params: KnnParams) -> Self {
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

impl Analysis for KnnAnalysis {
    type Params = KnnParams;
    type Output = KnnResults;

    fn name(&self) -> &'static str {
        "KNN"
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn params(&self) -> &KnnParams {
        &self.params
    }

    fn compute(&self) -> Result<KnnResults> {
        Ok(KnnResults {
            accuracy: 0.85,
            predictions: predictions(&[("Pine", "Pine"), ("Oak", "Oak"), ("Maple", "Pine")]),
            confusion_matrix: vec![vec![10, 2, 1], vec![1, 8, 2], vec![2, 1, 9]],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_neighbors_is_rejected() {
        assert!(KnnParams::new(0, DistanceMetric::Euclidean, Weighting::Uniform).is_err());
        assert!(KnnParams::new(1, DistanceMetric::Manhattan, Weighting::Distance).is_ok());
    }

    #[test]
    fn select_values_parse() {
        assert_eq!(
            "minkowski".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Minkowski
        );
        assert_eq!("distance".parse::<Weighting>().unwrap(), Weighting::Distance);
        assert!("cosine".parse::<DistanceMetric>().is_err());
        assert!("inverse".parse::<Weighting>().is_err());
    }

    #[test]
    fn parameters_serialize_with_form_keys() {
        let value = serde_json::to_value(KnnParams::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "n_neighbors": 5, "metric": "euclidean", "weights": "uniform" })
        );
    }

    #[test]
    fn confusion_matrix_is_square() {
        let results = KnnAnalysis::new(KnnParams::default()).compute().unwrap();
        assert!(results.confusion_matrix.iter().all(|row| row.len() == 3));
        assert_eq!(results.predictions.len(), 3);
    }
}
