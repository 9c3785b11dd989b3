use std::time::Duration;

use serde::Serialize;

use super::{predictions, Analysis, Prediction};
use crate::error::{check_range, Result};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

pub const ESTIMATORS_RANGE: (u32, u32) = (10, 1000);
pub const LEARNING_RATE_RANGE: (f64, f64) = (0.01, 1.0);
pub const MAX_DEPTH_RANGE: (u32, u32) = (1, 10);
pub const SUBSAMPLE_RANGE: (f64, f64) = (0.1, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientBoostingParams {
    n_estimators: u32,
    learning_rate: f64,
    max_depth: u32,
    subsample: f64,
}

impl GradientBoostingParams {
    /// # Errors
    /// Returns `ForestryErr::OutOfRange` naming the first input outside its form range.
    pub fn new(n_estimators: u32, learning_rate: f64, max_depth: u32, subsample: f64) -> Result<Self> {
        check_range(
            "n_estimators",
            n_estimators as f64,
            ESTIMATORS_RANGE.0 as f64,
            ESTIMATORS_RANGE.1 as f64,
        )?;
        let learning_rate = check_range(
            "learning_rate",
            learning_rate,
            LEARNING_RATE_RANGE.0,
            LEARNING_RATE_RANGE.1,
        )?;
        check_range(
            "max_depth",
            max_depth as f64,
            MAX_DEPTH_RANGE.0 as f64,
            MAX_DEPTH_RANGE.1 as f64,
        )?;
        let subsample = check_range("subsample", subsample, SUBSAMPLE_RANGE.0, SUBSAMPLE_RANGE.1)?;

        Ok(Self {
            n_estimators,
            learning_rate,
            max_depth,
            subsample,
        })
    }
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientBoostingResults {
    pub accuracy: f64,
    pub predictions: Vec<Prediction>,
    pub feature_importance: Vec<FeatureImportance>,
}

/// Tree health classification by boosted trees.
#[derive(Debug, Clone)]
pub struct GradientBoostingAnalysis {
    params: GradientBoostingParams,
    delay: Duration,
}

impl GradientBoostingAnalysis {
    pub fn new(params: GradientBoostingParams) -> Self {
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

impl Analysis for GradientBoostingAnalysis {
    type Params = GradientBoostingParams;
    type Output = GradientBoostingResults;

    fn name(&self) -> &'static str {
        "Gradient Boosting"
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn params(&self) -> &GradientBoostingParams {
        &self.params
    }

    fn compute(&self) -> Result<GradientBoostingResults> {
        let feature_importance = [
            ("Crown Density", 0.35),
            ("DBH", 0.25),
            ("Soil pH", 0.20),
            ("Canopy Cover", 0.15),
            ("Age", 0.05),
        ]
        .into_iter()
        .map(|(feature, importance)| FeatureImportance {
            feature,
            importance,
        })
        .collect();

        Ok(GradientBoostingResults {
            accuracy: 0.92,
            predictions: predictions(&[
                ("Healthy", "Healthy"),
                ("Stressed", "Stressed"),
                ("Diseased", "Healthy"),
                ("Healthy", "Healthy"),
            ]),
            feature_importance,
        })
    }
}
