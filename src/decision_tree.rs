use std::fmt;

use serde::Serialize;

use crate::{
    error::{check_range, Result},
    features::{FeatureId, FeatureTables},
};

pub const DEPTH_RANGE: (u32, u32) = (1, 10);
pub const MIN_SAMPLES_RANGE: (u32, u32) = (2, 10);

/// The two sliders of the decision tree view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTreeParams {
    tree_depth: u32,
    min_samples_split: u32,
}

impl DecisionTreeParams {
    /// Creates a new set of decision tree hyperparameters.
    ///
    /// # Arguments
    /// * `tree_depth` - How deep the tree may grow, within `[1, 10]`.
    /// * `min_samples_split` - Samples needed to split a node, within `[2, 10]`.
    ///
    /// # Errors
    /// Returns `ForestryErr::OutOfRange` if either value is outside its slider range.
    pub fn new(tree_depth: u32, min_samples_split: u32) -> Result<Self> {
        check_range(
            "tree_depth",
            tree_depth as f64,
            DEPTH_RANGE.0 as f64,
            DEPTH_RANGE.1 as f64,
        )?;
        check_range(
            "min_samples_split",
            min_samples_split as f64,
            MIN_SAMPLES_RANGE.0 as f64,
            MIN_SAMPLES_RANGE.1 as f64,
        )?;

        Ok(Self {
            tree_depth,
            min_samples_split,
        })
    }

    pub fn tree_depth(&self) -> u32 {
        self.tree_depth
    }

    pub fn min_samples_split(&self) -> u32 {
        self.min_samples_split
    }
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self {
            tree_depth: 3,
            min_samples_split: 2,
        }
    }
}

/// Synthesizes the value a single decision tree would predict for `base_value`.
///
/// Deeper trees damp the variation, larger split thresholds amplify it.
pub fn predict(
    tables: &FeatureTables,
    base_value: f64,
    feature: FeatureId,
    depth: u32,
    min_samples: u32,
) -> f64 {
    let factors = tables.tree_factors(feature);
    let depth = depth as f64;
    let min_samples = min_samples as f64;

    let depth_effect = (depth / 10.0) * factors.depth_weight;
    let samples_effect = (min_samples / 10.0) * factors.sample_weight;
    let variation = (base_value * depth * factors.baseline).sin() * samples_effect;

    base_value + variation * (1.0 - depth_effect)
}

/// The fabricated performance figures shown under the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTreeMetrics {
    pub accuracy: f64,
    pub mean_error: f64,
    pub sample_count: u32,
}

impl DecisionTreeMetrics {
    pub fn from_params(params: &DecisionTreeParams) -> Self {
        let depth = params.tree_depth as f64;
        let min_samples = params.min_samples_split as f64;

        Self {
            accuracy: 100.0 - (depth * 0.5 + min_samples * 0.3),
            mean_error: 0.2 + (depth * 0.02 + min_samples * 0.01),
            sample_count: 1000 + params.tree_depth * 100 + params.min_samples_split * 50,
        }
    }
}

impl fmt::Display for DecisionTreeMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy {:.1}% | mean error {:.2} | samples {}",
            self.accuracy, self.mean_error, self.sample_count
        )
    }
}

/// One point of the actual-vs-predicted chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictedSample {
    pub name: String,
    pub value: f64,
    pub prediction: f64,
}

/// Everything the decision tree view draws for one set of inputs.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTreeView {
    pub feature: FeatureId,
    pub params: DecisionTreeParams,
    pub samples: Vec<PredictedSample>,
    pub metrics: DecisionTreeMetrics,
}

impl DecisionTreeView {
    /// Recomputes the chart series and metrics from scratch.
    pub fn render(tables: &FeatureTables, feature: FeatureId, params: DecisionTreeParams) -> Self {
        log::debug!(
            "rendering decision tree view: feature={feature}, depth={}, min_samples={}",
            params.tree_depth,
            params.min_samples_split
        );

        let samples = tables
            .samples(feature)
            .iter()
            .map(|s| PredictedSample {
                name: s.name.clone(),
                value: s.value,
                prediction: predict(
                    tables,
                    s.value,
                    feature,
                    params.tree_depth,
                    params.min_samples_split,
                ),
            })
            .collect();

        Self {
            feature,
            params,
            samples,
            metrics: DecisionTreeMetrics::from_params(&params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn prediction_is_pure() {
        let tables = FeatureTables::forestry();
        for feature in FeatureId::ALL {
            for depth in 1..=10 {
                for min_samples in 2..=10 {
                    let a = predict(&tables, 30.2, feature, depth, min_samples);
                    let b = predict(&tables, 30.2, feature, depth, min_samples);
                    assert_eq!(a.to_bits(), b.to_bits());
                }
            }
        }
    }

    #[test]
    fn prediction_follows_the_closed_form() {
        let tables = FeatureTables::forestry();
        // height: depth_weight 0.15, sample_weight 0.1, baseline 1.0
        let expected = 25.5 + (25.5f64 * 3.0).sin() * 0.02 * (1.0 - 0.045);
        let got = predict(&tables, 25.5, FeatureId::Height, 3, 2);
        assert!((got - expected).abs() < EPS);
    }

    #[test]
    fn unknown_feature_predicts_like_height() {
        let tables = FeatureTables::forestry();
        let unknown = FeatureId::from_name("unknown-feature");
        for depth in 1..=10 {
            let a = predict(&tables, 28.7, unknown, depth, 4);
            let b = predict(&tables, 28.7, FeatureId::Height, depth, 4);
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn default_metrics_match_the_reference_values() {
        let params = DecisionTreeParams::new(3, 2).unwrap();
        let metrics = DecisionTreeMetrics::from_params(&params);
        assert!((metrics.accuracy - 97.9).abs() < EPS);
        assert!((metrics.mean_error - 0.28).abs() < EPS);
        assert_eq!(metrics.sample_count, 1400);
        assert_eq!(
            metrics.to_string(),
            "accuracy 97.9% | mean error 0.28 | samples 1400"
        );
    }

    #[test]
    fn params_outside_slider_range_are_rejected() {
        assert!(DecisionTreeParams::new(0, 2).is_err());
        assert!(DecisionTreeParams::new(11, 2).is_err());
        assert!(DecisionTreeParams::new(3, 1).is_err());
        assert!(DecisionTreeParams::new(3, 11).is_err());
        assert_eq!(
            DecisionTreeParams::new(3, 2).unwrap(),
            DecisionTreeParams::default()
        );
    }

    #[test]
    fn view_predicts_every_sample() {
        let tables = FeatureTables::forestry();
        let params = DecisionTreeParams::default();
        let view = DecisionTreeView::render(&tables, FeatureId::Age, params);

        assert_eq!(view.samples.len(), 5);
        for (point, sample) in view.samples.iter().zip(tables.samples(FeatureId::Age)) {
            assert_eq!(point.value, sample.value);
            assert_eq!(
                point.prediction,
                predict(&tables, sample.value, FeatureId::Age, 3, 2)
            );
        }
    }
}
