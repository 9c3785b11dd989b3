use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::{
    error::{check_range, ForestryErr, Result},
    features::{FeatureId, FeatureTables},
};

pub const TREES_RANGE: (u32, u32) = (3, 20);
pub const FEATURE_SPLIT_RANGE: (u32, u32) = (1, 4);

/// The two sliders of the random forest view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestParams {
    number_of_trees: u32,
    feature_split: u32,
}

impl ForestParams {
    /// Creates a new set of random forest hyperparameters.
    ///
    /// # Errors
    /// Returns `ForestryErr::OutOfRange` if `number_of_trees` is outside `[3, 20]`
    /// or `feature_split` is outside `[1, 4]`.
    pub fn new(number_of_trees: u32, feature_split: u32) -> Result<Self> {
        check_range(
            "number_of_trees",
            number_of_trees as f64,
            TREES_RANGE.0 as f64,
            TREES_RANGE.1 as f64,
        )?;
        check_range(
            "feature_split",
            feature_split as f64,
            FEATURE_SPLIT_RANGE.0 as f64,
            FEATURE_SPLIT_RANGE.1 as f64,
        )?;

        Ok(Self {
            number_of_trees,
            feature_split,
        })
    }

    pub fn number_of_trees(&self) -> u32 {
        self.number_of_trees
    }

    pub fn feature_split(&self) -> u32 {
        self.feature_split
    }
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            number_of_trees: 5,
            feature_split: 2,
        }
    }
}

/// Synthesizes the prediction of the `tree_index`-th tree (1-based) of a forest.
///
/// The `rng` term makes consecutive calls differ on purpose; pass a seeded
/// generator to pin the output.
pub fn predict_tree<R: Rng + ?Sized>(
    tables: &FeatureTables,
    base_value: f64,
    tree_index: u32,
    feature: FeatureId,
    rng: &mut R,
) -> f64 {
    let factors = tables.forest_factors(feature);
    let jitter = (rng.random::<f64>() - 0.5) * 0.1;
    let random_noise =
        (base_value * tree_index as f64 * factors.bias).sin() * factors.noise + jitter;

    base_value * (1.0 + random_noise)
}

/// Per-tree predictions and their average.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsemblePrediction {
    pub individual_predictions: Vec<f64>,
    pub ensemble_prediction: f64,
}

/// Runs `number_of_trees` synthetic trees over `base_value` and averages them.
///
/// Trees are evaluated in ascending index order, `1..=number_of_trees`.
///
/// # Errors
/// Returns `ForestryErr::EmptyEnsemble` when `number_of_trees` is zero.
pub fn predict_ensemble<R: Rng + ?Sized>(
    tables: &FeatureTables,
    base_value: f64,
    feature: FeatureId,
    number_of_trees: u32,
    rng: &mut R,
) -> Result<EnsemblePrediction> {
    if number_of_trees == 0 {
        return Err(ForestryErr::EmptyEnsemble);
    }

    let individual_predictions: Vec<f64> = (1..=number_of_trees)
        .map(|i| predict_tree(tables, base_value, i, feature, rng))
        .collect();

    let ensemble_prediction =
        individual_predictions.iter().sum::<f64>() / individual_predictions.len() as f64;

    Ok(EnsemblePrediction {
        individual_predictions,
        ensemble_prediction,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestMetrics {
    pub accuracy: f64,
    pub error_rate: f64,
    pub confidence: f64,
}

impl ForestMetrics {
    pub fn from_params(params: &ForestParams) -> Self {
        let trees = params.number_of_trees as f64;
        let split = params.feature_split as f64;

        Self {
            accuracy: 95.0 + trees * 0.2 - split * 0.5,
            error_rate: 0.15 - trees * 0.005 + split * 0.01,
            confidence: 0.8 + split * 0.05,
        }
    }
}

impl fmt::Display for ForestMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy {:.1}% | error rate {:.3} | confidence {:.2}",
            self.accuracy, self.error_rate, self.confidence
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestSample {
    pub name: String,
    pub value: f64,
    pub prediction: f64,
}

/// A bar of the per-tree breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreePrediction {
    pub name: String,
    pub prediction: f64,
}

/// Everything the random forest view draws for one set of inputs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomForestView {
    pub feature: FeatureId,
    pub params: ForestParams,
    pub samples: Vec<ForestSample>,
    /// Independent per-tree predictions for the first sample.
    pub tree_breakdown: Vec<TreePrediction>,
    pub metrics: ForestMetrics,
}

impl RandomForestView {
    /// Recomputes the ensemble series, the tree breakdown and the metrics.
    ///
    /// # Errors
    /// Propagates `ForestryErr::EmptyEnsemble`, which validated params never produce.
    pub fn render<R: Rng + ?Sized>(
        tables: &FeatureTables,
        feature: FeatureId,
        params: ForestParams,
        rng: &mut R,
    ) -> Result<Self> {
        log::debug!(
            "rendering random forest view: feature={feature}, trees={}, split={}",
            params.number_of_trees,
            params.feature_split
        );

        let samples = tables
            .samples(feature)
            .iter()
            .map(|s| -> Result<ForestSample> {
                let ensemble =
                    predict_ensemble(tables, s.value, feature, params.number_of_trees, rng)?;
                Ok(ForestSample {
                    name: s.name.clone(),
                    value: s.value,
                    prediction: ensemble.ensemble_prediction,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tree_breakdown = match samples.first() {
            Some(first) => (1..=params.number_of_trees)
                .map(|i| TreePrediction {
                    name: format!("Tree {i}"),
                    prediction: predict_tree(tables, first.value, i, feature, rng),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            feature,
            params,
            samples,
            tree_breakdown,
            metrics: ForestMetrics::from_params(&params),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn ensemble_has_one_prediction_per_tree() {
        let tables = FeatureTables::forestry();
        let mut rng = seeded_rng();
        for n in 3..=20 {
            let ensemble =
                predict_ensemble(&tables, 45.2, FeatureId::Diameter, n, &mut rng).unwrap();
            assert_eq!(ensemble.individual_predictions.len(), n as usize);
        }
    }

    #[test]
    fn ensemble_is_the_mean_of_its_trees() {
        let tables = FeatureTables::forestry();
        let mut rng = seeded_rng();
        for feature in FeatureId::ALL {
            let ensemble = predict_ensemble(&tables, 120.0, feature, 7, &mut rng).unwrap();
            let mut sum = 0.0;
            for p in &ensemble.individual_predictions {
                sum += p;
            }
            let mean = sum / 7.0;
            assert!((ensemble.ensemble_prediction - mean).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_trees_fail_fast() {
        let tables = FeatureTables::forestry();
        let err = predict_ensemble(&tables, 25.5, FeatureId::Height, 0, &mut seeded_rng());
        assert!(matches!(err, Err(ForestryErr::EmptyEnsemble)));
    }

    #[test]
    fn tree_noise_stays_within_its_envelope() {
        let tables = FeatureTables::forestry();
        let mut rng = seeded_rng();
        for feature in FeatureId::ALL {
            let noise = tables.forest_factors(feature).noise;
            for i in 1..=20 {
                let p = predict_tree(&tables, 100.0, i, feature, &mut rng);
                let relative = p / 100.0 - 1.0;
                assert!(relative.abs() <= noise + 0.05 + 1e-12);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_forest() {
        let tables = FeatureTables::forestry();
        let a = predict_ensemble(&tables, 28.7, FeatureId::Height, 10, &mut seeded_rng()).unwrap();
        let b = predict_ensemble(&tables, 28.7, FeatureId::Height, 10, &mut seeded_rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn metrics_follow_the_slider_formulas() {
        let metrics = ForestMetrics::from_params(&ForestParams::default());
        assert!((metrics.accuracy - 95.0).abs() < 1e-9);
        assert!((metrics.error_rate - 0.145).abs() < 1e-9);
        assert!((metrics.confidence - 0.9).abs() < 1e-9);
        assert_eq!(
            metrics.to_string(),
            "accuracy 95.0% | error rate 0.145 | confidence 0.90"
        );
    }

    #[test]
    fn params_outside_slider_range_are_rejected() {
        assert!(ForestParams::new(2, 2).is_err());
        assert!(ForestParams::new(21, 2).is_err());
        assert!(ForestParams::new(5, 0).is_err());
        assert!(ForestParams::new(5, 5).is_err());
    }

    #[test]
    fn view_breaks_down_the_first_sample() {
        let tables = FeatureTables::forestry();
        let params = ForestParams::new(8, 3).unwrap();
        let view =
            RandomForestView::render(&tables, FeatureId::Density, params, &mut seeded_rng())
                .unwrap();

        assert_eq!(view.samples.len(), 5);
        assert_eq!(view.tree_breakdown.len(), 8);
        assert_eq!(view.tree_breakdown[0].name, "Tree 1");
        assert_eq!(view.tree_breakdown[7].name, "Tree 8");
    }
}
