//! Simulated "analyses" that stand in for training a model.
//!
//! Each analysis waits a fixed delay and then resolves to a canned result; the
//! runner turns any failure on the way into a single user-facing message.

mod gradient_boosting;
mod knn;
mod neural_network;

use std::{panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt;
use serde::Serialize;

use crate::error::{ForestryErr, Result};

pub use gradient_boosting::{
    FeatureImportance, GradientBoostingAnalysis, GradientBoostingParams, GradientBoostingResults,
};
pub use knn::{DistanceMetric, KnnAnalysis, KnnParams, KnnResults, Weighting};
pub use neural_network::{
    Activation, NeuralNetworkAnalysis, NeuralNetworkParams, NeuralNetworkResults,
};

/// The only message a failed analysis ever shows.
pub const ANALYSIS_FAILED: &str = "Analysis failed. Please try again.";

/// An actual-vs-predicted label pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub actual: &'static str,
    pub predicted: &'static str,
}

pub(crate) fn predictions(pairs: &[(&'static str, &'static str)]) -> Vec<Prediction> {
    pairs
        .iter()
        .map(|&(actual, predicted)| Prediction { actual, predicted })
        .collect()
}

/// A simulated model run.
pub trait Analysis {
    type Params: Serialize + Clone;
    type Output: Serialize;

    /// Algorithm name reported to completion listeners.
    fn name(&self) -> &'static str;

    /// How long the run pretends to compute.
    fn delay(&self) -> Duration;

    fn params(&self) -> &Self::Params;

    /// Produces the results once the delay has elapsed.
    ///
    /// # Errors
    /// Whatever error the implementation reports; the runner never lets it escape.
    fn compute(&self) -> Result<Self::Output>;
}

/// What the view renders after the run: either the results or the failure message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome<T> {
    Completed(T),
    Failed { error: String },
}

impl<T> AnalysisOutcome<T> {
    pub fn failed() -> Self {
        Self::Failed {
            error: ANALYSIS_FAILED.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Failed { .. } => None,
        }
    }
}

/// Handed to the completion listener after a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a, P, T> {
    pub algorithm: &'static str,
    pub parameters: P,
    pub results: &'a T,
}

/// Runs `analysis` to completion.
///
/// Errors returned by `compute` and panics raised while running are both
/// logged and converted into [`AnalysisOutcome::Failed`].
pub async fn run<A: Analysis>(analysis: &A) -> AnalysisOutcome<A::Output> {
    run_with(analysis, |_| {}).await
}

/// Like [`run`], but reports successful results to `on_complete` first.
///
/// A panicking `on_complete` fails the run the same way a panicking `compute` does.
pub async fn run_with<A, F>(analysis: &A, on_complete: F) -> AnalysisOutcome<A::Output>
where
    A: Analysis,
    F: FnOnce(AnalysisReport<'_, A::Params, A::Output>),
{
    let name = analysis.name();
    log::info!("running {name} analysis");

    let attempt = AssertUnwindSafe(async {
        tokio::time::sleep(analysis.delay()).await;
        let results = analysis.compute()?;
        on_complete(AnalysisReport {
            algorithm: name,
            parameters: analysis.params().clone(),
            results: &results,
        });
        Ok::<_, ForestryErr>(results)
    })
    .catch_unwind()
    .await;

    match attempt {
        Ok(Ok(results)) => {
            log::info!("{name} analysis finished");
            AnalysisOutcome::Completed(results)
        }
        Ok(Err(e)) => {
            log::error!("error during {name} analysis: {e}");
            AnalysisOutcome::failed()
        }
        Err(_) => {
            log::error!("{name} analysis panicked");
            AnalysisOutcome::failed()
        }
    }
}
