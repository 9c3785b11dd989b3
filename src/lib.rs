//! Synthetic model outputs for the forestry machine-learning walkthrough.
//!
//! Nothing in here trains a model: each view turns a handful of hard-coded
//! measurements and the current slider values into plausible-looking
//! predictions and metrics.

pub mod analysis;
pub mod animation;
pub mod config;
pub mod decision_tree;
pub mod error;
pub mod features;
pub mod overview;
pub mod random_forest;
pub mod svm;

use rand::{rngs::StdRng, SeedableRng};

pub use config::AppConfig;
pub use error::{ForestryErr, Result};
pub use features::{FeatureId, FeatureTables};

/// Builds the random source shared by the forest noise and the animation.
///
/// A seed pins every "random" output; without one the generator is seeded
/// from the OS and each render differs slightly.
pub fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
