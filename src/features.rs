//! Static forestry measurements and the per-feature tuning constants the
//! synthetic generators read from.
//!
//! Everything here is built once through [`FeatureTables::forestry`] and then
//! only ever borrowed.

use std::{fmt, str::FromStr};

use serde::Serialize;

/// The measured tree attribute a view is currently plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    #[default]
    Height,
    Diameter,
    Age,
    Density,
}

impl FeatureId {
    pub const ALL: [FeatureId; 4] = [Self::Height, Self::Diameter, Self::Age, Self::Density];

    /// Resolves a feature by its identifier.
    ///
    /// Unrecognized identifiers resolve to `Height`, so a lookup never fails.
    pub fn from_name(name: &str) -> Self {
        match name {
            "height" => Self::Height,
            "diameter" => Self::Diameter,
            "age" => Self::Age,
            "density" => Self::Density,
            other => {
                log::debug!("unknown feature {other:?}, falling back to height");
                Self::Height
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Diameter => "diameter",
            Self::Age => "age",
            Self::Density => "density",
        }
    }

    /// Human readable label shown on the feature selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Height => "Tree Height",
            Self::Diameter => "Tree Diameter",
            Self::Age => "Tree Age",
            Self::Density => "Stand Density",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for FeatureId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A labeled measurement plotted as the "actual" value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub value: f64,
}

/// Decision tree tuning constants for one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeFactors {
    pub depth_weight: f64,
    pub sample_weight: f64,
    pub baseline: f64,
}

/// Random forest tuning constants for one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestFactors {
    pub noise: f64,
    pub bias: f64,
}

/// Class of a species point on the SVM scatter plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Species {
    Pine,
    Oak,
}

impl Species {
    /// The SVM class label: `1` for pine, `-1` for oak.
    pub fn class(self) -> i8 {
        match self {
            Self::Pine => 1,
            Self::Oak => -1,
        }
    }
}

/// A species-labeled point for the SVM view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabeledPoint {
    pub species: Species,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
struct FeatureEntry {
    samples: Vec<Sample>,
    tree: TreeFactors,
    forest: ForestFactors,
    species: Vec<LabeledPoint>,
}

/// Immutable lookup tables for every feature.
#[derive(Debug, Clone)]
pub struct FeatureTables {
    entries: [FeatureEntry; 4],
}

impl FeatureTables {
    /// Builds the tables the forestry demo ships with.
    pub fn forestry() -> Self {
        Self {
            entries: [
                FeatureEntry {
                    samples: samples(&[25.5, 30.2, 28.7, 32.1, 27.4]),
                    tree: tree(0.15, 0.1, 1.0),
                    forest: forest(0.15, 1.0),
                    species: species(
                        [(25.5, 15.2), (28.3, 16.8), (27.1, 15.9)],
                        [(18.4, 12.3), (20.1, 13.5), (19.2, 12.8)],
                    ),
                },
                FeatureEntry {
                    samples: samples(&[45.2, 52.8, 48.5, 55.3, 50.1]),
                    tree: tree(0.2, 0.15, 1.2),
                    forest: forest(0.2, 1.2),
                    species: species(
                        [(45.2, 35.6), (48.7, 38.2), (46.9, 36.7)],
                        [(32.4, 28.5), (34.8, 30.2), (33.1, 29.4)],
                    ),
                },
                FeatureEntry {
                    samples: samples(&[35.0, 42.0, 38.0, 45.0, 40.0]),
                    tree: tree(0.1, 0.2, 0.8),
                    forest: forest(0.1, 0.8),
                    species: species(
                        [(35.0, 42.0), (38.0, 45.0), (36.0, 43.0)],
                        [(25.0, 32.0), (28.0, 35.0), (26.0, 33.0)],
                    ),
                },
                FeatureEntry {
                    samples: samples(&[120.0, 145.0, 135.0, 150.0, 130.0]),
                    tree: tree(0.25, 0.25, 1.5),
                    forest: forest(0.25, 1.5),
                    species: species(
                        [(120.0, 85.0), (125.0, 90.0), (122.0, 87.0)],
                        [(95.0, 65.0), (100.0, 70.0), (98.0, 68.0)],
                    ),
                },
            ],
        }
    }

    pub fn samples(&self, feature: FeatureId) -> &[Sample] {
        &self.entry(feature).samples
    }

    pub fn tree_factors(&self, feature: FeatureId) -> TreeFactors {
        self.entry(feature).tree
    }

    pub fn forest_factors(&self, feature: FeatureId) -> ForestFactors {
        self.entry(feature).forest
    }

    pub fn species_points(&self, feature: FeatureId) -> &[LabeledPoint] {
        &self.entry(feature).species
    }

    fn entry(&self, feature: FeatureId) -> &FeatureEntry {
        &self.entries[feature.index()]
    }
}

impl Default for FeatureTables {
    fn default() -> Self {
        Self::forestry()
    }
}

fn samples(values: &[f64]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| Sample {
            name: format!("Sample {}", i + 1),
            value,
        })
        .collect()
}

fn tree(depth_weight: f64, sample_weight: f64, baseline: f64) -> TreeFactors {
    TreeFactors {
        depth_weight,
        sample_weight,
        baseline,
    }
}

fn forest(noise: f64, bias: f64) -> ForestFactors {
    ForestFactors { noise, bias }
}

fn species(pine: [(f64, f64); 3], oak: [(f64, f64); 3]) -> Vec<LabeledPoint> {
    let pine = pine.into_iter().map(|(x, y)| LabeledPoint {
        species: Species::Pine,
        x,
        y,
    });
    let oak = oak.into_iter().map(|(x, y)| LabeledPoint {
        species: Species::Oak,
        x,
        y,
    });
    pine.chain(oak).collect()
}
