use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    error::{check_range, ForestryErr, Result},
    features::{FeatureId, FeatureTables, LabeledPoint},
};

/// Number of intervals the boundary is sampled over; yields `BOUNDARY_STEPS + 1` points.
pub const BOUNDARY_STEPS: usize = 50;

pub const C_RANGE: (f64, f64) = (0.1, 10.0);
pub const GAMMA_RANGE: (f64, f64) = (0.01, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<&LabeledPoint> for Point {
    fn from(value: &LabeledPoint) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    #[default]
    Linear,
    Rbf,
}

impl FromStr for Kernel {
    type Err = ForestryErr;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(Self::Linear),
            "rbf" => Ok(Self::Rbf),
            other => Err(ForestryErr::UnknownKernel(other.to_string())),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Rbf => f.write_str("rbf"),
        }
    }
}

/// Kernel selector plus the `C` and `gamma` sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SvmParams {
    kernel: Kernel,
    c: f64,
    gamma: f64,
}

impl SvmParams {
    /// # Errors
    /// Returns `ForestryErr::OutOfRange` if `c` is outside `[0.1, 10]` or
    /// `gamma` is outside `[0.01, 1]`.
    pub fn new(kernel: Kernel, c: f64, gamma: f64) -> Result<Self> {
        let c = check_range("c", c, C_RANGE.0, C_RANGE.1)?;
        let gamma = check_range("gamma", gamma, GAMMA_RANGE.0, GAMMA_RANGE.1)?;
        Ok(Self { kernel, c, gamma })
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            kernel: Kernel::Linear,
            c: 1.0,
            gamma: 0.1,
        }
    }
}

/// Traces a plausible separating curve across the bounding box of `data`.
///
/// The curve is sampled at evenly spaced `x` values from the leftmost to the
/// rightmost point, both ends included.
///
/// # Errors
/// Returns `ForestryErr::EmptyPointSet` if `data` is empty.
pub fn generate_boundary(data: &[Point], kernel: Kernel, c: f64, gamma: f64) -> Result<Vec<Point>> {
    let first = data.first().ok_or(ForestryErr::EmptyPointSet)?;

    let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.x, first.x, first.y, first.y);
    for p in &data[1..] {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }

    let y_mid = (y_max + y_min) / 2.0;
    let boundary = (0..=BOUNDARY_STEPS)
        .map(|i| {
            let x = x_min + (x_max - x_min) * (i as f64 / BOUNDARY_STEPS as f64);
            let y = match kernel {
                Kernel::Linear => -0.5 * x + y_mid + (c - 1.0) * 2.0,
                Kernel::Rbf => (x * gamma).sin() * (y_max - y_min) / 4.0 + y_mid,
            };
            Point { x, y }
        })
        .collect();

    Ok(boundary)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SvmPerformance {
    pub accuracy: f64,
    pub margin: f64,
    pub support_vectors: u32,
}

impl SvmPerformance {
    pub fn from_params(params: &SvmParams) -> Self {
        let SvmParams { kernel, c, gamma } = *params;
        let kernel_bonus = match kernel {
            Kernel::Rbf => 5.0,
            Kernel::Linear => 0.0,
        };

        Self {
            accuracy: 85.0 + c * 2.0 - gamma * 5.0 + kernel_bonus,
            margin: 0.8 - c * 0.1 + gamma * 0.2,
            support_vectors: 10 + (c * 2.0).floor() as u32,
        }
    }
}

impl fmt::Display for SvmPerformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy {:.1}% | margin {:.2} | support vectors {}",
            self.accuracy, self.margin, self.support_vectors
        )
    }
}

/// Scatter points, boundary overlay and metrics for one set of SVM inputs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SvmView {
    pub feature: FeatureId,
    pub params: SvmParams,
    pub points: Vec<LabeledPoint>,
    pub boundary: Vec<Point>,
    pub performance: SvmPerformance,
}

impl SvmView {
    /// # Errors
    /// Returns `ForestryErr::EmptyPointSet` if the feature has no species points.
    pub fn render(tables: &FeatureTables, feature: FeatureId, params: SvmParams) -> Result<Self> {
        log::debug!(
            "rendering svm view: feature={feature}, kernel={}, c={}, gamma={}",
            params.kernel,
            params.c,
            params.gamma
        );

        let points = tables.species_points(feature).to_vec();
        let coords: Vec<Point> = points.iter().map(Point::from).collect();
        let boundary = generate_boundary(&coords, params.kernel, params.c, params.gamma)?;

        Ok(Self {
            feature,
            params,
            points,
            boundary,
            performance: SvmPerformance::from_params(&params),
        })
    }
}
