//! The landing chart: monthly growth as measured against what the models predicted.

use serde::Serialize;

/// One month of the growth chart, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub month: &'static str,
    pub actual: f64,
    pub predicted: f64,
}

const GROWTH: [(&str, f64, f64); 6] = [
    ("Jan", 4.0, 4.2),
    ("Feb", 4.3, 4.4),
    ("Mar", 4.5, 4.6),
    ("Apr", 4.8, 4.9),
    ("May", 5.2, 5.1),
    ("Jun", 5.5, 5.4),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewView {
    pub growth: Vec<GrowthPoint>,
    /// Mean absolute gap between the two series.
    pub mean_abs_error: f64,
}

impl OverviewView {
    pub fn render() -> Self {
        let growth: Vec<GrowthPoint> = GROWTH
            .iter()
            .map(|&(month, actual, predicted)| GrowthPoint {
                month,
                actual,
                predicted,
            })
            .collect();

        let mean_abs_error = growth
            .iter()
            .map(|p| (p.actual - p.predicted).abs())
            .sum::<f64>()
            / growth.len() as f64;

        Self {
            growth,
            mean_abs_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_covers_the_first_half_year() {
        let view = OverviewView::render();
        let months: Vec<_> = view.growth.iter().map(|p| p.month).collect();
        assert_eq!(months, ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        assert_eq!(view.growth[0].actual, 4.0);
        assert_eq!(view.growth[5].predicted, 5.4);
    }

    #[test]
    fn error_is_the_mean_monthly_gap() {
        let view = OverviewView::render();
        assert!((view.mean_abs_error - 0.7 / 6.0).abs() < 1e-9);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("meanAbsError").is_some());
        assert_eq!(json["growth"][4]["month"], "May");
    }
}
