use std::{error::Error, fmt, io};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, ForestryErr>;

/// Every failure the generators, analyses and config layer can report.
#[derive(Debug)]
pub enum ForestryErr {
    /// A hyperparameter fell outside the range its input control allows.
    OutOfRange {
        param: &'static str,
        got: f64,
        min: f64,
        max: f64,
    },
    /// An ensemble was requested with zero trees.
    EmptyEnsemble,
    /// A decision boundary was requested for an empty point set.
    EmptyPointSet,
    UnknownKernel(String),
    UnknownMetric(String),
    UnknownWeighting(String),
    UnknownActivation(String),
    /// The animation frame loop is no longer running.
    AnimationStopped(String),
    /// The configuration was readable but not usable.
    InvalidConfig(String),
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ForestryErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                param,
                got,
                min,
                max,
            } => write!(f, "{param} must be within [{min}, {max}], got {got}"),
            Self::EmptyEnsemble => write!(f, "an ensemble needs at least one tree"),
            Self::EmptyPointSet => {
                write!(f, "cannot fit a decision boundary to an empty point set")
            }
            Self::UnknownKernel(s) => write!(f, "unknown kernel: {s}"),
            Self::UnknownMetric(s) => write!(f, "unknown distance metric: {s}"),
            Self::UnknownWeighting(s) => write!(f, "unknown neighbor weighting: {s}"),
            Self::UnknownActivation(s) => write!(f, "unknown activation: {s}"),
            Self::AnimationStopped(msg) => write!(f, "animation stopped: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for ForestryErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ForestryErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ForestryErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Checks that `got` lies within `[min, max]`.
///
/// # Errors
/// Returns `ForestryErr::OutOfRange` naming `param` otherwise (NaN included).
pub(crate) fn check_range(param: &'static str, got: f64, min: f64, max: f64) -> Result<f64> {
    if got >= min && got <= max {
        Ok(got)
    } else {
        Err(ForestryErr::OutOfRange {
            param,
            got,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        assert_eq!(check_range("depth", 1.0, 1.0, 10.0).unwrap(), 1.0);
        assert_eq!(check_range("depth", 10.0, 1.0, 10.0).unwrap(), 10.0);
    }

    #[test]
    fn out_of_range_names_the_param() {
        let err = check_range("depth", 11.0, 1.0, 10.0).unwrap_err();
        assert_eq!(err.to_string(), "depth must be within [1, 10], got 11");
    }

    #[test]
    fn nan_is_rejected() {
        assert!(check_range("gamma", f64::NAN, 0.01, 1.0).is_err());
    }
}
