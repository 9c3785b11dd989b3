use std::{env, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{
    animation::Canvas,
    error::{ForestryErr, Result},
};

/// Environment variable holding the path of the JSON config file.
pub const CONFIG_ENV: &str = "FORESTRY_ML_CONFIG";

/// Runtime knobs of the demo. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Seed for the forest noise and particle speeds; OS-seeded when absent.
    pub seed: Option<u64>,
    pub knn_delay_ms: u64,
    pub neural_network_delay_ms: u64,
    pub gradient_boosting_delay_ms: u64,
    pub frame_interval_ms: u64,
    pub canvas: Canvas,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            knn_delay_ms: 1500,
            neural_network_delay_ms: 2000,
            gradient_boosting_delay_ms: 1500,
            frame_interval_ms: 16,
            canvas: Canvas::default(),
        }
    }
}

impl AppConfig {
    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON for this
    /// struct, or fails [`AppConfig::validate`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// # Errors
    /// Same as [`AppConfig::load`], minus the file access.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `FORESTRY_ML_CONFIG`, or the defaults when unset.
    ///
    /// # Errors
    /// Returns an error if the variable is set and the file cannot be loaded.
    pub fn from_env() -> Result<Self> {
        match env::var(CONFIG_ENV) {
            Ok(path) => {
                log::info!("loading config from {path}");
                Self::load(path)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// # Errors
    /// Returns `ForestryErr::InvalidConfig` on a zero frame interval or a
    /// non-positive canvas dimension.
    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(ForestryErr::InvalidConfig(
                "frame_interval_ms must be greater than 0".into(),
            ));
        }

        let Canvas { width, height } = self.canvas;
        if !(width > 0.0 && height > 0.0) {
            return Err(ForestryErr::InvalidConfig(format!(
                "canvas must have a positive size, got {width}x{height}"
            )));
        }

        Ok(())
    }

    pub fn knn_delay(&self) -> Duration {
        Duration::from_millis(self.knn_delay_ms)
    }

    pub fn neural_network_delay(&self) -> Duration {
        Duration::from_millis(self.neural_network_delay_ms)
    }

    pub fn gradient_boosting_delay(&self) -> Duration {
        Duration::from_millis(self.gradient_boosting_delay_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config =
            AppConfig::from_json(r#"{ "seed": 9, "knn_delay_ms": 0, "canvas": { "width": 800, "height": 400 } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.knn_delay(), Duration::ZERO);
        assert_eq!(config.neural_network_delay(), Duration::from_millis(2000));
        assert_eq!(config.canvas.width, 800.0);
    }

    #[test]
    fn zero_frame_interval_is_rejected() {
        let err = AppConfig::from_json(r#"{ "frame_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ForestryErr::InvalidConfig(_)));
    }

    #[test]
    fn degenerate_canvas_is_rejected() {
        let err =
            AppConfig::from_json(r#"{ "canvas": { "width": 0, "height": 300 } }"#).unwrap_err();
        assert!(matches!(err, ForestryErr::InvalidConfig(_)));
    }

    #[test]
    fn unknown_keys_are_json_errors() {
        let err = AppConfig::from_json(r#"{ "colour": "green" }"#).unwrap_err();
        assert!(matches!(err, ForestryErr::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load("/nonexistent/forestry-ml.json").unwrap_err();
        assert!(matches!(err, ForestryErr::Io(_)));
    }
}
