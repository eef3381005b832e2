use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{CounterError, Result};

/// Counting parameters fixed at session construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub counting_line_y: i32,
    pub min_area: f64,
    pub max_area: f64,
    pub distance_threshold: f64,
    pub aspect_ratio_range: (f64, f64),
    pub background: BackgroundConfig,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            counting_line_y: 250,
            min_area: 1000.0,
            max_area: 50000.0,
            distance_threshold: 50.0,
            aspect_ratio_range: (0.3, 3.0),
            background: BackgroundConfig::default(),
        }
    }
}

impl CounterConfig {
    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: CounterConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_area >= 0.0 && self.min_area <= self.max_area) {
            return Err(CounterError::InvalidConfig(format!(
                "area bounds must satisfy 0 <= min_area <= max_area, got {}..{}",
                self.min_area, self.max_area
            )));
        }
        let (min_ratio, max_ratio) = self.aspect_ratio_range;
        if !(min_ratio >= 0.0 && min_ratio <= max_ratio) {
            return Err(CounterError::InvalidConfig(format!(
                "aspect ratio range must satisfy 0 <= min <= max, got ({}, {})",
                min_ratio, max_ratio
            )));
        }
        if !(self.distance_threshold > 0.0) {
            return Err(CounterError::InvalidConfig(format!(
                "distance_threshold must be positive, got {}",
                self.distance_threshold
            )));
        }
        self.background.validate()
    }
}

/// Parameters of the adaptive background model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Number of frames the model effectively remembers
    pub history: u32,
    /// Squared Mahalanobis distance above which a pixel is foreground
    pub var_threshold: f32,
    pub detect_shadows: bool,
    /// Fixed learning rate in (0, 1]; `None` adapts it to the frame count
    pub learning_rate: Option<f32>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 50.0,
            detect_shadows: true,
            learning_rate: None,
        }
    }
}

impl BackgroundConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history == 0 {
            return Err(CounterError::InvalidConfig(
                "background history must be at least one frame".to_string(),
            ));
        }
        if !(self.var_threshold > 0.0) {
            return Err(CounterError::InvalidConfig(format!(
                "var_threshold must be positive, got {}",
                self.var_threshold
            )));
        }
        if let Some(rate) = self.learning_rate {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(CounterError::InvalidConfig(format!(
                    "learning_rate must be in (0, 1], got {}",
                    rate
                )));
            }
        }
        Ok(())
    }
}
