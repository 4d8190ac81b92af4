use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Geometry, imputation and colouring parameters for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemapConfig {
    pub width: f64,
    pub height: f64,
    /// Margin between sibling boxes.
    pub margin_box: f64,
    /// Padding between a box border and its content.
    pub padding_box: f64,
    /// Padding around the root content.
    pub root_padding: f64,
    pub empty_leaf_size: f64,
    pub empty_leaf_heat: f64,
    /// `none`, `balanced`, or a palette name such as `RdBu`.
    pub color_scheme: String,
    /// `white` or `black`.
    pub color_border: String,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            width: 1028.0,
            height: 640.0,
            margin_box: 4.0,
            padding_box: 4.0,
            root_padding: 32.0,
            empty_leaf_size: 1.0,
            empty_leaf_heat: 0.5,
            color_scheme: "balanced".to_string(),
            color_border: "white".to_string(),
        }
    }
}

impl TreemapConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        non_negative("margin_box", self.margin_box)?;
        non_negative("padding_box", self.padding_box)?;
        non_negative("root_padding", self.root_padding)?;
        non_negative("empty_leaf_size", self.empty_leaf_size)?;
        if !self.empty_leaf_heat.is_finite() {
            return Err(ConfigError::Invalid {
                field: "empty_leaf_heat",
                expected: "finite",
                value: self.empty_leaf_heat,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            expected: "a positive number",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            expected: "a non-negative number",
            value,
        })
    }
}
