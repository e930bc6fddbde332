//! Configuration loading and management.

use std::path::Path;

use ai_lease::LeaseConfig;
use ai_perception::{LosAlgorithm, PerceptionConfig, MIN_SAMPLE_STEP};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Project-relative location of the configuration file.
pub const CONFIG_PATH: &str = ".ai/config.yaml";

/// Decision-support configuration, loaded from `.ai/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Config version
    pub version: Option<String>,

    /// Movement lease settings
    pub lease: LeaseConfig,

    /// Threat perception settings
    pub perception: PerceptionConfig,
}

impl AiConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from project root, falling back to defaults when no file exists.
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_PATH);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        let p = &self.perception;
        anyhow::ensure!(
            p.max_detection_radius.is_finite() && p.max_detection_radius > 0.0,
            "perception.max_detection_radius must be a positive number"
        );
        anyhow::ensure!(
            p.melee_range.is_finite() && p.melee_range >= 0.0,
            "perception.melee_range must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=360.0).contains(&p.field_of_view_degrees),
            "perception.field_of_view_degrees must be within 0..=360"
        );
        if let LosAlgorithm::Sampled { step } = p.los_algorithm {
            anyhow::ensure!(
                step.is_finite() && step >= MIN_SAMPLE_STEP,
                "perception.los_algorithm sampled step must be at least {MIN_SAMPLE_STEP}, got {step}"
            );
        }
        Ok(())
    }
}
