use serde::{Deserialize, Serialize};

use crate::{LosAlgorithm, ThrottleConfig};

/// Perception tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Entities farther than this (blocks) are never considered.
    pub max_detection_radius: f32,

    /// When `false` every hostile candidate counts as visible.
    pub line_of_sight_required: bool,

    /// How long a confirmed sighting is trusted without re-verification.
    pub persistence_window_ms: u64,

    /// Budget for a single visibility query. `0` disables the timeout.
    pub raycast_timeout_ms: u64,

    /// Full view-cone angle used for visibility queries.
    pub field_of_view_degrees: f32,

    /// Hostiles at or inside this distance are "felt" without line of sight.
    pub melee_range: f32,

    /// Health at or below which the agent counts as critically hurt.
    pub low_health_threshold: f32,

    pub los_algorithm: LosAlgorithm,

    pub diagnostics: ThrottleConfig,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            max_detection_radius: 50.0,
            line_of_sight_required: true,
            persistence_window_ms: 5_000,
            raycast_timeout_ms: 100,
            field_of_view_degrees: 120.0,
            melee_range: 4.0,
            low_health_threshold: 6.0,
            los_algorithm: LosAlgorithm::Dda,
            diagnostics: ThrottleConfig::default(),
        }
    }
}
