use ai_core::{Orientation, Vec3};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Smallest sampling step an engine will walk with; finer requests are coarsened to this.
pub const MIN_SAMPLE_STEP: f32 = 0.01;

/// Voxel traversal strategy for visibility queries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosAlgorithm {
    /// Exact grid traversal (Amanatides & Woo).
    #[default]
    Dda,
    /// Fixed-step sampling along the ray. `step` is clamped to at least [`MIN_SAMPLE_STEP`].
    Sampled { step: f32 },
}

/// Parameters of a single visibility query.
#[derive(Debug, Clone, PartialEq)]
pub struct LosQuery {
    pub max_distance: f32,
    pub orientation: Orientation,
    pub fov_degrees: f32,
    pub require_fov: bool,
    pub algorithm: LosAlgorithm,
    /// Report "blocked" instead of an error when the query cannot be evaluated.
    pub assume_blocked_on_error: bool,
}

/// Visibility/raycast engine.
#[async_trait]
pub trait LineOfSight: Send + Sync {
    async fn has_line_of_sight(&self, origin: Vec3, target: Vec3, query: &LosQuery)
        -> Result<bool>;
}
