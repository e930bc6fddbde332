//! Reference line-of-sight engine over a block grid.

use std::collections::HashSet;

use ai_core::Vec3;
use async_trait::async_trait;

use crate::error::{PerceptionError, Result};
use crate::los::{LineOfSight, LosAlgorithm, LosQuery, MIN_SAMPLE_STEP};

/// Default sampling step when a sampled query carries a non-positive step.
const DEFAULT_SAMPLE_STEP: f32 = 0.25;

/// Upper bound on samples per ray, whatever the distance and step.
const MAX_SAMPLES: u32 = 1 << 16;

pub trait VoxelGrid: Send + Sync {
    /// Whether the unit voxel at `(x, y, z)` blocks sight.
    fn is_opaque(&self, x: i32, y: i32, z: i32) -> bool;
}

/// In-memory set of opaque voxels. Everything else is air.
#[derive(Debug, Clone, Default)]
pub struct SparseVoxelGrid {
    solid: HashSet<[i32; 3]>,
}

impl SparseVoxelGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_opaque(&mut self, x: i32, y: i32, z: i32, opaque: bool) {
        if opaque {
            self.solid.insert([x, y, z]);
        } else {
            self.solid.remove(&[x, y, z]);
        }
    }

    /// Fill the inclusive box between two corners.
    pub fn fill(&mut self, min: [i32; 3], max: [i32; 3]) {
        for x in min[0]..=max[0] {
            for y in min[1]..=max[1] {
                for z in min[2]..=max[2] {
                    self.solid.insert([x, y, z]);
                }
            }
        }
    }
}

impl VoxelGrid for SparseVoxelGrid {
    fn is_opaque(&self, x: i32, y: i32, z: i32) -> bool {
        self.solid.contains(&[x, y, z])
    }
}

/// Line of sight by walking the voxels between two points.
///
/// The voxels containing the endpoints are never tested: the observer's eye and the target
/// stand in them.
#[derive(Debug, Clone, Default)]
pub struct VoxelLineOfSight<G> {
    grid: G,
}

impl<G: VoxelGrid> VoxelLineOfSight<G> {
    pub fn new(grid: G) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn trace(&self, origin: Vec3, target: Vec3, query: &LosQuery) -> Result<bool> {
        if !origin.is_finite() || !target.is_finite() {
            if query.assume_blocked_on_error {
                return Ok(false);
            }
            return Err(PerceptionError::LineOfSight(
                "non-finite ray endpoint".to_string(),
            ));
        }

        let delta = target - origin;
        if delta.length() > query.max_distance {
            return Ok(false);
        }
        if query.require_fov && !query.orientation.contains(delta, query.fov_degrees) {
            return Ok(false);
        }

        Ok(match query.algorithm {
            LosAlgorithm::Dda => self.walk_dda(origin, target),
            LosAlgorithm::Sampled { step } => self.walk_sampled(origin, target, step),
        })
    }

    fn walk_dda(&self, origin: Vec3, target: Vec3) -> bool {
        let start = voxel_of(origin);
        let end = voxel_of(target);
        let o = [origin.x, origin.y, origin.z];
        let d = [target.x - origin.x, target.y - origin.y, target.z - origin.z];

        let mut cell = start;
        let mut step = [0i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];
        for axis in 0..3 {
            if d[axis] > 0.0 {
                step[axis] = 1;
                t_max[axis] = ((cell[axis] as f32 + 1.0) - o[axis]) / d[axis];
                t_delta[axis] = 1.0 / d[axis];
            } else if d[axis] < 0.0 {
                step[axis] = -1;
                t_max[axis] = (o[axis] - cell[axis] as f32) / -d[axis];
                t_delta[axis] = 1.0 / -d[axis];
            }
        }

        let max_steps: i32 = (0..3).map(|a| (end[a] - start[a]).abs()).sum();
        for _ in 0..max_steps {
            let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };
            if t_max[axis] > 1.0 {
                break;
            }
            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];

            if cell == end {
                return true;
            }
            if self.grid.is_opaque(cell[0], cell[1], cell[2]) {
                return false;
            }
        }
        true
    }

    fn walk_sampled(&self, origin: Vec3, target: Vec3, step: f32) -> bool {
        let step = if step.is_finite() && step > 0.0 {
            step.max(MIN_SAMPLE_STEP)
        } else {
            DEFAULT_SAMPLE_STEP
        };
        let start = voxel_of(origin);
        let end = voxel_of(target);
        let delta = target - origin;
        let samples = ((delta.length() / step).ceil().max(1.0) as u32).min(MAX_SAMPLES);

        for i in 1..samples {
            let cell = voxel_of(origin + delta * (i as f32 / samples as f32));
            if cell == start || cell == end {
                continue;
            }
            if self.grid.is_opaque(cell[0], cell[1], cell[2]) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl<G: VoxelGrid> LineOfSight for VoxelLineOfSight<G> {
    async fn has_line_of_sight(
        &self,
        origin: Vec3,
        target: Vec3,
        query: &LosQuery,
    ) -> Result<bool> {
        self.trace(origin, target, query)
    }
}

fn voxel_of(p: Vec3) -> [i32; 3] {
    [p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32]
}
