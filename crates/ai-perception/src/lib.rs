//! Threat perception for autonomous game agents.
//!
//! Each tick [`ThreatPerceptionService::assess_threats`] turns the hostile entities around the
//! agent into a bounded danger model:
//!
//! 1. spatial filter (detection radius) and hostility classification
//! 2. short-term memory of confirmed sightings, trusted for a persistence window
//! 3. line-of-sight gating with a melee-range bypass
//! 4. contextual scoring (classification, proximity, agent health)
//! 5. an ordinal [`ThreatLevel`] and a [`RecommendedAction`]
//!
//! The service fails closed: any error yields an empty assessment with action `none`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod los;
pub mod policy;
pub mod service;
pub mod threat;
pub mod voxel;
pub mod world;

pub use config::PerceptionConfig;
pub use diagnostics::{DiscardLog, DiscardSummary, DiscardThrottle, ThrottleConfig};
pub use error::PerceptionError;
pub use los::{LineOfSight, LosAlgorithm, LosQuery, MIN_SAMPLE_STEP};
pub use policy::{recommend_action, Armament};
pub use service::{PerceptionStats, ThreatPerceptionService};
pub use threat::{
    RecommendedAction, ThreatAssessment, ThreatClass, ThreatEntity, ThreatKey, ThreatLevel,
};
pub use voxel::{SparseVoxelGrid, VoxelGrid, VoxelLineOfSight};
pub use world::{
    AgentSnapshot, AgentState, HostilityClassifier, ItemStack, KindListClassifier, ObservedEntity,
};
