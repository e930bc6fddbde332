use std::collections::BTreeSet;
use std::sync::RwLock;

use ai_core::{Orientation, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Standing eye height of a player-sized agent.
pub const DEFAULT_EYE_HEIGHT: f32 = 1.62;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemStack {
    pub name: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// An entity reported by the game client near the agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservedEntity {
    pub id: u64,
    /// Classification as reported by the game, e.g. `zombie` or `minecraft:creeper`.
    pub kind: String,
    pub position: Vec3,
    pub held_item: Option<ItemStack>,
}

impl ObservedEntity {
    pub fn new(id: u64, kind: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            kind: kind.into(),
            position,
            held_item: None,
        }
    }
}

/// Read-only view of the agent, provided by the game connection layer.
///
/// `None` means the value is not known yet (e.g. before spawn); perception refuses to guess.
pub trait AgentState: Send + Sync {
    fn position(&self) -> Option<Vec3>;

    fn eye_height(&self) -> f32 {
        DEFAULT_EYE_HEIGHT
    }

    fn orientation(&self) -> Orientation;

    fn health(&self) -> Option<f32>;

    fn held_item(&self) -> Option<ItemStack>;

    fn inventory(&self) -> Vec<ItemStack>;

    fn nearby_entities(&self) -> Vec<ObservedEntity>;
}

/// Plain-data agent state, useful for simulations and tests.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentSnapshot {
    pub position: Option<Vec3>,
    pub eye_height: f32,
    pub orientation: Orientation,
    pub health: Option<f32>,
    pub held_item: Option<ItemStack>,
    pub inventory: Vec<ItemStack>,
    pub entities: Vec<ObservedEntity>,
}

impl Default for AgentSnapshot {
    fn default() -> Self {
        Self {
            position: Some(Vec3::ZERO),
            eye_height: DEFAULT_EYE_HEIGHT,
            orientation: Orientation::default(),
            health: Some(20.0),
            held_item: None,
            inventory: Vec::new(),
            entities: Vec::new(),
        }
    }
}

impl AgentState for AgentSnapshot {
    fn position(&self) -> Option<Vec3> {
        self.position
    }

    fn eye_height(&self) -> f32 {
        self.eye_height
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn health(&self) -> Option<f32> {
        self.health
    }

    fn held_item(&self) -> Option<ItemStack> {
        self.held_item.clone()
    }

    fn inventory(&self) -> Vec<ItemStack> {
        self.inventory.clone()
    }

    fn nearby_entities(&self) -> Vec<ObservedEntity> {
        self.entities.clone()
    }
}

/// Shared, mutable agent state (the connection layer writes, perception reads).
impl<T: AgentState> AgentState for RwLock<T> {
    fn position(&self) -> Option<Vec3> {
        self.read().unwrap_or_else(|e| e.into_inner()).position()
    }

    fn eye_height(&self) -> f32 {
        self.read().unwrap_or_else(|e| e.into_inner()).eye_height()
    }

    fn orientation(&self) -> Orientation {
        self.read().unwrap_or_else(|e| e.into_inner()).orientation()
    }

    fn health(&self) -> Option<f32> {
        self.read().unwrap_or_else(|e| e.into_inner()).health()
    }

    fn held_item(&self) -> Option<ItemStack> {
        self.read().unwrap_or_else(|e| e.into_inner()).held_item()
    }

    fn inventory(&self) -> Vec<ItemStack> {
        self.read().unwrap_or_else(|e| e.into_inner()).inventory()
    }

    fn nearby_entities(&self) -> Vec<ObservedEntity> {
        self.read()
            .unwrap_or_else(|e| e.into_inner())
            .nearby_entities()
    }
}

pub trait HostilityClassifier: Send + Sync {
    fn is_hostile(&self, entity: &ObservedEntity) -> Result<bool>;
}

/// Classifies by entity kind against a fixed set of hostile kinds.
#[derive(Debug, Clone)]
pub struct KindListClassifier {
    hostile: BTreeSet<String>,
}

impl KindListClassifier {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hostile: kinds
                .into_iter()
                .map(|k| normalize_kind(k.as_ref()))
                .collect(),
        }
    }
}

impl Default for KindListClassifier {
    fn default() -> Self {
        Self::new([
            "blaze",
            "cave_spider",
            "creeper",
            "drowned",
            "elder_guardian",
            "enderman",
            "endermite",
            "evoker",
            "ghast",
            "guardian",
            "hoglin",
            "husk",
            "magma_cube",
            "phantom",
            "piglin_brute",
            "pillager",
            "ravager",
            "shulker",
            "silverfish",
            "skeleton",
            "slime",
            "spider",
            "stray",
            "vex",
            "vindicator",
            "warden",
            "witch",
            "wither_skeleton",
            "zoglin",
            "zombie",
            "zombie_villager",
        ])
    }
}

impl HostilityClassifier for KindListClassifier {
    fn is_hostile(&self, entity: &ObservedEntity) -> Result<bool> {
        Ok(self.hostile.contains(&normalize_kind(&entity.kind)))
    }
}

/// Lowercase kind without a `namespace:` prefix.
pub fn normalize_kind(kind: &str) -> String {
    let kind = kind.trim();
    let bare = kind.rsplit_once(':').map(|(_, name)| name).unwrap_or(kind);
    bare.to_ascii_lowercase()
}
