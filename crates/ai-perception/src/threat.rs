use core::fmt;

use ai_core::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::world::normalize_kind;

/// Kind used for the synthesized self-threat entry.
pub const SELF_THREAT_KIND: &str = "self";

/// Identity of a tracked threat: entity kind plus instance id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThreatKey {
    pub kind: String,
    pub id: u64,
}

impl ThreatKey {
    pub fn new(kind: &str, id: u64) -> Self {
        Self {
            kind: normalize_kind(kind),
            id,
        }
    }
}

impl fmt::Display for ThreatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Danger classes with their base scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThreatClass {
    /// Explodes; area damage at close range.
    Creeper,
    /// Teleports, hard to disengage from.
    Enderman,
    /// Ranged poison.
    Witch,
    /// Common melee mobs.
    Zombie,
    Other,
}

impl ThreatClass {
    pub fn from_kind(kind: &str) -> Self {
        match normalize_kind(kind).as_str() {
            "creeper" => ThreatClass::Creeper,
            "enderman" => ThreatClass::Enderman,
            "witch" => ThreatClass::Witch,
            "zombie" | "husk" | "drowned" | "zombie_villager" => ThreatClass::Zombie,
            _ => ThreatClass::Other,
        }
    }

    pub fn base_score(self) -> f32 {
        match self {
            ThreatClass::Creeper => 90.0,
            ThreatClass::Enderman => 80.0,
            ThreatClass::Witch => 70.0,
            ThreatClass::Zombie => 60.0,
            ThreatClass::Other => 50.0,
        }
    }

    /// Whether engaging is sensible with the given armament.
    pub fn is_fightable(self, has_ranged_weapon: bool) -> bool {
        match self {
            ThreatClass::Creeper => has_ranged_weapon,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThreatEntity {
    pub key: ThreatKey,
    pub kind: String,
    pub position: Vec3,
    pub last_seen_ms: u64,
    pub distance: f32,
    pub has_line_of_sight: bool,
    pub threat_score: f32,
    /// Synthesized entry for the agent's own vulnerability.
    pub is_self: bool,
}

impl ThreatEntity {
    pub fn class(&self) -> ThreatClass {
        ThreatClass::from_kind(&self.kind)
    }

    pub(crate) fn self_threat(position: Vec3, now_ms: u64, score: f32) -> Self {
        Self {
            key: ThreatKey::new(SELF_THREAT_KIND, 0),
            kind: SELF_THREAT_KIND.to_string(),
            position,
            last_seen_ms: now_ms,
            distance: 0.0,
            has_line_of_sight: true,
            threat_score: score,
            is_self: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThreatLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn from_score(score: f32) -> Self {
        if score > 80.0 {
            ThreatLevel::Critical
        } else if score > 60.0 {
            ThreatLevel::High
        } else if score > 30.0 {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reactive action suggested to the orchestrator. How to carry it out is not decided here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RecommendedAction {
    #[default]
    None,
    Attack,
    Flee,
    FindShelter,
}

impl RecommendedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendedAction::None => "none",
            RecommendedAction::Attack => "attack",
            RecommendedAction::Flee => "flee",
            RecommendedAction::FindShelter => "find_shelter",
        }
    }

    /// Whether carrying out the action needs movement authority.
    pub fn needs_movement(self) -> bool {
        !matches!(self, RecommendedAction::None)
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one perception tick.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThreatAssessment {
    pub threats: Vec<ThreatEntity>,
    pub overall_threat_level: ThreatLevel,
    pub recommended_action: RecommendedAction,
    pub overall_score: f32,
}

impl ThreatAssessment {
    /// No threats, level low, action none.
    pub fn safe_default() -> Self {
        Self::default()
    }

    pub fn external_threats(&self) -> impl Iterator<Item = &ThreatEntity> {
        self.threats.iter().filter(|t| !t.is_self)
    }
}
