//! Reactive decision policy over an assessed threat picture.

use crate::threat::{RecommendedAction, ThreatEntity, ThreatLevel};
use crate::world::{normalize_kind, ItemStack};

/// Health above which the agent is willing to engage.
pub const FIGHT_MIN_HEALTH: f32 = 10.0;

/// Below this health a `high` threat means flee rather than shelter.
pub const SHELTER_MIN_HEALTH: f32 = 10.0;

/// Engaging more than this many external threats at once is never recommended.
pub const MAX_ENGAGED_THREATS: usize = 2;

pub fn is_ranged_weapon(item: &str) -> bool {
    matches!(normalize_kind(item).as_str(), "bow" | "crossbow" | "trident")
}

pub fn is_melee_weapon(item: &str) -> bool {
    let name = normalize_kind(item);
    name.ends_with("_sword") || name.ends_with("_axe") || name == "trident" || name == "mace"
}

/// What the agent can fight with, from its held item and inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Armament {
    pub has_weapon: bool,
    pub has_ranged_weapon: bool,
}

impl Armament {
    pub fn from_items<'a>(
        held: Option<&'a ItemStack>,
        inventory: impl IntoIterator<Item = &'a ItemStack>,
    ) -> Self {
        let mut armament = Armament::default();
        for item in held.into_iter().chain(inventory) {
            if item.count == 0 {
                continue;
            }
            let ranged = is_ranged_weapon(&item.name);
            armament.has_ranged_weapon |= ranged;
            armament.has_weapon |= ranged || is_melee_weapon(&item.name);
        }
        armament
    }
}

/// Pick the reactive action for an assessed tick.
///
/// Low health always means flee. Otherwise the agent fights only when armed, healthy, facing one
/// or two threats it can handle; a creeper is only handled with a ranged weapon.
pub fn recommend_action(
    level: ThreatLevel,
    health: f32,
    low_health_threshold: f32,
    melee_range: f32,
    threats: &[ThreatEntity],
    armament: Armament,
) -> RecommendedAction {
    if health <= low_health_threshold {
        return RecommendedAction::Flee;
    }

    let external: Vec<&ThreatEntity> = threats.iter().filter(|t| !t.is_self).collect();
    let all_fightable = external
        .iter()
        .all(|t| t.class().is_fightable(armament.has_ranged_weapon));
    let can_fight = armament.has_weapon
        && health > FIGHT_MIN_HEALTH
        && (1..=MAX_ENGAGED_THREATS).contains(&external.len())
        && all_fightable;

    match level {
        ThreatLevel::Critical => {
            if can_fight {
                RecommendedAction::Attack
            } else {
                RecommendedAction::Flee
            }
        }
        ThreatLevel::High => {
            if can_fight {
                RecommendedAction::Attack
            } else if health < SHELTER_MIN_HEALTH {
                RecommendedAction::Flee
            } else {
                RecommendedAction::FindShelter
            }
        }
        ThreatLevel::Medium => {
            let in_melee = external.iter().any(|t| t.distance <= melee_range);
            if can_fight && in_melee {
                RecommendedAction::Attack
            } else {
                RecommendedAction::FindShelter
            }
        }
        ThreatLevel::Low => RecommendedAction::None,
    }
}

#[cfg(test)]
mod tests {
    use ai_core::Vec3;

    use super::*;
    use crate::threat::ThreatKey;

    fn threat(kind: &str, id: u64, distance: f32) -> ThreatEntity {
        ThreatEntity {
            key: ThreatKey::new(kind, id),
            kind: kind.to_string(),
            position: Vec3::ZERO,
            last_seen_ms: 0,
            distance,
            has_line_of_sight: true,
            threat_score: 0.0,
            is_self: false,
        }
    }

    const SWORD: Armament = Armament {
        has_weapon: true,
        has_ranged_weapon: false,
    };
    const BOW: Armament = Armament {
        has_weapon: true,
        has_ranged_weapon: true,
    };

    #[test]
    fn weapon_detection() {
        let sword = ItemStack::new("minecraft:diamond_sword", 1);
        let bow = ItemStack::new("bow", 1);
        let bread = ItemStack::new("bread", 3);

        assert_eq!(Armament::from_items(None, [&bread]), Armament::default());
        assert_eq!(Armament::from_items(Some(&sword), [&bread]), SWORD);
        assert_eq!(Armament::from_items(None, [&bread, &bow]), BOW);

        let trident = ItemStack::new("trident", 1);
        assert_eq!(Armament::from_items(Some(&trident), std::iter::empty::<&ItemStack>()), BOW);
    }

    #[test]
    fn low_health_overrides_everything() {
        let threats = [threat("zombie", 1, 2.0)];
        let action = recommend_action(ThreatLevel::Low, 6.0, 6.0, 4.0, &threats, BOW);
        assert_eq!(action, RecommendedAction::Flee);
    }

    #[test]
    fn critical_attacks_when_fightable() {
        let threats = [threat("zombie", 1, 2.0)];
        assert_eq!(
            recommend_action(ThreatLevel::Critical, 20.0, 6.0, 4.0, &threats, SWORD),
            RecommendedAction::Attack
        );
        assert_eq!(
            recommend_action(ThreatLevel::Critical, 20.0, 6.0, 4.0, &threats, Armament::default()),
            RecommendedAction::Flee
        );
    }

    #[test]
    fn creeper_needs_ranged_weapon() {
        let threats = [threat("creeper", 1, 3.0)];
        assert_eq!(
            recommend_action(ThreatLevel::Critical, 20.0, 6.0, 4.0, &threats, SWORD),
            RecommendedAction::Flee
        );
        assert_eq!(
            recommend_action(ThreatLevel::Critical, 20.0, 6.0, 4.0, &threats, BOW),
            RecommendedAction::Attack
        );
    }

    #[test]
    fn outnumbered_agent_does_not_fight() {
        let threats = [
            threat("zombie", 1, 5.0),
            threat("zombie", 2, 6.0),
            threat("zombie", 3, 7.0),
        ];
        assert_eq!(
            recommend_action(ThreatLevel::High, 20.0, 6.0, 4.0, &threats, SWORD),
            RecommendedAction::FindShelter
        );
    }

    #[test]
    fn high_threat_while_hurt_means_flee() {
        let threats = [threat("zombie", 1, 5.0)];
        assert_eq!(
            recommend_action(ThreatLevel::High, 9.0, 6.0, 4.0, &threats, SWORD),
            RecommendedAction::Flee
        );
        // Health exactly 10 is not enough to fight but not low enough to flee.
        assert_eq!(
            recommend_action(ThreatLevel::High, 10.0, 6.0, 4.0, &threats, SWORD),
            RecommendedAction::FindShelter
        );
    }

    #[test]
    fn medium_attacks_only_in_melee_range() {
        let far = [threat("zombie", 1, 8.0)];
        let near = [threat("zombie", 1, 4.0)];
        assert_eq!(
            recommend_action(ThreatLevel::Medium, 20.0, 6.0, 4.0, &far, SWORD),
            RecommendedAction::FindShelter
        );
        assert_eq!(
            recommend_action(ThreatLevel::Medium, 20.0, 6.0, 4.0, &near, SWORD),
            RecommendedAction::Attack
        );
    }

    #[test]
    fn no_external_threats_never_attacks() {
        assert_eq!(
            recommend_action(ThreatLevel::Medium, 15.0, 6.0, 4.0, &[], BOW),
            RecommendedAction::FindShelter
        );
        assert_eq!(
            recommend_action(ThreatLevel::Low, 15.0, 6.0, 4.0, &[], BOW),
            RecommendedAction::None
        );
    }
}
