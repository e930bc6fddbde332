use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use ai_core::{Clock, Vec3};
use futures::FutureExt;

use crate::error::{PerceptionError, Result};
use crate::los::{LineOfSight, LosQuery};
use crate::policy::{recommend_action, Armament};
use crate::threat::{ThreatAssessment, ThreatClass, ThreatEntity, ThreatKey, ThreatLevel};
use crate::world::{AgentState, HostilityClassifier};
use crate::{DiscardThrottle, PerceptionConfig};

/// Health of a fully healed agent, used to scale the self-threat.
const MAX_HEALTH: f32 = 20.0;

/// Aggregate cap when the only entry is the self-threat.
const SELF_ONLY_SCORE_CAP: f32 = 60.0;

const LOW_HEALTH_MULTIPLIER: f32 = 1.5;

/// Counters over the lifetime of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerceptionStats {
    pub ticks: u64,
    /// Ticks that ended in the safe default because of an internal failure.
    pub failed_ticks: u64,
    pub raycasts: u64,
    pub discarded: u64,
    /// Candidates accepted from memory without a visibility check.
    pub memory_hits: u64,
}

/// Per-tick threat assessment with short-term memory of confirmed sightings.
pub struct ThreatPerceptionService {
    config: PerceptionConfig,
    agent: Arc<dyn AgentState>,
    classifier: Arc<dyn HostilityClassifier>,
    los: Arc<dyn LineOfSight>,
    clock: Arc<dyn Clock>,
    known: HashMap<ThreatKey, ThreatEntity>,
    throttle: DiscardThrottle,
    stats: PerceptionStats,
}

impl ThreatPerceptionService {
    pub fn new(
        config: PerceptionConfig,
        agent: Arc<dyn AgentState>,
        classifier: Arc<dyn HostilityClassifier>,
        los: Arc<dyn LineOfSight>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let throttle = DiscardThrottle::new(config.diagnostics);
        Self {
            config,
            agent,
            classifier,
            los,
            clock,
            known: HashMap::new(),
            throttle,
            stats: PerceptionStats::default(),
        }
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn stats(&self) -> PerceptionStats {
        self.stats
    }

    pub fn throttle(&self) -> &DiscardThrottle {
        &self.throttle
    }

    /// Threats currently remembered, including ones past their window that were not cleaned up.
    pub fn known_threats(&self) -> impl Iterator<Item = &ThreatEntity> {
        self.known.values()
    }

    pub fn known_threat(&self, key: &ThreatKey) -> Option<&ThreatEntity> {
        self.known.get(key)
    }

    /// Assess the current tick.
    ///
    /// Never fails: internal errors (and panics in collaborators) produce
    /// [`ThreatAssessment::safe_default`].
    pub async fn assess_threats(&mut self) -> ThreatAssessment {
        self.stats.ticks += 1;

        let outcome = AssertUnwindSafe(self.try_assess_threats())
            .catch_unwind()
            .await
            .unwrap_or(Err(PerceptionError::Panicked));

        match outcome {
            Ok(assessment) => assessment,
            Err(err) => {
                self.stats.failed_ticks += 1;
                tracing::warn!(error = %err, "Threat assessment failed, reporting no threats");
                ThreatAssessment::safe_default()
            }
        }
    }

    async fn try_assess_threats(&mut self) -> Result<ThreatAssessment> {
        let now = self.clock.now_millis();
        let origin = self
            .agent
            .position()
            .ok_or(PerceptionError::MissingAgentState("position"))?;
        if !origin.is_finite() {
            return Err(PerceptionError::InvalidAgentState("position"));
        }
        let health = self
            .agent
            .health()
            .ok_or(PerceptionError::MissingAgentState("health"))?;
        if !health.is_finite() {
            return Err(PerceptionError::InvalidAgentState("health"));
        }

        let radius = self.config.max_detection_radius;
        let window = self.config.persistence_window_ms;
        let mut threats = Vec::new();

        for entity in self.agent.nearby_entities() {
            if !entity.position.is_finite() {
                return Err(PerceptionError::MalformedEntity {
                    id: entity.id,
                    kind: entity.kind,
                    reason: "non-finite position".to_string(),
                });
            }

            let distance = origin.distance(entity.position);
            if distance > radius || !self.classifier.is_hostile(&entity)? {
                continue;
            }

            let key = ThreatKey::new(&entity.kind, entity.id);
            let score = self.calculate_contextual_threat_level(&entity.kind, distance, health);

            if let Some(known) = self.known.get_mut(&key) {
                if now.saturating_sub(known.last_seen_ms) < window {
                    known.position = entity.position;
                    known.distance = distance;
                    known.threat_score = score;
                    self.stats.memory_hits += 1;
                    threats.push(known.clone());
                    continue;
                }
            }

            let visible = if distance <= self.config.melee_range || !self.config.line_of_sight_required
            {
                true
            } else {
                self.stats.raycasts += 1;
                self.check_line_of_sight(entity.position).await
            };

            if !visible {
                self.stats.discarded += 1;
                self.throttle.record(&key, distance, now);
                continue;
            }

            tracing::debug!(threat = %key, distance, score, "Threat confirmed");
            let threat = ThreatEntity {
                key: key.clone(),
                kind: key.kind.clone(),
                position: entity.position,
                last_seen_ms: now,
                distance,
                has_line_of_sight: true,
                threat_score: score,
                is_self: false,
            };
            self.known.insert(key, threat.clone());
            threats.push(threat);
        }

        let low_health = health <= self.config.low_health_threshold;
        if low_health {
            let score = ((MAX_HEALTH - health) / MAX_HEALTH).max(0.0) * 100.0;
            threats.push(ThreatEntity::self_threat(origin, now, score));
        }

        let external = threats.iter().filter(|t| !t.is_self).count();
        let mut overall_score = threats
            .iter()
            .map(|t| t.threat_score)
            .sum::<f32>()
            .clamp(0.0, 100.0);
        if external == 0 && low_health {
            // Nothing external to flee from: self-damage alone never reaches the top tier.
            overall_score = overall_score.min(SELF_ONLY_SCORE_CAP);
        }
        let level = ThreatLevel::from_score(overall_score);

        let held = self.agent.held_item();
        let inventory = self.agent.inventory();
        let armament = Armament::from_items(held.as_ref(), &inventory);
        let action = recommend_action(
            level,
            health,
            self.config.low_health_threshold,
            self.config.melee_range,
            &threats,
            armament,
        );

        if level > ThreatLevel::Low {
            tracing::debug!(
                threats = threats.len(),
                score = overall_score,
                %level,
                %action,
                "Threat assessment"
            );
        }

        Ok(ThreatAssessment {
            threats,
            overall_threat_level: level,
            recommended_action: action,
            overall_score,
        })
    }

    /// Whether `target` is visible from the agent's eyes within the configured view cone.
    ///
    /// Fails closed: engine errors, timeouts and unknown agent position all mean "not visible".
    /// The time budget needs a Tokio runtime with timers enabled; under other executors the query
    /// runs unbounded.
    /// Engines that never yield cannot be interrupted by the budget either.
    pub async fn check_line_of_sight(&self, target: Vec3) -> bool {
        let Some(position) = self.agent.position() else {
            return false;
        };
        let eye_height = self.agent.eye_height();
        let origin = position + Vec3::Y * eye_height;
        let query = LosQuery {
            // Candidates are filtered by distance from the feet; the ray starts at the eyes.
            max_distance: self.config.max_detection_radius + eye_height.abs(),
            orientation: self.agent.orientation(),
            fov_degrees: self.config.field_of_view_degrees,
            require_fov: true,
            algorithm: self.config.los_algorithm,
            assume_blocked_on_error: true,
        };

        let check = self.los.has_line_of_sight(origin, target, &query);
        let budget_ms = self.config.raycast_timeout_ms;
        let result = if budget_ms == 0 {
            check.await
        } else if tokio::runtime::Handle::try_current().is_err() {
            tracing::debug!(
                timeout_ms = budget_ms,
                "No Tokio runtime, line-of-sight query runs without a time budget"
            );
            check.await
        } else {
            match tokio::time::timeout(Duration::from_millis(budget_ms), check).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!(timeout_ms = budget_ms, "Line-of-sight query timed out");
                    return false;
                }
            }
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(error = %err, "Line-of-sight query failed");
            false
        })
    }

    /// Score one hostile by class, proximity and the agent's health.
    pub fn calculate_contextual_threat_level(&self, kind: &str, distance: f32, health: f32) -> f32 {
        let base = ThreatClass::from_kind(kind).base_score();
        let radius = self.config.max_detection_radius;
        let distance_factor = if radius > 0.0 {
            (1.0 - distance / radius).max(0.0)
        } else {
            0.0
        };
        let health_factor = if health <= self.config.low_health_threshold {
            LOW_HEALTH_MULTIPLIER
        } else {
            1.0
        };
        base * distance_factor * health_factor
    }

    /// Forget sightings older than the persistence window. Returns how many were removed.
    ///
    /// Also closes an elapsed discard-summary window, so a burst of discards that has stopped is
    /// still summarized.
    pub fn cleanup_old_threats(&mut self) -> usize {
        let now = self.clock.now_millis();
        self.throttle.flush(now);
        let window = self.config.persistence_window_ms;
        let before = self.known.len();
        self.known
            .retain(|_, threat| now.saturating_sub(threat.last_seen_ms) <= window);
        let removed = before - self.known.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.known.len(), "Forgot stale threats");
        }
        removed
    }
}
