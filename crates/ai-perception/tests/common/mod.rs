#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use ai_core::{ManualClock, Vec3};
use ai_perception::{
    AgentSnapshot, HostilityClassifier, ItemStack, KindListClassifier, LineOfSight, LosQuery,
    ObservedEntity, PerceptionConfig, PerceptionError, ThreatPerceptionService,
};
use async_trait::async_trait;

/// Visibility engine with a scripted answer.
#[derive(Debug, Default)]
pub struct ScriptedSight {
    pub visible: AtomicBool,
    pub fail: AtomicBool,
    pub delay_ms: AtomicU64,
    pub calls: AtomicUsize,
}

impl ScriptedSight {
    pub fn visible(visible: bool) -> Self {
        let sight = Self::default();
        sight.visible.store(visible, Ordering::SeqCst);
        sight
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LineOfSight for ScriptedSight {
    async fn has_line_of_sight(
        &self,
        _origin: Vec3,
        _target: Vec3,
        _query: &LosQuery,
    ) -> Result<bool, PerceptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(PerceptionError::LineOfSight("engine offline".to_string()));
        }
        Ok(self.visible.load(Ordering::SeqCst))
    }
}

pub struct FailingClassifier;

impl HostilityClassifier for FailingClassifier {
    fn is_hostile(&self, _entity: &ObservedEntity) -> Result<bool, PerceptionError> {
        Err(PerceptionError::Classifier("model not loaded".to_string()))
    }
}

pub struct PanickingClassifier;

impl HostilityClassifier for PanickingClassifier {
    fn is_hostile(&self, _entity: &ObservedEntity) -> Result<bool, PerceptionError> {
        panic!("classifier bug")
    }
}

pub struct Fixture {
    pub agent: Arc<RwLock<AgentSnapshot>>,
    pub sight: Arc<ScriptedSight>,
    pub clock: ManualClock,
    pub service: ThreatPerceptionService,
}

impl Fixture {
    pub fn new(sight: ScriptedSight) -> Self {
        Self::with(PerceptionConfig::default(), sight, Arc::new(KindListClassifier::default()))
    }

    pub fn with(
        config: PerceptionConfig,
        sight: ScriptedSight,
        classifier: Arc<dyn HostilityClassifier>,
    ) -> Self {
        let agent = Arc::new(RwLock::new(AgentSnapshot::default()));
        let sight = Arc::new(sight);
        let clock = ManualClock::new(10_000);
        let service = ThreatPerceptionService::new(
            config,
            agent.clone(),
            classifier,
            sight.clone(),
            Arc::new(clock.clone()),
        );
        Self {
            agent,
            sight,
            clock,
            service,
        }
    }

    pub fn set_health(&self, health: f32) {
        self.agent.write().unwrap().health = Some(health);
    }

    pub fn hold(&self, item: &str) {
        self.agent.write().unwrap().held_item = Some(ItemStack::new(item, 1));
    }

    pub fn carry(&self, item: &str) {
        self.agent
            .write()
            .unwrap()
            .inventory
            .push(ItemStack::new(item, 1));
    }

    /// Place an entity `distance` blocks in front of the agent (agent faces -Z from the origin).
    pub fn spawn(&self, id: u64, kind: &str, distance: f32) {
        self.spawn_at(id, kind, Vec3::new(0.0, 0.0, -distance));
    }

    pub fn spawn_at(&self, id: u64, kind: &str, position: Vec3) {
        self.agent
            .write()
            .unwrap()
            .entities
            .push(ObservedEntity::new(id, kind, position));
    }

    pub fn clear_entities(&self) {
        self.agent.write().unwrap().entities.clear();
    }
}
