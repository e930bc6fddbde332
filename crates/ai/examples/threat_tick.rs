//! Simulated agent walking toward a walled courtyard while mobs close in.
//!
//! Run with `RUST_LOG=debug cargo run -p ai --example threat_tick` to see perception and lease
//! decisions.

use std::path::Path;
use std::sync::{Arc, RwLock};

use ai::core::{Clock, ManualClock, Orientation, Vec3};
use ai::lease::{LeaseManager, LeaseOptions, LeasePriority};
use ai::perception::{
    AgentSnapshot, ItemStack, KindListClassifier, ObservedEntity, SparseVoxelGrid,
    ThreatPerceptionService, VoxelLineOfSight,
};
use ai::AiConfig;
use tracing_subscriber::{fmt, EnvFilter};

const TICK_MS: u64 = 250;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = AiConfig::load_from_project(Path::new("."))?;
    let clock = Arc::new(ManualClock::new(0));

    let mut grid = SparseVoxelGrid::new();
    grid.fill([-6, 0, -8], [6, 2, -8]);

    let agent = Arc::new(RwLock::new(AgentSnapshot {
        position: Some(Vec3::new(0.5, 0.0, 0.5)),
        orientation: Orientation::new(0.0, 0.0),
        held_item: Some(ItemStack::new("iron_sword", 1)),
        entities: vec![
            ObservedEntity::new(1, "zombie", Vec3::new(0.5, 0.0, -12.5)),
            ObservedEntity::new(2, "skeleton", Vec3::new(3.5, 0.0, -6.5)),
        ],
        ..AgentSnapshot::default()
    }));

    let mut perception = ThreatPerceptionService::new(
        config.perception.clone(),
        agent.clone(),
        Arc::new(KindListClassifier::default()),
        Arc::new(VoxelLineOfSight::new(grid)),
        clock.clone(),
    );

    let movement = LeaseManager::builder(clock.clone())
        .with_config(config.lease.clone())
        .on_preempt(|preemption| {
            tracing::info!(
                evicted = %preemption.evicted,
                reason = %preemption.reason,
                "Movement authority revoked"
            );
            Ok(())
        })
        .build();

    // Navigation holds the movement lease while travelling.
    let _travel = movement.acquire("navigation", LeasePriority::Normal, None);

    for tick in 0..8u64 {
        {
            let mut state = agent.write().unwrap_or_else(|e| e.into_inner());
            for entity in &mut state.entities {
                // Everything shuffles one block closer per tick.
                entity.position = entity.position + Vec3::new(0.0, 0.0, 1.0);
            }
            if tick == 5 {
                state.health = Some(5.0);
            }
        }

        let assessment = perception.assess_threats().await;
        tracing::info!(
            tick,
            level = %assessment.overall_threat_level,
            action = %assessment.recommended_action,
            threats = assessment.threats.len(),
            "Assessed"
        );

        if assessment.recommended_action.needs_movement() {
            let priority = if assessment.overall_threat_level >= ai::perception::ThreatLevel::High {
                LeasePriority::Emergency
            } else {
                LeasePriority::High
            };
            let action = assessment.recommended_action;
            let moved = movement
                .with_lease(
                    "reflex",
                    priority,
                    false,
                    LeaseOptions {
                        ttl_ms: Some(2_000),
                        preempt_result: None,
                    },
                    || async move {
                        tracing::info!(%action, "Steering");
                        true
                    },
                )
                .await;
            if !moved {
                tracing::info!(holder = ?movement.holder(), "Movement busy, skipping reaction");
            }
        }

        clock.advance(TICK_MS);
        perception.cleanup_old_threats();
    }

    let stats = perception.stats();
    tracing::info!(
        now_ms = clock.now_millis(),
        ticks = stats.ticks,
        raycasts = stats.raycasts,
        discarded = stats.discarded,
        memory_hits = stats.memory_hits,
        "Done"
    );
    Ok(())
}
