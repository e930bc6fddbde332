use core::fmt;
use core::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use ai_core::Clock;

use crate::{LeaseConfig, LeaseDenied, LeaseGuard, LeasePriority};

type PreemptHook = Box<dyn Fn(&Preemption) -> anyhow::Result<()> + Send + Sync>;

/// Record of a forced eviction, handed to the preemption callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preemption {
    pub evicted: String,
    pub evicted_priority: LeasePriority,
    pub preempted_by: String,
    pub reason: String,
}

/// Point-in-time view of the lease.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaseSnapshot {
    pub holder: Option<String>,
    pub priority: LeasePriority,
    pub ref_count: u32,
    pub acquired_at_ms: u64,
    pub ttl_ms: u64,
    pub last_preempt_reason: Option<String>,
}

/// Optional arguments for [`LeaseManager::with_lease`].
#[derive(Debug, Clone)]
pub struct LeaseOptions<T> {
    pub ttl_ms: Option<u64>,
    /// Returned instead of the busy result when the refusal follows a recorded preemption.
    pub preempt_result: Option<T>,
}

impl<T> Default for LeaseOptions<T> {
    fn default() -> Self {
        Self {
            ttl_ms: None,
            preempt_result: None,
        }
    }
}

#[derive(Debug, Default)]
struct LeaseState {
    holder: Option<String>,
    priority: LeasePriority,
    ref_count: u32,
    acquired_at_ms: u64,
    ttl_ms: u64,
    /// Bumped on every fresh grant; guards only release the epoch they were issued for.
    epoch: u64,
    last_preempt_reason: Option<String>,
}

impl LeaseState {
    fn reset(&mut self) {
        self.holder = None;
        self.priority = LeasePriority::Normal;
        self.ref_count = 0;
        self.acquired_at_ms = 0;
        self.ttl_ms = 0;
    }

    fn grant_fresh(&mut self, holder: &str, priority: LeasePriority, ttl_ms: u64, now: u64) -> u64 {
        self.epoch += 1;
        self.holder = Some(holder.to_string());
        self.priority = priority;
        self.ref_count = 1;
        self.acquired_at_ms = now;
        self.ttl_ms = ttl_ms;
        if !priority.is_emergency() {
            self.last_preempt_reason = None;
        }
        self.epoch
    }

    fn expire_if_stale(&mut self, now: u64, resource: &str) {
        if self.ttl_ms == 0 {
            return;
        }
        let Some(holder) = self.holder.as_deref() else {
            return;
        };
        if now.saturating_sub(self.acquired_at_ms) > self.ttl_ms {
            tracing::info!(
                resource,
                holder,
                ttl_ms = self.ttl_ms,
                held_ms = now.saturating_sub(self.acquired_at_ms),
                "Lease expired, reclaiming"
            );
            self.reset();
        }
    }

    fn decrement(&mut self, resource: &str) {
        if self.ref_count == 0 {
            tracing::warn!(resource, holder = ?self.holder, "Lease ref-count underflow, clamping to zero");
        } else {
            self.ref_count -= 1;
        }

        if self.ref_count == 0 {
            tracing::debug!(resource, holder = ?self.holder, "Lease released");
            self.reset();
        }
    }

    fn snapshot(&self) -> LeaseSnapshot {
        LeaseSnapshot {
            holder: self.holder.clone(),
            priority: self.priority,
            ref_count: self.ref_count,
            acquired_at_ms: self.acquired_at_ms,
            ttl_ms: self.ttl_ms,
            last_preempt_reason: self.last_preempt_reason.clone(),
        }
    }
}

struct Shared {
    resource: String,
    default_ttl_ms: u64,
    clock: Arc<dyn Clock>,
    on_preempt: Option<PreemptHook>,
    state: Mutex<LeaseState>,
}

/// Builder for [`LeaseManager`].
pub struct LeaseManagerBuilder {
    config: LeaseConfig,
    clock: Arc<dyn Clock>,
    on_preempt: Option<PreemptHook>,
}

impl LeaseManagerBuilder {
    pub fn with_config(mut self, config: LeaseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.config.default_ttl_ms = ttl_ms;
        self
    }

    /// Callback invoked with the evicted holder after an emergency preemption.
    ///
    /// Errors and panics raised by the callback are logged and swallowed.
    pub fn on_preempt(
        mut self,
        hook: impl Fn(&Preemption) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_preempt = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> LeaseManager {
        LeaseManager {
            shared: Arc::new(Shared {
                resource: self.config.resource,
                default_ttl_ms: self.config.default_ttl_ms,
                clock: self.clock,
                on_preempt: self.on_preempt,
                state: Mutex::new(LeaseState::default()),
            }),
        }
    }
}

/// Exclusive lease over a single shared resource.
///
/// Cloning is cheap; clones share the same lease.
#[derive(Clone)]
pub struct LeaseManager {
    shared: Arc<Shared>,
}

impl fmt::Debug for LeaseManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaseManager")
            .field("resource", &self.shared.resource)
            .field("state", &self.snapshot())
            .finish()
    }
}

impl LeaseManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::builder(clock).build()
    }

    pub fn builder(clock: Arc<dyn Clock>) -> LeaseManagerBuilder {
        LeaseManagerBuilder {
            config: LeaseConfig::default(),
            clock,
            on_preempt: None,
        }
    }

    pub fn from_config(config: LeaseConfig, clock: Arc<dyn Clock>) -> Self {
        Self::builder(clock).with_config(config).build()
    }

    pub fn resource(&self) -> &str {
        &self.shared.resource
    }

    /// Acquire the lease, returning `None` when another holder keeps it.
    pub fn acquire(
        &self,
        holder: &str,
        priority: LeasePriority,
        ttl_ms: Option<u64>,
    ) -> Option<LeaseGuard> {
        self.try_acquire(holder, priority, ttl_ms).ok()
    }

    /// Acquire the lease, reporting who holds it on refusal.
    ///
    /// - idle: granted with ref-count 1.
    /// - same holder: ref-count + 1, priority raised to the max of held and requested.
    /// - emergency over a strictly lower priority: the current holder is discarded and the
    ///   preemption callback runs.
    /// - anything else is refused.
    pub fn try_acquire(
        &self,
        holder: &str,
        priority: LeasePriority,
        ttl_ms: Option<u64>,
    ) -> Result<LeaseGuard, LeaseDenied> {
        let resource = self.shared.resource.as_str();
        let ttl_ms = ttl_ms.unwrap_or(self.shared.default_ttl_ms);
        let now = self.shared.clock.now_millis();

        let mut preemption = None;
        let epoch = {
            let mut state = self.lock();
            state.expire_if_stale(now, resource);

            match state.holder.clone() {
                None => {
                    let epoch = state.grant_fresh(holder, priority, ttl_ms, now);
                    tracing::info!(resource, holder, %priority, ttl_ms, "Lease granted");
                    epoch
                }
                Some(current) if current == holder => {
                    state.ref_count += 1;
                    state.priority = state.priority.max(priority);
                    if !priority.is_emergency() {
                        state.last_preempt_reason = None;
                    }
                    tracing::debug!(
                        resource,
                        holder,
                        ref_count = state.ref_count,
                        priority = %state.priority,
                        "Lease re-acquired"
                    );
                    state.epoch
                }
                Some(current) if priority.is_emergency() && priority > state.priority => {
                    let evicted_priority = state.priority;
                    let reason = format!(
                        "preempted by {holder} ({priority}) from {current} ({evicted_priority})"
                    );
                    tracing::info!(
                        resource,
                        evicted = %current,
                        %evicted_priority,
                        discarded_refs = state.ref_count,
                        preempted_by = holder,
                        "Lease preempted"
                    );

                    // Discard, not release: outstanding guards of the evicted holder become inert.
                    state.reset();
                    state.last_preempt_reason = Some(reason.clone());
                    let epoch = state.grant_fresh(holder, priority, ttl_ms, now);

                    preemption = Some(Preemption {
                        evicted: current,
                        evicted_priority,
                        preempted_by: holder.to_string(),
                        reason,
                    });
                    epoch
                }
                Some(current) => {
                    tracing::debug!(
                        resource,
                        requested_by = holder,
                        %priority,
                        holder = %current,
                        held_priority = %state.priority,
                        "Lease busy"
                    );
                    return Err(LeaseDenied::Busy {
                        holder: current,
                        priority: state.priority,
                    });
                }
            }
        };

        // Runs outside the lock so the callback may inspect the manager.
        if let Some(preemption) = preemption {
            self.notify_preempted(&preemption);
        }

        Ok(LeaseGuard::new(self.clone(), holder.to_string(), epoch))
    }

    /// Release one reference held by `holder`.
    ///
    /// A holder that does not currently own the lease is ignored.
    pub fn release(&self, holder: &str) {
        let mut state = self.lock();
        if state.holder.as_deref() != Some(holder) {
            tracing::debug!(
                resource = %self.shared.resource,
                holder,
                current = ?state.holder,
                "Ignoring release from non-holder"
            );
            return;
        }
        state.decrement(&self.shared.resource);
    }

    pub(crate) fn release_epoch(&self, holder: &str, epoch: u64) {
        let mut state = self.lock();
        if state.epoch != epoch || state.holder.as_deref() != Some(holder) {
            tracing::debug!(
                resource = %self.shared.resource,
                holder,
                "Ignoring stale lease guard"
            );
            return;
        }
        state.decrement(&self.shared.resource);
    }

    /// Run `action` while holding the lease.
    ///
    /// Returns `busy_result` when the lease is refused, or `options.preempt_result` when a
    /// preemption reason is on record at the time of the refusal. The lease is released on every
    /// exit path of `action`, including panics and cancellation of the returned future.
    pub async fn with_lease<T, F, Fut>(
        &self,
        holder: &str,
        priority: LeasePriority,
        busy_result: T,
        options: LeaseOptions<T>,
        action: F,
    ) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let guard = match self.try_acquire(holder, priority, options.ttl_ms) {
            Ok(guard) => guard,
            Err(denied) => {
                if self.last_preempt_reason().is_some() {
                    if let Some(preempted) = options.preempt_result {
                        tracing::debug!(holder, %denied, "Lease refused after preemption");
                        return preempted;
                    }
                }
                tracing::debug!(holder, %denied, "Lease refused");
                return busy_result;
            }
        };

        let result = action().await;
        drop(guard);
        result
    }

    pub fn is_busy(&self) -> bool {
        self.read().holder.is_some()
    }

    pub fn holder(&self) -> Option<String> {
        self.read().holder
    }

    pub fn ref_count(&self) -> u32 {
        self.read().ref_count
    }

    pub fn priority(&self) -> Option<LeasePriority> {
        let snapshot = self.read();
        snapshot.holder.map(|_| snapshot.priority)
    }

    pub fn last_preempt_reason(&self) -> Option<String> {
        self.lock().last_preempt_reason.clone()
    }

    pub fn clear_preempt_reason(&self) {
        self.lock().last_preempt_reason = None;
    }

    pub fn snapshot(&self) -> LeaseSnapshot {
        self.read()
    }

    fn read(&self) -> LeaseSnapshot {
        let now = self.shared.clock.now_millis();
        let mut state = self.lock();
        state.expire_if_stale(now, &self.shared.resource);
        state.snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, LeaseState> {
        // State is always left consistent between statements, so a poisoned lock is still usable.
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify_preempted(&self, preemption: &Preemption) {
        let Some(hook) = self.shared.on_preempt.as_ref() else {
            return;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| hook(preemption))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(
                resource = %self.shared.resource,
                evicted = %preemption.evicted,
                error = %err,
                "Preemption callback failed"
            ),
            Err(_) => tracing::warn!(
                resource = %self.shared.resource,
                evicted = %preemption.evicted,
                "Preemption callback panicked"
            ),
        }
    }
}
