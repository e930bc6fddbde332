//! Rate-limited logging of line-of-sight discards.
//!
//! A crowd of hidden mobs would otherwise produce one log line per mob per tick. Logging is
//! throttled per entity and per kind; suppressed events are counted and periodically reported as
//! a summary. Throttling only affects logging, never the discard itself.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::threat::ThreatKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum time between two logged discards of the same entity.
    pub per_entity_interval_ms: u64,
    /// Minimum time between two logged discards of the same kind.
    pub per_kind_interval_ms: u64,
    /// How often suppressed counts are summarized.
    pub summary_interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            per_entity_interval_ms: 5_000,
            per_kind_interval_ms: 2_000,
            summary_interval_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardLog {
    Logged,
    Suppressed,
}

/// Suppressed discard counts for one summary window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscardSummary {
    pub window_start_ms: u64,
    pub window_end_ms: u64,
    pub suppressed_by_kind: BTreeMap<String, u64>,
}

impl DiscardSummary {
    pub fn total(&self) -> u64 {
        self.suppressed_by_kind.values().sum()
    }
}

#[derive(Debug, Default)]
struct KindCounter {
    last_logged_ms: Option<u64>,
    suppressed: u64,
}

#[derive(Debug, Default)]
pub struct DiscardThrottle {
    config: ThrottleConfig,
    entity_last_logged: HashMap<ThreatKey, u64>,
    kinds: HashMap<String, KindCounter>,
    window_start_ms: Option<u64>,
    last_summary: Option<DiscardSummary>,
}

impl DiscardThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Note a discarded threat, logging it unless throttled.
    pub fn record(&mut self, key: &ThreatKey, distance: f32, now_ms: u64) -> DiscardLog {
        self.roll_window(now_ms);

        let entity_ready = self
            .entity_last_logged
            .get(key)
            .map_or(true, |&at| now_ms.saturating_sub(at) >= self.config.per_entity_interval_ms);

        let counter = self.kinds.entry(key.kind.clone()).or_default();
        let kind_ready = counter
            .last_logged_ms
            .map_or(true, |at| now_ms.saturating_sub(at) >= self.config.per_kind_interval_ms);

        if entity_ready && kind_ready {
            counter.last_logged_ms = Some(now_ms);
            self.entity_last_logged.insert(key.clone(), now_ms);
            tracing::debug!(threat = %key, distance, "Discarding threat without line of sight");
            DiscardLog::Logged
        } else {
            counter.suppressed += 1;
            DiscardLog::Suppressed
        }
    }

    /// Suppressed discards of `kind` in the current window.
    pub fn suppressed(&self, kind: &str) -> u64 {
        self.kinds.get(kind).map_or(0, |c| c.suppressed)
    }

    /// Summarize the current window if its interval has elapsed, even without new discards.
    pub fn flush(&mut self, now_ms: u64) {
        if self.window_start_ms.is_some() {
            self.roll_window(now_ms);
        }
    }

    pub fn last_summary(&self) -> Option<&DiscardSummary> {
        self.last_summary.as_ref()
    }

    fn roll_window(&mut self, now_ms: u64) {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(start) < self.config.summary_interval_ms {
            return;
        }

        let suppressed_by_kind: BTreeMap<String, u64> = self
            .kinds
            .iter_mut()
            .filter(|(_, c)| c.suppressed > 0)
            .map(|(kind, c)| (kind.clone(), std::mem::take(&mut c.suppressed)))
            .collect();

        if !suppressed_by_kind.is_empty() {
            let summary = DiscardSummary {
                window_start_ms: start,
                window_end_ms: now_ms,
                suppressed_by_kind,
            };
            tracing::debug!(
                suppressed = summary.total(),
                by_kind = ?summary.suppressed_by_kind,
                window_ms = now_ms - start,
                "Suppressed line-of-sight discards"
            );
            self.last_summary = Some(summary);
        }

        // Entries past their interval would log anyway; dropping them keeps the map bounded.
        let per_entity = self.config.per_entity_interval_ms;
        self.entity_last_logged
            .retain(|_, at| now_ms.saturating_sub(*at) < per_entity);
        self.window_start_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle() -> DiscardThrottle {
        DiscardThrottle::new(ThrottleConfig {
            per_entity_interval_ms: 1_000,
            per_kind_interval_ms: 500,
            summary_interval_ms: 5_000,
        })
    }

    #[test]
    fn same_entity_is_throttled() {
        let mut t = throttle();
        let key = ThreatKey::new("zombie", 1);

        assert_eq!(t.record(&key, 10.0, 0), DiscardLog::Logged);
        assert_eq!(t.record(&key, 10.0, 600), DiscardLog::Suppressed);
        assert_eq!(t.record(&key, 10.0, 1_000), DiscardLog::Logged);
    }

    #[test]
    fn same_kind_is_throttled_across_entities() {
        let mut t = throttle();
        let a = ThreatKey::new("zombie", 1);
        let b = ThreatKey::new("zombie", 2);
        let c = ThreatKey::new("skeleton", 3);

        assert_eq!(t.record(&a, 10.0, 0), DiscardLog::Logged);
        assert_eq!(t.record(&b, 10.0, 100), DiscardLog::Suppressed);
        assert_eq!(t.record(&c, 10.0, 100), DiscardLog::Logged);
        assert_eq!(t.record(&b, 10.0, 500), DiscardLog::Logged);
        assert_eq!(t.suppressed("zombie"), 1);
    }

    #[test]
    fn summary_collects_suppressed_counts() {
        let mut t = throttle();
        let key = ThreatKey::new("zombie", 1);
        t.record(&key, 10.0, 0);
        for at in [100, 200, 300] {
            t.record(&key, 10.0, at);
        }
        assert!(t.last_summary().is_none());

        t.record(&key, 10.0, 5_000);
        let summary = t.last_summary().expect("summary after window");
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.suppressed_by_kind.get("zombie"), Some(&3));
        assert_eq!(t.suppressed("zombie"), 0);
    }

    #[test]
    fn flush_summarizes_a_finished_burst() {
        let mut t = throttle();
        let key = ThreatKey::new("zombie", 1);
        t.record(&key, 10.0, 0);
        t.record(&key, 10.0, 100);

        t.flush(4_999);
        assert!(t.last_summary().is_none());

        t.flush(5_000);
        let summary = t.last_summary().expect("summary after flush");
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.window_end_ms, 5_000);
    }

    #[test]
    fn flush_before_any_discard_is_a_no_op() {
        let mut t = throttle();
        t.flush(50_000);
        assert!(t.last_summary().is_none());
        assert_eq!(t.record(&ThreatKey::new("zombie", 1), 10.0, 50_001), DiscardLog::Logged);
    }
}
