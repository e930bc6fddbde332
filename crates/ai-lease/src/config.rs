use serde::{Deserialize, Serialize};

/// Lease manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseConfig {
    /// Name of the protected resource, used in logs.
    pub resource: String,

    /// TTL applied when `acquire` is called without one. `0` disables expiry.
    pub default_ttl_ms: u64,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            resource: "movement".to_string(),
            default_ttl_ms: 60_000,
        }
    }
}
