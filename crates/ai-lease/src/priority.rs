use core::fmt;

use serde::{Deserialize, Serialize};

/// Lease priority, totally ordered `Normal < High < Emergency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeasePriority {
    #[default]
    Normal,
    High,
    Emergency,
}

impl LeasePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            LeasePriority::Normal => "normal",
            LeasePriority::High => "high",
            LeasePriority::Emergency => "emergency",
        }
    }

    pub fn is_emergency(self) -> bool {
        self == LeasePriority::Emergency
    }
}

impl fmt::Display for LeasePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
