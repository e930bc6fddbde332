use thiserror::Error;

use crate::LeasePriority;

/// Why an acquisition was refused.
///
/// Refusal is not a failure of the manager: the caller simply must not touch the protected
/// resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaseDenied {
    #[error("lease is held by `{holder}` at {priority} priority")]
    Busy {
        holder: String,
        priority: LeasePriority,
    },
}
