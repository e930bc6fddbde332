use thiserror::Error;

/// Internal failures of the perception pipeline.
///
/// These never reach callers of `assess_threats`; they are logged and turned into the safe
/// default assessment.
#[derive(Debug, Error)]
pub enum PerceptionError {
    #[error("agent state unavailable: {0}")]
    MissingAgentState(&'static str),

    #[error("agent {0} is not finite")]
    InvalidAgentState(&'static str),

    #[error("malformed entity {id} ({kind}): {reason}")]
    MalformedEntity {
        id: u64,
        kind: String,
        reason: String,
    },

    #[error("hostility classifier failed: {0}")]
    Classifier(String),

    #[error("line-of-sight query failed: {0}")]
    LineOfSight(String),

    #[error("perception pipeline panicked")]
    Panicked,
}

pub type Result<T> = std::result::Result<T, PerceptionError>;
