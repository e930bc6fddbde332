//! Umbrella crate that re-exports the decision-support building blocks.
//!
//! - [`lease`]: exclusive, priority-ordered movement authority.
//! - [`perception`]: per-tick threat assessment and reactive recommendation.
//!
//! The two are independent; an orchestrator assesses threats each tick and, when the
//! recommendation needs movement, acquires the lease before steering.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "lease")]
#[cfg_attr(docsrs, doc(cfg(feature = "lease")))]
pub use ai_lease as lease;

#[cfg(feature = "perception")]
#[cfg_attr(docsrs, doc(cfg(feature = "perception")))]
pub use ai_perception as perception;

#[cfg(feature = "config")]
#[cfg_attr(docsrs, doc(cfg(feature = "config")))]
pub mod config;

#[cfg(feature = "config")]
pub use config::AiConfig;
