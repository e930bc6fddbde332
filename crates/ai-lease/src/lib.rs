//! Exclusive, priority-ordered leases over a shared agent resource.
//!
//! The typical resource is movement authority: several internal callers (navigation, combat,
//! reactive escape) want to steer the agent, and at most one of them may do so at a time.
//!
//! - Leases are reference counted per holder; the same holder may acquire repeatedly.
//! - An [`LeasePriority::Emergency`] request evicts any lower-priority holder.
//! - Time-to-live expiry is passive: it is only evaluated when the lease is read or acquired.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ai_core::ManualClock;
//! use ai_lease::{LeaseManager, LeasePriority};
//!
//! let manager = LeaseManager::new(Arc::new(ManualClock::new(0)));
//! let guard = manager.acquire("nav", LeasePriority::Normal, None).expect("lease is free");
//! assert!(manager.acquire("combat", LeasePriority::Normal, None).is_none());
//! drop(guard);
//! assert!(!manager.is_busy());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod guard;
pub mod manager;
pub mod priority;

pub use config::LeaseConfig;
pub use error::LeaseDenied;
pub use guard::LeaseGuard;
pub use manager::{LeaseManager, LeaseManagerBuilder, LeaseOptions, LeaseSnapshot, Preemption};
pub use priority::LeasePriority;
