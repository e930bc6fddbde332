//! Deterministic, engine-agnostic primitives shared by the decision-support crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod clock;
pub mod math;

pub use clock::{Clock, ManualClock, SystemClock};
pub use math::{Orientation, Vec3};
