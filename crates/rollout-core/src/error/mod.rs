//! Error types for rollout evaluation
//!
//! Every fallible operation in the workspace returns [`RolloutResult`]. The
//! variants map onto the failure classes the engine distinguishes:
//! configuration mistakes, missing resources, registry conflicts, checkpoint
//! I/O, unparseable records and per-sample execution failures.

mod constructors;
mod conversions;
mod types;

pub use types::{ResultExt, RolloutError, RolloutResult};
