//! Data model shared by environments and the evaluation engine

mod outcome;
mod task;

pub use outcome::{Observation, RewardResult, StepResult, TerminationReason, TokenUsage};
pub use task::{Message, Role, Task, TaskContext};
