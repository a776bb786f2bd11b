//! Ready-made environments

mod command;

pub use command::{
    CommandConfig, CommandEnvironment, CommandEnvironmentFactory, GROUND_TRUTH_ENV, TASK_ID_ENV,
};
