//! Crash-resumable checkpointing of completed samples
//!
//! The log is a JSONL file of [`EvalSample`](crate::sample::EvalSample)
//! records. Opening a store reads the existing log so already-completed
//! samples are neither re-executed nor re-appended.

mod store;

pub use store::{CheckpointStore, failures_path_for, load_records};
