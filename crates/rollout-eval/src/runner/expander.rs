//! Expands tasks into per-rollout samples

use std::collections::{HashMap, HashSet};

use rollout_core::{RolloutError, RolloutResult, Task};
use tracing::warn;

use crate::sample::Sample;

/// Problem id used for a task that has none
pub fn default_problem_id(ordinal: usize) -> String {
    format!("task_{}", ordinal)
}

/// Produce `tasks.len() * n_rollouts` samples in task order, each task's
/// rollouts in index order.
///
/// Sample ids are `{problem_id}_{rollout}`. A repeated problem id is tagged
/// with its occurrence (`{problem_id}#{occurrence}_{rollout}`) so no two
/// samples ever share an id; the duplicate keeps the original problem id.
pub fn expand_samples(tasks: &[Task], n_rollouts: u32) -> RolloutResult<Vec<Sample>> {
    if n_rollouts < 1 {
        return Err(RolloutError::config("n_rollouts must be >= 1"));
    }

    let mut samples = Vec::with_capacity(tasks.len() * n_rollouts as usize);
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::with_capacity(samples.capacity());

    for (ordinal, task) in tasks.iter().enumerate() {
        let problem_id = task
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| default_problem_id(ordinal));

        let occurrence = occurrences.entry(problem_id.clone()).or_insert(0);
        let mut stem = if *occurrence == 0 {
            problem_id.clone()
        } else {
            warn!(
                problem_id = %problem_id,
                ordinal,
                "Duplicate task id; samples will be grouped with the first occurrence"
            );
            format!("{}#{}", problem_id, occurrence)
        };
        *occurrence += 1;

        // An explicit id can still collide with a generated stem
        while (0..n_rollouts).any(|r| seen.contains(&sample_id(&stem, r))) {
            let occurrence = occurrences.entry(problem_id.clone()).or_insert(0);
            stem = format!("{}#{}", problem_id, occurrence);
            *occurrence += 1;
        }

        for rollout_index in 0..n_rollouts {
            let id = sample_id(&stem, rollout_index);
            seen.insert(id.clone());

            let mut task = task.clone();
            task.context.id = Some(id.clone());

            samples.push(Sample {
                sample_id: id,
                problem_id: problem_id.clone(),
                rollout_index,
                task,
            });
        }
    }

    Ok(samples)
}

fn sample_id(stem: &str, rollout_index: u32) -> String {
    format!("{}_{}", stem, rollout_index)
}
