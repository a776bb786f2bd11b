//! Sample and record types
//!
//! A [`Sample`] is one scheduled execution of a task. Once it has produced an
//! outcome it becomes an [`EvalSample`], which is also the line format of the
//! checkpoint log.

use chrono::{DateTime, Utc};
use rollout_core::{StepResult, Task};
use serde::{Deserialize, Serialize};

/// One execution attempt of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique across the whole run
    pub sample_id: String,

    /// Original task id, shared by every rollout of the task
    pub problem_id: String,

    /// Rollout index within the task (0-based)
    pub rollout_index: u32,

    /// Task clone whose `context.id` is the sample id
    pub task: Task,
}

impl Sample {
    /// Attach an outcome, producing the record that gets checkpointed
    pub fn complete(self, step_result: StepResult) -> EvalSample {
        EvalSample {
            sample_id: self.sample_id,
            problem_id: self.problem_id,
            rollout_index: self.rollout_index,
            task: self.task,
            step_result,
            completed_at: Utc::now(),
        }
    }
}

/// A completed sample; one line of the checkpoint log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSample {
    pub sample_id: String,
    pub problem_id: String,
    #[serde(default)]
    pub rollout_index: u32,
    pub task: Task,
    pub step_result: StepResult,
    pub completed_at: DateTime<Utc>,
}

impl EvalSample {
    /// The scalar reward, if one was attached
    pub fn reward(&self) -> Option<f64> {
        self.step_result.reward_value()
    }

    /// Whether the reward is present and at least `threshold`
    pub fn is_correct(&self, threshold: f64) -> bool {
        self.reward().is_some_and(|r| r >= threshold)
    }
}

/// A sample whose environment failed to produce an outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFailure {
    pub sample_id: String,
    pub problem_id: String,
    pub rollout_index: u32,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

impl SampleFailure {
    pub fn new(sample: &Sample, error: impl Into<String>) -> Self {
        Self {
            sample_id: sample.sample_id.clone(),
            problem_id: sample.problem_id.clone(),
            rollout_index: sample.rollout_index,
            error: error.into(),
            failed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_core::{Observation, RewardResult, TaskContext};

    fn sample() -> Sample {
        Sample {
            sample_id: "p1_0".to_string(),
            problem_id: "p1".to_string(),
            rollout_index: 0,
            task: Task::with_context("q", TaskContext::new("p1_0")),
        }
    }

    #[test]
    fn test_is_correct_threshold() {
        let rewarded = sample().complete(
            StepResult::new(Observation::default()).with_reward(RewardResult::new(0.5)),
        );
        assert!(rewarded.is_correct(0.5));
        assert!(!rewarded.is_correct(1.0));

        let unrewarded = sample().complete(StepResult::new(Observation::default()));
        assert!(!unrewarded.is_correct(0.0));
    }

    #[test]
    fn test_record_line_is_single_line_json() {
        let record = sample().complete(StepResult::new(Observation::default()));
        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains(r#""sample_id":"p1_0""#));
        assert!(line.contains(r#""problem_id":"p1""#));

        let back: EvalSample = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);
    }
}
