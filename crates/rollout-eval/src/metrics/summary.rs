//! Summary statistics over grouped results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::grouped::GroupedResults;

/// Run-wide counts and averages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Number of problems
    pub problems: usize,

    /// Number of completed samples
    pub total_samples: usize,

    /// Samples with a reward attached
    pub rewarded_samples: usize,

    /// Samples whose reward met the threshold
    pub correct_samples: usize,

    /// Mean reward over rewarded samples
    pub mean_reward: f64,

    /// Samples per termination reason
    pub termination_reasons: BTreeMap<String, usize>,

    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,

    /// Average total tokens per sample that reported usage
    pub avg_tokens_per_sample: f64,
}

impl EvalSummary {
    pub fn from_results(results: &GroupedResults, threshold: f64) -> Self {
        let mut summary = EvalSummary {
            problems: results.len(),
            ..Default::default()
        };

        let mut reward_sum = 0.0;
        let mut samples_with_usage = 0usize;

        for sample in results.samples() {
            summary.total_samples += 1;

            let reason = sample.step_result.termination_reason.as_str().to_string();
            *summary.termination_reasons.entry(reason).or_insert(0) += 1;

            if let Some(reward) = sample.reward() {
                summary.rewarded_samples += 1;
                reward_sum += reward;
                if reward >= threshold {
                    summary.correct_samples += 1;
                }
            }

            if let Some(tokens) = sample.step_result.observation.tokens {
                samples_with_usage += 1;
                summary.total_input_tokens += tokens.input_tokens;
                summary.total_output_tokens += tokens.output_tokens;
                summary.total_tokens += tokens.total_tokens;
            }
        }

        if summary.rewarded_samples > 0 {
            summary.mean_reward = reward_sum / summary.rewarded_samples as f64;
        }
        if samples_with_usage > 0 {
            summary.avg_tokens_per_sample = summary.total_tokens as f64 / samples_with_usage as f64;
        }

        summary
    }

    /// Fraction of samples counted as correct
    pub fn accuracy(&self) -> f64 {
        if self.total_samples == 0 {
            0.0
        } else {
            self.correct_samples as f64 / self.total_samples as f64
        }
    }
}
