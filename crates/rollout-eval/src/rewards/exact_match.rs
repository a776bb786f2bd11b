//! Exact-match answer scoring

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use rollout_core::{RewardFunction, RewardResult, RolloutResult, StepResult, Task};

static WHITESPACE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s+").ok());

/// Scores 1.0 when the final answer equals the ground truth, 0.0 otherwise.
///
/// The answer is the content of the last `\boxed{...}` in the final assistant
/// message, or its last non-empty line when nothing is boxed. Both sides are
/// compared after collapsing whitespace. Tasks without ground truth get no
/// reward.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatchReward;

impl ExactMatchReward {
    pub fn new() -> Self {
        Self
    }

    /// The answer a response commits to
    pub fn extract_answer(response: &str) -> Option<String> {
        if let Some(boxed) = last_boxed(response) {
            return Some(boxed.to_string());
        }
        response
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }

    pub fn matches(answer: &str, ground_truth: &str) -> bool {
        normalize(answer) == normalize(ground_truth)
    }
}

#[async_trait]
impl RewardFunction for ExactMatchReward {
    async fn compute(&self, task: &Task, step: &StepResult) -> RolloutResult<Option<RewardResult>> {
        let Some(ground_truth) = task.ground_truth() else {
            return Ok(None);
        };

        let answer = step
            .observation
            .final_response()
            .and_then(Self::extract_answer);
        let correct = answer
            .as_deref()
            .is_some_and(|a| Self::matches(a, ground_truth));

        let mut result = RewardResult::new(if correct { 1.0 } else { 0.0 })
            .with_info("ground_truth", ground_truth);
        if let Some(answer) = answer {
            result = result.with_info("answer", answer);
        }
        Ok(Some(result))
    }
}

/// Content of the last `\boxed{...}`, honouring nested braces
fn last_boxed(text: &str) -> Option<&str> {
    const MARKER: &str = "\\boxed{";
    let start = text.rfind(MARKER)? + MARKER.len();

    let mut depth = 1usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + offset].trim());
                }
            }
            _ => {}
        }
    }
    None
}

fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    match WHITESPACE.as_ref() {
        Some(re) => re.replace_all(trimmed, " ").into_owned(),
        None => trimmed.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}
