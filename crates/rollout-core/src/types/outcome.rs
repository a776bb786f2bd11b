//! Outcome types produced by an environment step

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::task::{Message, Role};

/// Token usage for one episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// What an episode produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Messages produced during the step (prior history excluded)
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Aggregate token usage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,

    /// Raw token ids of the trajectory; dropped unless the run keeps tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ids: Option<Vec<u32>>,

    /// Arbitrary per-episode metrics
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, Value>,
}

impl Observation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_tokens(mut self, tokens: TokenUsage) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    /// Content of the last assistant message, if any
    pub fn final_response(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

/// Why an episode stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The agent finished on its own
    #[default]
    TaskComplete,
    /// The tool-iteration budget ran out
    MaxToolIterations,
    /// The step exceeded its time budget
    Timeout,
    /// The conversation outgrew the model context
    ContextOverflow,
    /// The episode ended on an error inside the environment
    Error,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::TaskComplete => "task_complete",
            TerminationReason::MaxToolIterations => "max_tool_iterations",
            TerminationReason::Timeout => "timeout",
            TerminationReason::ContextOverflow => "context_overflow",
            TerminationReason::Error => "error",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, TerminationReason::TaskComplete)
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar reward plus scorer-specific details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardResult {
    pub reward: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, Value>,
}

impl RewardResult {
    pub fn new(reward: f64) -> Self {
        Self {
            reward,
            info: BTreeMap::new(),
        }
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }
}

/// Outcome of executing one sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    #[serde(default)]
    pub termination_reason: TerminationReason,
    #[serde(default)]
    pub reward: Option<RewardResult>,
}

impl StepResult {
    pub fn new(observation: Observation) -> Self {
        Self {
            observation,
            termination_reason: TerminationReason::TaskComplete,
            reward: None,
        }
    }

    pub fn with_termination(mut self, reason: TerminationReason) -> Self {
        self.termination_reason = reason;
        self
    }

    pub fn with_reward(mut self, reward: RewardResult) -> Self {
        self.reward = Some(reward);
        self
    }

    /// The scalar reward, if one was attached
    pub fn reward_value(&self) -> Option<f64> {
        self.reward.as_ref().map(|r| r.reward)
    }
}
