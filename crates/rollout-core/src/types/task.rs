//! Task types: the unit of work handed to an environment

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Context attached to a task
///
/// `id` names the *problem* and is shared by every rollout of it. Benchmark
/// loaders stash their own fields in `extra`, which is serialized inline next
/// to the fixed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskContext {
    /// Problem identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Expected answer, if the benchmark has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,

    /// Prior turns to seed the conversation with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversation_history: Vec<Message>,

    /// Benchmark-specific fields
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TaskContext {
    /// Create a context with the given problem id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Set the ground truth
    pub fn with_ground_truth(mut self, ground_truth: impl Into<String>) -> Self {
        self.ground_truth = Some(ground_truth.into());
        self
    }

    /// Set the prior conversation
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Add a benchmark-specific field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a benchmark-specific field, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Raw access to a benchmark-specific field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_str(key).map(PathBuf::from)
    }
}

/// An input unit of work: a prompt plus its context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Prompt given to the environment
    pub message: String,

    /// Problem context
    #[serde(default)]
    pub context: TaskContext,
}

impl Task {
    /// Create a task without a problem id
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: TaskContext::default(),
        }
    }

    /// Create a task with a context
    pub fn with_context(message: impl Into<String>, context: TaskContext) -> Self {
        Self {
            message: message.into(),
            context,
        }
    }

    /// The problem id, if one is set
    pub fn id(&self) -> Option<&str> {
        self.context.id.as_deref()
    }

    pub fn ground_truth(&self) -> Option<&str> {
        self.context.ground_truth.as_deref()
    }
}
