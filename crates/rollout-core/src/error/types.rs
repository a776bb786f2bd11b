//! Core error type

use thiserror::Error;

/// Result type alias for rollout operations
pub type RolloutResult<T> = Result<T, RolloutError>;

/// Main error type for rollout evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RolloutError {
    /// Invalid construction arguments
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Unknown benchmark, missing dataset file or required field
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        resource_type: Option<String>,
    },

    /// A name is already taken
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Checkpoint log or dataset file could not be read or written
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// A record or file could not be (de)serialized
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// The environment failed to produce an outcome for a sample
    #[error("Execution failed for sample {sample_id}: {message}")]
    Execution { sample_id: String, message: String },

    /// Anything else
    #[error("Error: {message}")]
    Other { message: String },
}

impl RolloutError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "ROLLOUT_CONFIG",
            Self::NotFound { .. } => "ROLLOUT_NOT_FOUND",
            Self::Conflict { .. } => "ROLLOUT_CONFLICT",
            Self::Io { .. } => "ROLLOUT_IO",
            Self::Json { .. } => "ROLLOUT_JSON",
            Self::Execution { .. } => "ROLLOUT_EXECUTION",
            Self::Other { .. } => "ROLLOUT_OTHER",
        }
    }

    /// Human-readable message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Config { message, .. }
            | Self::NotFound { message, .. }
            | Self::Conflict { message }
            | Self::Io { message, .. }
            | Self::Json { message, .. }
            | Self::Execution { message, .. }
            | Self::Other { message } => message,
        }
    }

    /// Whether re-running the same work may succeed.
    ///
    /// Only per-sample execution failures qualify; they are left out of the
    /// checkpoint so a resumed run picks them up again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error, keeping its variant where it carries a context slot
    fn context<C: std::fmt::Display>(self, context: C) -> RolloutResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> RolloutResult<T>;
}

impl<T> ResultExt<T> for RolloutResult<T> {
    fn context<C: std::fmt::Display>(self, context: C) -> RolloutResult<T> {
        self.map_err(|e| e.with_context(context.to_string()))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> RolloutResult<T> {
        self.map_err(|e| e.with_context(f().to_string()))
    }
}
