//! Constructor methods for RolloutError

use super::types::RolloutError;

impl RolloutError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
        }
    }

    /// Create a not-found error for a specific resource type
    pub fn not_found_resource(message: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: Some(resource_type.into()),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create an IO error for a path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a new JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new execution failure for a sample
    pub fn execution(sample_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            sample_id: sample_id.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Attach context to the error.
    ///
    /// Variants with a context slot keep their kind; the rest get the context
    /// prefixed onto the message.
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        let ctx = ctx.into();
        match self {
            Self::Config { message, .. } => Self::Config {
                message,
                context: Some(ctx),
            },
            Self::Json { message, .. } => Self::Json {
                message,
                context: Some(ctx),
            },
            Self::NotFound {
                message,
                resource_type,
            } => Self::NotFound {
                message: format!("{}: {}", ctx, message),
                resource_type,
            },
            Self::Conflict { message } => Self::Conflict {
                message: format!("{}: {}", ctx, message),
            },
            Self::Io { message, path } => Self::Io {
                message: format!("{}: {}", ctx, message),
                path,
            },
            Self::Execution { sample_id, message } => Self::Execution {
                sample_id,
                message: format!("{}: {}", ctx, message),
            },
            Self::Other { message } => Self::Other {
                message: format!("{}: {}", ctx, message),
            },
        }
    }
}
