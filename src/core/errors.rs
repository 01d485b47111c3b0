use serde::Serialize;
use thiserror::Error;

use crate::hooks::types::HookId;

/// Unified error type for the crate's own plumbing (configuration loading and the like).
///
/// Errors produced by hooks never surface through this type: they are captured
/// as outcome data, see [`HookError`].
#[derive(Debug, Error)]
pub enum ExecError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// IO errors
    #[error("IO operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization errors
    #[error("Serialization failed: {format}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ExecError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// Create a configuration error pointing at a field
    pub fn configuration_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn io<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn serialization<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        format: S,
        source: E,
    ) -> Self {
        Self::Serialization {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Io { .. } => "io",
            Self::Serialization { .. } => "serialization",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ExecError>;

impl From<serde_yaml::Error> for ExecError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization("yaml", err)
    }
}

/// Error returned by a hook invocation.
///
/// Only [`HookError::Timeout`] and [`HookError::Failure`] carry their own
/// outcome status; everything else is reported as an execution failure.
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook did not answer within its group's timeout
    #[error("Hook execution timeout")]
    Timeout,

    /// The module reported a handled business failure
    #[error("hook execution failed: {0}")]
    Failure(String),

    /// The hook task panicked before producing a result
    #[error("hook panicked: {0}")]
    Panicked(String),

    /// Any other unexpected error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HookError {
    pub fn failure<S: Into<String>>(reason: S) -> Self {
        Self::Failure(reason.into())
    }
}

/// A hook asked to abort the request on a stage that supports rejection.
///
/// This is the only error that halts the stage sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Module {} (hook: {}) rejected request with code {nbr_code} at {stage} stage", .hook_id.module_code, .hook_id.hook_impl_code)]
pub struct RejectError {
    pub nbr_code: i32,
    pub hook_id: HookId,
    pub stage: String,
}
