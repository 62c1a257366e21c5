//! Error types for stacklens.
//!
//! Errors are grouped by origin: configuration, the remote stack control
//! plane, the external planner, and view rendering. Every command surfaces
//! them unchanged to `main`, which prints a single line and exits non-zero.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for stacklens.
#[derive(Debug, Error)]
pub enum StacklensError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote stack control plane errors.
    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    /// External planner errors.
    #[error("Planner error: {0}")]
    Plan(#[from] PlanError),

    /// Rendering errors.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The process received an interrupt before the command finished.
    #[error("Interrupted")]
    Interrupted,
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// The configuration names a key stacklens does not know.
    #[error("Unknown configuration key: {key}")]
    UnknownKey {
        /// Full dotted path of the key.
        key: String,
    },

    /// A known key carries a value that cannot be used.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Full dotted path of the key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Remote stack control plane errors.
#[derive(Debug, Error)]
pub enum StackError {
    /// No stack with that name exists in the account and region.
    #[error("Stack not found: {stack}")]
    NotFound {
        /// Name of the missing stack.
        stack: String,
    },

    /// The control plane rejected the credentials.
    #[error("Authentication failed: {message}")]
    AuthFailure {
        /// Description of the rejection.
        message: String,
    },

    /// The control plane is reachable but temporarily unable to answer.
    #[error("Backend temporarily unavailable: {message}")]
    TransientBackend {
        /// Description of the unavailable state.
        message: String,
    },

    /// The stack template could not be parsed.
    #[error("Failed to parse template of stack {stack}: {message}")]
    TemplateParse {
        /// Name of the stack owning the template.
        stack: String,
        /// Description of the parse error.
        message: String,
    },

    /// Any other service failure.
    #[error("Control plane request failed: {message}")]
    Api {
        /// Description of the failure.
        message: String,
    },
}

/// External planner errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The planner binary could not be started.
    #[error("Failed to launch planner {binary}: {message}")]
    Launch {
        /// Planner binary that was invoked.
        binary: String,
        /// Description of the launch failure.
        message: String,
    },

    /// The planner exited with a non-zero status.
    #[error("`{verb}` exited with {status}:\n{stderr}")]
    PlannerFailed {
        /// Planner verb that failed (`plan`, `show`).
        verb: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, verbatim.
        stderr: String,
    },

    /// The planner output is not a valid plan document.
    #[error("Failed to decode plan document: {message}")]
    Decode {
        /// Description of the decode error.
        message: String,
    },

    /// The scoped plan workspace could not be prepared.
    #[error("Failed to prepare plan workspace: {message}")]
    Workspace {
        /// Description of the workspace failure.
        message: String,
    },
}

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the output stream failed.
    #[error("Failed to write output: {0}")]
    Write(#[source] std::io::Error),

    /// A view could not be serialized.
    #[error("Failed to serialize views: {message}")]
    Serialize {
        /// Description of the serialization error.
        message: String,
    },
}

/// Result type alias for stacklens operations.
pub type Result<T> = std::result::Result<T, StacklensError>;

impl StacklensError {
    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Stack(StackError::TransientBackend { .. }))
    }
}

impl ConfigError {
    /// Creates an invalid-value error for a specific key.
    #[must_use]
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl StackError {
    /// Creates a transient backend error.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientBackend {
            message: message.into(),
        }
    }

    /// Creates a generic API error.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Creates a template parse error for the given stack.
    #[must_use]
    pub fn template(stack: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateParse {
            stack: stack.into(),
            message: message.into(),
        }
    }
}

impl PlanError {
    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
