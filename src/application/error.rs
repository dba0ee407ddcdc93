//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("pipeline config error: {message}")]
    Pipeline { message: String },

    #[error("file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(std::path::PathBuf),

    #[error("`{tool}` is not installed or not on PATH")]
    ToolNotFound { tool: String },

    #[error("{tool} command failed: {message}")]
    ToolFailed {
        tool: String,
        message: String,
        exit_code: Option<i32>,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Classify a spawn failure: a missing binary becomes `ToolNotFound`.
    pub fn spawn(tool: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::ToolNotFound {
                tool: tool.to_string(),
            }
        } else {
            Self::OperationFailed {
                context: format!("spawn {tool}"),
                source: Box::new(source),
            }
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
