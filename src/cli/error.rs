//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(d) => match d {
                    DomainError::MissingInput(_) | DomainError::InvalidSample { .. } => {
                        exitcode::NOINPUT
                    }
                    DomainError::IncompleteSlide | DomainError::NotJsonFileName(_) => {
                        exitcode::USAGE
                    }
                },
                ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::Pipeline { .. } => exitcode::DATAERR,
                ApplicationError::AlreadyExists(_) => exitcode::CANTCREAT,
                ApplicationError::ToolNotFound { .. } => exitcode::UNAVAILABLE,
                ApplicationError::ToolFailed { .. } => exitcode::SOFTWARE,
                ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
            },
        }
    }
}

/// Exit code for a clap parse outcome: help and version requests succeed,
/// everything else (unknown subcommand, bad arguments) is a usage error.
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    use clap::error::ErrorKind;

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exitcode::OK,
        _ => exitcode::USAGE,
    }
}
