//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent violated input expectations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("missing input: {0}")]
    MissingInput(PathBuf),

    #[error("invalid sample {path}: {}", problems.join(", "))]
    InvalidSample { path: PathBuf, problems: Vec<String> },

    #[error("--slide and --area must be given together")]
    IncompleteSlide,

    #[error("not a JSON file name: {0}")]
    NotJsonFileName(PathBuf),
}
