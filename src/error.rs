// ABOUTME: Application-wide error types for bosun.
// ABOUTME: Tags every failure with a kind while keeping the original cause intact.

use std::path::PathBuf;
use thiserror::Error;

use crate::build::BuildError;
use crate::store::StoreError;
use crate::types::AppNameError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Whatever the build invoker reported, displayed verbatim.
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// Malformed input, or the store refused a create.
    BadRequest,
    /// The build invoker failed.
    BuildFailure,
    /// The persistent store failed.
    Store,
    /// Configuration could not be found or resolved.
    Config,
    /// Local filesystem failure.
    Io,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::Build(_) => ErrorKind::BuildFailure,
            Error::Store(_) => ErrorKind::Store,
            Error::AlreadyExists(_)
            | Error::ConfigNotFound(_)
            | Error::MissingEnvVar(_)
            | Error::InvalidConfig(_)
            | Error::Yaml(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// The original build failure, if this error came from the build invoker.
    pub fn build_failure(&self) -> Option<&BuildError> {
        match self {
            Error::Build(source) => Some(source),
            _ => None,
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }
}

impl From<AppNameError> for Error {
    fn from(err: AppNameError) -> Self {
        Error::BadRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
