// ABOUTME: Build invoker seam between the orchestrator and the actual build.
// ABOUTME: Defines the BuildInvoker trait, its error type, and the docker compose implementation.

mod compose_builder;

pub use compose_builder::ComposeBuilder;

use async_trait::async_trait;
use snafu::Snafu;
use std::path::PathBuf;
use std::time::Duration;

use crate::compose::ComposeDetails;
use crate::deployment::Deployment;
use crate::store::StoreError;

/// Performs the build/deploy of a compose application.
///
/// Implementations write their progress to `deployment.log_path` and are
/// responsible for marking the deployment `success` when they finish. The
/// orchestrator only handles the failure path.
#[async_trait]
pub trait BuildInvoker: Send + Sync {
    async fn build(&self, compose: &ComposeDetails, deployment: &Deployment)
    -> Result<(), BuildError>;
}

/// Errors raised by a build invoker.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BuildError {
    #[snafu(display("failed to prepare {}: {source}", path.display()))]
    Prepare {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to open build log {}: {source}", path.display()))]
    OpenLog {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to run `{program}`: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` exited with {}", describe_exit(*code)))]
    Exited { command: String, code: Option<i32> },

    #[snafu(display("build timed out after {}s", timeout.as_secs()))]
    TimedOut { timeout: Duration },

    #[snafu(display("failed to record build success: {source}"))]
    Finalize { source: StoreError },

    #[snafu(display("{message}"))]
    Custom { message: String },
}

impl BuildError {
    /// Free-form build failure, for invokers without a more specific variant.
    pub fn custom(message: impl Into<String>) -> Self {
        BuildError::Custom {
            message: message.into(),
        }
    }

    /// Exit code of the build process, if it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::Exited { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (killed by signal)".to_string(),
    }
}
