// ABOUTME: A single deploy attempt parameterized by state marker.
// ABOUTME: Transitions consume self; the failure path always finalizes the record.

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;

use super::state::{BuildFailed, BuildRunning, Created, HandedOff};
use crate::build::{BuildError, BuildInvoker};
use crate::compose::ComposeDetails;
use crate::deployment::{Deployment, DeploymentRecords, DeploymentStatus};
use crate::error::Result;

/// Result type for transitions that hand the attempt back on failure.
pub type TransitionResult<T, S> =
    std::result::Result<DeployAttempt<T>, (DeployAttempt<S>, BuildAbort)>;

/// Why a build did not return normally.
pub enum BuildAbort {
    /// The invoker returned an error.
    Failed(BuildError),
    /// The invoker panicked. The payload is resumed once the record is finalized.
    Panicked(Box<dyn Any + Send>),
}

impl BuildAbort {
    /// Human-readable cause, for logs.
    pub fn describe(&self) -> String {
        match self {
            BuildAbort::Failed(err) => err.to_string(),
            BuildAbort::Panicked(payload) => payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "build invoker panicked".to_string()),
        }
    }
}

impl fmt::Debug for BuildAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildAbort::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
            BuildAbort::Panicked(_) => f.debug_tuple("Panicked").field(&self.describe()).finish(),
        }
    }
}

/// A deployment record moving through one attempt, parameterized by its state.
#[derive(Debug)]
pub struct DeployAttempt<S> {
    deployment: Deployment,
    _state: PhantomData<S>,
}

impl<S> DeployAttempt<S> {
    /// The record as last written by this attempt.
    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    fn transition<T>(self) -> DeployAttempt<T> {
        DeployAttempt {
            deployment: self.deployment,
            _state: PhantomData,
        }
    }
}

impl DeployAttempt<Created> {
    /// Wrap a freshly created `running` record.
    pub fn new(deployment: Deployment) -> Self {
        DeployAttempt {
            deployment,
            _state: PhantomData,
        }
    }

    pub fn start_build(self) -> DeployAttempt<BuildRunning> {
        tracing::info!(
            deployment = %self.deployment.deployment_id,
            title = %self.deployment.title,
            "starting build"
        );
        self.transition()
    }
}

impl DeployAttempt<BuildRunning> {
    /// Run the build invoker.
    ///
    /// Errors and panics both hand the attempt back so the caller can run
    /// [`fail`](Self::fail) before propagating.
    pub async fn build<B: BuildInvoker + ?Sized>(
        self,
        invoker: &B,
        compose: &ComposeDetails,
    ) -> TransitionResult<HandedOff, BuildRunning> {
        let outcome = AssertUnwindSafe(invoker.build(compose, &self.deployment))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => Ok(self.transition()),
            Ok(Err(err)) => Err((self, BuildAbort::Failed(err))),
            Err(payload) => Err((self, BuildAbort::Panicked(payload))),
        }
    }

    /// Compensating action: write the record as `error`.
    pub async fn fail(
        self,
        records: &DeploymentRecords,
        cause: &str,
    ) -> Result<DeployAttempt<BuildFailed>> {
        let id = &self.deployment.deployment_id;
        tracing::warn!(deployment = %id, %cause, "build failed");

        let deployment = match records.update_status(id, DeploymentStatus::Error).await {
            Ok(deployment) => deployment,
            Err(err) => {
                tracing::error!(
                    deployment = %id,
                    %cause,
                    "could not mark deployment as failed: {}",
                    err
                );
                return Err(err);
            }
        };

        Ok(DeployAttempt {
            deployment,
            _state: PhantomData,
        })
    }
}

impl DeployAttempt<HandedOff> {
    pub fn into_deployment(self) -> Deployment {
        self.deployment
    }
}

impl DeployAttempt<BuildFailed> {
    pub fn into_deployment(self) -> Deployment {
        self.deployment
    }
}
