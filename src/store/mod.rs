// ABOUTME: Repository traits over projects, compose applications, and deployments.
// ABOUTME: Backed by an in-memory store for tests and a JSON file store for the CLI.

mod file;
mod memory;
mod tables;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::compose::{Compose, ComposeDetails, ComposePatch, Project};
use crate::deployment::{Deployment, DeploymentStatus};
use crate::types::{ComposeId, DeploymentId, ProjectId};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state file: {0}")]
    Read(String),

    #[error("failed to write state file: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("integrity error: {0}")]
    Integrity(String),
}

/// Project rows.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a project. Returns `None` when no row was written (id already taken).
    async fn insert_project(&self, project: Project) -> StoreResult<Option<Project>>;

    async fn find_project(&self, id: &ProjectId) -> StoreResult<Option<Project>>;
}

/// Compose rows.
#[async_trait]
pub trait ComposeRepository: Send + Sync {
    /// Insert a compose. Returns `None` when no row was written (id already taken).
    async fn insert_compose(&self, compose: Compose) -> StoreResult<Option<Compose>>;

    async fn find_compose(&self, id: &ComposeId) -> StoreResult<Option<Compose>>;

    /// Load a compose joined with its project and deployments (newest first).
    async fn find_compose_with_relations(
        &self,
        id: &ComposeId,
    ) -> StoreResult<Option<ComposeDetails>>;

    /// Apply a partial update. Returns `None` when no row matched.
    async fn update_compose(
        &self,
        id: &ComposeId,
        patch: &ComposePatch,
    ) -> StoreResult<Option<Compose>>;
}

/// Deployment rows.
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    /// Insert a deployment. Returns `None` when no row was written (id already taken).
    async fn insert_deployment(&self, deployment: Deployment) -> StoreResult<Option<Deployment>>;

    /// Set the status of a deployment. Returns `None` when no row matched.
    async fn update_deployment_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> StoreResult<Option<Deployment>>;

    async fn find_deployment(&self, id: &DeploymentId) -> StoreResult<Option<Deployment>>;

    /// Deployments of one compose, newest first.
    async fn list_deployments(&self, compose_id: &ComposeId) -> StoreResult<Vec<Deployment>>;
}
