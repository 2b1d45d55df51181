// ABOUTME: In-memory repository implementation.
// ABOUTME: Used by tests and as a drop-in fake for the file store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use super::tables::Tables;
use super::{ComposeRepository, DeploymentRepository, ProjectRepository, StoreResult};
use crate::compose::{Compose, ComposeDetails, ComposePatch, Project};
use crate::deployment::{Deployment, DeploymentStatus};
use crate::types::{ComposeId, DeploymentId, ProjectId};

/// Thread-safe in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn insert_project(&self, project: Project) -> StoreResult<Option<Project>> {
        Ok(self.tables.write().insert_project(project))
    }

    async fn find_project(&self, id: &ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().project(id))
    }
}

#[async_trait]
impl ComposeRepository for MemoryStore {
    async fn insert_compose(&self, compose: Compose) -> StoreResult<Option<Compose>> {
        Ok(self.tables.write().insert_compose(compose))
    }

    async fn find_compose(&self, id: &ComposeId) -> StoreResult<Option<Compose>> {
        Ok(self.tables.read().compose(id))
    }

    async fn find_compose_with_relations(
        &self,
        id: &ComposeId,
    ) -> StoreResult<Option<ComposeDetails>> {
        self.tables.read().compose_with_relations(id)
    }

    async fn update_compose(
        &self,
        id: &ComposeId,
        patch: &ComposePatch,
    ) -> StoreResult<Option<Compose>> {
        Ok(self.tables.write().update_compose(id, patch))
    }
}

#[async_trait]
impl DeploymentRepository for MemoryStore {
    async fn insert_deployment(&self, deployment: Deployment) -> StoreResult<Option<Deployment>> {
        Ok(self.tables.write().insert_deployment(deployment))
    }

    async fn update_deployment_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> StoreResult<Option<Deployment>> {
        Ok(self.tables.write().update_deployment_status(id, status))
    }

    async fn find_deployment(&self, id: &DeploymentId) -> StoreResult<Option<Deployment>> {
        Ok(self.tables.read().deployment(id))
    }

    async fn list_deployments(&self, compose_id: &ComposeId) -> StoreResult<Vec<Deployment>> {
        Ok(self.tables.read().deployments_for(compose_id))
    }
}
