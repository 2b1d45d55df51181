// ABOUTME: Plain table storage shared by the memory and file stores.
// ABOUTME: Every mutation touches exactly one row.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{StoreError, StoreResult};
use crate::compose::{Compose, ComposeDetails, ComposePatch, Project};
use crate::deployment::{Deployment, DeploymentStatus};
use crate::types::{ComposeId, DeploymentId, ProjectId};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    projects: HashMap<ProjectId, Project>,
    #[serde(default)]
    composes: HashMap<ComposeId, Compose>,
    #[serde(default)]
    deployments: HashMap<DeploymentId, Deployment>,
}

impl Tables {
    pub fn insert_project(&mut self, project: Project) -> Option<Project> {
        if self.projects.contains_key(&project.project_id) {
            return None;
        }
        self.projects
            .insert(project.project_id.clone(), project.clone());
        Some(project)
    }

    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.projects.get(id).cloned()
    }

    pub fn insert_compose(&mut self, compose: Compose) -> Option<Compose> {
        if self.composes.contains_key(&compose.compose_id) {
            return None;
        }
        self.composes
            .insert(compose.compose_id.clone(), compose.clone());
        Some(compose)
    }

    pub fn compose(&self, id: &ComposeId) -> Option<Compose> {
        self.composes.get(id).cloned()
    }

    pub fn compose_with_relations(&self, id: &ComposeId) -> StoreResult<Option<ComposeDetails>> {
        let Some(compose) = self.compose(id) else {
            return Ok(None);
        };

        let project = self.project(&compose.project_id).ok_or_else(|| {
            StoreError::Integrity(format!(
                "compose {} references missing project {}",
                compose.compose_id, compose.project_id
            ))
        })?;

        let deployments = self.deployments_for(id);

        Ok(Some(ComposeDetails {
            compose,
            project,
            deployments,
        }))
    }

    pub fn update_compose(&mut self, id: &ComposeId, patch: &ComposePatch) -> Option<Compose> {
        let compose = self.composes.get_mut(id)?;
        patch.apply(compose);
        Some(compose.clone())
    }

    pub fn insert_deployment(&mut self, deployment: Deployment) -> Option<Deployment> {
        if self.deployments.contains_key(&deployment.deployment_id) {
            return None;
        }
        self.deployments
            .insert(deployment.deployment_id.clone(), deployment.clone());
        Some(deployment)
    }

    pub fn deployment(&self, id: &DeploymentId) -> Option<Deployment> {
        self.deployments.get(id).cloned()
    }

    pub fn update_deployment_status(
        &mut self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> Option<Deployment> {
        let deployment = self.deployments.get_mut(id)?;
        deployment.status = status;
        Some(deployment.clone())
    }

    pub fn deployments_for(&self, compose_id: &ComposeId) -> Vec<Deployment> {
        let mut deployments: Vec<_> = self
            .deployments
            .values()
            .filter(|d| &d.compose_id == compose_id)
            .cloned()
            .collect();
        deployments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deployments
    }
}
