// ABOUTME: Record adapters for projects and compose applications.
// ABOUTME: Maps repository results onto NotFound / BadRequest errors.

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::model::{Compose, ComposeDetails, ComposePatch, NewCompose, NewProject, Project};
use crate::error::{Error, Result};
use crate::store::{ComposeRepository, ProjectRepository};
use crate::types::{AppName, ComposeId, ProjectId};

/// Create and look up projects.
#[derive(Clone)]
pub struct ProjectRecords {
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectRecords {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self { projects }
    }

    pub async fn create(&self, input: NewProject) -> Result<Project> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("project name cannot be empty".to_string()));
        }

        let project = Project {
            project_id: ProjectId::generate(),
            name: name.to_string(),
            description: input.description,
            created_at: Utc::now(),
        };

        self.projects
            .insert_project(project)
            .await?
            .ok_or_else(|| Error::BadRequest("error input: inserting project".to_string()))
    }

    pub async fn find_by_id(&self, id: &ProjectId) -> Result<Project> {
        self.projects
            .find_project(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("project {id}")))
    }
}

/// Create, fetch, and update compose applications.
#[derive(Clone)]
pub struct ComposeRecords {
    projects: ProjectRecords,
    composes: Arc<dyn ComposeRepository>,
}

impl ComposeRecords {
    pub fn new(projects: ProjectRecords, composes: Arc<dyn ComposeRepository>) -> Self {
        Self { projects, composes }
    }

    pub fn projects(&self) -> &ProjectRecords {
        &self.projects
    }

    /// Insert a new compose application.
    ///
    /// The compose file text always starts empty, whatever the input carries.
    /// Fails with `NotFound` if the project is missing and `BadRequest` if the
    /// store writes no row.
    pub async fn create(&self, input: NewCompose) -> Result<Compose> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("compose name cannot be empty".to_string()));
        }

        self.projects.find_by_id(&input.project_id).await?;

        if input.compose_file.is_some() {
            debug!("ignoring compose file supplied at creation");
        }

        let compose = Compose {
            compose_id: ComposeId::generate(),
            name: name.to_string(),
            app_name: input.app_name.unwrap_or_else(|| AppName::derive(name)),
            description: input.description,
            env: input.env,
            compose_file: String::new(),
            project_id: input.project_id,
            created_at: Utc::now(),
        };

        self.composes
            .insert_compose(compose)
            .await?
            .ok_or_else(|| Error::BadRequest("error input: inserting compose".to_string()))
    }

    /// Load a compose application with its project and deployments.
    pub async fn find_by_id(&self, id: &ComposeId) -> Result<ComposeDetails> {
        self.composes
            .find_compose_with_relations(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("compose {id}")))
    }

    /// Apply a partial update. `None` when no compose matched.
    pub async fn update(&self, id: &ComposeId, patch: &ComposePatch) -> Result<Option<Compose>> {
        let updated = self.composes.update_compose(id, patch).await?;
        if updated.is_some() {
            debug!(compose = %id, "compose updated");
        }
        Ok(updated)
    }
}
