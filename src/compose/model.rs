// ABOUTME: Project and compose records as persisted by the store.
// ABOUTME: Includes creation inputs, partial updates, and the fetch-with-relations view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deployment::Deployment;
use crate::types::{AppName, ComposeId, ProjectId};

/// A project groups compose applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a project.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

/// A stored compose application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compose {
    pub compose_id: ComposeId,
    pub name: String,
    pub app_name: AppName,
    #[serde(default)]
    pub description: Option<String>,
    /// Contents of the `.env` file written next to the compose file.
    #[serde(default)]
    pub env: Option<String>,
    /// Raw compose specification text. Empty until populated by an update.
    #[serde(default)]
    pub compose_file: String,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a compose application.
///
/// `compose_file` is accepted for symmetry with updates but always discarded on create.
#[derive(Debug, Clone)]
pub struct NewCompose {
    pub name: String,
    pub project_id: ProjectId,
    pub app_name: Option<AppName>,
    pub description: Option<String>,
    pub env: Option<String>,
    pub compose_file: Option<String>,
}

impl NewCompose {
    pub fn new(name: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            name: name.into(),
            project_id,
            app_name: None,
            description: None,
            env: None,
            compose_file: None,
        }
    }
}

/// Partial update of a compose application. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposePatch {
    pub name: Option<String>,
    pub app_name: Option<AppName>,
    pub description: Option<String>,
    pub env: Option<String>,
    pub compose_file: Option<String>,
}

impl ComposePatch {
    /// Patch that only replaces the compose file text.
    pub fn compose_file(text: impl Into<String>) -> Self {
        Self {
            compose_file: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields to a record.
    pub fn apply(&self, compose: &mut Compose) {
        if let Some(ref name) = self.name {
            compose.name = name.clone();
        }
        if let Some(ref app_name) = self.app_name {
            compose.app_name = app_name.clone();
        }
        if let Some(ref description) = self.description {
            compose.description = Some(description.clone());
        }
        if let Some(ref env) = self.env {
            compose.env = Some(env.clone());
        }
        if let Some(ref compose_file) = self.compose_file {
            compose.compose_file = compose_file.clone();
        }
    }
}

/// A compose application with its project and every deployment attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeDetails {
    #[serde(flatten)]
    pub compose: Compose,
    pub project: Project,
    /// Newest first.
    pub deployments: Vec<Deployment>,
}
