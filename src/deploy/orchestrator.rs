// ABOUTME: Orchestrates compose deployments and exposes the compose operations.
// ABOUTME: Sequences lookup, record creation, build, and finalize-on-error.

use nonempty::NonEmpty;
use std::path::PathBuf;
use std::sync::Arc;

use super::attempt::{BuildAbort, DeployAttempt};
use super::lock::ComposeLocks;
use crate::admin::AdminLookup;
use crate::build::BuildInvoker;
use crate::compose::{
    Compose, ComposeDetails, ComposePatch, ComposeRecords, NewCompose, NewProject, Project,
    ProjectRecords, Randomizer, extract_services,
};
use crate::deployment::{Deployment, DeploymentRecords};
use crate::error::{Error, Result};
use crate::store::{ComposeRepository, DeploymentRepository, ProjectRepository};
use crate::types::{ComposeId, ProjectId};

/// Title used when a deploy request carries none.
pub const DEFAULT_DEPLOY_TITLE: &str = "Manual deployment";

/// A request to build and deploy one compose application.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub compose_id: ComposeId,
    pub title: Option<String>,
}

impl DeployRequest {
    pub fn new(compose_id: ComposeId) -> Self {
        Self {
            compose_id,
            title: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_DEPLOY_TITLE)
    }
}

/// Entry point for every compose operation.
///
/// Owns no state of its own beyond the per-compose deploy locks; records live
/// in the injected repositories.
#[derive(Clone)]
pub struct Orchestrator {
    composes: ComposeRecords,
    deployments: DeploymentRecords,
    admin: Arc<dyn AdminLookup>,
    builder: Arc<dyn BuildInvoker>,
    randomizer: Arc<dyn Randomizer>,
    locks: ComposeLocks,
}

impl Orchestrator {
    pub fn new(
        composes: ComposeRecords,
        deployments: DeploymentRecords,
        admin: Arc<dyn AdminLookup>,
        builder: Arc<dyn BuildInvoker>,
        randomizer: Arc<dyn Randomizer>,
    ) -> Self {
        Self {
            composes,
            deployments,
            admin,
            builder,
            randomizer,
            locks: ComposeLocks::new(),
        }
    }

    /// Wire record adapters over one store that holds every table.
    pub fn with_store<S>(
        store: S,
        logs_dir: impl Into<PathBuf>,
        admin: Arc<dyn AdminLookup>,
        builder: Arc<dyn BuildInvoker>,
        randomizer: Arc<dyn Randomizer>,
    ) -> Self
    where
        S: ProjectRepository + ComposeRepository + DeploymentRepository + Clone + 'static,
    {
        let composes = ComposeRecords::new(
            ProjectRecords::new(Arc::new(store.clone())),
            Arc::new(store.clone()),
        );
        let deployments =
            DeploymentRecords::new(Arc::new(store.clone()), Arc::new(store), logs_dir);
        Self::new(composes, deployments, admin, builder, randomizer)
    }

    /// Deploy locks held by in-flight deployments.
    pub fn locks(&self) -> &ComposeLocks {
        &self.locks
    }

    pub async fn create_project(&self, input: NewProject) -> Result<Project> {
        self.composes.projects().create(input).await
    }

    pub async fn find_project(&self, id: &ProjectId) -> Result<Project> {
        self.composes.projects().find_by_id(id).await
    }

    /// Create a compose application with an empty compose file.
    pub async fn create_compose(&self, input: NewCompose) -> Result<Compose> {
        let compose = self.composes.create(input).await?;
        tracing::info!(compose = %compose.compose_id, app = %compose.app_name, "compose created");
        Ok(compose)
    }

    /// Load a compose application with its project and deployments.
    pub async fn find_compose_by_id(&self, id: &ComposeId) -> Result<ComposeDetails> {
        self.composes.find_by_id(id).await
    }

    /// Declared services followed by the "All Services" catch-all.
    pub async fn load_services(&self, id: &ComposeId) -> Result<NonEmpty<String>> {
        let compose = self.composes.find_by_id(id).await?;
        Ok(extract_services(&compose.compose.compose_file))
    }

    /// Apply a partial update. `None` when no compose matched.
    pub async fn update_compose(
        &self,
        id: &ComposeId,
        patch: &ComposePatch,
    ) -> Result<Option<Compose>> {
        self.composes.update(id, patch).await
    }

    /// Rewrite the compose file's identifiers via the randomizer.
    pub async fn randomize_compose(&self, id: &ComposeId) -> Result<String> {
        self.randomizer.randomize(id).await
    }

    /// Build and deploy a compose application.
    ///
    /// Creates one `running` deployment record before the build starts. If the
    /// build fails the record is written as `error` before the build error is
    /// returned unchanged; a panicking build is finalized the same way and then
    /// resumed. On success the record is left for the build invoker to finalize.
    ///
    /// Deploys of the same compose are serialized; the lock is taken after both
    /// lookups succeed, so a failed lookup never waits and never writes. The
    /// compose is loaded again once the lock is held, so a queued deploy
    /// builds the definition as it stands when its turn comes.
    pub async fn deploy_compose(&self, request: DeployRequest) -> Result<Deployment> {
        self.composes.find_by_id(&request.compose_id).await?;
        let admin = self.admin.find_admin().await?;

        let _lock = self.locks.acquire(&request.compose_id).await;
        let compose = self.composes.find_by_id(&request.compose_id).await?;

        let deployment = self
            .deployments
            .create(&request.compose_id, request.title_or_default())
            .await?;
        tracing::info!(
            compose = %request.compose_id,
            deployment = %deployment.deployment_id,
            admin = %admin.name,
            "deployment created"
        );

        let running = DeployAttempt::new(deployment).start_build();
        match running.build(self.builder.as_ref(), &compose).await {
            Ok(handed_off) => Ok(handed_off.into_deployment()),
            Err((running, abort)) => {
                running.fail(&self.deployments, &abort.describe()).await?;
                match abort {
                    BuildAbort::Failed(err) => Err(Error::Build(err)),
                    BuildAbort::Panicked(payload) => std::panic::resume_unwind(payload),
                }
            }
        }
    }
}
