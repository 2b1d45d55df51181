// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, fake build invokers and admin lookups, and a faulty store.

// Each test binary only uses some of these helpers, so allow dead_code.
#![allow(dead_code)]

use async_trait::async_trait;
use bosun::admin::{Admin, AdminLookup};
use bosun::build::{BuildError, BuildInvoker};
use bosun::compose::{
    Compose, ComposeDetails, ComposeRecords, NewCompose, NewProject, ProjectRecords,
    SuffixRandomizer,
};
use bosun::deploy::Orchestrator;
use bosun::deployment::{Deployment, DeploymentRecords, DeploymentStatus};
use bosun::error::{Error, Result};
use bosun::store::{DeploymentRepository, MemoryStore, StoreError, StoreResult};
use bosun::types::{ComposeId, DeploymentId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("bosun=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// What a [`RecordingBuilder`] does when invoked.
#[derive(Debug, Clone)]
pub enum BuildBehavior {
    /// Mark the deployment `success` and return `Ok`.
    Succeed,
    /// Return `Ok` without touching the record.
    HandOff,
    /// Return a custom build error with this message.
    Fail(String),
    /// Panic with this message.
    Panic(String),
}

/// Build invoker that records every call and acts per its [`BuildBehavior`].
pub struct RecordingBuilder {
    behavior: BuildBehavior,
    deployments: Arc<dyn DeploymentRepository>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(ComposeId, DeploymentId)>>,
    compose_files: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingBuilder {
    pub fn new(behavior: BuildBehavior, deployments: Arc<dyn DeploymentRepository>) -> Self {
        Self {
            behavior,
            deployments,
            delay: None,
            calls: Mutex::new(Vec::new()),
            compose_files: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Hold every build open for `delay` before acting.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(ComposeId, DeploymentId)> {
        self.calls.lock().clone()
    }

    /// Compose file text handed to each build, in call order.
    pub fn compose_files(&self) -> Vec<String> {
        self.compose_files.lock().clone()
    }

    /// Highest number of builds observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildInvoker for RecordingBuilder {
    async fn build(
        &self,
        compose: &ComposeDetails,
        deployment: &Deployment,
    ) -> std::result::Result<(), BuildError> {
        self.calls.lock().push((
            compose.compose.compose_id.clone(),
            deployment.deployment_id.clone(),
        ));
        self.compose_files
            .lock()
            .push(compose.compose.compose_file.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.behavior {
            BuildBehavior::Succeed => {
                let id = &deployment.deployment_id;
                self.deployments
                    .update_deployment_status(id, DeploymentStatus::Success)
                    .await
                    .map_err(|e| BuildError::custom(e.to_string()))?;
                Ok(())
            }
            BuildBehavior::HandOff => Ok(()),
            BuildBehavior::Fail(message) => Err(BuildError::custom(message.clone())),
            BuildBehavior::Panic(message) => panic!("{}", message),
        }
    }
}

/// Admin lookup that always resolves to the same principal.
pub struct FixedAdmin;

#[async_trait]
impl AdminLookup for FixedAdmin {
    async fn find_admin(&self) -> Result<Admin> {
        Ok(Admin {
            name: "admin".to_string(),
            email: "admin@localhost".to_string(),
        })
    }
}

/// Admin lookup that always fails, counting how often it was asked.
#[derive(Default)]
pub struct FailingAdmin {
    pub calls: AtomicUsize,
}

#[async_trait]
impl AdminLookup for FailingAdmin {
    async fn find_admin(&self) -> Result<Admin> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::NotFound("admin".to_string()))
    }
}

/// Deployment repository over a [`MemoryStore`] that can refuse status writes.
#[derive(Clone)]
pub struct FaultyDeployments {
    inner: MemoryStore,
    fail_status_writes: Arc<AtomicBool>,
    inserts: Arc<AtomicUsize>,
    status_writes: Arc<AtomicUsize>,
}

impl FaultyDeployments {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_status_writes: Arc::new(AtomicBool::new(false)),
            inserts: Arc::new(AtomicUsize::new(0)),
            status_writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fail_status_writes(&self) {
        self.fail_status_writes.store(true, Ordering::SeqCst);
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Status updates attempted, including refused ones.
    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentRepository for FaultyDeployments {
    async fn insert_deployment(&self, deployment: Deployment) -> StoreResult<Option<Deployment>> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_deployment(deployment).await
    }

    async fn update_deployment_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> StoreResult<Option<Deployment>> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("disk full".to_string()));
        }
        self.inner.update_deployment_status(id, status).await
    }

    async fn find_deployment(&self, id: &DeploymentId) -> StoreResult<Option<Deployment>> {
        self.inner.find_deployment(id).await
    }

    async fn list_deployments(&self, compose_id: &ComposeId) -> StoreResult<Vec<Deployment>> {
        self.inner.list_deployments(compose_id).await
    }
}

/// An orchestrator over in-memory records, with its collaborators exposed.
pub struct Harness {
    pub store: MemoryStore,
    pub deployments: FaultyDeployments,
    pub builder: Arc<RecordingBuilder>,
    pub orchestrator: Orchestrator,
    pub logs: tempfile::TempDir,
}

impl Harness {
    pub fn new(behavior: BuildBehavior) -> Self {
        Self::build(behavior, None, Arc::new(FixedAdmin))
    }

    pub fn with_delay(behavior: BuildBehavior, delay: Duration) -> Self {
        Self::build(behavior, Some(delay), Arc::new(FixedAdmin))
    }

    pub fn with_admin(behavior: BuildBehavior, admin: Arc<dyn AdminLookup>) -> Self {
        Self::build(behavior, None, admin)
    }

    fn build(
        behavior: BuildBehavior,
        delay: Option<Duration>,
        admin: Arc<dyn AdminLookup>,
    ) -> Self {
        init_tracing();
        let store = MemoryStore::new();
        let deployments = FaultyDeployments::new(store.clone());
        let logs = tempfile::tempdir().unwrap();

        let mut builder = RecordingBuilder::new(behavior, Arc::new(deployments.clone()));
        if let Some(delay) = delay {
            builder = builder.with_delay(delay);
        }
        let builder = Arc::new(builder);

        let composes = ComposeRecords::new(
            ProjectRecords::new(Arc::new(store.clone())),
            Arc::new(store.clone()),
        );
        let records = DeploymentRecords::new(
            Arc::new(store.clone()),
            Arc::new(deployments.clone()),
            logs.path(),
        );
        let orchestrator = Orchestrator::new(
            composes,
            records,
            admin,
            builder.clone(),
            Arc::new(SuffixRandomizer::new(Arc::new(store.clone()))),
        );

        Self {
            store,
            deployments,
            builder,
            orchestrator,
            logs,
        }
    }

    /// Create a project and a compose application inside it.
    pub async fn seed_compose(&self, name: &str) -> Compose {
        let project = self
            .orchestrator
            .create_project(NewProject {
                name: format!("{name} project"),
                description: None,
            })
            .await
            .unwrap();
        self.orchestrator
            .create_compose(NewCompose::new(name, project.project_id))
            .await
            .unwrap()
    }

    pub async fn deployments_of(&self, id: &ComposeId) -> Vec<Deployment> {
        self.deployments.list_deployments(id).await.unwrap()
    }
}
