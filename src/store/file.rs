// ABOUTME: JSON file-backed repository implementation.
// ABOUTME: Mutations lock, reload, and atomically rewrite the state file (temp file + rename).

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::tables::Tables;
use super::{
    ComposeRepository, DeploymentRepository, ProjectRepository, StoreError, StoreResult,
};
use crate::compose::{Compose, ComposeDetails, ComposePatch, Project};
use crate::deployment::{Deployment, DeploymentStatus};
use crate::types::{ComposeId, DeploymentId, ProjectId};

const STATE_FILENAME: &str = "state.json";
const LOCK_FILENAME: &str = "state.lock";

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Persistent store holding all tables in one JSON document.
///
/// Every read loads the document from disk, so separate processes sharing a
/// state directory see each other's writes. A mutation holds an exclusive
/// advisory lock on `state.lock` while it reloads the document, applies one
/// row change and renames the new document into place. Nothing is kept in
/// memory between calls, so a failed write leaves no trace in this handle.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    write_gate: Arc<tokio::sync::Mutex<()>>,
}

impl FileStore {
    /// Open (or create) the store inside `state_dir`.
    ///
    /// Fails if an existing state file cannot be parsed.
    pub async fn open(state_dir: &Path) -> StoreResult<Self> {
        tokio::fs::create_dir_all(state_dir)
            .await
            .map_err(map_err!(Write))?;

        let store = Self {
            path: state_dir.join(STATE_FILENAME),
            lock_path: state_dir.join(LOCK_FILENAME),
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
        };
        store.load().await?;

        debug!(path = %store.path.display(), "file store opened");
        Ok(store)
    }

    /// Path of the backing state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<Tables> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(map_err!(Deserialize)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Tables::default()),
            Err(e) => Err(StoreError::Read(e.to_string())),
        }
    }

    /// Take the cross-process write lock. Released when the file is dropped.
    async fn lock(&self) -> StoreResult<std::fs::File> {
        let path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)?;
            file.lock_exclusive()?;
            Ok::<_, std::io::Error>(file)
        })
        .await
        .map_err(map_err!(Write))?
        .map_err(map_err!(Write))
    }

    /// Apply a single-row mutation to the current document and persist it if a row changed.
    async fn mutate<T, F>(&self, op: F) -> StoreResult<Option<T>>
    where
        F: FnOnce(&mut Tables) -> Option<T> + Send,
        T: Send,
    {
        let _gate = self.write_gate.lock().await;
        let _lock = self.lock().await?;

        let mut tables = self.load().await?;
        let result = op(&mut tables);
        if result.is_some() {
            let bytes = serde_json::to_vec_pretty(&tables).map_err(map_err!(Serialize))?;
            self.persist(&bytes).await?;
        }
        Ok(result)
    }

    async fn persist(&self, bytes: &[u8]) -> StoreResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(map_err!(Write))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(map_err!(Write))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "state persisted");
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for FileStore {
    async fn insert_project(&self, project: Project) -> StoreResult<Option<Project>> {
        self.mutate(|t| t.insert_project(project)).await
    }

    async fn find_project(&self, id: &ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.load().await?.project(id))
    }
}

#[async_trait]
impl ComposeRepository for FileStore {
    async fn insert_compose(&self, compose: Compose) -> StoreResult<Option<Compose>> {
        self.mutate(|t| t.insert_compose(compose)).await
    }

    async fn find_compose(&self, id: &ComposeId) -> StoreResult<Option<Compose>> {
        Ok(self.load().await?.compose(id))
    }

    async fn find_compose_with_relations(
        &self,
        id: &ComposeId,
    ) -> StoreResult<Option<ComposeDetails>> {
        self.load().await?.compose_with_relations(id)
    }

    async fn update_compose(
        &self,
        id: &ComposeId,
        patch: &ComposePatch,
    ) -> StoreResult<Option<Compose>> {
        self.mutate(|t| t.update_compose(id, patch)).await
    }
}

#[async_trait]
impl DeploymentRepository for FileStore {
    async fn insert_deployment(&self, deployment: Deployment) -> StoreResult<Option<Deployment>> {
        self.mutate(|t| t.insert_deployment(deployment)).await
    }

    async fn update_deployment_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> StoreResult<Option<Deployment>> {
        self.mutate(|t| t.update_deployment_status(id, status)).await
    }

    async fn find_deployment(&self, id: &DeploymentId) -> StoreResult<Option<Deployment>> {
        Ok(self.load().await?.deployment(id))
    }

    async fn list_deployments(&self, compose_id: &ComposeId) -> StoreResult<Vec<Deployment>> {
        Ok(self.load().await?.deployments_for(compose_id))
    }
}
