// ABOUTME: Record adapter for deployment attempts.
// ABOUTME: Allocates log files and writes single-row status transitions.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::model::{Deployment, DeploymentStatus};
use crate::error::{Error, Result};
use crate::store::{ComposeRepository, DeploymentRepository};
use crate::types::{AppName, ComposeId, DeploymentId};

/// First line written to every deployment log.
const LOG_HEADER: &str = "Initializing deployment\n";

/// Create deployment records and move them to terminal states.
#[derive(Clone)]
pub struct DeploymentRecords {
    composes: Arc<dyn ComposeRepository>,
    deployments: Arc<dyn DeploymentRepository>,
    logs_dir: PathBuf,
}

impl DeploymentRecords {
    pub fn new(
        composes: Arc<dyn ComposeRepository>,
        deployments: Arc<dyn DeploymentRepository>,
        logs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            composes,
            deployments,
            logs_dir: logs_dir.into(),
        }
    }

    /// Create a `running` deployment for a compose, with a fresh log file.
    pub async fn create(&self, compose_id: &ComposeId, title: &str) -> Result<Deployment> {
        let compose = self
            .composes
            .find_compose(compose_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("compose {compose_id}")))?;

        let deployment_id = DeploymentId::generate();
        let deployment = Deployment {
            log_path: self.log_path(&compose.app_name, &deployment_id),
            deployment_id,
            compose_id: compose_id.clone(),
            title: title.to_string(),
            status: DeploymentStatus::Running,
            created_at: Utc::now(),
        };

        let deployment = self
            .deployments
            .insert_deployment(deployment)
            .await?
            .ok_or_else(|| Error::BadRequest("error input: inserting deployment".to_string()))?;

        // The row exists now; a record without a log can never be built.
        if let Err(err) = init_log(&deployment.log_path).await {
            warn!(
                deployment = %deployment.deployment_id,
                error = %err,
                "failed to create deployment log"
            );
            self.deployments
                .update_deployment_status(&deployment.deployment_id, DeploymentStatus::Error)
                .await?;
            return Err(err);
        }

        debug!(
            deployment = %deployment.deployment_id,
            log = %deployment.log_path.display(),
            "deployment record created"
        );
        Ok(deployment)
    }

    /// Set the status of a deployment.
    pub async fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> Result<Deployment> {
        let deployment = self
            .deployments
            .update_deployment_status(id, status)
            .await?
            .ok_or_else(|| Error::not_found(format!("deployment {id}")))?;

        debug!(deployment = %id, %status, "deployment status updated");
        Ok(deployment)
    }

    /// `<logs_dir>/<app>/<app>-<deployment id>.log`
    fn log_path(&self, app_name: &AppName, id: &DeploymentId) -> PathBuf {
        self.logs_dir
            .join(app_name.as_str())
            .join(format!("{app_name}-{id}.log"))
    }
}

async fn init_log(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, LOG_HEADER).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Compose;
    use crate::error::ErrorKind;
    use crate::store::{MemoryStore, StoreResult};
    use crate::types::ProjectId;

    /// Deployment table that never accepts a row.
    struct RejectingDeployments;

    #[async_trait::async_trait]
    impl DeploymentRepository for RejectingDeployments {
        async fn insert_deployment(&self, _: Deployment) -> StoreResult<Option<Deployment>> {
            Ok(None)
        }

        async fn update_deployment_status(
            &self,
            _: &DeploymentId,
            _: DeploymentStatus,
        ) -> StoreResult<Option<Deployment>> {
            Ok(None)
        }

        async fn find_deployment(&self, _: &DeploymentId) -> StoreResult<Option<Deployment>> {
            Ok(None)
        }

        async fn list_deployments(&self, _: &ComposeId) -> StoreResult<Vec<Deployment>> {
            Ok(Vec::new())
        }
    }

    async fn seeded() -> (MemoryStore, tempfile::TempDir, DeploymentRecords) {
        let store = MemoryStore::new();
        store
            .insert_compose(Compose {
                compose_id: ComposeId::new("c1"),
                name: "shop".to_string(),
                app_name: AppName::new("shop-abc").unwrap(),
                description: None,
                env: None,
                compose_file: String::new(),
                project_id: ProjectId::new("p1"),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let records = DeploymentRecords::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            dir.path(),
        );
        (store, dir, records)
    }

    #[tokio::test]
    async fn create_allocates_log_under_app_dir() {
        let (_store, dir, records) = seeded().await;
        let deployment = records
            .create(&ComposeId::new("c1"), "Manual deployment")
            .await
            .unwrap();

        assert_eq!(deployment.status, DeploymentStatus::Running);
        assert!(deployment.log_path.starts_with(dir.path().join("shop-abc")));
        let log = std::fs::read_to_string(&deployment.log_path).unwrap();
        assert_eq!(log, LOG_HEADER);
    }

    #[tokio::test]
    async fn each_deployment_gets_its_own_log() {
        let (_store, _dir, records) = seeded().await;
        let first = records.create(&ComposeId::new("c1"), "a").await.unwrap();
        std::fs::write(&first.log_path, "first build output\n").unwrap();

        let second = records.create(&ComposeId::new("c1"), "b").await.unwrap();

        assert_ne!(first.log_path, second.log_path);
        let name = second.log_path.file_name().unwrap().to_string_lossy();
        assert!(name.contains(second.deployment_id.as_str()));
        assert_eq!(
            std::fs::read_to_string(&first.log_path).unwrap(),
            "first build output\n"
        );
    }

    #[tokio::test]
    async fn rejected_insert_leaves_no_log_behind() {
        let (store, dir, _) = seeded().await;
        let records = DeploymentRecords::new(
            Arc::new(store.clone()),
            Arc::new(RejectingDeployments),
            dir.path(),
        );

        let err = records.create(&ComposeId::new("c1"), "x").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(!dir.path().join("shop-abc").exists());
    }

    #[tokio::test]
    async fn unwritable_log_marks_record_error() {
        let (store, dir, records) = seeded().await;
        // A plain file where the app's log directory should go.
        std::fs::write(dir.path().join("shop-abc"), "").unwrap();

        records
            .create(&ComposeId::new("c1"), "x")
            .await
            .unwrap_err();

        let rows = store.list_deployments(&ComposeId::new("c1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DeploymentStatus::Error);
    }

    #[tokio::test]
    async fn create_for_unknown_compose_is_not_found() {
        let (store, _dir, records) = seeded().await;
        let err = records
            .create(&ComposeId::new("missing"), "x")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(
            store
                .list_deployments(&ComposeId::new("missing"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn update_status_of_unknown_deployment_is_not_found() {
        let (_store, _dir, records) = seeded().await;
        let err = records
            .update_status(&DeploymentId::new("nope"), DeploymentStatus::Error)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
