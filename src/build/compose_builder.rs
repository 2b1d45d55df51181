// ABOUTME: Builds and starts a compose application with `docker compose up`.
// ABOUTME: Streams process output into the deployment log and records success.

use async_trait::async_trait;
use snafu::ResultExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{
    BuildError, BuildInvoker, ExitedSnafu, FinalizeSnafu, OpenLogSnafu, PrepareSnafu, SpawnSnafu,
};
use crate::compose::{Compose, ComposeDetails};
use crate::config::{Config, DockerConfig};
use crate::deployment::{Deployment, DeploymentStatus};
use crate::store::DeploymentRepository;

const COMPOSE_FILENAME: &str = "docker-compose.yml";
const ENV_FILENAME: &str = ".env";

/// Runs `<binary> compose -p <app> -f <file> up -d --build` for a compose application.
#[derive(Clone)]
pub struct ComposeBuilder {
    docker: DockerConfig,
    compose_dir: PathBuf,
    deployments: Arc<dyn DeploymentRepository>,
}

impl ComposeBuilder {
    pub fn new(config: &Config, deployments: Arc<dyn DeploymentRepository>) -> Self {
        Self {
            docker: config.docker.clone(),
            compose_dir: config.compose_dir.clone(),
            deployments,
        }
    }

    /// Working directory for one application.
    pub fn app_dir(&self, compose: &Compose) -> PathBuf {
        self.compose_dir.join(compose.app_name.as_str())
    }

    /// Arguments passed to the docker binary.
    pub fn command_args(&self, compose: &Compose, compose_path: &Path) -> Vec<String> {
        let mut args = vec![
            "compose".to_string(),
            "-p".to_string(),
            compose.app_name.to_string(),
            "-f".to_string(),
            compose_path.display().to_string(),
            "up".to_string(),
            "-d".to_string(),
            "--build".to_string(),
        ];
        args.extend(self.docker.extra_args.iter().cloned());
        args
    }

    /// Write the compose file (and `.env`, if any) into the app directory.
    async fn write_files(&self, compose: &Compose) -> Result<PathBuf, BuildError> {
        let dir = self.app_dir(compose);
        tokio::fs::create_dir_all(&dir)
            .await
            .context(PrepareSnafu { path: dir.clone() })?;

        let compose_path = dir.join(COMPOSE_FILENAME);
        tokio::fs::write(&compose_path, &compose.compose_file)
            .await
            .context(PrepareSnafu {
                path: compose_path.clone(),
            })?;

        if let Some(ref env) = compose.env {
            let env_path = dir.join(ENV_FILENAME);
            tokio::fs::write(&env_path, env)
                .await
                .context(PrepareSnafu { path: env_path })?;
        }

        Ok(compose_path)
    }

    /// Run the compose command with output appended to the log.
    async fn run(&self, args: &[String], cwd: &Path, log_path: &Path) -> Result<(), BuildError> {
        let command_line = format!("{} {}", self.docker.binary, args.join(" "));

        let mut log = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .await
            .context(OpenLogSnafu { path: log_path })?;
        log.write_all(format!("$ {command_line}\n").as_bytes())
            .await
            .context(OpenLogSnafu { path: log_path })?;
        log.flush()
            .await
            .context(OpenLogSnafu { path: log_path })?;

        let stdout = log.into_std().await;
        let stderr = stdout
            .try_clone()
            .context(OpenLogSnafu { path: log_path })?;

        let mut child = Command::new(&self.docker.binary)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .context(SpawnSnafu {
                program: self.docker.binary.clone(),
            })?;

        let timeout = self.docker.build_timeout;
        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => status.context(SpawnSnafu {
                program: self.docker.binary.clone(),
            })?,
            Err(_) => {
                tracing::warn!(
                    "build exceeded {}s, killing `{}`",
                    timeout.as_secs(),
                    command_line
                );
                if let Err(e) = child.kill().await {
                    tracing::warn!("failed to kill `{}`: {}", command_line, e);
                }
                return Err(BuildError::TimedOut { timeout });
            }
        };

        if !status.success() {
            return ExitedSnafu {
                command: command_line,
                code: status.code(),
            }
            .fail();
        }
        Ok(())
    }
}

#[async_trait]
impl BuildInvoker for ComposeBuilder {
    async fn build(
        &self,
        compose: &ComposeDetails,
        deployment: &Deployment,
    ) -> Result<(), BuildError> {
        let compose = &compose.compose;
        let compose_path = self.write_files(compose).await?;
        let args = self.command_args(compose, &compose_path);

        tracing::info!(
            app = %compose.app_name,
            log = %deployment.log_path.display(),
            "running docker compose"
        );
        self.run(&args, &self.app_dir(compose), &deployment.log_path)
            .await?;

        self.deployments
            .update_deployment_status(&deployment.deployment_id, DeploymentStatus::Success)
            .await
            .context(FinalizeSnafu)?;

        tracing::info!(deployment = %deployment.deployment_id, "build finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{AppName, ComposeId, ProjectId};
    use chrono::Utc;

    fn compose() -> Compose {
        Compose {
            compose_id: ComposeId::new("c1"),
            name: "shop".to_string(),
            app_name: AppName::new("shop-abc").unwrap(),
            description: None,
            env: Some("PORT=8080\n".to_string()),
            compose_file: "services:\n  web:\n    image: nginx\n".to_string(),
            project_id: ProjectId::new("p1"),
            created_at: Utc::now(),
        }
    }

    fn builder(compose_dir: &Path) -> ComposeBuilder {
        let config = Config {
            compose_dir: compose_dir.to_path_buf(),
            ..Config::default()
        };
        ComposeBuilder::new(&config, Arc::new(MemoryStore::new()))
    }

    #[test]
    fn command_args_target_app_project() {
        let builder = builder(Path::new("/srv/compose"));
        let compose = compose();
        let path = Path::new("/srv/compose/shop-abc/docker-compose.yml");
        let args = builder.command_args(&compose, path);
        assert_eq!(
            args,
            [
                "compose",
                "-p",
                "shop-abc",
                "-f",
                "/srv/compose/shop-abc/docker-compose.yml",
                "up",
                "-d",
                "--build",
                "--remove-orphans",
            ]
        );
    }

    #[tokio::test]
    async fn write_files_places_compose_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let builder = builder(dir.path());
        let path = builder.write_files(&compose()).await.unwrap();

        assert_eq!(path, dir.path().join("shop-abc").join(COMPOSE_FILENAME));
        assert!(std::fs::read_to_string(&path).unwrap().contains("nginx"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("shop-abc").join(ENV_FILENAME)).unwrap(),
            "PORT=8080\n"
        );
    }
}
