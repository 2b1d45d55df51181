// ABOUTME: Configuration types and parsing for bosun.yml.
// ABOUTME: Handles YAML parsing, file discovery, relative paths, and env var references.

mod docker;
mod env_value;

pub use docker::DockerConfig;
pub use env_value::EnvValue;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "bosun.yml";
pub const CONFIG_FILENAME_ALT: &str = "bosun.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".bosun/config.yml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BOSUN_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the state file.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Compose files are written to `<compose_dir>/<app_name>/`.
    #[serde(default = "default_compose_dir")]
    pub compose_dir: PathBuf,

    /// Deployment logs are written to `<logs_dir>/<app_name>/`.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    #[serde(default)]
    pub docker: DockerConfig,

    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

/// The administrator deployments are performed as.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub name: EnvValue,
    pub email: EnvValue,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".bosun/state")
}

fn default_compose_dir() -> PathBuf {
    PathBuf::from(".bosun/compose")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from(".bosun/logs")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            state_dir: default_state_dir(),
            compose_dir: default_compose_dir(),
            logs_dir: default_logs_dir(),
            docker: DockerConfig::default(),
            admin: None,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means "all defaults".
        let config: Option<Self> = serde_yaml::from_str(yaml)?;
        Ok(config.unwrap_or_default())
    }

    /// Load a config file, resolving relative directories against its location.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        let base = config_root(path);
        Ok(config.relative_to(&base))
    }

    /// Find the config for `dir`: `$BOSUN_CONFIG` first, then the usual filenames.
    pub fn discover(dir: &Path) -> Result<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            let path = dir.join(explicit);
            if !path.exists() {
                return Err(Error::ConfigNotFound(path));
            }
            return Self::load(&path);
        }

        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Make relative directories absolute under `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.state_dir,
            &mut self.compose_dir,
            &mut self.logs_dir,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }

    pub fn template() -> Self {
        Config {
            admin: Some(AdminConfig {
                name: EnvValue::from("admin"),
                email: EnvValue::FromEnv {
                    var: "BOSUN_ADMIN_EMAIL".to_string(),
                    default: Some("admin@localhost".to_string()),
                },
            }),
            ..Config::default()
        }
    }
}

/// Directory the config's relative paths hang off: the project directory,
/// even when the file lives in `.bosun/`.
fn config_root(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if parent.file_name().is_some_and(|name| name == ".bosun") {
        parent.parent().unwrap_or(parent).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::template());
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"state_dir: {}
compose_dir: {}
logs_dir: {}
docker:
  binary: {}
  build_timeout: {}
admin:
  name: admin
  email:
    env: BOSUN_ADMIN_EMAIL
    default: admin@localhost
"#,
        config.state_dir.display(),
        config.compose_dir.display(),
        config.logs_dir.display(),
        config.docker.binary,
        humantime_serde::re::humantime::format_duration(config.docker.build_timeout),
    )
}
