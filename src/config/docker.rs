// ABOUTME: Settings for the docker compose build executor.
// ABOUTME: Binary to run, extra `up` arguments, and the build timeout.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_binary")]
    pub binary: String,

    #[serde(default = "default_build_timeout", with = "humantime_serde")]
    pub build_timeout: Duration,

    /// Appended to `compose ... up -d --build`.
    #[serde(default = "default_extra_args")]
    pub extra_args: Vec<String>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            build_timeout: default_build_timeout(),
            extra_args: default_extra_args(),
        }
    }
}

fn default_binary() -> String {
    "docker".to_string()
}

fn default_build_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_extra_args() -> Vec<String> {
    vec!["--remove-orphans".to_string()]
}
