// ABOUTME: Deployment attempt records and their status values.
// ABOUTME: A record is created running and must end in success or error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::types::{ComposeId, DeploymentId};

/// Status of a deployment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    /// Build in progress (or abandoned by a crash).
    Running,
    Success,
    Error,
}

impl DeploymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Running => "running",
            DeploymentStatus::Success => "success",
            DeploymentStatus::Error => "error",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Audit record for one attempt to build and deploy a compose application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub deployment_id: DeploymentId,
    pub compose_id: ComposeId,
    pub title: String,
    pub log_path: PathBuf,
    pub status: DeploymentStatus,
    pub created_at: DateTime<Utc>,
}
