// ABOUTME: Resolves the administrator a deployment is performed as.
// ABOUTME: Lookup failures propagate unchanged to the caller.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::AdminConfig;
use crate::error::{Error, Result};

/// The acting administrative principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admin {
    pub name: String,
    pub email: String,
}

/// Source of the acting administrator.
#[async_trait]
pub trait AdminLookup: Send + Sync {
    async fn find_admin(&self) -> Result<Admin>;
}

/// Administrator taken from the `admin` section of the config file.
#[derive(Debug, Clone)]
pub struct ConfiguredAdmin {
    config: Option<AdminConfig>,
}

impl ConfiguredAdmin {
    pub fn new(config: Option<AdminConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AdminLookup for ConfiguredAdmin {
    async fn find_admin(&self) -> Result<Admin> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| Error::not_found("admin"))?;

        Ok(Admin {
            name: config.name.resolve()?,
            email: config.email.resolve()?,
        })
    }
}
