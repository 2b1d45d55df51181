// ABOUTME: Wires the orchestrator from a discovered configuration.
// ABOUTME: File store for records, docker compose for builds, config for the admin.

use bosun::admin::ConfiguredAdmin;
use bosun::build::ComposeBuilder;
use bosun::compose::SuffixRandomizer;
use bosun::config::Config;
use bosun::deploy::Orchestrator;
use bosun::error::Result;
use bosun::store::FileStore;
use std::sync::Arc;

/// Build an orchestrator over the state file named by `config`.
pub async fn orchestrator(config: &Config) -> Result<Orchestrator> {
    let store = FileStore::open(&config.state_dir).await?;
    tracing::debug!(state = %store.path().display(), "using file store");

    let builder = ComposeBuilder::new(config, Arc::new(store.clone()));
    let randomizer = SuffixRandomizer::new(Arc::new(store.clone()));
    let admin = ConfiguredAdmin::new(config.admin.clone());

    Ok(Orchestrator::with_store(
        store,
        &config.logs_dir,
        Arc::new(admin),
        Arc::new(builder),
        Arc::new(randomizer),
    ))
}
