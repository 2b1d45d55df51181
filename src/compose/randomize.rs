// ABOUTME: Rewrites compose file identifiers with a random suffix.
// ABOUTME: Lets several copies of one template run side by side without name clashes.

use async_trait::async_trait;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::model::ComposePatch;
use crate::error::{Error, Result};
use crate::store::ComposeRepository;
use crate::types::{ComposeId, random_suffix};

const SUFFIX_LEN: usize = 8;

/// Rewrites the identifiers of a stored compose file.
#[async_trait]
pub trait Randomizer: Send + Sync {
    /// Randomize the compose file of `compose_id` and return the new text.
    async fn randomize(&self, compose_id: &ComposeId) -> Result<String>;
}

/// Appends one random suffix to every service, volume, and network name.
#[derive(Clone)]
pub struct SuffixRandomizer {
    composes: Arc<dyn ComposeRepository>,
}

impl SuffixRandomizer {
    pub fn new(composes: Arc<dyn ComposeRepository>) -> Self {
        Self { composes }
    }
}

#[async_trait]
impl Randomizer for SuffixRandomizer {
    async fn randomize(&self, compose_id: &ComposeId) -> Result<String> {
        let compose = self
            .composes
            .find_compose(compose_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("compose {compose_id}")))?;

        let suffix = random_suffix(SUFFIX_LEN);
        let text = randomize_compose_file(&compose.compose_file, &suffix)?;

        self.composes
            .update_compose(compose_id, &ComposePatch::compose_file(text.clone()))
            .await?
            .ok_or_else(|| Error::not_found(format!("compose {compose_id}")))?;

        tracing::info!(compose = %compose_id, %suffix, "compose file randomized");
        Ok(text)
    }
}

/// Rename services, top-level volumes, and top-level networks to `<name>-<suffix>`,
/// rewriting the references services make to them.
///
/// Fails with `BadRequest` when the text has no `services` mapping.
pub fn randomize_compose_file(text: &str, suffix: &str) -> Result<String> {
    let mut doc: Value = serde_yaml::from_str(text)
        .map_err(|e| Error::BadRequest(format!("compose file is not valid YAML: {e}")))?;

    let root = doc
        .as_mapping_mut()
        .ok_or_else(|| Error::BadRequest("compose file is not a mapping".to_string()))?;

    let volumes = rename_section(root, "volumes", suffix);
    let networks = rename_section(root, "networks", suffix);

    let services = root
        .get_mut("services")
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| Error::BadRequest("compose file has no services".to_string()))?;

    let service_names = rename_keys(services, suffix);

    for (_, service) in services.iter_mut() {
        let Some(service) = service.as_mapping_mut() else {
            continue;
        };

        if let Some(depends_on) = service.get_mut("depends_on") {
            rename_references(depends_on, &service_names);
        }
        if let Some(networks_ref) = service.get_mut("networks") {
            rename_references(networks_ref, &networks);
        }
        if let Some(Value::Sequence(mounts)) = service.get_mut("volumes") {
            for mount in mounts {
                rename_volume_mount(mount, &volumes);
            }
        }
        if let Some(Value::String(container_name)) = service.get_mut("container_name") {
            *container_name = format!("{container_name}-{suffix}");
        }
    }

    serde_yaml::to_string(&doc)
        .map_err(|e| Error::BadRequest(format!("failed to render compose file: {e}")))
}

/// Rename the keys of a top-level section, returning old -> new names.
fn rename_section(root: &mut Mapping, section: &str, suffix: &str) -> HashMap<String, String> {
    match root.get_mut(section).and_then(Value::as_mapping_mut) {
        Some(mapping) => rename_keys(mapping, suffix),
        None => HashMap::new(),
    }
}

fn rename_keys(mapping: &mut Mapping, suffix: &str) -> HashMap<String, String> {
    let mut renamed = HashMap::new();
    let old = std::mem::take(mapping);

    for (key, value) in old {
        let key = match key {
            Value::String(name) => {
                let new_name = format!("{name}-{suffix}");
                renamed.insert(name, new_name.clone());
                Value::String(new_name)
            }
            other => other,
        };
        mapping.insert(key, value);
    }
    renamed
}

/// Rename entries of a list-or-mapping reference (`depends_on`, `networks`).
fn rename_references(value: &mut Value, names: &HashMap<String, String>) {
    match value {
        Value::Sequence(items) => {
            for item in items {
                if let Value::String(name) = item
                    && let Some(new_name) = names.get(name.as_str())
                {
                    *name = new_name.clone();
                }
            }
        }
        Value::Mapping(mapping) => {
            let old = std::mem::take(mapping);
            for (key, v) in old {
                let key = match key {
                    Value::String(name) => {
                        Value::String(names.get(&name).cloned().unwrap_or(name))
                    }
                    other => other,
                };
                mapping.insert(key, v);
            }
        }
        _ => {}
    }
}

/// Rename the source of a named-volume mount (`data:/var/lib` or `{source: data}`).
fn rename_volume_mount(mount: &mut Value, volumes: &HashMap<String, String>) {
    match mount {
        Value::String(spec) => {
            let renamed = match spec.split_once(':') {
                Some((source, rest)) => volumes
                    .get(source)
                    .map(|new_source| format!("{new_source}:{rest}")),
                None => volumes.get(spec.as_str()).cloned(),
            };
            if let Some(renamed) = renamed {
                *spec = renamed;
            }
        }
        Value::Mapping(mapping) => {
            if let Some(Value::String(source)) = mapping.get_mut("source")
                && let Some(new_source) = volumes.get(source.as_str())
            {
                *source = new_source.clone();
            }
        }
        _ => {}
    }
}
