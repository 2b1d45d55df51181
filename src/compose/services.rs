// ABOUTME: Extracts declared service names from compose file text.
// ABOUTME: Lenient by contract: unparseable text yields only the catch-all entry.

use nonempty::NonEmpty;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Synthetic entry appended to every service list, meaning "every service".
pub const ALL_SERVICES: &str = "All Services";

/// The subset of a compose specification this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeSpecification {
    #[serde(default)]
    pub services: Option<Mapping>,
}

impl ComposeSpecification {
    /// Parse compose text. `None` when the text is empty, not YAML, or not shaped
    /// like a compose file.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_yaml::from_str::<Option<Self>>(text) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::debug!("compose file did not parse: {}", e);
                None
            }
        }
    }

    /// Service names in declaration order.
    pub fn service_names(&self) -> Vec<String> {
        self.services
            .iter()
            .flat_map(|services| services.keys())
            .filter_map(scalar_key)
            .collect()
    }
}

/// Service names declared in `text`, followed by [`ALL_SERVICES`].
///
/// Never fails: a parse error, an empty document, or a missing `services`
/// section all produce `["All Services"]`.
pub fn extract_services(text: &str) -> NonEmpty<String> {
    let names = ComposeSpecification::parse(text)
        .map(|spec| spec.service_names())
        .unwrap_or_default();

    match NonEmpty::from_vec(names) {
        Some(mut services) => {
            services.push(ALL_SERVICES.to_string());
            services
        }
        None => NonEmpty::new(ALL_SERVICES.to_string()),
    }
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
