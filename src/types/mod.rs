// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod app_name;
mod id;

pub use app_name::{AppName, AppNameError};
pub(crate) use app_name::random_suffix;
pub use id::{ComposeId, DeploymentId, Id, ProjectId};
