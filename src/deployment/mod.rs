// ABOUTME: Deployment attempt records.
// ABOUTME: Exposes the model and the record adapter used by the orchestrator.

mod model;
mod records;

pub use model::{Deployment, DeploymentStatus};
pub use records::DeploymentRecords;
