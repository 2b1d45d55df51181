// ABOUTME: Compose applications: records, service extraction, and randomization.
// ABOUTME: Exposes the record adapter and the pure helpers over compose file text.

mod model;
mod randomize;
mod records;
mod services;

pub use model::{Compose, ComposeDetails, ComposePatch, NewCompose, NewProject, Project};
pub use randomize::{Randomizer, SuffixRandomizer, randomize_compose_file};
pub use records::{ComposeRecords, ProjectRecords};
pub use services::{ALL_SERVICES, ComposeSpecification, extract_services};
