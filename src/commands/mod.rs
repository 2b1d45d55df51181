// ABOUTME: Command module aggregator for the bosun CLI.
// ABOUTME: Re-exports the project and compose handlers and orchestrator wiring.

mod compose;
mod context;
mod deploy;
mod project;

pub use compose::compose;
pub use context::orchestrator;
pub use project::project;
