// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports the orchestrator, attempt states, and per-compose deploy locks.

mod attempt;
mod lock;
mod orchestrator;
mod state;

pub use attempt::{BuildAbort, DeployAttempt, TransitionResult};
pub use lock::{ComposeLockGuard, ComposeLocks, LockInfo};
pub use orchestrator::{DEFAULT_DEPLOY_TITLE, DeployRequest, Orchestrator};
pub use state::{BuildFailed, BuildRunning, Created, HandedOff};
