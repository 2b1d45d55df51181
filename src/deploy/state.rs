// ABOUTME: Deploy attempt state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid state transitions at compile time.

/// Record created in `running` status, build not yet started.
/// Available actions: `start_build()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Created;

/// Build invoker running.
/// Available actions: `build()`, `fail()`
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildRunning;

/// Build returned normally; finalizing the record is the invoker's job.
/// Available actions: `into_deployment()`
#[derive(Debug, Clone, Copy, Default)]
pub struct HandedOff;

/// Build failed and the record was written as `error`.
/// Available actions: `into_deployment()`
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildFailed;
