// ABOUTME: Deploy lock to prevent concurrent deployments of the same compose.
// ABOUTME: In-process async mutex per compose id, released when the guard drops.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::ComposeId;

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Compose being deployed.
    pub compose_id: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(compose_id: &ComposeId) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            compose_id: compose_id.to_string(),
        }
    }
}

type Slot = Arc<AsyncMutex<Option<LockInfo>>>;

/// Per-compose deploy locks. Clones share the same lock table.
#[derive(Debug, Clone, Default)]
pub struct ComposeLocks {
    slots: Arc<Mutex<HashMap<ComposeId, Slot>>>,
}

impl ComposeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the deploy lock of `compose_id`.
    pub async fn acquire(&self, compose_id: &ComposeId) -> ComposeLockGuard {
        let slot = self.slot(compose_id);

        let mut guard = match slot.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::info!(compose = %compose_id, "waiting for running deployment to finish");
                slot.lock_owned().await
            }
        };

        let info = LockInfo::new(compose_id);
        tracing::debug!(
            compose = %compose_id,
            holder = %info.holder,
            pid = info.pid,
            "deploy lock acquired"
        );
        *guard = Some(info);

        ComposeLockGuard {
            compose_id: compose_id.clone(),
            guard: Some(guard),
            slots: Arc::clone(&self.slots),
        }
    }

    /// Whether a deployment of `compose_id` currently holds the lock.
    pub fn is_locked(&self, compose_id: &ComposeId) -> bool {
        self.slots
            .lock()
            .get(compose_id)
            .is_some_and(|slot| slot.try_lock().is_err())
    }

    /// Number of composes with a live lock slot.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, compose_id: &ComposeId) -> Slot {
        Arc::clone(self.slots.lock().entry(compose_id.clone()).or_default())
    }
}

/// A held deploy lock that releases on drop.
pub struct ComposeLockGuard {
    compose_id: ComposeId,
    guard: Option<OwnedMutexGuard<Option<LockInfo>>>,
    slots: Arc<Mutex<HashMap<ComposeId, Slot>>>,
}

impl ComposeLockGuard {
    /// Who holds this lock.
    pub fn info(&self) -> Option<&LockInfo> {
        self.guard.as_ref().and_then(|guard| guard.as_ref())
    }
}

impl std::fmt::Debug for ComposeLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeLockGuard")
            .field("compose_id", &self.compose_id)
            .finish()
    }
}

impl Drop for ComposeLockGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        if let Some(mut guard) = self.guard.take() {
            *guard = None;
        }
        // Only the table still references the slot: nobody is waiting on it.
        if slots
            .get(&self.compose_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.compose_id);
        }
        tracing::debug!(compose = %self.compose_id, "deploy lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn lock_info_creates_with_current_host_and_pid() {
        let info = LockInfo::new(&ComposeId::new("c1"));

        assert_eq!(info.compose_id, "c1");
        assert_eq!(info.pid, std::process::id());
        assert!(!info.holder.is_empty());
    }

    #[tokio::test]
    async fn guard_releases_and_cleans_up_on_drop() {
        let locks = ComposeLocks::new();
        let id = ComposeId::new("c1");

        let guard = locks.acquire(&id).await;
        assert!(locks.is_locked(&id));
        assert_eq!(guard.info().map(|i| i.compose_id.as_str()), Some("c1"));

        drop(guard);
        assert!(!locks.is_locked(&id));
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn second_acquire_waits_for_first() {
        let locks = ComposeLocks::new();
        let id = ComposeId::new("c1");

        let first = locks.acquire(&id).await;

        let waiter = {
            let locks = locks.clone();
            let id = id.clone();
            tokio::spawn(async move { locks.acquire(&id).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        let second = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
        assert!(locks.is_locked(&id));
        drop(second);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_composes_do_not_block() {
        let locks = ComposeLocks::new();
        let _a = locks.acquire(&ComposeId::new("a")).await;
        let b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(&ComposeId::new("b")),
        )
        .await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
