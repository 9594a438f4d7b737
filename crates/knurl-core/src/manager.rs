//! In-flight request tracking for cancellation by request id.
//!
//! The manager is an owned value: callers create one and share it (e.g. in
//! an `Arc`) with whatever surface issues cancellations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

struct Entry {
    token: CancellationToken,
    generation: u64,
}

#[derive(Default)]
pub struct RequestManager {
    entries: Mutex<HashMap<String, Entry>>,
    next_generation: AtomicU64,
}

impl RequestManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(&self, id: &str) -> (CancellationToken, u64) {
        let token = CancellationToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let replaced = self.entries().insert(
            id.to_string(),
            Entry {
                token: token.clone(),
                generation,
            },
        );
        if replaced.is_some() {
            tracing::warn!("[RequestManager] Request {} re-registered while in flight", id);
        }
        (token, generation)
    }

    /// Track a new run. Re-registering an id replaces the tracked token.
    pub fn register(&self, id: &str) -> CancellationToken {
        self.insert(id).0
    }

    /// Track a new run until the returned guard is dropped.
    pub fn track(&self, id: &str) -> TrackedRequest<'_> {
        let (token, generation) = self.insert(id);
        TrackedRequest {
            manager: self,
            id: id.to_string(),
            token,
            generation,
        }
    }

    /// Cancel the tracked run. Returns false when no run has this id.
    pub fn cancel(&self, id: &str) -> bool {
        match self.entries().get(id) {
            Some(entry) => {
                tracing::info!("[RequestManager] Cancelling request {}", id);
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Stop tracking a run without cancelling it.
    pub fn remove(&self, id: &str) {
        self.entries().remove(id);
    }

    pub fn in_flight(&self) -> usize {
        self.entries().len()
    }

    fn release(&self, id: &str, generation: u64) {
        let mut entries = self.entries();
        if entries.get(id).is_some_and(|e| e.generation == generation) {
            entries.remove(id);
        }
    }
}

/// A registration held for the lifetime of one run.
///
/// Dropping the guard deregisters the run, whether the run finished or its
/// future was dropped mid-flight. A guard never removes a newer
/// registration of the same id.
pub struct TrackedRequest<'a> {
    manager: &'a RequestManager,
    id: String,
    token: CancellationToken,
    generation: u64,
}

impl TrackedRequest<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for TrackedRequest<'_> {
    fn drop(&mut self) {
        self.manager.release(&self.id, self.generation);
        tracing::debug!(
            "[RequestManager] Request {} released ({} in flight)",
            self.id,
            self.manager.in_flight()
        );
    }
}
