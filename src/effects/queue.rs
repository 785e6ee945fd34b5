//! Deferred change queues.
//!
//! Changes whose value references data that does not exist yet are parked
//! on their actor until a later pass:
//! - `derived`: drained by the actor's derived-data pass
//! - `post_ready`: drained once the host signals readiness
//!
//! Draining takes the whole queue in one step, so an entry can only ever be
//! consumed once. Within a queue entries come back in insertion order.

use serde::{Deserialize, Serialize};

use super::Change;

/// Which queue a deferred change was parked on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeferralQueue {
    /// Waits for the derived-data pass.
    Derived,
    /// Waits for the host ready signal.
    PostReady,
}

/// A change waiting for its inputs, with the label of its effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeferredChange {
    /// Label of the effect the change came from (for logs and errors).
    pub label: String,
    /// The change itself, value still unresolved.
    pub change: Change,
}

impl DeferredChange {
    /// Create a deferred change.
    pub fn new(label: impl Into<String>, change: Change) -> Self {
        Self {
            label: label.into(),
            change,
        }
    }
}

/// Per-actor deferred queues. Owned by the actor, in-memory only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeferredQueues {
    derived: Vec<DeferredChange>,
    post_ready: Vec<DeferredChange>,
}

impl DeferredQueues {
    /// Create empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a change on a queue.
    pub fn push(&mut self, queue: DeferralQueue, deferred: DeferredChange) {
        match queue {
            DeferralQueue::Derived => self.derived.push(deferred),
            DeferralQueue::PostReady => self.post_ready.push(deferred),
        }
    }

    /// Take every change waiting on a queue, leaving it empty.
    pub fn drain(&mut self, queue: DeferralQueue) -> Vec<DeferredChange> {
        match queue {
            DeferralQueue::Derived => std::mem::take(&mut self.derived),
            DeferralQueue::PostReady => std::mem::take(&mut self.post_ready),
        }
    }

    /// Peek at a queue.
    #[must_use]
    pub fn pending(&self, queue: DeferralQueue) -> &[DeferredChange] {
        match queue {
            DeferralQueue::Derived => &self.derived,
            DeferralQueue::PostReady => &self.post_ready,
        }
    }

    /// Changes waiting for the derived-data pass.
    #[must_use]
    pub fn derived(&self) -> &[DeferredChange] {
        &self.derived
    }

    /// Changes waiting for the ready signal.
    #[must_use]
    pub fn post_ready(&self) -> &[DeferredChange] {
        &self.post_ready
    }

    /// Check if both queues are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.derived.is_empty() && self.post_ready.is_empty()
    }

    /// Drop everything. Owners call this on teardown.
    pub fn clear(&mut self) {
        self.derived.clear();
        self.post_ready.clear();
    }
}
