//! Host environment state.
//!
//! The host signals readiness once all documents are loaded. Some work
//! (equip-gating, `@doom` resolution) must wait for that signal, so every
//! call that depends on it takes an `Environment` explicitly.

use serde::{Deserialize, Serialize};

/// Snapshot of the host environment passed into readiness-dependent calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    /// Has the host finished loading?
    pub ready: bool,
}

impl Environment {
    /// Environment before the ready signal.
    #[must_use]
    pub const fn loading() -> Self {
        Self { ready: false }
    }

    /// Environment after the ready signal.
    #[must_use]
    pub const fn ready() -> Self {
        Self { ready: true }
    }

    /// Check if the host is ready.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        self.ready
    }
}
