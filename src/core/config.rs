//! Engine configuration.
//!
//! Systems configure the engine at startup by providing:
//! - `flag_scope`: the namespace their effect flags live under
//! - `post_ready_sentinel`: the reference that must wait for world readiness
//! - `status_effects`: status condition ids known to the system
//! - `numeric_types`: dialog-facing attributes that hold numbers
//!
//! The engine never hardcodes a system's namespace - systems define it.

use serde::{Deserialize, Serialize};

/// Flag namespace used by the default configuration.
pub const DEFAULT_FLAG_SCOPE: &str = "age-of-sigmar-soulbound";

/// Reference that can only be resolved once the world is ready.
pub const DEFAULT_POST_READY_SENTINEL: &str = "@doom";

/// Complete engine configuration.
///
/// ## Example
///
/// ```
/// use tabletop_effects::core::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_status_effect("blinded")
///     .with_flag_scope("my-system");
///
/// assert_eq!(config.flag_scope, "my-system");
/// assert!(config.is_status_effect("blinded"));
/// assert!(config.is_numeric_type("attack"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Namespace of the system's effect flags.
    pub flag_scope: String,

    /// Change value that is parked until the world signals readiness.
    pub post_ready_sentinel: String,

    /// Ids of the status conditions the system defines.
    pub status_effects: Vec<String>,

    /// Attribute names that dialog changes treat as numeric.
    pub numeric_types: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flag_scope: DEFAULT_FLAG_SCOPE.to_string(),
            post_ready_sentinel: DEFAULT_POST_READY_SENTINEL.to_string(),
            status_effects: Vec::new(),
            numeric_types: [
                "difficulty",
                "complexity",
                "bonusDice",
                "bonusFocus",
                "bonusDamage",
                "armour",
                "defence",
                "attack",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the flag namespace.
    #[must_use]
    pub fn with_flag_scope(mut self, scope: impl Into<String>) -> Self {
        self.flag_scope = scope.into();
        self
    }

    /// Set the post-ready sentinel reference.
    #[must_use]
    pub fn with_post_ready_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.post_ready_sentinel = sentinel.into();
        self
    }

    /// Register a status condition id.
    #[must_use]
    pub fn with_status_effect(mut self, id: impl Into<String>) -> Self {
        self.status_effects.push(id.into());
        self
    }

    /// Check whether an id names a known status condition.
    #[must_use]
    pub fn is_status_effect(&self, id: &str) -> bool {
        self.status_effects.iter().any(|s| s == id)
    }

    /// Check whether a dialog attribute is numeric.
    #[must_use]
    pub fn is_numeric_type(&self, name: &str) -> bool {
        self.numeric_types.iter().any(|t| t == name)
    }
}
