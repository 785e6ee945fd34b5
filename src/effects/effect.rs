//! Effect definitions.
//!
//! `EffectData` is the persisted record: label, origin, duration, changes,
//! disabled bit and free-form flags. `ActiveEffect` is that record attached
//! to a parent document, with the attachment resolved once at construction.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::change::{Change, ChangeMode, Conditional};
use crate::core::{ActorId, EffectId, EngineConfig, ItemId, Value};

/// Flag namespace reserved by the host (`core.statusId`).
pub const CORE_FLAG_SCOPE: &str = "core";

/// How long an effect lasts. Unset fields mean unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<i64>,
}

impl EffectDuration {
    /// Does the effect expire at all?
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.rounds.is_some() || self.seconds.is_some()
    }
}

fn default_transfer() -> bool {
    true
}

/// Persisted effect record.
///
/// Changes live in a persistent vector, so cloning the record (or handing
/// its changes to a dialog) shares structure without aliasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectData {
    /// Display label ("Aethyric Armour").
    pub label: String,

    /// Icon path shown on tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Uuid of the document that caused the effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default)]
    pub duration: EffectDuration,

    #[serde(default)]
    pub changes: Vector<Change>,

    #[serde(default)]
    pub disabled: bool,

    /// Item-owned effects with `transfer` apply to the owning actor.
    #[serde(default = "default_transfer")]
    pub transfer: bool,

    /// Namespaced metadata (`{ scope: { key: value } }`).
    #[serde(default)]
    pub flags: Value,
}

impl EffectData {
    /// Create an empty effect record.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
            origin: None,
            duration: EffectDuration::default(),
            changes: Vector::new(),
            disabled: false,
            transfer: true,
            flags: Value::map(),
        }
    }

    /// Load a record from JSON content.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add a change.
    #[must_use]
    pub fn with_change(mut self, change: Change) -> Self {
        self.changes.push_back(change);
        self
    }

    /// Set the origin uuid.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set a flag and return the record.
    #[must_use]
    pub fn with_flag(mut self, scope: &str, key: &str, value: impl Into<Value>) -> Self {
        self.set_flag(scope, key, value.into());
        self
    }

    /// Read a flag (`flags.<scope>.<key>`). The key may be a dotted path.
    #[must_use]
    pub fn get_flag(&self, scope: &str, key: &str) -> Option<&Value> {
        self.flags.as_map()?.get(scope)?.get_path(key)
    }

    /// Write a flag, creating the scope when needed.
    pub fn set_flag(&mut self, scope: &str, key: &str, value: Value) {
        if !matches!(self.flags, Value::Map(_)) {
            self.flags = Value::map();
        }
        if let Value::Map(scopes) = &mut self.flags {
            scopes.entry(scope.to_string()).or_default().set_path(key, value);
        }
    }
}

/// Where an effect is attached. Resolved once when the effect is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentPoint {
    /// Owned directly by an actor.
    Actor(ActorId),
    /// Owned by an item, which may itself be owned by an actor.
    Item {
        item: ItemId,
        actor: Option<ActorId>,
    },
}

impl AttachmentPoint {
    /// Host document name of the parent.
    #[must_use]
    pub fn document_name(&self) -> &'static str {
        match self {
            AttachmentPoint::Actor(_) => "Actor",
            AttachmentPoint::Item { .. } => "Item",
        }
    }

    /// The actor the effect ultimately belongs to, if any.
    #[must_use]
    pub fn actor_id(&self) -> Option<&ActorId> {
        match self {
            AttachmentPoint::Actor(id) => Some(id),
            AttachmentPoint::Item { actor, .. } => actor.as_ref(),
        }
    }
}

/// An effect attached to an actor or an item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: EffectId,
    pub data: EffectData,
    pub parent: AttachmentPoint,
}

impl ActiveEffect {
    /// Attach effect data to a parent.
    pub fn new(id: impl Into<EffectId>, data: EffectData, parent: AttachmentPoint) -> Self {
        Self {
            id: id.into(),
            data,
            parent,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.data.label
    }

    /// The effect's changes, in authored order.
    #[must_use]
    pub fn changes(&self) -> &Vector<Change> {
        &self.data.changes
    }

    /// Is the effect currently switched off?
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.data.disabled
    }

    /// Per-change dialog metadata, keyed by change index.
    #[must_use]
    pub fn change_conditionals(&self, config: &EngineConfig) -> FxHashMap<usize, Conditional> {
        let Some(Value::Map(entries)) = self.data.get_flag(&config.flag_scope, "changeCondition")
        else {
            return FxHashMap::default();
        };
        entries
            .iter()
            .filter_map(|(index, value)| {
                Some((index.parse::<usize>().ok()?, Conditional::from_value(value)))
            })
            .collect()
    }

    /// Free-text description authored on the effect.
    #[must_use]
    pub fn description<'a>(&'a self, config: &EngineConfig) -> Option<&'a str> {
        self.data
            .get_flag(&config.flag_scope, "description")
            .and_then(Value::as_text)
    }

    /// Does the effect only work while its item is equipped?
    #[must_use]
    pub fn requires_equip(&self, config: &EngineConfig) -> bool {
        self.data
            .get_flag(&config.flag_scope, "requiresEquip")
            .is_some_and(Value::is_truthy)
    }

    /// Status id used for the token icon (`core.statusId`).
    #[must_use]
    pub fn status_id(&self) -> Option<&str> {
        self.data
            .get_flag(CORE_FLAG_SCOPE, "statusId")
            .and_then(Value::as_text)
    }

    /// Is this effect one of the system's status conditions?
    #[must_use]
    pub fn is_condition(&self, config: &EngineConfig) -> bool {
        self.status_id().is_some_and(|id| config.is_status_effect(id))
    }

    /// Does any change hook into rolls (Custom mode)?
    #[must_use]
    pub fn has_roll_effect(&self) -> bool {
        self.data.changes.iter().any(|c| c.mode == ChangeMode::Custom)
    }
}
