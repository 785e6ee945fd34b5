//! Items - equipment, spells and talents owned by actors.
//!
//! Items matter to the effect engine in two ways: their equip state gates
//! effects that require equipping, and their authored duration is the
//! fallback when a test synthesizes an effect.

use serde::{Deserialize, Serialize};

use crate::core::{ActorId, Environment, EngineConfig, ItemId, Value};
use crate::effects::{origin, ActiveEffect, AttachmentPoint, EffectData};
use crate::roll::DurationSpec;

/// Equip facts an effect needs to decide whether it is disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EquipState {
    /// Can the item be equipped at all (weapons, armour)?
    pub equippable: bool,
    /// Is it equipped right now?
    pub equipped: bool,
}

/// An item document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,

    /// Owning actor, `None` for world-level items.
    #[serde(default)]
    pub owner: Option<ActorId>,

    #[serde(default)]
    pub equippable: bool,

    #[serde(default)]
    pub equipped: bool,

    /// Authored duration (spells, prayers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationSpec>,

    /// System data of the item.
    #[serde(default)]
    pub system: Value,

    /// Effects embedded in the item.
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,

    /// Compendium pack the item is stored in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,
}

impl Item {
    /// Create a world-level item.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner: None,
            equippable: false,
            equipped: false,
            duration: None,
            system: Value::map(),
            effects: Vec::new(),
            pack: None,
        }
    }

    /// Make the item equippable and set its state.
    #[must_use]
    pub fn equippable(mut self, equipped: bool) -> Self {
        self.equippable = true;
        self.equipped = equipped;
        self
    }

    /// Set the authored duration.
    #[must_use]
    pub fn with_duration(mut self, duration: DurationSpec) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set system data.
    #[must_use]
    pub fn with_system(mut self, system: Value) -> Self {
        self.system = system;
        self
    }

    /// Place the item in a compendium pack.
    #[must_use]
    pub fn in_pack(mut self, pack: impl Into<String>) -> Self {
        self.pack = Some(pack.into());
        self
    }

    /// Embed an effect in this item.
    #[must_use]
    pub fn with_effect(mut self, id: &str, data: EffectData) -> Self {
        self.add_effect(id, data);
        self
    }

    /// Embed an effect, attaching it to this item.
    pub fn add_effect(&mut self, id: &str, data: EffectData) -> &mut ActiveEffect {
        let parent = self.attachment();
        self.effects.push(ActiveEffect::new(id, data, parent));
        let last = self.effects.len() - 1;
        &mut self.effects[last]
    }

    /// Attachment point for effects embedded in this item.
    #[must_use]
    pub fn attachment(&self) -> AttachmentPoint {
        AttachmentPoint::Item {
            item: self.id.clone(),
            actor: self.owner.clone(),
        }
    }

    /// Move the item under an actor, re-pointing its effects.
    pub fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
        let parent = self.attachment();
        for effect in &mut self.effects {
            effect.parent = parent.clone();
        }
    }

    /// Equip facts for equip-gating.
    #[must_use]
    pub fn equip_state(&self) -> EquipState {
        EquipState {
            equippable: self.equippable,
            equipped: self.equipped,
        }
    }

    /// Document uuid (`Actor.<actor>.Item.<item>` when owned).
    #[must_use]
    pub fn uuid(&self) -> String {
        origin::item_uuid(self.owner.as_ref(), &self.id)
    }

    /// Run equip-gating over the item's own effects.
    ///
    /// `parent_in_pack` is true when the item's owner sits in a pack.
    pub fn prepare_effects(&mut self, parent_in_pack: bool, env: Environment, config: &EngineConfig) {
        let equip = self.equip_state();
        let in_pack = parent_in_pack || self.pack.is_some();
        for effect in &mut self.effects {
            effect.prepare_data(Some(equip), in_pack, env, config);
        }
    }
}
