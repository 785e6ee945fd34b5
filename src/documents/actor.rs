//! Actors - characters, adversaries and parties.
//!
//! An actor keeps its authored data (`source`) apart from the data effects
//! have been applied to (`system`). Every preparation pass rebuilds
//! `system` from `source`:
//!
//! 1. reset prepared data and both deferred queues
//! 2. equip-gate the actor's effects and its items' effects
//! 3. apply every enabled change in priority order, parking the ones that
//!    reference data not known yet
//! 4. drain the derived queue and resolve what was parked
//!
//! The post-ready queue is left alone; the world drains it once it
//! becomes ready.

use serde::{Deserialize, Serialize};

use super::{ActorDirectory, Item};
use crate::core::{ActorId, EngineConfig, Environment, Value};
use crate::effects::{
    origin, ActiveEffect, ApplyOutcome, AttachmentPoint, Change, ChangeResolver, DeferralQueue,
    DeferredQueues, EffectData, EffectParent,
};
use crate::expr::RollData;

/// An actor document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,

    /// Authored system data.
    #[serde(default)]
    pub source: Value,

    /// System data with effects applied. Rebuilt on every preparation.
    #[serde(skip)]
    pub system: Value,

    /// Owned items.
    #[serde(default)]
    pub items: Vec<Item>,

    /// Effects attached directly to the actor.
    #[serde(default)]
    pub effects: Vec<ActiveEffect>,

    /// Compendium pack the actor is stored in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,

    /// Changes waiting for data that did not exist when they were applied.
    #[serde(skip)]
    pub deferred: DeferredQueues,
}

impl Actor {
    /// Create an actor. Prepared data starts as a copy of the source.
    pub fn new(id: impl Into<ActorId>, name: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            system: source.clone(),
            source,
            items: Vec::new(),
            effects: Vec::new(),
            pack: None,
            deferred: DeferredQueues::new(),
        }
    }

    /// Load an actor from JSON content.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut actor: Self = serde_json::from_str(json)?;
        actor.system = actor.source.clone();
        let id = actor.id.clone();
        for item in &mut actor.items {
            item.set_owner(Some(id.clone()));
        }
        for effect in &mut actor.effects {
            effect.parent = AttachmentPoint::Actor(id.clone());
        }
        Ok(actor)
    }

    /// Add an item and return the actor.
    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.add_item(item);
        self
    }

    /// Take ownership of an item.
    pub fn add_item(&mut self, mut item: Item) -> &mut Item {
        item.set_owner(Some(self.id.clone()));
        self.items.push(item);
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Attach an effect and return the actor.
    #[must_use]
    pub fn with_effect(mut self, id: &str, data: EffectData) -> Self {
        self.add_effect(id, data);
        self
    }

    /// Attach an effect directly to the actor.
    pub fn add_effect(&mut self, id: &str, data: EffectData) -> &mut ActiveEffect {
        let parent = AttachmentPoint::Actor(self.id.clone());
        self.effects.push(ActiveEffect::new(id, data, parent));
        let last = self.effects.len() - 1;
        &mut self.effects[last]
    }

    /// Document uuid (`Actor.<id>`).
    #[must_use]
    pub fn uuid(&self) -> String {
        origin::actor_uuid(&self.id)
    }

    /// Find an owned item.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id.as_str() == id)
    }

    /// Find an owned item for mutation.
    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id.as_str() == id)
    }

    /// Find an effect attached directly to the actor.
    #[must_use]
    pub fn effect(&self, id: &str) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.id.as_str() == id)
    }

    /// Find an effect attached directly to the actor, for mutation.
    pub fn effect_mut(&mut self, id: &str) -> Option<&mut ActiveEffect> {
        self.effects.iter_mut().find(|e| e.id.as_str() == id)
    }

    /// Roll data over the prepared system data.
    #[must_use]
    pub fn roll_data(&self) -> RollData<'_> {
        RollData::new(&self.system)
    }

    /// Throw away prepared data and anything still parked.
    pub fn reset_prepared_data(&mut self) {
        self.system = self.source.clone();
        self.deferred.clear();
    }

    /// Equip-gate every effect the actor can see.
    ///
    /// Actor effects are gated by the item their origin points at; item
    /// effects by the item that owns them.
    pub fn prepare_effects(&mut self, env: Environment, config: &EngineConfig) {
        let equips: Vec<_> = self
            .effects
            .iter()
            .map(|effect| {
                effect
                    .resolve_source_item(EffectParent::Actor(self))
                    .map(Item::equip_state)
            })
            .collect();

        let in_pack = self.pack.is_some();
        for (effect, equip) in self.effects.iter_mut().zip(equips) {
            effect.prepare_data(equip, in_pack, env, config);
        }
        for item in &mut self.items {
            item.prepare_effects(in_pack, env, config);
        }
    }

    /// Every enabled change, sorted by priority. Ties keep authored order.
    ///
    /// Item effects reach the actor only when they transfer.
    #[must_use]
    pub fn active_changes(&self) -> Vec<(String, Change)> {
        let item_effects = self
            .items
            .iter()
            .flat_map(|item| item.effects.iter())
            .filter(|effect| effect.data.transfer);

        let mut changes: Vec<(String, Change)> = self
            .effects
            .iter()
            .chain(item_effects)
            .filter(|effect| !effect.is_disabled())
            .flat_map(|effect| {
                effect
                    .changes()
                    .iter()
                    .map(move |change| (effect.label().to_string(), change.clone()))
            })
            .collect();

        changes.sort_by_key(|(_, change)| change.effective_priority());
        changes
    }

    /// Apply every enabled change; references are parked on the queues.
    pub fn apply_active_effects(&mut self, env: Environment, config: &EngineConfig) -> Vec<ApplyOutcome> {
        self.active_changes()
            .into_iter()
            .map(|(label, change)| ChangeResolver::apply(self, &label, &change, env, config))
            .collect()
    }

    /// Drain a deferred queue and resolve each change it held.
    ///
    /// Failures are logged and reported per change; the rest of the queue
    /// still resolves.
    pub fn resolve_queue(&mut self, queue: DeferralQueue, directory: &dyn ActorDirectory) -> Vec<ApplyOutcome> {
        let pending = self.deferred.drain(queue);
        if !pending.is_empty() {
            tracing::debug!(actor = %self.name, ?queue, count = pending.len(), "draining deferred changes");
        }
        pending
            .into_iter()
            .map(|deferred| ChangeResolver::resolve_deferred(self, deferred, directory))
            .collect()
    }

    /// Run a full preparation pass.
    ///
    /// `directory` resolves cross-actor references; it is consulted for
    /// every actor except this one.
    pub fn prepare_data(
        &mut self,
        env: Environment,
        config: &EngineConfig,
        directory: &dyn ActorDirectory,
    ) -> Vec<ApplyOutcome> {
        self.reset_prepared_data();
        self.prepare_effects(env, config);
        let mut outcomes = self.apply_active_effects(env, config);
        outcomes.extend(self.resolve_queue(DeferralQueue::Derived, directory));
        outcomes
    }
}

/// A lone actor can answer for itself.
impl ActorDirectory for Actor {
    fn actor(&self, id: &ActorId) -> Option<&Actor> {
        (self.id == *id).then_some(self)
    }
}
