//! Dialog projection.
//!
//! Dialog-mode changes are not applied to data; they are offered to the
//! player as toggles when a test is rolled. `DialogSelf` changes show up
//! for the actor performing the test, `DialogTarget` changes for the actor
//! being targeted.
//!
//! Projection works on copies. Nothing done to a `DialogChange` reaches
//! the effect it came from.
//!
//! A change's conditional may carry a condition formula. It is evaluated
//! against the owning actor's data so the dialog can preselect the lines
//! that currently apply.

use smallvec::{smallvec, SmallVec};

use super::{ActiveEffect, AttachmentPoint, Change, ChangeMode, ChangeResolver, Conditional};
use crate::core::EngineConfig;
use crate::documents::ActorDirectory;
use crate::expr::RollData;

/// What to project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DialogOptions {
    /// Project the target-facing changes instead of the self-facing ones.
    pub for_target: bool,
    /// Merge changes that share a conditional description.
    pub condense: bool,
    /// Added to every assigned index, for merging several effects into one
    /// dialog.
    pub index_offset: usize,
}

impl DialogOptions {
    /// Self-facing, uncondensed, no offset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Project for the target of an action.
    #[must_use]
    pub fn for_target(mut self) -> Self {
        self.for_target = true;
        self
    }

    /// Merge changes with the same description.
    #[must_use]
    pub fn condensed(mut self) -> Self {
        self.condense = true;
        self
    }

    /// Start indices at `offset`.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.index_offset = offset;
        self
    }

    /// Mode of the changes this projection keeps.
    #[must_use]
    pub fn mode(&self) -> ChangeMode {
        if self.for_target {
            ChangeMode::DialogTarget
        } else {
            ChangeMode::DialogSelf
        }
    }
}

/// One dialog line.
#[derive(Clone, Debug, PartialEq)]
pub struct DialogChange<'a> {
    /// Copy of the change, with references resolved where possible.
    pub change: Change,
    /// Metadata of the change (empty when none was authored).
    pub conditional: Conditional,
    /// Effect the change belongs to.
    pub document: &'a ActiveEffect,
    /// Projected for the target of an action?
    pub target: bool,
    /// Dialog indices this line stands for.
    pub index: SmallVec<[usize; 2]>,
    /// Whether the condition holds for the owning actor. Lines without a
    /// condition are always active; a condition that fails to evaluate is not.
    pub active: bool,
}

impl ActiveEffect {
    /// Project this effect's dialog changes.
    ///
    /// Conditionals are matched by the change's position in the effect.
    /// Indices count only the kept changes, starting at the offset. Values
    /// holding references are resolved against the parent actor when the
    /// effect is attached to an actor found in `directory`; a value that
    /// fails to resolve is shown as authored.
    pub fn get_dialog_changes<'a>(
        &'a self,
        directory: &dyn ActorDirectory,
        options: DialogOptions,
        config: &EngineConfig,
    ) -> Vec<DialogChange<'a>> {
        let mut conditionals = self.change_conditionals(config);
        let mode = options.mode();
        let parent = match &self.parent {
            AttachmentPoint::Actor(id) => directory.actor(id),
            AttachmentPoint::Item { .. } => None,
        };
        let owner = self.parent.actor_id().and_then(|id| directory.actor(id));
        let mut data = owner.map_or_else(RollData::empty, |actor| actor.roll_data());
        if let Some(world) = directory.world_data() {
            data = data.with_layer(world);
        }

        let projected = self
            .changes()
            .iter()
            .enumerate()
            .filter(|(_, change)| change.mode == mode)
            .enumerate()
            .map(|(position, (original, change))| {
                let mut change = change.clone();
                if let Some(actor) = parent.filter(|_| change.is_deferred()) {
                    match ChangeResolver::fill_derived_value(&change, self.label(), actor, directory) {
                        Ok(value) => change.value = value,
                        Err(err) => {
                            tracing::warn!(effect = %self.label(), error = %err, "showing unresolved dialog value");
                        }
                    }
                }
                let conditional = conditionals.remove(&original).unwrap_or_default();
                let active = conditional.is_active(&data).unwrap_or_else(|err| {
                    tracing::warn!(effect = %self.label(), error = %err, "treating dialog condition as inactive");
                    false
                });
                DialogChange {
                    change,
                    conditional,
                    document: self,
                    target: options.for_target,
                    index: smallvec![position + options.index_offset],
                    active,
                }
            });

        if options.condense {
            condense(projected)
        } else {
            projected.collect()
        }
    }
}

/// Merge lines with the same conditional description into the first one.
fn condense<'a>(changes: impl Iterator<Item = DialogChange<'a>>) -> Vec<DialogChange<'a>> {
    let mut unique: Vec<DialogChange<'a>> = Vec::new();
    for change in changes {
        match unique
            .iter_mut()
            .find(|u| u.conditional.description == change.conditional.description)
        {
            Some(existing) => existing.index.extend(change.index),
            None => unique.push(change),
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_FLAG_SCOPE;
    use crate::core::{ActorId, Value};
    use crate::documents::Actor;
    use crate::effects::EffectData;
    use serde_json::json;

    fn hatred() -> EffectData {
        EffectData::new("Hatred")
            .with_change(Change::new("system.bonusDice", ChangeMode::DialogSelf, "1"))
            .with_change(Change::new("system.difficulty", ChangeMode::DialogTarget, "1"))
            .with_change(Change::new("system.bonusFocus", ChangeMode::DialogSelf, "@mind"))
            .with_flag(
                DEFAULT_FLAG_SCOPE,
                "changeCondition",
                Value::from(json!({
                    "0": { "description": "vs. Orruks" },
                    "2": { "description": "vs. Orruks", "script": "true" }
                })),
            )
    }

    fn actor() -> Actor {
        Actor::new("a1", "Vex", Value::from(json!({ "mind": 3 }))).with_effect("e1", hatred())
    }

    #[test]
    fn test_filters_by_mode() {
        let actor = actor();
        let config = EngineConfig::default();
        let effect = &actor.effects[0];

        let own = effect.get_dialog_changes(&actor, DialogOptions::new(), &config);
        let target = effect.get_dialog_changes(&actor, DialogOptions::new().for_target(), &config);

        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|c| c.change.mode == ChangeMode::DialogSelf && !c.target));
        assert_eq!(target.len(), 1);
        assert!(target[0].target);
        assert_eq!(target[0].conditional, Conditional::default());
        assert_eq!(target[0].index.as_slice(), &[0]);
    }

    #[test]
    fn test_indices_count_kept_changes() {
        let actor = actor();
        let config = EngineConfig::default();
        let own = actor.effects[0].get_dialog_changes(&actor, DialogOptions::new().with_offset(4), &config);

        let indices: Vec<_> = own.iter().map(|c| c.index.to_vec()).collect();
        assert_eq!(indices, vec![vec![4], vec![5]]);
        assert_eq!(own[1].conditional.condition.as_deref(), Some("true"));
    }

    #[test]
    fn test_resolves_references_for_actor_effects() {
        let actor = actor();
        let config = EngineConfig::default();
        let own = actor.effects[0].get_dialog_changes(&actor, DialogOptions::new(), &config);
        assert_eq!(own[1].change.value, "3");

        // The parent actor is not in this directory: value stays as authored.
        let stranger = Actor::new("b2", "Grunda", Value::map());
        let own = actor.effects[0].get_dialog_changes(&stranger, DialogOptions::new(), &config);
        assert_eq!(own[1].change.value, "@mind");
    }

    #[test]
    fn test_condense_merges_indices() {
        let actor = actor();
        let config = EngineConfig::default();
        let own = actor.effects[0].get_dialog_changes(&actor, DialogOptions::new().condensed(), &config);

        assert_eq!(own.len(), 1);
        assert_eq!(own[0].index.as_slice(), &[0, 1]);
        assert_eq!(own[0].conditional.description, "vs. Orruks");
        assert_eq!(own[0].document.id.as_str(), "e1");
    }

    #[test]
    fn test_projection_does_not_alias() {
        let actor = actor();
        let config = EngineConfig::default();
        let before = actor.effects[0].changes().clone();

        let mut own = actor.effects[0].get_dialog_changes(&actor, DialogOptions::new(), &config);
        own[0].change.value = "99".to_string();
        own[0].conditional.description = "changed".to_string();

        assert_eq!(actor.effects[0].changes(), &before);
        assert_eq!(
            actor.effects[0].change_conditionals(&config)[&0].description,
            "vs. Orruks"
        );
        assert_eq!(actor.effects[0].parent, AttachmentPoint::Actor(ActorId::new("a1")));
    }

    #[test]
    fn test_condition_sets_active() {
        let data = EffectData::new("Frenzy")
            .with_change(Change::new("system.bonusDice", ChangeMode::DialogSelf, "1"))
            .with_change(Change::new("system.bonusDice", ChangeMode::DialogSelf, "2"))
            .with_change(Change::new("system.bonusDice", ChangeMode::DialogSelf, "3"))
            .with_change(Change::new("system.bonusDice", ChangeMode::DialogSelf, "4"))
            .with_flag(
                DEFAULT_FLAG_SCOPE,
                "changeCondition",
                Value::from(json!({
                    "0": { "description": "Wounded", "condition": "@wounds" },
                    "1": { "description": "Mindful", "condition": "@mind - 2" },
                    "2": { "description": "Broken", "condition": "@mind / 0" }
                })),
            );
        let actor = Actor::new("a1", "Vex", Value::from(json!({ "mind": 3, "wounds": 0 }))).with_effect("e1", data);
        let config = EngineConfig::default();

        let own = actor.effects[0].get_dialog_changes(&actor, DialogOptions::new(), &config);
        let active: Vec<_> = own.iter().map(|c| c.active).collect();
        assert_eq!(active, vec![false, true, false, true]);
    }
}
