//! Effect lifecycle: equip-gating, source lookup, and synthesis from tests.
//!
//! ## Equip-gating
//!
//! An effect whose item must be equipped follows the item's equip state on
//! every preparation pass, once the world is ready and as long as the
//! effect's owner is not stored in a compendium pack:
//!
//! ```text
//! requiresEquip && item equippable && ready && !in_pack  =>  disabled = !equipped
//! ```
//!
//! Effects that are not gated keep whatever `disabled` bit they have.
//!
//! ## Synthesis
//!
//! `populate_effect_data` turns authored effect data into a concrete effect
//! after a test: it stamps the origin, fills the duration (the test's
//! result first, the item's authored duration second) and replaces
//! `@test.<path>` values with what the test produced.

use super::origin::{self, Origin};
use super::{ActiveEffect, AttachmentPoint, EffectData, EffectError, CORE_FLAG_SCOPE};
use crate::core::{ActorId, EngineConfig, Environment, SceneId, Value};
use crate::documents::{Actor, ActorDirectory, EquipState, Item};
use crate::roll::{DurationSpec, TestOutcome};

/// Source name when an effect has no origin.
pub const NO_SOURCE: &str = "None";

/// Source name when an origin cannot be resolved.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Placeholder actor id authors use in cross-actor references.
const ACTOR_ID_PLACEHOLDER: &str = "Actor.ID";

/// The document an effect is attached to, borrowed.
#[derive(Clone, Copy, Debug)]
pub enum EffectParent<'a> {
    Actor(&'a Actor),
    Item(&'a Item),
}

impl<'a> EffectParent<'a> {
    /// Id of the parent document.
    #[must_use]
    pub fn id(&self) -> &'a str {
        match self {
            EffectParent::Actor(actor) => actor.id.as_str(),
            EffectParent::Item(item) => item.id.as_str(),
        }
    }

    /// Host document name.
    #[must_use]
    pub fn document_name(&self) -> &'static str {
        match self {
            EffectParent::Actor(_) => "Actor",
            EffectParent::Item(_) => "Item",
        }
    }
}

impl ActiveEffect {
    /// Equip-gate the effect.
    ///
    /// `equip` describes the effect's source item, if it has one.
    pub fn prepare_data(
        &mut self,
        equip: Option<EquipState>,
        in_pack: bool,
        env: Environment,
        config: &EngineConfig,
    ) {
        let Some(equip) = equip else {
            return;
        };
        if env.is_ready() && equip.equippable && self.requires_equip(config) && !in_pack {
            self.data.disabled = !equip.equipped;
        }
    }

    /// Find the item this effect comes from.
    ///
    /// An item parent is its own source. An actor parent is searched for
    /// the item named by the origin (`Actor.<actorId>.Item.<itemId>`).
    /// Returns `Ok(None)` when the origin names no item, and
    /// `Err(StaleOrigin)` when it names a different actor.
    pub fn locate_source_item<'a>(&self, parent: EffectParent<'a>) -> Result<Option<&'a Item>, EffectError> {
        let actor = match parent {
            EffectParent::Item(item) => return Ok(Some(item)),
            EffectParent::Actor(actor) => actor,
        };
        let Some(uuid) = self.data.origin.as_deref() else {
            return Ok(None);
        };

        let origin = Origin::parse(uuid);
        if origin.document_id() != Some(actor.id.as_str()) {
            return Err(EffectError::StaleOrigin {
                origin: uuid.to_string(),
                parent: actor.uuid(),
            });
        }
        Ok(origin.embedded_id().and_then(|id| actor.item(id)))
    }

    /// Find the item this effect comes from, ignoring stale origins.
    #[must_use]
    pub fn resolve_source_item<'a>(&self, parent: EffectParent<'a>) -> Option<&'a Item> {
        self.locate_source_item(parent).ok().flatten()
    }

    /// Name of whatever caused the effect, for display.
    ///
    /// A four-segment origin pointing at a scene drawing uses the drawing's
    /// text; one naming an item of the parent actor uses the item's name.
    /// Anything else, stale origins included, falls back to the origin
    /// document's name.
    #[must_use]
    pub fn source_name(&self, parent: EffectParent<'_>, directory: &dyn ActorDirectory) -> String {
        let Some(uuid) = self.data.origin.as_deref() else {
            return NO_SOURCE.to_string();
        };
        let origin = Origin::parse(uuid);

        if origin.is_embedded() {
            if origin.is_drawing() {
                let zone = origin.document_id().zip(origin.embedded_id()).and_then(|(scene, drawing)| {
                    directory
                        .scene(&SceneId::new(scene))?
                        .drawing(drawing)?
                        .text
                        .clone()
                        .filter(|text| !text.is_empty())
                });
                if let Some(zone) = zone {
                    return zone;
                }
            }
            if let EffectParent::Actor(_) = parent {
                match self.locate_source_item(parent) {
                    Ok(Some(item)) => return item.name.clone(),
                    Ok(None) => {}
                    Err(err) => tracing::debug!(effect = %self.label(), error = %err, "falling back to default source name"),
                }
            }
        }

        default_source_name(&origin, directory)
    }
}

/// Name of the document an origin points at, if it is an actor or an
/// actor's item.
fn default_source_name(origin: &Origin<'_>, directory: &dyn ActorDirectory) -> String {
    if origin.kind() != "Actor" {
        return UNKNOWN_SOURCE.to_string();
    }
    let Some(actor) = origin
        .document_id()
        .and_then(|id| directory.actor(&ActorId::new(id)))
    else {
        return UNKNOWN_SOURCE.to_string();
    };
    match (origin.embedded_kind(), origin.embedded_id()) {
        (None, _) => actor.name.clone(),
        (Some("Item"), Some(id)) => actor
            .item(id)
            .map_or_else(|| UNKNOWN_SOURCE.to_string(), |item| item.name.clone()),
        _ => UNKNOWN_SOURCE.to_string(),
    }
}

/// Status-icon tag for a label.
///
/// ```
/// use tabletop_effects::effects::slugify;
///
/// assert_eq!(slugify("Aethyric Armour"), "aethyric-armour");
/// assert_eq!(slugify("  Hold   Fast! "), "hold-fast");
/// assert_eq!(slugify("Sigmar's Ward"), "sigmars-ward");
/// ```
#[must_use]
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut gap = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            gap = true;
            continue;
        }
        if gap && !slug.ends_with('-') {
            slug.push('-');
        }
        gap = false;
        if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            slug.extend(ch.to_lowercase());
        }
    }
    slug.trim_matches('-').to_string()
}

/// Build concrete effect data from a completed test.
///
/// `item` defaults to the item the test was rolled with. Change values are
/// rewritten as follows:
/// - `@test.<path>` reads `<path>` from the test object
/// - `Actor.ID` inside a `@UUID[...]` reference becomes the tester's id
/// - numeric results become integers
/// - anything else that is not a `@UUID` reference becomes `0`
#[must_use]
pub fn populate_effect_data(mut data: EffectData, test: &TestOutcome<'_>, item: Option<&Item>) -> EffectData {
    data.origin = Some(origin::actor_uuid(&test.actor.id));

    let has_status = data
        .get_flag(CORE_FLAG_SCOPE, "statusId")
        .is_some_and(Value::is_truthy);
    if !has_status {
        let status = slugify(&data.label);
        data.set_flag(CORE_FLAG_SCOPE, "statusId", Value::Text(status));
    }

    let item = item.or(test.item);
    let duration = test
        .duration()
        .or_else(|| item.and_then(|item| item.duration.clone()));
    if let Some(duration) = duration {
        apply_duration(&mut data, &duration);
    }

    for change in data.changes.iter_mut() {
        let first = change.value.split('.').next().unwrap_or_default();
        let resolved = match change.value.strip_prefix("@test.") {
            Some(path) => test.property(path),
            None => Some(Value::Text(change.value.clone())),
        };

        if first.contains("@UUID") {
            let actor_ref = format!("Actor.{}", test.actor.id);
            change.value = change.value.replacen(ACTOR_ID_PLACEHOLDER, &actor_ref, 1);
        }

        match resolved.as_ref().filter(|v| v.is_numeric()).and_then(Value::parse_int) {
            Some(n) => change.value = n.to_string(),
            None if change.value.contains("@UUID") => {}
            None => {
                tracing::debug!(effect = %data.label, value = %change.value, "zeroing unresolved change value");
                change.value = "0".to_string();
            }
        }
    }

    data
}

fn apply_duration(data: &mut EffectData, duration: &DurationSpec) {
    let (Some(unit), Some(amount)) = (duration.unit(), duration.amount()) else {
        return;
    };
    match unit.seconds() {
        None => data.duration.rounds = Some(amount),
        Some(per_unit) => match amount.checked_mul(per_unit) {
            Some(seconds) => data.duration.seconds = Some(seconds),
            None => tracing::warn!(effect = %data.label, amount, "duration out of range, leaving it unset"),
        },
    }
}

impl AttachmentPoint {
    /// Borrow the parent document out of an actor that holds it.
    ///
    /// For an item attachment, `actor` is searched for the item.
    #[must_use]
    pub fn resolve<'a>(&self, actor: &'a Actor) -> Option<EffectParent<'a>> {
        match self {
            AttachmentPoint::Actor(id) => (actor.id == *id).then_some(EffectParent::Actor(actor)),
            AttachmentPoint::Item { item, .. } => actor.item(item.as_str()).map(EffectParent::Item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_FLAG_SCOPE;
    use crate::documents::{Drawing, Scene, World};
    use crate::effects::Change;
    use serde_json::json;

    fn gated(data: EffectData) -> EffectData {
        data.with_flag(DEFAULT_FLAG_SCOPE, "requiresEquip", true)
    }

    fn effect(data: EffectData) -> ActiveEffect {
        ActiveEffect::new("e1", data, AttachmentPoint::Actor(ActorId::new("a1")))
    }

    fn unequipped() -> Option<EquipState> {
        Some(EquipState {
            equippable: true,
            equipped: false,
        })
    }

    #[test]
    fn test_gating_requires_ready_and_unpacked() {
        let config = EngineConfig::default();
        let mut e = effect(gated(EffectData::new("Shield")));

        e.prepare_data(unequipped(), false, Environment::loading(), &config);
        assert!(!e.is_disabled());

        e.prepare_data(unequipped(), true, Environment::ready(), &config);
        assert!(!e.is_disabled());

        e.prepare_data(unequipped(), false, Environment::ready(), &config);
        assert!(e.is_disabled());
    }

    #[test]
    fn test_gating_leaves_ungated_effects_alone() {
        let config = EngineConfig::default();
        let mut manual = EffectData::new("Manual");
        manual.disabled = true;
        let mut e = effect(manual);

        e.prepare_data(
            Some(EquipState {
                equippable: true,
                equipped: true,
            }),
            false,
            Environment::ready(),
            &config,
        );
        assert!(e.is_disabled());

        let mut not_equippable = effect(gated(EffectData::new("Ring")));
        not_equippable.prepare_data(Some(EquipState::default()), false, Environment::ready(), &config);
        assert!(!not_equippable.is_disabled());

        let mut no_item = effect(gated(EffectData::new("Orphan")));
        no_item.prepare_data(None, false, Environment::ready(), &config);
        assert!(!no_item.is_disabled());
    }

    #[test]
    fn test_locate_source_item() {
        let actor = Actor::new("a1", "Vex", Value::map()).with_item(Item::new("sword", "Runefang"));
        let own = effect(EffectData::new("Keen").with_origin("Actor.a1.Item.sword"));
        let foreign = effect(EffectData::new("Keen").with_origin("Actor.b2.Item.sword"));
        let bare = effect(EffectData::new("Keen").with_origin("Actor.a1"));
        let none = effect(EffectData::new("Keen"));

        let parent = EffectParent::Actor(&actor);
        assert_eq!(own.resolve_source_item(parent).map(|i| i.name.as_str()), Some("Runefang"));
        assert!(matches!(
            foreign.locate_source_item(parent),
            Err(EffectError::StaleOrigin { .. })
        ));
        assert!(foreign.resolve_source_item(parent).is_none());
        assert!(bare.resolve_source_item(parent).is_none());
        assert!(none.resolve_source_item(parent).is_none());

        let item = &actor.items[0];
        assert_eq!(
            none.resolve_source_item(EffectParent::Item(item)).map(|i| i.id.as_str()),
            Some("sword")
        );
    }

    #[test]
    fn test_source_name() {
        let mut world = World::new(EngineConfig::default());
        world.add_scene(Scene::new("s1", "Wilds").with_drawing(Drawing::new("d1", "Blighted Ground")));
        let actor = Actor::new("a1", "Vex", Value::map()).with_item(Item::new("sword", "Runefang"));
        world.add_actor(Actor::new("b2", "Grunda", Value::map()));
        let parent = EffectParent::Actor(&actor);

        let named = |origin: Option<&str>| {
            let mut data = EffectData::new("x");
            data.origin = origin.map(str::to_string);
            effect(data).source_name(parent, &world)
        };

        assert_eq!(named(None), NO_SOURCE);
        assert_eq!(named(Some("Scene.s1.Drawing.d1")), "Blighted Ground");
        assert_eq!(named(Some("Actor.a1.Item.sword")), "Runefang");
        assert_eq!(named(Some("Actor.b2")), "Grunda");
        assert_eq!(named(Some("Actor.zz")), UNKNOWN_SOURCE);
        assert_eq!(named(Some("Scene.s1.Drawing.nope")), UNKNOWN_SOURCE);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Blessed"), "blessed");
        assert_eq!(slugify("Snake_Eyes  & Dice"), "snake_eyes-dice");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_populate_stamps_origin_and_status() {
        let actor = Actor::new("a1", "Vex", Value::map());
        let test = TestOutcome::new(&actor, Value::map());

        let data = populate_effect_data(EffectData::new("Aethyric Armour"), &test, None);
        assert_eq!(data.origin.as_deref(), Some("Actor.a1"));
        assert_eq!(data.get_flag(CORE_FLAG_SCOPE, "statusId"), Some(&Value::from("aethyric-armour")));

        let kept = EffectData::new("Aethyric Armour").with_flag(CORE_FLAG_SCOPE, "statusId", "armour");
        let data = populate_effect_data(kept, &test, None);
        assert_eq!(data.get_flag(CORE_FLAG_SCOPE, "statusId"), Some(&Value::from("armour")));
    }

    #[test]
    fn test_populate_test_references() {
        let actor = Actor::new("a1", "Vex", Value::map());
        let test = TestOutcome::new(&actor, Value::from(json!({ "armour": 3, "label": "shiny" })));
        let data = EffectData::new("Armour")
            .with_change(Change::add("system.combat.armour", "@test.result.armour"))
            .with_change(Change::add("system.combat.armour", "@test.result.label"))
            .with_change(Change::add("system.combat.armour", "@test.result.missing"));

        let data = populate_effect_data(data, &test, None);
        let values: Vec<_> = data.changes.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["3", "0", "0"]);
    }

    #[test]
    fn test_populate_item_duration_fallback() {
        let actor = Actor::new("a1", "Vex", Value::map());
        let spell = Item::new("spell", "Shield of Faith").with_duration(DurationSpec::new("minute", "10"));
        let test = TestOutcome::new(&actor, Value::map()).with_item(&spell);

        let data = populate_effect_data(EffectData::new("Shield"), &test, None);
        assert_eq!(data.duration.seconds, Some(600));
        assert_eq!(data.duration.rounds, None);

        let overcast = TestOutcome::new(&actor, Value::from(json!({ "duration": { "unit": "day", "value": 1 } })));
        let data = populate_effect_data(EffectData::new("Shield"), &overcast, Some(&spell));
        assert_eq!(data.duration.seconds, Some(86_400));
    }

    #[test]
    fn test_populate_out_of_range_duration() {
        let actor = Actor::new("a1", "Vex", Value::map());
        for value in [json!("999999999999999"), json!(1e300)] {
            let test = TestOutcome::new(&actor, Value::from(json!({ "duration": { "unit": "day", "value": value } })));
            let data = populate_effect_data(EffectData::new("Endless"), &test, None);
            assert_eq!(data.duration.seconds, None);
            assert_eq!(data.duration.rounds, None);
        }

        let test = TestOutcome::new(&actor, Value::from(json!({ "duration": { "unit": "round", "value": 1e300 } })));
        let data = populate_effect_data(EffectData::new("Endless"), &test, None);
        assert_eq!(data.duration.rounds, Some(i64::MAX));
    }

    #[test]
    fn test_attachment_resolve() {
        let actor = Actor::new("a1", "Vex", Value::map()).with_item(Item::new("sword", "Runefang"));
        let on_item = actor.items[0].attachment();

        assert_eq!(on_item.resolve(&actor).map(|p| p.document_name()), Some("Item"));
        assert_eq!(
            AttachmentPoint::Actor(ActorId::new("a1")).resolve(&actor).map(|p| p.id()),
            Some("a1")
        );
        assert!(AttachmentPoint::Actor(ActorId::new("b2")).resolve(&actor).is_none());
    }
}
