//! Effect lifecycle integration tests.
//!
//! These tests verify equip-gating across preparation passes, effect
//! synthesis from test results, and source naming.

use serde_json::json;

use tabletop_effects::core::config::DEFAULT_FLAG_SCOPE;
use tabletop_effects::{
    populate_effect_data, Actor, ActorId, Change, Drawing, DurationSpec, EffectData, EffectParent,
    EngineConfig, Item, Scene, TestOutcome, Value, World,
};

fn change_values(data: &EffectData) -> Vec<String> {
    data.changes.iter().map(|c| c.value.clone()).collect()
}

fn armoured_world(equipped: bool, pack: Option<&str>) -> World {
    let mut actor = Actor::new("a1", "Vex", Value::from(json!({ "combat": { "armour": 1 } })));
    actor.pack = pack.map(str::to_string);
    actor.add_item(
        Item::new("plate", "Sigmarite Plate")
            .equippable(equipped)
            .with_effect(
                "e1",
                EffectData::new("Sigmarite Plate")
                    .with_flag(DEFAULT_FLAG_SCOPE, "requiresEquip", true)
                    .with_change(Change::add("system.combat.armour", "3")),
            ),
    );
    let mut world = World::new(EngineConfig::default());
    world.add_actor(actor);
    world
}

fn plate_disabled(world: &World) -> bool {
    world.actor(&ActorId::new("a1")).unwrap().items[0].effects[0].is_disabled()
}

fn armour(world: &World) -> Option<Value> {
    world
        .actor(&ActorId::new("a1"))
        .unwrap()
        .system
        .get_path("combat.armour")
        .cloned()
}

/// Unequipping disables the effect; equipping re-enables it on the next pass.
#[test]
fn test_equip_gating_follows_equip_state() {
    let mut world = armoured_world(false, None);
    world.mark_ready();
    let id = ActorId::new("a1");

    world.prepare_actor(&id).unwrap();
    assert!(plate_disabled(&world));
    assert_eq!(armour(&world), Some(Value::from(1)));

    world.actor_mut(&id).unwrap().item_mut("plate").unwrap().equipped = true;
    world.prepare_actor(&id).unwrap();
    assert!(!plate_disabled(&world));
    assert_eq!(armour(&world), Some(Value::from(4)));
}

/// No gating before the world is ready, nor for actors stored in packs.
#[test]
fn test_equip_gating_waits_and_skips_packs() {
    let mut loading = armoured_world(false, None);
    loading.prepare_actor(&ActorId::new("a1")).unwrap();
    assert!(!plate_disabled(&loading));

    let mut packed = armoured_world(false, Some("world.heroes"));
    packed.mark_ready();
    packed.prepare_actor(&ActorId::new("a1")).unwrap();
    assert!(!plate_disabled(&packed));
}

/// Test durations convert to rounds or seconds; no unit sets neither.
#[test]
fn test_duration_conversion() {
    let actor = Actor::new("a1", "Vex", Value::map());
    let cases = [
        (json!({ "unit": "hour", "value": "2" }), None, Some(7200)),
        (json!({ "unit": "round", "value": "3" }), Some(3), None),
        (json!({ "unit": "minute", "value": 5 }), None, Some(300)),
        (json!({ "value": "4" }), None, None),
    ];

    for (duration, rounds, seconds) in cases {
        let test = TestOutcome::new(&actor, Value::from(json!({ "duration": duration })));
        let data = populate_effect_data(EffectData::new("Timed"), &test, None);
        assert_eq!(data.duration.rounds, rounds);
        assert_eq!(data.duration.seconds, seconds);
    }
}

/// A test duration wins over the item's authored one.
#[test]
fn test_test_duration_beats_item_duration() {
    let actor = Actor::new("a1", "Vex", Value::map());
    let spell = Item::new("s1", "Ward").with_duration(DurationSpec::new("round", "1"));
    let test = TestOutcome::new(&actor, Value::from(json!({ "duration": { "unit": "round", "value": 4 } })))
        .with_item(&spell);

    let data = populate_effect_data(EffectData::new("Ward"), &test, None);
    assert_eq!(data.duration.rounds, Some(4));

    let plain = TestOutcome::new(&actor, Value::map()).with_item(&spell);
    let data = populate_effect_data(EffectData::new("Ward"), &plain, None);
    assert_eq!(data.duration.rounds, Some(1));
}

/// A duration too long to express in seconds is dropped, not wrapped.
#[test]
fn test_oversized_duration_is_dropped() {
    let actor = Actor::new("a1", "Vex", Value::map());
    let test = TestOutcome::new(
        &actor,
        Value::from(json!({ "duration": { "unit": "day", "value": "999999999999999" } })),
    );

    let data = populate_effect_data(
        EffectData::new("Eternal Vigil").with_change(Change::add("system.defence", "1")),
        &test,
        None,
    );
    assert_eq!(data.duration.seconds, None);
    assert_eq!(change_values(&data), ["1"]);
}

/// Numbers become integers; `Actor.ID` templates take the tester's id.
#[test]
fn test_change_value_coercion() {
    let actor = Actor::new("XYZ", "Vex", Value::map());
    let test = TestOutcome::new(&actor, Value::from(json!({ "damage": { "total": 6 } })));
    let data = EffectData::new("Aethyric Armour")
        .with_change(Change::add("system.combat.armour", "5"))
        .with_change(Change::add("system.combat.armour", "@UUID[Actor.ID].system.x"))
        .with_change(Change::add("system.combat.armour", "@test.result.damage.total"))
        .with_change(Change::add("system.combat.armour", "2.9"));

    let data = populate_effect_data(data, &test, None);
    assert_eq!(
        change_values(&data),
        ["5", "@UUID[Actor.XYZ].system.x", "6", "2"]
    );
}

/// Documented quirk: a value that is neither numeric nor a `@UUID`
/// reference is zeroed during synthesis, including plain roll-data
/// references. Kept on purpose; changing it changes authored content.
#[test]
fn test_quirk_non_numeric_values_become_zero() {
    let actor = Actor::new("a1", "Vex", Value::map());
    let test = TestOutcome::new(&actor, Value::map());
    let data = EffectData::new("Odd")
        .with_change(Change::add("system.attack", "abc"))
        .with_change(Change::add("system.attack", "@mind"))
        .with_change(Change::add("system.attack", "@test.result.nothing"));

    let data = populate_effect_data(data, &test, None);
    assert_eq!(change_values(&data), ["0", "0", "0"]);
}

/// Synthesized effects applied to their target resolve cross-actor references.
#[test]
fn test_synthesized_effect_resolves_against_tester() {
    let mut world = World::new(EngineConfig::default());
    let caster = Actor::new("caster", "Priest", Value::from(json!({ "soul": 4 })));
    let test = TestOutcome::new(&caster, Value::map());
    let data = populate_effect_data(
        EffectData::new("Blessing").with_change(Change::add("system.defence", "@UUID[Actor.ID].system.soul")),
        &test,
        None,
    );
    assert_eq!(data.origin.as_deref(), Some("Actor.caster"));

    world.add_actor(Actor::new("target", "Knight", Value::from(json!({ "defence": 2 }))).with_effect("e1", data));
    world.add_actor(caster.clone());

    world.prepare_actor(&ActorId::new("target")).unwrap();
    let target = world.actor(&ActorId::new("target")).unwrap();
    assert_eq!(target.system.get_path("defence"), Some(&Value::from(6)));
}

/// Zone effects are named after their drawing, item effects after their item.
#[test]
fn test_source_names() {
    let mut world = World::new(EngineConfig::default());
    world.add_scene(Scene::new("s1", "Ghur").with_drawing(Drawing::new("d1", "Amber Wastes")));
    let actor = Actor::new("a1", "Vex", Value::map())
        .with_item(Item::new("i1", "Realmstone"))
        .with_effect("zone", EffectData::new("Zone").with_origin("Scene.s1.Drawing.d1"))
        .with_effect("item", EffectData::new("Item").with_origin("Actor.a1.Item.i1"))
        .with_effect("none", EffectData::new("Nothing"));
    let parent = EffectParent::Actor(&actor);

    assert_eq!(actor.effect("zone").unwrap().source_name(parent, &world), "Amber Wastes");
    assert_eq!(actor.effect("item").unwrap().source_name(parent, &world), "Realmstone");
    assert_eq!(actor.effect("none").unwrap().source_name(parent, &world), "None");
}

/// An origin naming another actor never resolves to this actor's items.
#[test]
fn test_stale_origin_resolves_no_item() {
    let actor = Actor::new("a1", "Vex", Value::map())
        .with_item(Item::new("i1", "Realmstone"))
        .with_effect("e1", EffectData::new("Stale").with_origin("Actor.b2.Item.i1"));

    let effect = actor.effect("e1").unwrap();
    assert!(effect.resolve_source_item(EffectParent::Actor(&actor)).is_none());
    assert_eq!(effect.source_name(EffectParent::Actor(&actor), &actor), "Unknown");
}
