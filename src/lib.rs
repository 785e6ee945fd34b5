//! # tabletop-effects
//!
//! An effect resolution engine for a tabletop RPG virtual tabletop.
//!
//! Effects are labelled bundles of changes (buffs, debuffs, conditions)
//! attached to actors and items. Change values may be plain literals or
//! formulas referencing data that only exists later: the actor's own
//! derived stats, another actor's stats, a test result, the world's doom
//! counter.
//!
//! ## Design Principles
//!
//! 1. **Closed Formula Language**: Change values are evaluated by a small
//!    arithmetic grammar over roll data. Content can never run code.
//!
//! 2. **Explicit Deferral**: A change that references unknown data is parked
//!    on one of its actor's two queues and drained exactly once.
//!
//! 3. **Explicit Environment**: Readiness is a value passed into every call
//!    that depends on it, never a global.
//!
//! 4. **Per-Change Isolation**: Every change gets its own outcome. One bad
//!    change never stops its siblings.
//!
//! ## Modules
//!
//! - `core`: Values, document ids, environment, configuration
//! - `expr`: Formula substitution, parsing and evaluation
//! - `documents`: Actors, items, scenes and the world
//! - `roll`: Test outcomes handed over by the dice subsystem
//! - `effects`: Changes, resolution, lifecycle and dialog projection
//!
//! ## Example
//!
//! ```
//! use tabletop_effects::{Actor, Change, EffectData, EngineConfig, Value, World};
//!
//! let mut world = World::new(EngineConfig::default());
//! world.add_actor(
//!     Actor::new("a1", "Vex", Value::from(serde_json::json!({ "attack": 2, "mind": 3 })))
//!         .with_effect("e1", EffectData::new("Focus").with_change(Change::add("system.attack", "@mind"))),
//! );
//!
//! world.prepare_actor(&"a1".into()).unwrap();
//! let vex = world.actor(&"a1".into()).unwrap();
//! assert_eq!(vex.system.get_path("attack"), Some(&Value::from(5)));
//! ```

pub mod core;
pub mod documents;
pub mod effects;
pub mod expr;
pub mod roll;

// Re-export commonly used types
pub use crate::core::{ActorId, DrawingId, EffectId, EngineConfig, Environment, ItemId, SceneId, Value};

pub use crate::expr::{evaluate, replace_formula_data, ExpressionError, RollData, Scalar};

pub use crate::documents::{Actor, ActorDirectory, Drawing, EquipState, Item, Scene, World};

pub use crate::roll::{DurationSpec, DurationUnit, TestOutcome};

pub use crate::effects::{
    populate_effect_data, slugify, ActiveEffect, ApplyOutcome, AttachmentPoint, Change,
    ChangeMode, ChangeResolver, Conditional, DeferralQueue, DeferredChange, DeferredQueues,
    DialogChange, DialogOptions, EffectData, EffectDuration, EffectError, EffectParent, Origin,
};
