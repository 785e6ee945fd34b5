//! Effect system: changes, their resolution, and effect lifecycles.
//!
//! - `Change`/`ChangeMode`: one atomic modification of actor data
//! - `EffectData`/`ActiveEffect`: a labelled bundle of changes attached to
//!   an actor or an item
//! - `ChangeResolver`: applies changes, parking those that reference data
//!   which does not exist yet on the actor's `DeferredQueues`
//! - lifecycle: equip-gating, source item lookup, synthesis from tests
//! - dialog projection: the subset of changes offered as roll toggles
//!
//! ## Failure isolation
//!
//! Every change produces its own `ApplyOutcome`. A change that fails to
//! evaluate or names a missing actor is logged and reported; its siblings
//! in the same effect, and other effects on the same actor, still apply.

mod change;
mod dialog;
mod effect;
mod error;
mod lifecycle;
pub mod origin;
mod queue;
mod resolver;

pub use change::{Change, ChangeMode, Conditional};
pub use dialog::{DialogChange, DialogOptions};
pub use effect::{ActiveEffect, AttachmentPoint, EffectData, EffectDuration, CORE_FLAG_SCOPE};
pub use error::EffectError;
pub use lifecycle::{populate_effect_data, slugify, EffectParent, NO_SOURCE, UNKNOWN_SOURCE};
pub use origin::Origin;
pub use queue::{DeferralQueue, DeferredChange, DeferredQueues};
pub use resolver::{ApplyOutcome, ChangeResolver};
