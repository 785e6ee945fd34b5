//! Host documents the effect engine reads and writes.
//!
//! - `Actor`: owns effects, items, prepared data and deferred queues
//! - `Item`: owns effects, carries equip state and an authored duration
//! - `Scene`/`Drawing`: zone effects point at drawings
//! - `World`: every live document, the readiness signal, and preparation
//!
//! Persistence and permissions belong to the host. These types only carry
//! what effect resolution needs.

mod actor;
mod item;
mod scene;
mod world;

pub use actor::Actor;
pub use item::{EquipState, Item};
pub use scene::{Drawing, Scene};
pub use world::{ActorDirectory, World};
