//! Core engine types: data values, document ids, environment, configuration.
//!
//! This module contains the building blocks every other module shares.
//! Systems configure behaviour via `EngineConfig` rather than modifying the core.

pub mod config;
pub mod environment;
pub mod ids;
pub mod value;

pub use config::EngineConfig;
pub use environment::Environment;
pub use ids::{ActorId, DrawingId, EffectId, ItemId, SceneId};
pub use value::Value;
