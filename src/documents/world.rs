//! The world: every loaded actor and scene, plus the readiness signal.
//!
//! Preparation checks an actor out of the world, prepares it against the
//! rest of the world (for cross-actor references), and puts it back. An
//! actor therefore only ever mutates its own data and queues; other
//! actors are read-only while it resolves.

use rustc_hash::FxHashMap;

use super::{Actor, Scene};
use crate::core::{ActorId, EngineConfig, Environment, SceneId, Value};
use crate::effects::{ApplyOutcome, DeferralQueue, EffectError};

/// Read access to live documents, used to resolve references.
pub trait ActorDirectory {
    /// Find a live actor.
    fn actor(&self, id: &ActorId) -> Option<&Actor>;

    /// Find a scene.
    fn scene(&self, _id: &SceneId) -> Option<&Scene> {
        None
    }

    /// World-level roll data (e.g. the `doom` counter), once available.
    fn world_data(&self) -> Option<&Value> {
        None
    }
}

/// All loaded documents.
#[derive(Clone, Debug, Default)]
pub struct World {
    actors: FxHashMap<ActorId, Actor>,
    scenes: FxHashMap<SceneId, Scene>,
    data: Value,
    env: Environment,
    config: EngineConfig,
}

impl World {
    /// Create an empty, not yet ready world.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            data: Value::map(),
            ..Self::default()
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current environment.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.env
    }

    /// Add (or replace) an actor.
    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.insert(actor.id.clone(), actor);
    }

    /// Get an actor.
    #[must_use]
    pub fn actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Get an actor for mutation.
    pub fn actor_mut(&mut self, id: &ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    /// Remove an actor. Its deferred queues go with it.
    pub fn remove_actor(&mut self, id: &ActorId) -> Option<Actor> {
        self.actors.remove(id)
    }

    /// Number of loaded actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Add (or replace) a scene.
    pub fn add_scene(&mut self, scene: Scene) {
        self.scenes.insert(scene.id.clone(), scene);
    }

    /// Set world-level roll data.
    pub fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    /// Run a preparation pass for one actor.
    pub fn prepare_actor(&mut self, id: &ActorId) -> Result<Vec<ApplyOutcome>, EffectError> {
        let mut actor = self
            .actors
            .remove(id)
            .ok_or_else(|| EffectError::ActorNotFound(id.clone()))?;
        let outcomes = actor.prepare_data(self.env, &self.config, &*self);
        self.actors.insert(actor.id.clone(), actor);
        Ok(outcomes)
    }

    /// Prepare every actor, in id order.
    pub fn prepare_all(&mut self) -> Vec<(ActorId, Vec<ApplyOutcome>)> {
        let mut results = Vec::with_capacity(self.actors.len());
        for id in self.sorted_actor_ids() {
            if let Ok(outcomes) = self.prepare_actor(&id) {
                results.push((id, outcomes));
            }
        }
        results
    }

    /// Signal readiness and resolve every post-ready change.
    ///
    /// Queues drain in actor id order; each actor's entries in the order
    /// they were parked. Calling this again is a no-op for the queues.
    pub fn mark_ready(&mut self) -> Vec<(ActorId, Vec<ApplyOutcome>)> {
        if !self.env.is_ready() {
            tracing::info!(actors = self.actors.len(), "world ready");
        }
        self.env = Environment::ready();

        let mut results = Vec::new();
        for id in self.sorted_actor_ids() {
            let Some(mut actor) = self.actors.remove(&id) else {
                continue;
            };
            let outcomes = actor.resolve_queue(DeferralQueue::PostReady, &*self);
            self.actors.insert(id.clone(), actor);
            if !outcomes.is_empty() {
                results.push((id, outcomes));
            }
        }
        results
    }

    fn sorted_actor_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self.actors.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl ActorDirectory for World {
    fn actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    fn world_data(&self) -> Option<&Value> {
        self.env.is_ready().then_some(&self.data)
    }
}
