//! Change resolution - applying changes to actor data.
//!
//! `ChangeResolver::apply` decides what happens to a change:
//! - no `@` in the value: applied to the actor's prepared data right away
//! - the post-ready sentinel before the world is ready: parked on the
//!   post-ready queue
//! - any other reference: parked on the derived queue
//!
//! Parked changes come back through `resolve_deferred`, which fills in the
//! referenced data and then applies the change the immediate way.

use tracing::{debug, error, warn};

use super::{Change, ChangeMode, DeferralQueue, DeferredChange, EffectError};
use crate::core::value::is_numeric_text;
use crate::core::{ActorId, EngineConfig, Environment, Value};
use crate::documents::{Actor, ActorDirectory};
use crate::expr::evaluate;

/// Prefix every change key must carry.
const SYSTEM_PREFIX: &str = "system.";

/// Result of applying one change.
#[derive(Clone, Debug, PartialEq)]
pub enum ApplyOutcome {
    /// The change was written; `value` is the attribute's new value.
    Applied { key: String, value: Value },
    /// The change was parked on a queue.
    Deferred(DeferralQueue),
    /// The change does not mutate attributes (or cannot), nothing happened.
    Skipped(String),
    /// The change failed; siblings are unaffected.
    Failed(EffectError),
}

impl ApplyOutcome {
    /// Was the change written?
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Applies and resolves changes.
pub struct ChangeResolver;

impl ChangeResolver {
    /// Apply a change to an actor, or park it if it references data.
    pub fn apply(
        actor: &mut Actor,
        label: &str,
        change: &Change,
        env: Environment,
        config: &EngineConfig,
    ) -> ApplyOutcome {
        if change.is_deferred() {
            let queue = if change.value == config.post_ready_sentinel && !env.is_ready() {
                DeferralQueue::PostReady
            } else {
                DeferralQueue::Derived
            };
            debug!(effect = %label, actor = %actor.name, ?queue, "deferring change");
            actor.deferred.push(queue, DeferredChange::new(label, change.clone()));
            return ApplyOutcome::Deferred(queue);
        }

        debug!(effect = %label, actor = %actor.name, key = %change.key, "applying change");
        Self::apply_immediate(&mut actor.system, label, change)
    }

    /// Apply a literal change to prepared system data.
    ///
    /// The key must start with `system.`; the rest is the path inside
    /// `system`.
    pub fn apply_immediate(system: &mut Value, label: &str, change: &Change) -> ApplyOutcome {
        if change.is_deferred() {
            warn!(effect = %label, value = %change.value, "unresolved reference left in change");
            return ApplyOutcome::Skipped(format!("unresolved reference '{}'", change.value));
        }
        if matches!(change.mode, ChangeMode::Custom) || change.mode.is_dialog() {
            return not_data(change.mode);
        }
        let Some(path) = change.key.strip_prefix(SYSTEM_PREFIX).filter(|p| !p.is_empty()) else {
            warn!(effect = %label, key = %change.key, "change does not target system data");
            return ApplyOutcome::Failed(EffectError::UnsupportedTarget(change.key.clone()));
        };

        let delta = literal(&change.value);
        let current = system.get_path(path).filter(|v| !matches!(v, Value::Null));

        let next = match (change.mode, current) {
            (ChangeMode::Override, _) => delta,
            (ChangeMode::Add, None) => delta,
            (ChangeMode::Add, Some(Value::Number(a))) => match delta {
                Value::Number(b) => Value::Number(a + b),
                _ => return mismatch(label, change),
            },
            (ChangeMode::Add, Some(Value::Text(text))) => Value::Text(format!("{text}{}", change.value)),
            (ChangeMode::Add, Some(Value::List(items))) => {
                let mut items = items.clone();
                items.push(delta);
                Value::List(items)
            }
            (ChangeMode::Add, Some(_)) => return mismatch(label, change),
            (ChangeMode::Multiply, current) => match (current.map_or(Some(0.0), Value::as_f64), delta) {
                (Some(a), Value::Number(b)) => Value::Number(a * b),
                _ => return mismatch(label, change),
            },
            (ChangeMode::Upgrade | ChangeMode::Downgrade, None) => delta,
            (ChangeMode::Upgrade | ChangeMode::Downgrade, Some(current)) => {
                match (current.as_f64(), delta.as_f64()) {
                    (Some(a), Some(b)) if change.mode == ChangeMode::Upgrade => Value::Number(a.max(b)),
                    (Some(a), Some(b)) => Value::Number(a.min(b)),
                    _ => return mismatch(label, change),
                }
            }
            (ChangeMode::Custom | ChangeMode::DialogSelf | ChangeMode::DialogTarget, _) => {
                return not_data(change.mode)
            }
        };

        if !system.set_path(path, next.clone()) {
            warn!(effect = %label, key = %change.key, "change target is not a container");
            return ApplyOutcome::Failed(EffectError::UnsupportedTarget(change.key.clone()));
        }
        ApplyOutcome::Applied {
            key: change.key.clone(),
            value: next,
        }
    }

    /// Compute the literal value of a parked change.
    ///
    /// A `@UUID[Actor.<id>].system.<path>` value switches evaluation over
    /// to the referenced actor and reads `@<path>` from it. Everything
    /// else is evaluated against `actor`. World-level data is visible
    /// behind the actor's own data when the directory offers it.
    pub fn fill_derived_value(
        change: &Change,
        label: &str,
        actor: &Actor,
        directory: &dyn ActorDirectory,
    ) -> Result<String, EffectError> {
        let (source, formula) = match cross_actor_reference(&change.value) {
            Some((id, path)) => {
                let id = ActorId::new(id);
                let source = if id == actor.id {
                    actor
                } else {
                    directory
                        .actor(&id)
                        .ok_or(EffectError::ReferenceResolution { actor_id: id })?
                };
                (source, format!("@{path}"))
            }
            None => (actor, change.value.clone()),
        };

        let mut data = source.roll_data();
        if let Some(world) = directory.world_data() {
            data = data.with_layer(world);
        }

        evaluate(&formula, &data)
            .map(|result| result.to_change_value())
            .map_err(|source| EffectError::Expression {
                label: label.to_string(),
                source,
            })
    }

    /// Resolve a parked change and apply it.
    ///
    /// Failures are logged here and returned; they never reach siblings.
    pub fn resolve_deferred(
        actor: &mut Actor,
        deferred: DeferredChange,
        directory: &dyn ActorDirectory,
    ) -> ApplyOutcome {
        let DeferredChange { label, mut change } = deferred;

        match Self::fill_derived_value(&change, &label, actor, directory) {
            Ok(value) => {
                change.value = value;
                debug!(effect = %label, actor = %actor.name, value = %change.value, "resolved deferred change");
                Self::apply_immediate(&mut actor.system, &label, &change)
            }
            Err(err @ EffectError::ReferenceResolution { .. }) => {
                error!(effect = %label, actor = %actor.name, error = %err, "dropping change");
                ApplyOutcome::Failed(err)
            }
            Err(err) => {
                warn!(effect = %label, actor = %actor.name, error = %err, "skipping change");
                ApplyOutcome::Failed(err)
            }
        }
    }
}

/// Split `@UUID[Actor.<id>].system.<path>` into id and path.
///
/// The id is the shortest non-empty run followed by `].system.`; the path
/// runs to the end of the value.
pub(crate) fn cross_actor_reference(value: &str) -> Option<(&str, &str)> {
    const OPEN: &str = "@UUID[Actor.";
    const CLOSE: &str = "].system.";

    let rest = &value[value.find(OPEN)? + OPEN.len()..];
    let end = rest.char_indices().skip(1).find_map(|(i, _)| rest[i..].starts_with(CLOSE).then_some(i))?;
    let path = &rest[end + CLOSE.len()..];
    (!path.is_empty()).then_some((&rest[..end], path))
}

/// Interpret a literal change value.
fn literal(value: &str) -> Value {
    match value.trim() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        trimmed if is_numeric_text(trimmed) => trimmed.parse().map_or_else(|_| Value::from(value), Value::Number),
        _ => Value::from(value),
    }
}

fn not_data(mode: ChangeMode) -> ApplyOutcome {
    ApplyOutcome::Skipped(format!("{mode:?} changes are not applied to data"))
}

fn mismatch(label: &str, change: &Change) -> ApplyOutcome {
    warn!(effect = %label, key = %change.key, value = %change.value, "value does not fit target");
    ApplyOutcome::Skipped(format!("cannot apply '{}' to {}", change.value, change.key))
}
