//! Effect errors.
//!
//! Every failure here is scoped to a single change: callers log it and move
//! on to the next change, nothing aborts an effect or an actor.

use crate::core::ActorId;
use crate::expr::ExpressionError;

/// Errors raised while resolving or applying a change.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// The change's value formula failed to evaluate.
    #[error("could not evaluate change of '{label}': {source}")]
    Expression {
        /// Label of the effect owning the change.
        label: String,
        #[source]
        source: ExpressionError,
    },

    /// A `@UUID[Actor.<id>]` reference names no live actor.
    #[error("referenced actor '{actor_id}' not found")]
    ReferenceResolution { actor_id: ActorId },

    /// An origin's actor segment does not match the effect's parent.
    #[error("origin '{origin}' does not belong to '{parent}'")]
    StaleOrigin { origin: String, parent: String },

    /// The actor a change was meant for no longer exists.
    #[error("actor '{0}' not found")]
    ActorNotFound(ActorId),

    /// The change targets something other than actor system data.
    #[error("unsupported change target '{0}'")]
    UnsupportedTarget(String),
}
