//! Effect origins.
//!
//! An origin records which document caused an effect, as a dotted uuid:
//! `Actor.<actorId>` for test-synthesized effects, `Actor.<actorId>.Item.<itemId>`
//! for effects granted by an owned item, `Scene.<sceneId>.Drawing.<drawingId>`
//! for zone effects.

use smallvec::SmallVec;

use crate::core::{ActorId, ItemId};

/// Parsed view of an origin uuid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin<'a> {
    segments: SmallVec<[&'a str; 4]>,
}

impl<'a> Origin<'a> {
    /// Split an origin uuid into its segments.
    #[must_use]
    pub fn parse(origin: &'a str) -> Self {
        Self {
            segments: origin.split('.').collect(),
        }
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: splitting yields at least one segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `Kind.id.EmbeddedKind.embeddedId` form.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.segments.len() == 4
    }

    /// Document kind (`Actor`, `Scene`, `Item`).
    #[must_use]
    pub fn kind(&self) -> &'a str {
        self.segments.first().copied().unwrap_or_default()
    }

    /// Id of the top-level document.
    #[must_use]
    pub fn document_id(&self) -> Option<&'a str> {
        self.segments.get(1).copied()
    }

    /// Kind of the embedded document (`Item`, `Drawing`).
    #[must_use]
    pub fn embedded_kind(&self) -> Option<&'a str> {
        self.segments.get(2).copied()
    }

    /// Id of the embedded document.
    #[must_use]
    pub fn embedded_id(&self) -> Option<&'a str> {
        self.segments.get(3).copied().filter(|id| !id.is_empty())
    }

    /// Does the origin point into a scene drawing?
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.segments.contains(&"Drawing")
    }
}

/// Uuid of an actor.
#[must_use]
pub fn actor_uuid(actor: &ActorId) -> String {
    format!("Actor.{actor}")
}

/// Uuid of an item, embedded in its owning actor when it has one.
#[must_use]
pub fn item_uuid(actor: Option<&ActorId>, item: &ItemId) -> String {
    match actor {
        Some(actor) => format!("Actor.{actor}.Item.{item}"),
        None => format!("Item.{item}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_item_origin() {
        let origin = Origin::parse("Actor.abc.Item.sword");
        assert!(origin.is_embedded());
        assert_eq!(origin.kind(), "Actor");
        assert_eq!(origin.document_id(), Some("abc"));
        assert_eq!(origin.embedded_kind(), Some("Item"));
        assert_eq!(origin.embedded_id(), Some("sword"));
        assert!(!origin.is_drawing());
    }

    #[test]
    fn test_actor_origin() {
        let origin = Origin::parse("Actor.abc");
        assert_eq!(origin.len(), 2);
        assert!(!origin.is_embedded());
        assert_eq!(origin.embedded_id(), None);
    }

    #[test]
    fn test_drawing_origin() {
        let origin = Origin::parse("Scene.s1.Drawing.d1");
        assert!(origin.is_drawing());
        assert_eq!(origin.document_id(), Some("s1"));
        assert_eq!(origin.embedded_id(), Some("d1"));
    }

    #[test]
    fn test_uuids() {
        assert_eq!(actor_uuid(&ActorId::new("a")), "Actor.a");
        assert_eq!(
            item_uuid(Some(&ActorId::new("a")), &ItemId::new("i")),
            "Actor.a.Item.i"
        );
        assert_eq!(item_uuid(None, &ItemId::new("i")), "Item.i");
    }
}
