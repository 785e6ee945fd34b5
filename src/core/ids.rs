//! Document identification.
//!
//! Every host document (actor, item, scene, drawing, effect) is identified
//! by an opaque string id assigned by the persistence layer. Each kind gets
//! its own newtype so an item id can never be used to look up an actor.
//!
//! ## Usage
//!
//! ```
//! use tabletop_effects::core::{ActorId, ItemId};
//!
//! let actor = ActorId::new("a1B2c3");
//! let item = ItemId::from("sword01");
//!
//! assert_eq!(actor.as_str(), "a1B2c3");
//! assert_eq!(format!("{}", item), "sword01");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new id.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw id string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

document_id!(
    /// Identifier of an actor (player character, adversary, party).
    ActorId
);

document_id!(
    /// Identifier of an item, unique within its owning actor.
    ItemId
);

document_id!(
    /// Identifier of a scene.
    SceneId
);

document_id!(
    /// Identifier of a drawing, unique within its scene.
    DrawingId
);

document_id!(
    /// Identifier of an active effect, unique within its parent.
    EffectId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality() {
        assert_eq!(ActorId::new("abc"), ActorId::from("abc"));
        assert_ne!(ActorId::new("abc"), ActorId::new("abd"));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ItemId::new("staff")), "staff");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let id = SceneId::new("scene9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"scene9\"");
        let deserialized: SceneId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
