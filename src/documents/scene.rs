//! Scenes and their drawings.
//!
//! Drawings mark zones on a map; a zone effect's origin points at the
//! drawing, and the drawing's text becomes the effect's source name.

use serde::{Deserialize, Serialize};

use crate::core::{DrawingId, SceneId};

/// A drawing placed on a scene.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: DrawingId,
    #[serde(default)]
    pub text: Option<String>,
}

impl Drawing {
    /// Create a drawing with a text label.
    pub fn new(id: impl Into<DrawingId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
        }
    }
}

/// A scene document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(id: impl Into<SceneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            drawings: Vec::new(),
        }
    }

    /// Add a drawing.
    #[must_use]
    pub fn with_drawing(mut self, drawing: Drawing) -> Self {
        self.drawings.push(drawing);
        self
    }

    /// Find a drawing by id.
    #[must_use]
    pub fn drawing(&self, id: &str) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id.as_str() == id)
    }
}
