//! Story data model.
//!
//! A [`Story`] is an ordered list of [`StoryNode`]s (scenes), each carrying an ordered list of
//! [`Choice`]s that point at other scenes by id. The JSON shape produced by serde here is the
//! export/import format and the body of the persistence API, so field names are camelCase.
//!
//! ## Invariants
//!
//! - Node ids are unique within a story.
//! - Choice ids are unique within their owning node.
//! - An end scene (`is_end`) carries no choices once saved through the node editor. The model
//!   itself tolerates residual choices; playback ignores them.
//! - Any number of scenes may be flagged `is_start`; playback picks the first by order.
//! - `target_node_id` may be empty or dangle. Only node deletion cleans up references.

use crate::constants::UNTITLED_STORY_TITLE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A point on the editor canvas, in device-independent pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// False if either coordinate is NaN or infinite. JSON has no encoding for those.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns `self` shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A labeled edge from one scene to another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub text: String,
    /// Id of the target scene, or empty when the author has not picked one yet.
    #[serde(default)]
    pub target_node_id: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            target_node_id: target.into(),
        }
    }

    /// True if the author has picked a target. Says nothing about whether it resolves.
    pub fn has_target(&self) -> bool {
        !self.target_node_id.is_empty()
    }

    pub fn targets(&self, node_id: &str) -> bool {
        self.target_node_id == node_id
    }
}

/// A single scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryNode {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub position: Position,
    #[serde(default)]
    pub is_start: bool,
    #[serde(default)]
    pub is_end: bool,
}

impl StoryNode {
    /// Builds a scene with no choices and neither start nor end flag.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            choices: Vec::new(),
            position,
            is_start: false,
            is_end: false,
        }
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn as_start(mut self) -> Self {
        self.is_start = true;
        self
    }

    pub fn as_end(mut self) -> Self {
        self.is_end = true;
        self
    }

    /// A non-end scene with no choices: playback gets stuck here.
    pub fn is_dead_end(&self) -> bool {
        !self.is_end && self.choices.is_empty()
    }
}

/// A whole branching narrative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<StoryNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Creates an empty, untitled story stamped with `now`.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: UNTITLED_STORY_TITLE.into(),
            description: String::new(),
            nodes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy of this story with `nodes` replaced and `updated_at` refreshed.
    pub fn with_nodes(&self, nodes: Vec<StoryNode>, now: DateTime<Utc>) -> Self {
        Self {
            nodes,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Projects the list-view summary of this story.
    pub fn meta(&self) -> StoryMeta {
        StoryMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            node_count: self.nodes.len(),
        }
    }
}

/// List-view projection of a [`Story`], without node bodies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryMeta {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub node_count: usize,
}
