//! Constants used throughout the Storyforge core crate.
//!
//! Canvas geometry, default scene text and file naming live here so the editor, the router and
//! the CLI agree on them.

use crate::story::Position;

/// Pointer travel (device-independent pixels) a press must exceed before it becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

/// Horizontal offset of a choice's outgoing anchor from the source node's origin.
pub const SOURCE_ANCHOR_X: f64 = 150.0;

/// Vertical offset of the first choice's outgoing anchor.
pub const SOURCE_ANCHOR_Y: f64 = 80.0;

/// Vertical spacing between successive choice anchors on one node.
pub const CHOICE_ANCHOR_SPACING: f64 = 20.0;

/// Vertical offset of the incoming anchor on a target node's left edge.
pub const TARGET_ANCHOR_Y: f64 = 40.0;

/// Canvas extent used when rendering a standalone SVG.
pub const CANVAS_MIN_SIZE: f64 = 2000.0;

/// Title given to a freshly created story.
pub const UNTITLED_STORY_TITLE: &str = "Untitled Story";

pub const OPENING_SCENE_TITLE: &str = "Opening Scene";
pub const OPENING_SCENE_CONTENT: &str = "Your story begins here...";
pub const NEW_SCENE_TITLE: &str = "New Scene";
pub const NEW_SCENE_CONTENT: &str = "Enter your story text here...";
pub const NEW_CHOICE_TEXT: &str = "New choice";

/// Where the first scene of an empty story is placed.
pub const OPENING_SCENE_POSITION: Position = Position { x: 400.0, y: 200.0 };

/// Where later scenes are placed when the caller has no better position.
pub const NEW_SCENE_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// Extension appended to exported story files.
pub const EXPORT_EXTENSION: &str = "json";

pub const NODE_ID_PREFIX: &str = "node";
pub const CHOICE_ID_PREFIX: &str = "choice";
pub const STORY_ID_PREFIX: &str = "story";
