//! # Storyforge Core
//!
//! Data model and editing logic for branching interactive stories.
//!
//! A story is a directed graph of scenes connected by labeled choices. This crate holds:
//! - The serde data model ([`story`]) and pure graph operations ([`graph`])
//! - A versioned snapshot reducer the host uses as its single source of truth ([`snapshot`])
//! - Canvas drag/click disambiguation ([`canvas`]) and connection geometry ([`connections`])
//! - Playback ([`traversal`]) and the scene editing session ([`editor`])
//! - JSON import/export ([`transfer`])
//!
//! **No I/O beyond local files**: HTTP persistence and identity live in `api-rest`, and the
//! terminal front end lives in `storyforge-cli`.

pub mod canvas;
pub mod connections;
pub mod constants;
pub mod editor;
pub mod error;
pub mod graph;
pub mod ids;
pub mod snapshot;
pub mod story;
pub mod transfer;
pub mod traversal;

pub use canvas::{DragEffect, DragMachine, DragState, PointerButton, PointerEvent};
pub use connections::{route_connections, ConnectionPath};
pub use editor::{EditorCommit, NodeEditor};
pub use error::{ErrorKind, StoryError, StoryResult};
pub use snapshot::{StoryEdit, StorySnapshot};
pub use story::{Choice, Position, Story, StoryMeta, StoryNode};
pub use traversal::{AdvanceOutcome, PlaybackStatus, Traversal};
