//! Versioned story snapshots.
//!
//! The host application owns exactly one current [`StorySnapshot`]. Every change is expressed as
//! a [`StoryEdit`] and applied with [`StorySnapshot::apply`], which returns the next snapshot and
//! leaves the previous one untouched. The version counter increases by one per applied edit, so
//! a host can tell whether the value it is about to save is still current.

use crate::graph;
use crate::story::{Position, Story, StoryNode};
use chrono::{DateTime, Utc};

/// One change to a story.
#[derive(Clone, Debug, PartialEq)]
pub enum StoryEdit {
    AddNode(StoryNode),
    UpdateNode(StoryNode),
    DeleteNode(String),
    MoveNode { node_id: String, position: Position },
    /// Wholesale replacement, e.g. after folding a drag trace into the node list.
    ReplaceNodes(Vec<StoryNode>),
    /// Story title and description, as edited in the story details form.
    UpdateDetails { title: String, description: String },
}

/// An immutable, versioned story value.
#[derive(Clone, Debug, PartialEq)]
pub struct StorySnapshot {
    version: u64,
    story: Story,
}

impl StorySnapshot {
    /// Wraps a freshly created or loaded story at version 0.
    pub fn new(story: Story) -> Self {
        Self { version: 0, story }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn nodes(&self) -> &[StoryNode] {
        &self.story.nodes
    }

    pub fn into_story(self) -> Story {
        self.story
    }

    /// Applies `edit` and returns the next snapshot stamped with `now`.
    ///
    /// Edits naming unknown node ids still produce a new version; the graph operations treat
    /// them as no-ops.
    pub fn apply(&self, edit: StoryEdit, now: DateTime<Utc>) -> StorySnapshot {
        let nodes = self.nodes();
        let story = match edit {
            StoryEdit::AddNode(node) => self.story.with_nodes(graph::add_node(nodes, node), now),
            StoryEdit::UpdateNode(node) => {
                self.story.with_nodes(graph::update_node(nodes, node), now)
            }
            StoryEdit::DeleteNode(node_id) => {
                self.story
                    .with_nodes(graph::delete_node(nodes, &node_id), now)
            }
            StoryEdit::MoveNode { node_id, position } => self.story.with_nodes(
                graph::move_node(nodes, &node_id, position.x, position.y),
                now,
            ),
            StoryEdit::ReplaceNodes(next) => self.story.with_nodes(next, now),
            StoryEdit::UpdateDetails { title, description } => Story {
                title,
                description,
                updated_at: now,
                ..self.story.clone()
            },
        };

        tracing::debug!(
            story_id = %story.id,
            version = self.version + 1,
            nodes = story.nodes.len(),
            "applied story edit"
        );

        StorySnapshot {
            version: self.version + 1,
            story,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Choice;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
    }

    fn base() -> StorySnapshot {
        let story = Story::new("story-1", t0()).with_nodes(
            vec![
                StoryNode::new("a", "A", "", Position::default())
                    .as_start()
                    .with_choice(Choice::new("c1", "go", "b")),
                StoryNode::new("b", "B", "", Position::default()).as_end(),
            ],
            t0(),
        );
        StorySnapshot::new(story)
    }

    #[test]
    fn apply_returns_new_version_and_keeps_previous() {
        let before = base();
        let later = t0() + Duration::minutes(5);
        let after = before.apply(StoryEdit::DeleteNode("b".into()), later);

        assert_eq!(before.version(), 0);
        assert_eq!(before.nodes().len(), 2);
        assert_eq!(after.version(), 1);
        assert_eq!(after.nodes().len(), 1);
        assert!(after.nodes()[0].choices.is_empty());
        assert_eq!(after.story().updated_at, later);
        assert_eq!(after.story().created_at, t0());
    }

    #[test]
    fn move_edit_updates_position() {
        let after = base().apply(
            StoryEdit::MoveNode {
                node_id: "a".into(),
                position: Position::new(12.0, 34.0),
            },
            t0(),
        );
        assert_eq!(after.nodes()[0].position, Position::new(12.0, 34.0));
    }

    #[test]
    fn details_edit_keeps_nodes() {
        let after = base().apply(
            StoryEdit::UpdateDetails {
                title: "The Lighthouse".into(),
                description: "A short mystery".into(),
            },
            t0() + Duration::seconds(1),
        );
        assert_eq!(after.story().title, "The Lighthouse");
        assert_eq!(after.nodes().len(), 2);
    }

    #[test]
    fn unknown_ids_still_bump_version() {
        let ghost = StoryNode::new("zzz", "", "", Position::default());
        let after = base().apply(StoryEdit::UpdateNode(ghost), t0());
        assert_eq!(after.version(), 1);
        assert_eq!(after.nodes(), base().nodes());
    }
}
