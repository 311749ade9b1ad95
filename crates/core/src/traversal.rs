//! Story playback.
//!
//! A [`Traversal`] walks the graph from the start scene following the reader's choices. It only
//! ever reads the node list; its own state is the current scene id and the path taken so far.
//!
//! Playback never fails. Missing start scenes, dangling choices and dead ends are reported as
//! [`PlaybackStatus`] values so the reading surface can render them.

use crate::graph::{find_node, start_node};
use crate::story::{Choice, StoryNode};

/// What the reader is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No scene is flagged as the start (or the current scene was removed).
    NoStart,
    /// A scene with choices to pick from.
    Reading,
    /// An end scene. Residual choices on it are ignored.
    Ended,
    /// Not an end scene, but there is nowhere to go. Usually a missing choice.
    DeadEnd,
}

/// Result of [`Traversal::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced,
    NoCurrentScene,
    /// The choice is not offered by the current scene (or the scene is an ending).
    ChoiceNotOffered,
    /// The choice's target is empty or names a missing scene.
    UnresolvedTarget,
}

/// A choice as presented to the reader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfferedChoice<'a> {
    pub choice: &'a Choice,
    /// False when picking this choice would go nowhere; render it disabled.
    pub resolves: bool,
}

/// Ephemeral playback state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Traversal {
    current: Option<String>,
    history: Vec<String>,
}

impl Traversal {
    /// Starts at the first scene flagged as start, by list order.
    pub fn initialize(nodes: &[StoryNode]) -> Self {
        match start_node(nodes) {
            Some(start) => Self {
                current: Some(start.id.clone()),
                history: vec![start.id.clone()],
            },
            None => Self::default(),
        }
    }

    /// Returns to the start scene and resets history to that single entry.
    pub fn restart(&mut self, nodes: &[StoryNode]) {
        *self = Self::initialize(nodes);
    }

    /// Follows `choice_id` from the current scene.
    pub fn advance(&mut self, nodes: &[StoryNode], choice_id: &str) -> AdvanceOutcome {
        let Some(scene) = self.current_node(nodes) else {
            return AdvanceOutcome::NoCurrentScene;
        };
        if scene.is_end {
            return AdvanceOutcome::ChoiceNotOffered;
        }
        let Some(choice) = scene.choices.iter().find(|c| c.id == choice_id) else {
            return AdvanceOutcome::ChoiceNotOffered;
        };
        let Some(next) = find_node(nodes, &choice.target_node_id) else {
            return AdvanceOutcome::UnresolvedTarget;
        };

        let next_id = next.id.clone();
        self.history.push(next_id.clone());
        self.current = Some(next_id);
        AdvanceOutcome::Advanced
    }

    /// The scene being read, if it still exists.
    pub fn current_node<'a>(&self, nodes: &'a [StoryNode]) -> Option<&'a StoryNode> {
        self.current.as_deref().and_then(|id| find_node(nodes, id))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn status(&self, nodes: &[StoryNode]) -> PlaybackStatus {
        match self.current_node(nodes) {
            None => PlaybackStatus::NoStart,
            Some(scene) if scene.is_end => PlaybackStatus::Ended,
            Some(scene) if scene.choices.is_empty() => PlaybackStatus::DeadEnd,
            Some(_) => PlaybackStatus::Reading,
        }
    }

    /// Choices to show for the current scene. Always empty on an ending.
    pub fn offered_choices<'a>(&self, nodes: &'a [StoryNode]) -> Vec<OfferedChoice<'a>> {
        match self.current_node(nodes) {
            Some(scene) if !scene.is_end => scene
                .choices
                .iter()
                .map(|choice| OfferedChoice {
                    choice,
                    resolves: find_node(nodes, &choice.target_node_id).is_some(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Scene ids visited, in order, repeats included.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// How many scenes the reader has seen so far.
    pub fn journey_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph;
    use crate::story::Position;

    fn scene(id: &str) -> StoryNode {
        StoryNode::new(id, id.to_uppercase(), format!("Scene {id}"), Position::default())
    }

    fn a_to_b() -> Vec<StoryNode> {
        vec![
            scene("a")
                .as_start()
                .with_choice(Choice::new("go", "Go to B", "b")),
            scene("b").as_end(),
        ]
    }

    #[test]
    fn start_to_end_example() {
        let nodes = a_to_b();
        let mut play = Traversal::initialize(&nodes);
        assert_eq!(play.current_id(), Some("a"));
        assert_eq!(play.history(), ["a"]);
        assert_eq!(play.status(&nodes), PlaybackStatus::Reading);

        assert_eq!(play.advance(&nodes, "go"), AdvanceOutcome::Advanced);
        assert_eq!(play.current_id(), Some("b"));
        assert_eq!(play.history(), ["a", "b"]);
        assert_eq!(play.status(&nodes), PlaybackStatus::Ended);
        assert!(play.offered_choices(&nodes).is_empty());
    }

    #[test]
    fn lone_start_without_choices_is_dead_end() {
        let nodes = vec![scene("a").as_start()];
        let play = Traversal::initialize(&nodes);
        assert_eq!(play.current_id(), Some("a"));
        assert_eq!(play.status(&nodes), PlaybackStatus::DeadEnd);
    }

    #[test]
    fn no_start_scene_is_reported() {
        let nodes = vec![scene("a"), scene("b")];
        let mut play = Traversal::initialize(&nodes);
        assert_eq!(play.status(&nodes), PlaybackStatus::NoStart);
        assert!(play.history().is_empty());
        assert_eq!(play.advance(&nodes, "x"), AdvanceOutcome::NoCurrentScene);
    }

    #[test]
    fn first_start_by_order_wins() {
        let nodes = vec![scene("a"), scene("b").as_start(), scene("c").as_start()];
        assert_eq!(Traversal::initialize(&nodes).current_id(), Some("b"));
    }

    #[test]
    fn unresolved_choice_is_noop() {
        let nodes = vec![
            scene("a")
                .as_start()
                .with_choice(Choice::new("ghost", "Into the mist", "missing"))
                .with_choice(Choice::new("unset", "Unwritten", "")),
        ];
        let mut play = Traversal::initialize(&nodes);
        assert_eq!(play.advance(&nodes, "ghost"), AdvanceOutcome::UnresolvedTarget);
        assert_eq!(play.advance(&nodes, "unset"), AdvanceOutcome::UnresolvedTarget);
        assert_eq!(play.advance(&nodes, "nope"), AdvanceOutcome::ChoiceNotOffered);
        assert_eq!(play.history(), ["a"]);

        let offered = play.offered_choices(&nodes);
        assert_eq!(offered.len(), 2);
        assert!(offered.iter().all(|o| !o.resolves));
    }

    #[test]
    fn end_flag_overrides_residual_choices() {
        let nodes = vec![
            scene("a")
                .as_start()
                .as_end()
                .with_choice(Choice::new("go", "Leftover", "b")),
            scene("b"),
        ];
        let mut play = Traversal::initialize(&nodes);
        assert_eq!(play.status(&nodes), PlaybackStatus::Ended);
        assert!(play.offered_choices(&nodes).is_empty());
        assert_eq!(play.advance(&nodes, "go"), AdvanceOutcome::ChoiceNotOffered);
    }

    #[test]
    fn history_keeps_repeats_and_restart_resets() {
        let nodes = vec![
            scene("a")
                .as_start()
                .with_choice(Choice::new("stay", "Wait", "a"))
                .with_choice(Choice::new("go", "Leave", "b")),
            scene("b").with_choice(Choice::new("back", "Return", "a")),
        ];
        let mut play = Traversal::initialize(&nodes);
        play.advance(&nodes, "stay");
        play.advance(&nodes, "go");
        play.advance(&nodes, "back");
        assert_eq!(play.history(), ["a", "a", "b", "a"]);
        assert_eq!(play.journey_len(), 4);

        play.restart(&nodes);
        assert_eq!(play, Traversal::initialize(&nodes));
        assert_eq!(play.history(), ["a"]);
    }

    #[test]
    fn deleted_current_scene_reads_as_no_start() {
        let nodes = a_to_b();
        let mut play = Traversal::initialize(&nodes);
        play.advance(&nodes, "go");
        let trimmed = graph::delete_node(&nodes, "b");
        assert_eq!(play.status(&trimmed), PlaybackStatus::NoStart);
        play.restart(&trimmed);
        assert_eq!(play.current_id(), Some("a"));
    }
}
