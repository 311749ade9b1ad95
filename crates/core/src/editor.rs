//! Scene editing session.
//!
//! A [`NodeEditor`] holds a working copy of one scene's editable fields. Nothing reaches the
//! story until [`NodeEditor::save`] hands back a replacement node for
//! [`crate::graph::update_node`]. Closing the editor without saving simply drops the session.
//!
//! Saving a scene flagged as an ending empties its choice list. The dropped choices are returned
//! in the [`EditorCommit`] (and can be inspected beforehand with
//! [`NodeEditor::choices_discarded_on_save`]) so the loss can be shown to the author; they are
//! not kept anywhere.

use crate::constants::NEW_CHOICE_TEXT;
use crate::error::{StoryError, StoryResult};
use crate::graph::find_node;
use crate::ids::new_choice_id;
use crate::story::{Choice, StoryNode};

/// Result of saving an editing session.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorCommit {
    /// The replacement scene to write back into the story.
    pub node: StoryNode,
    /// Choices removed because the scene is an ending.
    pub discarded_choices: Vec<Choice>,
}

/// Working copy of one scene.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeEditor {
    original: StoryNode,
    title: String,
    content: String,
    choices: Vec<Choice>,
    is_start: bool,
    is_end: bool,
}

impl NodeEditor {
    /// Opens a session on `node`.
    pub fn open(node: &StoryNode) -> Self {
        Self {
            original: node.clone(),
            title: node.title.clone(),
            content: node.content.clone(),
            choices: node.choices.clone(),
            is_start: node.is_start,
            is_end: node.is_end,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.original.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn is_start(&self) -> bool {
        self.is_start
    }

    pub fn is_end(&self) -> bool {
        self.is_end
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_start(&mut self, is_start: bool) {
        self.is_start = is_start;
    }

    /// Flags the scene as an ending. The working choices are kept until save so toggling back
    /// loses nothing.
    pub fn set_end(&mut self, is_end: bool) {
        self.is_end = is_end;
    }

    /// Appends a placeholder choice with no target and returns it.
    pub fn add_choice(&mut self) -> &Choice {
        self.choices
            .push(Choice::new(new_choice_id(), NEW_CHOICE_TEXT, String::new()));
        &self.choices[self.choices.len() - 1]
    }

    /// Removes a choice from the working copy. Returns it if it existed.
    pub fn remove_choice(&mut self, choice_id: &str) -> Option<Choice> {
        let index = self.choices.iter().position(|c| c.id == choice_id)?;
        Some(self.choices.remove(index))
    }

    /// Changes a choice's label. Returns false if the choice does not exist.
    pub fn set_choice_text(&mut self, choice_id: &str, text: impl Into<String>) -> bool {
        match self.choices.iter_mut().find(|c| c.id == choice_id) {
            Some(choice) => {
                choice.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Points a choice at another scene, or clears its target with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidInput`] if the choice does not exist, if `target` is the
    /// scene being edited, or if `target` is not in `all_nodes`.
    pub fn retarget_choice(
        &mut self,
        choice_id: &str,
        target: Option<&str>,
        all_nodes: &[StoryNode],
    ) -> StoryResult<()> {
        if let Some(target_id) = target {
            if target_id == self.original.id {
                return Err(StoryError::InvalidInput(
                    "a choice cannot lead back to its own scene".into(),
                ));
            }
            if find_node(all_nodes, target_id).is_none() {
                return Err(StoryError::InvalidInput(format!(
                    "unknown target scene: {target_id}"
                )));
            }
        }

        let choice = self
            .choices
            .iter_mut()
            .find(|c| c.id == choice_id)
            .ok_or_else(|| StoryError::InvalidInput(format!("unknown choice: {choice_id}")))?;
        choice.target_node_id = target.unwrap_or_default().to_owned();
        Ok(())
    }

    /// Scenes a choice may point at: every scene except the one being edited.
    pub fn available_targets<'a>(&self, all_nodes: &'a [StoryNode]) -> Vec<&'a StoryNode> {
        all_nodes
            .iter()
            .filter(|n| n.id != self.original.id)
            .collect()
    }

    /// Choices that [`save`](Self::save) would drop.
    pub fn choices_discarded_on_save(&self) -> &[Choice] {
        if self.is_end {
            &self.choices
        } else {
            &[]
        }
    }

    /// True if the working copy differs from the scene as opened.
    pub fn is_dirty(&self) -> bool {
        self.build_node(self.choices.clone()) != self.original
    }

    /// Ends the session and produces the replacement scene.
    pub fn save(self) -> EditorCommit {
        let (kept, discarded_choices) = if self.is_end {
            (Vec::new(), self.choices.clone())
        } else {
            (self.choices.clone(), Vec::new())
        };
        if !discarded_choices.is_empty() {
            tracing::debug!(
                node_id = %self.original.id,
                discarded = discarded_choices.len(),
                "ending scene saved; choices dropped"
            );
        }
        EditorCommit {
            node: self.build_node(kept),
            discarded_choices,
        }
    }

    fn build_node(&self, choices: Vec<Choice>) -> StoryNode {
        StoryNode {
            title: self.title.clone(),
            content: self.content.clone(),
            choices,
            is_start: self.is_start,
            is_end: self.is_end,
            ..self.original.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph;
    use crate::story::Position;

    fn story_nodes() -> Vec<StoryNode> {
        vec![
            StoryNode::new("a", "Gate", "A locked gate.", Position::new(10.0, 10.0))
                .as_start()
                .with_choice(Choice::new("c1", "Climb", "b")),
            StoryNode::new("b", "Garden", "Overgrown.", Position::default()),
            StoryNode::new("c", "Tower", "Tall.", Position::default()),
        ]
    }

    #[test]
    fn edits_stay_in_working_copy_until_save() {
        let nodes = story_nodes();
        let mut editor = NodeEditor::open(&nodes[0]);
        editor.set_title("Iron Gate");
        assert!(editor.is_dirty());
        assert_eq!(nodes[0].title, "Gate");

        let commit = editor.save();
        assert_eq!(commit.node.title, "Iron Gate");
        assert_eq!(commit.node.position, nodes[0].position);
        assert!(commit.discarded_choices.is_empty());

        let next = graph::update_node(&nodes, commit.node);
        assert_eq!(next[0].title, "Iron Gate");
    }

    #[test]
    fn choice_list_edits() {
        let nodes = story_nodes();
        let mut editor = NodeEditor::open(&nodes[0]);
        let added = editor.add_choice().clone();
        assert_eq!(added.text, NEW_CHOICE_TEXT);
        assert!(added.target_node_id.is_empty());

        assert!(editor.set_choice_text(&added.id, "Look around"));
        editor
            .retarget_choice(&added.id, Some("c"), &nodes)
            .expect("c is a valid target");
        assert!(!editor.set_choice_text("missing", "x"));

        let removed = editor.remove_choice("c1").expect("c1 exists");
        assert_eq!(removed.target_node_id, "b");

        let commit = editor.save();
        assert_eq!(commit.node.choices.len(), 1);
        assert_eq!(commit.node.choices[0].text, "Look around");
        assert_eq!(commit.node.choices[0].target_node_id, "c");
    }

    #[test]
    fn targets_exclude_the_edited_scene() {
        let nodes = story_nodes();
        let mut editor = NodeEditor::open(&nodes[0]);
        let targets: Vec<&str> = editor
            .available_targets(&nodes)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(targets, vec!["b", "c"]);

        let err = editor
            .retarget_choice("c1", Some("a"), &nodes)
            .expect_err("self loops are refused");
        assert!(matches!(err, StoryError::InvalidInput(_)));
        assert!(editor.retarget_choice("c1", Some("zzz"), &nodes).is_err());
        assert!(editor.retarget_choice("nope", Some("b"), &nodes).is_err());

        editor
            .retarget_choice("c1", None, &nodes)
            .expect("clearing is allowed");
        assert!(editor.choices()[0].target_node_id.is_empty());
    }

    #[test]
    fn ending_scene_drops_choices_on_save() {
        let nodes = story_nodes();
        let mut editor = NodeEditor::open(&nodes[0]);
        editor.set_end(true);
        assert_eq!(editor.choices_discarded_on_save().len(), 1);

        let commit = editor.save();
        assert!(commit.node.is_end);
        assert!(commit.node.choices.is_empty());
        assert_eq!(commit.discarded_choices.len(), 1);
        assert_eq!(commit.discarded_choices[0].id, "c1");
    }

    #[test]
    fn toggling_end_back_off_keeps_choices() {
        let nodes = story_nodes();
        let mut editor = NodeEditor::open(&nodes[0]);
        editor.set_end(true);
        editor.set_end(false);
        assert!(editor.choices_discarded_on_save().is_empty());
        assert!(!editor.is_dirty());
        assert_eq!(editor.save().node, nodes[0]);
    }
}
