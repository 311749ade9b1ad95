//! Story graph operations.
//!
//! Every mutation here is a pure function: it borrows the current node list and returns a new
//! one. Nothing is mutated in place and nothing fails. An id that is not present is a no-op,
//! because the caller (the editor) is the only source of ids and is trusted.
//!
//! Deleting a scene is the single place where referential integrity is enforced: every choice
//! that pointed at the deleted scene is dropped in the same pass.

use crate::constants::{
    NEW_SCENE_CONTENT, NEW_SCENE_POSITION, NEW_SCENE_TITLE, OPENING_SCENE_CONTENT,
    OPENING_SCENE_POSITION, OPENING_SCENE_TITLE,
};
use crate::ids::new_node_id;
use crate::story::{Choice, Position, StoryNode};

/// Appends `new_node`.
///
/// The caller is responsible for a fresh id and for the start flag; see [`new_scene`].
pub fn add_node(nodes: &[StoryNode], new_node: StoryNode) -> Vec<StoryNode> {
    let mut next = nodes.to_vec();
    next.push(new_node);
    next
}

/// Replaces the node whose id matches `updated.id`.
///
/// Returns an unchanged copy when no node matches.
pub fn update_node(nodes: &[StoryNode], updated: StoryNode) -> Vec<StoryNode> {
    nodes
        .iter()
        .map(|n| {
            if n.id == updated.id {
                updated.clone()
            } else {
                n.clone()
            }
        })
        .collect()
}

/// Removes `node_id` and every choice that targets it.
pub fn delete_node(nodes: &[StoryNode], node_id: &str) -> Vec<StoryNode> {
    let mut dropped_choices = 0usize;
    let next: Vec<StoryNode> = nodes
        .iter()
        .filter(|n| n.id != node_id)
        .map(|n| {
            let choices: Vec<Choice> = n
                .choices
                .iter()
                .filter(|c| !c.targets(node_id))
                .cloned()
                .collect();
            dropped_choices += n.choices.len() - choices.len();
            StoryNode {
                choices,
                ..n.clone()
            }
        })
        .collect();

    tracing::debug!(
        node_id,
        removed = nodes.len() - next.len(),
        dropped_choices,
        "deleted scene"
    );
    next
}

/// Replaces only the position of `node_id`. No clamping, no collision avoidance.
pub fn move_node(nodes: &[StoryNode], node_id: &str, x: f64, y: f64) -> Vec<StoryNode> {
    nodes
        .iter()
        .map(|n| {
            if n.id == node_id {
                StoryNode {
                    position: Position::new(x, y),
                    ..n.clone()
                }
            } else {
                n.clone()
            }
        })
        .collect()
}

/// Builds a new scene for `nodes` with a fresh id.
///
/// The first scene of an empty story is the opening scene and is flagged as the start; later
/// scenes get placeholder text and no flags. `position` overrides the default placement.
pub fn new_scene(nodes: &[StoryNode], position: Option<Position>) -> StoryNode {
    if nodes.is_empty() {
        StoryNode::new(
            new_node_id(),
            OPENING_SCENE_TITLE,
            OPENING_SCENE_CONTENT,
            position.unwrap_or(OPENING_SCENE_POSITION),
        )
        .as_start()
    } else {
        StoryNode::new(
            new_node_id(),
            NEW_SCENE_TITLE,
            NEW_SCENE_CONTENT,
            position.unwrap_or(NEW_SCENE_POSITION),
        )
    }
}

// ============================================================================
// QUERIES
// ============================================================================

/// First node with the given id.
pub fn find_node<'a>(nodes: &'a [StoryNode], node_id: &str) -> Option<&'a StoryNode> {
    nodes.iter().find(|n| n.id == node_id)
}

/// First node flagged as a start scene, by list order.
pub fn start_node(nodes: &[StoryNode]) -> Option<&StoryNode> {
    nodes.iter().find(|n| n.is_start)
}

/// A choice whose target is set but does not name any scene.
#[derive(Clone, Debug, PartialEq)]
pub struct DanglingChoice {
    pub node_id: String,
    pub choice_id: String,
    pub target_node_id: String,
}

/// Lists choices that point at missing scenes, in node-then-choice order.
///
/// Choices without a target are not dangling; they are simply unfinished.
pub fn dangling_choices(nodes: &[StoryNode]) -> Vec<DanglingChoice> {
    nodes
        .iter()
        .flat_map(|n| {
            n.choices
                .iter()
                .filter(|c| c.has_target() && find_node(nodes, &c.target_node_id).is_none())
                .map(move |c| DanglingChoice {
                    node_id: n.id.clone(),
                    choice_id: c.id.clone(),
                    target_node_id: c.target_node_id.clone(),
                })
        })
        .collect()
}

/// Scenes that are not endings but offer no choices.
pub fn dead_ends(nodes: &[StoryNode]) -> Vec<&StoryNode> {
    nodes.iter().filter(|n| n.is_dead_end()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scene(id: &str) -> StoryNode {
        StoryNode::new(id, id.to_uppercase(), "", Position::default())
    }

    fn sample_graph() -> Vec<StoryNode> {
        vec![
            scene("a")
                .as_start()
                .with_choice(Choice::new("c1", "left", "b"))
                .with_choice(Choice::new("c2", "right", "c")),
            scene("b").with_choice(Choice::new("c1", "back", "a")),
            scene("c")
                .with_choice(Choice::new("c1", "onward", "b"))
                .with_choice(Choice::new("c2", "loop", "c")),
        ]
    }

    #[test]
    fn add_node_appends_without_touching_input() {
        let nodes = sample_graph();
        let next = add_node(&nodes, scene("d"));
        assert_eq!(nodes.len(), 3);
        assert_eq!(next.len(), 4);
        assert_eq!(next[3].id, "d");
    }

    #[test]
    fn update_node_replaces_matching_id() {
        let nodes = sample_graph();
        let mut edited = nodes[1].clone();
        edited.title = "Renamed".into();
        let next = update_node(&nodes, edited);
        assert_eq!(next[1].title, "Renamed");
        assert_eq!(next[0], nodes[0]);
    }

    #[test]
    fn update_node_with_unknown_id_is_noop() {
        let nodes = sample_graph();
        let next = update_node(&nodes, scene("zzz"));
        assert_eq!(next, nodes);
    }

    #[test]
    fn delete_node_drops_choices_targeting_it() {
        let next = delete_node(&sample_graph(), "b");
        assert_eq!(next.len(), 2);
        assert!(find_node(&next, "b").is_none());
        let a = find_node(&next, "a").expect("a survives");
        assert_eq!(a.choices.len(), 1);
        assert_eq!(a.choices[0].target_node_id, "c");
        let c = find_node(&next, "c").expect("c survives");
        assert_eq!(c.choices.len(), 1);
        assert_eq!(c.choices[0].id, "c2");
    }

    #[test]
    fn delete_unknown_node_is_noop() {
        let nodes = sample_graph();
        assert_eq!(delete_node(&nodes, "missing"), nodes);
    }

    #[test]
    fn move_node_only_changes_position() {
        let nodes = sample_graph();
        let next = move_node(&nodes, "c", -40.5, 1e6);
        assert_eq!(next[2].position, Position::new(-40.5, 1e6));
        assert_eq!(next[2].choices, nodes[2].choices);
        assert_eq!(next[0], nodes[0]);
    }

    #[test]
    fn new_scene_marks_first_as_start() {
        let first = new_scene(&[], None);
        assert!(first.is_start);
        assert_eq!(first.title, OPENING_SCENE_TITLE);
        assert_eq!(first.position, OPENING_SCENE_POSITION);

        let second = new_scene(&[first.clone()], Some(Position::new(7.0, 8.0)));
        assert!(!second.is_start);
        assert_eq!(second.title, NEW_SCENE_TITLE);
        assert_eq!(second.position, Position::new(7.0, 8.0));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn start_node_is_first_by_order() {
        let nodes = vec![scene("a"), scene("b").as_start(), scene("c").as_start()];
        assert_eq!(start_node(&nodes).map(|n| n.id.as_str()), Some("b"));
        assert!(start_node(&[scene("x")]).is_none());
    }

    #[test]
    fn dangling_and_dead_end_reports() {
        let nodes = vec![
            scene("a")
                .with_choice(Choice::new("c1", "ghost", "nowhere"))
                .with_choice(Choice::new("c2", "unset", "")),
            scene("b"),
            scene("c").as_end(),
        ];
        let dangling = dangling_choices(&nodes);
        assert_eq!(
            dangling,
            vec![DanglingChoice {
                node_id: "a".into(),
                choice_id: "c1".into(),
                target_node_id: "nowhere".into(),
            }]
        );
        let dead: Vec<&str> = dead_ends(&nodes).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(dead, vec!["b"]);
    }

    fn arb_graph() -> impl Strategy<Value = Vec<StoryNode>> {
        (1usize..8).prop_flat_map(|count| {
            let targets = prop::collection::vec(
                prop::collection::vec(0usize..count + 2, 0..4),
                count,
            );
            targets.prop_map(move |per_node| {
                per_node
                    .into_iter()
                    .enumerate()
                    .map(|(i, picks)| {
                        let mut node = scene(&format!("n{i}"));
                        for (j, t) in picks.into_iter().enumerate() {
                            node = node.with_choice(Choice::new(
                                format!("c{j}"),
                                "go",
                                format!("n{t}"),
                            ));
                        }
                        node
                    })
                    .collect()
            })
        })
    }

    proptest! {
        #[test]
        fn deleted_node_is_never_referenced(nodes in arb_graph(), pick in 0usize..10) {
            let victim = format!("n{pick}");
            let next = delete_node(&nodes, &victim);
            prop_assert!(next.iter().all(|n| n.id != victim));
            prop_assert!(next
                .iter()
                .flat_map(|n| n.choices.iter())
                .all(|c| c.target_node_id != victim));
        }

        #[test]
        fn update_with_absent_id_returns_equal_graph(nodes in arb_graph()) {
            let next = update_node(&nodes, scene("absent"));
            prop_assert_eq!(next, nodes);
        }
    }
}
