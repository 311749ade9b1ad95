//! Offline story file commands: create, extend, inspect and route.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use storyforge_core::connections::route_connections;
use storyforge_core::graph::{self, dangling_choices, dead_ends, start_node};
use storyforge_core::ids::new_story_id;
use storyforge_core::{NodeEditor, Position, Story, StoryEdit, StoryResult, StorySnapshot};

/// A new story holding only the opening scene, flagged as start.
pub fn new_story(title: Option<&str>, description: Option<&str>, now: DateTime<Utc>) -> Story {
    let snapshot = StorySnapshot::new(Story::new(new_story_id(), now));
    let opening = graph::new_scene(snapshot.nodes(), None);
    let mut snapshot = snapshot.apply(StoryEdit::AddNode(opening), now);

    if title.is_some() || description.is_some() {
        let current = snapshot.story();
        snapshot = snapshot.apply(
            StoryEdit::UpdateDetails {
                title: title.map_or_else(|| current.title.clone(), str::to_owned),
                description: description.map_or_else(|| current.description.clone(), str::to_owned),
            },
            now,
        );
    }
    snapshot.into_story()
}

/// Parses an `X,Y` canvas position. Both coordinates must be finite numbers.
pub fn parse_position(raw: &str) -> Result<Position, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| "expected X,Y".to_string())?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let position = Position::new(x, y);
    if !position.is_finite() {
        return Err(format!("coordinates must be finite numbers, got {x},{y}"));
    }
    Ok(position)
}

/// What to put in a scene added from the command line.
#[derive(Clone, Debug, Default)]
pub struct SceneSpec {
    pub title: Option<String>,
    pub content: Option<String>,
    pub position: Option<Position>,
    pub end: bool,
    /// Scene that gets a new choice leading to the added scene, with the choice's label.
    pub link_from: Option<(String, String)>,
}

/// Adds a scene and optionally links an existing scene to it.
///
/// Both changes go through the node editor, so the same rules apply as in the visual editor:
/// linking from an ending is refused because saving would drop the choice.
///
/// Returns the updated story and the new scene's id.
pub fn add_scene(
    story: Story,
    spec: &SceneSpec,
    now: DateTime<Utc>,
) -> StoryResult<(Story, String)> {
    let mut snapshot = StorySnapshot::new(story);

    let blank = graph::new_scene(snapshot.nodes(), spec.position);
    let mut editor = NodeEditor::open(&blank);
    if let Some(title) = &spec.title {
        editor.set_title(title.as_str());
    }
    if let Some(content) = &spec.content {
        editor.set_content(content.as_str());
    }
    editor.set_end(spec.end);
    let scene = editor.save().node;
    let scene_id = scene.id.clone();
    snapshot = snapshot.apply(StoryEdit::AddNode(scene), now);

    if let Some((source_id, label)) = &spec.link_from {
        let source = graph::find_node(snapshot.nodes(), source_id).ok_or_else(|| {
            storyforge_core::StoryError::InvalidInput(format!("unknown scene: {source_id}"))
        })?;
        if source.is_end {
            return Err(storyforge_core::StoryError::InvalidInput(format!(
                "scene {source_id} is an ending and cannot offer choices"
            )));
        }

        let mut editor = NodeEditor::open(source);
        let choice_id = editor.add_choice().id.clone();
        editor.set_choice_text(&choice_id, label.as_str());
        editor.retarget_choice(&choice_id, Some(&scene_id), snapshot.nodes())?;
        let commit = editor.save();
        snapshot = snapshot.apply(StoryEdit::UpdateNode(commit.node), now);
    }

    tracing::debug!(version = snapshot.version(), scene_id = %scene_id, "added scene");
    Ok((snapshot.into_story(), scene_id))
}

/// Human-readable structural summary of a story.
pub fn inspect_report(story: &Story) -> String {
    let nodes = &story.nodes;
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", story.title, story.id);
    if !story.description.is_empty() {
        let _ = writeln!(out, "{}", story.description);
    }
    let _ = writeln!(
        out,
        "Scenes: {}  Choices: {}  Connections: {}",
        nodes.len(),
        nodes.iter().map(|n| n.choices.len()).sum::<usize>(),
        route_connections(nodes).len()
    );

    match start_node(nodes) {
        Some(start) => {
            let _ = writeln!(out, "Start: {} ({})", start.title, start.id);
        }
        None => {
            let _ = writeln!(out, "Start: none");
        }
    }
    let extra_starts = nodes.iter().filter(|n| n.is_start).count().saturating_sub(1);
    if extra_starts > 0 {
        let _ = writeln!(out, "Warning: {extra_starts} additional start scene(s) are ignored");
    }

    let endings: Vec<&str> = nodes
        .iter()
        .filter(|n| n.is_end)
        .map(|n| n.title.as_str())
        .collect();
    let _ = writeln!(out, "Endings: {}", display_list(&endings));

    let stuck: Vec<&str> = dead_ends(nodes).iter().map(|n| n.title.as_str()).collect();
    let _ = writeln!(out, "Dead ends: {}", display_list(&stuck));

    let mut unlinked: Vec<String> = nodes
        .iter()
        .flat_map(|n| {
            n.choices
                .iter()
                .filter(|c| !c.has_target())
                .map(move |c| format!("  {} / {} (no target)", n.id, c.id))
        })
        .collect();
    unlinked.extend(dangling_choices(nodes).into_iter().map(|d| {
        format!("  {} / {} (missing {})", d.node_id, d.choice_id, d.target_node_id)
    }));
    if unlinked.is_empty() {
        let _ = writeln!(out, "Unlinked choices: none");
    } else {
        let _ = writeln!(out, "Unlinked choices:");
        for line in unlinked {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

fn display_list(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_owned()
    } else {
        items.join(", ")
    }
}

/// One line per drawable connection: `source/choice -> target: <svg path>`.
pub fn routes_listing(story: &Story) -> String {
    let mut out = String::new();
    for path in route_connections(&story.nodes) {
        let _ = writeln!(
            out,
            "{}/{} -> {}: {}",
            path.source_node_id,
            path.choice_id,
            path.target_node_id,
            path.svg_path()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use storyforge_core::constants::{OPENING_SCENE_TITLE, UNTITLED_STORY_TITLE};
    use storyforge_core::{Choice, StoryNode};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 4, 18, 0, 0).unwrap()
    }

    #[test]
    fn new_story_has_single_start_scene() {
        let story = new_story(None, None, now());
        assert_eq!(story.title, UNTITLED_STORY_TITLE);
        assert_eq!(story.nodes.len(), 1);
        assert!(story.nodes[0].is_start);
        assert_eq!(story.nodes[0].title, OPENING_SCENE_TITLE);

        let titled = new_story(Some("Harbour Lights"), None, now());
        assert_eq!(titled.title, "Harbour Lights");
    }

    #[test]
    fn add_scene_links_from_source() {
        let story = new_story(Some("T"), None, now());
        let start_id = story.nodes[0].id.clone();
        let spec = SceneSpec {
            title: Some("Docks".into()),
            end: true,
            link_from: Some((start_id.clone(), "Walk to the docks".into())),
            ..SceneSpec::default()
        };
        let (story, docks_id) = add_scene(story, &spec, now()).expect("added");

        assert_eq!(story.nodes.len(), 2);
        let start = graph::find_node(&story.nodes, &start_id).expect("start");
        assert_eq!(start.choices.len(), 1);
        assert_eq!(start.choices[0].text, "Walk to the docks");
        assert_eq!(start.choices[0].target_node_id, docks_id);
        assert!(graph::find_node(&story.nodes, &docks_id).expect("docks").is_end);
    }

    #[test]
    fn add_scene_refuses_links_from_endings_and_unknown_scenes() {
        let story = new_story(None, None, now());
        let (story, end_id) = add_scene(
            story,
            &SceneSpec {
                end: true,
                ..SceneSpec::default()
            },
            now(),
        )
        .expect("added");

        let from_end = SceneSpec {
            link_from: Some((end_id, "Onward".into())),
            ..SceneSpec::default()
        };
        assert!(add_scene(story.clone(), &from_end, now()).is_err());

        let from_nowhere = SceneSpec {
            link_from: Some(("ghost".into(), "Onward".into())),
            ..SceneSpec::default()
        };
        assert!(add_scene(story, &from_nowhere, now()).is_err());
    }

    #[test]
    fn report_flags_structure_problems() {
        let mut story = Story::new("s", now()).with_nodes(
            vec![
                StoryNode::new("a", "Gate", "", Position::default())
                    .as_start()
                    .with_choice(Choice::new("c1", "In", "b"))
                    .with_choice(Choice::new("c2", "Later", "")),
                StoryNode::new("b", "Hall", "", Position::new(400.0, 0.0)),
                StoryNode::new("c", "Exit", "", Position::default()).as_end().as_start(),
            ],
            now(),
        );
        story.title = "Castle".into();

        let report = inspect_report(&story);
        assert!(report.contains("Scenes: 3  Choices: 2  Connections: 1"));
        assert!(report.contains("Start: Gate (a)"));
        assert!(report.contains("1 additional start scene(s)"));
        assert!(report.contains("Endings: Exit"));
        assert!(report.contains("Dead ends: Hall"));
        assert!(report.contains("a / c2 (no target)"));
    }

    #[test]
    fn position_argument_must_be_finite() {
        assert_eq!(parse_position("120, -40.5"), Ok(Position::new(120.0, -40.5)));
        assert!(parse_position("NaN,0").is_err());
        assert!(parse_position("0,inf").is_err());
        assert!(parse_position("-infinity,3").is_err());
        assert!(parse_position("12").is_err());
        assert!(parse_position("a,b").is_err());
    }

    #[test]
    fn routes_listing_uses_svg_paths() {
        let story = Story::new("s", now()).with_nodes(
            vec![
                StoryNode::new("a", "A", "", Position::new(0.0, 0.0))
                    .with_choice(Choice::new("c1", "go", "b")),
                StoryNode::new("b", "B", "", Position::new(400.0, 100.0)),
            ],
            now(),
        );
        assert_eq!(
            routes_listing(&story),
            "a/c1 -> b: M 150 80 C 275 80, 275 140, 400 140\n"
        );
    }
}
