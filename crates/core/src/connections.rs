//! Connection routing between choices and their target scenes.
//!
//! Each resolvable choice becomes a cubic Bézier from an anchor on the right of its source scene
//! (stacked by choice index) to an anchor on the left edge of the target scene. Both control
//! points sit at the horizontal midpoint, at the source and target heights respectively, so the
//! curve leaves and arrives horizontally.
//!
//! Choices whose target is empty or missing produce no path. The absence of a line is how the
//! canvas shows a dangling choice.

use crate::constants::{
    CANVAS_MIN_SIZE, CHOICE_ANCHOR_SPACING, SOURCE_ANCHOR_X, SOURCE_ANCHOR_Y, TARGET_ANCHOR_Y,
};
use crate::story::{Position, StoryNode};
use std::collections::HashMap;
use std::fmt::Write as _;

/// One rendered edge.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionPath {
    pub source_node_id: String,
    pub choice_id: String,
    pub choice_index: usize,
    pub target_node_id: String,
    pub start: Position,
    pub control_start: Position,
    pub control_end: Position,
    pub end: Position,
}

impl ConnectionPath {
    /// SVG path data: `M sx sy C mx sy, mx ey, ex ey`.
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control_start.x,
            self.control_start.y,
            self.control_end.x,
            self.control_end.y,
            self.end.x,
            self.end.y
        )
    }

    /// Evaluates the curve at `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        let blend = |p0: f64, p1: f64, p2: f64, p3: f64| b0 * p0 + b1 * p1 + b2 * p2 + b3 * p3;
        Position::new(
            blend(self.start.x, self.control_start.x, self.control_end.x, self.end.x),
            blend(self.start.y, self.control_start.y, self.control_end.y, self.end.y),
        )
    }
}

/// Computes every drawable connection, in node-then-choice order.
pub fn route_connections(nodes: &[StoryNode]) -> Vec<ConnectionPath> {
    // First node wins if ids were ever duplicated, matching lookup by list order elsewhere.
    let mut by_id: HashMap<&str, &StoryNode> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.id.as_str()).or_insert(node);
    }

    let mut paths = Vec::new();
    for node in nodes {
        for (index, choice) in node.choices.iter().enumerate() {
            let Some(target) = by_id.get(choice.target_node_id.as_str()) else {
                continue;
            };
            paths.push(route(node, index, &choice.id, target));
        }
    }
    paths
}

fn route(source: &StoryNode, index: usize, choice_id: &str, target: &StoryNode) -> ConnectionPath {
    let start = source
        .position
        .offset(SOURCE_ANCHOR_X, SOURCE_ANCHOR_Y + index as f64 * CHOICE_ANCHOR_SPACING);
    let end = target.position.offset(0.0, TARGET_ANCHOR_Y);
    let mid_x = (start.x + end.x) / 2.0;

    ConnectionPath {
        source_node_id: source.id.clone(),
        choice_id: choice_id.to_owned(),
        choice_index: index,
        target_node_id: target.id.clone(),
        start,
        control_start: Position::new(mid_x, start.y),
        control_end: Position::new(mid_x, end.y),
        end,
    }
}

/// Renders the connection overlay as a standalone SVG document.
pub fn render_svg(nodes: &[StoryNode]) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}">"#,
        size = CANVAS_MIN_SIZE
    );
    svg.push_str(
        r##"  <defs>
    <marker id="arrowhead" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto">
      <polygon points="0 0, 10 3, 0 6" fill="#94a3b8" />
    </marker>
  </defs>
"##,
    );
    for path in route_connections(nodes) {
        let _ = writeln!(
            svg,
            r##"  <path id="{}-{}" d="{}" fill="none" stroke="#94a3b8" stroke-width="2" marker-end="url(#arrowhead)" />"##,
            path.source_node_id,
            path.choice_id,
            path.svg_path()
        );
    }
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::Choice;

    fn graph() -> Vec<StoryNode> {
        vec![
            StoryNode::new("a", "A", "", Position::new(0.0, 0.0))
                .with_choice(Choice::new("c1", "to b", "b"))
                .with_choice(Choice::new("c2", "nowhere", "ghost"))
                .with_choice(Choice::new("c3", "unset", ""))
                .with_choice(Choice::new("c4", "to b again", "b")),
            StoryNode::new("b", "B", "", Position::new(400.0, 100.0))
                .with_choice(Choice::new("c1", "back", "a")),
        ]
    }

    #[test]
    fn anchors_follow_choice_index() {
        let paths = route_connections(&graph());
        assert_eq!(paths.len(), 3);

        let first = &paths[0];
        assert_eq!(first.start, Position::new(150.0, 80.0));
        assert_eq!(first.end, Position::new(400.0, 140.0));
        assert_eq!(first.control_start, Position::new(275.0, 80.0));
        assert_eq!(first.control_end, Position::new(275.0, 140.0));

        let fourth = &paths[1];
        assert_eq!(fourth.choice_id, "c4");
        assert_eq!(fourth.choice_index, 3);
        assert_eq!(fourth.start, Position::new(150.0, 140.0));
    }

    #[test]
    fn unresolved_targets_are_skipped_and_order_is_stable() {
        let ids: Vec<(String, String)> = route_connections(&graph())
            .into_iter()
            .map(|p| (p.source_node_id, p.choice_id))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("a".to_string(), "c1".to_string()),
                ("a".to_string(), "c4".to_string()),
                ("b".to_string(), "c1".to_string()),
            ]
        );
    }

    #[test]
    fn svg_path_matches_canvas_format() {
        let paths = route_connections(&graph());
        assert_eq!(paths[0].svg_path(), "M 150 80 C 275 80, 275 140, 400 140");
    }

    #[test]
    fn curve_hits_endpoints_and_midpoint() {
        let path = &route_connections(&graph())[0];
        assert_eq!(path.point_at(0.0), path.start);
        assert_eq!(path.point_at(1.0), path.end);
        let mid = path.point_at(0.5);
        assert!((mid.x - 275.0).abs() < 1e-9);
        assert!((mid.y - 110.0).abs() < 1e-9);
    }

    #[test]
    fn svg_document_contains_one_path_per_connection() {
        let svg = render_svg(&graph());
        assert_eq!(svg.matches("<path ").count(), 3);
        assert!(svg.contains("marker-end=\"url(#arrowhead)\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
