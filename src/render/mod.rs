//! The drawing side of the viewer: what a render surface must accept and report.

mod style;
mod terminal;

pub use style::{Color, GraphStyle, GroupColors};
pub use terminal::TerminalSurface;

use crate::model::{Edge, GraphSnapshot, Node};

/// What the pointer hit in a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Node(String),
    Edge(String),
    None,
}

impl Hit {
    /// Resolves the raw hit lists of a click. A single node wins over edges;
    /// anything ambiguous counts as no hit.
    pub fn from_lists(nodes: &[String], edges: &[String]) -> Self {
        match (nodes, edges) {
            ([node], _) => Hit::Node(node.clone()),
            (_, [edge]) => Hit::Edge(edge.clone()),
            _ => Hit::None,
        }
    }
}

/// Events a surface reports back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Node motion has settled for the current layout run.
    Stabilized,
    /// A frame is about to be drawn.
    Redraw,
    Click(Hit),
}

/// A node with its level-derived vertical position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub node: Node,
    pub y: f32,
}

/// Everything a surface needs to draw one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<Edge>,
    pub style: GraphStyle,
    pub physics: bool,
}

impl Scene {
    pub fn build(snapshot: &GraphSnapshot, style: &GraphStyle, level_spacing: f32) -> Self {
        let nodes = snapshot
            .nodes
            .iter()
            .map(|node| PlacedNode {
                y: node.level as f32 * level_spacing,
                node: node.clone(),
            })
            .collect();
        Self {
            nodes,
            edges: snapshot.edges.clone(),
            style: style.clone(),
            physics: true,
        }
    }
}

/// A layout/rendering engine the controller drives.
pub trait RenderSurface {
    /// Replaces the displayed graph and starts a layout run.
    fn show(&mut self, scene: &Scene);

    fn set_physics(&mut self, enabled: bool);

    fn select_nodes(&mut self, ids: &[String]);

    /// Zooms so the whole graph is visible.
    fn fit(&mut self);

    /// Events raised since the last call, oldest first.
    fn drain_events(&mut self) -> Vec<SurfaceEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeGroup;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_node_hit_wins() {
        assert_eq!(
            Hit::from_lists(&ids(&["3"]), &ids(&["3-4", "1-3"])),
            Hit::Node("3".into())
        );
    }

    #[test]
    fn test_single_edge_hit() {
        assert_eq!(Hit::from_lists(&[], &ids(&["1-2"])), Hit::Edge("1-2".into()));
    }

    #[test]
    fn test_ambiguous_hits() {
        assert_eq!(Hit::from_lists(&ids(&["1", "2"]), &[]), Hit::None);
        assert_eq!(Hit::from_lists(&[], &ids(&["1-2", "2-3"])), Hit::None);
        assert_eq!(Hit::from_lists(&[], &[]), Hit::None);
    }

    #[test]
    fn test_scene_places_nodes_by_level() {
        let snapshot = GraphSnapshot::new(
            vec![
                Node::new("a", NodeGroup::Class, 0),
                Node::new("b", NodeGroup::Jar, 3),
            ],
            vec![],
        );
        let scene = Scene::build(&snapshot, &GraphStyle::default(), 100.0);

        assert!(scene.physics);
        assert_eq!(scene.nodes[0].y, 0.0);
        assert_eq!(scene.nodes[1].y, 300.0);
    }
}
