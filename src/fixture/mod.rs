//! An in-memory stand-in for the analysis backend.
//!
//! It serves a fixed dependency graph loaded from JSON and emulates the
//! backend's filter, implied-by, list-mode and search behaviour closely enough
//! for offline sessions and tests. It does not analyse anything itself.

mod routes;

pub use routes::{router, serve};

use crate::fs::FileSystem;
use crate::model::{
    ArcDetail, ClasspathEntry, Edge, GraphSnapshot, ListMode, Node, NodeDetail, NodeGroup, Report,
    RescopedGraph,
};
use crate::request::{Reply, Request};
use crate::service::{GraphService, ServiceError};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Fixture node ids must be unique, '{0}' appears twice")]
    DuplicateNode(String),
}

/// On-disk fixture format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureData {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub classpath: Vec<ClasspathEntry>,
    #[serde(default)]
    pub reports: FixtureReports,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureReports {
    #[serde(default)]
    pub unreferenced: Report,
    #[serde(default)]
    pub missing: Report,
    #[serde(default)]
    pub metrics: Report,
}

fn default_project_name() -> String {
    "(no name given)".to_string()
}

/// Filter label restricting the graph to dependency cycles.
pub const CYCLES_ONLY: &str = "cycles only";

#[derive(Debug, Default)]
struct ViewSettings {
    filters: Vec<String>,
    implied: Option<ImpliedFilter>,
    modes: HashMap<String, ListMode>,
}

#[derive(Debug)]
struct ImpliedFilter {
    node_id: String,
    label: String,
}

pub struct FixtureBackend {
    data: FixtureData,
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    settings: Mutex<ViewSettings>,
}

impl FixtureBackend {
    pub fn load(path: &Path, fs: &dyn FileSystem) -> Result<Self, FixtureError> {
        let content = fs.read_to_string(path)?;
        let data: FixtureData = serde_json::from_str(&content)?;
        Self::from_data(data)
    }

    pub fn from_data(mut data: FixtureData) -> Result<Self, FixtureError> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for node in &data.nodes {
            let idx = graph.add_node(node.id.clone());
            if index.insert(node.id.clone(), idx).is_some() {
                return Err(FixtureError::DuplicateNode(node.id.clone()));
            }
        }

        let mut snapshot = GraphSnapshot::new(
            std::mem::take(&mut data.nodes),
            std::mem::take(&mut data.edges),
        );
        let dropped = snapshot.retain_consistent_edges();
        if dropped > 0 {
            warn!(dropped, "fixture has edges to unknown nodes");
        }
        for edge in &snapshot.edges {
            if let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) {
                graph.add_edge(from, to, ());
            }
        }
        data.nodes = snapshot.nodes;
        data.edges = snapshot.edges;

        Ok(Self {
            data,
            graph,
            index,
            settings: Mutex::new(ViewSettings::default()),
        })
    }

    pub fn project_name(&self) -> &str {
        &self.data.project_name
    }

    /// Answers a request synchronously.
    pub fn answer(&self, request: &Request) -> Result<Reply, ServiceError> {
        let mut settings = self.settings();
        let reply = match request {
            Request::ProjectName => Reply::ProjectName(self.data.project_name.clone()),
            Request::FullGraph => Reply::Graph(self.visible_graph(&settings)),
            Request::Classpath => Reply::Classpath(self.data.classpath.clone()),
            Request::UnreferencedReport => Reply::Report(self.data.reports.unreferenced.clone()),
            Request::MissingReport => Reply::Report(self.data.reports.missing.clone()),
            Request::Metrics => Reply::Report(self.data.reports.metrics.clone()),
            Request::NodeDetail { id } => {
                Reply::NodeDetail(self.node_detail(self.node(id)?, &settings))
            }
            Request::ArcDetail { id } => Reply::ArcDetail(self.arc_detail(id, &settings)?),
            Request::ListMode { id, mode } => {
                self.node(id)?;
                let reselect = if *mode == ListMode::CollapseParent {
                    Vec::new()
                } else {
                    settings.modes.insert(id.clone(), *mode);
                    vec![id.clone()]
                };
                Reply::Rescoped(RescopedGraph {
                    graph: self.visible_graph(&settings),
                    reselect,
                })
            }
            Request::ToggleFilter { label } => {
                if settings.implied.as_ref().is_some_and(|f| &f.label == label) {
                    settings.implied = None;
                } else if let Some(pos) = settings.filters.iter().position(|f| f == label) {
                    settings.filters.remove(pos);
                } else if label == CYCLES_ONLY || NodeGroup::from_name(label).is_some() {
                    settings.filters.push(label.clone());
                } else {
                    return Err(ServiceError::NotFound(format!("filter {}", label)));
                }
                Reply::Graph(self.visible_graph(&settings))
            }
            Request::ImpliedBy { id, enabled } => {
                settings.implied = if *enabled {
                    let node = self.node(id)?;
                    Some(ImpliedFilter {
                        node_id: id.clone(),
                        label: format!("required by {}", node.display_label()),
                    })
                } else {
                    None
                };
                Reply::Graph(self.visible_graph(&settings))
            }
            Request::ActiveFilters => {
                let mut labels = settings.filters.clone();
                labels.extend(settings.implied.as_ref().map(|f| f.label.clone()));
                Reply::Filters(labels)
            }
            Request::Search { text } => Reply::Matches(self.search(text, &settings)),
        };
        Ok(reply)
    }

    fn settings(&self) -> MutexGuard<'_, ViewSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn node(&self, id: &str) -> Result<&Node, ServiceError> {
        self.data
            .nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("node {}", id)))
    }

    fn reachable_from(&self, id: &str) -> HashSet<&str> {
        let mut reached = HashSet::new();
        if let Some(&start) = self.index.get(id) {
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(idx) = bfs.next(&self.graph) {
                reached.insert(self.graph[idx].as_str());
            }
        }
        reached
    }

    fn visible_graph(&self, settings: &ViewSettings) -> GraphSnapshot {
        let hidden: HashSet<NodeGroup> = settings
            .filters
            .iter()
            .filter_map(|label| NodeGroup::from_name(label))
            .collect();
        let reachable = settings
            .implied
            .as_ref()
            .map(|f| self.reachable_from(&f.node_id));

        let nodes: Vec<Node> = self
            .data
            .nodes
            .iter()
            .filter(|n| !hidden.contains(&n.group))
            .filter(|n| reachable.as_ref().is_none_or(|r| r.contains(n.id.as_str())))
            .cloned()
            .collect();

        let mut snapshot = GraphSnapshot::new(nodes, self.data.edges.clone());
        snapshot.retain_consistent_edges();
        if settings.filters.iter().any(|f| f == CYCLES_ONLY) {
            snapshot = cycles_only(snapshot);
        }
        snapshot
    }

    fn node_detail(&self, node: &Node, settings: &ViewSettings) -> NodeDetail {
        let default_mode = match node.group {
            NodeGroup::Jar => ListMode::Collapsed,
            _ => ListMode::LeafsCollapsed,
        };
        let classes = node
            .extra
            .get("classes")
            .and_then(|v| v.as_u64())
            .map(|n| n as u32)
            .unwrap_or(u32::from(node.group == NodeGroup::Class));
        let successors = self
            .index
            .get(&node.id)
            .map(|&idx| self.graph.neighbors(idx).count() as u32)
            .unwrap_or(0);
        let top_level = matches!(node.group, NodeGroup::Jar | NodeGroup::Dir);

        NodeDetail {
            id: node.id.clone(),
            node_name: node.display_label(),
            name: node.display_label(),
            kind: node.group.to_string(),
            resource_type: None,
            resource_name: None,
            list_mode: settings.modes.get(&node.id).copied().unwrap_or(default_mode),
            number_contained_classes: classes,
            number_collapsable: if top_level { 0 } else { 1 },
            number_expandable: successors,
        }
    }

    fn arc_detail(&self, id: &str, settings: &ViewSettings) -> Result<ArcDetail, ServiceError> {
        let edge = self
            .data
            .edges
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("arc {}", id)))?;
        Ok(ArcDetail {
            from: self.node_detail(self.node(&edge.from)?, settings),
            to: self.node_detail(self.node(&edge.to)?, settings),
            reason: edge.reason.clone().unwrap_or_default(),
        })
    }

    /// Exact (case-insensitive) label or id matches win over substring matches.
    fn search(&self, text: &str, settings: &ViewSettings) -> Vec<String> {
        let needle = text.trim().to_lowercase();
        let visible = self.visible_graph(settings);

        let exact: Vec<String> = visible
            .nodes
            .iter()
            .filter(|n| n.id.to_lowercase() == needle || n.display_label().to_lowercase() == needle)
            .map(|n| n.id.clone())
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        visible
            .nodes
            .iter()
            .filter(|n| n.display_label().to_lowercase().contains(&needle))
            .map(|n| n.id.clone())
            .collect()
    }
}

/// Keeps the nodes that lie on a cycle and the arcs within each cycle.
fn cycles_only(snapshot: GraphSnapshot) -> GraphSnapshot {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let index: HashMap<&str, NodeIndex> = snapshot
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), graph.add_node(i)))
        .collect();
    for edge in &snapshot.edges {
        if let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
            graph.add_edge(from, to, ());
        }
    }

    let mut component: HashMap<String, usize> = HashMap::new();
    for (c, scc) in tarjan_scc(&graph).into_iter().enumerate() {
        if scc.len() < 2 {
            continue;
        }
        for idx in scc {
            component.insert(snapshot.nodes[graph[idx]].id.clone(), c);
        }
    }

    let GraphSnapshot { nodes, edges } = snapshot;
    let nodes = nodes
        .into_iter()
        .filter(|n| component.contains_key(&n.id))
        .collect();
    let edges = edges
        .into_iter()
        .filter(|e| match (component.get(&e.from), component.get(&e.to)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        })
        .collect();
    GraphSnapshot::new(nodes, edges)
}

impl GraphService for FixtureBackend {
    async fn fetch(&self, request: &Request) -> Result<Reply, ServiceError> {
        self.answer(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;
    use crate::model::ReasonPair;

    fn backend() -> FixtureBackend {
        FixtureBackend::from_data(FixtureData {
            project_name: "demo".into(),
            nodes: vec![
                Node::new("0", NodeGroup::Class, 0).with_label("Main"),
                Node::new("1", NodeGroup::Package, 1).with_label("de.example.util"),
                Node::new("2", NodeGroup::Jar, 2).with_label("commons-io"),
                Node::new("3", NodeGroup::Class, 0).with_label("MainTest"),
            ],
            edges: vec![
                Edge::between("0", "1")
                    .with_reason(vec![ReasonPair::new("Main", "de.example.util.Files")]),
                Edge::between("1", "2"),
                Edge::between("3", "0"),
            ],
            classpath: vec![],
            reports: FixtureReports::default(),
        })
        .unwrap()
    }

    fn graph(reply: Reply) -> GraphSnapshot {
        match reply {
            Reply::Graph(g) => g,
            other => panic!("expected graph, got {:?}", other),
        }
    }

    fn ids(snapshot: &GraphSnapshot) -> Vec<&str> {
        snapshot.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_load_from_file() {
        let fs = MockFs::with_files([(
            "/fixtures/demo.json",
            r#"{"projectName":"demo","nodes":[{"id":"0","label":"A","group":"jar","level":0}]}"#,
        )]);
        let backend = FixtureBackend::load(Path::new("/fixtures/demo.json"), &fs).unwrap();
        assert_eq!(backend.project_name(), "demo");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = FixtureBackend::from_data(FixtureData {
            project_name: "dup".into(),
            nodes: vec![
                Node::new("0", NodeGroup::Jar, 0),
                Node::new("0", NodeGroup::Dir, 0),
            ],
            edges: vec![],
            classpath: vec![],
            reports: FixtureReports::default(),
        });
        assert!(matches!(result, Err(FixtureError::DuplicateNode(id)) if id == "0"));
    }

    #[test]
    fn test_group_filter_hides_nodes_and_arcs() {
        let backend = backend();
        let g = graph(
            backend
                .answer(&Request::ToggleFilter { label: "jar".into() })
                .unwrap(),
        );
        assert_eq!(ids(&g), vec!["0", "1", "3"]);
        assert!(g.edges.iter().all(|e| e.to != "2"));

        let Reply::Filters(labels) = backend.answer(&Request::ActiveFilters).unwrap() else {
            panic!("expected filters");
        };
        assert_eq!(labels, vec!["jar".to_string()]);

        // toggling again removes it
        let g = graph(
            backend
                .answer(&Request::ToggleFilter { label: "jar".into() })
                .unwrap(),
        );
        assert_eq!(g.nodes.len(), 4);
    }

    #[test]
    fn test_cycles_only_keeps_cyclic_components() {
        let backend = FixtureBackend::from_data(FixtureData {
            project_name: "cyclic".into(),
            nodes: vec![
                Node::new("a", NodeGroup::Package, 0),
                Node::new("b", NodeGroup::Package, 0),
                Node::new("c", NodeGroup::Package, 1),
                Node::new("d", NodeGroup::Jar, 2),
            ],
            edges: vec![
                Edge::between("a", "b"),
                Edge::between("b", "a"),
                Edge::between("b", "c"),
                Edge::between("c", "d"),
            ],
            classpath: vec![],
            reports: FixtureReports::default(),
        })
        .unwrap();

        let g = graph(
            backend
                .answer(&Request::ToggleFilter {
                    label: CYCLES_ONLY.into(),
                })
                .unwrap(),
        );
        assert_eq!(ids(&g), vec!["a", "b"]);
        let edge_ids: Vec<&str> = g.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["a-b", "b-a"]);

        let g = graph(
            backend
                .answer(&Request::ToggleFilter {
                    label: CYCLES_ONLY.into(),
                })
                .unwrap(),
        );
        assert_eq!(g.nodes.len(), 4);
    }

    #[test]
    fn test_unknown_filter_label_is_rejected() {
        let backend = backend();
        let result = backend.answer(&Request::ToggleFilter {
            label: "no such filter".into(),
        });
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let Reply::Filters(labels) = backend.answer(&Request::ActiveFilters).unwrap() else {
            panic!("expected filters");
        };
        assert!(labels.is_empty());
    }

    #[test]
    fn test_implied_by_restricts_to_reachable() {
        let backend = backend();
        let g = graph(
            backend
                .answer(&Request::ImpliedBy {
                    id: "1".into(),
                    enabled: true,
                })
                .unwrap(),
        );
        assert_eq!(ids(&g), vec!["1", "2"]);

        let Reply::Filters(labels) = backend.answer(&Request::ActiveFilters).unwrap() else {
            panic!("expected filters");
        };
        assert_eq!(labels, vec!["required by de.example.util".to_string()]);

        let g = graph(
            backend
                .answer(&Request::ImpliedBy {
                    id: "1".into(),
                    enabled: false,
                })
                .unwrap(),
        );
        assert_eq!(g.nodes.len(), 4);
    }

    #[test]
    fn test_list_mode_reselects_node() {
        let backend = backend();
        let Reply::Rescoped(rescoped) = backend
            .answer(&Request::ListMode {
                id: "1".into(),
                mode: ListMode::Expanded,
            })
            .unwrap()
        else {
            panic!("expected rescoped graph");
        };
        assert_eq!(rescoped.reselect, vec!["1".to_string()]);

        let Reply::NodeDetail(detail) = backend
            .answer(&Request::NodeDetail { id: "1".into() })
            .unwrap()
        else {
            panic!("expected node detail");
        };
        assert_eq!(detail.list_mode, ListMode::Expanded);
        assert_eq!(detail.number_expandable, 1);
    }

    #[test]
    fn test_arc_detail_carries_reason() {
        let Reply::ArcDetail(arc) = backend()
            .answer(&Request::ArcDetail { id: "0-1".into() })
            .unwrap()
        else {
            panic!("expected arc detail");
        };
        assert_eq!(arc.from.name, "Main");
        assert_eq!(arc.reason.len(), 1);
    }

    #[test]
    fn test_unknown_node_is_not_found() {
        let result = backend().answer(&Request::NodeDetail { id: "42".into() });
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_search_prefers_exact_match() {
        let backend = backend();
        let Reply::Matches(exact) = backend
            .answer(&Request::Search { text: "main".into() })
            .unwrap()
        else {
            panic!("expected matches");
        };
        assert_eq!(exact, vec!["0".to_string()]);

        let Reply::Matches(partial) = backend
            .answer(&Request::Search { text: "Mai".into() })
            .unwrap()
        else {
            panic!("expected matches");
        };
        assert_eq!(partial, vec!["0".to_string(), "3".to_string()]);
    }
}
