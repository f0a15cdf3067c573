use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Kind of entity a node stands for. The backend tags every node with one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Jar,
    Dir,
    Class,
    #[default]
    #[serde(other)]
    Package,
}

impl NodeGroup {
    pub const ALL: [NodeGroup; 4] = [
        NodeGroup::Jar,
        NodeGroup::Dir,
        NodeGroup::Package,
        NodeGroup::Class,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeGroup::Jar => "jar",
            NodeGroup::Dir => "dir",
            NodeGroup::Package => "package",
            NodeGroup::Class => "class",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == name)
    }
}

impl fmt::Display for NodeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub group: NodeGroup,
    /// Dependency depth; the view turns it into a vertical position.
    #[serde(default)]
    pub level: i32,
    /// Attributes the viewer passes through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, group: NodeGroup, level: i32) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            group,
            level,
            extra: Map::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Label with the line breaks the backend inserts for wrapping removed.
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            self.id.clone()
        } else {
            self.label.replace('\n', "")
        }
    }
}

/// One explanation of why an arc exists: `first` depends on `second`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonPair {
    pub first: String,
    pub second: String,
}

impl ReasonPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<ReasonPair>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    /// Creates an arc with the backend's `from-to` id convention.
    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: format!("{}-{}", from, to),
            from,
            to,
            reason: None,
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_reason(mut self, reason: Vec<ReasonPair>) -> Self {
        self.reason = Some(reason);
        self
    }
}

/// The complete node and edge set returned by one graph fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Drops edges whose endpoints are missing from the node set and returns
    /// how many were removed.
    pub fn retain_consistent_edges(&mut self) -> usize {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let before = self.edges.len();
        let kept: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| ids.contains(e.from.as_str()) && ids.contains(e.to.as_str()))
            .cloned()
            .collect();
        self.edges = kept;
        before - self.edges.len()
    }
}
