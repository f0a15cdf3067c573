use super::graph::{GraphSnapshot, ReasonPair};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How a node's children are expanded in the next graph fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListMode {
    /// All children hidden; the whole subtree is drawn as this node.
    Collapsed,
    /// Direct leaves collapsed, other children listed separately.
    LeafsCollapsed,
    /// All children listed separately.
    Expanded,
    /// Request-only: collapse the parent of the inspected node.
    CollapseParent,
}

impl ListMode {
    /// Modes a node can actually be in, in the order they are offered.
    pub const NODE_MODES: [ListMode; 3] = [
        ListMode::Collapsed,
        ListMode::LeafsCollapsed,
        ListMode::Expanded,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            ListMode::Collapsed => "COLLAPSED",
            ListMode::LeafsCollapsed => "LEAFS_COLLAPSED",
            ListMode::Expanded => "EXPANDED",
            ListMode::CollapseParent => "COLLAPSE_PARENT",
        }
    }
}

impl fmt::Display for ListMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown list mode: {0}")]
pub struct ParseListModeError(pub String);

impl FromStr for ListMode {
    type Err = ParseListModeError;

    /// Accepts wire names as well as the kebab-case spelling used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "COLLAPSED" => Ok(ListMode::Collapsed),
            "LEAFS_COLLAPSED" => Ok(ListMode::LeafsCollapsed),
            "EXPANDED" => Ok(ListMode::Expanded),
            "COLLAPSE_PARENT" => Ok(ListMode::CollapseParent),
            _ => Err(ParseListModeError(s.to_string())),
        }
    }
}

/// Detail payload for a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetail {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    pub list_mode: ListMode,
    #[serde(default)]
    pub number_contained_classes: u32,
    #[serde(default)]
    pub number_collapsable: u32,
    #[serde(default)]
    pub number_expandable: u32,
}

impl NodeDetail {
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.node_name.is_empty() {
            &self.node_name
        } else {
            &self.id
        }
    }

    pub fn is_class(&self) -> bool {
        self.kind == "class"
    }
}

/// Detail payload for an arc: both endpoints and the class-level reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcDetail {
    pub from: NodeDetail,
    pub to: NodeDetail,
    #[serde(default)]
    pub reason: Vec<ReasonPair>,
}

/// Answer to a list-mode change: the new graph plus the ids to select in it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RescopedGraph {
    pub graph: GraphSnapshot,
    #[serde(default)]
    pub reselect: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_mode_parsing() {
        assert_eq!("EXPANDED".parse(), Ok(ListMode::Expanded));
        assert_eq!("leafs-collapsed".parse(), Ok(ListMode::LeafsCollapsed));
        assert_eq!("collapse_parent".parse(), Ok(ListMode::CollapseParent));
        assert!("sideways".parse::<ListMode>().is_err());
    }

    #[test]
    fn test_node_detail_wire_format() {
        let json = r#"{
            "nodeName": "dir:build.de.example.Foo",
            "name": "Foo",
            "type": "class",
            "resourceType": "dir",
            "resourceName": "build",
            "listMode": "LEAFS_COLLAPSED",
            "numberContainedClasses": 1,
            "numberCollapsable": 4,
            "numberExpandable": 1
        }"#;
        let detail: NodeDetail = serde_json::from_str(json).unwrap();

        assert!(detail.id.is_empty());
        assert!(detail.is_class());
        assert_eq!(detail.list_mode, ListMode::LeafsCollapsed);
        assert_eq!(detail.display_name(), "Foo");
        assert_eq!(detail.number_collapsable, 4);
    }
}
