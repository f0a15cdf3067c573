mod detail;
mod graph;
mod project;

pub use detail::{ArcDetail, ListMode, NodeDetail, ParseListModeError, RescopedGraph};
pub use graph::{Edge, GraphSnapshot, Node, NodeGroup, ReasonPair};
pub use project::{ClasspathEntry, Report};
