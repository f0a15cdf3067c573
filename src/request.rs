//! Request/response contract between the controller and the graph service.
//!
//! Every outgoing request carries a [`Ticket`] stamped with the generation of
//! its [`RequestKind`]. Completions are matched back against the latest
//! generation of their kind so a slow, superseded response is dropped instead
//! of overwriting newer state.

use crate::model::{
    ArcDetail, ClasspathEntry, GraphSnapshot, ListMode, NodeDetail, Report, RescopedGraph,
};
use crate::service::ServiceError;
use std::collections::HashMap;

/// The state slot a response writes to. Requests of the same kind supersede
/// each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    ProjectName,
    Graph,
    Classpath,
    UnreferencedReport,
    MissingReport,
    Metrics,
    Detail,
    Filters,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ProjectName,
    FullGraph,
    Classpath,
    UnreferencedReport,
    MissingReport,
    Metrics,
    NodeDetail { id: String },
    ArcDetail { id: String },
    ListMode { id: String, mode: ListMode },
    ToggleFilter { label: String },
    ImpliedBy { id: String, enabled: bool },
    ActiveFilters,
    Search { text: String },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::ProjectName => RequestKind::ProjectName,
            Request::FullGraph
            | Request::ListMode { .. }
            | Request::ToggleFilter { .. }
            | Request::ImpliedBy { .. } => RequestKind::Graph,
            Request::Classpath => RequestKind::Classpath,
            Request::UnreferencedReport => RequestKind::UnreferencedReport,
            Request::MissingReport => RequestKind::MissingReport,
            Request::Metrics => RequestKind::Metrics,
            Request::NodeDetail { .. } | Request::ArcDetail { .. } => RequestKind::Detail,
            Request::ActiveFilters => RequestKind::Filters,
            Request::Search { .. } => RequestKind::Search,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    ProjectName(String),
    Graph(GraphSnapshot),
    Classpath(Vec<ClasspathEntry>),
    Report(Report),
    NodeDetail(NodeDetail),
    ArcDetail(ArcDetail),
    Rescoped(RescopedGraph),
    Filters(Vec<String>),
    Matches(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: RequestKind,
    pub generation: u64,
}

/// A request the host must send, with the ticket its completion must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetch {
    pub ticket: Ticket,
    pub request: Request,
}

impl Fetch {
    pub fn complete(self, outcome: Result<Reply, ServiceError>) -> Completion {
        Completion {
            ticket: self.ticket,
            request: self.request,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub request: Request,
    pub outcome: Result<Reply, ServiceError>,
}

/// Monotonic per-kind counters.
#[derive(Debug, Default)]
pub struct Generations {
    latest: HashMap<RequestKind, u64>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps a new request, superseding everything in flight for its kind.
    pub fn issue(&mut self, request: Request) -> Fetch {
        let kind = request.kind();
        let generation = self.bump(kind);
        Fetch {
            ticket: Ticket { kind, generation },
            request,
        }
    }

    /// Supersedes in-flight requests of `kind` without issuing a new one.
    pub fn invalidate(&mut self, kind: RequestKind) {
        self.bump(kind);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get(&ticket.kind).copied() == Some(ticket.generation)
    }

    fn bump(&mut self, kind: RequestKind) -> u64 {
        let counter = self.latest.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_request_supersedes_older_of_same_kind() {
        let mut generations = Generations::new();
        let first = generations.issue(Request::NodeDetail { id: "1".into() });
        let second = generations.issue(Request::ArcDetail { id: "1-2".into() });

        assert!(!generations.is_current(first.ticket));
        assert!(generations.is_current(second.ticket));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut generations = Generations::new();
        let graph = generations.issue(Request::FullGraph);
        let filters = generations.issue(Request::ActiveFilters);

        assert!(generations.is_current(graph.ticket));
        assert!(generations.is_current(filters.ticket));
    }

    #[test]
    fn test_invalidate_without_issuing() {
        let mut generations = Generations::new();
        let detail = generations.issue(Request::NodeDetail { id: "7".into() });
        generations.invalidate(RequestKind::Detail);

        assert!(!generations.is_current(detail.ticket));
    }

    #[test]
    fn test_graph_affecting_requests_share_a_slot() {
        assert_eq!(
            Request::ToggleFilter { label: "jar".into() }.kind(),
            RequestKind::Graph
        );
        assert_eq!(
            Request::ImpliedBy {
                id: "3".into(),
                enabled: true
            }
            .kind(),
            RequestKind::Graph
        );
        assert_eq!(
            Request::ListMode {
                id: "3".into(),
                mode: ListMode::Expanded
            }
            .kind(),
            RequestKind::Graph
        );
    }
}
