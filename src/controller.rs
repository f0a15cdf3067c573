//! The graph view controller: owns the view state and moves it forward in
//! response to user gestures, render surface events and service completions.
//!
//! Operations never talk to the network themselves. They return the
//! [`Fetch`]es the host has to run, and the host feeds each outcome back
//! through [`GraphViewController::apply`]. An empty vector means no request
//! was issued.

use crate::model::{ArcDetail, GraphSnapshot, ListMode, NodeDetail, RescopedGraph};
use crate::present;
use crate::render::{GraphStyle, Hit, RenderSurface, Scene, SurfaceEvent};
use crate::request::{Completion, Fetch, Generations, Reply, Request, RequestKind};
use crate::service::ServiceError;
use crate::state::{
    DetailPanel, InspectedMode, NOTHING_SELECTED, NOTHING_SELECTED_YET, Severity, ViewState,
};
use tracing::{debug, info, warn};

/// Upper bound on drain passes per pump. Handling an event may queue more
/// (turning physics off redraws).
const MAX_EVENT_ROUNDS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    /// Vertical distance between two dependency levels.
    pub level_spacing: f32,
    pub style: GraphStyle,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            level_spacing: 150.0,
            style: GraphStyle::default(),
        }
    }
}

pub struct GraphViewController<R: RenderSurface> {
    state: ViewState,
    surface: R,
    generations: Generations,
    options: ViewOptions,
}

impl<R: RenderSurface> GraphViewController<R> {
    pub fn new(surface: R, options: ViewOptions) -> Self {
        Self {
            state: ViewState::new(),
            surface,
            generations: Generations::new(),
            options,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    /// Startup fetches. They fill independent regions and may complete in any order.
    pub fn initialize(&mut self) -> Vec<Fetch> {
        [
            Request::ProjectName,
            Request::FullGraph,
            Request::Classpath,
            Request::UnreferencedReport,
            Request::MissingReport,
            Request::Metrics,
        ]
        .into_iter()
        .map(|request| self.generations.issue(request))
        .collect()
    }

    /// Replaces the displayed graph and resets selection and zoom.
    pub fn load_graph(&mut self, mut snapshot: GraphSnapshot) -> Vec<Fetch> {
        let dropped = snapshot.retain_consistent_edges();
        if dropped > 0 {
            warn!(dropped, "graph contained arcs to unknown nodes");
            self.state.notify(
                Severity::Warning,
                format!("{} arcs referenced missing nodes and were hidden", dropped),
            );
        }

        let scene = Scene::build(&snapshot, &self.options.style, self.options.level_spacing);
        self.surface.show(&scene);
        self.surface.set_physics(true);

        info!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "graph loaded"
        );
        self.state.snapshot = snapshot;
        self.state.clear_selection(NOTHING_SELECTED_YET);
        self.state.zoom_locked = true;
        // Detail requests in flight refer to the previous graph.
        self.generations.invalidate(RequestKind::Detail);

        vec![self.refresh_filter_list()]
    }

    /// Layout has settled: freeze node positions and allow auto-fit again.
    pub fn on_stabilized(&mut self) {
        self.surface.set_physics(false);
        self.state.zoom_locked = false;
        debug!("layout stabilized, physics disabled");
    }

    pub fn on_redraw(&mut self) {
        if !self.state.zoom_locked {
            self.surface.fit();
        }
    }

    pub fn on_click(&mut self, hit: Hit) -> Vec<Fetch> {
        self.state.deselect();
        match hit {
            Hit::Node(id) => self.select_node(&id),
            Hit::Edge(id) => self.show_arc_detail(&id),
            Hit::None => {
                self.generations.invalidate(RequestKind::Detail);
                self.state.clear_selection(NOTHING_SELECTED);
                Vec::new()
            }
        }
    }

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> Vec<Fetch> {
        match event {
            SurfaceEvent::Stabilized => {
                self.on_stabilized();
                Vec::new()
            }
            SurfaceEvent::Redraw => {
                self.on_redraw();
                Vec::new()
            }
            SurfaceEvent::Click(hit) => self.on_click(hit),
        }
    }

    /// Handles everything the surface has reported so far.
    pub fn pump_surface_events(&mut self) -> Vec<Fetch> {
        let mut fetches = Vec::new();
        for _ in 0..MAX_EVENT_ROUNDS {
            let events = self.surface.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                fetches.extend(self.handle_surface_event(event));
            }
        }
        fetches
    }

    pub fn select_node(&mut self, id: &str) -> Vec<Fetch> {
        if !self.state.snapshot.contains_node(id) {
            warn!(id, "selection refers to a node not in the current graph");
            self.generations.invalidate(RequestKind::Detail);
            self.state.clear_selection(NOTHING_SELECTED);
            return Vec::new();
        }
        self.state.select(id);
        vec![self.generations.issue(Request::NodeDetail { id: id.to_string() })]
    }

    pub fn show_arc_detail(&mut self, id: &str) -> Vec<Fetch> {
        if self.state.snapshot.edge(id).is_none() {
            warn!(id, "arc not in the current graph");
            self.generations.invalidate(RequestKind::Detail);
            self.state.clear_selection(NOTHING_SELECTED);
            return Vec::new();
        }
        vec![self.generations.issue(Request::ArcDetail { id: id.to_string() })]
    }

    /// Re-scopes the graph around the selected node. Does nothing without a selection.
    pub fn change_list_mode(&mut self, mode: ListMode) -> Vec<Fetch> {
        let Some(id) = self.state.selected_node.clone() else {
            debug!(%mode, "list mode change ignored, nothing selected");
            return Vec::new();
        };
        vec![self.generations.issue(Request::ListMode { id, mode })]
    }

    /// Toggles a named filter on the backend and reloads the graph.
    pub fn set_filter(&mut self, label: &str) -> Vec<Fetch> {
        let label = label.trim();
        if label.is_empty() {
            return Vec::new();
        }
        vec![self.generations.issue(Request::ToggleFilter {
            label: label.to_string(),
        })]
    }

    /// Restricts the graph to what the selected node implies. Does nothing without a selection.
    pub fn implied_only(&mut self, enabled: bool) -> Vec<Fetch> {
        let Some(id) = self.state.selected_node.clone() else {
            debug!(enabled, "implied-by toggle ignored, nothing selected");
            return Vec::new();
        };
        vec![self.generations.issue(Request::ImpliedBy { id, enabled })]
    }

    pub fn search_by_name(&mut self, text: &str) -> Vec<Fetch> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        vec![self.generations.issue(Request::Search {
            text: text.to_string(),
        })]
    }

    pub fn refresh_filter_list(&mut self) -> Fetch {
        self.generations.issue(Request::ActiveFilters)
    }

    /// Applies a completion unless a newer request of the same kind was issued
    /// since. Returns follow-up fetches.
    pub fn apply(&mut self, completion: Completion) -> Vec<Fetch> {
        let Completion {
            ticket,
            request,
            outcome,
        } = completion;

        if !self.generations.is_current(ticket) {
            debug!(kind = ?ticket.kind, generation = ticket.generation, "discarding stale response");
            return Vec::new();
        }

        match outcome {
            Ok(reply) => self.apply_reply(request, reply),
            Err(err) => {
                self.report_failure(&request, &err);
                Vec::new()
            }
        }
    }

    fn apply_reply(&mut self, request: Request, reply: Reply) -> Vec<Fetch> {
        match (request, reply) {
            (Request::ProjectName, Reply::ProjectName(name)) => {
                self.state.project_name = Some(name);
            }
            (Request::ListMode { .. }, Reply::Rescoped(rescoped)) => {
                return self.apply_rescoped(rescoped);
            }
            (
                Request::FullGraph | Request::ToggleFilter { .. } | Request::ImpliedBy { .. },
                Reply::Graph(snapshot),
            ) => return self.load_graph(snapshot),
            (Request::Classpath, Reply::Classpath(entries)) => {
                self.state.classpath = entries;
            }
            (Request::UnreferencedReport, Reply::Report(report)) => {
                self.state.reports.unreferenced = Some(report);
            }
            (Request::MissingReport, Reply::Report(report)) => {
                self.state.reports.missing = Some(report);
            }
            (Request::Metrics, Reply::Report(report)) => {
                self.state.reports.metrics = Some(report);
            }
            (Request::NodeDetail { id }, Reply::NodeDetail(detail)) => {
                self.show_node_detail(id, detail);
            }
            (Request::ArcDetail { id }, Reply::ArcDetail(detail)) => {
                self.show_arc(&id, &detail);
            }
            (Request::ActiveFilters, Reply::Filters(labels)) => {
                self.state.active_filters = labels;
            }
            (Request::Search { text }, Reply::Matches(ids)) => {
                return self.apply_search(&text, ids);
            }
            (request, reply) => {
                warn!(?request, ?reply, "reply does not match request");
                self.state.notify(
                    Severity::Error,
                    format!("Unexpected answer while loading {}", describe(&request)),
                );
            }
        }
        Vec::new()
    }

    fn show_node_detail(&mut self, id: String, mut detail: NodeDetail) {
        if detail.id.is_empty() {
            detail.id = id.clone();
        }
        self.state.panel = present::node_panel(&detail);
        self.state.list_mode = Some(InspectedMode {
            node_id: id,
            mode: detail.list_mode,
        });
    }

    fn show_arc(&mut self, id: &str, detail: &ArcDetail) {
        self.state.panel = present::arc_panel(id, detail);
    }

    /// Loads the new graph first, then re-applies the selection against it.
    fn apply_rescoped(&mut self, rescoped: RescopedGraph) -> Vec<Fetch> {
        let RescopedGraph { graph, reselect } = rescoped;
        let mut fetches = self.load_graph(graph);

        let requested = reselect.len();
        let valid: Vec<String> = reselect
            .into_iter()
            .filter(|id| self.state.snapshot.contains_node(id))
            .collect();
        if valid.len() < requested {
            warn!(
                requested,
                valid = valid.len(),
                "reselect ids missing from the new graph"
            );
        }

        self.surface.select_nodes(&valid);
        match valid.as_slice() {
            [only] => {
                let only = only.clone();
                fetches.extend(self.select_node(&only));
            }
            [] if requested > 0 => self.state.clear_selection(NOTHING_SELECTED),
            _ => {}
        }
        fetches
    }

    fn apply_search(&mut self, text: &str, ids: Vec<String>) -> Vec<Fetch> {
        let matches: Vec<String> = ids
            .into_iter()
            .filter(|id| self.state.snapshot.contains_node(id))
            .collect();
        info!(text, matches = matches.len(), "search finished");

        self.surface.select_nodes(&matches);
        self.state.show_graph_page();

        match matches.as_slice() {
            [only] => {
                let only = only.clone();
                self.select_node(&only)
            }
            [] => {
                self.generations.invalidate(RequestKind::Detail);
                self.state
                    .clear_selection(&format!("No node matches \"{}\".", text));
                Vec::new()
            }
            many => {
                let count = many.len();
                self.generations.invalidate(RequestKind::Detail);
                self.state.deselect();
                self.state.panel =
                    DetailPanel::message(&format!("{} nodes match \"{}\".", count, text));
                Vec::new()
            }
        }
    }

    fn report_failure(&mut self, request: &Request, err: &ServiceError) {
        warn!(error = %err, ?request, "fetch failed");
        self.state.notify(
            Severity::Error,
            format!("Could not load {}: {}", describe(request), err),
        );
    }
}

fn describe(request: &Request) -> String {
    match request {
        Request::ProjectName => "the project name".to_string(),
        Request::FullGraph => "the dependency graph".to_string(),
        Request::Classpath => "the class path".to_string(),
        Request::UnreferencedReport => "the unreferenced elements report".to_string(),
        Request::MissingReport => "the missing classes report".to_string(),
        Request::Metrics => "the metrics".to_string(),
        Request::NodeDetail { id } => format!("details of node {}", id),
        Request::ArcDetail { id } => format!("details of arc {}", id),
        Request::ListMode { id, mode } => format!("list mode {} for node {}", mode, id),
        Request::ToggleFilter { label } => format!("filter '{}'", label),
        Request::ImpliedBy { id, enabled } => {
            format!("implied-by filter ({}) for node {}", enabled, id)
        }
        Request::ActiveFilters => "the active filters".to_string(),
        Request::Search { text } => format!("search results for '{}'", text),
    }
}
